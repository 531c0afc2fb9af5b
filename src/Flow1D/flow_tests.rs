#[cfg(test)]
mod tests {
    use crate::Examples::flame_examples::{
        METHANE_AIR, counterflow_profile, free_flame_profile, methane_air_flow, methane_air_gas,
        sooting_flow,
    };
    use crate::Flow1D::StFlow::{StFlow, THERMOPHORETIC_COEFF};
    use crate::Flow1D::flow_api::{FlowError, FlowType, TransportMode};
    use crate::Flow1D::layout::{OFFSET_L, OFFSET_T, OFFSET_U, OFFSET_V, OFFSET_Y};
    use crate::GasModels::NASAgas::IdealGasMix;
    use crate::GasModels::arrhenius::InertKinetics;
    use crate::GasModels::gas_api::{ONE_ATM, ThermoPhase};
    use crate::GasModels::transport::ConstantTransport;
    use approx::assert_relative_eq;

    #[test]
    fn test_domain_needs_species() {
        let gas = IdealGasMix::new("empty", vec![]).unwrap();
        let result = StFlow::new(
            Box::new(gas),
            Box::new(InertKinetics),
            Box::new(ConstantTransport::new(0, 1e-5, 0.02, 1e-5)),
            3,
        );
        assert!(matches!(result, Err(FlowError::NoSpecies)));
    }

    #[test]
    fn test_domain_needs_points() {
        let result = StFlow::new(
            Box::new(methane_air_gas().unwrap()),
            Box::new(InertKinetics),
            Box::new(ConstantTransport::new(5, 1e-5, 0.02, 1e-5)),
            0,
        );
        assert!(matches!(result, Err(FlowError::NoPoints)));

        let mut flow = methane_air_flow(3, 0.01).unwrap();
        assert!(matches!(flow.setup_grid(&[]), Err(FlowError::NoPoints)));
        assert_eq!(flow.n_points(), 3);
        assert_eq!(flow.layout().size(), 3 * flow.n_components());
    }

    #[test]
    #[should_panic(expected = "at least one grid point")]
    fn test_resize_to_zero_points_panics() {
        let mut flow = methane_air_flow(3, 0.01).unwrap();
        let nv = flow.n_components();
        flow.resize(nv, 0);
    }

    #[test]
    fn test_defaults() {
        let flow = methane_air_flow(5, 0.01).unwrap();
        assert!(matches!(flow.flow_type(), Err(FlowError::UnknownFlowType)));
        assert!(flow.fixed_mass_flux().is_err());
        assert_eq!(flow.pressure(), ONE_ATM);
        assert_eq!(flow.transport_mode(), TransportMode::MixtureAveraged);
        assert_eq!(flow.transport_model(), "Lennard-Jones");
        assert_eq!(flow.thermophoretic_coeff(), THERMOPHORETIC_COEFF);
        assert!(!flow.radiation_enabled() && !flow.with_soret());
        assert!(flow.needs_jacobian_update());
        for j in 0..flow.n_points() {
            assert!(!flow.do_energy(j));
            assert!(flow.do_species(j));
        }
    }

    #[test]
    fn test_component_names_and_indices() {
        let flow = methane_air_flow(3, 0.01).unwrap();
        assert_eq!(flow.n_components(), 4 + METHANE_AIR.len());
        assert_eq!(flow.component_name(OFFSET_U), "velocity");
        assert_eq!(flow.component_name(OFFSET_V), "spread_rate");
        assert_eq!(flow.component_name(OFFSET_T), "T");
        assert_eq!(flow.component_name(OFFSET_L), "lambda");
        for (k, name) in METHANE_AIR.iter().enumerate() {
            assert_eq!(flow.component_name(OFFSET_Y + k), *name);
            assert_eq!(flow.component_index(name).unwrap(), OFFSET_Y + k);
        }
        for n in 0..flow.n_components() {
            let name = flow.component_name(n);
            assert_eq!(flow.component_index(&name).unwrap(), n);
        }
        assert_eq!(flow.component_index("u").unwrap(), OFFSET_U);
        assert_eq!(flow.component_index("V").unwrap(), OFFSET_V);
        assert_eq!(flow.component_index("L").unwrap(), OFFSET_L);
        assert!(matches!(
            flow.component_index("S0"),
            Err(FlowError::UnknownComponent(_))
        ));
        assert!(flow.component_index("Ar").is_err());
    }

    #[test]
    fn test_soot_components() {
        let flow = sooting_flow(3, 0.01).unwrap();
        assert_eq!(flow.n_soot(), 2);
        let s0 = OFFSET_Y + flow.n_species();
        assert_eq!(flow.component_name(s0), "S0");
        assert_eq!(flow.component_name(s0 + 1), "S1");
        assert_eq!(flow.component_index("S1").unwrap(), s0 + 1);
        assert!(flow.component_index("S2").is_err());
        for bad in ["S", "S+1", "S-0", "S1x", "s0"] {
            assert!(flow.component_index(bad).is_err(), "{} accepted", bad);
        }
        assert_eq!(flow.bounds(s0).0, -1e-7);
    }

    #[test]
    fn test_active_components_depend_on_flow_type() {
        let mut flow = methane_air_flow(5, 0.01).unwrap();
        flow.set_axisymmetric_flow();
        assert!((0..flow.n_components()).all(|n| flow.component_active(n)));
        flow.set_free_flow();
        assert!(!flow.component_active(OFFSET_V));
        assert!(!flow.component_active(OFFSET_L));
        assert!(flow.component_active(OFFSET_U));
        assert!(flow.component_active(OFFSET_T));
        assert_eq!(flow.flow_type().unwrap(), FlowType::FreeFlow);
        assert!(!flow.fixed_mass_flux().unwrap());
        assert!(!flow.viscosity_enabled());
        flow.set_axisymmetric_flow();
        assert!(flow.fixed_mass_flux().unwrap());
        assert!(flow.viscosity_enabled());
    }

    #[test]
    fn test_row_active() {
        let mut flow = methane_air_flow(5, 0.01).unwrap();
        flow.set_axisymmetric_flow();
        assert!(!flow.row_active(OFFSET_T, 2));
        flow.solve_energy_eqn(Some(2));
        assert!(flow.row_active(OFFSET_T, 2));
        assert!(!flow.row_active(OFFSET_T, 1));
        // the excess species defaults to index 0 until the first full evaluation
        assert!(!flow.row_active(OFFSET_Y, 0));
        assert!(flow.row_active(OFFSET_Y, 2));
        assert!(flow.row_active(OFFSET_Y + 1, 0));
    }

    #[test]
    fn test_bounds() {
        let flow = methane_air_flow(3, 0.01).unwrap();
        let (tmin, tmax) = flow.bounds(OFFSET_T);
        assert_eq!(tmin, 200.0);
        assert_eq!(tmax, 2.0 * flow.thermo().max_temp());
        assert_eq!(flow.bounds(OFFSET_Y), (-1e-7, 1e5));
        assert!(flow.bounds(OFFSET_U).0 < -1e10);
        assert!(flow.bounds(OFFSET_L).1 > 1e10);
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range_panics() {
        let flow = methane_air_flow(3, 0.01).unwrap();
        flow.index(0, 3);
    }

    #[test]
    #[should_panic]
    fn test_component_out_of_range_panics() {
        let flow = methane_air_flow(3, 0.01).unwrap();
        flow.component_name(flow.n_components());
    }

    #[test]
    #[should_panic]
    fn test_resize_with_wrong_component_count_panics() {
        let mut flow = methane_air_flow(3, 0.01).unwrap();
        flow.resize(4, 10);
    }

    #[test]
    fn test_resize_keeps_flags_and_defaults_new_points() {
        let mut flow = methane_air_flow(3, 0.01).unwrap();
        flow.solve_energy_eqn(None);
        flow.mark_jacobian_current();
        let nv = flow.n_components();
        flow.resize(nv, 6);
        assert_eq!(flow.n_points(), 6);
        assert_eq!(flow.layout().size(), 6 * nv);
        assert!(flow.do_energy(2));
        assert!(!flow.do_energy(5));
        assert!(flow.do_species(5));
        assert_eq!(flow.t_fixed(5), 0.0);
        assert!(flow.needs_jacobian_update());
        let z = flow.grid().positions();
        assert!(z.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_setup_grid() {
        let mut flow = methane_air_flow(3, 0.01).unwrap();
        flow.setup_grid(&[0.0, 0.001, 0.003, 0.006]).unwrap();
        assert_eq!(flow.n_points(), 4);
        assert_relative_eq!(flow.grid().dz(2), 0.003, epsilon = 1e-15);

        let result = flow.setup_grid(&[0.0, 0.002, 0.002, 0.004, 0.005]);
        assert!(matches!(
            result,
            Err(FlowError::NonMonotonicGrid { index: 2, .. })
        ));
        // a rejected grid leaves the domain as it was
        assert_eq!(flow.n_points(), 4);
        assert_eq!(flow.grid().positions(), &[0.0, 0.001, 0.003, 0.006]);
    }

    #[test]
    fn test_initial_solution() {
        let mut flow = methane_air_flow(4, 0.01).unwrap();
        let y = [0.055, 0.22, 0.0, 0.0, 0.725];
        flow.set_initial_gas(350.0, &y).unwrap();
        let mut x = vec![-1.0; flow.layout().size()];
        flow.get_initial_soln(&mut x);
        for j in 0..flow.n_points() {
            assert_eq!(x[flow.index(OFFSET_U, j)], 0.0);
            assert_eq!(x[flow.index(OFFSET_V, j)], 0.0);
            assert_eq!(x[flow.index(OFFSET_L, j)], 0.0);
            assert_eq!(x[flow.index(OFFSET_T, j)], 350.0);
            for (k, yk) in y.iter().enumerate() {
                assert_eq!(x[flow.index(OFFSET_Y + k, j)], *yk);
            }
            assert!(flow.density(j) > 0.9 && flow.density(j) < 1.1);
        }
        assert!(flow.set_initial_gas(-5.0, &y).is_err());
        assert!(flow.set_initial_gas(300.0, &y[..3]).is_err());
    }

    #[test]
    fn test_initial_soot_moments() {
        let mut flow = sooting_flow(3, 0.01).unwrap();
        flow.set_initial_soot(&[1e12, 1e-9]);
        let mut x = vec![0.0; flow.layout().size()];
        flow.get_initial_soln(&mut x);
        let s0 = OFFSET_Y + flow.n_species();
        assert_eq!(x[flow.index(s0, 2)], 1e12);
        assert_eq!(x[flow.index(s0 + 1, 1)], 1e-9);
    }

    #[test]
    fn test_reset_bad_values() {
        let flow = methane_air_flow(3, 0.01).unwrap();
        let mut x = vec![0.0; flow.layout().size()];
        let bad = [0.3, -0.1, 0.0, 0.2, 0.9];
        for j in 0..3 {
            for (k, yk) in bad.iter().enumerate() {
                x[flow.index(OFFSET_Y + k, j)] = *yk;
            }
            x[flow.index(OFFSET_T, j)] = 500.0;
        }
        flow.reset_bad_values(&mut x);
        for j in 0..3 {
            let y: Vec<f64> = (0..5).map(|k| x[flow.index(OFFSET_Y + k, j)]).collect();
            assert!(y.iter().all(|&yk| yk >= 0.0));
            assert_relative_eq!(y.iter().sum::<f64>(), 1.0, epsilon = 1e-14);
            assert_relative_eq!(y[0], 0.3 / 1.4, epsilon = 1e-14);
            assert_eq!(x[flow.index(OFFSET_T, j)], 500.0);
        }
    }

    #[test]
    fn test_finalize_rejects_soret_without_multicomponent() {
        let mut flow = methane_air_flow(5, 0.01).unwrap();
        flow.set_axisymmetric_flow();
        let x = counterflow_profile(&flow);
        flow.enable_soret(true);
        assert!(matches!(
            flow.finalize(&x),
            Err(FlowError::SoretRequiresMulticomponent)
        ));
        flow.set_transport_mode(TransportMode::Multicomponent);
        assert!(flow.finalize(&x).is_ok());
    }

    #[test]
    fn test_finalize_captures_temperatures() {
        let mut flow = methane_air_flow(5, 0.01).unwrap();
        flow.set_axisymmetric_flow();
        flow.solve_energy_eqn(Some(0));
        let x = counterflow_profile(&flow);
        flow.finalize(&x).unwrap();
        for j in 0..5 {
            assert_eq!(flow.t_fixed(j), x[flow.index(OFFSET_T, j)]);
            // energy at the first point switches it on everywhere
            assert!(flow.do_energy(j));
        }
    }

    #[test]
    fn test_finalize_relocates_fixed_point() {
        let mut flow = methane_air_flow(11, 0.01).unwrap();
        flow.set_free_flow();
        flow.solve_energy_eqn(None);
        let x = free_flame_profile(&flow);
        flow.set_fixed_point(0.00437, 900.0);
        flow.finalize(&x).unwrap();
        let (zf, tf) = flow.fixed_point().unwrap();
        let j = flow.grid().positions().iter().position(|&z| z == zf).unwrap();
        assert_eq!(tf, x[flow.index(OFFSET_T, j)]);
        let t_before = x[flow.index(OFFSET_T, j - 1)];
        assert!((t_before - 900.0) * (tf - 900.0) <= 0.0);

        // already on the grid: nothing moves
        flow.finalize(&x).unwrap();
        assert_eq!(flow.fixed_point(), Some((zf, tf)));
    }

    #[test]
    fn test_fixed_point_ignored_for_stagnation_flow() {
        let mut flow = methane_air_flow(11, 0.01).unwrap();
        flow.set_axisymmetric_flow();
        let x = counterflow_profile(&flow);
        flow.set_fixed_point(0.00437, 900.0);
        flow.finalize(&x).unwrap();
        assert_eq!(flow.fixed_point(), Some((0.00437, 900.0)));
    }

    #[test]
    fn test_jacobian_flag() {
        let mut flow = methane_air_flow(5, 0.01).unwrap();
        flow.mark_jacobian_current();
        flow.solve_energy_eqn(None);
        assert!(flow.needs_jacobian_update());
        flow.mark_jacobian_current();
        // no change, no new Jacobian
        flow.solve_energy_eqn(Some(3));
        assert!(!flow.needs_jacobian_update());
        flow.fix_temperature(Some(3));
        assert!(flow.needs_jacobian_update());
        flow.mark_jacobian_current();
        flow.set_transport_mode(TransportMode::Multicomponent);
        assert!(flow.needs_jacobian_update());
        flow.mark_jacobian_current();
        flow.set_transport(Box::new(ConstantTransport::new(5, 1e-5, 0.02, 1e-5)));
        assert!(flow.needs_jacobian_update());
        assert_eq!(flow.transport_model(), "constant");
    }

    #[test]
    fn test_emissivities() {
        let mut flow = methane_air_flow(3, 0.01).unwrap();
        flow.set_boundary_emissivities(0.2, 0.8).unwrap();
        assert_eq!(flow.left_emissivity(), 0.2);
        assert_eq!(flow.right_emissivity(), 0.8);
        assert!(matches!(
            flow.set_boundary_emissivities(1.2, 0.5),
            Err(FlowError::InvalidEmissivity(_))
        ));
        assert!(flow.set_boundary_emissivities(0.5, -0.1).is_err());
        assert_eq!(flow.left_emissivity(), 0.2);
    }

    #[test]
    fn test_pinned_temperature() {
        let mut flow = methane_air_flow(3, 0.01).unwrap();
        flow.solve_energy_eqn(None);
        flow.set_temperature(1, 1500.0);
        assert_eq!(flow.t_fixed(1), 1500.0);
        assert!(!flow.do_energy(1));
        assert!(flow.do_energy(0));
    }

    #[test]
    fn test_solution_table() {
        let mut flow = methane_air_flow(4, 0.01).unwrap();
        flow.set_free_flow();
        let x = counterflow_profile(&flow);
        let text = flow.solution_table(&x);
        assert!(text.contains("Pressure"));
        assert!(text.contains("velocity"));
        assert!(text.contains("CH4"));
        assert!(text.contains("N2"));
        // spread rate and eigenvalue carry no equation in a free flame
        assert!(!text.contains("spread_rate"));
        assert!(!text.contains("lambda"));
        assert!(!text.contains("radiative"));

        flow.set_axisymmetric_flow();
        flow.enable_radiation(true);
        let mut r = vec![0.0; x.len()];
        let mut mask = vec![false; x.len()];
        flow.eval(None, &x, &mut r, &mut mask, 0.0).unwrap();
        let text = flow.solution_table(&x);
        assert!(text.contains("spread_rate"));
        assert!(text.contains("radiative heat loss"));
    }

    #[test]
    fn test_soot_columns_are_labelled_with_moment_names() {
        let flow = sooting_flow(3, 0.01).unwrap();
        let x = vec![0.0; flow.layout().size()];
        let text = flow.solution_table(&x);
        assert!(text.contains("S0 (M0)"));
        assert!(text.contains("S1 (M1)"));
    }
}
