use super::flow_api::FlowError;

/// Axial positions of the grid points and the spacings between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    z: Vec<f64>,
    dz: Vec<f64>,
}

impl Grid {
    /// `z_j = j / points`
    pub fn uniform(points: usize) -> Self {
        let z: Vec<f64> = (0..points).map(|j| j as f64 / points as f64).collect();
        let dz = z.windows(2).map(|w| w[1] - w[0]).collect();
        Self { z, dz }
    }

    /// Installs a new position sequence; it must be non-empty and strictly increasing.
    pub fn setup(&mut self, z: &[f64]) -> Result<(), FlowError> {
        if z.is_empty() {
            return Err(FlowError::NoPoints);
        }
        for j in 1..z.len() {
            if !(z[j] > z[j - 1]) {
                return Err(FlowError::NonMonotonicGrid {
                    index: j,
                    value: z[j],
                });
            }
        }
        self.z = z.to_vec();
        self.dz = z.windows(2).map(|w| w[1] - w[0]).collect();
        Ok(())
    }

    /// Changes the number of points keeping the existing ones in order. Added points
    /// continue the last spacing so the sequence stays increasing until the next
    /// `setup`.
    pub fn resize(&mut self, points: usize) {
        if points < self.z.len() {
            self.z.truncate(points);
        } else {
            let step = self.dz.last().copied().unwrap_or(1.0);
            while self.z.len() < points {
                let next = self.z.last().map_or(0.0, |z| z + step);
                self.z.push(next);
            }
        }
        self.dz = self.z.windows(2).map(|w| w[1] - w[0]).collect();
    }

    pub fn points(&self) -> usize {
        self.z.len()
    }

    #[inline]
    pub fn z(&self, j: usize) -> f64 {
        self.z[j]
    }

    #[inline]
    pub fn dz(&self, j: usize) -> f64 {
        self.dz[j]
    }

    pub fn positions(&self) -> &[f64] {
        &self.z
    }

    /// position of `j` scaled to [0, 1] over the domain
    pub fn relative_position(&self, j: usize) -> f64 {
        let n = self.z.len();
        if n < 2 {
            return 0.0;
        }
        (self.z[j] - self.z[0]) / (self.z[n - 1] - self.z[0])
    }
}

/// Piecewise-linear interpolation in an increasing table, clamped at both ends.
pub fn linear_interp(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    match xs.len() {
        0 => 0.0,
        _ if x <= xs[0] => ys[0],
        n if x >= xs[n - 1] => ys[n - 1],
        _ => {
            let i = xs.partition_point(|&xi| xi <= x);
            let (x0, x1) = (xs[i - 1], xs[i]);
            let (y0, y1) = (ys[i - 1], ys[i]);
            y0 + (y1 - y0) * (x - x0) / (x1 - x0)
        }
    }
}
