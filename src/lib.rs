#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod Flow1D;
#[allow(non_snake_case)]
pub mod GasModels;
#[allow(non_snake_case)]
pub mod Utils;
pub mod settings;
