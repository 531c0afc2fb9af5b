#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod Flow1D;
#[allow(non_snake_case)]
pub mod GasModels;
#[allow(non_snake_case)]
pub mod Utils;
pub mod settings;

use Examples::flame_examples::flame_examples;
use Utils::logger::init_logger;
use log::LevelFilter;

pub fn main() {
    if let Err(e) = init_logger(LevelFilter::Info, None) {
        println!("{}", e);
    }
    let task: usize = 0;
    flame_examples(task);
}
