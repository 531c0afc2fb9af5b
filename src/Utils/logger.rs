//! Logging sink for the binary and for long interactive runs.
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// Installs a terminal logger at `level` and, if `log_file` is given, a file logger
/// that records everything down to `debug`. Fails if a logger is already installed
/// or the file cannot be created.
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> Result<(), String> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        let file = File::create(path)
            .map_err(|e| format!("failed to create log file '{}': {}", path.display(), e))?;
        let config = ConfigBuilder::new().set_time_format_rfc3339().build();
        loggers.push(WriteLogger::new(LevelFilter::Debug, config, file));
    }
    CombinedLogger::init(loggers).map_err(|e| format!("logger already installed: {}", e))
}
