//! Logger setup shared by every entry point.
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger,
    TermLogger, TerminalMode, WriteLogger,
};
use std::{
    fs::{self, OpenOptions},
    path::Path,
};

use crate::error::Result;

/// Initialize terminal logging plus an append-only log file in `logs_dir`.
///
/// The log file is optional: if it cannot be opened the terminal logger is
/// still installed and the failure is reported on stderr.
pub fn initialize_logger(
    debug: bool,
    logs_dir: &Path,
    file_name: &str,
) -> Result<()> {
    let filter = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let config = ConfigBuilder::new()
        .add_filter_allow_str("releasewatch")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        filter,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    let log_path = logs_dir.join(file_name);

    let file = fs::create_dir_all(logs_dir).and_then(|_| {
        OpenOptions::new().create(true).append(true).open(&log_path)
    });

    match file {
        Ok(file) => loggers.push(WriteLogger::new(filter, config, file)),
        Err(e) => eprintln!(
            "failed to open log file {}: {}",
            log_path.display(),
            e
        ),
    }

    CombinedLogger::init(loggers)?;

    Ok(())
}
