use std::fs::File;

use clap::ValueEnum;
use log::{LevelFilter, SetLoggerError};
use serde::{Deserialize, Serialize};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn _config() -> Config {
    ConfigBuilder::new()
        .set_location_level(LevelFilter::Debug)
        .build()
}

/// Log to stderr, and additionally to `log_file` when one is given.
pub fn initialize_logger(level: LogLevel, log_file: Option<File>) -> Result<(), SetLoggerError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level.to_level_filter(),
        _config(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(file) = log_file {
        loggers.push(WriteLogger::new(level.to_level_filter(), _config(), file));
    }

    CombinedLogger::init(loggers)
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;

    use super::LogLevel;

    #[test]
    fn levels_map_to_filters() {
        assert_eq!(LogLevel::Off.to_level_filter(), LevelFilter::Off);
        assert_eq!(LogLevel::Warn.to_level_filter(), LevelFilter::Warn);
        assert_eq!(LogLevel::default().to_level_filter(), LevelFilter::Info);
        assert_eq!(LogLevel::Trace.to_level_filter(), LevelFilter::Trace);
    }

    #[test]
    fn levels_deserialize_by_variant_name() {
        let level = serde_json::from_str::<LogLevel>("\"Debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
    }
}
