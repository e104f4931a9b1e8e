//! Command-line argument parsing for the `kira` binary.

use clap::{Parser, ValueEnum};

/// Struct containing the CLI configuration for Kira.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a Kira source file to run. Omit to start the interactive shell.
    #[arg(index = 1)]
    pub file: Option<std::path::PathBuf>,

    /// Specify the log level of the interpreter.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for specifying the log level of Kira.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// Also log warnings.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the interpreter, e.g.,
    /// which file is being run.
    #[value(alias("2"))]
    Info,

    /// Log every pipeline stage (lexing, parsing, evaluation) as it happens.
    #[value(alias("3"))]
    Debug,

    /// Log extra, very verbose detail. Noisy; mostly useful when developing
    /// the interpreter itself.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
