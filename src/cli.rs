use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "kamoshika")]
#[command(
    author,
    version,
    about = "Send one request to several servers and diff their responses"
)]
pub struct Cli {
    /// Case id of the request to send
    #[clap(required_unless_present = "init")]
    pub case_id: Option<String>,

    /// Configuration file path
    #[clap(short, long, default_value = "kamoshika.toml")]
    pub config: String,

    /// Directory the responses are written to
    #[clap(short, long, default_value = "out")]
    pub out: String,

    /// Minimum log level
    #[clap(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Generate the configuration file if it doesn't exist
    #[clap(long, default_value_t = false)]
    pub init: bool,

    /// Stop after post processing instead of launching the diff viewer
    #[clap(long, default_value_t = false)]
    pub no_viewer: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            // the log facade has nothing above error
            LogLevel::Fatal | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}
