use crate::error::Result;
use colored::Colorize;
use log::LevelFilter;
use std::io::Write;

/// Initialize `env_logger` at `level`.
///
/// Directives from `RUST_LOG` are applied on top, so
/// `RUST_LOG=query_diff=trace` still works with `--log-level warn`.
pub fn init_logger(level: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.parse_default_env();

    builder.format(|buf, record| {
        let level = record.level();
        let colored_level = match level {
            log::Level::Error => level.to_string().red(),
            log::Level::Warn => level.to_string().yellow(),
            log::Level::Info => level.to_string().green(),
            log::Level::Debug => level.to_string().blue(),
            log::Level::Trace => level.to_string().purple(),
        };
        writeln!(
            buf,
            "{} [{}] {}",
            record.target().cyan(),
            colored_level,
            record.args()
        )
    });

    builder.try_init()?;
    Ok(())
}
