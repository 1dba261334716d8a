use std::io::Write;

use log::LevelFilter;

/// Resolve the log level: explicit value first, then `RUST_LOG`, then `info`.
pub fn resolve_level(level: Option<&str>) -> LevelFilter {
    level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(LevelFilter::Info)
}

/// Install the global logger. Safe to call more than once; later calls are ignored.
pub fn init_logging(level: Option<&str>) {
    let log_level = resolve_level(level);
    let result = env_logger::Builder::new()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5} {}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
    if result.is_ok() {
        log::info!("logger initialized (level: {})", log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_level_wins() {
        assert_eq!(resolve_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(resolve_level(Some("warn")), LevelFilter::Warn);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(Some("error"));
        init_logging(Some("error"));
    }
}
