use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

const ENC_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;

#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(ENC_PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))?;
    Ok(appender)
}

/// Builds the rolling-file configuration: `app.log` for the root logger, `audit.log` and
/// `metrics.log` for the `bookstore::audit` / `bookstore::metrics` targets, and optionally
/// `dev6.log` for developer traces.
///
/// # Errors
/// Returns an error if the directory or an appender cannot be created.
pub fn build_config(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<u32>,
    enable_dev6: bool,
) -> Result<Config, Box<dyn std::error::Error>> {
    let base = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    std::fs::create_dir_all(&base)?;
    let keep = retention.unwrap_or(7);
    let lvl = parse_level(level);
    let mut builder = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("audit", Box::new(rolling(&base, "audit", keep)?)))
        .appender(Appender::builder().build("metrics", Box::new(rolling(&base, "metrics", keep)?)))
        .logger(Logger::builder().appender("audit").additive(false).build("bookstore::audit", lvl))
        .logger(Logger::builder().appender("metrics").additive(false).build("bookstore::metrics", lvl));
    if enable_dev6 {
        builder = builder
            .appender(Appender::builder().build("dev6", Box::new(rolling(&base, "dev6", keep)?)))
            .logger(
                Logger::builder()
                    .appender("dev6")
                    .additive(false)
                    .build("bookstore::dev6", LevelFilter::Trace),
            );
    } else {
        builder = builder.logger(Logger::builder().additive(false).build("bookstore::dev6", LevelFilter::Off));
    }
    Ok(builder.build(Root::builder().appender("app").build(lvl))?)
}

/// Configure logging globally for the process. A second call in the same process is
/// ignored by log4rs; the error is logged and swallowed.
pub fn configure_logging(dir: Option<&Path>, level: Option<&str>, retention: Option<u32>, enable_dev6: bool) {
    match build_config(dir, level, retention, enable_dev6) {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                log::debug!("logger already initialized: {e}");
            }
        }
        Err(e) => eprintln!("failed to configure logging: {e}"),
    }
}

/// Configure logging for the report runner. `dir` and `level` come from the resolved
/// config; retention and the dev6 appender from `BOOKSTORE_LOG_RETENTION` and
/// `BOOKSTORE_DEV6`.
pub fn configure_from_env(dir: Option<&Path>, level: Option<&str>) {
    let retention = std::env::var("BOOKSTORE_LOG_RETENTION").ok().and_then(|s| s.trim().parse::<u32>().ok());
    let dev6_enabled = std::env::var("BOOKSTORE_DEV6").is_ok_and(|s| env_flag(&s));
    configure_logging(dir, level, retention, dev6_enabled);
}

fn env_flag(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_defaults_to_info() {
        assert_eq!(parse_level(None), LevelFilter::Info);
        assert_eq!(parse_level(Some("WARN")), LevelFilter::Warn);
        assert_eq!(parse_level(Some("bogus")), LevelFilter::Info);
    }

    #[test]
    fn build_config_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let cfg = build_config(Some(&logs), Some("debug"), Some(2), true);
        assert!(cfg.is_ok());
        assert!(logs.is_dir());
    }

    #[test]
    fn env_flag_accepts_common_truthy_values() {
        assert!(env_flag("1"));
        assert!(env_flag(" TRUE "));
        assert!(env_flag("yes"));
        assert!(!env_flag("0"));
        assert!(!env_flag(""));
    }
}
