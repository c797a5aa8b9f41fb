//! Tracing setup.

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use delegate_config::LoggingConfig;

/// Initialize tracing. Console output goes to stderr so stdout carries only
/// results. The returned guard must live until exit to flush the file log.
pub(crate) fn init_tracing(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("invalid log level '{}'", config.level))?,
    };

    let (file_writer, guard) = match config.directory_path() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("delegate")
                .filename_suffix("log")
                .max_log_files(30)
                .build(&dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let json = config.is_json();
    tracing_subscriber::registry()
        .with(env_filter)
        .with((!json).then(|| fmt::layer().with_target(true).with_writer(std::io::stderr)))
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with(file_writer.map(|writer| fmt::layer().with_writer(writer).with_ansi(false)))
        .try_init()
        .context("tracing already initialized")?;

    Ok(guard)
}
