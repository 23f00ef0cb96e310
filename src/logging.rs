use crate::config::{LogConfig, Rotation};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn file_appender(config: &LogConfig) -> RollingFileAppender {
    match config.rotation {
        Rotation::Hourly => tracing_appender::rolling::hourly(&config.dir, &config.file),
        Rotation::Daily => tracing_appender::rolling::daily(&config.dir, &config.file),
        Rotation::Never => tracing_appender::rolling::never(&config.dir, &config.file),
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `config.level`. Keep the returned guard alive for the
/// lifetime of the process or buffered file output is lost.
pub fn init_logging(config: &LogConfig) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(file_appender(config));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        // routing fields (routing_key, stage, code) stay queryable
        registry
            .with(fmt::layer().json().with_target(true).with_writer(writer).with_ansi(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(writer).with_ansi(false))
            .with(fmt::layer().with_target(false).with_ansi(true))
            .init();
    }

    guard
}
