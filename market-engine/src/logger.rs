//! Logging infrastructure
//!
//! Structured logging setup for development and production:
//! - Console output, pretty in development, JSON in production
//! - Optional daily rotating application log files
//! - Permanent wallet-audit log files: everything the ledger emits under
//!   the `ledger` target goes to its own appender and is never mixed with
//!   rotating application logs

use std::fs;
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Initialize the logging system
///
/// # Arguments
/// * `level` - log level used when `RUST_LOG` is unset (e.g. "info")
/// * `json_format` - JSON output (production) vs pretty output (development)
/// * `log_dir` - optional directory for file logging
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<BoxedLayer<_>> = Vec::new();

    // Console layer
    if json_format {
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        );
    }

    // File layers
    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        let app_log_dir = log_dir.join("app");
        let ledger_log_dir = log_dir.join("ledger");
        fs::create_dir_all(&app_log_dir)?;
        fs::create_dir_all(&ledger_log_dir)?;

        // Application logs rotate daily
        let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
        layers.push(file_layer(app_log, json_format, |target| {
            target != "ledger"
        }));

        // The wallet audit trail is never rotated away
        let ledger_log = RollingFileAppender::new(Rotation::NEVER, ledger_log_dir, "ledger.log");
        layers.push(file_layer(ledger_log, json_format, |target| {
            target == "ledger"
        }));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .init();

    Ok(())
}

/// Build one file layer with a target filter
fn file_layer<S>(
    appender: RollingFileAppender,
    json_format: bool,
    target_filter: fn(&str) -> bool,
) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let writer = std::sync::Mutex::new(appender);
    let filter =
        tracing_subscriber::filter::filter_fn(move |meta| target_filter(meta.target()));

    if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(filter)
            .boxed()
    }
}
