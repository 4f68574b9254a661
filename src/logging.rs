//! File-based logging for catalog-rs
//!
//! The interactive shell owns stdout, so tracing output goes to a file instead.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub const DEFAULT_LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "catalog-rs";
const DEFAULT_FILTER: &str = "catalog_rs=debug,reqwest=info,warn";

/// Initialize the logging system.
///
/// Logs are written to `<log_dir>/catalog-rs.YYYY-MM-DD` with daily rotation.
/// `RUST_LOG` overrides the default filter. The returned guard flushes pending
/// lines on drop and must be held for the lifetime of the program.
pub fn init_logging(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);

    // Non-blocking so request logging never stalls the runtime
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(log_dir = %log_dir.display(), "Logging initialized");

    Ok(guard)
}

/// Log the outcome of a catalog or auth request
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $collection:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(
                operation = $operation,
                collection = $collection,
                "API request successful"
            ),
            Err(e) => tracing::error!(
                operation = $operation,
                collection = $collection,
                kind = ?e.kind(),
                error = %e,
                "API request failed"
            ),
        }
    };
}

/// Log the start of a request with additional context
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "API request started");
    };
}
