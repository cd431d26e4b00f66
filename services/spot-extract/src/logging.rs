//! Log output for the command-line tool.

use tracing::Subscriber;
use tracing_subscriber::fmt::{fmt, MakeWriter};
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG` when set, else from `log_level`.
pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Formatting subscriber writing events that pass `filter` to `writer`.
///
/// The tool passes stderr, keeping stdout free.
pub fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
        .finish()
}
