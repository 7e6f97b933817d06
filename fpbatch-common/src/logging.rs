//! Tracing subscriber setup shared by the binaries

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber writing to standard error
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies to the
/// crates listed in `targets`. Output goes to standard error so standard
/// output stays free for user-facing messages.
pub fn init_logging(targets: &[&str], default_level: &str) {
    init_logging_with_writer(targets, default_level, std::io::stderr);
}

/// Install the global subscriber with a custom writer
///
/// Used when something else shares the terminal (a progress bar) and log
/// lines must be coordinated with it.
pub fn init_logging_with_writer<W>(targets: &[&str], default_level: &str, writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let fallback = targets
        .iter()
        .map(|t| format!("{}={}", t, default_level))
        .collect::<Vec<_>>()
        .join(",");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (e.g. in tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .try_init();
}
