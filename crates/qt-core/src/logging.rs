//! Logging setup for strategy processes.
//!
//! Console output is human-readable. When a log directory is configured, a
//! second layer writes JSON lines to `<dir>/<module_name>.<date>`, one file per
//! day, so order and fill events can be grepped or loaded per strategy.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `log_level` when set. A second call is reported on
/// stderr and otherwise ignored, so tests sharing a process can call it freely.
pub fn init_logging(log_level: &str, log_dir: Option<&str>, module_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // Callbacks run on the pinned strategy thread; its name makes that visible.
    let console = fmt::layer().with_target(false).with_thread_names(true);

    let file = log_dir.map(|dir| {
        fmt::layer()
            .json()
            .with_current_span(false)
            .with_thread_names(true)
            .with_writer(tracing_appender::rolling::daily(dir, module_name))
    });

    let installed = tracing_subscriber::registry().with(filter).with(console).with(file).try_init();
    if let Err(e) = installed {
        eprintln!("[{module_name}] logging already initialized: {e}");
    }
}
