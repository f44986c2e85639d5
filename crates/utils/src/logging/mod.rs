use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};

static TEST_INIT: Once = Once::new();

/// Initialize the tracing system
///
/// Honours `RUST_LOG` and falls back to `info`. Output goes to stderr without
/// ANSI colouring when stderr is not a terminal.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Install a test-friendly subscriber once per process
///
/// Safe to call from every test; only the first call has an effect.
pub fn init_for_tests() {
    TEST_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer().compact())
            .try_init();
    });
}

/// Check if we're running in a TTY environment
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Emit a structured event for cache lookups
pub fn cache_event(key: &str, hit: bool, operation: &str) {
    if hit {
        debug!(
            key = %key,
            operation = %operation,
            "cache_hit"
        );
    } else {
        debug!(
            key = %key,
            operation = %operation,
            "cache_miss"
        );
    }
}
