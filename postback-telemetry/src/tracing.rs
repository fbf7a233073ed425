//! Tracing subscriber setup shared by the agent binary and tests.

use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes structured logging for a service binary.
///
/// Log levels are configurable via the `RUST_LOG` environment variable; when
/// unset, the given default directive is used (e.g. `"postback_agent=info"`).
///
/// # Panics
///
/// Panics if a global subscriber has already been installed. Call this once,
/// at the start of `main`.
pub fn init_tracing(default_directive: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initializes tracing for tests.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Output goes through the test writer so it is captured per test.
pub fn init_test_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}
