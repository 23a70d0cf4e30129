use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the global fmt subscriber, filtered by `LOTTERY_LOG` (default `info`).
///
/// Safe to call repeatedly; only the first call has an effect, and an already
/// installed subscriber is left in place.
pub fn setup_logger() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("LOTTERY_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}
