//! Process wide log output.
//!
//! The library only emits `tracing` events. Binaries and tests call [`init`]
//! to get them printed; the default directive keeps the warning about numeric
//! values stored as text (target `oppsql::numeric`) quiet.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVE: &str = "info,oppsql::numeric=error";

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install the subscriber. Only the first call has an effect, later calls
/// return whether that first installation succeeded.
///
/// `RUST_LOG` takes precedence over `directive`, which in turn falls back to
/// [`DEFAULT_DIRECTIVE`].
pub fn init(directive: Option<&str>) -> bool {
    *INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(directive.unwrap_or(DEFAULT_DIRECTIVE)))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok()
    })
}
