pub mod context;
pub mod error;

pub use context::EnrichContext;
pub use error::{EnrichError, Result};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for host binaries and tests.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init();
}
