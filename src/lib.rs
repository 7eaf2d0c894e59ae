pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::error::{GraphError, GraphResult};
pub use crate::core::graph::{Project, ProjectReport};

/// Structured logging to stderr. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,multiloader_lib=debug")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
