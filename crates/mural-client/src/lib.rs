pub mod app;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod notify;
pub mod policy;
pub mod state;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

use tracing_subscriber::{fmt, EnvFilter};

pub use app::App;
pub use config::ClientConfig;
pub use context::{AppContext, Backend};
pub use error::{ClientError, ErrorKind};
pub use view::View;

/// Install the global `fmt` subscriber. `RUST_LOG` wins over the default
/// directives. Calling this twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mural_client=debug,mural_store=info,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
