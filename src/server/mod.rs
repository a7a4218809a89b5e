// Server module entry
// Binds the listener, runs the accept loop and handles shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::Arc;

use crate::config::{AppState, Config};
use crate::logger;

// Re-export commonly used items
pub use listener::create_listener;
pub use server_loop::start_server_loop;

/// Run the accounts server until SIGINT/SIGTERM.
///
/// The store is created here and dropped when this returns.
pub async fn run(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = create_listener(addr)?;
    let state = Arc::new(AppState::new(cfg));

    logger::log_server_start(&addr, &state.config);

    start_server_loop(listener, Arc::clone(&state), signal::shutdown_signal()).await;

    let discarded = if state.store.is_empty().await {
        None
    } else {
        Some(state.store.len().await)
    };
    logger::log_shutdown(discarded);
    Ok(())
}
