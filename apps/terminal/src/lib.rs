//! # Savdo Terminal Library
//!
//! The scanner-driven POS front end: a line-based loop over stdin that a
//! keyboard-wedge barcode scanner and the cashier share.
//!
//! ## Module Organization
//! ```text
//! savdo_terminal/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── repl.rs         ◄─── Line parsing, dispatch, the read loop
//! ├── render.rs       ◄─── Plain-text replies
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── pos.rs      ◄─── Cart, customer, tenant settings, lookup tickets
//! │   └── session.rs  ◄─── Session: state + backend + config
//! ├── commands/
//! │   ├── account.rs  ◄─── Signup, tenant settings
//! │   ├── scan.rs     ◄─── Scans
//! │   ├── voice.rs    ◄─── Voice commands
//! │   ├── cart.rs     ◄─── Cart manipulation
//! │   ├── checkout.rs ◄─── Payment
//! │   └── product.rs  ◄─── Search, quick-add, labels
//! └── error.rs        ◄─── TerminalError for commands
//! ```

pub mod commands;
pub mod error;
pub mod render;
pub mod repl;
pub mod state;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use savdo_client::{Authenticator, ClientConfig, HttpBackend};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use error::TerminalResult;
use state::Session;

/// Runs the terminal until stdin closes or the cashier types `:quit`.
///
/// ## Startup Sequence
/// ```text
/// 1. Initialize logging (stderr, so stdout stays the till display)
/// 2. Load config.toml + SAVDO_* overrides
/// 3. Build the HTTP backend and restore the saved token
/// 4. Logged in? pull the tenant profile (business type, margin floor)
/// 5. Hand stdin/stdout to the read loop
/// ```
pub async fn run() -> TerminalResult<()> {
    init_tracing();
    info!("Starting Savdo POS terminal");

    let config = ClientConfig::load_or_default(None);
    let backend = Arc::new(HttpBackend::from_config(&config)?);
    info!(api = %config.api.base_url, "Backend configured");

    let session = Session::new(backend, config);

    if session.backend.is_logged_in().await {
        if let Err(e) = session.refresh_profile().await {
            warn!(error = %e, "Could not load tenant profile");
        }
    } else {
        println!("Not logged in. Use :login <username> <password>");
    }
    println!("Ready. Type :help for commands.");

    let mut stdout = tokio::io::stdout();
    repl::run_loop(&session, BufReader::new(tokio::io::stdin()), &mut stdout).await?;

    info!(session_id = %session.id, "Terminal closed");
    Ok(())
}

/// Initializes the tracing subscriber for logging.
///
/// Log level can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug` - Show debug logs
/// - `RUST_LOG=savdo_client=trace` - Trace the HTTP client only
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,savdo=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
