//! # Savdo Terminal Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Savdo POS Terminal                               │
//! │                                                                         │
//! │   USB scanner (keyboard wedge) ──┐                                      │
//! │                                  ├──► stdin ──► repl ──► stdout         │
//! │   Cashier keyboard ──────────────┘                │                     │
//! │                                                   ▼                     │
//! │                                  savdo-core (cart, scan, voice, view)   │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │                                  savdo-client ──► storefront REST API   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // The actual setup is in lib.rs for better testability
    match savdo_terminal::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("savdo-terminal: {e}");
            ExitCode::FAILURE
        }
    }
}
