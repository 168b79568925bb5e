//! # State Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Session                                                        │   │
//! │  │  id, started_at, ClientConfig, Arc<dyn Backend>                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  PosState                                                       │   │
//! │  │  Arc<Mutex<PosStore>>  cart, customer, business type, margin    │   │
//! │  │  Arc<AtomicU64>        lookup generation                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod pos;
mod session;

pub use pos::{LookupTicket, PosState, PosStore};
pub use session::Session;
