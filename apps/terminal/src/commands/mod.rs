//! # Terminal Commands
//!
//! Everything a cashier can do at the till, as async functions over a
//! [`Session`](crate::state::Session).
//!
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── account.rs   ◄─── Signup and tenant settings
//! ├── scan.rs      ◄─── Barcode / label scans with pack detection
//! ├── voice.rs     ◄─── Spoken "5 ta cola qo'sh" commands
//! ├── cart.rs      ◄─── Quantities, discounts, prices, customer
//! ├── checkout.rs  ◄─── Payment and receipt
//! └── product.rs   ◄─── Typed search, quick-add, shelf labels
//! ```
//!
//! Every command returns `TerminalResult<T>`; the REPL renders `Ok` values
//! and prints `TerminalError` as `[Code] message`.

pub mod account;
pub mod cart;
pub mod checkout;
pub mod product;
pub mod scan;
pub mod voice;
