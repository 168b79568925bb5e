//! # savdo-client: Storefront Backend Client
//!
//! Typed access to the Savdo REST backend, plus the client-side
//! configuration and session token that go with it.
//!
//! ## Module Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         savdo-client Modules                            │
//! │                                                                         │
//! │  ┌─────────────┐     ┌─────────────┐     ┌─────────────┐               │
//! │  │   api.rs    │     │  http.rs    │     │  token.rs   │               │
//! │  │ ─────────── │     │ ─────────── │     │ ─────────── │               │
//! │  │ Service     │◄────│ HttpBackend │────►│ TokenStore  │               │
//! │  │ traits      │     │ (reqwest)   │     │ bearer file │               │
//! │  └─────────────┘     └──────┬──────┘     └─────────────┘               │
//! │                             │                                           │
//! │                      ┌──────▼──────┐     ┌─────────────┐               │
//! │                      │   dto.rs    │     │  config.rs  │               │
//! │                      │ ─────────── │     │ ─────────── │               │
//! │                      │ wire JSON ⇄ │     │ ClientConfig│               │
//! │                      │ core types  │     │ TOML + env  │               │
//! │                      └─────────────┘     └─────────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use savdo_client::{Authenticator, ClientConfig, HttpBackend, VariantCatalog};
//!
//! # async fn run() -> savdo_client::ClientResult<()> {
//! let config = ClientConfig::load_or_default(None);
//! let backend = HttpBackend::from_config(&config)?;
//! backend.login("kassir", "parol").await?;
//!
//! if let Some(variant) = backend.find_by_barcode("4780000000010").await? {
//!     println!("{} {}", variant.display_name(), variant.price);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
mod dto;
pub mod error;
pub mod http;
pub mod token;

pub use api::{
    Authenticator, Backend, CheckoutService, CustomerDirectory, NewProduct, ProductAdmin, SaleReceipt,
    SemanticSearch, SettingsService, SignupRequest, TenantProfile, TenantUpdate, VariantCatalog,
};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use token::{StoredToken, TokenStore};
