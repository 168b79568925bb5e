//! # Product Commands
//!
//! Typed product search, quick-add of unknown barcodes and shelf labels.
//!
//! ## Unknown Barcode Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scan 4781234567890 ──► NotFound ──► error tone                         │
//! │                                                                         │
//! │  :new 4500 Non issiq                                                    │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  NewProduct { sku = barcode = 4781234567890, stock 100,                 │
//! │               retail: expiry today + 30 days }                          │
//! │     │ POST v2/products                                                  │
//! │     ▼                                                                   │
//! │  variant added to cart (qty 1)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use savdo_client::{NewProduct, ProductAdmin, VariantCatalog};
use savdo_core::label::ShelfLabel;
use savdo_core::smart_scan::ScanFeedback;
use savdo_core::validation::{
    validate_price_cents, validate_product_name, validate_search_query, validate_sku,
};
use savdo_core::Money;
use tracing::info;

use super::scan::AddedLine;
use super::voice::{add_by_term, VoiceOutcome};
use crate::error::{TerminalError, TerminalResult};
use crate::state::Session;

/// Typed search: barcode or SKU, then the first semantic hit. Adds one.
pub async fn search_and_add(session: &Session, query: &str) -> TerminalResult<VoiceOutcome> {
    let query = validate_search_query(query)?;

    info!(query = %query, "Typed search");
    let outcome = add_by_term(session, &query, 1).await?;
    if let VoiceOutcome::NotFound { term } = &outcome {
        session
            .state
            .with_store_mut(|store| store.last_unknown_code = Some(term.clone()));
    }
    Ok(outcome)
}

/// Creates a product for the last code that matched nothing and sells one.
pub async fn quick_add(session: &Session, name: &str, price: Money) -> TerminalResult<AddedLine> {
    let name = name.trim();
    validate_product_name(name)?;
    validate_price_cents(price.cents())?;
    if !price.is_positive() {
        return Err(TerminalError::validation("price must be positive"));
    }

    let (barcode, business_type) = session
        .state
        .with_store(|store| (store.last_unknown_code.clone(), store.business_type));
    let barcode = barcode.ok_or_else(|| TerminalError::validation("No unknown barcode to add"))?;

    let product = NewProduct::quick_add(name, price, barcode.clone())
        .for_business(business_type, Utc::now().date_naive());
    let variant = session.backend.quick_add(&product).await?;
    info!(variant_id = variant.id, barcode = %barcode, "Product quick-added");

    let line_quantity = session.state.with_store_mut(|store| {
        store.cart.add_to_cart(&variant, 1)?;
        if store.last_unknown_code.as_deref() == Some(barcode.as_str()) {
            store.last_unknown_code = None;
        }
        Ok::<_, TerminalError>(store.cart.get(variant.id).map(|i| i.quantity).unwrap_or(1))
    })?;

    Ok(AddedLine {
        variant_id: variant.id,
        name: variant.display_name().to_string(),
        added: 1,
        line_quantity,
        feedback: ScanFeedback::SingleAdd,
    })
}

/// Builds a shelf label for a SKU, optionally for a pack.
pub async fn label(session: &Session, sku: &str, pack_qty: Option<u32>) -> TerminalResult<ShelfLabel> {
    validate_sku(sku)?;
    let variant = session
        .backend
        .find_by_sku(sku)
        .await?
        .ok_or_else(|| TerminalError::not_found("Product", sku))?;

    Ok(ShelfLabel::for_variant(&variant, pack_qty))
}
