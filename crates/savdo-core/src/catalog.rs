//! SKU and barcode matching over a list of variants.
//!
//! The backend search endpoint is fuzzy, so the client narrows its results
//! locally: an exact SKU match (ignoring case) beats a substring match.

use crate::types::ProductVariant;

/// Finds a variant by SKU, exact match first, then substring.
///
/// ```rust
/// # use savdo_core::{catalog::find_by_sku, Money, ProductVariant, VariantAttributes};
/// # fn v(id: i64, sku: &str) -> ProductVariant {
/// #     ProductVariant { id, product_id: id, sku: sku.into(), price: Money::zero(),
/// #         cost_price: Money::zero(), stock_quantity: 0,
/// #         attributes: VariantAttributes::default(), barcode_aliases: vec![], product: None }
/// # }
/// let variants = vec![v(1, "COLA-1L-PACK-6"), v(2, "COLA-1L")];
///
/// assert_eq!(find_by_sku(&variants, "cola-1l").map(|v| v.id), Some(2));
/// assert_eq!(find_by_sku(&variants, "PACK-6").map(|v| v.id), Some(1));
/// ```
pub fn find_by_sku<'a>(variants: &'a [ProductVariant], sku: &str) -> Option<&'a ProductVariant> {
    let wanted = sku.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    variants
        .iter()
        .find(|v| v.sku.to_lowercase() == wanted)
        .or_else(|| {
            variants
                .iter()
                .find(|v| v.sku.to_lowercase().contains(&wanted))
        })
}

/// Finds a variant whose alias list contains `code` exactly.
pub fn find_by_barcode<'a>(
    variants: &'a [ProductVariant],
    code: &str,
) -> Option<&'a ProductVariant> {
    let code = code.trim();
    variants.iter().find(|v| v.has_barcode(code))
}

pub fn find_by_id(variants: &[ProductVariant], id: i64) -> Option<&ProductVariant> {
    variants.iter().find(|v| v.id == id)
}
