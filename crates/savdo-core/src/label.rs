//! QR shelf and box labels.
//!
//! The QR payload is the short JSON that [`LabelPayload::parse`] reads back
//! at the till: `{"s": sku, "v": "<variant id>", "p": pack}`. Keys are one
//! letter so the code stays small enough for cheap 2D scanners.
//!
//! [`LabelPayload::parse`]: crate::smart_scan::LabelPayload::parse

use serde::Serialize;

use crate::money::Money;
use crate::types::ProductVariant;

#[derive(Serialize)]
struct QrPayload<'a> {
    s: &'a str,
    v: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    p: Option<u32>,
}

/// Encodes the QR payload for a variant, optionally as a pack label.
pub fn encode_qr_payload(variant: &ProductVariant, pack_qty: Option<u32>) -> String {
    let payload = QrPayload {
        s: &variant.sku,
        v: variant.id.to_string(),
        p: pack_qty.filter(|&n| n > 1),
    };
    serde_json::to_string(&payload).unwrap_or_default()
}

/// Everything printed on one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfLabel {
    pub title: String,
    pub sku: String,
    pub price: Money,
    pub qr_payload: String,
}

impl ShelfLabel {
    pub fn for_variant(variant: &ProductVariant, pack_qty: Option<u32>) -> Self {
        let pack = pack_qty.filter(|&n| n > 1);
        let title = match pack {
            Some(n) => format!("{} x{}", variant.display_name(), n),
            None => variant.display_name().to_string(),
        };
        let price = match pack {
            Some(n) => variant.price.multiply_quantity(i64::from(n)),
            None => variant.price,
        };

        ShelfLabel {
            title,
            sku: variant.sku.clone(),
            price,
            qr_payload: encode_qr_payload(variant, pack),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::test_variant;
    use crate::smart_scan::{plan_add, LabelPayload};

    #[test]
    fn test_payload_shape() {
        let variant = test_variant(1042, "COLA-1L", 12);
        assert_eq!(
            encode_qr_payload(&variant, None),
            r#"{"s":"COLA-1L","v":"1042"}"#
        );
        assert_eq!(
            encode_qr_payload(&variant, Some(6)),
            r#"{"s":"COLA-1L","v":"1042","p":6}"#
        );
    }

    #[test]
    fn test_printed_label_scans_back_as_pack() {
        let variant = test_variant(7, "COLA-1L", 12);
        let label = ShelfLabel::for_variant(&variant, Some(12));

        let parsed = LabelPayload::parse(&label.qr_payload).unwrap();
        assert_eq!(parsed.sku.as_deref(), Some("COLA-1L"));
        assert_eq!(parsed.variant_id, Some(7));

        let plan = plan_add(&variant, parsed.pack_qty);
        assert_eq!(plan.quantity, 12);
        assert_eq!(label.price, Money::from_major(144));
        assert_eq!(label.title, "Product 7 x12");
    }
}
