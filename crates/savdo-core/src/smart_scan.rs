//! # Smart Scan
//!
//! The pure half of scan resolution: reading QR label payloads and deciding
//! whether a resolved variant is sold as a pack.
//!
//! ## Pack Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Label payload  {"s":"COLA-1L","p":12}        p > 1      → 12 units  │
//! │  2. Attribute      pack_size / pack_qty / packSize > 1      → n units   │
//! │  3. SKU pattern    "ITEM-PACK-24", "BOX6", "PK12"           → 24/6/12   │
//! │                    first digit run, only when 2..=999                   │
//! │  4. otherwise                                               → 1 unit    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lookup itself (payload → SKU → barcode alias) needs the network and
//! lives in the terminal's scan command.

use serde_json::Value;

use crate::types::ProductVariant;

/// Substrings in an upper-cased SKU that mark a bulk unit.
const PACK_MARKERS: [&str; 3] = ["PACK", "BOX", "PK"];

/// Largest pack size the SKU heuristic will believe.
const MAX_SKU_PACK: u32 = 999;

// =============================================================================
// Label Payload
// =============================================================================

/// Contents of a printed QR shelf or box label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelPayload {
    pub sku: Option<String>,
    pub variant_id: Option<i64>,
    pub pack_qty: Option<u32>,
}

impl LabelPayload {
    /// Parses a raw scan as a label payload.
    ///
    /// Accepts a JSON object with `s`/`sku`, optional `v` (variant id, string
    /// or number) and optional `p`/`pack_qty`/`pack_size`. Returns `None` for
    /// plain barcodes and for JSON that names neither a SKU nor a variant.
    ///
    /// ```rust
    /// use savdo_core::smart_scan::LabelPayload;
    ///
    /// let label = LabelPayload::parse(r#"{"s":"COLA-1L","p":12}"#).unwrap();
    /// assert_eq!(label.sku.as_deref(), Some("COLA-1L"));
    /// assert_eq!(label.pack_qty, Some(12));
    ///
    /// assert!(LabelPayload::parse("4780000000017").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<LabelPayload> {
        let raw = raw.trim();
        if !raw.starts_with('{') {
            return None;
        }
        let Value::Object(map) = serde_json::from_str::<Value>(raw).ok()? else {
            return None;
        };

        let sku = ["s", "sku"]
            .iter()
            .find_map(|k| map.get(*k))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let variant_id = map.get("v").and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        let pack_qty = ["p", "pack_qty", "pack_size"]
            .iter()
            .find_map(|k| map.get(*k))
            .and_then(|v| match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .and_then(|n| u32::try_from(n).ok())
            .filter(|&n| n > 0);

        if sku.is_none() && variant_id.is_none() {
            return None;
        }

        Some(LabelPayload {
            sku,
            variant_id,
            pack_qty,
        })
    }
}

// =============================================================================
// Pack Detection
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackSource {
    Payload,
    Attribute,
    SkuPattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackDetection {
    pub units: u32,
    pub source: PackSource,
}

/// Decides whether a resolved variant is a pack, and of how many units.
pub fn detect_pack(variant: &ProductVariant, payload_pack: Option<u32>) -> Option<PackDetection> {
    if let Some(units) = payload_pack.filter(|&n| n > 1) {
        return Some(PackDetection {
            units,
            source: PackSource::Payload,
        });
    }

    if let Some(units) = variant.attributes.explicit_pack_size() {
        return Some(PackDetection {
            units,
            source: PackSource::Attribute,
        });
    }

    sku_pack_size(&variant.sku).map(|units| PackDetection {
        units,
        source: PackSource::SkuPattern,
    })
}

/// Pack size implied by the SKU text alone.
///
/// ```rust
/// use savdo_core::smart_scan::sku_pack_size;
///
/// assert_eq!(sku_pack_size("ITEM-PACK-24"), Some(24));
/// assert_eq!(sku_pack_size("box6"), Some(6));
/// assert_eq!(sku_pack_size("COLA-1L"), None);
/// ```
pub fn sku_pack_size(sku: &str) -> Option<u32> {
    let upper = sku.to_uppercase();
    if !PACK_MARKERS.iter().any(|m| upper.contains(m)) {
        return None;
    }

    let digits: String = upper
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();

    digits
        .parse::<u32>()
        .ok()
        .filter(|n| (2..=MAX_SKU_PACK).contains(n))
}

// =============================================================================
// Scan Outcome
// =============================================================================

/// Audible feedback for the cashier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanFeedback {
    /// Double beep.
    PackAdd { units: u32 },
    /// Single beep.
    SingleAdd,
    /// Error tone.
    Error,
}

impl ScanFeedback {
    pub fn beeps(&self) -> u8 {
        match self {
            ScanFeedback::PackAdd { .. } => 2,
            ScanFeedback::SingleAdd => 1,
            ScanFeedback::Error => 0,
        }
    }
}

/// How a resolved variant should be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddPlan {
    pub quantity: i64,
    pub pack: Option<PackDetection>,
    pub feedback: ScanFeedback,
}

/// Turns a resolved variant into a cart add.
pub fn plan_add(variant: &ProductVariant, payload_pack: Option<u32>) -> AddPlan {
    match detect_pack(variant, payload_pack) {
        Some(pack) => AddPlan {
            quantity: i64::from(pack.units),
            pack: Some(pack),
            feedback: ScanFeedback::PackAdd { units: pack.units },
        },
        None => AddPlan {
            quantity: 1,
            pack: None,
            feedback: ScanFeedback::SingleAdd,
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::test_variant;
    use serde_json::json;

    #[test]
    fn test_sku_heuristic_pack() {
        let variant = test_variant(1, "ITEM-PACK-24", 10);
        let plan = plan_add(&variant, None);

        assert_eq!(plan.quantity, 24);
        assert_eq!(plan.feedback, ScanFeedback::PackAdd { units: 24 });
        assert_eq!(plan.pack.unwrap().source, PackSource::SkuPattern);
    }

    #[test]
    fn test_attribute_beats_sku_text() {
        let mut variant = test_variant(1, "ITEM-PACK-24", 10);
        let attrs = json!({ "pack_size": 6 });
        variant.attributes =
            crate::types::VariantAttributes::from_json_map(attrs.as_object().unwrap());

        let plan = plan_add(&variant, None);
        assert_eq!(plan.quantity, 6);
        assert_eq!(plan.pack.unwrap().source, PackSource::Attribute);
    }

    #[test]
    fn test_payload_beats_attribute() {
        let mut variant = test_variant(1, "COLA", 10);
        variant.attributes.pack_size = Some(6);

        let plan = plan_add(&variant, Some(12));
        assert_eq!(plan.quantity, 12);
        assert_eq!(plan.pack.unwrap().source, PackSource::Payload);

        // p = 1 on the label means a single unit label, fall through
        let plan = plan_add(&variant, Some(1));
        assert_eq!(plan.quantity, 6);
    }

    #[test]
    fn test_single_item() {
        let plan = plan_add(&test_variant(1, "COLA-1L", 10), None);
        assert_eq!(plan.quantity, 1);
        assert_eq!(plan.feedback, ScanFeedback::SingleAdd);
        assert_eq!(plan.feedback.beeps(), 1);
    }

    #[test]
    fn test_sku_heuristic_bounds() {
        assert_eq!(sku_pack_size("PACK-1"), None);
        assert_eq!(sku_pack_size("PACK-1000"), None);
        assert_eq!(sku_pack_size("PACK"), None);
        assert_eq!(sku_pack_size("PK12-V2"), Some(12));
        // the first digit run wins, even before the marker
        assert_eq!(sku_pack_size("7UP-BOX-24"), Some(7));
        assert_eq!(sku_pack_size("20L-BOX-4"), Some(20));
    }

    #[test]
    fn test_parse_label_variants() {
        let label = LabelPayload::parse(r#"{"s":"COLA-1L","v":"1042"}"#).unwrap();
        assert_eq!(label.variant_id, Some(1042));
        assert_eq!(label.pack_qty, None);

        let label = LabelPayload::parse(r#"{"sku":"A","pack_size":"6"}"#).unwrap();
        assert_eq!(label.sku.as_deref(), Some("A"));
        assert_eq!(label.pack_qty, Some(6));

        let label = LabelPayload::parse(r#"{"v":7}"#).unwrap();
        assert_eq!(label.sku, None);
        assert_eq!(label.variant_id, Some(7));
    }

    #[test]
    fn test_parse_rejects_non_labels() {
        assert!(LabelPayload::parse("4780000000017").is_none());
        assert!(LabelPayload::parse("{not json").is_none());
        assert!(LabelPayload::parse(r#"{"x":1}"#).is_none());
        assert!(LabelPayload::parse("[1,2]").is_none());
    }
}
