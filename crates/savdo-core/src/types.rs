//! # Domain Types
//!
//! Core domain types used throughout Savdo POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ProductVariant  │   │    Customer     │   │  BusinessType   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, sku        │   │  id, name       │   │  Retail,Fashion │       │
//! │  │  price (Money)  │   │  price_tier     │   │  Horeca,Cafe    │       │
//! │  │  attributes     │   │  balance        │   │  Kitchen        │       │
//! │  │  barcode_aliases│   │  max_debt       │   │  Wholesale      │       │
//! │  │  product (ref)  │   └─────────────────┘   │  Jewelry        │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  DiscountRate   │   │ PaymentMethod   │       │
//! │  │  bps (u32)      │   │  bps (u32)      │   │  Cash, Card,    │       │
//! │  │  1200 = 12%     │   │  2000 = 20%     │   │  Debt, Payme... │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Variants are snapshots: the cart copies the variant when a line is created
//! and never refreshes it. Stale prices are accepted until the next add.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Rates
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 1200 bps = 12% (Uzbek VAT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage, for values arriving from the
    /// backend as decimals.
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate(percentage_to_bps(pct))
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Line discount as a percentage in basis points (0..=10000).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    pub fn from_percentage(pct: f64) -> Self {
        DiscountRate(percentage_to_bps(pct))
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

fn percentage_to_bps(pct: f64) -> u32 {
    if !pct.is_finite() || pct <= 0.0 {
        return 0;
    }
    (pct * 100.0).round() as u32
}

// =============================================================================
// Business Type
// =============================================================================

/// The tenant's line of business.
///
/// Selects both the checkout view and the pricing rules. Set once per
/// session from the tenant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    Retail,
    Fashion,
    Horeca,
    Wholesale,
    Jewelry,
    Cafe,
    Kitchen,
}

impl BusinessType {
    pub const ALL: [BusinessType; 7] = [
        BusinessType::Retail,
        BusinessType::Fashion,
        BusinessType::Horeca,
        BusinessType::Wholesale,
        BusinessType::Jewelry,
        BusinessType::Cafe,
        BusinessType::Kitchen,
    ];

    /// Hospitality businesses add a service charge on top of the subtotal.
    pub fn applies_service_charge(&self) -> bool {
        matches!(
            self,
            BusinessType::Horeca | BusinessType::Cafe | BusinessType::Kitchen
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessType::Retail => "retail",
            BusinessType::Fashion => "fashion",
            BusinessType::Horeca => "horeca",
            BusinessType::Wholesale => "wholesale",
            BusinessType::Jewelry => "jewelry",
            BusinessType::Cafe => "cafe",
            BusinessType::Kitchen => "kitchen",
        }
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        BusinessType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "business_type".to_string(),
                allowed: BusinessType::ALL.iter().map(|t| t.to_string()).collect(),
            })
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Transfer,
    /// Sale recorded against the customer's balance.
    Debt,
    Mixed,
    Payme,
    Click,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 7] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Transfer,
        PaymentMethod::Debt,
        PaymentMethod::Mixed,
        PaymentMethod::Payme,
        PaymentMethod::Click,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Debt => "debt",
            PaymentMethod::Mixed => "mixed",
            PaymentMethod::Payme => "payme",
            PaymentMethod::Click => "click",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.to_string()).collect(),
            })
    }
}

// =============================================================================
// Variant Attributes
// =============================================================================

/// Typed view of a variant's attribute bag.
///
/// The backend stores attributes as a free-form JSON object whose keys differ
/// by business type (retail: expiry, fashion: size/color, wholesale: pack
/// size, jewelry: purity/weight). Well-known keys are lifted into fields;
/// everything else stays in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantAttributes {
    /// Units per pack. Read from `pack_size`, `pack_qty` or `packSize`.
    pub pack_size: Option<u32>,
    pub size: Option<String>,
    pub color: Option<String>,
    #[ts(type = "string | null")]
    pub expiry_date: Option<NaiveDate>,
    pub weight_grams: Option<u32>,
    /// Gold/silver fineness, e.g. "585".
    pub purity: Option<String>,
    #[ts(type = "Record<string, unknown>")]
    pub extra: BTreeMap<String, Value>,
}

/// Pack multiplier keys, highest precedence first.
const PACK_KEYS: [&str; 3] = ["pack_size", "pack_qty", "packSize"];

impl VariantAttributes {
    /// Lifts a raw attribute object into typed fields.
    ///
    /// Values that do not parse (a non-numeric pack size, a malformed date)
    /// are treated as absent rather than failing the whole variant.
    pub fn from_json_map(map: &serde_json::Map<String, Value>) -> Self {
        let mut attrs = VariantAttributes {
            pack_size: PACK_KEYS
                .iter()
                .find_map(|k| map.get(*k).and_then(positive_u32)),
            ..VariantAttributes::default()
        };

        for (key, value) in map {
            match key.as_str() {
                k if PACK_KEYS.contains(&k) => {}
                "size" => attrs.size = text(value),
                "color" => attrs.color = text(value),
                "expiry_date" | "expiry" => {
                    attrs.expiry_date = text(value)
                        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok());
                }
                "weight" | "weight_grams" => attrs.weight_grams = positive_u32(value),
                "purity" => attrs.purity = text(value),
                _ => {
                    attrs.extra.insert(key.clone(), value.clone());
                }
            }
        }

        attrs
    }

    /// Explicit pack multiplier, when the attribute says this variant is a
    /// bulk unit.
    pub fn explicit_pack_size(&self) -> Option<u32> {
        self.pack_size.filter(|&n| n > 1)
    }
}

fn positive_u32(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f > 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    u32::try_from(n).ok().filter(|&n| n > 0)
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// Product Variant
// =============================================================================

/// Back-reference from a variant to its parent product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductRef {
    pub id: i64,
    pub name: String,
    pub tax_rate: TaxRate,
}

/// A purchasable SKU-level version of a product (size, color, pack).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,
    /// Stock Keeping Unit, unique per tenant.
    pub sku: String,
    pub price: Money,
    pub cost_price: Money,
    pub stock_quantity: i64,
    pub attributes: VariantAttributes,
    /// Alternate barcodes printed on the packaging (EAN-13, UPC-A, ...).
    pub barcode_aliases: Vec<String>,
    pub product: Option<ProductRef>,
}

impl ProductVariant {
    /// Tax rate inherited from the parent product, zero when unknown.
    pub fn tax_rate(&self) -> TaxRate {
        self.product
            .as_ref()
            .map(|p| p.tax_rate)
            .unwrap_or_default()
    }

    /// Name for receipts and scan feedback; falls back to the SKU.
    pub fn display_name(&self) -> &str {
        self.product
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or(&self.sku)
    }

    pub fn has_barcode(&self, code: &str) -> bool {
        self.barcode_aliases.iter().any(|b| b == code)
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    #[default]
    Retail,
    Vip,
    Wholesaler,
}

/// A customer account. Required for wholesale checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub price_tier: PriceTier,
    /// Positive = credit, negative = debt owed to the business.
    pub balance: Money,
    pub credit_limit: Money,
    pub max_debt_allowed: Money,
}

impl Customer {
    pub fn debt(&self) -> Money {
        if self.balance.is_negative() {
            self.balance.abs()
        } else {
            Money::zero()
        }
    }

    /// True once the outstanding debt has reached the allowed maximum.
    pub fn debt_limit_reached(&self) -> bool {
        self.balance.is_negative() && self.balance.abs() >= self.max_debt_allowed
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
