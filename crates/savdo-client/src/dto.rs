//! # Wire Types
//!
//! JSON shapes of the storefront backend and their conversion into
//! `savdo-core` types.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  backend JSON                         savdo-core                        │
//! │  ────────────                         ──────────                        │
//! │  price: 12.505 (decimal major) ─────► Money(1251)   half away from 0   │
//! │  tax_rate: 12 (percent)        ─────► TaxRate(1200) basis points       │
//! │  stock_quantity: 7.5           ─────► 7             whole units        │
//! │  attributes: {..}              ─────► VariantAttributes                 │
//! │                                                                         │
//! │  CheckoutRequest               ─────► discount_percent: 20.0           │
//! │                                       debt_amount: 160.00              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Conversion happens once, here. Nothing past this module sees a decimal.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use savdo_core::checkout::CheckoutRequest;
use savdo_core::validation::validate_price_cents;
use savdo_core::{
    BusinessType, Customer, Money, PaymentMethod, PriceTier, ProductRef, ProductVariant, TaxRate,
    VariantAttributes,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::api::{NewProduct, SaleReceipt, TenantProfile, TenantUpdate};
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Decimal Conversion
// =============================================================================

/// Decimal major units to minor units, rounding half away from zero.
pub(crate) fn to_money(amount: Decimal) -> ClientResult<Money> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| {
            minor
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .map(Money::from_cents)
        .ok_or_else(|| ClientError::Decode(format!("amount out of range: {amount}")))
}

/// A unit price: [`to_money`] plus the catalog price ceiling.
pub(crate) fn to_price(amount: Decimal) -> ClientResult<Money> {
    let price = to_money(amount)?;
    validate_price_cents(price.cents())
        .map_err(|e| ClientError::Decode(format!("price {amount}: {e}")))?;
    Ok(price)
}

fn opt_money(amount: Option<Decimal>) -> ClientResult<Money> {
    amount.map(to_money).transpose().map(Option::unwrap_or_default)
}

pub(crate) fn from_money(amount: Money) -> Decimal {
    Decimal::new(amount.cents(), 2)
}

/// Percent (`12.5`) to basis points (`1250`). Negative values are zero.
pub(crate) fn percent_to_bps(percent: Decimal) -> ClientResult<u32> {
    if percent.is_sign_negative() {
        return Ok(0);
    }
    percent
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|bps| {
            bps.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_u32()
        })
        .ok_or_else(|| ClientError::Decode(format!("percentage out of range: {percent}")))
}

pub(crate) fn bps_to_percent(bps: u32) -> Decimal {
    Decimal::new(i64::from(bps), 2)
}

/// Python's `isoformat()` may or may not carry an offset. Naive stamps are
/// taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ProductDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub variants: Vec<VariantDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductRefDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tax_rate: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariantDto {
    pub id: i64,
    pub product_id: i64,
    pub sku: String,
    pub price: Decimal,
    #[serde(default)]
    pub cost_price: Option<Decimal>,
    #[serde(default)]
    pub stock_quantity: Option<Decimal>,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default)]
    pub barcode_aliases: Option<Vec<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub product: Option<ProductRefDto>,
}

impl ProductRefDto {
    fn into_ref(self) -> ClientResult<ProductRef> {
        Ok(ProductRef {
            id: self.id,
            name: self.name,
            tax_rate: TaxRate::from_bps(self.tax_rate.map(percent_to_bps).transpose()?.unwrap_or(0)),
        })
    }
}

impl VariantDto {
    pub fn is_active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }

    /// Converts with `parent` as the product reference unless the variant
    /// carries its own.
    pub fn into_variant(self, parent: Option<&ProductRef>) -> ClientResult<ProductVariant> {
        let product = match self.product {
            Some(own) => Some(own.into_ref()?),
            None => parent.cloned(),
        };

        let stock_quantity = self
            .stock_quantity
            .map(|q| q.trunc().to_i64().unwrap_or(0))
            .unwrap_or(0);

        Ok(ProductVariant {
            id: self.id,
            product_id: self.product_id,
            sku: self.sku,
            price: to_price(self.price)?,
            cost_price: self.cost_price.map(to_price).transpose()?.unwrap_or_default(),
            stock_quantity,
            attributes: self
                .attributes
                .as_ref()
                .map(VariantAttributes::from_json_map)
                .unwrap_or_default(),
            barcode_aliases: self.barcode_aliases.unwrap_or_default(),
            product,
        })
    }
}

impl ProductDto {
    fn product_ref(&self) -> ClientResult<ProductRef> {
        Ok(ProductRef {
            id: self.id,
            name: self.name.clone(),
            tax_rate: TaxRate::from_bps(self.tax_rate.map(percent_to_bps).transpose()?.unwrap_or(0)),
        })
    }

    /// Sellable variants of this product. Inactive ones are dropped.
    pub fn into_variants(self) -> ClientResult<Vec<ProductVariant>> {
        let parent = self.product_ref()?;
        self.variants
            .into_iter()
            .filter(VariantDto::is_active)
            .map(|v| v.into_variant(Some(&parent)))
            .collect()
    }
}

/// Flattens a product listing into variants, in listing order.
pub(crate) fn flatten_products(products: Vec<ProductDto>) -> ClientResult<Vec<ProductVariant>> {
    let mut variants = Vec::new();
    for product in products {
        variants.extend(product.into_variants()?);
    }
    Ok(variants)
}

#[derive(Debug, Serialize)]
pub(crate) struct ProductCreateDto {
    pub name: String,
    pub base_price: Decimal,
    pub cost_price: Decimal,
    pub tax_rate: Decimal,
    pub variants: Vec<VariantCreateDto>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VariantCreateDto {
    pub sku: String,
    pub price: Decimal,
    pub cost_price: Decimal,
    pub stock_quantity: Decimal,
    pub attributes: Map<String, Value>,
    pub barcode_aliases: Vec<String>,
}

impl From<&NewProduct> for ProductCreateDto {
    fn from(product: &NewProduct) -> Self {
        let mut attributes = Map::new();
        if let Some(expiry) = product.expiry_date {
            attributes.insert(
                "expiry_date".to_string(),
                Value::String(expiry.format("%Y-%m-%d").to_string()),
            );
        }

        ProductCreateDto {
            name: product.name.clone(),
            base_price: from_money(product.price),
            cost_price: Decimal::ZERO,
            tax_rate: bps_to_percent(product.tax_rate.bps()),
            variants: vec![VariantCreateDto {
                sku: product.barcode.clone(),
                price: from_money(product.price),
                cost_price: Decimal::ZERO,
                stock_quantity: Decimal::from(product.stock_quantity),
                attributes,
                barcode_aliases: vec![product.barcode.clone()],
            }],
        }
    }
}

// =============================================================================
// Customers
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct CustomerDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub price_tier: Option<String>,
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub credit_limit: Option<Decimal>,
    #[serde(default)]
    pub max_debt_allowed: Option<Decimal>,
}

impl CustomerDto {
    pub fn into_customer(self) -> ClientResult<Customer> {
        let price_tier = match self.price_tier.as_deref() {
            Some("vip") => PriceTier::Vip,
            Some("wholesaler") => PriceTier::Wholesaler,
            _ => PriceTier::Retail,
        };

        Ok(Customer {
            id: self.id,
            name: self.name,
            phone: self.phone.filter(|p| !p.trim().is_empty()),
            price_tier,
            balance: opt_money(self.balance)?,
            credit_limit: opt_money(self.credit_limit)?,
            max_debt_allowed: opt_money(self.max_debt_allowed)?,
        })
    }
}

// =============================================================================
// Checkout
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct CheckoutRequestDto {
    pub items: Vec<CheckoutItemDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckoutItemDto {
    pub variant_id: i64,
    pub quantity: Decimal,
    pub discount_percent: Decimal,
}

impl From<&CheckoutRequest> for CheckoutRequestDto {
    fn from(request: &CheckoutRequest) -> Self {
        CheckoutRequestDto {
            items: request
                .items
                .iter()
                .map(|item| CheckoutItemDto {
                    variant_id: item.variant_id,
                    quantity: Decimal::from(item.quantity),
                    discount_percent: bps_to_percent(item.discount_percent.bps()),
                })
                .collect(),
            customer_id: request.customer_id,
            payment_method: request.payment_method,
            debt_amount: request.debt_amount.map(from_money),
            notes: request.notes.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaleDto {
    pub id: i64,
    pub total_amount: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default)]
    pub tax_amount: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
    #[serde(default)]
    pub service_charge: Option<Decimal>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_debt: Option<bool>,
    #[serde(default)]
    pub debt_amount: Option<Decimal>,
    #[serde(default)]
    pub receipt_number: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl SaleDto {
    pub fn into_receipt(self) -> ClientResult<SaleReceipt> {
        let payment_method = self
            .payment_method
            .as_deref()
            .and_then(|m| m.parse::<PaymentMethod>().ok());

        Ok(SaleReceipt {
            id: self.id,
            receipt_number: self.receipt_number,
            subtotal: opt_money(self.subtotal)?,
            tax_amount: opt_money(self.tax_amount)?,
            discount_amount: opt_money(self.discount_amount)?,
            service_charge: opt_money(self.service_charge)?,
            total_amount: to_money(self.total_amount)?,
            payment_method,
            status: self.status,
            is_debt: self.is_debt.unwrap_or(false),
            debt_amount: opt_money(self.debt_amount)?,
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        })
    }
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct SettingsDto {
    pub user: UserDto,
    pub tenant: TenantDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenantDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub base_currency: Option<String>,
    #[serde(default)]
    pub min_margin_percent: Option<Decimal>,
    #[serde(default)]
    pub config: Option<Map<String, Value>>,
}

impl SettingsDto {
    pub fn into_profile(self) -> ClientResult<TenantProfile> {
        let tenant = self.tenant;

        let business_type = match tenant.business_type.as_deref() {
            None | Some("") => None,
            Some(raw) => match raw.parse::<BusinessType>() {
                Ok(t) => Some(t),
                Err(_) => {
                    warn!(business_type = raw, "Unknown business type from backend");
                    None
                }
            },
        };

        let config_margin = tenant
            .config
            .as_ref()
            .and_then(|c| c.get("min_margin_percent"))
            .and_then(|v| serde_json::from_value::<Decimal>(v.clone()).ok());
        let min_margin_bps = tenant
            .min_margin_percent
            .or(config_margin)
            .map(percent_to_bps)
            .transpose()?;

        Ok(TenantProfile {
            tenant_id: tenant.id,
            tenant_name: tenant.name,
            username: self.user.username,
            role: self.user.role,
            business_type,
            base_currency: tenant.base_currency,
            min_margin_bps,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TenantUpdateDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd_to_uzs_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_margin_percent: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

impl From<&TenantUpdate> for TenantUpdateDto {
    fn from(update: &TenantUpdate) -> Self {
        TenantUpdateDto {
            name: update.name.clone(),
            usd_to_uzs_rate: update.usd_to_uzs_rate,
            min_margin_percent: update.min_margin_bps.map(bps_to_percent),
            config: update.config.clone(),
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Pulls a readable message out of an error body.
///
/// FastAPI sends `{"detail": "..."}` for handled errors and
/// `{"detail": [{"msg": "..."}, ...]}` for validation failures.
pub(crate) fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    match detail {
        Some(Value::String(s)) => s,
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|i| i.get("msg").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}
