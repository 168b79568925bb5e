//! # Backend Service Traits
//!
//! The seams between the POS session and the storefront backend. The
//! terminal talks to these traits only; [`HttpBackend`] is the production
//! implementation and tests substitute in-memory fakes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  VariantCatalog     find_by_sku / find_by_barcode / find_by_id         │
//! │  SemanticSearch     free-text product search (voice fallback)          │
//! │  CheckoutService    CheckoutRequest ──► SaleReceipt                    │
//! │  SettingsService    tenant profile, tenant settings patch              │
//! │  ProductAdmin       quick-add an unknown barcode                       │
//! │  CustomerDirectory  customer list for wholesale checkout               │
//! │                                                                         │
//! │  Authenticator      login / logout with a stored bearer token          │
//! │                                                                         │
//! │  Backend = all of the above                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`HttpBackend`]: crate::http::HttpBackend

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use savdo_core::checkout::CheckoutRequest;
use savdo_core::{BusinessType, Customer, Money, PaymentMethod, ProductVariant, TaxRate};
use serde::Serialize;

use crate::error::ClientResult;

// =============================================================================
// Domain Types
// =============================================================================

/// The signed-in user's tenant, as far as the till cares.
#[derive(Debug, Clone, PartialEq)]
pub struct TenantProfile {
    pub tenant_id: i64,
    pub tenant_name: String,
    pub username: String,
    pub role: Option<String>,
    /// `None` when the tenant never picked one, or picked one this client
    /// does not know.
    pub business_type: Option<BusinessType>,
    pub base_currency: Option<String>,
    /// Minimum margin over cost, in basis points.
    pub min_margin_bps: Option<u32>,
}

/// Partial update of tenant settings. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub min_margin_bps: Option<u32>,
    pub usd_to_uzs_rate: Option<Decimal>,
    /// Merged into the tenant's config object.
    pub config: Option<serde_json::Map<String, serde_json::Value>>,
}

/// A product created from the till after an unknown scan.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    /// Used as both SKU and barcode alias.
    pub barcode: String,
    pub tax_rate: TaxRate,
    pub stock_quantity: i64,
    pub expiry_date: Option<NaiveDate>,
}

/// Stock given to quick-added products until someone counts the shelf.
pub const QUICK_ADD_STOCK: i64 = 100;

/// Shelf life assumed for quick-added retail goods.
pub const QUICK_ADD_SHELF_LIFE_DAYS: i64 = 30;

impl NewProduct {
    pub fn quick_add(name: impl Into<String>, price: Money, barcode: impl Into<String>) -> Self {
        NewProduct {
            name: name.into(),
            price,
            barcode: barcode.into(),
            tax_rate: TaxRate::zero(),
            stock_quantity: QUICK_ADD_STOCK,
            expiry_date: None,
        }
    }

    /// Retail goods get a provisional expiry date.
    pub fn for_business(mut self, business_type: Option<BusinessType>, today: NaiveDate) -> Self {
        if business_type == Some(BusinessType::Retail) {
            self.expiry_date = today.checked_add_signed(chrono::Duration::days(QUICK_ADD_SHELF_LIFE_DAYS));
        }
        self
    }
}

/// What the backend recorded for a completed sale.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleReceipt {
    pub id: i64,
    pub receipt_number: Option<String>,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub discount_amount: Money,
    pub service_charge: Money,
    pub total_amount: Money,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<String>,
    pub is_debt: bool,
    pub debt_amount: Money,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<BusinessType>,
}

// =============================================================================
// Service Traits
// =============================================================================

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchanges credentials for a bearer token and keeps it.
    async fn login(&self, username: &str, password: &str) -> ClientResult<()>;

    /// Registers a new user and tenant. Does not log in.
    async fn signup(&self, request: &SignupRequest) -> ClientResult<()>;

    async fn logout(&self) -> ClientResult<()>;

    async fn is_logged_in(&self) -> bool;
}

#[async_trait]
pub trait VariantCatalog: Send + Sync {
    /// Exact (case-insensitive) SKU match first, then substring.
    async fn find_by_sku(&self, sku: &str) -> ClientResult<Option<ProductVariant>>;

    async fn find_by_barcode(&self, code: &str) -> ClientResult<Option<ProductVariant>>;

    async fn find_by_id(&self, variant_id: i64) -> ClientResult<Option<ProductVariant>>;
}

#[async_trait]
pub trait SemanticSearch: Send + Sync {
    /// Best matches first.
    async fn semantic_search(&self, query: &str) -> ClientResult<Vec<ProductVariant>>;
}

#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Submits a sale. Never retried.
    async fn checkout(&self, request: &CheckoutRequest) -> ClientResult<SaleReceipt>;
}

#[async_trait]
pub trait SettingsService: Send + Sync {
    async fn profile(&self) -> ClientResult<TenantProfile>;

    async fn update_tenant(&self, update: &TenantUpdate) -> ClientResult<()>;
}

#[async_trait]
pub trait ProductAdmin: Send + Sync {
    /// Creates a single-variant product and returns the sellable variant.
    async fn quick_add(&self, product: &NewProduct) -> ClientResult<ProductVariant>;
}

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn customers(&self) -> ClientResult<Vec<Customer>>;
}

/// Everything a till session needs from the backend.
pub trait Backend:
    Authenticator
    + VariantCatalog
    + SemanticSearch
    + CheckoutService
    + SettingsService
    + ProductAdmin
    + CustomerDirectory
{
}

impl<T> Backend for T where
    T: Authenticator
        + VariantCatalog
        + SemanticSearch
        + CheckoutService
        + SettingsService
        + ProductAdmin
        + CustomerDirectory
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_add_defaults() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let product = NewProduct::quick_add("Non", Money::from_major(4000), "4780001112223")
            .for_business(Some(BusinessType::Retail), today);

        assert_eq!(product.stock_quantity, QUICK_ADD_STOCK);
        assert_eq!(product.expiry_date, NaiveDate::from_ymd_opt(2026, 11, 17));

        let cafe = NewProduct::quick_add("Choy", Money::from_major(5000), "X1")
            .for_business(Some(BusinessType::Cafe), today);
        assert_eq!(cafe.expiry_date, None);
    }

    #[test]
    fn test_signup_skips_unset_fields() {
        let request = SignupRequest {
            username: "kassir".into(),
            email: "kassir@example.uz".into(),
            password: "secret".into(),
            phone_number: None,
            full_name: None,
            business_type: Some(BusinessType::Wholesale),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["business_type"], "wholesale");
        assert!(json.get("phone_number").is_none());
    }
}
