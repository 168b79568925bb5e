//! In-memory backend and fixtures for session tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use savdo_client::{
    Authenticator, CheckoutService, ClientConfig, ClientError, ClientResult, CustomerDirectory,
    NewProduct, ProductAdmin, SaleReceipt, SemanticSearch, SettingsService, SignupRequest,
    TenantProfile, TenantUpdate, VariantCatalog,
};
use savdo_core::checkout::CheckoutRequest;
use savdo_core::{
    catalog, BusinessType, Customer, Money, PriceTier, ProductRef, ProductVariant, TaxRate,
    VariantAttributes,
};

use crate::state::Session;

pub(crate) fn variant(id: i64, sku: &str, price_major: i64) -> ProductVariant {
    ProductVariant {
        id,
        product_id: id * 10,
        sku: sku.to_string(),
        price: Money::from_major(price_major),
        cost_price: Money::from_major(price_major / 2),
        stock_quantity: 50,
        attributes: VariantAttributes::default(),
        barcode_aliases: vec![format!("478{id:010}")],
        product: Some(ProductRef {
            id: id * 10,
            name: format!("Product {id}"),
            tax_rate: TaxRate::zero(),
        }),
    }
}

pub(crate) fn customer(id: i64, name: &str, balance_major: i64) -> Customer {
    Customer {
        id,
        name: name.to_string(),
        phone: None,
        price_tier: PriceTier::Wholesaler,
        balance: Money::from_major(balance_major),
        credit_limit: Money::zero(),
        max_debt_allowed: Money::from_major(1_000_000),
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    pub variants: Vec<ProductVariant>,
    pub search_results: Vec<ProductVariant>,
    pub customers: Vec<Customer>,
    pub business_type: Option<BusinessType>,
    /// Artificial latency per looked-up code or query.
    pub delays: HashMap<String, Duration>,
    pub checkout_error: Option<(u16, String)>,
    pub checkouts: Mutex<Vec<CheckoutRequest>>,
    pub created: Mutex<Vec<NewProduct>>,
    pub signups: Mutex<Vec<SignupRequest>>,
    pub tenant_updates: Mutex<Vec<TenantUpdate>>,
    pub logged_in: AtomicBool,
}

impl FakeBackend {
    pub fn with_variants(variants: Vec<ProductVariant>) -> Self {
        FakeBackend {
            variants,
            logged_in: AtomicBool::new(true),
            ..FakeBackend::default()
        }
    }

    pub fn delay(mut self, key: &str, millis: u64) -> Self {
        self.delays.insert(key.to_string(), Duration::from_millis(millis));
        self
    }

    async fn latency(&self, key: &str) {
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
    }

    pub fn checkouts(&self) -> Vec<CheckoutRequest> {
        self.checkouts.lock().unwrap().clone()
    }
}

/// A session over `backend` with the tenant's business type applied.
pub(crate) fn session_with(backend: FakeBackend) -> (Session, Arc<FakeBackend>) {
    let business_type = backend.business_type;
    let backend = Arc::new(backend);
    let session = Session::new(backend.clone(), ClientConfig::default());
    session.state.set_tenant(business_type, Some(1_000));
    (session, backend)
}

#[async_trait]
impl Authenticator for FakeBackend {
    async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let registered = self
            .signups
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.username == username && r.password == password);
        if registered || (username == "kassir" && password == "parol") {
            self.logged_in.store(true, Ordering::SeqCst);
            Ok(())
        } else {
            Err(ClientError::Api {
                status: 400,
                detail: "Incorrect username or password".into(),
            })
        }
    }

    async fn signup(&self, request: &SignupRequest) -> ClientResult<()> {
        if request.username == "kassir" {
            return Err(ClientError::Api {
                status: 400,
                detail: "Username already registered".into(),
            });
        }
        self.signups.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn logout(&self) -> ClientResult<()> {
        self.logged_in.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VariantCatalog for FakeBackend {
    async fn find_by_sku(&self, sku: &str) -> ClientResult<Option<ProductVariant>> {
        self.latency(sku).await;
        Ok(catalog::find_by_sku(&self.variants, sku).cloned())
    }

    async fn find_by_barcode(&self, code: &str) -> ClientResult<Option<ProductVariant>> {
        Ok(catalog::find_by_barcode(&self.variants, code).cloned())
    }

    async fn find_by_id(&self, variant_id: i64) -> ClientResult<Option<ProductVariant>> {
        Ok(catalog::find_by_id(&self.variants, variant_id).cloned())
    }
}

#[async_trait]
impl SemanticSearch for FakeBackend {
    async fn semantic_search(&self, query: &str) -> ClientResult<Vec<ProductVariant>> {
        self.latency(query).await;
        Ok(self.search_results.clone())
    }
}

#[async_trait]
impl CheckoutService for FakeBackend {
    async fn checkout(&self, request: &CheckoutRequest) -> ClientResult<SaleReceipt> {
        if let Some((status, detail)) = &self.checkout_error {
            return Err(ClientError::Api {
                status: *status,
                detail: detail.clone(),
            });
        }

        let mut checkouts = self.checkouts.lock().unwrap();
        checkouts.push(request.clone());
        Ok(SaleReceipt {
            id: checkouts.len() as i64,
            receipt_number: Some(format!("R-{:04}", checkouts.len())),
            subtotal: Money::zero(),
            tax_amount: Money::zero(),
            discount_amount: Money::zero(),
            service_charge: Money::zero(),
            total_amount: Money::zero(),
            payment_method: Some(request.payment_method),
            status: Some("completed".into()),
            is_debt: request.debt_amount.is_some(),
            debt_amount: request.debt_amount.unwrap_or_default(),
            created_at: None,
        })
    }
}

#[async_trait]
impl SettingsService for FakeBackend {
    async fn profile(&self) -> ClientResult<TenantProfile> {
        Ok(TenantProfile {
            tenant_id: 1,
            tenant_name: "Chorsu Market".into(),
            username: "kassir".into(),
            role: Some("cashier".into()),
            business_type: self.business_type,
            base_currency: Some("UZS".into()),
            min_margin_bps: Some(1_500),
        })
    }

    async fn update_tenant(&self, update: &TenantUpdate) -> ClientResult<()> {
        self.tenant_updates.lock().unwrap().push(update.clone());
        Ok(())
    }
}

#[async_trait]
impl ProductAdmin for FakeBackend {
    async fn quick_add(&self, product: &NewProduct) -> ClientResult<ProductVariant> {
        let mut created = self.created.lock().unwrap();
        created.push(product.clone());

        let id = 900 + created.len() as i64;
        Ok(ProductVariant {
            id,
            product_id: id,
            sku: product.barcode.clone(),
            price: product.price,
            cost_price: Money::zero(),
            stock_quantity: product.stock_quantity,
            attributes: VariantAttributes::default(),
            barcode_aliases: vec![product.barcode.clone()],
            product: Some(ProductRef {
                id,
                name: product.name.clone(),
                tax_rate: product.tax_rate,
            }),
        })
    }
}

#[async_trait]
impl CustomerDirectory for FakeBackend {
    async fn customers(&self) -> ClientResult<Vec<Customer>> {
        Ok(self.customers.clone())
    }
}
