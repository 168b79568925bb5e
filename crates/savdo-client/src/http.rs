//! # HTTP Backend
//!
//! `reqwest` implementation of every service trait against the storefront
//! REST API.
//!
//! ## Endpoints
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │  POST  /api/v1/auth/login                      form → token             │
//! │  POST  /api/v1/auth/signup                     json                     │
//! │  GET   /api/v1/v2/products                     catalog (SKU, barcode)   │
//! │  POST  /api/v1/v2/products                     quick-add                │
//! │  GET   /api/v1/analytics/ai/semantic-search    ?query=                  │
//! │  POST  /api/v1/v2/sales/checkout               sale                     │
//! │  GET   /api/v1/settings/me                     tenant profile           │
//! │  PATCH /api/v1/settings/tenant                 tenant settings          │
//! │  GET   /api/v1/v2/customers                    customer list            │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call except login and signup carries `Authorization: Bearer`. A 401
//! clears the stored token. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use savdo_core::checkout::CheckoutRequest;
use savdo_core::{catalog, Customer, ProductVariant};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{
    Authenticator, CheckoutService, CustomerDirectory, NewProduct, ProductAdmin, SaleReceipt, SemanticSearch,
    SettingsService, SignupRequest, TenantProfile, TenantUpdate, VariantCatalog,
};
use crate::config::ClientConfig;
use crate::dto::{
    error_detail, flatten_products, CheckoutRequestDto, CustomerDto, ProductCreateDto, ProductDto,
    SaleDto, SettingsDto, TenantUpdateDto, TokenResponse, VariantDto,
};
use crate::error::{ClientError, ClientResult};
use crate::token::{StoredToken, TokenStore};

const LOGIN: &str = "api/v1/auth/login";
const SIGNUP: &str = "api/v1/auth/signup";
const PRODUCTS: &str = "api/v1/v2/products";
const SEMANTIC_SEARCH: &str = "api/v1/analytics/ai/semantic-search";
const CHECKOUT: &str = "api/v1/v2/sales/checkout";
const SETTINGS_ME: &str = "api/v1/settings/me";
const SETTINGS_TENANT: &str = "api/v1/settings/tenant";
const CUSTOMERS: &str = "api/v1/v2/customers";

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base: Url,
    tokens: Arc<TokenStore>,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration, tokens: Arc<TokenStore>) -> ClientResult<Self> {
        // Endpoint paths are relative, so the base must end in a slash for
        // `join` to keep any path prefix.
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        let http = Client::builder().timeout(timeout).build()?;

        Ok(HttpBackend { http, base, tokens })
    }

    /// Builds a backend from client configuration, opening the token file
    /// when one is configured.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let tokens = match config.token_path() {
            Some(path) => TokenStore::load(path)?,
            None => TokenStore::in_memory(),
        };
        Self::new(&config.api.base_url, config.request_timeout(), Arc::new(tokens))
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path)?)
    }

    async fn authorized(&self, builder: RequestBuilder) -> ClientResult<RequestBuilder> {
        let token = self.tokens.get().await.ok_or(ClientError::NoToken)?;
        Ok(builder.bearer_auth(token.access_token))
    }

    /// Sends a request and decodes a 2xx JSON body.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();

            if status == StatusCode::UNAUTHORIZED {
                warn!("Backend rejected the token, clearing it");
                if let Err(e) = self.tokens.clear().await {
                    warn!(error = %e, "Failed to clear token");
                }
            }

            return Err(ClientError::Api {
                status: status.as_u16(),
                detail: error_detail(&text),
            });
        }

        Ok(response.json().await?)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// The full sellable variant list.
    ///
    /// The backend has no lookup-by-code endpoint, so lookups fetch the
    /// listing and match locally.
    pub async fn list_variants(&self) -> ClientResult<Vec<ProductVariant>> {
        let request = self.authorized(self.http.get(self.endpoint(PRODUCTS)?)).await?;
        let products: Vec<ProductDto> = self.send(request).await?;
        let variants = flatten_products(products)?;

        debug!(count = variants.len(), "Fetched variants");
        Ok(variants)
    }
}

#[async_trait]
impl Authenticator for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let request = self
            .http
            .post(self.endpoint(LOGIN)?)
            .form(&[("username", username), ("password", password)]);

        let response: TokenResponse = self.send(request).await?;
        let mut token = StoredToken::new(response.access_token);
        if let Some(token_type) = response.token_type {
            token.token_type = token_type;
        }
        self.tokens.set(token).await?;

        info!(username, "Logged in");
        Ok(())
    }

    async fn signup(&self, request: &SignupRequest) -> ClientResult<()> {
        let builder = self.http.post(self.endpoint(SIGNUP)?).json(request);
        let _: serde_json::Value = self.send(builder).await?;

        info!(username = %request.username, "Signed up");
        Ok(())
    }

    async fn logout(&self) -> ClientResult<()> {
        self.tokens.clear().await
    }

    async fn is_logged_in(&self) -> bool {
        self.tokens.is_logged_in().await
    }
}

#[async_trait]
impl VariantCatalog for HttpBackend {
    async fn find_by_sku(&self, sku: &str) -> ClientResult<Option<ProductVariant>> {
        let variants = self.list_variants().await?;
        Ok(catalog::find_by_sku(&variants, sku).cloned())
    }

    async fn find_by_barcode(&self, code: &str) -> ClientResult<Option<ProductVariant>> {
        let variants = self.list_variants().await?;
        Ok(catalog::find_by_barcode(&variants, code).cloned())
    }

    async fn find_by_id(&self, variant_id: i64) -> ClientResult<Option<ProductVariant>> {
        let variants = self.list_variants().await?;
        Ok(catalog::find_by_id(&variants, variant_id).cloned())
    }
}

#[async_trait]
impl SemanticSearch for HttpBackend {
    async fn semantic_search(&self, query: &str) -> ClientResult<Vec<ProductVariant>> {
        let request = self
            .authorized(self.http.get(self.endpoint(SEMANTIC_SEARCH)?).query(&[("query", query)]))
            .await?;
        let results: Vec<VariantDto> = self.send(request).await?;

        debug!(query, count = results.len(), "Semantic search");
        results
            .into_iter()
            .filter(VariantDto::is_active)
            .map(|v| v.into_variant(None))
            .collect()
    }
}

#[async_trait]
impl CheckoutService for HttpBackend {
    async fn checkout(&self, request: &CheckoutRequest) -> ClientResult<SaleReceipt> {
        let body = CheckoutRequestDto::from(request);
        let builder = self
            .authorized(self.http.post(self.endpoint(CHECKOUT)?).json(&body))
            .await?;

        let sale: SaleDto = self.send(builder).await?;
        let receipt = sale.into_receipt()?;

        info!(
            sale_id = receipt.id,
            total = %receipt.total_amount,
            lines = request.items.len(),
            payment = %request.payment_method,
            "Checkout accepted"
        );
        Ok(receipt)
    }
}

#[async_trait]
impl SettingsService for HttpBackend {
    async fn profile(&self) -> ClientResult<TenantProfile> {
        let request = self.authorized(self.http.get(self.endpoint(SETTINGS_ME)?)).await?;
        let settings: SettingsDto = self.send(request).await?;
        settings.into_profile()
    }

    async fn update_tenant(&self, update: &TenantUpdate) -> ClientResult<()> {
        let body = TenantUpdateDto::from(update);
        let request = self
            .authorized(self.http.patch(self.endpoint(SETTINGS_TENANT)?).json(&body))
            .await?;
        let _: serde_json::Value = self.send(request).await?;

        info!("Tenant settings updated");
        Ok(())
    }
}

#[async_trait]
impl ProductAdmin for HttpBackend {
    async fn quick_add(&self, product: &NewProduct) -> ClientResult<ProductVariant> {
        let body = ProductCreateDto::from(product);
        let request = self
            .authorized(self.http.post(self.endpoint(PRODUCTS)?).json(&body))
            .await?;

        let created: ProductDto = self.send(request).await?;
        let variant = created
            .into_variants()?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Decode("created product has no variants".into()))?;

        info!(variant_id = variant.id, sku = %variant.sku, "Quick-added product");
        Ok(variant)
    }
}

#[async_trait]
impl CustomerDirectory for HttpBackend {
    async fn customers(&self) -> ClientResult<Vec<Customer>> {
        let request = self.authorized(self.http.get(self.endpoint(CUSTOMERS)?)).await?;
        let customers: Vec<CustomerDto> = self.send(request).await?;
        customers.into_iter().map(CustomerDto::into_customer).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Form, Query, State};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{get, patch, post};
    use axum::{Json, Router};
    use savdo_core::checkout::CheckoutItem;
    use savdo_core::{BusinessType, DiscountRate, Money, PaymentMethod};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const TOKEN: &str = "t0k";

    type Captured = Arc<Mutex<Vec<Value>>>;
    type Reply = Result<Json<Value>, (AxumStatus, Json<Value>)>;

    fn unauthorized() -> (AxumStatus, Json<Value>) {
        (
            AxumStatus::UNAUTHORIZED,
            Json(json!({ "detail": "Could not validate credentials" })),
        )
    }

    fn check_auth(headers: &HeaderMap) -> Result<(), (AxumStatus, Json<Value>)> {
        let expected = format!("Bearer {TOKEN}");
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some(value) if value == expected => Ok(()),
            _ => Err(unauthorized()),
        }
    }

    async fn login(Form(form): Form<HashMap<String, String>>) -> Reply {
        if form.get("username").map(String::as_str) == Some("kassir")
            && form.get("password").map(String::as_str) == Some("parol")
        {
            Ok(Json(json!({ "access_token": TOKEN, "token_type": "bearer" })))
        } else {
            Err((
                AxumStatus::UNAUTHORIZED,
                Json(json!({ "detail": "Incorrect username or password" })),
            ))
        }
    }

    async fn signup(State(captured): State<Captured>, Json(body): Json<Value>) -> Reply {
        if body["username"] == "kassir" {
            return Err((
                AxumStatus::BAD_REQUEST,
                Json(json!({ "detail": "Username already registered" })),
            ));
        }
        captured.lock().unwrap().push(body.clone());
        Ok(Json(json!({ "id": 2, "username": body["username"] })))
    }

    async fn products(headers: HeaderMap) -> Reply {
        check_auth(&headers)?;
        Ok(Json(json!([
            {
                "id": 1, "name": "Coca-Cola 1L", "tax_rate": 0,
                "variants": [
                    { "id": 10, "product_id": 1, "sku": "COLA-1L", "price": 12000,
                      "barcode_aliases": ["4780000000010"], "attributes": {} },
                    { "id": 11, "product_id": 1, "sku": "COLA-1L-BOX12", "price": 138000,
                      "barcode_aliases": [], "attributes": { "pack_size": 12 } }
                ]
            }
        ])))
    }

    async fn create_product(headers: HeaderMap, Json(body): Json<Value>) -> Reply {
        check_auth(&headers)?;
        let variant = &body["variants"][0];
        Ok(Json(json!({
            "id": 50,
            "name": body["name"],
            "tax_rate": body["tax_rate"],
            "variants": [{
                "id": 500, "product_id": 50,
                "sku": variant["sku"], "price": variant["price"],
                "stock_quantity": variant["stock_quantity"],
                "attributes": variant["attributes"],
                "barcode_aliases": variant["barcode_aliases"]
            }]
        })))
    }

    async fn semantic(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Reply {
        check_auth(&headers)?;
        let query = q.get("query").cloned().unwrap_or_default();
        if query == "olma" {
            Ok(Json(json!([{
                "id": 7, "product_id": 3, "sku": "OLMA-KG", "price": 15000,
                "product": { "id": 3, "name": "Olma", "tax_rate": 0 }
            }])))
        } else {
            Ok(Json(json!([])))
        }
    }

    async fn checkout(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Reply {
        check_auth(&headers)?;
        captured.lock().unwrap().push(body.clone());

        if body["payment_method"] == "debt" && body.get("debt_amount").is_none() {
            return Err((
                AxumStatus::BAD_REQUEST,
                Json(json!({ "detail": "Nasiya summasi ko'rsatilmagan" })),
            ));
        }
        let is_debt = body["payment_method"] == "debt";
        let debt_amount = body.get("debt_amount").cloned().unwrap_or(json!(0));
        Ok(Json(json!({
            "id": 901, "total_amount": 160.0, "subtotal": 200.0, "tax_amount": 0,
            "discount_amount": 40.0, "payment_method": body["payment_method"],
            "status": "completed", "is_debt": is_debt,
            "debt_amount": debt_amount,
            "receipt_number": "R-901", "created_at": "2026-10-18T10:00:00+05:00"
        })))
    }

    async fn settings(headers: HeaderMap) -> Reply {
        check_auth(&headers)?;
        Ok(Json(json!({
            "user": { "id": 1, "username": "kassir", "role": "cashier" },
            "tenant": { "id": 3, "name": "Chorsu", "business_type": "cafe", "config": {} }
        })))
    }

    async fn update_tenant(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Reply {
        check_auth(&headers)?;
        captured.lock().unwrap().push(body.clone());
        Ok(Json(json!({ "id": 3, "name": "Chorsu" })))
    }

    async fn customers(headers: HeaderMap) -> Reply {
        check_auth(&headers)?;
        Ok(Json(json!([
            { "id": 4, "name": "Dilshod", "price_tier": "wholesaler",
              "balance": -1000000, "max_debt_allowed": 1000000 }
        ])))
    }

    async fn spawn_backend() -> (String, Captured) {
        let captured: Captured = Arc::default();
        let router = Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/signup", post(signup))
            .route("/api/v1/v2/products", get(products).post(create_product))
            .route("/api/v1/analytics/ai/semantic-search", get(semantic))
            .route("/api/v1/v2/sales/checkout", post(checkout))
            .route("/api/v1/settings/me", get(settings))
            .route("/api/v1/settings/tenant", patch(update_tenant))
            .route("/api/v1/v2/customers", get(customers))
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (format!("http://{addr}"), captured)
    }

    async fn logged_in_backend() -> (HttpBackend, Captured) {
        let (url, captured) = spawn_backend().await;
        let backend =
            HttpBackend::new(&url, Duration::from_secs(5), Arc::new(TokenStore::in_memory()))
                .unwrap();
        backend.login("kassir", "parol").await.unwrap();
        (backend, captured)
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let (url, _) = spawn_backend().await;
        let backend =
            HttpBackend::new(&url, Duration::from_secs(5), Arc::new(TokenStore::in_memory()))
                .unwrap();

        let err = backend.login("kassir", "wrong").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("Incorrect username or password"));
        assert!(!backend.tokens().is_logged_in().await);

        backend.login("kassir", "parol").await.unwrap();
        assert_eq!(backend.tokens().get().await.unwrap().access_token, TOKEN);
    }

    #[tokio::test]
    async fn test_signup_does_not_log_in() {
        let (url, captured) = spawn_backend().await;
        let backend =
            HttpBackend::new(&url, Duration::from_secs(5), Arc::new(TokenStore::in_memory()))
                .unwrap();

        let mut request = SignupRequest {
            username: "kassir".into(),
            email: "kassir@example.uz".into(),
            password: "parol".into(),
            phone_number: None,
            full_name: None,
            business_type: Some(BusinessType::Retail),
        };
        let err = backend.signup(&request).await.unwrap_err();
        assert_eq!(err.status(), Some(400));

        request.username = "yangi".into();
        backend.signup(&request).await.unwrap();
        assert!(!backend.is_logged_in().await);

        let sent = captured.lock().unwrap().pop().unwrap();
        assert_eq!(sent["business_type"], "retail");
        assert!(sent.get("full_name").is_none());
    }

    #[tokio::test]
    async fn test_requests_without_token_fail_locally() {
        let (url, _) = spawn_backend().await;
        let backend =
            HttpBackend::new(&url, Duration::from_secs(5), Arc::new(TokenStore::in_memory()))
                .unwrap();

        let err = backend.find_by_sku("COLA").await.unwrap_err();
        assert!(matches!(err, ClientError::NoToken));
    }

    #[tokio::test]
    async fn test_rejected_token_is_cleared() {
        let (url, _) = spawn_backend().await;
        let tokens = Arc::new(TokenStore::in_memory());
        tokens.set(StoredToken::new("expired")).await.unwrap();
        let backend = HttpBackend::new(&url, Duration::from_secs(5), tokens).unwrap();

        let err = backend.customers().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(!backend.tokens().is_logged_in().await);
    }

    #[tokio::test]
    async fn test_catalog_lookups() {
        let (backend, _) = logged_in_backend().await;

        let by_sku = backend.find_by_sku("cola-1l").await.unwrap().unwrap();
        assert_eq!(by_sku.id, 10);
        assert_eq!(by_sku.display_name(), "Coca-Cola 1L");

        let partial = backend.find_by_sku("BOX12").await.unwrap().unwrap();
        assert_eq!(partial.id, 11);
        assert_eq!(partial.attributes.explicit_pack_size(), Some(12));

        let by_code = backend.find_by_barcode("4780000000010").await.unwrap().unwrap();
        assert_eq!(by_code.id, 10);

        assert!(backend.find_by_barcode("0000").await.unwrap().is_none());
        assert_eq!(backend.find_by_id(11).await.unwrap().map(|v| v.id), Some(11));
    }

    #[tokio::test]
    async fn test_semantic_search() {
        let (backend, _) = logged_in_backend().await;

        let hits = backend.semantic_search("olma").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].price, Money::from_major(15000));
        assert!(backend.semantic_search("tarvuz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_round_trip() {
        let (backend, captured) = logged_in_backend().await;

        let request = CheckoutRequest {
            items: vec![CheckoutItem {
                variant_id: 10,
                quantity: 2,
                discount_percent: DiscountRate::from_bps(2000),
            }],
            customer_id: Some(4),
            payment_method: PaymentMethod::Debt,
            debt_amount: Some(Money::from_major(160)),
            notes: Some("ertaga to'laydi".into()),
        };

        let receipt = backend.checkout(&request).await.unwrap();
        assert_eq!(receipt.id, 901);
        assert_eq!(receipt.total_amount, Money::from_major(160));
        assert!(receipt.is_debt);
        assert_eq!(receipt.debt_amount, Money::from_major(160));
        assert_eq!(receipt.payment_method, Some(PaymentMethod::Debt));

        let sent = captured.lock().unwrap().pop().unwrap();
        assert_eq!(sent["customer_id"], 4);
        assert_eq!(sent["items"][0]["variant_id"], 10);
        assert_eq!(sent["items"][0]["discount_percent"].as_f64(), Some(20.0));
        assert_eq!(sent["notes"], "ertaga to'laydi");
    }

    #[tokio::test]
    async fn test_checkout_rejection_surfaces_detail() {
        let (backend, _) = logged_in_backend().await;

        let request = CheckoutRequest {
            items: vec![CheckoutItem {
                variant_id: 10,
                quantity: 1,
                discount_percent: DiscountRate::zero(),
            }],
            customer_id: Some(4),
            payment_method: PaymentMethod::Debt,
            debt_amount: None,
            notes: None,
        };

        let err = backend.checkout(&request).await.unwrap_err();
        match err {
            ClientError::Api { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Nasiya summasi ko'rsatilmagan");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_settings_and_tenant_update() {
        let (backend, captured) = logged_in_backend().await;

        let profile = backend.profile().await.unwrap();
        assert_eq!(profile.business_type, Some(BusinessType::Cafe));
        assert_eq!(profile.username, "kassir");

        backend
            .update_tenant(&TenantUpdate {
                min_margin_bps: Some(1500),
                ..Default::default()
            })
            .await
            .unwrap();
        let sent = captured.lock().unwrap().pop().unwrap();
        assert_eq!(sent["min_margin_percent"].as_f64(), Some(15.0));
        assert!(sent.get("name").is_none());
    }

    #[tokio::test]
    async fn test_quick_add_returns_variant() {
        let (backend, _) = logged_in_backend().await;

        let product = NewProduct::quick_add("Non", Money::from_major(4000), "4780009990001");
        let variant = backend.quick_add(&product).await.unwrap();

        assert_eq!(variant.id, 500);
        assert_eq!(variant.sku, "4780009990001");
        assert!(variant.has_barcode("4780009990001"));
        assert_eq!(variant.price, Money::from_major(4000));
        assert_eq!(variant.stock_quantity, 100);
        assert_eq!(variant.display_name(), "Non");
    }

    #[tokio::test]
    async fn test_customers() {
        let (backend, _) = logged_in_backend().await;

        let customers = backend.customers().await.unwrap();
        assert_eq!(customers.len(), 1);
        assert!(customers[0].debt_limit_reached());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let tokens = Arc::new(TokenStore::in_memory());
        tokens.set(StoredToken::new(TOKEN)).await.unwrap();
        let backend =
            HttpBackend::new(&format!("http://{addr}"), Duration::from_secs(2), tokens).unwrap();

        let err = backend.find_by_barcode("123").await.unwrap_err();
        assert!(err.is_network());
    }

    #[test]
    fn test_base_url_keeps_prefix() {
        let backend = HttpBackend::new(
            "https://pos.example.uz/backend/",
            Duration::from_secs(1),
            Arc::new(TokenStore::in_memory()),
        )
        .unwrap();
        assert_eq!(
            backend.endpoint(CHECKOUT).unwrap().as_str(),
            "https://pos.example.uz/backend/api/v1/v2/sales/checkout"
        );
    }
}
