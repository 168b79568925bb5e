//! # POS State
//!
//! The till's mutable state: cart, selected customer and the tenant
//! settings that shape pricing and checkout.
//!
//! ## Thread Safety
//! The store is wrapped in `Arc<Mutex<T>>` and only touched inside
//! `with_store` closures, so the lock is never held across an await.
//!
//! ## Overlapping Lookups
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scan A ──► begin_lookup() = 1 ──► GET products ........ (slow)        │
//! │  scan B ──► begin_lookup() = 2 ──► GET products ──► apply(2) ✓ added   │
//! │                                          A answers ──► apply(1) ✗      │
//! │                                                        Superseded      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Only the newest lookup may touch the cart. The generation check and the
//! mutation happen under the same lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use savdo_core::pricing::{self, CartTotals};
use savdo_core::view::{select_view, CheckoutView};
use savdo_core::{BusinessType, Cart, Customer, PackQuantityMode, ViewError};
use tracing::debug;

/// Everything a till remembers between key presses.
#[derive(Debug, Clone, Default)]
pub struct PosStore {
    pub cart: Cart,
    pub customer: Option<Customer>,
    pub business_type: Option<BusinessType>,
    /// Minimum margin over cost, in basis points.
    pub min_margin_bps: Option<u32>,
    /// Last scan that matched nothing, kept for quick-add.
    pub last_unknown_code: Option<String>,
}

impl PosStore {
    pub fn new(pack_mode: PackQuantityMode) -> Self {
        PosStore {
            cart: Cart::with_pack_mode(pack_mode),
            ..PosStore::default()
        }
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(&self.cart, self.business_type)
    }

    pub fn view(&self) -> Result<CheckoutView, ViewError> {
        select_view(self.business_type)
    }

    /// Variant ids priced under the tenant's minimum margin.
    pub fn lines_below_margin(&self) -> Vec<i64> {
        match self.min_margin_bps {
            Some(bps) if bps > 0 => pricing::lines_below_margin(&self.cart, bps),
            _ => Vec::new(),
        }
    }

    /// Empties the cart and forgets the customer.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.customer = None;
    }
}

/// Ticket taken by a lookup before it goes to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket(u64);

impl LookupTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Shared handle to the till state.
#[derive(Debug, Clone, Default)]
pub struct PosState {
    store: Arc<Mutex<PosStore>>,
    generation: Arc<AtomicU64>,
}

impl PosState {
    pub fn new(store: PosStore) -> Self {
        PosState {
            store: Arc::new(Mutex::new(store)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Executes a function with read access to the store.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = state.with_store(|store| store.totals());
    /// ```
    pub fn with_store<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&PosStore) -> R,
    {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }

    /// Executes a function with write access to the store.
    pub fn with_store_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut PosStore) -> R,
    {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }

    /// Starts a lookup. Any lookup started earlier becomes stale.
    pub fn begin_lookup(&self) -> LookupTicket {
        LookupTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: LookupTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Runs `f` only if no newer lookup has started. `None` means the
    /// result was dropped.
    pub fn apply_if_current<F, R>(&self, ticket: LookupTicket, f: F) -> Option<R>
    where
        F: FnOnce(&mut PosStore) -> R,
    {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_current(ticket) {
            debug!(ticket = ticket.0, "Dropping stale lookup result");
            return None;
        }
        Some(f(&mut store))
    }

    pub fn clear_cart(&self) {
        self.with_store_mut(PosStore::clear_cart);
    }

    pub fn select_customer(&self, customer: Option<Customer>) {
        self.with_store_mut(|store| store.customer = customer);
    }

    pub fn set_tenant(&self, business_type: Option<BusinessType>, min_margin_bps: Option<u32>) {
        self.with_store_mut(|store| {
            store.business_type = business_type;
            store.min_margin_bps = min_margin_bps;
        });
    }
}
