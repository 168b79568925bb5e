//! # Checkout Command
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  :pay cash                                                              │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  1. Snapshot cart, customer, business type (lock held briefly)          │
//! │  2. select_view + build_checkout_request ── blocked? ──► error, no call │
//! │  3. POST v2/sales/checkout (single attempt) ── failed? ──► error        │
//! │  4. Clear cart and customer, hand back receipt + printout               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart and customer are only cleared after the backend accepted the sale.

use savdo_client::{CheckoutService, SaleReceipt};
use savdo_core::checkout::build_checkout_request;
use savdo_core::receipt::build_receipt;
use savdo_core::{CartTotals, PaymentMethod};
use tracing::{info, warn};

use crate::error::{TerminalError, TerminalResult};
use crate::state::Session;

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub receipt: SaleReceipt,
    /// Totals as the till computed them when the sale was sent.
    pub totals: CartTotals,
    /// ESC/POS bytes for the receipt printer.
    pub printout: Vec<u8>,
}

pub async fn checkout(
    session: &Session,
    payment_method: PaymentMethod,
    notes: Option<String>,
) -> TerminalResult<CheckoutOutcome> {
    let store_name = &session.config.session.store_name;

    let (request, totals, printout) = session.state.with_store(|store| {
        let view = store.view()?;
        let totals = store.totals();
        let request = build_checkout_request(
            &store.cart,
            &totals,
            view,
            store.customer.as_ref(),
            payment_method,
            notes,
        )?;
        let printout = build_receipt(store_name, &store.cart, &totals);
        Ok::<_, TerminalError>((request, totals, printout))
    })?;

    info!(
        session_id = %session.id,
        items = request.items.len(),
        customer_id = ?request.customer_id,
        payment_method = %payment_method,
        total = %totals.total,
        "Submitting sale"
    );

    let receipt = match session.backend.checkout(&request).await {
        Ok(receipt) => receipt,
        Err(e) => {
            warn!(error = %e, "Checkout failed, cart kept");
            return Err(e.into());
        }
    };

    session.state.clear_cart();
    info!(
        sale_id = receipt.id,
        receipt_number = ?receipt.receipt_number,
        "Sale completed"
    );

    Ok(CheckoutOutcome {
        receipt,
        totals,
        printout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{customer, session_with, variant, FakeBackend};
    use savdo_core::{BusinessType, DiscountRate, Money};

    fn backend(business_type: BusinessType) -> FakeBackend {
        let mut backend = FakeBackend::with_variants(vec![variant(1, "RICE-25KG", 100_000)]);
        backend.business_type = Some(business_type);
        backend
    }

    fn fill(session: &Session) {
        session
            .state
            .with_store_mut(|s| s.cart.add_to_cart(&variant(1, "RICE-25KG", 100_000), 3))
            .unwrap();
    }

    #[tokio::test]
    async fn test_cash_sale_clears_cart() {
        let (session, backend) = session_with(backend(BusinessType::Retail));
        fill(&session);

        let outcome = checkout(&session, PaymentMethod::Cash, None).await.unwrap();

        assert_eq!(outcome.receipt.receipt_number.as_deref(), Some("R-0001"));
        assert_eq!(outcome.totals.total, Money::from_major(300_000));
        assert!(!outcome.printout.is_empty());
        session.state.with_store(|s| assert!(s.cart.is_empty()));

        let sent = backend.checkouts();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].items[0].quantity, 3);
        assert_eq!(sent[0].debt_amount, None);
    }

    #[tokio::test]
    async fn test_failed_checkout_keeps_cart() {
        let mut failing = backend(BusinessType::Retail);
        failing.checkout_error = Some((400, "Insufficient stock for RICE-25KG".into()));
        let (session, _) = session_with(failing);
        fill(&session);

        let err = checkout(&session, PaymentMethod::Card, None).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::BackendError);
        assert_eq!(err.message, "Insufficient stock for RICE-25KG");
        session.state.with_store(|s| assert_eq!(s.cart.get(1).unwrap().quantity, 3));
    }

    #[tokio::test]
    async fn test_wholesale_needs_customer() {
        let (session, backend) = session_with(backend(BusinessType::Wholesale));
        fill(&session);

        let err = checkout(&session, PaymentMethod::Cash, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutBlocked);
        assert!(backend.checkouts().is_empty());

        session.state.select_customer(Some(customer(5, "Anvar", 0)));
        checkout(&session, PaymentMethod::Cash, None).await.unwrap();
        session.state.with_store(|s| assert!(s.customer.is_none()));
    }

    #[tokio::test]
    async fn test_debt_sale_carries_total() {
        let (session, backend) = session_with(backend(BusinessType::Wholesale));
        fill(&session);
        session.state.select_customer(Some(customer(5, "Anvar", -20_000)));
        session
            .state
            .with_store_mut(|s| s.cart.update_wholesale_price(1, Money::from_major(90_000)))
            .unwrap();

        checkout(&session, PaymentMethod::Debt, Some("Payday".into())).await.unwrap();

        let sent = &backend.checkouts()[0];
        assert_eq!(sent.customer_id, Some(5));
        assert_eq!(sent.debt_amount, Some(Money::from_major(270_000)));
        assert_eq!(sent.items[0].discount_percent, DiscountRate::from_bps(1_000));
        assert_eq!(sent.notes.as_deref(), Some("Payday"));
    }

    #[tokio::test]
    async fn test_blocked_at_debt_limit() {
        let (session, backend) = session_with(backend(BusinessType::Wholesale));
        fill(&session);
        session
            .state
            .select_customer(Some(customer(5, "Anvar", -1_000_000)));

        let err = checkout(&session, PaymentMethod::Debt, None).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::CheckoutBlocked);
        assert!(backend.checkouts().is_empty());
        session.state.with_store(|s| assert!(s.customer.is_some()));
    }

    #[tokio::test]
    async fn test_missing_business_type_blocks() {
        let (session, _) = session_with(FakeBackend::with_variants(vec![]));
        fill(&session);

        let err = checkout(&session, PaymentMethod::Cash, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigurationError);
    }
}
