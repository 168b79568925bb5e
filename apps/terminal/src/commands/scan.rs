//! # Scan Command
//!
//! Resolves a finished scan to a variant and adds it to the cart.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw scan                                                               │
//! │     │                                                                   │
//! │     ├── {"s":"COLA-1L","p":6} ──► SKU (or variant id) ──► found?       │
//! │     │                                                                   │
//! │     ├── SKU: exact (any case), then substring ─────────────► found?    │
//! │     │                                                                   │
//! │     └── barcode alias ─────────────────────────────────────► found?    │
//! │                                                                         │
//! │  found ──► plan_add (pack?) ──► cart ──► beep / double beep            │
//! │  nothing ──► NotFound { code } ──► error tone, quick-add offered       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each scan takes a lookup ticket first. If another scan or voice command
//! starts while this one waits on the network, this result is dropped as
//! [`ScanOutcome::Superseded`] and the cart stays as it was.

use savdo_client::{Backend, ClientResult, VariantCatalog};
use savdo_core::smart_scan::{plan_add, AddPlan, LabelPayload, ScanFeedback};
use savdo_core::{Cart, CoreResult, ProductVariant};
use tracing::{debug, info};

use crate::error::TerminalResult;
use crate::state::Session;

/// A cart line touched by a scan or voice command.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedLine {
    pub variant_id: i64,
    pub name: String,
    /// Units added by this command.
    pub added: i64,
    /// Line quantity afterwards.
    pub line_quantity: i64,
    pub feedback: ScanFeedback,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Added(AddedLine),
    /// Nothing matched. The code is kept for quick-add.
    NotFound { code: String },
    /// A newer lookup started before this one answered.
    Superseded,
}

impl ScanOutcome {
    pub fn feedback(&self) -> Option<ScanFeedback> {
        match self {
            ScanOutcome::Added(line) => Some(line.feedback),
            ScanOutcome::NotFound { .. } => Some(ScanFeedback::Error),
            ScanOutcome::Superseded => None,
        }
    }
}

/// Finds the variant a raw scan refers to, with any pack size the label
/// carried.
pub async fn resolve_scan(
    backend: &dyn Backend,
    raw: &str,
) -> ClientResult<Option<(ProductVariant, Option<u32>)>> {
    if let Some(payload) = LabelPayload::parse(raw) {
        debug!(?payload, "Scan is a label payload");

        let mut found = None;
        if let Some(sku) = payload.sku.as_deref() {
            found = backend.find_by_sku(sku).await?;
        }
        if found.is_none() {
            if let Some(id) = payload.variant_id {
                found = backend.find_by_id(id).await?;
            }
        }
        return Ok(found.map(|v| (v, payload.pack_qty)));
    }

    if let Some(variant) = backend.find_by_sku(raw).await? {
        return Ok(Some((variant, None)));
    }
    Ok(backend.find_by_barcode(raw).await?.map(|v| (v, None)))
}

/// Adds per the plan and returns the line quantity afterwards.
pub(crate) fn apply_plan(cart: &mut Cart, variant: &ProductVariant, plan: &AddPlan) -> CoreResult<i64> {
    match plan.pack {
        Some(pack) => cart.add_pack(variant, i64::from(pack.units))?,
        None => cart.add_to_cart(variant, plan.quantity)?,
    }
    Ok(cart.get(variant.id).map(|item| item.quantity).unwrap_or(plan.quantity))
}

/// Handles one finished scan.
pub async fn handle_scan(session: &Session, raw: &str) -> TerminalResult<ScanOutcome> {
    let code = raw.trim();
    let ticket = session.state.begin_lookup();
    info!(code, ticket = ticket.generation(), "Scan");

    let resolved = resolve_scan(session.backend.as_ref(), code).await;
    if !session.state.is_current(ticket) {
        return Ok(ScanOutcome::Superseded);
    }

    let Some((variant, payload_pack)) = resolved? else {
        info!(code, "Scan matched nothing");
        let remembered = session.state.apply_if_current(ticket, |store| {
            store.last_unknown_code = Some(code.to_string());
        });
        return Ok(match remembered {
            Some(()) => ScanOutcome::NotFound { code: code.to_string() },
            None => ScanOutcome::Superseded,
        });
    };

    let plan = plan_add(&variant, payload_pack);
    let applied = session
        .state
        .apply_if_current(ticket, |store| apply_plan(&mut store.cart, &variant, &plan));

    let Some(line_quantity) = applied.transpose()? else {
        return Ok(ScanOutcome::Superseded);
    };

    info!(
        variant_id = variant.id,
        sku = %variant.sku,
        added = plan.quantity,
        line_quantity,
        pack = plan.pack.is_some(),
        "Added to cart"
    );
    Ok(ScanOutcome::Added(AddedLine {
        variant_id: variant.id,
        name: variant.display_name().to_string(),
        added: plan.quantity,
        line_quantity,
        feedback: plan.feedback,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{session_with, variant, FakeBackend};
    use savdo_core::label::encode_qr_payload;

    fn shop() -> FakeBackend {
        FakeBackend::with_variants(vec![
            variant(1, "COLA-1L", 12_000),
            variant(2, "WATER-PACK-12", 3_000),
            variant(3, "COLA-1L-PACK-6", 70_000),
        ])
    }

    #[tokio::test]
    async fn test_scan_by_barcode_adds_one() {
        let (session, _) = session_with(shop());

        let outcome = handle_scan(&session, "4780000000001").await.unwrap();

        let ScanOutcome::Added(line) = outcome else { panic!("expected add") };
        assert_eq!(line.variant_id, 1);
        assert_eq!(line.line_quantity, 1);
        assert_eq!(line.feedback, ScanFeedback::SingleAdd);
    }

    #[tokio::test]
    async fn test_exact_sku_beats_substring() {
        let (session, _) = session_with(shop());

        let ScanOutcome::Added(line) = handle_scan(&session, "cola-1l").await.unwrap() else {
            panic!("expected add")
        };
        assert_eq!(line.variant_id, 1);
    }

    #[tokio::test]
    async fn test_pack_sku_adds_pack() {
        let (session, _) = session_with(shop());

        let ScanOutcome::Added(line) = handle_scan(&session, "WATER-PACK-12").await.unwrap() else {
            panic!("expected add")
        };
        assert_eq!(line.added, 12);
        assert_eq!(line.feedback, ScanFeedback::PackAdd { units: 12 });
        assert_eq!(line.feedback.beeps(), 2);

        session.state.with_store(|s| {
            let item = s.cart.get(2).unwrap();
            assert_eq!(item.quantity, 12);
            assert_eq!(item.units_per_pack, 12);
        });
    }

    #[tokio::test]
    async fn test_printed_label_scans_back() {
        let (session, _) = session_with(shop());
        let label = encode_qr_payload(&variant(1, "COLA-1L", 12_000), Some(6));

        let ScanOutcome::Added(line) = handle_scan(&session, &label).await.unwrap() else {
            panic!("expected add")
        };
        assert_eq!(line.variant_id, 1);
        assert_eq!(line.added, 6);
    }

    #[tokio::test]
    async fn test_label_falls_back_to_variant_id() {
        let (session, _) = session_with(shop());

        let outcome = handle_scan(&session, r#"{"s":"RENAMED","v":"1"}"#).await.unwrap();
        assert!(matches!(outcome, ScanOutcome::Added(AddedLine { variant_id: 1, .. })));
    }

    #[tokio::test]
    async fn test_unknown_code_is_remembered() {
        let (session, _) = session_with(shop());

        let outcome = handle_scan(&session, "4789999999999").await.unwrap();

        assert_eq!(outcome, ScanOutcome::NotFound { code: "4789999999999".into() });
        assert_eq!(outcome.feedback(), Some(ScanFeedback::Error));
        session.state.with_store(|s| {
            assert!(s.cart.is_empty());
            assert_eq!(s.last_unknown_code.as_deref(), Some("4789999999999"));
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_lookup_never_touches_cart() {
        let (session, _) = session_with(shop().delay("COLA-1L", 500).delay("WATER-PACK-12", 10));

        let (slow, fast) = tokio::join!(
            handle_scan(&session, "COLA-1L"),
            handle_scan(&session, "WATER-PACK-12")
        );

        assert_eq!(slow.unwrap(), ScanOutcome::Superseded);
        assert!(matches!(fast.unwrap(), ScanOutcome::Added(_)));
        session.state.with_store(|s| {
            assert!(s.cart.get(1).is_none());
            assert_eq!(s.cart.get(2).unwrap().quantity, 12);
        });
    }

    #[tokio::test]
    async fn test_repeated_scans_accumulate() {
        let (session, _) = session_with(shop());

        handle_scan(&session, "COLA-1L").await.unwrap();
        let ScanOutcome::Added(line) = handle_scan(&session, "COLA-1L").await.unwrap() else {
            panic!("expected add")
        };
        assert_eq!(line.line_quantity, 2);
    }
}
