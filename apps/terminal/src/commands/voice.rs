//! # Voice Command
//!
//! Turns a speech transcript into a cart add.
//!
//! ```text
//! "5 ta coca cola qo'sh"
//!        │ parse_voice_command
//!        ▼
//! VoiceCommand { quantity: 5, term: "coca cola" }
//!        │ barcode ─► SKU ─► semantic search (first hit)
//!        ▼
//! cart.add_to_cart(variant, 5)
//! ```
//!
//! The transcript itself comes from whatever speech engine the till uses.
//! With voice switched off in config the command answers `VOICE_UNAVAILABLE`.

use savdo_client::{Backend, ClientResult, SemanticSearch, VariantCatalog};
use savdo_core::smart_scan::ScanFeedback;
use savdo_core::voice::parse_voice_command;
use savdo_core::ProductVariant;
use tracing::info;

use super::scan::AddedLine;
use crate::error::{TerminalError, TerminalResult};
use crate::state::Session;

#[derive(Debug, Clone, PartialEq)]
pub enum VoiceOutcome {
    Added(AddedLine),
    NotFound { term: String },
    Superseded,
}

/// Free-text lookup: barcode or SKU first, then the first semantic hit.
pub async fn find_by_term(backend: &dyn Backend, term: &str) -> ClientResult<Option<ProductVariant>> {
    if let Some(variant) = backend.find_by_barcode(term).await? {
        return Ok(Some(variant));
    }
    if let Some(variant) = backend.find_by_sku(term).await? {
        return Ok(Some(variant));
    }
    Ok(backend.semantic_search(term).await?.into_iter().next())
}

/// Looks up `term` and adds `quantity` units, unless a newer lookup has
/// started in the meantime.
pub(crate) async fn add_by_term(
    session: &Session,
    term: &str,
    quantity: i64,
) -> TerminalResult<VoiceOutcome> {
    let ticket = session.state.begin_lookup();
    let found = find_by_term(session.backend.as_ref(), term).await;
    if !session.state.is_current(ticket) {
        return Ok(VoiceOutcome::Superseded);
    }

    let Some(variant) = found? else {
        info!(term, "Nothing matched");
        return Ok(VoiceOutcome::NotFound { term: term.to_string() });
    };

    let applied = session.state.apply_if_current(ticket, |store| {
        store.cart.add_to_cart(&variant, quantity)?;
        Ok::<_, TerminalError>(store.cart.get(variant.id).map(|i| i.quantity).unwrap_or(quantity))
    });
    let Some(line_quantity) = applied.transpose()? else {
        return Ok(VoiceOutcome::Superseded);
    };

    info!(variant_id = variant.id, quantity, line_quantity, "Added by name");
    Ok(VoiceOutcome::Added(AddedLine {
        variant_id: variant.id,
        name: variant.display_name().to_string(),
        added: quantity,
        line_quantity,
        feedback: ScanFeedback::SingleAdd,
    }))
}

pub async fn handle_voice(session: &Session, transcript: &str) -> TerminalResult<VoiceOutcome> {
    if !session.config.voice.enabled {
        return Err(TerminalError::voice_unavailable());
    }

    let command = parse_voice_command(transcript)?;
    info!(
        quantity = command.quantity,
        term = %command.term,
        language = %session.config.voice.language,
        "Voice command"
    );
    add_by_term(session, &command.term, command.quantity).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{session_with, variant, FakeBackend};

    fn shop() -> FakeBackend {
        let mut backend = FakeBackend::with_variants(vec![variant(1, "COLA-1L", 12_000)]);
        backend.search_results = vec![variant(7, "FANTA-05", 8_000), variant(8, "SPRITE-05", 8_000)];
        backend
    }

    #[tokio::test]
    async fn test_sku_match_adds_spoken_quantity() {
        let (session, _) = session_with(shop());

        let outcome = handle_voice(&session, "5 ta cola-1l qo'sh").await.unwrap();

        let VoiceOutcome::Added(line) = outcome else { panic!("expected add") };
        assert_eq!(line.variant_id, 1);
        assert_eq!(line.added, 5);
        session.state.with_store(|s| assert_eq!(s.cart.get(1).unwrap().quantity, 5));
    }

    #[tokio::test]
    async fn test_semantic_fallback_takes_first_hit() {
        let (session, _) = session_with(shop());

        let outcome = handle_voice(&session, "add 2 fanta").await.unwrap();

        assert!(matches!(outcome, VoiceOutcome::Added(AddedLine { variant_id: 7, added: 2, .. })));
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let mut backend = shop();
        backend.search_results.clear();
        let (session, _) = session_with(backend);

        let outcome = handle_voice(&session, "non").await.unwrap();

        assert_eq!(outcome, VoiceOutcome::NotFound { term: "non".into() });
        session.state.with_store(|s| assert!(s.cart.is_empty()));
    }

    #[tokio::test]
    async fn test_disabled_voice_is_unavailable() {
        let (mut session, _) = session_with(shop());
        session.config.voice.enabled = false;

        let err = handle_voice(&session, "5 ta cola").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::VoiceUnavailable);
    }

    #[tokio::test]
    async fn test_filler_only_is_rejected() {
        let (session, _) = session_with(shop());

        let err = handle_voice(&session, "3 ta qo'sh").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_scan_supersedes_voice() {
        let (session, _) = session_with(shop().delay("fanta", 300));

        let (voice, scan) = tokio::join!(
            handle_voice(&session, "fanta"),
            super::super::scan::handle_scan(&session, "COLA-1L")
        );

        assert_eq!(voice.unwrap(), VoiceOutcome::Superseded);
        assert!(scan.is_ok());
        session.state.with_store(|s| {
            assert!(s.cart.get(7).is_none());
            assert_eq!(s.cart.get(1).unwrap().quantity, 1);
        });
    }
}
