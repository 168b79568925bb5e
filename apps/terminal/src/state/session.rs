//! # Session
//!
//! One cashier session at one till: the shared [`PosState`], the backend
//! behind the service traits and the loaded configuration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use savdo_client::config::DisplaySettings;
use savdo_client::{Backend, ClientConfig, SettingsService, TenantProfile};
use tracing::info;
use uuid::Uuid;

use super::pos::{PosState, PosStore};
use crate::error::TerminalResult;

#[derive(Clone)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub state: PosState,
    pub backend: Arc<dyn Backend>,
    pub config: ClientConfig,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("started_at", &self.started_at)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(backend: Arc<dyn Backend>, config: ClientConfig) -> Self {
        let state = PosState::new(PosStore::new(config.session.pack_mode));
        let session = Session {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            state,
            backend,
            config,
        };
        info!(session_id = %session.id, "Session started");
        session
    }

    pub fn display(&self) -> &DisplaySettings {
        &self.config.display
    }

    /// Pulls the tenant profile and applies business type and margin floor.
    pub async fn refresh_profile(&self) -> TerminalResult<TenantProfile> {
        let profile = self.backend.profile().await?;
        self.state
            .set_tenant(profile.business_type, profile.min_margin_bps);

        info!(
            tenant = %profile.tenant_name,
            user = %profile.username,
            business_type = ?profile.business_type,
            "Tenant profile loaded"
        );
        Ok(profile)
    }
}
