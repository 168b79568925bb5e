//! # Account Commands
//!
//! Registering a new shop from the till and editing tenant settings.
//!
//! ```text
//! :signup <user> <email> <password> [business type]
//!     POST auth/signup ──► POST auth/login ──► GET settings/me
//!
//! :settings margin 15      PATCH settings/tenant { min_margin_percent }
//! :settings name Chorsu    PATCH settings/tenant { name }
//! ```

use savdo_client::{Authenticator, SettingsService, SignupRequest, TenantProfile, TenantUpdate};
use savdo_core::validation::{validate_product_name, validate_rate_bps};
use savdo_core::ValidationError;
use tracing::info;

use crate::error::TerminalResult;
use crate::state::Session;

fn required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Registers a user and tenant, then logs in as that user.
pub async fn signup(session: &Session, request: SignupRequest) -> TerminalResult<TenantProfile> {
    required("username", &request.username)?;
    required("password", &request.password)?;
    if !request.email.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "missing '@'".to_string(),
        }
        .into());
    }

    session.backend.signup(&request).await?;
    session
        .backend
        .login(&request.username, &request.password)
        .await?;

    info!(username = %request.username, "New tenant signed in");
    session.refresh_profile().await
}

/// Saves tenant settings and applies the margin floor to this session.
pub async fn update_settings(session: &Session, update: TenantUpdate) -> TerminalResult<()> {
    if let Some(name) = &update.name {
        validate_product_name(name)?;
    }
    if let Some(bps) = update.min_margin_bps {
        validate_rate_bps("min_margin", bps)?;
    }

    session.backend.update_tenant(&update).await?;

    if let Some(bps) = update.min_margin_bps {
        session
            .state
            .with_store_mut(|store| store.min_margin_bps = Some(bps));
    }
    info!(?update, "Tenant settings updated");
    Ok(())
}
