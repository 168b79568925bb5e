//! Checkout view per business type.
//!
//! ```text
//! retail, fashion          → Scanner     (scan-first, large cart list)
//! horeca, cafe, kitchen    → VisualGrid  (tap tiles, service charge)
//! wholesale                → Trader      (customer, price and pack edits)
//! jewelry                  → error, no view yet
//! not configured           → error
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ViewError;
use crate::types::BusinessType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutView {
    Scanner,
    VisualGrid,
    Trader,
}

impl CheckoutView {
    /// Whether checkout from this view needs a selected customer.
    pub fn requires_customer(&self) -> bool {
        matches!(self, CheckoutView::Trader)
    }
}

pub fn select_view(business_type: Option<BusinessType>) -> Result<CheckoutView, ViewError> {
    match business_type.ok_or(ViewError::BusinessTypeNotConfigured)? {
        BusinessType::Retail | BusinessType::Fashion => Ok(CheckoutView::Scanner),
        BusinessType::Horeca | BusinessType::Cafe | BusinessType::Kitchen => {
            Ok(CheckoutView::VisualGrid)
        }
        BusinessType::Wholesale => Ok(CheckoutView::Trader),
        bt @ BusinessType::Jewelry => Err(ViewError::UnsupportedBusinessType(bt)),
    }
}
