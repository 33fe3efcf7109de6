//! Observable coordinator status

use cipherwatt_core::{RecordId, VaultAddress};

use crate::errors::ErrorCategory;

/// Last user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Message text
    pub text: String,
    /// Set for failures, `None` for progress and success messages
    pub category: Option<ErrorCategory>,
}

impl StatusMessage {
    /// Progress or success message
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: None,
        }
    }

    /// Failure message
    pub fn error(text: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            text: text.into(),
            category: Some(category),
        }
    }

    /// Whether this reports a failure
    pub fn is_error(&self) -> bool {
        self.category.is_some()
    }
}

/// Everything a UI needs to render the vault panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoordinatorStatus {
    /// A create operation is in flight
    pub is_loading: bool,
    /// A decrypt operation is in flight
    pub is_decrypting: bool,
    /// Record being decrypted, if any
    pub decrypting_id: Option<RecordId>,
    /// Sum of confirmed generation readings
    pub total_generation: f64,
    /// Sum of confirmed consumption readings
    pub total_consumption: f64,
    /// Vault on the active network
    pub deployment_address: Option<VaultAddress>,
    /// Last message
    pub status_message: Option<StatusMessage>,
}
