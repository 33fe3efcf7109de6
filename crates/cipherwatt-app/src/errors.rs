//! Operation errors
//!
//! Everything that can end a coordinator operation without a result. Each
//! error maps to an [`ErrorCategory`] so UI layers can route it (toast
//! severity, retry affordance) without matching on individual variants.
//!
//! Staleness is not an error: an operation whose session changed
//! underneath it ends as [`OperationOutcome::Abandoned`], not as an error.

use std::fmt;

use cipherwatt_core::{CipherwattError, ScalingError, TransactionHandle};
use cipherwatt_signature::AuthorizationError;

/// Coarse classification for UI routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad user input (correctable by the user)
    Input,
    /// Wallet, network or engine not ready yet
    Setup,
    /// Signing declined or unusable
    Permission,
    /// Remote ledger or relayer could not be reached
    Network,
    /// Remote ledger accepted the call but rejected the write
    Rejected,
}

impl ErrorCategory {
    /// Whether the user can fix it by changing their input or setup.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Input | Self::Setup | Self::Permission)
    }

    /// Whether retrying unchanged may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Short label for this category.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Setup => "Setup",
            Self::Permission => "Permission",
            Self::Network => "Network",
            Self::Rejected => "Rejected",
        }
    }

    /// Suggested next step for the user.
    #[must_use]
    pub fn resolution_hint(&self) -> &'static str {
        match self {
            Self::Input => "Enter a non-negative reading with at most one decimal digit",
            Self::Setup => "Connect a wallet on a network where the vault is deployed",
            Self::Permission => "Approve the decryption signature request in your wallet",
            Self::Network => "Check your connection and try again",
            Self::Rejected => "The vault rejected the transaction; check the input and retry",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Prerequisite missing when an operation was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readiness {
    /// No vault on the active network (or no network)
    Deployment,
    /// No signing identity
    Identity,
    /// Encryption engine still initialising
    Encryption,
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deployment => write!(f, "vault deployment"),
            Self::Identity => write!(f, "signing identity"),
            Self::Encryption => write!(f, "encryption engine"),
        }
    }
}

/// Input rejected before any remote work.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Reading cannot be scaled
    #[error(transparent)]
    Value(#[from] ScalingError),
    /// Source label is blank
    #[error("source must not be empty")]
    EmptySource,
}

/// Why a coordinator operation failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OperationError {
    /// Input rejected locally
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Deployment, identity or encryption engine missing
    #[error("not ready: missing {missing}")]
    NotReady {
        /// First missing prerequisite
        missing: Readiness,
    },

    /// A collaborator call failed
    #[error("{stage} failed: {source}")]
    RemoteUnavailable {
        /// Pipeline stage that failed
        stage: &'static str,
        /// Collaborator error
        #[source]
        source: CipherwattError,
    },

    /// Decryption authorization could not be obtained
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// The write was mined but reverted
    #[error("transaction {transaction} rejected: {}", .reason.as_deref().unwrap_or("no reason given"))]
    RemoteRejection {
        /// Reverted transaction
        transaction: TransactionHandle,
        /// Revert reason, when the ledger reports one
        reason: Option<String>,
    },
}

impl OperationError {
    /// Collaborator failure at `stage`.
    pub fn remote(stage: &'static str, source: CipherwattError) -> Self {
        Self::RemoteUnavailable { stage, source }
    }

    /// Missing prerequisite.
    pub fn not_ready(missing: Readiness) -> Self {
        Self::NotReady { missing }
    }

    /// Classification for UI routing.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Input,
            Self::NotReady { .. } => ErrorCategory::Setup,
            Self::RemoteUnavailable { .. } => ErrorCategory::Network,
            Self::Authorization(_) => ErrorCategory::Permission,
            Self::RemoteRejection { .. } => ErrorCategory::Rejected,
        }
    }

    /// Short message shown in the status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::Value(ScalingError::TooLarge { .. })) => {
                "value too large".to_string()
            }
            Self::Validation(ValidationError::Value(_)) => "invalid value".to_string(),
            Self::Validation(ValidationError::EmptySource) => "source required".to_string(),
            Self::NotReady { .. } => "not ready".to_string(),
            Self::RemoteUnavailable { stage, .. } => format!("{stage} failed"),
            Self::Authorization(_) => "authorization unavailable".to_string(),
            Self::RemoteRejection { .. } => "transaction rejected".to_string(),
        }
    }
}

/// How an admitted or rejected request ended, when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome<T> {
    /// Finished against an unchanged session
    Completed(T),
    /// Session changed mid-flight; nothing was applied
    Abandoned,
    /// Same kind already in flight; nothing was attempted
    Busy,
}

impl<T> OperationOutcome<T> {
    /// The value if completed, `None` for abandoned or busy.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Abandoned | Self::Busy => None,
        }
    }

    /// Whether the operation ran to completion.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Map the completed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationOutcome<U> {
        match self {
            Self::Completed(value) => OperationOutcome::Completed(f(value)),
            Self::Abandoned => OperationOutcome::Abandoned,
            Self::Busy => OperationOutcome::Busy,
        }
    }
}
