#![deny(clippy::await_holding_lock)]
//! # Cipherwatt App - Operation Coordinator
//!
//! Portable, frontend-agnostic coordination of confidential metering
//! records: encrypted submission, authorized decryption and the session
//! bookkeeping that keeps both honest when the wallet switches network or
//! account mid-operation.
//!
//! ## Layout
//!
//! - [`session`]: process-wide network/identity state ([`SessionContext`])
//! - [`flight`]: one operation per kind ([`SingleFlightTracker`])
//! - [`guard`]: checkpoints against session changes ([`StalenessGuard`])
//! - [`workflows`]: submission and decryption pipelines
//! - [`coordinator`]: the facade UIs talk to ([`VaultCoordinator`])
//! - [`config`]: TOML and environment configuration
//!
//! Every remote or interactive capability arrives through the effect traits
//! of `cipherwatt-core`; this crate performs no I/O of its own beyond the
//! optional signature cache file.

pub mod config;
pub mod coordinator;
pub mod errors;
pub mod flight;
pub mod guard;
#[cfg(feature = "logging")]
pub mod logging;
pub mod session;
pub mod status;
pub mod totals;
pub mod workflows;

pub use config::{ConfigError, CoordinatorConfig, DeploymentEntry};
pub use coordinator::{Collaborators, VaultCoordinator};
pub use errors::{
    ErrorCategory, OperationError, OperationOutcome, Readiness, ValidationError,
};
pub use flight::{FlightError, FlightPermit, FlightState, OperationKind, SingleFlightTracker};
pub use guard::{Abort, StalenessGuard};
#[cfg(feature = "logging")]
pub use logging::init_logging;
pub use session::{SessionContext, SessionHandle, SessionState, SessionView};
pub use status::{CoordinatorStatus, StatusMessage};
pub use totals::RunningTotals;
