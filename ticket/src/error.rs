//! Error types for ticket issuance, lifecycle transitions and encoding.

use crate::types::LifecycleStatus;
use thiserror::Error;

/// Result type alias for ticket operations.
pub type Result<T> = std::result::Result<T, TicketError>;

/// Every way a ticket operation can be refused.
///
/// All variants are local validation failures: nothing here is transient,
/// so callers fix their input and try again rather than retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// Requested coin amount is non-positive or exceeds the balance.
    #[error("Invalid coin amount {requested} (available balance: {available})")]
    InvalidAmount {
        /// Amount the caller asked for
        requested: i64,
        /// Balance reported by the wallet
        available: u64,
    },

    /// Operation is not allowed from the controller's current state.
    #[error("Cannot {operation} while {state}")]
    IllegalState {
        /// Operation that was attempted
        operation: &'static str,
        /// State the controller was in
        state: LifecycleStatus,
    },

    /// Grid is too small (or even-sized) to host the three finder patterns.
    #[error("Grid size {grid_size} cannot host the finder patterns (need an odd size >= {min})")]
    EncodingSize {
        /// Requested grid size
        grid_size: usize,
        /// Smallest accepted size
        min: usize,
    },

    /// Purpose name did not match any known purpose.
    #[error("Unknown redemption purpose: {0}")]
    UnknownPurpose(String),

    /// Payload string does not follow `<scheme>://ticket/<user>/<millis>`.
    #[error("Malformed ticket payload: {0}")]
    MalformedPayload(String),
}
