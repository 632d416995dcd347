//! Commands and events of the ticket lifecycle.

use crate::error::TicketError;
use crate::types::{IssueRequest, Ticket, TicketId};
use chrono::{DateTime, Duration, Utc};
use greed_ticket_macros::Action;

/// Actions for the ticket lifecycle
///
/// Commands come from the redemption screen (or from the delayed tick the
/// reducer schedules for itself). Events record what actually happened and
/// are only applied by the reducer itself: an event sent from outside is
/// refused with [`TicketError::IllegalState`].
#[derive(Action, Clone, Debug, PartialEq)]
pub enum TicketAction {
    // Commands
    /// Issue a ticket for the wallet's user
    #[command]
    IssueTicket {
        /// Form input
        request: IssueRequest,
    },

    /// Replace the current ticket with a fresh one for the same redemption
    #[command]
    RegenerateTicket,

    /// Cancel the active ticket
    #[command]
    InvalidateTicket,

    /// Recompute remaining validity of `ticket_id`
    ///
    /// Only the tick carrying the current `generation` schedules the next
    /// one; any other tick for the active ticket just refreshes `remaining`.
    #[command]
    Tick {
        /// Ticket the tick was scheduled for
        ticket_id: TicketId,
        /// Timer generation the tick belongs to
        generation: u64,
    },

    // Events
    /// A ticket became active
    #[event]
    TicketIssued {
        /// The new ticket
        ticket: Ticket,
    },

    /// The active ticket was cancelled or superseded
    #[event]
    TicketInvalidated {
        /// Retired ticket
        ticket_id: TicketId,
        /// When it was retired
        at: DateTime<Utc>,
    },

    /// Remaining validity was recomputed
    #[event]
    ClockTicked {
        /// Active ticket
        ticket_id: TicketId,
        /// Time left
        remaining: Duration,
        /// Below the warning threshold
        low_time: bool,
    },

    /// The validity window elapsed
    #[event]
    TicketExpired {
        /// Expired ticket
        ticket_id: TicketId,
        /// Tick that observed the expiry
        expired_at: DateTime<Utc>,
    },

    /// A command was refused; state is otherwise unchanged
    #[event]
    ValidationFailed {
        /// Why the command was refused
        error: TicketError,
    },
}
