//! Lifecycle state owned by a single controller.

use crate::config::TicketConfig;
use crate::error::TicketError;
use crate::expiry::ExpiryClock;
use crate::types::{LifecycleStatus, Ticket, TicketId, TicketRecord, TicketStatus};
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// State of the ticket lifecycle
///
/// Holds at most one ticket. While `status` is `Active` that ticket is the
/// only redeemable one; once it expires it stays here for display until
/// the next issue or regenerate.
#[derive(Clone, Debug, PartialEq)]
pub struct TicketState {
    /// Controller state
    pub status: LifecycleStatus,
    /// Ticket being shown, if any
    pub current: Option<Ticket>,
    /// Countdown of the current ticket
    pub clock: ExpiryClock,
    /// Time left on the current ticket
    pub remaining: Duration,
    /// Remaining time is below the warning threshold
    pub low_time: bool,
    /// Tickets that left `Active`, oldest first
    pub history: VecDeque<TicketRecord>,
    /// Maximum length of `history`
    pub history_limit: usize,
    /// Generation of the only tick allowed to schedule the next one
    pub timer_generation: u64,
    /// Last refused command, for error display
    ///
    /// Diagnostic only: a refused command writes nothing else, so every
    /// other field is exactly as before the refusal.
    pub last_error: Option<TicketError>,
}

impl TicketState {
    /// Creates an empty state
    #[must_use]
    pub fn new(low_time_threshold: Duration, history_limit: usize) -> Self {
        Self {
            status: LifecycleStatus::NoTicket,
            current: None,
            clock: ExpiryClock::new(low_time_threshold),
            remaining: Duration::zero(),
            low_time: false,
            history: VecDeque::new(),
            history_limit,
            timer_generation: 0,
            last_error: None,
        }
    }

    /// Creates an empty state sized from `config`
    #[must_use]
    pub fn from_config(config: &TicketConfig) -> Self {
        Self::new(config.low_time_threshold(), config.history_limit)
    }

    /// Ticket that can be redeemed right now
    #[must_use]
    pub fn active_ticket(&self) -> Option<&Ticket> {
        match self.status {
            LifecycleStatus::Active => self.current.as_ref(),
            _ => None,
        }
    }

    /// Number of `Active` tickets: zero or one
    #[must_use]
    pub fn active_count(&self) -> usize {
        usize::from(self.active_ticket().is_some())
    }

    /// Status of a ticket this state knows about
    #[must_use]
    pub fn ticket_status(&self, ticket_id: TicketId) -> Option<TicketStatus> {
        if let Some(current) = &self.current {
            if current.ticket_id() == ticket_id {
                return match self.status {
                    LifecycleStatus::Active => Some(TicketStatus::Active),
                    LifecycleStatus::Expired => Some(TicketStatus::Expired),
                    LifecycleStatus::NoTicket | LifecycleStatus::Generating => None,
                };
            }
        }

        self.history
            .iter()
            .rev()
            .find(|record| record.ticket_id == ticket_id)
            .map(|record| record.status)
    }

    /// Records a ticket leaving `Active`, dropping the oldest record when full
    pub(crate) fn retire(&mut self, ticket_id: TicketId, status: TicketStatus, at: DateTime<Utc>) {
        if self.history_limit == 0 {
            return;
        }
        while self.history.len() >= self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(TicketRecord {
            ticket_id,
            status,
            closed_at: at,
        });
    }
}

impl Default for TicketState {
    fn default() -> Self {
        Self::from_config(&TicketConfig::default())
    }
}
