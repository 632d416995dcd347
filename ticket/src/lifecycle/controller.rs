//! Synchronous facade over the ticket reducer.

use super::actions::TicketAction;
use super::environment::TicketEnvironment;
use super::reducer::TicketReducer;
use super::state::TicketState;
use crate::config::TicketConfig;
use crate::encoder::{self, CodeMatrix};
use crate::error::{Result, TicketError};
use crate::types::{IssueRequest, LifecycleStatus, Ticket, TicketRecord};
use chrono::Duration;
use greed_ticket_core::reducer::Reducer;

/// Visual code of the current ticket, ready for a renderer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeView {
    /// Encoded payload
    pub matrix: CodeMatrix,
    /// Text shown under the code and copied to the clipboard
    pub display_code: String,
    /// False once the ticket expired; the matrix is unchanged but must not
    /// be presented as redeemable
    pub valid: bool,
}

/// Owns the lifecycle state of one user's ticket
///
/// Every operation runs the reducer to completion and reports refusals as
/// `Err`. Scheduled effects are dropped: the owner calls
/// [`tick`](Self::tick) on its own timer instead.
#[derive(Debug)]
pub struct TicketLifecycleController {
    state: TicketState,
    reducer: TicketReducer,
    env: TicketEnvironment,
}

impl TicketLifecycleController {
    /// Creates a controller holding no ticket
    #[must_use]
    pub fn new(env: TicketEnvironment) -> Self {
        Self {
            state: TicketState::from_config(&env.config),
            reducer: TicketReducer::new(),
            env,
        }
    }

    fn dispatch(&mut self, action: TicketAction) -> Result<()> {
        self.state.last_error = None;
        let _effects = self.reducer.reduce(&mut self.state, action, &self.env);

        match &self.state.last_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn issued(&self, operation: &'static str) -> Result<&Ticket> {
        self.state.active_ticket().ok_or(TicketError::IllegalState {
            operation,
            state: self.state.status,
        })
    }

    /// Issues a ticket for the wallet's user
    ///
    /// # Errors
    ///
    /// [`TicketError::IllegalState`] while a ticket is active,
    /// [`TicketError::InvalidAmount`] for a non-positive amount or one above
    /// the balance. State is unchanged on error.
    pub fn issue(&mut self, request: IssueRequest) -> Result<&Ticket> {
        self.dispatch(TicketAction::IssueTicket { request })?;
        self.issued("issue")
    }

    /// Replaces the current ticket with a fresh one for the same redemption
    ///
    /// # Errors
    ///
    /// [`TicketError::IllegalState`] when no ticket is held,
    /// [`TicketError::InvalidAmount`] when the balance no longer covers the
    /// amount.
    pub fn regenerate(&mut self) -> Result<&Ticket> {
        self.dispatch(TicketAction::RegenerateTicket)?;
        self.issued("regenerate")
    }

    /// Cancels the active ticket
    ///
    /// # Errors
    ///
    /// [`TicketError::IllegalState`] unless a ticket is active.
    pub fn invalidate(&mut self) -> Result<()> {
        self.dispatch(TicketAction::InvalidateTicket)
    }

    /// Advances the countdown to the environment clock's "now"
    ///
    /// Returns the remaining time; does nothing without an active ticket.
    pub fn tick(&mut self) -> Duration {
        if let Some(ticket_id) = self.state.active_ticket().map(Ticket::ticket_id) {
            // Ticks are never refused
            let _ = self.dispatch(TicketAction::Tick {
                ticket_id,
                generation: self.state.timer_generation,
            });
        }
        self.state.remaining
    }

    /// Full lifecycle state
    #[must_use]
    pub const fn state(&self) -> &TicketState {
        &self.state
    }

    /// Controller state
    #[must_use]
    pub const fn status(&self) -> LifecycleStatus {
        self.state.status
    }

    /// Ticket being shown, active or expired
    #[must_use]
    pub const fn current_ticket(&self) -> Option<&Ticket> {
        self.state.current.as_ref()
    }

    /// Remaining validity as of the last tick
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.state.remaining
    }

    /// Remaining validity is below the warning threshold
    #[must_use]
    pub const fn is_low_time(&self) -> bool {
        self.state.low_time
    }

    /// Tickets that left `Active`, oldest first
    pub fn history(&self) -> impl Iterator<Item = &TicketRecord> {
        self.state.history.iter()
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &TicketConfig {
        &self.env.config
    }

    /// Encodes the current ticket into a `grid_size` visual code
    ///
    /// Returns `Ok(None)` when no ticket is held.
    ///
    /// # Errors
    ///
    /// [`TicketError::EncodingSize`] for an unusable grid size.
    pub fn code(&self, grid_size: usize) -> Result<Option<CodeView>> {
        let Some(ticket) = self.current_ticket() else {
            return Ok(None);
        };

        Ok(Some(CodeView {
            matrix: encoder::encode(ticket.payload(), grid_size)?,
            display_code: ticket.display_code().to_string(),
            valid: self.state.status == LifecycleStatus::Active,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{LocationId, Purpose, TicketStatus};
    use crate::wallet::StaticWallet;
    use greed_ticket_core::environment::Clock;
    use greed_ticket_testing::{ManualClock, test_clock};
    use std::sync::Arc;

    fn controller() -> (TicketLifecycleController, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(test_clock().now()));
        let env = TicketEnvironment::new(
            clock.clone(),
            Arc::new(StaticWallet::new("user-42", 12_000)),
            TicketConfig::default(),
        );
        (TicketLifecycleController::new(env), clock)
    }

    fn request(amount: i64) -> IssueRequest {
        IssueRequest::new(Purpose::CashPickup, amount, LocationId::new("counter-7"))
    }

    #[test]
    fn issue_returns_the_active_ticket() {
        let (mut controller, _) = controller();

        let ticket = controller.issue(request(250)).unwrap().clone();

        assert_eq!(controller.status(), LifecycleStatus::Active);
        assert_eq!(controller.current_ticket(), Some(&ticket));
        assert_eq!(controller.remaining(), Duration::minutes(30));
    }

    #[test]
    fn errors_leave_state_untouched() {
        let (mut controller, _) = controller();
        let before = controller.state().clone();

        let err = controller.issue(request(50_000)).unwrap_err();

        assert!(matches!(err, TicketError::InvalidAmount { .. }));
        assert_eq!(controller.status(), before.status);
        assert!(controller.current_ticket().is_none());
    }

    #[test]
    fn error_does_not_leak_into_next_call() {
        let (mut controller, _) = controller();
        assert!(controller.invalidate().is_err());

        assert!(controller.issue(request(1)).is_ok());
        assert_eq!(controller.tick(), Duration::minutes(30));
        assert!(controller.state().last_error.is_none());
    }

    #[test]
    fn tick_without_ticket_is_noop() {
        let (mut controller, _) = controller();
        assert_eq!(controller.tick(), Duration::zero());
        assert_eq!(controller.status(), LifecycleStatus::NoTicket);
    }

    #[test]
    fn low_time_flag_follows_the_clock() {
        let (mut controller, clock) = controller();
        controller.issue(request(1)).unwrap();

        clock.advance(Duration::minutes(24));
        controller.tick();
        assert!(!controller.is_low_time());

        clock.advance(Duration::minutes(2));
        controller.tick();
        assert!(controller.is_low_time());
    }

    #[test]
    fn code_view_tracks_validity() {
        let (mut controller, clock) = controller();
        assert_eq!(controller.code(25).unwrap(), None);

        controller.issue(request(1)).unwrap();
        let active = controller.code(25).unwrap().unwrap();
        assert!(active.valid);
        assert_eq!(active.matrix.size(), 25);

        clock.advance(Duration::minutes(30));
        controller.tick();
        let expired = controller.code(25).unwrap().unwrap();
        assert!(!expired.valid);
        assert_eq!(expired.matrix, active.matrix);
        assert_eq!(expired.display_code, active.display_code);

        assert!(matches!(
            controller.code(24),
            Err(TicketError::EncodingSize { grid_size: 24, .. })
        ));
    }

    #[test]
    fn history_lists_retired_tickets() {
        let (mut controller, _) = controller();
        let first = controller.issue(request(1)).unwrap().ticket_id();
        let second = controller.regenerate().unwrap().ticket_id();
        controller.invalidate().unwrap();

        let history: Vec<_> = controller
            .history()
            .map(|r| (r.ticket_id, r.status))
            .collect();
        assert_eq!(
            history,
            vec![
                (first, TicketStatus::Invalidated),
                (second, TicketStatus::Invalidated)
            ]
        );
        assert_eq!(controller.status(), LifecycleStatus::NoTicket);
    }
}
