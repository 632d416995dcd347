//! Transitions of the ticket lifecycle.
//!
//! ```text
//! NoTicket ──issue──▶ Generating ──▶ Active ──tick(0)──▶ Expired
//!    ▲                                 │  ▲                 │
//!    └─────────── invalidate ──────────┘  └── regenerate ───┘
//! ```
//!
//! Every successful issue or regenerate schedules one delayed
//! [`TicketAction::Tick`] for the new ticket, and the scheduled tick
//! schedules the next one until expiry. Ticks carry the ticket id and timer
//! generation they were scheduled for. A tick for any other ticket is
//! dropped, and a tick from an older generation never re-arms, so one chain
//! of ticks exists per active ticket.
//!
//! Events are produced here and nowhere else. Sending one from outside is
//! refused like any other illegal command.

use super::actions::TicketAction;
use super::environment::TicketEnvironment;
use super::state::TicketState;
use crate::error::TicketError;
use crate::expiry::ClockEvent;
use crate::types::{
    CoinAmount, LifecycleStatus, LocationId, Purpose, Ticket, TicketId, TicketStatus,
};
use chrono::{DateTime, Duration, Utc};
use greed_ticket_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

/// Reducer for the ticket lifecycle
#[derive(Clone, Debug, Default)]
pub struct TicketReducer;

impl TicketReducer {
    /// Creates a new `TicketReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates `IssueTicket`
    fn validate_issue(
        state: &TicketState,
        requested: i64,
        env: &TicketEnvironment,
    ) -> Result<CoinAmount, TicketError> {
        if !matches!(
            state.status,
            LifecycleStatus::NoTicket | LifecycleStatus::Expired
        ) {
            return Err(TicketError::IllegalState {
                operation: "issue",
                state: state.status,
            });
        }

        CoinAmount::validate(requested, env.wallet.available_balance())
    }

    /// Validates `RegenerateTicket`, returning the ticket to replace
    fn validate_regenerate<'a>(
        state: &'a TicketState,
        env: &TicketEnvironment,
    ) -> Result<&'a Ticket, TicketError> {
        let illegal = TicketError::IllegalState {
            operation: "regenerate",
            state: state.status,
        };

        if !matches!(
            state.status,
            LifecycleStatus::Active | LifecycleStatus::Expired
        ) {
            return Err(illegal);
        }

        let current = state.current.as_ref().ok_or(illegal)?;
        current
            .coin_amount()
            .ensure_within(env.wallet.available_balance())?;

        Ok(current)
    }

    /// Validates `InvalidateTicket`, returning the active ticket's id
    fn validate_invalidate(state: &TicketState) -> Result<TicketId, TicketError> {
        state
            .active_ticket()
            .map(Ticket::ticket_id)
            .ok_or(TicketError::IllegalState {
                operation: "invalidate",
                state: state.status,
            })
    }

    /// Applies an event to state
    fn apply_event(state: &mut TicketState, action: &TicketAction) {
        match action {
            TicketAction::TicketIssued { ticket } => {
                state.clock.start(ticket.expires_at());
                let reading = state.clock.tick(ticket.generated_at());
                state.remaining = reading.map_or_else(|| ticket.validity(), |r| r.remaining);
                state.low_time = reading.is_some_and(|r| r.low_time);
                state.current = Some(ticket.clone());
                state.status = LifecycleStatus::Active;
                state.last_error = None;
            },

            TicketAction::TicketInvalidated { ticket_id, at } => {
                if state.active_ticket().map(Ticket::ticket_id) == Some(*ticket_id) {
                    state.clock.stop();
                    state.retire(*ticket_id, TicketStatus::Invalidated, *at);
                    state.current = None;
                    state.status = LifecycleStatus::NoTicket;
                    state.remaining = Duration::zero();
                    state.low_time = false;
                }
                state.last_error = None;
            },

            TicketAction::ClockTicked {
                remaining,
                low_time,
                ..
            } => {
                state.remaining = *remaining;
                state.low_time = *low_time;
                state.last_error = None;
            },

            TicketAction::TicketExpired {
                ticket_id,
                expired_at,
            } => {
                if state.active_ticket().map(Ticket::ticket_id) == Some(*ticket_id) {
                    state.clock.stop();
                    state.retire(*ticket_id, TicketStatus::Expired, *expired_at);
                    state.status = LifecycleStatus::Expired;
                    state.remaining = Duration::zero();
                }
                state.last_error = None;
            },

            TicketAction::ValidationFailed { error } => {
                state.last_error = Some(error.clone());
            },

            // Commands are not applied as events
            TicketAction::IssueTicket { .. }
            | TicketAction::RegenerateTicket
            | TicketAction::InvalidateTicket
            | TicketAction::Tick { .. } => {},
        }
    }

    /// Records a refused command
    fn reject(state: &mut TicketState, error: TicketError) -> SmallVec<[Effect<TicketAction>; 4]> {
        tracing::warn!(%error, status = %state.status, "Ticket command rejected");
        Self::apply_event(state, &TicketAction::ValidationFailed { error });
        SmallVec::new()
    }

    /// Composes a ticket, makes it current, and schedules its first tick
    fn generate(
        state: &mut TicketState,
        env: &TicketEnvironment,
        purpose: Purpose,
        coin_amount: CoinAmount,
        location_id: LocationId,
        generated_at: DateTime<Utc>,
    ) -> SmallVec<[Effect<TicketAction>; 4]> {
        state.status = LifecycleStatus::Generating;

        let user_id = env.wallet.user_id();
        let payload = env.composer.compose(&user_id, purpose, generated_at);
        let ticket = Ticket::new(
            TicketId::new(),
            user_id,
            purpose,
            coin_amount,
            location_id,
            generated_at,
            env.config.validity(),
            payload,
        );
        let ticket_id = ticket.ticket_id();

        tracing::info!(
            %ticket_id,
            user_id = %ticket.user_id(),
            coin_amount = ticket.coin_amount().value(),
            %purpose,
            location_id = %ticket.location_id(),
            expires_at = %ticket.expires_at(),
            "Ticket issued"
        );

        Self::apply_event(state, &TicketAction::TicketIssued { ticket });

        smallvec![Self::schedule_tick(state, env, ticket_id)]
    }

    /// Starts a new timer generation, superseding any pending tick
    fn schedule_tick(
        state: &mut TicketState,
        env: &TicketEnvironment,
        ticket_id: TicketId,
    ) -> Effect<TicketAction> {
        state.timer_generation = state.timer_generation.wrapping_add(1);
        Effect::delay(
            env.config.tick_interval(),
            TicketAction::Tick {
                ticket_id,
                generation: state.timer_generation,
            },
        )
    }
}

impl Reducer for TicketReducer {
    type State = TicketState;
    type Action = TicketAction;
    type Environment = TicketEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::trace!(
            action = action.action_name(),
            command = action.is_command(),
            "Reducing ticket action"
        );

        match action {
            TicketAction::IssueTicket { request } => {
                let coin_amount = match Self::validate_issue(state, request.coin_amount, env) {
                    Ok(amount) => amount,
                    Err(error) => return Self::reject(state, error),
                };

                Self::generate(
                    state,
                    env,
                    request.purpose,
                    coin_amount,
                    request.location_id,
                    env.clock.now(),
                )
            },

            TicketAction::RegenerateTicket => {
                let previous = match Self::validate_regenerate(state, env).cloned() {
                    Ok(ticket) => ticket,
                    Err(error) => return Self::reject(state, error),
                };

                let now = env.clock.now();
                if state.status == LifecycleStatus::Active {
                    Self::apply_event(
                        state,
                        &TicketAction::TicketInvalidated {
                            ticket_id: previous.ticket_id(),
                            at: now,
                        },
                    );
                }

                // Payload is keyed on the timestamp, so it must move forward
                let generated_at = now.max(previous.generated_at() + Duration::milliseconds(1));

                tracing::info!(
                    replaced = %previous.ticket_id(),
                    "Regenerating ticket"
                );

                Self::generate(
                    state,
                    env,
                    previous.purpose(),
                    previous.coin_amount(),
                    previous.location_id().clone(),
                    generated_at,
                )
            },

            TicketAction::InvalidateTicket => {
                let ticket_id = match Self::validate_invalidate(state) {
                    Ok(id) => id,
                    Err(error) => return Self::reject(state, error),
                };

                Self::apply_event(
                    state,
                    &TicketAction::TicketInvalidated {
                        ticket_id,
                        at: env.clock.now(),
                    },
                );
                tracing::info!(%ticket_id, "Ticket invalidated");

                SmallVec::new()
            },

            TicketAction::Tick {
                ticket_id,
                generation,
            } => {
                if state.active_ticket().map(Ticket::ticket_id) != Some(ticket_id) {
                    tracing::trace!(%ticket_id, "Ignoring tick for a retired ticket");
                    return SmallVec::new();
                }

                let now = env.clock.now();
                let Some(reading) = state.clock.tick(now) else {
                    return SmallVec::new();
                };

                Self::apply_event(
                    state,
                    &TicketAction::ClockTicked {
                        ticket_id,
                        remaining: reading.remaining,
                        low_time: reading.low_time,
                    },
                );

                if reading.event == Some(ClockEvent::Expired) {
                    Self::apply_event(
                        state,
                        &TicketAction::TicketExpired {
                            ticket_id,
                            expired_at: now,
                        },
                    );
                    tracing::info!(%ticket_id, expired_at = %now, "Ticket expired");
                    return SmallVec::new();
                }

                tracing::debug!(
                    %ticket_id,
                    remaining_secs = reading.remaining.num_seconds(),
                    low_time = reading.low_time,
                    "Ticket clock ticked"
                );

                if generation != state.timer_generation {
                    tracing::trace!(%ticket_id, generation, "Tick outside the live timer");
                    return SmallVec::new();
                }

                smallvec![Self::schedule_tick(state, env, ticket_id)]
            },

            // Events only come from the arms above
            event => {
                tracing::warn!(event_type = event.event_type(), "External ticket event");
                let error = TicketError::IllegalState {
                    operation: "apply an external event",
                    state: state.status,
                };
                Self::reject(state, error)
            },
        }
    }
}
