//! Async store for the ticket lifecycle.

use super::{TicketAction, TicketEnvironment, TicketReducer, TicketState};
use greed_ticket_runtime::Store;

/// Store running the ticket reducer with real delayed ticks
///
/// Unlike [`TicketLifecycleController`](super::TicketLifecycleController),
/// the store executes the `Delay` effects the reducer returns, so an issued
/// ticket counts down and expires on its own.
pub type TicketStore = Store<TicketState, TicketAction, TicketEnvironment, TicketReducer>;

/// Creates a store holding no ticket
#[must_use]
pub fn ticket_store(env: TicketEnvironment) -> TicketStore {
    let state = TicketState::from_config(&env.config);
    Store::new(state, TicketReducer::new(), env)
}
