//! Ticket lifecycle: issue, regenerate, invalidate and expire.
//!
//! The transitions live in [`TicketReducer`], so they run unchanged in two
//! drivers:
//!
//! ```text
//! TicketLifecycleController (sync)     Store (async runtime)
//!   issue / regenerate / tick            send(action)
//!          │                                  │
//!          └──────────► TicketReducer ◄───────┘
//!                           │
//!      Delay { tick_interval, Tick { ticket_id, generation } }
//!                           │
//!          dropped (owner ticks)      executed, fed back
//! ```

pub mod actions;
pub mod controller;
pub mod environment;
pub mod reducer;
pub mod state;
pub mod store;

pub use actions::TicketAction;
pub use controller::{CodeView, TicketLifecycleController};
pub use environment::TicketEnvironment;
pub use reducer::TicketReducer;
pub use state::TicketState;
pub use store::{TicketStore, ticket_store};
