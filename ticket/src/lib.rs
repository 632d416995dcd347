//! GreedTicket - short-lived redemption tickets
//!
//! A ticket proves that a user may redeem a quantity of in-app coins at a
//! physical counter. This crate issues tickets, renders them as a
//! deterministic visual code, counts down their validity, and handles
//! regeneration and cancellation.
//!
//! # Architecture
//!
//! ```text
//! IssueRequest ──▶ TicketLifecycleController / TicketStore
//!                         │
//!                         ▼
//!                   TicketReducer ──▶ PayloadComposer ──▶ Ticket
//!                         │                                  │
//!                    ExpiryClock                       encoder::encode
//!                  (remaining, low time,                     │
//!                   Expired once)                        CodeMatrix
//! ```
//!
//! - [`payload`]: `<scheme>://ticket/<userId>/<epochMillis>` payloads
//! - [`encoder`]: payload → square grid with three finder patterns
//! - [`expiry`]: countdown driven by an injected "now"
//! - [`lifecycle`]: the state machine, its sync controller and async store
//!
//! At most one ticket is active at a time. Issuing while active is refused;
//! the caller regenerates instead, which retires the old ticket first.
//!
//! # Example
//!
//! ```
//! use greed_ticket::{
//!     IssueRequest, LifecycleStatus, LocationId, Purpose, StaticWallet, TicketConfig,
//!     TicketEnvironment, TicketLifecycleController,
//! };
//! use greed_ticket_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! let env = TicketEnvironment::new(
//!     Arc::new(SystemClock),
//!     Arc::new(StaticWallet::new("user-42", 12_000)),
//!     TicketConfig::default(),
//! );
//! let mut controller = TicketLifecycleController::new(env);
//!
//! let request = IssueRequest::new(Purpose::GadgetRedemption, 5000, LocationId::new("counter-1"));
//! let ticket = controller.issue(request)?;
//! assert!(ticket.payload().starts_with("greedticket://ticket/user-42/"));
//! assert_eq!(controller.status(), LifecycleStatus::Active);
//! # Ok::<(), greed_ticket::TicketError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod encoder;
pub mod error;
pub mod expiry;
pub mod lifecycle;
pub mod payload;
pub mod types;
pub mod wallet;

pub use config::TicketConfig;
pub use encoder::{CodeMatrix, FINDER_SIZE, MIN_GRID_SIZE, encode};
pub use error::{Result, TicketError};
pub use expiry::{ClockEvent, ClockReading, ExpiryClock};
pub use lifecycle::{
    CodeView, TicketAction, TicketEnvironment, TicketLifecycleController, TicketReducer,
    TicketState, TicketStore, ticket_store,
};
pub use payload::{ParsedPayload, PayloadComposer};
pub use types::*;
pub use wallet::{StaticWallet, Wallet};
