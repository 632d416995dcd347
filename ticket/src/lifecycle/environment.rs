//! Injected dependencies of the ticket reducer.

use crate::config::TicketConfig;
use crate::payload::PayloadComposer;
use crate::wallet::Wallet;
use greed_ticket_core::environment::Clock;
use std::sync::Arc;

/// Environment dependencies for the ticket lifecycle
#[derive(Clone)]
pub struct TicketEnvironment {
    /// Clock for issuance and expiry
    pub clock: Arc<dyn Clock>,
    /// Identity and balance of the redeeming user
    pub wallet: Arc<dyn Wallet>,
    /// Validity, tick and rendering settings
    pub config: TicketConfig,
    /// Payload builder for the configured scheme
    pub composer: PayloadComposer,
}

impl TicketEnvironment {
    /// Creates a new `TicketEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, wallet: Arc<dyn Wallet>, config: TicketConfig) -> Self {
        let composer = PayloadComposer::new(config.scheme.clone());
        Self {
            clock,
            wallet,
            config,
            composer,
        }
    }
}

impl std::fmt::Debug for TicketEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketEnvironment")
            .field("user_id", &self.wallet.user_id())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
