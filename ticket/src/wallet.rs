//! Identity and balance collaborator.
//!
//! Who the user is and how many coins they hold are owned by services
//! outside this crate. The lifecycle only needs to read both when it issues
//! a ticket.

use crate::types::UserId;

/// Read-only view of the signed-in user's wallet
pub trait Wallet: Send + Sync {
    /// User the tickets are issued to
    fn user_id(&self) -> UserId;

    /// Coins the user may redeem right now
    fn available_balance(&self) -> u64;
}

/// In-memory wallet with a fixed user and balance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticWallet {
    user_id: UserId,
    balance: u64,
}

impl StaticWallet {
    /// Creates a new `StaticWallet`
    #[must_use]
    pub fn new(user_id: impl Into<String>, balance: u64) -> Self {
        Self {
            user_id: UserId::new(user_id),
            balance,
        }
    }
}

impl Wallet for StaticWallet {
    fn user_id(&self) -> UserId {
        self.user_id.clone()
    }

    fn available_balance(&self) -> u64 {
        self.balance
    }
}
