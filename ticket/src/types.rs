//! Domain types for redemption tickets.
//!
//! A ticket proves that a user may redeem a quantity of in-app coins at a
//! physical counter. Tickets are values: once issued they never change, and
//! everything that moves over time (remaining validity, status) lives in the
//! lifecycle state instead.

use crate::error::{Result, TicketError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for one ticket issuance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TicketId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the redeeming user, owned by the external auth service
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a new `UserId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Redemption counter where the ticket will be presented
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(String);

impl LocationId {
    /// Creates a new `LocationId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Purpose and amount
// ============================================================================

/// What the coins are being redeemed for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Purpose {
    /// Exchange coins for a gadget
    GadgetRedemption,
    /// Pick up cash
    CashPickup,
    /// Exchange coins for merchandise
    Merchandise,
    /// Enter a VIP area
    VipAccess,
}

impl Purpose {
    /// Every purpose, in display order
    pub const ALL: [Self; 4] = [
        Self::GadgetRedemption,
        Self::CashPickup,
        Self::Merchandise,
        Self::VipAccess,
    ];

    /// Canonical kebab-case name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GadgetRedemption => "gadget-redemption",
            Self::CashPickup => "cash-pickup",
            Self::Merchandise => "merchandise",
            Self::VipAccess => "vip-access",
        }
    }

    /// Human-readable label for ticket screens
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::GadgetRedemption => "Gadget Redemption",
            Self::CashPickup => "Cash Pickup",
            Self::Merchandise => "Merchandise",
            Self::VipAccess => "VIP Access",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| TicketError::UnknownPurpose(s.to_string()))
    }
}

/// A positive coin amount that fitted the balance when it was checked
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoinAmount(u64);

impl CoinAmount {
    /// Validates a requested amount against the available balance
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::InvalidAmount`] when `requested` is zero,
    /// negative, or larger than `available`.
    pub fn validate(requested: i64, available: u64) -> Result<Self> {
        match u64::try_from(requested) {
            Ok(amount) if amount > 0 && amount <= available => Ok(Self(amount)),
            _ => Err(TicketError::InvalidAmount {
                requested,
                available,
            }),
        }
    }

    /// Re-checks a previously validated amount against a fresh balance
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::InvalidAmount`] when the balance dropped
    /// below the amount.
    pub fn ensure_within(self, available: u64) -> Result<Self> {
        if self.0 <= available {
            Ok(self)
        } else {
            Err(TicketError::InvalidAmount {
                requested: i64::try_from(self.0).unwrap_or(i64::MAX),
                available,
            })
        }
    }

    /// Returns the amount in coins
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CoinAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} coins", self.0)
    }
}

/// Issuance input collected by the redemption form
///
/// The amount is signed so that a form can hand over whatever the user
/// typed; the controller rejects non-positive values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    /// What the coins are redeemed for
    pub purpose: Purpose,
    /// Requested coin amount
    pub coin_amount: i64,
    /// Counter where the ticket will be shown
    pub location_id: LocationId,
}

impl IssueRequest {
    /// Creates a new `IssueRequest`
    #[must_use]
    pub const fn new(purpose: Purpose, coin_amount: i64, location_id: LocationId) -> Self {
        Self {
            purpose,
            coin_amount,
            location_id,
        }
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// An issued redemption ticket
///
/// Fields are read through accessors only; a ticket never changes after
/// issuance. `expires_at` is always strictly after `generated_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    ticket_id: TicketId,
    user_id: UserId,
    purpose: Purpose,
    coin_amount: CoinAmount,
    location_id: LocationId,
    generated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    payload: String,
}

impl Ticket {
    /// Creates a new `Ticket` valid for `validity` after `generated_at`
    ///
    /// A non-positive `validity` is raised to one millisecond.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ticket_id: TicketId,
        user_id: UserId,
        purpose: Purpose,
        coin_amount: CoinAmount,
        location_id: LocationId,
        generated_at: DateTime<Utc>,
        validity: Duration,
        payload: String,
    ) -> Self {
        let validity = validity.max(Duration::milliseconds(1));

        Self {
            ticket_id,
            user_id,
            purpose,
            coin_amount,
            location_id,
            generated_at,
            expires_at: generated_at + validity,
            payload,
        }
    }

    /// Ticket identifier
    #[must_use]
    pub const fn ticket_id(&self) -> TicketId {
        self.ticket_id
    }

    /// Redeeming user
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Redemption purpose
    #[must_use]
    pub const fn purpose(&self) -> Purpose {
        self.purpose
    }

    /// Coins to redeem
    #[must_use]
    pub const fn coin_amount(&self) -> CoinAmount {
        self.coin_amount
    }

    /// Counter location
    #[must_use]
    pub const fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    /// Issuance instant
    #[must_use]
    pub const fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Expiry instant
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Canonical payload encoded into the visual code
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Text a user copies to the clipboard to quote the ticket at the counter
    #[must_use]
    pub fn display_code(&self) -> &str {
        &self.payload
    }

    /// Length of the validity window
    #[must_use]
    pub fn validity(&self) -> Duration {
        self.expires_at - self.generated_at
    }

    /// Checks if the ticket has expired at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// ============================================================================
// Statuses
// ============================================================================

/// Status of one ticket
///
/// Transitions only move forward: `Active → Expired` or
/// `Active → Invalidated`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Can be redeemed
    Active,
    /// Validity window elapsed
    Expired,
    /// Superseded or cancelled before expiry
    Invalidated,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Invalidated => "invalidated",
        })
    }
}

/// State of the lifecycle controller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleStatus {
    /// No ticket held
    #[default]
    NoTicket,
    /// Composing a new ticket
    Generating,
    /// Holding a redeemable ticket
    Active,
    /// Holding a ticket whose validity elapsed
    Expired,
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoTicket => "no ticket is held",
            Self::Generating => "generating",
            Self::Active => "active",
            Self::Expired => "expired",
        })
    }
}

/// A ticket that left the `Active` state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    /// Retired ticket
    pub ticket_id: TicketId,
    /// Final status, never `Active`
    pub status: TicketStatus,
    /// When the ticket left `Active`
    pub closed_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use greed_ticket_testing::test_clock;
    use greed_ticket_core::environment::Clock;

    fn sample_ticket(validity: Duration) -> Ticket {
        Ticket::new(
            TicketId::new(),
            UserId::new("user-42"),
            Purpose::GadgetRedemption,
            CoinAmount::validate(5000, 12_000).unwrap(),
            LocationId::new("counter-1"),
            test_clock().now(),
            validity,
            "greedticket://ticket/user-42/1735689600000".to_string(),
        )
    }

    #[test]
    fn purpose_round_trips_through_names() {
        for purpose in Purpose::ALL {
            assert_eq!(purpose.as_str().parse::<Purpose>().unwrap(), purpose);
        }
        assert_eq!(
            "lottery".parse::<Purpose>(),
            Err(TicketError::UnknownPurpose("lottery".to_string()))
        );
    }

    #[test]
    fn purpose_serializes_kebab_case() {
        let json = serde_json::to_string(&Purpose::VipAccess).unwrap();
        assert_eq!(json, "\"vip-access\"");
    }

    #[test]
    fn coin_amount_rejects_non_positive_and_over_balance() {
        assert!(CoinAmount::validate(-10, 100).is_err());
        assert!(CoinAmount::validate(0, 100).is_err());
        assert!(CoinAmount::validate(101, 100).is_err());
        assert_eq!(CoinAmount::validate(100, 100).unwrap().value(), 100);
    }

    #[test]
    fn coin_amount_recheck_reports_shortfall() {
        let amount = CoinAmount::validate(5000, 12_000).unwrap();
        assert_eq!(amount.ensure_within(5000), Ok(amount));
        assert_eq!(
            amount.ensure_within(4999),
            Err(TicketError::InvalidAmount {
                requested: 5000,
                available: 4999
            })
        );
    }

    #[test]
    fn ticket_expiry_follows_validity() {
        let ticket = sample_ticket(Duration::minutes(30));
        assert_eq!(ticket.validity(), Duration::minutes(30));
        assert!(ticket.expires_at() > ticket.generated_at());
        assert!(!ticket.is_expired_at(ticket.generated_at()));
        assert!(ticket.is_expired_at(ticket.expires_at()));
        assert_eq!(ticket.display_code(), ticket.payload());
    }

    #[test]
    fn non_positive_validity_still_expires_after_generation() {
        let ticket = sample_ticket(Duration::zero());
        assert!(ticket.expires_at() > ticket.generated_at());
    }
}
