//! Canonical ticket payloads.
//!
//! The payload is the string a counter scans (inside the visual code) or
//! reads aloud (as the ticket code). Its format is
//! `<scheme>://ticket/<userId>/<issuedAtEpochMillis>`.
//!
//! The payload is not signed. It identifies a ticket within one session,
//! it does not prove who issued it.

use crate::error::{Result, TicketError};
use crate::types::{Purpose, UserId};
use chrono::{DateTime, Utc};

/// Scheme used when no other is configured
pub const DEFAULT_SCHEME: &str = "greedticket";

/// Payload fields recovered by [`PayloadComposer::parse`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedPayload {
    /// User the ticket was issued to
    pub user_id: UserId,
    /// Issuance instant in milliseconds since the Unix epoch
    pub issued_at_millis: i64,
}

/// Builds and reads canonical payload strings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayloadComposer {
    scheme: String,
}

impl PayloadComposer {
    /// Creates a composer for `scheme`
    #[must_use]
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
        }
    }

    /// URI scheme prefixed to every payload
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Composes the payload for a ticket
    ///
    /// Pure function of `(user_id, issued_at)`. The purpose travels with the
    /// ticket but is not part of the payload.
    #[must_use]
    pub fn compose(&self, user_id: &UserId, purpose: Purpose, issued_at: DateTime<Utc>) -> String {
        let payload = format!(
            "{}://ticket/{}/{}",
            self.scheme,
            user_id,
            issued_at.timestamp_millis()
        );
        tracing::trace!(%purpose, payload = %payload, "Composed ticket payload");
        payload
    }

    /// Splits a payload back into its fields
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::MalformedPayload`] if the scheme differs, the
    /// `ticket` segment is missing, the user id is empty, or the timestamp
    /// is not an integer.
    pub fn parse(&self, payload: &str) -> Result<ParsedPayload> {
        let malformed = || TicketError::MalformedPayload(payload.to_string());

        let rest = payload
            .strip_prefix(self.scheme.as_str())
            .and_then(|rest| rest.strip_prefix("://ticket/"))
            .ok_or_else(malformed)?;

        // User ids may contain '/', the timestamp never does
        let (user, millis) = rest.rsplit_once('/').ok_or_else(malformed)?;
        if user.is_empty() {
            return Err(malformed());
        }
        let issued_at_millis = millis.parse::<i64>().map_err(|_| malformed())?;

        Ok(ParsedPayload {
            user_id: UserId::new(user),
            issued_at_millis,
        })
    }
}

impl Default for PayloadComposer {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEME)
    }
}
