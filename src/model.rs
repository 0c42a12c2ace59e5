//! Core domain types for the booking engine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Amount;

/// Booking identifier, assigned monotonically from zero.
pub type BookingId = u64;

/// Property identifier; valid ids are strictly positive.
pub type PropertyId = u64;

/// Logical time instant read from the external height source.
pub type Height = u64;

/// Opaque identity token for tenants and landlords.
pub type Identity = String;

/// Required byte length of a booking's location hash.
pub const LOCATION_HASH_LEN: usize = 32;

/// Fixed-length opaque location commitment.
pub type LocationHash = [u8; LOCATION_HASH_LEN];

/// Lifecycle status of a booking.
///
/// `Completed`, `Cancelled` and `Disputed` are terminal: no transition is
/// defined out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
    Disputed,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Disputed => "disputed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Disputed
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cancellation policy attached to a booking at creation.
///
/// Informational at this layer: the engine enforces only the common
/// lead-time rule, not per-policy fee schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationPolicy {
    Flexible,
    Moderate,
    Strict,
}

impl CancellationPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CancellationPolicy::Flexible => "flexible",
            CancellationPolicy::Moderate => "moderate",
            CancellationPolicy::Strict => "strict",
        }
    }
}

impl FromStr for CancellationPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flexible" => Ok(CancellationPolicy::Flexible),
            "moderate" => Ok(CancellationPolicy::Moderate),
            "strict" => Ok(CancellationPolicy::Strict),
            _ => Err(()),
        }
    }
}

/// A booking record. Created once, mutated in place by lifecycle
/// transitions, never deleted.
#[derive(Debug, Clone)]
pub struct Booking {
    pub property_id: PropertyId,
    pub tenant: Identity,
    /// Resolved from the property registry at creation, immutable after.
    pub landlord: Identity,
    pub start_date: Height,
    pub end_date: Height,
    pub rental_amount: Amount,
    pub deposit_amount: Amount,
    pub status: BookingStatus,
    /// Set exactly once, by check-in.
    pub checkin_time: Option<Height>,
    /// Set exactly once, by check-out.
    pub checkout_time: Option<Height>,
    pub guest_count: u32,
    pub location_hash: LocationHash,
    pub cancellation_policy: CancellationPolicy,
    pub created_at: Height,
}

/// Latest status transition of a booking: who moved it where, and when.
///
/// Last-write-wins: only the most recent transition per booking is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    pub status: BookingStatus,
    pub timestamp: Height,
    pub actor: Identity,
}

/// Raw inputs to `create_booking`.
///
/// Policy and location hash arrive unvalidated (string / arbitrary bytes)
/// so the engine can reject them in its documented validation order.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub property_id: PropertyId,
    pub start_date: Height,
    pub end_date: Height,
    pub rental_amount: Amount,
    pub deposit_amount: Amount,
    pub guest_count: u32,
    pub location_hash: Vec<u8>,
    pub cancellation_policy: String,
}

/// A lifecycle command, the engine's stream-driver input.
///
/// Every command carries the acting identity and the clock reading at
/// submission time; the engine itself never reads a clock.
#[derive(Debug, Clone)]
pub enum Command {
    Create {
        actor: Identity,
        now: Height,
        request: BookingRequest,
    },
    Confirm {
        id: BookingId,
        actor: Identity,
        now: Height,
    },
    CheckIn {
        id: BookingId,
        actor: Identity,
        now: Height,
    },
    CheckOut {
        id: BookingId,
        actor: Identity,
        now: Height,
    },
    Cancel {
        id: BookingId,
        actor: Identity,
        now: Height,
    },
    Dispute {
        id: BookingId,
        actor: Identity,
        now: Height,
    },
}
