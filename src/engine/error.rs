//! Error taxonomy for booking lifecycle operations.

use thiserror::Error;

use crate::model::{BookingId, BookingStatus, PropertyId};

/// Failure of a booking lifecycle operation.
///
/// Every variant is an expected, categorical outcome of input validation or
/// a state-precondition check; the engine has no fatal errors. An operation
/// that fails performs no store mutation and no escrow call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("actor is not a party authorized for this operation")]
    NotAuthorized,

    #[error("invalid or unknown property id")]
    InvalidPropertyId,

    #[error("start date is not in the future")]
    InvalidStartDate,

    #[error("end date is not after start date")]
    InvalidEndDate,

    #[error("rental amount must be positive")]
    InvalidRentalAmount,

    #[error("booking already exists")]
    BookingAlreadyExists,

    #[error("booking {0} not found")]
    BookingNotFound(BookingId),

    #[error("operation not valid while booking is {0}")]
    InvalidStatus(BookingStatus),

    #[error("property {0} is not available for the requested dates")]
    PropertyNotAvailable(PropertyId),

    #[error("deposit is below half of the rental amount")]
    InsufficientDeposit,

    #[error("check-in before the booking start date")]
    InvalidCheckinTime,

    #[error("check-out before the booking end date")]
    InvalidCheckoutTime,

    #[error("actor is not a verified tenant")]
    NotVerifiedTenant,

    #[error("reputation score {0} is below the booking threshold")]
    ReputationCheckFailed(u32),

    #[error("unknown cancellation policy, or cancellation lead time violated")]
    InvalidCancellationPolicy,

    #[error("guest count {0} outside the allowed range")]
    InvalidGuestCount(u32),

    #[error("location hash is {0} bytes, expected 32")]
    InvalidLocationHash(usize),

    #[error("booking capacity exhausted")]
    MaxBookingsExceeded,
}
