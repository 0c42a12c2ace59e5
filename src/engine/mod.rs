//! Booking lifecycle engine.
//!
//! The engine validates and applies every lifecycle operation against the
//! booking store, records status transitions, and triggers escrow side
//! effects through the injected gateways. It is a single-writer, strictly
//! sequential state machine: each operation either fully validates and
//! commits, or leaves no trace. Also supports an async stream of commands.

use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::Amount;
use crate::gateway::Gateways;
use crate::model::{
    Booking, BookingId, BookingRequest, BookingStatus, Command, Height, LOCATION_HASH_LEN,
    TransitionRecord,
};

mod store;
pub use store::BookingStore;

mod error;
pub use error::BookingError;

/// Minimum reputation score required to create a booking.
pub const MIN_REPUTATION: u32 = 50;

/// Minimum clock units between a cancellation and the booking start.
pub const CANCELLATION_LEAD: Height = 48;

/// Allowed guest count range, inclusive.
pub const MIN_GUESTS: u32 = 1;
pub const MAX_GUESTS: u32 = 20;

/// Engine configuration, held explicitly per instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ceiling on bookings ever created.
    pub max_bookings: u64,
    /// Flat service fee, reserved for the settlement layer.
    pub booking_fee: Amount,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_bookings: 10_000,
            booking_fee: Amount::new(500),
        }
    }
}

/// The booking lifecycle engine.
///
/// Owns the booking store and the monotonic id counter; collaborators are
/// reached only through the gateway traits.
pub struct Engine {
    config: EngineConfig,
    store: BookingStore,
    next_id: BookingId,
    gateways: Gateways,
}

/// Public API
impl Engine {
    pub fn new(config: EngineConfig, gateways: Gateways) -> Self {
        Self {
            config,
            store: BookingStore::new(),
            next_id: 0,
            gateways,
        }
    }

    /// Run the engine over a command stream, one command at a time.
    pub async fn run(&mut self, mut stream: impl Stream<Item = Command> + Unpin) {
        while let Some(command) = stream.next().await {
            // a rejected command should not stop the engine
            let _ = self.apply(command);
        }
    }

    /// Apply a single command, returning the new id for creations.
    pub fn apply(&mut self, command: Command) -> Result<Option<BookingId>, BookingError> {
        match command {
            Command::Create {
                actor,
                now,
                request,
            } => {
                let result = self.create_booking(&request, &actor, now);
                match &result {
                    Ok(id) => info!(op = "create", actor = %actor, now, id, "command applied"),
                    Err(e) => {
                        info!(op = "create", actor = %actor, now, reason = %e, "command skipped");
                    }
                }
                result.map(Some)
            }
            Command::Confirm { id, actor, now } => {
                let result = self.confirm_booking(id, &actor, now);
                Self::log_result("confirm", id, &actor, now, &result);
                result.map(|()| None)
            }
            Command::CheckIn { id, actor, now } => {
                let result = self.check_in(id, &actor, now);
                Self::log_result("check-in", id, &actor, now, &result);
                result.map(|()| None)
            }
            Command::CheckOut { id, actor, now } => {
                let result = self.check_out(id, &actor, now);
                Self::log_result("check-out", id, &actor, now, &result);
                result.map(|()| None)
            }
            Command::Cancel { id, actor, now } => {
                let result = self.cancel_booking(id, &actor, now);
                Self::log_result("cancel", id, &actor, now, &result);
                result.map(|()| None)
            }
            Command::Dispute { id, actor, now } => {
                let result = self.initiate_dispute(id, &actor, now);
                Self::log_result("dispute", id, &actor, now, &result);
                result.map(|()| None)
            }
        }
    }

    /// Admit a booking request.
    ///
    /// Checks run in a fixed order so the first failing one determines the
    /// error; nothing is written and no escrow call is made unless every
    /// check passes.
    pub fn create_booking(
        &mut self,
        request: &BookingRequest,
        actor: &str,
        now: Height,
    ) -> Result<BookingId, BookingError> {
        if self.next_id >= self.config.max_bookings {
            return Err(BookingError::MaxBookingsExceeded);
        }
        if request.property_id == 0 {
            return Err(BookingError::InvalidPropertyId);
        }
        if request.start_date <= now {
            return Err(BookingError::InvalidStartDate);
        }
        if request.end_date <= request.start_date {
            return Err(BookingError::InvalidEndDate);
        }
        if request.rental_amount.is_zero() {
            return Err(BookingError::InvalidRentalAmount);
        }
        if request.deposit_amount < request.rental_amount.half() {
            return Err(BookingError::InsufficientDeposit);
        }
        if request.guest_count < MIN_GUESTS || request.guest_count > MAX_GUESTS {
            return Err(BookingError::InvalidGuestCount(request.guest_count));
        }
        let location_hash: [u8; LOCATION_HASH_LEN] = request
            .location_hash
            .as_slice()
            .try_into()
            .map_err(|_| BookingError::InvalidLocationHash(request.location_hash.len()))?;
        let cancellation_policy = request
            .cancellation_policy
            .parse()
            .map_err(|()| BookingError::InvalidCancellationPolicy)?;
        if !self.gateways.identity.is_verified(actor) {
            return Err(BookingError::NotVerifiedTenant);
        }
        let score = self.gateways.reputation.score_of(actor);
        if score < MIN_REPUTATION {
            return Err(BookingError::ReputationCheckFailed(score));
        }
        if self.has_confirmed_overlap(request) {
            return Err(BookingError::PropertyNotAvailable(request.property_id));
        }
        let landlord = self
            .gateways
            .registry
            .owner_of(request.property_id)
            .ok_or(BookingError::InvalidPropertyId)?;

        let id = self.next_id;
        self.gateways
            .escrow
            .deposit(id, request.rental_amount + request.deposit_amount);
        self.store.insert(
            id,
            Booking {
                property_id: request.property_id,
                tenant: actor.to_string(),
                landlord,
                start_date: request.start_date,
                end_date: request.end_date,
                rental_amount: request.rental_amount,
                deposit_amount: request.deposit_amount,
                status: BookingStatus::Pending,
                checkin_time: None,
                checkout_time: None,
                guest_count: request.guest_count,
                location_hash,
                cancellation_policy,
                created_at: now,
            },
        );
        self.next_id += 1;
        Ok(id)
    }

    /// Landlord accepts a pending booking.
    pub fn confirm_booking(
        &mut self,
        id: BookingId,
        actor: &str,
        now: Height,
    ) -> Result<(), BookingError> {
        let booking = self
            .store
            .get_mut(id)
            .ok_or(BookingError::BookingNotFound(id))?;
        if booking.landlord != actor {
            return Err(BookingError::NotAuthorized);
        }
        if booking.status != BookingStatus::Pending {
            return Err(BookingError::InvalidStatus(booking.status));
        }

        booking.status = BookingStatus::Confirmed;
        self.record_transition(id, BookingStatus::Confirmed, now, actor);
        Ok(())
    }

    /// Tenant takes occupancy; releases the rental amount to the landlord.
    pub fn check_in(
        &mut self,
        id: BookingId,
        actor: &str,
        now: Height,
    ) -> Result<(), BookingError> {
        let booking = self
            .store
            .get_mut(id)
            .ok_or(BookingError::BookingNotFound(id))?;
        if booking.tenant != actor {
            return Err(BookingError::NotAuthorized);
        }
        if booking.status != BookingStatus::Confirmed {
            return Err(BookingError::InvalidStatus(booking.status));
        }
        if now < booking.start_date {
            return Err(BookingError::InvalidCheckinTime);
        }

        booking.status = BookingStatus::Active;
        booking.checkin_time = Some(now);
        let rental_amount = booking.rental_amount;
        self.record_transition(id, BookingStatus::Active, now, actor);
        self.gateways.escrow.release_to_landlord(id, rental_amount);
        Ok(())
    }

    /// Either party ends an active stay; releases the deposit to the tenant.
    pub fn check_out(
        &mut self,
        id: BookingId,
        actor: &str,
        now: Height,
    ) -> Result<(), BookingError> {
        let booking = self
            .store
            .get_mut(id)
            .ok_or(BookingError::BookingNotFound(id))?;
        if booking.tenant != actor && booking.landlord != actor {
            return Err(BookingError::NotAuthorized);
        }
        if booking.status != BookingStatus::Active {
            return Err(BookingError::InvalidStatus(booking.status));
        }
        if now < booking.end_date {
            return Err(BookingError::InvalidCheckoutTime);
        }

        booking.status = BookingStatus::Completed;
        booking.checkout_time = Some(now);
        let tenant = booking.tenant.clone();
        self.record_transition(id, BookingStatus::Completed, now, actor);
        self.gateways.escrow.release_to_party(id, &tenant);
        Ok(())
    }

    /// Either party cancels before occupancy; refunds the tenant in full.
    ///
    /// Requires the lead-time rule `start > now + 48`; a violation is a
    /// policy error, not an invalid-status error.
    pub fn cancel_booking(
        &mut self,
        id: BookingId,
        actor: &str,
        now: Height,
    ) -> Result<(), BookingError> {
        let booking = self
            .store
            .get_mut(id)
            .ok_or(BookingError::BookingNotFound(id))?;
        if booking.tenant != actor && booking.landlord != actor {
            return Err(BookingError::NotAuthorized);
        }
        if booking.status != BookingStatus::Pending && booking.status != BookingStatus::Confirmed {
            return Err(BookingError::InvalidStatus(booking.status));
        }
        if booking.start_date <= now + CANCELLATION_LEAD {
            return Err(BookingError::InvalidCancellationPolicy);
        }

        booking.status = BookingStatus::Cancelled;
        let tenant = booking.tenant.clone();
        self.record_transition(id, BookingStatus::Cancelled, now, actor);
        self.gateways.escrow.refund(id, &tenant);
        Ok(())
    }

    /// Either party escalates an active stay to external arbitration.
    pub fn initiate_dispute(
        &mut self,
        id: BookingId,
        actor: &str,
        now: Height,
    ) -> Result<(), BookingError> {
        let booking = self
            .store
            .get_mut(id)
            .ok_or(BookingError::BookingNotFound(id))?;
        if booking.tenant != actor && booking.landlord != actor {
            return Err(BookingError::NotAuthorized);
        }
        if booking.status != BookingStatus::Active {
            return Err(BookingError::InvalidStatus(booking.status));
        }

        booking.status = BookingStatus::Disputed;
        self.record_transition(id, BookingStatus::Disputed, now, actor);
        self.gateways.disputes.start_dispute(id, actor);
        Ok(())
    }

    /// Count of bookings ever created (the id counter), terminal included.
    pub fn booking_count(&self) -> u64 {
        self.next_id
    }

    pub fn booking(&self, id: BookingId) -> Option<&Booking> {
        self.store.get(id)
    }

    pub fn bookings(&self) -> impl Iterator<Item = (BookingId, &Booking)> + '_ {
        self.store.iter()
    }

    pub fn latest_transition(&self, id: BookingId) -> Option<&TransitionRecord> {
        self.store.latest_transition(id)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drop all bookings and restart id assignment from zero.
    pub fn reset(&mut self) {
        self.store.clear();
        self.next_id = 0;
    }
}

/// Private API
impl Engine {
    /// Small helper to log `apply` results
    fn log_result(
        op: &str,
        id: BookingId,
        actor: &str,
        now: Height,
        result: &Result<(), BookingError>,
    ) {
        match result {
            Ok(()) => info!(op, id, actor = %actor, now, "command applied"),
            Err(e) => info!(op, id, actor = %actor, now, reason = %e, "command skipped"),
        }
    }

    /// Scan the property's bookings for a confirmed interval intersecting
    /// the requested one. Pending bookings never block.
    fn has_confirmed_overlap(&self, request: &BookingRequest) -> bool {
        self.store
            .property_bookings(request.property_id)
            .iter()
            .filter_map(|id| self.store.get(*id))
            .filter(|existing| existing.status == BookingStatus::Confirmed)
            .any(|existing| {
                intervals_overlap(
                    request.start_date,
                    request.end_date,
                    existing.start_date,
                    existing.end_date,
                )
            })
    }

    fn record_transition(&mut self, id: BookingId, status: BookingStatus, now: Height, actor: &str) {
        self.store.record_transition(
            id,
            TransitionRecord {
                status,
                timestamp: now,
                actor: actor.to_string(),
            },
        );
    }
}

/// Half-open `[start, end)` intersection test between a requested interval
/// and an existing one. Single-point adjacency (`new_end == ex_start` or
/// `new_start == ex_end`) does not count as overlap.
fn intervals_overlap(
    new_start: Height,
    new_end: Height,
    ex_start: Height,
    ex_end: Height,
) -> bool {
    (new_start >= ex_start && new_start < ex_end)
        || (new_end > ex_start && new_end <= ex_end)
        || (new_start < ex_start && new_end > ex_end)
}
