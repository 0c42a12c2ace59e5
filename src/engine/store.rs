use std::collections::HashMap;

use crate::model::{Booking, BookingId, PropertyId, TransitionRecord};

/// Authoritative owner of all booking records.
///
/// Keeps the record map, a property index preserving insertion order (the
/// overlap scan walks it), and the latest status transition per booking.
/// The engine is the only writer; records are never removed, terminal
/// bookings stay for audit.
#[derive(Debug, Default)]
pub struct BookingStore {
    bookings: HashMap<BookingId, Booking>,
    by_property: HashMap<PropertyId, Vec<BookingId>>,
    transitions: HashMap<BookingId, TransitionRecord>,
}

impl BookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created booking and index it under its property.
    pub fn insert(&mut self, id: BookingId, booking: Booking) {
        self.by_property
            .entry(booking.property_id)
            .or_default()
            .push(id);
        self.bookings.insert(id, booking);
    }

    pub fn get(&self, id: BookingId) -> Option<&Booking> {
        self.bookings.get(&id)
    }

    pub fn get_mut(&mut self, id: BookingId) -> Option<&mut Booking> {
        self.bookings.get_mut(&id)
    }

    /// Booking ids for a property, in creation order.
    pub fn property_bookings(&self, property: PropertyId) -> &[BookingId] {
        self.by_property
            .get(&property)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (BookingId, &Booking)> + '_ {
        self.bookings.iter().map(|(id, b)| (*id, b))
    }

    /// Record a status transition, replacing any earlier one for the booking.
    pub fn record_transition(&mut self, id: BookingId, record: TransitionRecord) {
        self.transitions.insert(id, record);
    }

    pub fn latest_transition(&self, id: BookingId) -> Option<&TransitionRecord> {
        self.transitions.get(&id)
    }

    pub fn clear(&mut self) {
        self.bookings.clear();
        self.by_property.clear();
        self.transitions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amount;
    use crate::model::{BookingStatus, CancellationPolicy};

    fn booking(property: PropertyId) -> Booking {
        Booking {
            property_id: property,
            tenant: "tenant-1".to_string(),
            landlord: "landlord-1".to_string(),
            start_date: 100,
            end_date: 200,
            rental_amount: Amount::new(1000),
            deposit_amount: Amount::new(600),
            status: BookingStatus::Pending,
            checkin_time: None,
            checkout_time: None,
            guest_count: 4,
            location_hash: [0; 32],
            cancellation_policy: CancellationPolicy::Moderate,
            created_at: 0,
        }
    }

    #[test]
    fn property_index_preserves_insertion_order() {
        let mut store = BookingStore::new();
        store.insert(0, booking(1));
        store.insert(1, booking(2));
        store.insert(2, booking(1));

        assert_eq!(store.property_bookings(1), &[0, 2]);
        assert_eq!(store.property_bookings(2), &[1]);
        assert_eq!(store.property_bookings(9), &[] as &[BookingId]);
    }

    #[test]
    fn transitions_are_last_write_wins() {
        let mut store = BookingStore::new();
        store.insert(0, booking(1));
        store.record_transition(
            0,
            TransitionRecord {
                status: BookingStatus::Confirmed,
                timestamp: 10,
                actor: "landlord-1".to_string(),
            },
        );
        store.record_transition(
            0,
            TransitionRecord {
                status: BookingStatus::Active,
                timestamp: 100,
                actor: "tenant-1".to_string(),
            },
        );

        let latest = store.latest_transition(0).unwrap();
        assert_eq!(latest.status, BookingStatus::Active);
        assert_eq!(latest.timestamp, 100);
        assert_eq!(latest.actor, "tenant-1");
    }

    #[test]
    fn clear_resets_everything() {
        let mut store = BookingStore::new();
        store.insert(0, booking(1));
        store.record_transition(
            0,
            TransitionRecord {
                status: BookingStatus::Confirmed,
                timestamp: 10,
                actor: "landlord-1".to_string(),
            },
        );
        store.clear();

        assert!(store.get(0).is_none());
        assert!(store.property_bookings(1).is_empty());
        assert!(store.latest_transition(0).is_none());
    }
}
