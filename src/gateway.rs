//! Collaborator contracts the engine depends on.
//!
//! The engine only ever calls these narrow traits; ownership registries,
//! identity verification, the escrow ledger and dispute arbitration all
//! live behind them. They are modeled as synchronous total functions, so
//! deterministic in-memory implementations serve both the binary and the
//! test suite.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::Amount;
use crate::model::{BookingId, Identity, PropertyId};

/// Resolves a property to its owning landlord identity.
pub trait PropertyRegistry: Send + Sync {
    fn owner_of(&self, property: PropertyId) -> Option<Identity>;
}

/// Verification status per identity.
pub trait IdentityGateway: Send + Sync {
    fn is_verified(&self, identity: &str) -> bool;
}

/// Externally computed trust score per identity; unknown identities score 0.
pub trait ReputationGateway: Send + Sync {
    fn score_of(&self, identity: &str) -> u32;
}

/// Custodial fund movements keyed by booking id.
pub trait EscrowGateway: Send + Sync {
    /// Charge `amount` into escrow for the booking.
    fn deposit(&self, booking: BookingId, amount: Amount);

    /// Release `amount` of escrowed funds to the booking's landlord.
    fn release_to_landlord(&self, booking: BookingId, amount: Amount);

    /// Release the escrowed deposit to the named party.
    fn release_to_party(&self, booking: BookingId, recipient: &str);

    /// Return all escrowed funds to the named party.
    fn refund(&self, booking: BookingId, recipient: &str);
}

/// Hands a disputed booking over to external arbitration.
pub trait DisputeGateway: Send + Sync {
    fn start_dispute(&self, booking: BookingId, initiator: &str);
}

/// Bundle of collaborator handles injected into the engine.
#[derive(Clone)]
pub struct Gateways {
    pub registry: Arc<dyn PropertyRegistry>,
    pub identity: Arc<dyn IdentityGateway>,
    pub reputation: Arc<dyn ReputationGateway>,
    pub escrow: Arc<dyn EscrowGateway>,
    pub disputes: Arc<dyn DisputeGateway>,
}

impl Gateways {
    /// Serve every contract from one shared implementation.
    pub fn shared<G>(gateway: Arc<G>) -> Self
    where
        G: PropertyRegistry
            + IdentityGateway
            + ReputationGateway
            + EscrowGateway
            + DisputeGateway
            + 'static,
    {
        Self {
            registry: gateway.clone(),
            identity: gateway.clone(),
            reputation: gateway.clone(),
            escrow: gateway.clone(),
            disputes: gateway,
        }
    }
}

/// One escrow movement, as observed by [`InMemoryGateways`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscrowEvent {
    Deposited { booking: BookingId, amount: Amount },
    ReleasedToLandlord { booking: BookingId, amount: Amount },
    ReleasedTo { booking: BookingId, recipient: Identity },
    Refunded { booking: BookingId, recipient: Identity },
}

/// Deterministic in-memory implementation of every collaborator trait.
///
/// Registry, verification and reputation data are fixed at construction;
/// escrow and dispute calls are appended to inspectable event logs.
#[derive(Debug, Default)]
pub struct InMemoryGateways {
    owners: HashMap<PropertyId, Identity>,
    verified: HashSet<Identity>,
    scores: HashMap<Identity, u32>,
    escrow_events: Mutex<Vec<EscrowEvent>>,
    dispute_events: Mutex<Vec<(BookingId, Identity)>>,
}

impl InMemoryGateways {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, property: PropertyId, owner: impl Into<Identity>) -> Self {
        self.owners.insert(property, owner.into());
        self
    }

    pub fn with_verified(mut self, identity: impl Into<Identity>) -> Self {
        self.verified.insert(identity.into());
        self
    }

    pub fn with_score(mut self, identity: impl Into<Identity>, score: u32) -> Self {
        self.scores.insert(identity.into(), score);
        self
    }

    /// Snapshot of escrow movements in call order.
    pub fn escrow_events(&self) -> Vec<EscrowEvent> {
        self.escrow_events.lock().unwrap().clone()
    }

    /// Snapshot of (booking, initiator) dispute notifications in call order.
    pub fn dispute_events(&self) -> Vec<(BookingId, Identity)> {
        self.dispute_events.lock().unwrap().clone()
    }
}

impl PropertyRegistry for InMemoryGateways {
    fn owner_of(&self, property: PropertyId) -> Option<Identity> {
        self.owners.get(&property).cloned()
    }
}

impl IdentityGateway for InMemoryGateways {
    fn is_verified(&self, identity: &str) -> bool {
        self.verified.contains(identity)
    }
}

impl ReputationGateway for InMemoryGateways {
    fn score_of(&self, identity: &str) -> u32 {
        self.scores.get(identity).copied().unwrap_or(0)
    }
}

impl EscrowGateway for InMemoryGateways {
    fn deposit(&self, booking: BookingId, amount: Amount) {
        self.escrow_events
            .lock()
            .unwrap()
            .push(EscrowEvent::Deposited { booking, amount });
    }

    fn release_to_landlord(&self, booking: BookingId, amount: Amount) {
        self.escrow_events
            .lock()
            .unwrap()
            .push(EscrowEvent::ReleasedToLandlord { booking, amount });
    }

    fn release_to_party(&self, booking: BookingId, recipient: &str) {
        self.escrow_events.lock().unwrap().push(EscrowEvent::ReleasedTo {
            booking,
            recipient: recipient.to_string(),
        });
    }

    fn refund(&self, booking: BookingId, recipient: &str) {
        self.escrow_events.lock().unwrap().push(EscrowEvent::Refunded {
            booking,
            recipient: recipient.to_string(),
        });
    }
}

impl DisputeGateway for InMemoryGateways {
    fn start_dispute(&self, booking: BookingId, initiator: &str) {
        self.dispute_events
            .lock()
            .unwrap()
            .push((booking, initiator.to_string()));
    }
}
