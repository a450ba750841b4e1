use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agrocatalog_core::{AggregateRoot, DomainError, DomainResult, Location, ProducerId, Versioned};
use agrocatalog_events::Event;

use crate::value_objects::{
    ActivityStatus, CultivationPractices, ProducerName, Reputation, VerificationStatus,
};

/// A producer that has not been stored yet.
///
/// Carries no identity: the producer store assigns one on save.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerDraft {
    pub name: ProducerName,
    pub location: Location,
    pub verification: VerificationStatus,
    pub activity: ActivityStatus,
    pub reputation: Reputation,
    pub practices: CultivationPractices,
}

/// Aggregate root: a producer (farmer) who publishes products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Producer {
    id: ProducerId,
    name: ProducerName,
    location: Location,
    verification: VerificationStatus,
    activity: ActivityStatus,
    reputation: Reputation,
    practices: CultivationPractices,
    version: u64,
    #[serde(skip)]
    pending: Vec<ProducerEvent>,
}

impl Producer {
    pub fn create(id: ProducerId, draft: ProducerDraft) -> DomainResult<Self> {
        if id.is_blank() {
            return Err(DomainError::validation("producer id cannot be empty"));
        }

        Ok(Self {
            id,
            name: draft.name,
            location: draft.location,
            verification: draft.verification,
            activity: draft.activity,
            reputation: draft.reputation,
            practices: draft.practices,
            version: 0,
            pending: Vec::new(),
        })
    }

    pub fn id_typed(&self) -> &ProducerId {
        &self.id
    }

    pub fn name(&self) -> &ProducerName {
        &self.name
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn verification(&self) -> VerificationStatus {
        self.verification
    }

    pub fn activity(&self) -> ActivityStatus {
        self.activity
    }

    pub fn reputation(&self) -> Reputation {
        self.reputation
    }

    pub fn practices(&self) -> &CultivationPractices {
        &self.practices
    }

    pub fn is_verified(&self) -> bool {
        self.verification == VerificationStatus::Verified
    }

    pub fn is_active(&self) -> bool {
        self.activity == ActivityStatus::Active
    }

    /// Verified, active and at least `min_reputation`.
    pub fn can_publish(&self, min_reputation: Reputation) -> bool {
        self.is_verified() && self.reputation >= min_reputation && self.is_active()
    }

    /// Unverified -> InProcess.
    pub fn start_verification(&mut self) -> DomainResult<()> {
        if !self.is_active() {
            return Err(DomainError::invariant("producer is not active"));
        }
        match self.verification {
            VerificationStatus::Verified => {
                return Err(DomainError::invariant("producer is already verified"));
            }
            VerificationStatus::InProcess => {
                return Err(DomainError::invariant("a verification is already in process"));
            }
            VerificationStatus::Unverified => {}
        }

        self.verification = VerificationStatus::InProcess;
        self.record(ProducerEvent::VerificationStarted(VerificationStarted {
            producer_id: self.id.clone(),
            occurred_at: Utc::now(),
        }));
        Ok(())
    }

    /// InProcess -> Verified.
    pub fn verify(&mut self) -> DomainResult<()> {
        if self.verification != VerificationStatus::InProcess {
            return Err(DomainError::invariant(format!(
                "producer is not in verification (current: {})",
                self.verification
            )));
        }

        self.verification = VerificationStatus::Verified;
        self.record(ProducerEvent::Verified(ProducerVerified {
            producer_id: self.id.clone(),
            occurred_at: Utc::now(),
        }));
        Ok(())
    }

    /// Set a new reputation score.
    ///
    /// An active producer must stay within `[0, 5]`. For inactive or suspended
    /// producers the range is not enforced; NaN is always rejected. Queues
    /// `ReputationChanged` only when the value actually changes.
    pub fn update_reputation(&mut self, value: f32) -> DomainResult<()> {
        if !value.is_finite() {
            return Err(DomainError::invariant("reputation must be a finite number"));
        }
        let next = Reputation::unchecked(value);
        if self.is_active() && !next.is_in_range() {
            return Err(DomainError::invariant(format!(
                "reputation {value} is outside the allowed range for an active producer"
            )));
        }

        let previous = self.reputation;
        self.reputation = next;

        if previous != next {
            self.record(ProducerEvent::ReputationChanged(ReputationChanged {
                producer_id: self.id.clone(),
                previous: previous.value(),
                reputation: next.value(),
                occurred_at: Utc::now(),
            }));
        }
        Ok(())
    }

    /// Soft delete: the producer stays stored but becomes Inactive.
    pub fn deactivate(&mut self) {
        self.activity = ActivityStatus::Inactive;
    }

    pub fn drain_events(&mut self) -> Vec<ProducerEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Overwrite the verification status from persisted state (no rules, no event).
    pub fn restore_verification(&mut self, verification: VerificationStatus) {
        self.verification = verification;
    }

    /// Overwrite the reputation from persisted state (no rules, no event).
    pub fn restore_reputation(&mut self, reputation: Reputation) {
        self.reputation = reputation;
    }

    fn record(&mut self, event: ProducerEvent) {
        self.pending.push(event);
    }
}

impl AggregateRoot for Producer {
    type Id = ProducerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Versioned for Producer {
    fn stamp_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Event: a producer entered the verification process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStarted {
    pub producer_id: ProducerId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a producer completed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerVerified {
    pub producer_id: ProducerId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a producer's reputation changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationChanged {
    pub producer_id: ProducerId,
    pub previous: f32,
    pub reputation: f32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ProducerEvent {
    VerificationStarted(VerificationStarted),
    Verified(ProducerVerified),
    ReputationChanged(ReputationChanged),
}

impl Event for ProducerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProducerEvent::VerificationStarted(_) => "catalog.producer.verification_started",
            ProducerEvent::Verified(_) => "catalog.producer.verified",
            ProducerEvent::ReputationChanged(_) => "catalog.producer.reputation_changed",
        }
    }

    fn subject_id(&self) -> &str {
        match self {
            ProducerEvent::VerificationStarted(e) => e.producer_id.as_str(),
            ProducerEvent::Verified(e) => e.producer_id.as_str(),
            ProducerEvent::ReputationChanged(e) => e.producer_id.as_str(),
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProducerEvent::VerificationStarted(e) => e.occurred_at,
            ProducerEvent::Verified(e) => e.occurred_at,
            ProducerEvent::ReputationChanged(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(verification: VerificationStatus, activity: ActivityStatus, reputation: f32) -> ProducerDraft {
        ProducerDraft {
            name: ProducerName::new("Doña Rosa").unwrap(),
            location: Location::new("Vereda La Palma", "Finca El Roble").unwrap(),
            verification,
            activity,
            reputation: Reputation::new(reputation).unwrap(),
            practices: CultivationPractices::new("Compost y control biológico").unwrap(),
        }
    }

    fn producer(verification: VerificationStatus, activity: ActivityStatus, reputation: f32) -> Producer {
        Producer::create(ProducerId::new("prod-1"), draft(verification, activity, reputation)).unwrap()
    }

    fn active_unverified() -> Producer {
        producer(VerificationStatus::Unverified, ActivityStatus::Active, 3.0)
    }

    #[test]
    fn create_rejects_empty_id() {
        let err = Producer::create(
            ProducerId::new(""),
            draft(VerificationStatus::Unverified, ActivityStatus::Active, 3.0),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_queues_no_events() {
        let mut p = active_unverified();
        assert!(p.drain_events().is_empty());
        assert_eq!(p.version(), 0);
    }

    #[test]
    fn can_publish_requires_verified_active_and_reputation() {
        let min = Reputation::new(4.0).unwrap();

        assert!(producer(VerificationStatus::Verified, ActivityStatus::Active, 4.5).can_publish(min));
        assert!(producer(VerificationStatus::Verified, ActivityStatus::Active, 4.0).can_publish(min));
        assert!(!producer(VerificationStatus::Verified, ActivityStatus::Active, 3.9).can_publish(min));
        assert!(!producer(VerificationStatus::Unverified, ActivityStatus::Active, 4.5).can_publish(min));
        assert!(!producer(VerificationStatus::InProcess, ActivityStatus::Active, 4.5).can_publish(min));
        assert!(!producer(VerificationStatus::Verified, ActivityStatus::Suspended, 4.5).can_publish(min));
        assert!(!producer(VerificationStatus::Verified, ActivityStatus::Inactive, 4.5).can_publish(min));
    }

    #[test]
    fn verification_runs_strictly_in_sequence() {
        let mut p = active_unverified();

        assert!(matches!(p.verify(), Err(DomainError::InvariantViolation(_))));

        p.start_verification().unwrap();
        assert_eq!(p.verification(), VerificationStatus::InProcess);
        assert!(matches!(p.start_verification(), Err(DomainError::InvariantViolation(_))));

        p.verify().unwrap();
        assert_eq!(p.verification(), VerificationStatus::Verified);
        assert!(matches!(p.start_verification(), Err(DomainError::InvariantViolation(_))));
        assert!(matches!(p.verify(), Err(DomainError::InvariantViolation(_))));

        let events = p.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ProducerEvent::VerificationStarted(_)));
        assert!(matches!(events[1], ProducerEvent::Verified(_)));
    }

    #[test]
    fn start_verification_requires_active_producer() {
        let mut p = producer(VerificationStatus::Unverified, ActivityStatus::Suspended, 3.0);
        match p.start_verification().unwrap_err() {
            DomainError::InvariantViolation(msg) => assert!(msg.contains("not active")),
            other => panic!("Expected InvariantViolation, got {other:?}"),
        }
        assert_eq!(p.verification(), VerificationStatus::Unverified);
        assert!(p.drain_events().is_empty());
    }

    #[test]
    fn reputation_change_queues_event_with_new_value() {
        let mut p = active_unverified();
        p.update_reputation(4.2).unwrap();

        assert_eq!(p.reputation().value(), 4.2);
        match p.drain_events().as_slice() {
            [ProducerEvent::ReputationChanged(e)] => {
                assert_eq!(e.reputation, 4.2);
                assert_eq!(e.previous, 3.0);
                assert_eq!(e.producer_id, ProducerId::new("prod-1"));
            }
            other => panic!("Expected one ReputationChanged event, got {other:?}"),
        }
    }

    #[test]
    fn unchanged_reputation_queues_nothing() {
        let mut p = active_unverified();
        p.update_reputation(3.0).unwrap();
        assert!(p.drain_events().is_empty());
    }

    #[test]
    fn active_producer_rejects_out_of_range_reputation() {
        let mut p = active_unverified();
        assert!(matches!(p.update_reputation(5.5), Err(DomainError::InvariantViolation(_))));
        assert!(matches!(p.update_reputation(-1.0), Err(DomainError::InvariantViolation(_))));
        assert_eq!(p.reputation().value(), 3.0);
        assert!(p.drain_events().is_empty());
    }

    #[test]
    fn inactive_producer_accepts_any_finite_reputation() {
        let mut p = producer(VerificationStatus::Verified, ActivityStatus::Inactive, 3.0);
        p.update_reputation(7.5).unwrap();
        assert_eq!(p.reputation().value(), 7.5);
        assert!(!p.reputation().is_in_range());
        assert_eq!(p.drain_events().len(), 1);
    }

    #[test]
    fn non_finite_reputation_is_always_rejected() {
        let mut inactive = producer(VerificationStatus::Verified, ActivityStatus::Inactive, 3.0);
        for value in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert!(matches!(
                inactive.update_reputation(value),
                Err(DomainError::InvariantViolation(_))
            ));
        }
        assert_eq!(inactive.reputation().value(), 3.0);
        assert!(inactive.drain_events().is_empty());
    }

    #[test]
    fn deactivate_is_a_soft_delete() {
        let mut p = producer(VerificationStatus::Verified, ActivityStatus::Active, 4.5);
        p.deactivate();
        assert_eq!(p.activity(), ActivityStatus::Inactive);
        assert!(!p.can_publish(Reputation::new(0.0).unwrap()));
        assert!(p.drain_events().is_empty());
    }

    #[test]
    fn event_metadata() {
        let mut p = active_unverified();
        p.start_verification().unwrap();
        let events = p.drain_events();
        assert_eq!(events[0].event_type(), "catalog.producer.verification_started");
        assert_eq!(events[0].subject_id(), "prod-1");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: an active producer accepts a reputation iff it is in [0, 5].
            #[test]
            fn active_reputation_update_iff_in_range(value in -10.0f32..10.0) {
                let mut p = active_unverified();
                let result = p.update_reputation(value);
                prop_assert_eq!(result.is_ok(), (0.0..=5.0).contains(&value));
                if result.is_err() {
                    prop_assert_eq!(p.reputation().value(), 3.0);
                }
            }

            /// Property: ReputationChanged is queued iff the value changed.
            #[test]
            fn reputation_event_iff_changed(value in 0.0f32..=5.0) {
                let mut p = active_unverified();
                p.update_reputation(value).unwrap();
                let events = p.drain_events();
                prop_assert_eq!(events.len(), usize::from(value != 3.0));
            }
        }
    }
}
