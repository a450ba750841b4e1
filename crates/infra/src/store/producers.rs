use std::collections::BTreeMap;
use std::sync::RwLock;

use agrocatalog_core::{
    AggregateRoot, DomainError, DomainResult, ExpectedVersion, Location, ProducerId, Versioned,
};
use agrocatalog_producers::{Producer, ProducerDraft, Reputation, VerificationStatus};

use super::{read, write};

/// In-memory producer store.
///
/// The store is the only source of producer identity: `save` takes a
/// [`ProducerDraft`] and assigns a fresh id.
#[derive(Debug, Default)]
pub struct ProducerStore {
    inner: RwLock<BTreeMap<ProducerId, Producer>>,
}

impl ProducerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a producer under a newly generated id, at version 1.
    pub fn save(&self, draft: ProducerDraft) -> DomainResult<Producer> {
        let mut producer = Producer::create(ProducerId::generate(), draft)?;
        producer.stamp_version(1);

        let mut map = write(&self.inner);
        if map.contains_key(producer.id_typed()) {
            return Err(DomainError::conflict(format!(
                "producer {} already exists",
                producer.id_typed()
            )));
        }
        map.insert(producer.id_typed().clone(), producer.clone());

        tracing::debug!(producer_id = %producer.id_typed(), "producer saved");
        Ok(producer)
    }

    pub fn get_by_id(&self, id: &ProducerId) -> DomainResult<Producer> {
        read(&self.inner)
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Replace the stored snapshot.
    pub fn update(&self, mut producer: Producer, expected: ExpectedVersion) -> DomainResult<Producer> {
        let mut map = write(&self.inner);
        let current = map.get_mut(producer.id_typed()).ok_or_else(|| not_found(producer.id_typed()))?;
        expected.check(current.version())?;

        producer.drain_events();
        producer.stamp_version(current.version() + 1);
        *current = producer.clone();

        tracing::debug!(
            producer_id = %producer.id_typed(),
            version = producer.version(),
            "producer updated"
        );
        Ok(producer)
    }

    pub fn update_verification(
        &self,
        id: &ProducerId,
        verification: VerificationStatus,
        expected: ExpectedVersion,
    ) -> DomainResult<Producer> {
        self.modify(id, expected, |p| p.restore_verification(verification))
    }

    pub fn update_reputation(
        &self,
        id: &ProducerId,
        reputation: Reputation,
        expected: ExpectedVersion,
    ) -> DomainResult<Producer> {
        self.modify(id, expected, |p| p.restore_reputation(reputation))
    }

    /// Soft delete: the producer stays stored with activity set to Inactive.
    pub fn deactivate(&self, id: &ProducerId) -> DomainResult<Producer> {
        self.modify(id, ExpectedVersion::Any, Producer::deactivate)
    }

    pub fn find_by_location(&self, location: &Location) -> Vec<Producer> {
        self.select(|p| p.location() == location)
    }

    pub fn find_by_verification(&self, verification: VerificationStatus) -> Vec<Producer> {
        self.select(|p| p.verification() == verification)
    }

    pub fn find_verified(&self) -> Vec<Producer> {
        self.find_by_verification(VerificationStatus::Verified)
    }

    /// Producers whose verification is in process.
    pub fn find_pending_verification(&self) -> Vec<Producer> {
        self.find_by_verification(VerificationStatus::InProcess)
    }

    pub fn find_by_min_reputation(&self, min: Reputation) -> Vec<Producer> {
        self.select(|p| p.reputation() >= min)
    }

    pub fn get_all(&self) -> Vec<Producer> {
        read(&self.inner).values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        read(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn modify(
        &self,
        id: &ProducerId,
        expected: ExpectedVersion,
        change: impl FnOnce(&mut Producer),
    ) -> DomainResult<Producer> {
        let mut map = write(&self.inner);
        let current = map.get_mut(id).ok_or_else(|| not_found(id))?;
        expected.check(current.version())?;

        change(current);
        let version = current.version() + 1;
        current.stamp_version(version);

        tracing::debug!(producer_id = %id, version, "producer updated");
        Ok(current.clone())
    }

    fn select(&self, mut keep: impl FnMut(&Producer) -> bool) -> Vec<Producer> {
        read(&self.inner).values().filter(|p| keep(p)).cloned().collect()
    }
}

fn not_found(id: &ProducerId) -> DomainError {
    DomainError::not_found(format!("producer {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrocatalog_producers::{ActivityStatus, CultivationPractices, ProducerName};

    fn draft(zone: &str, verification: VerificationStatus, reputation: f32) -> ProducerDraft {
        ProducerDraft {
            name: ProducerName::new("Cooperativa Tierra Viva").unwrap(),
            location: Location::new(zone, "Finca San José").unwrap(),
            verification,
            activity: ActivityStatus::Active,
            reputation: Reputation::new(reputation).unwrap(),
            practices: CultivationPractices::new("Policultivos y abonos verdes").unwrap(),
        }
    }

    #[test]
    fn save_assigns_fresh_identity() {
        let store = ProducerStore::new();
        let a = store.save(draft("Vereda Alta", VerificationStatus::Unverified, 3.0)).unwrap();
        let b = store.save(draft("Vereda Alta", VerificationStatus::Unverified, 3.0)).unwrap();

        assert!(!a.id_typed().is_blank());
        assert_ne!(a.id_typed(), b.id_typed());
        assert_eq!(a.version(), 1);
        assert_eq!(store.get_by_id(a.id_typed()).unwrap(), a);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn unknown_producer_is_not_found() {
        let store = ProducerStore::new();
        let id = ProducerId::new("ghost");
        assert!(matches!(store.get_by_id(&id), Err(DomainError::NotFound(_))));
        assert!(matches!(store.deactivate(&id), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn targeted_updates_bump_version_and_check_expectations() {
        let store = ProducerStore::new();
        let saved = store.save(draft("Vereda Alta", VerificationStatus::Unverified, 3.0)).unwrap();
        let id = saved.id_typed().clone();

        let updated = store
            .update_verification(&id, VerificationStatus::InProcess, ExpectedVersion::of(&saved))
            .unwrap();
        assert_eq!(updated.version(), 2);
        assert_eq!(updated.verification(), VerificationStatus::InProcess);

        let err = store
            .update_reputation(&id, Reputation::new(4.0).unwrap(), ExpectedVersion::of(&saved))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let updated = store
            .update_reputation(&id, Reputation::new(4.0).unwrap(), ExpectedVersion::Exact(2))
            .unwrap();
        assert_eq!(updated.reputation().value(), 4.0);
        assert_eq!(updated.verification(), VerificationStatus::InProcess);
    }

    #[test]
    fn deactivate_keeps_the_record() {
        let store = ProducerStore::new();
        let saved = store.save(draft("Vereda Alta", VerificationStatus::Verified, 4.5)).unwrap();

        store.deactivate(saved.id_typed()).unwrap();

        let stored = store.get_by_id(saved.id_typed()).unwrap();
        assert_eq!(stored.activity(), ActivityStatus::Inactive);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn full_update_replaces_snapshot() {
        let store = ProducerStore::new();
        let saved = store.save(draft("Vereda Alta", VerificationStatus::Unverified, 3.0)).unwrap();

        let mut changed = saved.clone();
        changed.start_verification().unwrap();
        let stored = store.update(changed, ExpectedVersion::of(&saved)).unwrap();

        assert_eq!(stored.verification(), VerificationStatus::InProcess);
        assert_eq!(stored.version(), 2);
        assert!(store.get_by_id(saved.id_typed()).unwrap().drain_events().is_empty());
    }

    #[test]
    fn scans() {
        let store = ProducerStore::new();
        store.save(draft("Vereda Alta", VerificationStatus::Verified, 4.5)).unwrap();
        store.save(draft("Vereda Alta", VerificationStatus::InProcess, 2.0)).unwrap();
        store.save(draft("Vereda Baja", VerificationStatus::Verified, 3.5)).unwrap();

        let alta = Location::new("Vereda Alta", "Finca San José").unwrap();
        assert_eq!(store.find_by_location(&alta).len(), 2);
        assert_eq!(store.find_verified().len(), 2);
        assert_eq!(store.find_pending_verification().len(), 1);
        assert_eq!(store.find_by_min_reputation(Reputation::new(3.5).unwrap()).len(), 2);
        assert_eq!(store.find_by_verification(VerificationStatus::Unverified).len(), 0);
        assert_eq!(store.get_all().len(), 3);
    }
}
