use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use agrocatalog_core::{
    AggregateRoot, DomainError, DomainResult, ExpectedVersion, Location, ProducerId, ProductId,
    Versioned,
};
use agrocatalog_products::{Availability, Category, Product};

use super::{read, write};

#[derive(Debug, Default)]
struct ProductTables {
    by_id: BTreeMap<ProductId, Product>,
    by_producer: BTreeMap<ProducerId, BTreeSet<ProductId>>,
}

impl ProductTables {
    fn index(&mut self, product: &Product) {
        self.by_producer
            .entry(product.producer_id().clone())
            .or_default()
            .insert(product.id_typed().clone());
    }

    fn unindex(&mut self, producer_id: &ProducerId, product_id: &ProductId) {
        if let Some(ids) = self.by_producer.get_mut(producer_id) {
            ids.remove(product_id);
            if ids.is_empty() {
                self.by_producer.remove(producer_id);
            }
        }
    }

    fn current(&mut self, id: &ProductId) -> DomainResult<&mut Product> {
        self.by_id
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("product {id} not found")))
    }

    fn select(&self, mut keep: impl FnMut(&Product) -> bool) -> Vec<Product> {
        self.by_id.values().filter(|p| keep(p)).cloned().collect()
    }
}

/// In-memory product store with a secondary index by producer.
///
/// Scans return products ordered by id.
#[derive(Debug, Default)]
pub struct ProductStore {
    inner: RwLock<ProductTables>,
}

impl ProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new product at version 1.
    ///
    /// Pending events are not part of the stored snapshot; drain them before
    /// saving.
    pub fn save(&self, mut product: Product) -> DomainResult<Product> {
        let mut tables = write(&self.inner);
        if tables.by_id.contains_key(product.id_typed()) {
            return Err(DomainError::conflict(format!(
                "product {} already exists",
                product.id_typed()
            )));
        }

        product.drain_events();
        product.stamp_version(1);
        tables.index(&product);
        tables.by_id.insert(product.id_typed().clone(), product.clone());

        tracing::debug!(product_id = %product.id_typed(), "product saved");
        Ok(product)
    }

    pub fn get_by_id(&self, id: &ProductId) -> DomainResult<Product> {
        read(&self.inner)
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("product {id} not found")))
    }

    /// Replace the stored snapshot.
    pub fn update(&self, mut product: Product, expected: ExpectedVersion) -> DomainResult<Product> {
        let mut tables = write(&self.inner);
        let current = tables.current(product.id_typed())?;
        expected.check(current.version())?;

        let previous_producer = current.producer_id().clone();
        product.drain_events();
        product.stamp_version(current.version() + 1);
        *current = product.clone();

        if &previous_producer != product.producer_id() {
            tables.unindex(&previous_producer, product.id_typed());
            tables.index(&product);
        }

        tracing::debug!(
            product_id = %product.id_typed(),
            version = product.version(),
            "product updated"
        );
        Ok(product)
    }

    /// Overwrite only the availability state.
    pub fn update_state(
        &self,
        id: &ProductId,
        availability: Availability,
        expected: ExpectedVersion,
    ) -> DomainResult<Product> {
        let mut tables = write(&self.inner);
        let current = tables.current(id)?;
        expected.check(current.version())?;

        current.restore_availability(availability);
        let version = current.version() + 1;
        current.stamp_version(version);

        tracing::debug!(product_id = %id, %availability, version, "product availability updated");
        Ok(current.clone())
    }

    pub fn find_by_producer(&self, producer_id: &ProducerId) -> Vec<Product> {
        let tables = read(&self.inner);
        tables
            .by_producer
            .get(producer_id)
            .map(|ids| ids.iter().filter_map(|id| tables.by_id.get(id)).cloned().collect())
            .unwrap_or_default()
    }

    pub fn find_by_category(&self, category: Category) -> Vec<Product> {
        read(&self.inner).select(|p| p.category() == category)
    }

    pub fn find_by_availability(&self, availability: Availability) -> Vec<Product> {
        read(&self.inner).select(|p| p.availability() == availability)
    }

    pub fn find_by_location(&self, location: &Location) -> Vec<Product> {
        read(&self.inner).select(|p| p.location() == location)
    }

    /// Products whose season window contains `at`.
    pub fn find_in_season(&self, at: DateTime<Utc>) -> Vec<Product> {
        read(&self.inner).select(|p| p.is_in_season(at))
    }

    pub fn find_available(&self) -> Vec<Product> {
        self.find_by_availability(Availability::Available)
    }

    pub fn get_all(&self) -> Vec<Product> {
        read(&self.inner).by_id.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        read(&self.inner).by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrocatalog_products::{
        NewProduct, ProductDescription, ProductImage, ProductName, ProductionType, SeasonWindow,
    };
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap()
    }

    fn product(id: &str, producer: &str, category: Category) -> Product {
        let season = SeasonWindow::new_at(
            Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap(),
            now(),
        )
        .unwrap();
        Product::create_at(
            NewProduct {
                id: ProductId::new(id),
                name: ProductName::new("Tomate chonto").unwrap(),
                description: ProductDescription::new("Tomate cultivado sin agroquímicos").unwrap(),
                category,
                production_type: ProductionType::agroecological(),
                season,
                location: Location::new("Vereda El Placer", "Finca La Esperanza").unwrap(),
                image: ProductImage::new("https://img.example/tomate.jpg", "tomate").unwrap(),
                producer_id: ProducerId::new(producer),
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn save_assigns_version_one_and_strips_pending_events() {
        let store = ProductStore::new();
        let saved = store.save(product("p-1", "farmer-1", Category::Vegetable)).unwrap();
        assert_eq!(saved.version(), 1);

        let mut loaded = store.get_by_id(&ProductId::new("p-1")).unwrap();
        assert_eq!(loaded.version(), 1);
        assert!(loaded.drain_events().is_empty());
    }

    #[test]
    fn duplicate_save_conflicts() {
        let store = ProductStore::new();
        store.save(product("p-1", "farmer-1", Category::Vegetable)).unwrap();
        let err = store.save(product("p-1", "farmer-2", Category::Fruit)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_product_is_not_found() {
        let store = ProductStore::new();
        let err = store.get_by_id(&ProductId::new("nope")).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = store
            .update_state(&ProductId::new("nope"), Availability::Depleted, ExpectedVersion::Any)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn stale_update_is_rejected() {
        let store = ProductStore::new();
        let saved = store.save(product("p-1", "farmer-1", Category::Vegetable)).unwrap();

        let mut first = saved.clone();
        first.deplete().unwrap();
        store.update(first, ExpectedVersion::of(&saved)).unwrap();

        let mut second = saved.clone();
        second.mark_surplus(now()).unwrap();
        let err = store.update(second, ExpectedVersion::of(&saved)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let stored = store.get_by_id(&ProductId::new("p-1")).unwrap();
        assert_eq!(stored.availability(), Availability::Depleted);
        assert_eq!(stored.version(), 2);
    }

    #[test]
    fn update_state_changes_only_availability() {
        let store = ProductStore::new();
        let saved = store.save(product("p-1", "farmer-1", Category::Tuber)).unwrap();

        let updated = store
            .update_state(saved.id_typed(), Availability::Surplus, ExpectedVersion::Exact(1))
            .unwrap();
        assert_eq!(updated.availability(), Availability::Surplus);
        assert_eq!(updated.version(), 2);
        assert_eq!(updated.name(), saved.name());
        assert_eq!(updated.published_at(), saved.published_at());
    }

    #[test]
    fn snapshots_are_isolated_from_later_writes() {
        let store = ProductStore::new();
        store.save(product("p-1", "farmer-1", Category::Fruit)).unwrap();
        let before = store.get_by_id(&ProductId::new("p-1")).unwrap();

        store
            .update_state(&ProductId::new("p-1"), Availability::Depleted, ExpectedVersion::Any)
            .unwrap();

        assert_eq!(before.availability(), Availability::Available);
    }

    #[test]
    fn scans_filter_and_index() {
        let store = ProductStore::new();
        store.save(product("p-1", "farmer-1", Category::Fruit)).unwrap();
        store.save(product("p-2", "farmer-1", Category::Vegetable)).unwrap();
        store.save(product("p-3", "farmer-2", Category::Fruit)).unwrap();
        store
            .update_state(&ProductId::new("p-2"), Availability::Depleted, ExpectedVersion::Any)
            .unwrap();

        let ids = |products: Vec<Product>| -> Vec<String> {
            products.iter().map(|p| p.id_typed().to_string()).collect()
        };

        assert_eq!(ids(store.find_by_producer(&ProducerId::new("farmer-1"))), ["p-1", "p-2"]);
        assert!(store.find_by_producer(&ProducerId::new("farmer-9")).is_empty());
        assert_eq!(ids(store.find_by_category(Category::Fruit)), ["p-1", "p-3"]);
        assert_eq!(ids(store.find_available()), ["p-1", "p-3"]);
        assert_eq!(ids(store.find_by_availability(Availability::Depleted)), ["p-2"]);

        let location = Location::new("Vereda El Placer", "Finca La Esperanza").unwrap();
        assert_eq!(store.find_by_location(&location).len(), 3);
        let elsewhere = Location::new("Vereda El Placer", "Finca Otra").unwrap();
        assert!(store.find_by_location(&elsewhere).is_empty());

        let in_season = Utc.with_ymd_and_hms(2025, 10, 15, 0, 0, 0).unwrap();
        assert_eq!(store.find_in_season(in_season).len(), 3);
        assert!(store.find_in_season(in_season + Duration::days(90)).is_empty());
        assert_eq!(store.get_all().len(), 3);
    }
}
