//! Catalog use cases (application-level orchestration).
//!
//! Every mutating use case follows the same pipeline:
//!
//! ```text
//! load snapshot(s) from the store(s)
//!   ↓
//! run the aggregate operation (mutates, queues pending events)
//!   ↓
//! drain pending events
//!   ↓
//! versioned write back to the store
//!   ↓
//! publish the drained events, one by one
//! ```
//!
//! Nothing is published unless the write succeeded. A failed publish does
//! not roll the write back; the caller gets `CatalogError::Publish`.
//!
//! Publishing a product reads the producer and writes the product, so a
//! concurrent change to the producer could slip in between. The service
//! closes that window with a gate: use cases that change a producer's
//! eligibility hold it exclusively, product publication holds it shared.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use agrocatalog_core::{DomainError, ExpectedVersion, Location, ProducerId, ProductId};
use agrocatalog_events::{Event, EventBus};
use agrocatalog_producers::{Producer, ProducerDraft, Reputation};
use agrocatalog_products::{Product, ProductDescription, ProductImage, ProductName};

use crate::catalog_event::CatalogEvent;
use crate::config::CatalogConfig;
use crate::request::{PublishProduct, PublishProductRequest};
use crate::store::{ProducerStore, ProductStore};

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Business failure from an aggregate, value object or store.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The state change was persisted but at least one event failed to publish.
    #[error("{failed} event(s) failed to publish: {message}")]
    Publish { failed: usize, message: String },
}

impl CatalogError {
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            CatalogError::Domain(e) => Some(e),
            CatalogError::Publish { .. } => None,
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Available products and verified producers at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullCatalog {
    pub products: Vec<Product>,
    pub producers: Vec<Producer>,
    pub generated_at: DateTime<Utc>,
}

/// Outcome of a seasonal availability sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecomputeReport {
    pub examined: usize,
    pub changed: usize,
    pub failed: usize,
}

/// Orchestrates the catalog use cases over the two stores and an event bus.
#[derive(Debug)]
pub struct CatalogService<B> {
    products: ProductStore,
    producers: ProducerStore,
    bus: B,
    config: CatalogConfig,
    gate: RwLock<()>,
}

impl<B> CatalogService<B> {
    pub fn new(products: ProductStore, producers: ProducerStore, bus: B) -> Self {
        Self::with_config(products, producers, bus, CatalogConfig::default())
    }

    pub fn with_config(
        products: ProductStore,
        producers: ProducerStore,
        bus: B,
        config: CatalogConfig,
    ) -> Self {
        Self {
            products,
            producers,
            bus,
            config,
            gate: RwLock::new(()),
        }
    }

    pub fn products(&self) -> &ProductStore {
        &self.products
    }

    /// Writes made directly through the store bypass the publish gate.
    pub fn producers(&self) -> &ProducerStore {
        &self.producers
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }
}

impl<B> CatalogService<B>
where
    B: EventBus<CatalogEvent>,
{
    /// Register a new producer; the store assigns its identity.
    pub fn register_producer(&self, draft: ProducerDraft) -> CatalogResult<Producer> {
        let producer = self.producers.save(draft)?;
        tracing::info!(producer_id = %producer.id_typed(), "producer registered");
        Ok(producer)
    }

    /// Publish a product on behalf of a producer allowed to publish.
    pub fn publish_product(&self, command: PublishProduct) -> CatalogResult<Product> {
        let _shared = self.gate.read().unwrap_or_else(PoisonError::into_inner);

        let producer = self.producers.get_by_id(&command.product.producer_id)?;
        if !producer.can_publish(command.min_reputation) {
            return Err(DomainError::unauthorized(format!(
                "producer {} is not allowed to publish (verified: {}, active: {}, reputation: {}, required: {})",
                producer.id_typed(),
                producer.verification(),
                producer.activity(),
                producer.reputation(),
                command.min_reputation,
            ))
            .into());
        }

        let mut product = Product::create(command.product)?;
        let events = product.drain_events();
        let product = self.products.save(product)?;

        tracing::info!(
            product_id = %product.id_typed(),
            producer_id = %product.producer_id(),
            "product published"
        );
        self.publish(events)?;
        Ok(product)
    }

    /// Validate a raw request and publish it. A request without a minimum
    /// reputation uses the configured default.
    pub fn publish_product_request(&self, request: PublishProductRequest) -> CatalogResult<Product> {
        let command = request.into_command(&self.config, Utc::now())?;
        self.publish_product(command)
    }

    pub fn start_verification(&self, producer_id: &ProducerId) -> CatalogResult<Producer> {
        self.change_verification(producer_id, Producer::start_verification)
    }

    pub fn complete_verification(&self, producer_id: &ProducerId) -> CatalogResult<Producer> {
        self.change_verification(producer_id, Producer::verify)
    }

    pub fn update_reputation(&self, producer_id: &ProducerId, value: f32) -> CatalogResult<Producer> {
        let _exclusive = self.gate.write().unwrap_or_else(PoisonError::into_inner);

        let mut producer = self.producers.get_by_id(producer_id)?;
        producer.update_reputation(value)?;
        let events = producer.drain_events();
        let producer = self.producers.update_reputation(
            producer_id,
            producer.reputation(),
            ExpectedVersion::of(&producer),
        )?;

        tracing::info!(%producer_id, reputation = %producer.reputation(), "producer reputation updated");
        self.publish(events)?;
        Ok(producer)
    }

    /// Soft delete. The producer's products stay in the catalog but it can no
    /// longer publish.
    pub fn deactivate_producer(&self, producer_id: &ProducerId) -> CatalogResult<Producer> {
        let _exclusive = self.gate.write().unwrap_or_else(PoisonError::into_inner);

        let producer = self.producers.deactivate(producer_id)?;
        tracing::info!(%producer_id, "producer deactivated");
        Ok(producer)
    }

    pub fn mark_surplus(&self, product_id: &ProductId, now: DateTime<Utc>) -> CatalogResult<Product> {
        let mut product = self.products.get_by_id(product_id)?;
        product.mark_surplus(now)?;
        self.store_availability(product, "product marked as surplus")
    }

    pub fn deplete(&self, product_id: &ProductId) -> CatalogResult<Product> {
        let mut product = self.products.get_by_id(product_id)?;
        product.deplete()?;
        self.store_availability(product, "product depleted")
    }

    pub fn update_info(
        &self,
        product_id: &ProductId,
        name: ProductName,
        description: ProductDescription,
        image: ProductImage,
    ) -> CatalogResult<Product> {
        let mut product = self.products.get_by_id(product_id)?;
        product.update_info(name, description, image)?;
        let events = product.drain_events();
        let expected = ExpectedVersion::of(&product);
        let product = self.products.update(product, expected)?;

        tracing::info!(%product_id, "product information updated");
        self.publish(events)?;
        Ok(product)
    }

    /// Align every product's availability with its season as of `now`.
    ///
    /// Only changed products are written. A write that fails is logged and
    /// counted; the sweep continues with the next product. The sweep emits
    /// no events.
    pub fn recompute_availability(&self, now: DateTime<Utc>) -> CatalogResult<RecomputeReport> {
        Ok(self.recompute_snapshots(self.products.get_all(), now))
    }

    /// Sweep over snapshots taken earlier. A snapshot that went stale in the
    /// meantime fails its versioned write and is left untouched in the store.
    pub(crate) fn recompute_snapshots(&self, products: Vec<Product>, now: DateTime<Utc>) -> RecomputeReport {
        let mut report = RecomputeReport::default();

        for mut product in products {
            report.examined += 1;
            if !product.recompute_availability(now) {
                continue;
            }

            match self.products.update_state(
                product.id_typed(),
                product.availability(),
                ExpectedVersion::of(&product),
            ) {
                Ok(_) => report.changed += 1,
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!(
                        product_id = %product.id_typed(),
                        %error,
                        "skipping product during availability recompute"
                    );
                }
            }
        }

        tracing::info!(
            examined = report.examined,
            changed = report.changed,
            failed = report.failed,
            "availability recomputed"
        );
        report
    }

    /// All products of a known producer.
    pub fn products_by_producer(&self, producer_id: &ProducerId) -> CatalogResult<Vec<Product>> {
        self.producers.get_by_id(producer_id)?;
        Ok(self.products.find_by_producer(producer_id))
    }

    /// Available products of the verified, active producers at `location`.
    pub fn zone_available_products(&self, location: &Location) -> Vec<Product> {
        self.producers
            .find_by_location(location)
            .iter()
            .filter(|p| p.is_verified() && p.is_active())
            .flat_map(|p| self.products.find_by_producer(p.id_typed()))
            .filter(Product::is_available)
            .collect()
    }

    pub fn full_catalog(&self) -> FullCatalog {
        FullCatalog {
            products: self.products.find_available(),
            producers: self.producers.find_verified(),
            generated_at: Utc::now(),
        }
    }

    pub fn producers_eligible_to_publish(&self, min_reputation: Reputation) -> Vec<Producer> {
        self.producers
            .find_by_min_reputation(min_reputation)
            .into_iter()
            .filter(|p| p.can_publish(min_reputation))
            .collect()
    }

    fn change_verification(
        &self,
        producer_id: &ProducerId,
        transition: impl FnOnce(&mut Producer) -> Result<(), DomainError>,
    ) -> CatalogResult<Producer> {
        let _exclusive = self.gate.write().unwrap_or_else(PoisonError::into_inner);

        let mut producer = self.producers.get_by_id(producer_id)?;
        transition(&mut producer)?;
        let events = producer.drain_events();
        let producer = self.producers.update_verification(
            producer_id,
            producer.verification(),
            ExpectedVersion::of(&producer),
        )?;

        tracing::info!(%producer_id, verification = %producer.verification(), "producer verification changed");
        self.publish(events)?;
        Ok(producer)
    }

    fn store_availability(&self, mut product: Product, message: &'static str) -> CatalogResult<Product> {
        let events = product.drain_events();
        let product = self.products.update_state(
            product.id_typed(),
            product.availability(),
            ExpectedVersion::of(&product),
        )?;

        tracing::info!(product_id = %product.id_typed(), availability = %product.availability(), "{message}");
        self.publish(events)?;
        Ok(product)
    }

    /// Hand each event to the bus. Every event is attempted even after a failure.
    fn publish<E>(&self, events: Vec<E>) -> CatalogResult<()>
    where
        E: Into<CatalogEvent>,
    {
        let mut failed = 0usize;
        let mut first_error = None;

        for event in events {
            let event: CatalogEvent = event.into();
            let event_type = event.event_type();
            let subject = event.subject_id().to_string();

            if let Err(error) = self.bus.publish(event) {
                tracing::warn!(event_type, subject = %subject, %error, "event publication failed");
                failed += 1;
                first_error.get_or_insert_with(|| error.to_string());
            }
        }

        match first_error {
            None => Ok(()),
            Some(message) => Err(CatalogError::Publish { failed, message }),
        }
    }
}
