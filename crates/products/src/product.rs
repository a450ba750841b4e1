use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agrocatalog_core::{
    AggregateRoot, DomainError, DomainResult, Location, ProducerId, ProductId, Versioned,
};
use agrocatalog_events::Event;

use crate::value_objects::{
    Availability, Category, ProductDescription, ProductImage, ProductName, ProductionType,
    SeasonWindow,
};

/// Everything needed to publish a product. Value objects are already
/// validated; `Product::create` only checks the references.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: ProductName,
    pub description: ProductDescription,
    pub category: Category,
    pub production_type: ProductionType,
    pub season: SeasonWindow,
    pub location: Location,
    pub image: ProductImage,
    pub producer_id: ProducerId,
}

/// Aggregate root: an agroecological product offered by a producer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    id: ProductId,
    name: ProductName,
    description: ProductDescription,
    category: Category,
    production_type: ProductionType,
    season: SeasonWindow,
    availability: Availability,
    location: Location,
    image: ProductImage,
    producer_id: ProducerId,
    published_at: DateTime<Utc>,
    version: u64,
    #[serde(skip)]
    pending: Vec<ProductEvent>,
}

impl Product {
    /// Publish a new product now. Queues `ProductEvent::Published`.
    pub fn create(new: NewProduct) -> DomainResult<Self> {
        Self::create_at(new, Utc::now())
    }

    /// Publish a new product with an explicit publication timestamp.
    pub fn create_at(new: NewProduct, published_at: DateTime<Utc>) -> DomainResult<Self> {
        if new.producer_id.is_blank() {
            return Err(DomainError::validation("producer_id cannot be empty"));
        }
        if new.id.is_blank() {
            return Err(DomainError::validation("product_id cannot be empty"));
        }

        let mut product = Self {
            id: new.id,
            name: new.name,
            description: new.description,
            category: new.category,
            production_type: new.production_type,
            season: new.season,
            availability: Availability::Available,
            location: new.location,
            image: new.image,
            producer_id: new.producer_id,
            published_at,
            version: 0,
            pending: Vec::new(),
        };

        product.record(ProductEvent::Published(ProductPublished {
            product_id: product.id.clone(),
            producer_id: product.producer_id.clone(),
            occurred_at: published_at,
        }));

        Ok(product)
    }

    pub fn id_typed(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &ProductName {
        &self.name
    }

    pub fn description(&self) -> &ProductDescription {
        &self.description
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn production_type(&self) -> &ProductionType {
        &self.production_type
    }

    pub fn season(&self) -> &SeasonWindow {
        &self.season
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn image(&self) -> &ProductImage {
        &self.image
    }

    pub fn producer_id(&self) -> &ProducerId {
        &self.producer_id
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    pub fn is_in_season(&self, at: DateTime<Utc>) -> bool {
        self.season.contains(at)
    }

    /// Mark the product as surplus. Only legal outside its season window.
    pub fn mark_surplus(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.season.contains(now) {
            return Err(DomainError::invariant(
                "a product cannot be marked as surplus while in season",
            ));
        }

        self.availability = Availability::Surplus;
        self.record(ProductEvent::MarkedSurplus(ProductMarkedSurplus {
            product_id: self.id.clone(),
            occurred_at: now,
        }));
        Ok(())
    }

    /// Available -> Depleted.
    pub fn deplete(&mut self) -> DomainResult<()> {
        if self.availability != Availability::Available {
            return Err(DomainError::invariant(format!(
                "only an available product can be depleted (current: {})",
                self.availability
            )));
        }

        self.availability = Availability::Depleted;
        self.record(ProductEvent::Depleted(ProductDepleted {
            product_id: self.id.clone(),
            occurred_at: Utc::now(),
        }));
        Ok(())
    }

    /// Recalculate availability from the season window.
    ///
    /// In season -> Available; out of season -> Depleted. Surplus is sticky:
    /// only an explicit write moves a product out of it. Queues no event.
    /// Returns whether the state changed, so callers only persist real changes.
    pub fn recompute_availability(&mut self, now: DateTime<Utc>) -> bool {
        let previous = self.availability;
        if previous == Availability::Surplus {
            return false;
        }
        self.availability = if self.season.contains(now) {
            Availability::Available
        } else {
            Availability::Depleted
        };
        self.availability != previous
    }

    /// Replace the descriptive fields. Rejected while depleted.
    pub fn update_info(
        &mut self,
        name: ProductName,
        description: ProductDescription,
        image: ProductImage,
    ) -> DomainResult<()> {
        if self.availability == Availability::Depleted {
            return Err(DomainError::invariant(
                "cannot update the information of a depleted product",
            ));
        }

        self.name = name;
        self.description = description;
        self.image = image;
        Ok(())
    }

    /// Take every pending event, leaving the buffer empty.
    pub fn drain_events(&mut self) -> Vec<ProductEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Overwrite availability from persisted state. No transition rules are
    /// checked and no event is queued; use the domain operations for business
    /// changes.
    pub fn restore_availability(&mut self, availability: Availability) {
        self.availability = availability;
    }

    fn record(&mut self, event: ProductEvent) {
        self.pending.push(event);
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Versioned for Product {
    fn stamp_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Event: a product was published to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPublished {
    pub product_id: ProductId,
    pub producer_id: ProducerId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a product was marked as surplus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMarkedSurplus {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a product ran out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDepleted {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ProductEvent {
    Published(ProductPublished),
    MarkedSurplus(ProductMarkedSurplus),
    Depleted(ProductDepleted),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::Published(_) => "catalog.product.published",
            ProductEvent::MarkedSurplus(_) => "catalog.product.marked_surplus",
            ProductEvent::Depleted(_) => "catalog.product.depleted",
        }
    }

    fn subject_id(&self) -> &str {
        match self {
            ProductEvent::Published(e) => e.product_id.as_str(),
            ProductEvent::MarkedSurplus(e) => e.product_id.as_str(),
            ProductEvent::Depleted(e) => e.product_id.as_str(),
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::Published(e) => e.occurred_at,
            ProductEvent::MarkedSurplus(e) => e.occurred_at,
            ProductEvent::Depleted(e) => e.occurred_at,
        }
    }
}
