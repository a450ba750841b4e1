//! Infrastructure layer: in-memory stores, configuration and the catalog
//! service that ties aggregates, stores and the event bus together.

pub mod catalog_event;
pub mod catalog_service;
pub mod config;
pub mod request;
pub mod store;


pub use catalog_event::CatalogEvent;
pub use catalog_service::{CatalogError, CatalogResult, CatalogService, FullCatalog, RecomputeReport};
pub use config::CatalogConfig;
pub use request::{PublishProduct, PublishProductRequest};
pub use store::{ProducerStore, ProductStore};
