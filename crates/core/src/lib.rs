//! Domain building blocks shared by every catalog crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod error;
pub mod id;
pub mod location;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion, Versioned};
pub use error::{DomainError, DomainResult};
pub use id::{ProducerId, ProductId};
pub use location::Location;
pub use value_object::ValueObject;
