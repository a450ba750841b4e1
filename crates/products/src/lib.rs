//! Products domain module.
//!
//! Business rules for catalog products, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod product;
pub mod value_objects;

pub use product::{
    NewProduct, Product, ProductDepleted, ProductEvent, ProductMarkedSurplus, ProductPublished,
};
pub use value_objects::{
    Availability, Category, ProductDescription, ProductImage, ProductName, ProductionType,
    SeasonWindow,
};
