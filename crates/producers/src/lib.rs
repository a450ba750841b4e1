//! Producers domain module.
//!
//! Verification, reputation and activity rules for the farmers who publish
//! products. Pure domain logic; identity is assigned by the store.

pub mod producer;
pub mod value_objects;

pub use producer::{
    Producer, ProducerDraft, ProducerEvent, ProducerVerified, ReputationChanged,
    VerificationStarted,
};
pub use value_objects::{
    ActivityStatus, CultivationPractices, ProducerName, Reputation, VerificationStatus,
};
