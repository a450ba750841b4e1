//! In-memory aggregate stores.
//!
//! Each store keeps snapshot copies behind a `RwLock`: readers never block
//! each other, writers are exclusive per store, and every read hands back an
//! owned clone, so callers never observe a later write through a value they
//! already hold.
//!
//! Both stores own the aggregates' version stamps. A fresh aggregate is saved
//! at version 1 and every successful write bumps it by one; writes carry an
//! `ExpectedVersion` and fail with `DomainError::Conflict` when it is stale.

mod producers;
mod products;

pub use producers::ProducerStore;
pub use products::ProductStore;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// Stores only ever hold complete snapshots, so a poisoned lock still guards
// consistent data.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
