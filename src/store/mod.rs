//! Entity Store
//!
//! Generic get/put/exists over the transactional key-value store, with JSON
//! serialization of entities. Both contract modules keep their entities in an
//! [`EntityStore`] parameterized by the entity type.

mod entity;
mod error;

pub use entity::{EntityStore, KeyScheme, State};
pub use error::StoreError;
