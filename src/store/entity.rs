//! Generic entity store over a [`LedgerStub`].

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::ledger::key::{create_composite_key, make_key};
use crate::ledger::LedgerStub;

use super::StoreError;

/// An entity that can be kept in an [`EntityStore`]
pub trait State: Serialize + DeserializeOwned {
    /// Identifier parts that make up the entity's primary key
    fn key_parts(&self) -> Vec<String>;
}

/// How an entity's key parts become a ledger key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScheme {
    /// Parts joined with `:`
    Simple,
    /// Composite key with the given object type
    Composite(&'static str),
}

/// Typed access to the entities of one kind in the current namespace
#[derive(Debug, Clone, Copy)]
pub struct EntityStore<T> {
    name: &'static str,
    scheme: KeyScheme,
    _entity: PhantomData<fn() -> T>,
}

impl<T: State> EntityStore<T> {
    /// Store whose entities live under simple keys
    pub const fn simple(name: &'static str) -> Self {
        Self {
            name,
            scheme: KeyScheme::Simple,
            _entity: PhantomData,
        }
    }

    /// Store whose entities live under composite keys of `object_type`
    pub const fn composite(name: &'static str, object_type: &'static str) -> Self {
        Self {
            name,
            scheme: KeyScheme::Composite(object_type),
            _entity: PhantomData,
        }
    }

    /// Ledger key of the entity identified by `parts`
    pub fn key_for(&self, parts: &[&str]) -> Result<String, StoreError> {
        let key = match self.scheme {
            KeyScheme::Simple => make_key(parts)?,
            KeyScheme::Composite(object_type) => create_composite_key(object_type, parts)?,
        };
        Ok(key)
    }

    /// Load the entity identified by `parts`
    pub fn get(&self, stub: &mut dyn LedgerStub, parts: &[&str]) -> Result<Option<T>, StoreError> {
        let key = self.key_for(parts)?;
        tracing::debug!(store = self.name, key = %key.escape_debug(), "Loading entity");

        match stub.get_state(&key)? {
            Some(bytes) => Ok(Some(self.deserialize(&key, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Check whether the entity identified by `parts` exists
    pub fn exists(&self, stub: &mut dyn LedgerStub, parts: &[&str]) -> Result<bool, StoreError> {
        let key = self.key_for(parts)?;
        Ok(stub.get_state(&key)?.is_some())
    }

    /// Stage a write of `state` under its primary key
    pub fn put(&self, stub: &mut dyn LedgerStub, state: &T) -> Result<(), StoreError> {
        let parts = state.key_parts();
        let key = self.key_for(&as_strs(&parts))?;
        let bytes = self.serialize(state)?;
        stub.put_state(&key, bytes)?;
        Ok(())
    }

    /// Stage a write of `state` under its primary key and under a composite index key.
    /// Both entries carry the same bytes.
    pub fn put_with_index(
        &self,
        stub: &mut dyn LedgerStub,
        state: &T,
        index: &str,
        index_attributes: &[&str],
    ) -> Result<(), StoreError> {
        let parts = state.key_parts();
        let key = self.key_for(&as_strs(&parts))?;
        let index_key = create_composite_key(index, index_attributes)?;
        let bytes = self.serialize(state)?;

        stub.put_state(&key, bytes.clone())?;
        stub.put_state(&index_key, bytes)?;
        Ok(())
    }

    /// All entities stored under composite keys of `object_type` starting with `attributes`
    pub fn scan(
        &self,
        stub: &mut dyn LedgerStub,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<Vec<T>, StoreError> {
        let entries = stub.get_state_by_partial_composite_key(object_type, attributes)?;
        tracing::debug!(
            store = self.name,
            object_type = %object_type,
            matched = entries.len(),
            "Scanned entities"
        );

        entries
            .iter()
            .map(|entry| self.deserialize(&entry.key, &entry.value))
            .collect()
    }

    fn serialize(&self, state: &T) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(state).map_err(|source| StoreError::Serialize {
            name: self.name,
            source,
        })
    }

    fn deserialize(&self, key: &str, bytes: &[u8]) -> Result<T, StoreError> {
        serde_json::from_slice(bytes).map_err(|source| StoreError::Deserialize {
            name: self.name,
            key: key.escape_debug().to_string(),
            source,
        })
    }
}

fn as_strs(parts: &[String]) -> Vec<&str> {
    parts.iter().map(String::as_str).collect()
}
