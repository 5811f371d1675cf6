use super::{
    proto::{Key, KeyStatusType},
    registry::Primitive,
};
use crate::Error;
use std::sync::Arc;

/// A live primitive together with the key it was built from.
#[derive(Clone)]
pub struct Entry {
    key_id: u32,
    primitive: Arc<dyn Primitive>,
    status: KeyStatusType,
    type_url: String,
    primary: bool,
}

impl Entry {
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    pub fn primitive(&self) -> &dyn Primitive {
        self.primitive.as_ref()
    }

    pub fn status(&self) -> KeyStatusType {
        self.status
    }

    pub fn type_url(&self) -> &str {
        &self.type_url
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }
}

/// The live primitives of a keyset, one per enabled key, exactly one of which is primary.
///
/// Rebuilt from a [super::Handle] on every load and never persisted.
#[derive(Clone, Default)]
pub struct PrimitiveSet {
    entries: Vec<Entry>,
    primary: Option<usize>,
}

impl PrimitiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the primitive built from `key`. Only enabled keys may be added.
    pub fn add(&mut self, primitive: Arc<dyn Primitive>, key: &Key) -> Result<&Entry, Error> {
        if key.status() != KeyStatusType::Enabled {
            return Err(Error::InvalidKeyset("key is not enabled"));
        }
        if self.entries.iter().any(|entry| entry.key_id == key.key_id) {
            return Err(Error::InvalidKeyset("duplicate key id"));
        }
        let type_url = key
            .key_data
            .as_ref()
            .map(|data| data.type_url.clone())
            .ok_or(Error::InvalidKeyset("key without key data"))?;
        self.entries.push(Entry {
            key_id: key.key_id,
            primitive,
            status: key.status(),
            type_url,
            primary: false,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Marks the entry with the provided key id as primary.
    pub fn set_primary(&mut self, key_id: u32) -> Result<(), Error> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.key_id == key_id)
            .ok_or(Error::KeyNotFound(key_id))?;
        if let Some(previous) = self.primary {
            self.entries[previous].primary = false;
        }
        self.entries[index].primary = true;
        self.primary = Some(index);
        Ok(())
    }

    pub fn primary(&self) -> Option<&Entry> {
        self.primary.map(|index| &self.entries[index])
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
