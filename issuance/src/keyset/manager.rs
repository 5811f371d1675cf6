use super::{
    handle::Handle,
    proto::{Key, KeyStatusType, KeyTemplate, Keyset},
    registry::Registry,
};
use crate::Error;
use rand::{rngs::OsRng, RngCore};
use tracing::{debug, info};

/// Mutates a keyset: adds keys, rotates the primary, and enables or disables keys.
#[derive(Clone, Debug, Default)]
pub struct Manager {
    keyset: Keyset,
}

impl Manager {
    /// Creates a manager over an empty keyset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager over a copy of an existing keyset.
    pub fn from_handle(handle: &Handle) -> Self {
        Self {
            keyset: handle.keyset().clone(),
        }
    }

    /// Generates a new enabled key from `template` and returns its id.
    ///
    /// The new key does not become primary.
    pub fn add(&mut self, registry: &Registry, template: &KeyTemplate) -> Result<u32, Error> {
        let key_data = registry.new_key_data(template)?;
        let key_id = self.new_key_id();
        self.keyset.key.push(Key {
            key_data: Some(key_data),
            status: KeyStatusType::Enabled as i32,
            key_id,
        });
        debug!(key_id, type_url = %template.type_url, "added key");
        Ok(key_id)
    }

    /// Makes an enabled key primary.
    pub fn set_primary(&mut self, key_id: u32) -> Result<(), Error> {
        let key = self.find(key_id)?;
        if key.status() != KeyStatusType::Enabled {
            return Err(Error::InvalidKeyset("primary key must be enabled"));
        }
        self.keyset.primary_key_id = key_id;
        info!(key_id, "rotated primary key");
        Ok(())
    }

    /// Enables a disabled key.
    pub fn enable(&mut self, key_id: u32) -> Result<(), Error> {
        let key = self.find_mut(key_id)?;
        match key.status() {
            KeyStatusType::Enabled | KeyStatusType::Disabled => {
                key.set_status(KeyStatusType::Enabled);
                Ok(())
            }
            _ => Err(Error::InvalidKeyset("cannot enable key")),
        }
    }

    /// Disables a key. The primary key cannot be disabled.
    pub fn disable(&mut self, key_id: u32) -> Result<(), Error> {
        if key_id == self.keyset.primary_key_id {
            return Err(Error::InvalidKeyset("cannot disable the primary key"));
        }
        let key = self.find_mut(key_id)?;
        match key.status() {
            KeyStatusType::Enabled | KeyStatusType::Disabled => {
                key.set_status(KeyStatusType::Disabled);
                Ok(())
            }
            _ => Err(Error::InvalidKeyset("cannot disable key")),
        }
    }

    /// Returns a validated handle over the current keyset.
    pub fn handle(&self) -> Result<Handle, Error> {
        Handle::new(self.keyset.clone())
    }

    fn find(&self, key_id: u32) -> Result<&Key, Error> {
        self.keyset
            .key
            .iter()
            .find(|key| key.key_id == key_id)
            .ok_or(Error::KeyNotFound(key_id))
    }

    fn find_mut(&mut self, key_id: u32) -> Result<&mut Key, Error> {
        self.keyset
            .key
            .iter_mut()
            .find(|key| key.key_id == key_id)
            .ok_or(Error::KeyNotFound(key_id))
    }

    fn new_key_id(&self) -> u32 {
        loop {
            let candidate = OsRng.next_u32();
            if self.keyset.key.iter().all(|key| key.key_id != candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyset::registry::mocks::{OpaqueKeyManager, TYPE_URL};
    use std::sync::Arc;

    fn setup() -> (Registry, KeyTemplate) {
        let mut registry = Registry::new();
        registry.register(Arc::new(OpaqueKeyManager)).unwrap();
        let template = KeyTemplate {
            type_url: TYPE_URL.to_string(),
            value: vec![],
        };
        (registry, template)
    }

    #[test]
    fn test_rotation() {
        let (registry, template) = setup();
        let handle = Handle::generate(&registry, &template).unwrap();
        let first = handle.keyset().primary_key_id;

        let mut manager = Manager::from_handle(&handle);
        let second = manager.add(&registry, &template).unwrap();
        assert_ne!(first, second);
        assert_eq!(manager.handle().unwrap().keyset().primary_key_id, first);

        manager.set_primary(second).unwrap();
        manager.disable(first).unwrap();
        let rotated = manager.handle().unwrap();
        assert_eq!(rotated.keyset().primary_key_id, second);

        // Only the enabled key contributes a primitive
        let set = rotated.primitives(&registry).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.primary().unwrap().key_id(), second);

        manager.enable(first).unwrap();
        assert_eq!(manager.handle().unwrap().primitives(&registry).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_operations() {
        let (registry, template) = setup();
        let mut manager = Manager::new();
        assert!(matches!(manager.handle(), Err(Error::InvalidKeyset(_))));
        assert!(matches!(manager.set_primary(1), Err(Error::KeyNotFound(1))));

        let key_id = manager.add(&registry, &template).unwrap();
        manager.set_primary(key_id).unwrap();
        assert!(matches!(
            manager.disable(key_id),
            Err(Error::InvalidKeyset("cannot disable the primary key"))
        ));

        let other = manager.add(&registry, &template).unwrap();
        manager.disable(other).unwrap();
        assert!(matches!(
            manager.set_primary(other),
            Err(Error::InvalidKeyset("primary key must be enabled"))
        ));
    }
}
