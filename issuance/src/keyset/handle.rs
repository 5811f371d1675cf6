use super::{
    manager::Manager,
    primitive_set::PrimitiveSet,
    proto::{Key, KeyMaterialType, KeyStatusType, KeyTemplate, Keyset},
    registry::{KeyManager, Registry},
    validation::validate_keyset,
};
use crate::Error;
use prost::Message as _;
use tracing::debug;

/// Owns a validated [Keyset].
#[derive(Clone, Debug, PartialEq)]
pub struct Handle {
    keyset: Keyset,
}

impl Handle {
    /// Wraps a keyset after validating it.
    pub fn new(keyset: Keyset) -> Result<Self, Error> {
        validate_keyset(&keyset)?;
        Ok(Self { keyset })
    }

    /// Generates a keyset holding a single, primary key created from `template`.
    pub fn generate(registry: &Registry, template: &KeyTemplate) -> Result<Self, Error> {
        let mut manager = Manager::new();
        let key_id = manager.add(registry, template)?;
        manager.set_primary(key_id)?;
        manager.handle()
    }

    pub fn keyset(&self) -> &Keyset {
        &self.keyset
    }

    /// Derives a handle holding only the public part of every key.
    ///
    /// Fails with [Error::NotPrivateKey] if any key is not private.
    pub fn public(&self, registry: &Registry) -> Result<Self, Error> {
        let mut keys = Vec::with_capacity(self.keyset.key.len());
        for key in &self.keyset.key {
            let data = key
                .key_data
                .as_ref()
                .ok_or(Error::InvalidKeyset("key without key data"))?;
            if data.key_material_type() != KeyMaterialType::AsymmetricPrivate {
                return Err(Error::NotPrivateKey(key.key_id));
            }
            let public = registry
                .key_manager(&data.type_url)?
                .public_key_data(&data.value)?;
            keys.push(Key {
                key_data: Some(public),
                status: key.status,
                key_id: key.key_id,
            });
        }
        Self::new(Keyset {
            primary_key_id: self.keyset.primary_key_id,
            key: keys,
        })
    }

    /// Builds the live primitives of every enabled key.
    ///
    /// Fails with [Error::NotPrivateKey] if an enabled key carries public key material.
    pub fn primitives(&self, registry: &Registry) -> Result<PrimitiveSet, Error> {
        self.build_primitives(registry, None)
    }

    /// Like [Self::primitives], but `key_manager` takes precedence over the registry for the key
    /// types it supports.
    pub fn primitives_with_key_manager(
        &self,
        registry: &Registry,
        key_manager: &dyn KeyManager,
    ) -> Result<PrimitiveSet, Error> {
        self.build_primitives(registry, Some(key_manager))
    }

    fn build_primitives(
        &self,
        registry: &Registry,
        custom: Option<&dyn KeyManager>,
    ) -> Result<PrimitiveSet, Error> {
        let mut set = PrimitiveSet::new();
        for key in &self.keyset.key {
            if key.status() != KeyStatusType::Enabled {
                continue;
            }
            let data = key
                .key_data
                .as_ref()
                .ok_or(Error::InvalidKeyset("key without key data"))?;
            if data.key_material_type() != KeyMaterialType::AsymmetricPrivate {
                return Err(Error::NotPrivateKey(key.key_id));
            }
            let primitive = match custom {
                Some(manager) if manager.does_support(&data.type_url) => {
                    manager.primitive(&data.value)?
                }
                _ => registry.primitive(data)?,
            };
            set.add(primitive, key)?;
            if key.key_id == self.keyset.primary_key_id {
                set.set_primary(key.key_id)?;
            }
        }
        if set.primary().is_none() {
            return Err(Error::MissingPrimary);
        }
        debug!(
            entries = set.len(),
            primary = self.keyset.primary_key_id,
            "built primitive set"
        );
        Ok(set)
    }

    /// Serializes the keyset in cleartext.
    pub fn encode(&self) -> Vec<u8> {
        self.keyset.encode_to_vec()
    }

    /// Deserializes and validates a cleartext keyset.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let keyset = Keyset::decode(bytes)
            .map_err(|err| Error::InvalidKey(crate::KeyError::Decode(err)))?;
        Self::new(keyset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyset::registry::mocks::{OpaqueKeyManager, TYPE_URL};
    use std::sync::Arc;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(Arc::new(OpaqueKeyManager)).unwrap();
        registry
    }

    fn template() -> KeyTemplate {
        KeyTemplate {
            type_url: TYPE_URL.to_string(),
            value: vec![],
        }
    }

    #[test]
    fn test_generate() {
        let registry = registry();
        let handle = Handle::generate(&registry, &template()).unwrap();
        let keyset = handle.keyset();
        assert_eq!(keyset.key.len(), 1);
        assert_eq!(keyset.primary_key_id, keyset.key[0].key_id);
        assert_eq!(keyset.key[0].status(), KeyStatusType::Enabled);

        let set = handle.primitives(&registry).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.primary().unwrap().key_id(), keyset.primary_key_id);
    }

    #[test]
    fn test_encode_decode() {
        let registry = registry();
        let handle = Handle::generate(&registry, &template()).unwrap();
        let decoded = Handle::decode(&handle.encode()).unwrap();
        assert_eq!(decoded, handle);

        assert!(matches!(
            Handle::decode(&[0xff, 0xff]),
            Err(Error::InvalidKey(_))
        ));
        assert!(matches!(Handle::decode(&[]), Err(Error::InvalidKeyset(_))));
    }

    #[test]
    fn test_public() {
        let registry = registry();
        let handle = Handle::generate(&registry, &template()).unwrap();
        let public = handle.public(&registry).unwrap();
        let data = public.keyset().key[0].key_data.as_ref().unwrap();
        assert_eq!(data.key_material_type(), KeyMaterialType::AsymmetricPublic);

        // Already public
        assert!(matches!(
            public.public(&registry),
            Err(Error::NotPrivateKey(_))
        ));

        // Public material never reaches a key manager
        let key_id = public.keyset().primary_key_id;
        assert!(matches!(
            public.primitives(&registry),
            Err(Error::NotPrivateKey(id)) if id == key_id
        ));
    }

    #[test]
    fn test_unregistered_key_type() {
        let handle = Handle::generate(&registry(), &template()).unwrap();
        assert!(matches!(
            handle.primitives(&Registry::new()),
            Err(Error::UnsupportedKeyType(_))
        ));

        // A custom key manager stands in for the registry
        let set = handle
            .primitives_with_key_manager(&Registry::new(), &OpaqueKeyManager)
            .unwrap();
        assert_eq!(set.len(), 1);
    }
}
