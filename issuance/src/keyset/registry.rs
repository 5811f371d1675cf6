use super::proto::{KeyData, KeyTemplate};
use crate::{Error, Signer};
use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

/// A live primitive produced by a [KeyManager].
///
/// Capabilities are exposed through explicit accessors. A primitive that does not support a
/// capability keeps the default, which returns `None`.
pub trait Primitive: Send + Sync {
    /// Returns the primitive as a [Signer], if it can sign.
    fn signer(&self) -> Option<&dyn Signer> {
        None
    }
}

/// Understands one key type: validates and deserializes its keys, turns them into live primitives,
/// and generates new ones.
///
/// Implementations hold no mutable state, so every call is independent.
pub trait KeyManager: Send + Sync {
    /// Builds a live primitive from a serialized private key.
    fn primitive(&self, serialized_key: &[u8]) -> Result<Arc<dyn Primitive>, Error>;

    /// Generates a new key from a serialized key format.
    fn new_key_data(&self, serialized_key_format: &[u8]) -> Result<KeyData, Error>;

    /// Extracts the public part of a serialized private key.
    fn public_key_data(&self, serialized_private_key: &[u8]) -> Result<KeyData, Error>;

    /// The type URL of the keys this manager owns.
    fn type_url(&self) -> &str;

    fn does_support(&self, type_url: &str) -> bool {
        type_url == self.type_url()
    }
}

/// Maps type URLs to the [KeyManager] that owns them.
///
/// Built once at startup and shared read-only afterwards (usually behind an [Arc]).
#[derive(Default)]
pub struct Registry {
    managers: BTreeMap<String, Arc<dyn KeyManager>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a key manager under its type URL.
    ///
    /// Fails if a manager is already registered for that type URL.
    pub fn register(&mut self, manager: Arc<dyn KeyManager>) -> Result<(), Error> {
        let type_url = manager.type_url().to_string();
        if self.managers.contains_key(&type_url) {
            return Err(Error::DuplicateKeyManager(type_url));
        }
        debug!(%type_url, "registered key manager");
        self.managers.insert(type_url, manager);
        Ok(())
    }

    /// Returns the key manager registered for a type URL.
    pub fn key_manager(&self, type_url: &str) -> Result<Arc<dyn KeyManager>, Error> {
        self.managers
            .get(type_url)
            .cloned()
            .ok_or_else(|| Error::UnsupportedKeyType(type_url.to_string()))
    }

    /// Generates new key data for a template.
    pub fn new_key_data(&self, template: &KeyTemplate) -> Result<KeyData, Error> {
        self.key_manager(&template.type_url)?
            .new_key_data(&template.value)
    }

    /// Builds a live primitive from key data.
    pub fn primitive(&self, key_data: &KeyData) -> Result<Arc<dyn Primitive>, Error> {
        self.key_manager(&key_data.type_url)?
            .primitive(&key_data.value)
    }
}
