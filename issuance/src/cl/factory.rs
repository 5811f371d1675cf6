use crate::{
    keyset::{Handle, KeyManager, PrimitiveSet, Registry},
    Error, Issuance, PublicDefinition, Signer,
};
use credence_primitives::{AttributeValue, BlindedCredentialSecrets, Nonce};
use std::collections::BTreeMap;
use tracing::warn;

/// Returns a [Signer] backed by the primary key of `handle`.
pub fn new_signer(handle: &Handle, registry: &Registry) -> Result<WrappedSigner, Error> {
    WrappedSigner::new(handle.primitives(registry)?)
}

/// Like [new_signer], but `key_manager` takes precedence over the registry for the key types it
/// supports.
pub fn new_signer_with_key_manager(
    handle: &Handle,
    registry: &Registry,
    key_manager: &dyn KeyManager,
) -> Result<WrappedSigner, Error> {
    WrappedSigner::new(handle.primitives_with_key_manager(registry, key_manager)?)
}

/// Dispatches signing to the primary entry of a [PrimitiveSet].
#[derive(Clone)]
pub struct WrappedSigner {
    set: PrimitiveSet,
}

impl WrappedSigner {
    /// Fails with [Error::NotASigner] unless the primary and every other entry can sign.
    pub fn new(set: PrimitiveSet) -> Result<Self, Error> {
        let primary = set.primary().ok_or(Error::MissingPrimary)?;
        if primary.primitive().signer().is_none() {
            warn!(key_id = primary.key_id(), "primary primitive is not a signer");
            return Err(Error::NotASigner);
        }
        for entry in set.entries() {
            if entry.primitive().signer().is_none() {
                warn!(key_id = entry.key_id(), "primitive is not a signer");
                return Err(Error::NotASigner);
            }
        }
        Ok(Self { set })
    }

    fn primary(&self) -> Result<&dyn Signer, Error> {
        self.set
            .primary()
            .ok_or(Error::MissingPrimary)?
            .primitive()
            .signer()
            .ok_or(Error::NotASigner)
    }
}

impl Signer for WrappedSigner {
    fn sign(
        &self,
        prover_id: &str,
        values: &BTreeMap<String, AttributeValue>,
        blinded_secrets: &BlindedCredentialSecrets,
        nonce: &Nonce,
    ) -> Result<Issuance, Error> {
        self.primary()?
            .sign(prover_id, values, blinded_secrets, nonce)
    }

    fn public_definition(&self) -> Result<PublicDefinition, Error> {
        self.primary()?.public_definition()
    }
}
