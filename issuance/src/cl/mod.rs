//! Credential definitions as a keyset key type.
//!
//! Keys of type [TYPE_URL] are serialized [proto::CredDefPrivateKey]s: the JSON private key of a
//! credential definition, plus the public key and its correctness proof. [KeyManager] generates
//! and loads them. [new_signer] dispatches signing to the primary key of a keyset.
//!
//! Every definition is generated with a single hidden attribute, [MASTER_SECRET], which the holder
//! blinds before requesting a credential.

mod factory;
mod key_manager;
pub mod proto;
mod signer;

pub use factory::{new_signer, new_signer_with_key_manager, WrappedSigner};
pub use key_manager::KeyManager;
pub use signer::ClSigner;

use crate::{
    keyset::{proto::KeyTemplate, Registry},
    Error,
};
use prost::Message as _;
use std::sync::Arc;

/// Type URL of credential-definition keys.
pub const TYPE_URL: &str = "type.credence.dev/credence.cl.CredDefPrivateKey";

/// The only key version [KeyManager] accepts.
pub const KEY_VERSION: u32 = 0;

/// Name of the hidden attribute every definition is generated with.
pub const MASTER_SECRET: &str = "master_secret";

/// Registers [KeyManager] under [TYPE_URL].
pub fn register(registry: &mut Registry) -> Result<(), Error> {
    registry.register(Arc::new(KeyManager::new()))
}

/// Returns a template generating a credential definition over `attrs` (in order).
pub fn cred_def_key_template<S: AsRef<str>>(attrs: &[S]) -> KeyTemplate {
    let format = proto::CredDefKeyFormat {
        params: Some(proto::CredDefParams {
            attrs: attrs.iter().map(|attr| attr.as_ref().to_string()).collect(),
        }),
    };
    KeyTemplate {
        type_url: TYPE_URL.to_string(),
        value: format.encode_to_vec(),
    }
}
