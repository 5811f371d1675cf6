//! Issue anonymous credentials from keysets of pluggable signing primitives.
//!
//! Keys live in a [keyset::Handle]: one or more serialized keys, each tagged with the type URL of
//! the [keyset::KeyManager] that understands it. A [keyset::Registry] maps type URLs to key
//! managers and turns a handle into a [keyset::PrimitiveSet] of live primitives. The [cl] module
//! provides the credential-definition key type and a [Signer] that always dispatches to the
//! primary key of a set.
//!
//! # Status
//!
//! `credence-issuance` is **ALPHA** software and is not yet recommended for production use.
//! Developers should expect breaking changes and occasional instability.
//!
//! # Example
//!
//! ```rust
//! use credence_issuance::{cl, keyset::{Handle, Registry}, Signer};
//! use credence_primitives::{
//!     blind_credential_secrets, AttributeValue, CredentialValuesBuilder, MasterSecret, Nonce,
//! };
//! use rand::rngs::OsRng;
//! use std::collections::BTreeMap;
//!
//! // Register the credential-definition key manager
//! let mut registry = Registry::new();
//! cl::register(&mut registry).unwrap();
//!
//! // Issuer: generate a keyset for ["attr1", "attr2"]
//! let template = cl::cred_def_key_template(&["attr1", "attr2"]);
//! let handle = Handle::generate(&registry, &template).unwrap();
//! let signer = cl::new_signer(&handle, &registry).unwrap();
//! let definition = signer.public_definition().unwrap();
//!
//! // Holder: blind the master secret
//! let nonce = Nonce::new(&mut OsRng);
//! let master_secret = MasterSecret::new(&mut OsRng);
//! let mut secrets = CredentialValuesBuilder::new();
//! secrets.add_hidden(cl::MASTER_SECRET, master_secret.value()).unwrap();
//! let (blinded, _) = blind_credential_secrets(
//!     &mut OsRng,
//!     &definition.public_key,
//!     &definition.correctness_proof,
//!     &nonce,
//!     &secrets.finalize(),
//! )
//! .unwrap();
//!
//! // Issuer: sign
//! let values = BTreeMap::from([
//!     ("attr1".to_string(), AttributeValue::Integer(5)),
//!     ("attr2".to_string(), AttributeValue::from("aaa")),
//! ]);
//! let issuance = signer.sign("did:example:holder", &values, &blinded, &nonce).unwrap();
//! assert_ne!(issuance.nonce, nonce);
//! ```

pub mod cl;
pub mod keyset;
mod signer;
pub use signer::{Issuance, PublicDefinition, Signer};

use thiserror::Error;

/// Why a serialized key or key format was rejected.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("empty")]
    Empty,
    #[error("invalid proto: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("unsupported version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("missing public key")]
    MissingPublicKey,
    #[error("missing params")]
    MissingParams,
    #[error("params do not match key")]
    ParamsMismatch,
    #[error("rejected by backend: {0}")]
    Backend(credence_primitives::Error),
}

/// Errors that can occur when managing keys or issuing credentials.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid key: {0}")]
    InvalidKey(KeyError),
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(KeyError),
    #[error("primitive is not a signer")]
    NotASigner,
    #[error("backend failure: {0}")]
    Backend(#[from] credence_primitives::Error),
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),
    #[error("key manager already registered: {0}")]
    DuplicateKeyManager(String),
    #[error("invalid keyset: {0}")]
    InvalidKeyset(&'static str),
    #[error("key not found: {0}")]
    KeyNotFound(u32),
    #[error("key is not private: {0}")]
    NotPrivateKey(u32),
    #[error("primitive set has no primary")]
    MissingPrimary,
}
