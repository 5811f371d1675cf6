//! Generate credential definitions, blind holder secrets, and issue blind signatures over
//! BLS12-381.
//!
//! The scheme is a Pointcheval-Sanders style blind signature: an issuer signs a vector of
//! attribute values, some of which it only learns through a commitment supplied by the holder.
//! Every artifact an issuer publishes is accompanied by a Fiat-Shamir proof so the counterparty can
//! check it was honestly produced without learning any secret.
//!
//! # Status
//!
//! `credence-primitives` is **ALPHA** software and is not yet recommended for production use.
//! Developers should expect breaking changes and occasional instability.
//!
//! # Example
//!
//! ```rust
//! use credence_primitives::{
//!     blind_credential_secrets, AttributeValue, CredentialDefinition, CredentialSchemaBuilder,
//!     CredentialValuesBuilder, MasterSecret, NonCredentialSchemaBuilder, Nonce, SignatureParams,
//! };
//! use rand::rngs::OsRng;
//!
//! // Issuer: generate a definition for ["name", "age"] plus a hidden "master_secret"
//! let mut schema = CredentialSchemaBuilder::new();
//! schema.add_attr("name").unwrap();
//! schema.add_attr("age").unwrap();
//! let schema = schema.finalize().unwrap();
//! let mut hidden = NonCredentialSchemaBuilder::new();
//! hidden.add_attr("master_secret").unwrap();
//! let hidden = hidden.finalize().unwrap();
//! let definition = CredentialDefinition::new(&mut OsRng, &schema, &hidden, false).unwrap();
//!
//! // Holder: blind the master secret against the issuer's offer nonce
//! let offer_nonce = Nonce::new(&mut OsRng);
//! let master_secret = MasterSecret::new(&mut OsRng);
//! let mut secrets = CredentialValuesBuilder::new();
//! secrets.add_hidden("master_secret", master_secret.value()).unwrap();
//! let secrets = secrets.finalize();
//! let (blinded, _factors) = blind_credential_secrets(
//!     &mut OsRng,
//!     definition.public_key(),
//!     definition.correctness_proof(),
//!     &offer_nonce,
//!     &secrets,
//! )
//! .unwrap();
//!
//! // Issuer: sign the known values
//! let mut values = CredentialValuesBuilder::new();
//! values.add_known("name", &AttributeValue::from("alice")).unwrap();
//! values.add_known("age", &AttributeValue::Integer(30)).unwrap();
//! let values = values.finalize();
//! let issuance_nonce = Nonce::new(&mut OsRng);
//! let params = SignatureParams {
//!     prover_id: "did:example:holder",
//!     public_key: definition.public_key(),
//!     private_key: definition.private_key(),
//!     blinded_secrets: &blinded,
//!     credential_nonce: &offer_nonce,
//!     values: &values,
//!     issuance_nonce: &issuance_nonce,
//! };
//! let (signature, proof) = params.sign_credential(&mut OsRng).unwrap();
//!
//! // Holder: check the issuer signed what it claims
//! proof
//!     .verify(
//!         definition.public_key(),
//!         &signature,
//!         &blinded,
//!         "did:example:holder",
//!         &values,
//!         &issuance_nonce,
//!     )
//!     .unwrap();
//! ```

mod blind;
mod definition;
pub mod group;
mod issuance;
mod nonce;
mod schema;
mod transcript;
mod values;

pub use blind::{blind_credential_secrets, BlindedCredentialSecrets, CredentialSecretsBlindingFactors};
pub use definition::{
    CredentialDefinition, CredentialPrivateKey, CredentialPublicKey, KeyCorrectnessProof,
};
pub use issuance::{CredentialSignature, SignatureCorrectnessProof, SignatureParams};
pub use nonce::{Nonce, NONCE_LENGTH};
pub use schema::{
    CredentialSchema, CredentialSchemaBuilder, NonCredentialSchema, NonCredentialSchemaBuilder,
};
pub use values::{AttributeValue, CredentialValues, CredentialValuesBuilder, MasterSecret};

use thiserror::Error;

/// Errors that can occur when generating keys, blinding secrets, or issuing signatures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("duplicate attribute: {0}")]
    DuplicateAttribute(String),
    #[error("invalid attribute name: {0:?}")]
    InvalidAttributeName(String),
    #[error("schema has no attributes")]
    EmptySchema,
    #[error("attribute is both known and hidden: {0}")]
    OverlappingAttribute(String),
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("missing attribute: {0}")]
    MissingAttribute(String),
    #[error("revocation is not supported")]
    RevocationUnsupported,
    #[error("malformed {0}")]
    Malformed(&'static str),
    #[error("private key does not match public key")]
    KeyMismatch,
    #[error("invalid key correctness proof")]
    InvalidKeyCorrectnessProof,
    #[error("invalid blinded secrets correctness proof")]
    InvalidBlindedSecretsProof,
    #[error("invalid signature correctness proof")]
    InvalidSignatureCorrectnessProof,
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
