use crate::Error;
use credence_primitives::{
    AttributeValue, BlindedCredentialSecrets, CredentialPublicKey, CredentialSignature,
    KeyCorrectnessProof, Nonce, SignatureCorrectnessProof,
};
use std::collections::BTreeMap;

/// The output of a successful signing.
#[derive(Clone, Debug)]
pub struct Issuance {
    pub signature: CredentialSignature,
    pub correctness_proof: SignatureCorrectnessProof,
    /// Fresh for every call. The correctness proof is bound to it.
    pub nonce: Nonce,
}

/// The shareable part of a credential definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicDefinition {
    pub public_key: CredentialPublicKey,
    pub correctness_proof: KeyCorrectnessProof,
}

/// Issues credentials over a fixed attribute schema.
pub trait Signer: Send + Sync {
    /// Signs the issuer-known `values` together with the holder's blinded secrets.
    ///
    /// `nonce` is the nonce the holder bound its blinding proof to. `values` must cover exactly
    /// the schema the key was generated for. Any failure returns no partial material.
    fn sign(
        &self,
        prover_id: &str,
        values: &BTreeMap<String, AttributeValue>,
        blinded_secrets: &BlindedCredentialSecrets,
        nonce: &Nonce,
    ) -> Result<Issuance, Error>;

    /// Returns the public key and its correctness proof. Never exposes the private key.
    fn public_definition(&self) -> Result<PublicDefinition, Error>;
}
