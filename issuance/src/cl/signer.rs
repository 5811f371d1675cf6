use crate::{keyset::Primitive, Error, Issuance, PublicDefinition, Signer};
use credence_primitives::{
    AttributeValue, BlindedCredentialSecrets, CredentialPrivateKey, CredentialPublicKey,
    CredentialValuesBuilder, KeyCorrectnessProof, Nonce, SignatureParams,
};
use rand::rngs::OsRng;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Signs credentials with a single credential definition.
pub struct ClSigner {
    public_key: CredentialPublicKey,
    private_key: CredentialPrivateKey,
    correctness_proof: KeyCorrectnessProof,
}

impl ClSigner {
    /// Binds a signer to a credential definition.
    ///
    /// Fails if the correctness proof does not hold for the public key or the private key is not
    /// the one behind it.
    pub fn new(
        public_key: CredentialPublicKey,
        private_key: CredentialPrivateKey,
        correctness_proof: KeyCorrectnessProof,
    ) -> Result<Self, credence_primitives::Error> {
        correctness_proof.verify(&public_key)?;
        private_key.check(&public_key)?;
        Ok(Self {
            public_key,
            private_key,
            correctness_proof,
        })
    }
}

impl Signer for ClSigner {
    fn sign(
        &self,
        prover_id: &str,
        values: &BTreeMap<String, AttributeValue>,
        blinded_secrets: &BlindedCredentialSecrets,
        nonce: &Nonce,
    ) -> Result<Issuance, Error> {
        let issuance_nonce = Nonce::new(&mut OsRng);

        let mut builder = CredentialValuesBuilder::new();
        for (name, value) in values {
            builder.add_known(name, value)?;
        }
        let values = builder.finalize();

        let params = SignatureParams {
            prover_id,
            public_key: &self.public_key,
            private_key: &self.private_key,
            blinded_secrets,
            credential_nonce: nonce,
            values: &values,
            issuance_nonce: &issuance_nonce,
        };
        let (signature, correctness_proof) =
            params.sign_credential(&mut OsRng).inspect_err(|err| {
                warn!(?err, prover_id, "failed to sign credential");
            })?;
        debug!(
            prover_id,
            attrs = self.public_key.attrs().len(),
            "signed credential"
        );
        Ok(Issuance {
            signature,
            correctness_proof,
            nonce: issuance_nonce,
        })
    }

    fn public_definition(&self) -> Result<PublicDefinition, Error> {
        Ok(PublicDefinition {
            public_key: self.public_key.clone(),
            correctness_proof: self.correctness_proof.clone(),
        })
    }
}

impl Primitive for ClSigner {
    fn signer(&self) -> Option<&dyn Signer> {
        Some(self)
    }
}
