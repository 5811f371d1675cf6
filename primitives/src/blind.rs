//! Holder-side blinding of hidden attributes.
//!
//! The holder commits to its hidden values as `C = g1^t * prod(Y_j^h_j)` and proves knowledge of
//! the opening, bound to the nonce the issuer sent with its offer. The issuer only ever sees `C`.

use crate::{
    definition::{CredentialPublicKey, KeyCorrectnessProof},
    group::{mul, sum_of_products, Element, Scalar, G1},
    nonce::Nonce,
    transcript::{respond, Transcript},
    values::CredentialValues,
    Error,
};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

const BLINDED_SECRETS_NAMESPACE: &[u8] = b"CREDENCE_BLINDED_SECRETS";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct BlindingProof {
    challenge: Scalar,
    blinding: Scalar,
    hidden: Vec<Scalar>,
}

/// A commitment to the holder's hidden attributes and a proof of its opening.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindedCredentialSecrets {
    handle: G1,
    correctness_proof: BlindingProof,
}

/// The randomness the holder needs to later unblind an issued signature.
pub struct CredentialSecretsBlindingFactors(Scalar);

impl fmt::Debug for CredentialSecretsBlindingFactors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialSecretsBlindingFactors(..)")
    }
}

impl Drop for CredentialSecretsBlindingFactors {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

fn challenge(public: &CredentialPublicKey, handle: &G1, commitment: &G1, nonce: &Nonce) -> Scalar {
    let mut transcript = Transcript::new(BLINDED_SECRETS_NAMESPACE);
    public.commit_to(&mut transcript);
    transcript
        .commit_element(handle)
        .commit_element(commitment)
        .commit(nonce.as_bytes());
    transcript.challenge()
}

/// Blinds the hidden values of `values` under the issuer's public key.
///
/// The key correctness proof is checked first, so a holder never commits against a dishonest key.
/// Every hidden attribute of the key must be supplied and nothing else may be hidden.
pub fn blind_credential_secrets<R: RngCore + CryptoRng>(
    rng: &mut R,
    public: &CredentialPublicKey,
    key_correctness_proof: &KeyCorrectnessProof,
    nonce: &Nonce,
    values: &CredentialValues,
) -> Result<(BlindedCredentialSecrets, CredentialSecretsBlindingFactors), Error> {
    key_correctness_proof.verify(public)?;
    if let Some(name) = values
        .hidden()
        .keys()
        .find(|name| !public.hidden_attrs().contains(*name))
    {
        return Err(Error::UnknownAttribute(name.clone()));
    }
    let mut secrets = Vec::with_capacity(public.hidden_attrs().len());
    for name in public.hidden_attrs() {
        let value = values
            .hidden()
            .get(name)
            .ok_or_else(|| Error::MissingAttribute(name.clone()))?;
        secrets.push(*value);
    }

    let generator = G1::one();
    let mut bases = vec![&generator];
    bases.extend(public.hidden_y());
    let mut exponents = vec![Scalar::rand(rng)];
    exponents.extend_from_slice(&secrets);
    let handle = sum_of_products(&bases, &exponents);

    let mut randomness: Vec<Scalar> = exponents.iter().map(|_| Scalar::rand(rng)).collect();
    let commitment = sum_of_products(&bases, &randomness);
    let challenge = challenge(public, &handle, &commitment, nonce);
    let mut responses = randomness
        .iter()
        .zip(&exponents)
        .map(|(r, secret)| respond(r, &challenge, secret));
    let blinding = responses.next().ok_or(Error::Malformed("blinding proof"))?;
    let correctness_proof = BlindingProof {
        challenge,
        blinding,
        hidden: responses.collect(),
    };

    let factors = CredentialSecretsBlindingFactors(exponents[0]);
    randomness.iter_mut().for_each(Zeroize::zeroize);
    exponents.iter_mut().for_each(Zeroize::zeroize);
    secrets.iter_mut().for_each(Zeroize::zeroize);
    Ok((
        BlindedCredentialSecrets {
            handle,
            correctness_proof,
        },
        factors,
    ))
}

impl BlindedCredentialSecrets {
    /// The commitment to the hidden attributes.
    pub fn handle(&self) -> &G1 {
        &self.handle
    }

    /// Checks the opening proof against the issuer's key and the offer nonce.
    pub fn verify(&self, public: &CredentialPublicKey, nonce: &Nonce) -> Result<(), Error> {
        let proof = &self.correctness_proof;
        if proof.hidden.len() != public.hidden_y().len() {
            return Err(Error::InvalidBlindedSecretsProof);
        }
        let generator = G1::one();
        let mut bases = vec![&generator];
        bases.extend(public.hidden_y());
        let mut responses = vec![proof.blinding];
        responses.extend_from_slice(&proof.hidden);

        // g1^z_t * prod(Y_j^z_j) * C^-c
        let mut commitment = sum_of_products(&bases, &responses);
        commitment.add(&mul(&self.handle, &proof.challenge.neg()));
        if challenge(public, &self.handle, &commitment, nonce) != proof.challenge {
            return Err(Error::InvalidBlindedSecretsProof);
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}
