//! Credential definitions: issuer keys bound to a schema, plus a proof they were honestly derived.

use crate::{
    group::{mul, Element, Scalar, G1, G2},
    schema::{CredentialSchema, NonCredentialSchema},
    transcript::{recommit, respond, Transcript},
    Error,
};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use zeroize::Zeroize;

const KEY_CORRECTNESS_NAMESPACE: &[u8] = b"CREDENCE_KEY_CORRECTNESS";

/// The issuer's public key.
///
/// Components are ordered: the clear attributes of the schema first, then the hidden attributes.
///
/// Deserialization rejects keys whose components do not cover every attribute exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCredentialPublicKey")]
pub struct CredentialPublicKey {
    attrs: Vec<String>,
    hidden: Vec<String>,
    x_tilde: G2,
    y0: G1,
    y0_tilde: G2,
    y: Vec<G1>,
    y_tilde: Vec<G2>,
}

/// An unchecked [CredentialPublicKey] as it appears on the wire.
#[derive(Deserialize)]
struct RawCredentialPublicKey {
    attrs: Vec<String>,
    hidden: Vec<String>,
    x_tilde: G2,
    y0: G1,
    y0_tilde: G2,
    y: Vec<G1>,
    y_tilde: Vec<G2>,
}

impl TryFrom<RawCredentialPublicKey> for CredentialPublicKey {
    type Error = Error;

    fn try_from(raw: RawCredentialPublicKey) -> Result<Self, Error> {
        let key = Self {
            attrs: raw.attrs,
            hidden: raw.hidden,
            x_tilde: raw.x_tilde,
            y0: raw.y0,
            y0_tilde: raw.y0_tilde,
            y: raw.y,
            y_tilde: raw.y_tilde,
        };
        key.validate()?;
        Ok(key)
    }
}

impl CredentialPublicKey {
    /// Attributes signed in the clear, in schema order.
    pub fn attrs(&self) -> &[String] {
        &self.attrs
    }

    /// Attributes the holder blinds, in schema order.
    pub fn hidden_attrs(&self) -> &[String] {
        &self.hidden
    }

    pub(crate) fn x_tilde(&self) -> &G2 {
        &self.x_tilde
    }

    /// The component binding the prover identity.
    pub(crate) fn y0(&self) -> &G1 {
        &self.y0
    }

    /// The G1 component signing the attribute with the provided name.
    pub(crate) fn y_for(&self, name: &str) -> Option<&G1> {
        self.attrs
            .iter()
            .chain(self.hidden.iter())
            .position(|attr| attr == name)
            .map(|index| &self.y[index])
    }

    /// The G1 components signing the hidden attributes, in schema order.
    pub(crate) fn hidden_y(&self) -> &[G1] {
        &self.y[self.attrs.len()..]
    }

    /// Records the full key in a proof transcript.
    pub(crate) fn commit_to(&self, transcript: &mut Transcript) {
        for name in self.attrs.iter().chain(self.hidden.iter()) {
            transcript.commit(name.as_bytes());
        }
        transcript
            .commit_element(&self.x_tilde)
            .commit_element(&self.y0)
            .commit_element(&self.y0_tilde);
        for (y, y_tilde) in self.y.iter().zip(&self.y_tilde) {
            transcript.commit_element(y).commit_element(y_tilde);
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.attrs.is_empty() || self.hidden.is_empty() {
            return Err(Error::EmptySchema);
        }
        let mut seen = BTreeSet::new();
        for name in self.attrs.iter().chain(self.hidden.iter()) {
            if !seen.insert(name) {
                return Err(Error::DuplicateAttribute(name.clone()));
            }
        }
        let expected = self.attrs.len() + self.hidden.len();
        if self.y.len() != expected || self.y_tilde.len() != expected {
            return Err(Error::Malformed("public key"));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let raw: RawCredentialPublicKey = serde_json::from_str(json)?;
        Self::try_from(raw)
    }
}

/// The issuer's private key.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialPrivateKey {
    x: Scalar,
    y0: Scalar,
    y: Vec<Scalar>,
}

impl CredentialPrivateKey {
    pub(crate) fn x(&self) -> &Scalar {
        &self.x
    }

    /// Ensures this private key is the one behind the provided public key.
    pub fn check(&self, public: &CredentialPublicKey) -> Result<(), Error> {
        if self.y.len() != public.y.len() {
            return Err(Error::KeyMismatch);
        }
        if mul(&G2::one(), &self.x) != public.x_tilde || mul(&G1::one(), &self.y0) != public.y0 {
            return Err(Error::KeyMismatch);
        }
        if self
            .y
            .iter()
            .zip(&public.y)
            .any(|(secret, point)| mul(&G1::one(), secret) != *point)
        {
            return Err(Error::KeyMismatch);
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let key: Self = serde_json::from_str(json)?;
        if key.y.is_empty() {
            return Err(Error::Malformed("private key"));
        }
        Ok(key)
    }
}

impl fmt::Debug for CredentialPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialPrivateKey(..)")
    }
}

impl Drop for CredentialPrivateKey {
    fn drop(&mut self) {
        self.x.zeroize();
        self.y0.zeroize();
        self.y.iter_mut().for_each(Zeroize::zeroize);
    }
}

/// Proves knowledge of the private key behind a [CredentialPublicKey], and that every G1
/// component shares its exponent with the matching G2 component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCorrectnessProof {
    challenge: Scalar,
    x: Scalar,
    y0: Scalar,
    y: Vec<Scalar>,
}

impl KeyCorrectnessProof {
    fn transcript(
        public: &CredentialPublicKey,
        x_commitment: &G2,
        y0_commitment: &(G1, G2),
        y_commitments: &[(G1, G2)],
    ) -> Scalar {
        let mut transcript = Transcript::new(KEY_CORRECTNESS_NAMESPACE);
        public.commit_to(&mut transcript);
        transcript
            .commit_element(x_commitment)
            .commit_element(&y0_commitment.0)
            .commit_element(&y0_commitment.1);
        for (g1, g2) in y_commitments {
            transcript.commit_element(g1).commit_element(g2);
        }
        transcript.challenge()
    }

    fn prove<R: RngCore + CryptoRng>(
        rng: &mut R,
        public: &CredentialPublicKey,
        private: &CredentialPrivateKey,
    ) -> Self {
        let commit_both = |r: &Scalar| (mul(&G1::one(), r), mul(&G2::one(), r));

        let mut r_x = Scalar::rand(rng);
        let mut r_y0 = Scalar::rand(rng);
        let mut r_y: Vec<Scalar> = private.y.iter().map(|_| Scalar::rand(rng)).collect();

        let x_commitment = mul(&G2::one(), &r_x);
        let y0_commitment = commit_both(&r_y0);
        let y_commitments: Vec<_> = r_y.iter().map(commit_both).collect();
        let challenge = Self::transcript(public, &x_commitment, &y0_commitment, &y_commitments);

        let proof = Self {
            challenge,
            x: respond(&r_x, &challenge, &private.x),
            y0: respond(&r_y0, &challenge, &private.y0),
            y: r_y
                .iter()
                .zip(&private.y)
                .map(|(r, secret)| respond(r, &challenge, secret))
                .collect(),
        };
        r_x.zeroize();
        r_y0.zeroize();
        r_y.iter_mut().for_each(Zeroize::zeroize);
        proof
    }

    /// Checks the proof against the provided public key.
    pub fn verify(&self, public: &CredentialPublicKey) -> Result<(), Error> {
        if self.y.len() != public.y.len() {
            return Err(Error::InvalidKeyCorrectnessProof);
        }
        let c = &self.challenge;
        let recommit_both = |z: &Scalar, g1: &G1, g2: &G2| {
            (
                recommit(&G1::one(), z, g1, c),
                recommit(&G2::one(), z, g2, c),
            )
        };

        let x_commitment = recommit(&G2::one(), &self.x, &public.x_tilde, c);
        let y0_commitment = recommit_both(&self.y0, &public.y0, &public.y0_tilde);
        let y_commitments: Vec<_> = self
            .y
            .iter()
            .zip(public.y.iter().zip(&public.y_tilde))
            .map(|(z, (g1, g2))| recommit_both(z, g1, g2))
            .collect();
        let expected = Self::transcript(public, &x_commitment, &y0_commitment, &y_commitments);
        if expected != self.challenge {
            return Err(Error::InvalidKeyCorrectnessProof);
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

/// A freshly generated issuer key pair and its correctness proof.
pub struct CredentialDefinition {
    public_key: CredentialPublicKey,
    private_key: CredentialPrivateKey,
    correctness_proof: KeyCorrectnessProof,
}

impl CredentialDefinition {
    /// Generates a definition for the provided schemas.
    ///
    /// Revocation is not supported: requesting it fails with [Error::RevocationUnsupported].
    pub fn new<R: RngCore + CryptoRng>(
        rng: &mut R,
        schema: &CredentialSchema,
        non_schema: &NonCredentialSchema,
        support_revocation: bool,
    ) -> Result<Self, Error> {
        if support_revocation {
            return Err(Error::RevocationUnsupported);
        }
        if let Some(name) = non_schema
            .attrs()
            .iter()
            .find(|name| schema.attrs().contains(*name))
        {
            return Err(Error::OverlappingAttribute(name.clone()));
        }

        let count = schema.attrs().len() + non_schema.attrs().len();
        let private_key = CredentialPrivateKey {
            x: Scalar::rand_nonzero(rng),
            y0: Scalar::rand_nonzero(rng),
            y: (0..count).map(|_| Scalar::rand_nonzero(rng)).collect(),
        };
        let public_key = CredentialPublicKey {
            attrs: schema.attrs().to_vec(),
            hidden: non_schema.attrs().to_vec(),
            x_tilde: mul(&G2::one(), &private_key.x),
            y0: mul(&G1::one(), &private_key.y0),
            y0_tilde: mul(&G2::one(), &private_key.y0),
            y: private_key.y.iter().map(|y| mul(&G1::one(), y)).collect(),
            y_tilde: private_key.y.iter().map(|y| mul(&G2::one(), y)).collect(),
        };
        let correctness_proof = KeyCorrectnessProof::prove(rng, &public_key, &private_key);
        Ok(Self {
            public_key,
            private_key,
            correctness_proof,
        })
    }

    pub fn public_key(&self) -> &CredentialPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &CredentialPrivateKey {
        &self.private_key
    }

    pub fn correctness_proof(&self) -> &KeyCorrectnessProof {
        &self.correctness_proof
    }

    /// Splits the definition into its parts.
    pub fn into_parts(self) -> (CredentialPublicKey, CredentialPrivateKey, KeyCorrectnessProof) {
        (self.public_key, self.private_key, self.correctness_proof)
    }
}
