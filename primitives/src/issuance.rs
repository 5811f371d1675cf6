//! Issuing a signature over known values and a blinded commitment.
//!
//! Given the holder's commitment `C`, the issuer computes
//! `B = C * Y_0^H(prover_id) * prod(Y_i^m_i)`, picks a random `u`, and outputs
//! `(sigma1, sigma2) = (g1^u, (g1^x * B)^u)`. It proves knowledge of `(x, u)` such that
//! `sigma1 = g1^u`, `sigma2 = sigma1^x * B^u` and `X~ = g2^x`, so the holder can check the signature
//! was produced with the published key over the values it expects.

use crate::{
    blind::BlindedCredentialSecrets,
    definition::{CredentialPrivateKey, CredentialPublicKey},
    group::{mul, sum_of_products, Element, Scalar, G1, G2},
    nonce::Nonce,
    transcript::{recommit, respond, Transcript},
    values::CredentialValues,
    Error,
};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

const SIGNATURE_CORRECTNESS_NAMESPACE: &[u8] = b"CREDENCE_SIGNATURE_CORRECTNESS";
const PROVER_ID_DST: &[u8] = b"CREDENCE_PROVER_ID";

/// Computes `C * Y_0^H(prover_id) * prod(Y_i^m_i)` over the known values.
///
/// The known values must cover exactly the clear attributes of the key.
fn message_base(
    public: &CredentialPublicKey,
    blinded_secrets: &BlindedCredentialSecrets,
    prover_id: &str,
    values: &CredentialValues,
) -> Result<G1, Error> {
    if let Some(name) = values
        .known()
        .keys()
        .find(|name| !public.attrs().contains(*name))
    {
        return Err(Error::UnknownAttribute(name.clone()));
    }
    let mut points = vec![public.y0()];
    let mut scalars = vec![Scalar::map(PROVER_ID_DST, prover_id.as_bytes())];
    for name in public.attrs() {
        let value = values
            .known()
            .get(name)
            .ok_or_else(|| Error::MissingAttribute(name.clone()))?;
        let point = public
            .y_for(name)
            .ok_or(Error::Malformed("public key"))?;
        points.push(point);
        scalars.push(*value);
    }
    let mut base = sum_of_products(&points, &scalars);
    base.add(blinded_secrets.handle());
    Ok(base)
}

/// Everything the issuer needs to sign one credential.
pub struct SignatureParams<'a> {
    /// Identity of the holder the credential is bound to.
    pub prover_id: &'a str,
    pub public_key: &'a CredentialPublicKey,
    pub private_key: &'a CredentialPrivateKey,
    pub blinded_secrets: &'a BlindedCredentialSecrets,
    /// Nonce the holder bound its blinding proof to.
    pub credential_nonce: &'a Nonce,
    pub values: &'a CredentialValues,
    /// Fresh nonce the signature correctness proof is bound to.
    pub issuance_nonce: &'a Nonce,
}

impl SignatureParams<'_> {
    /// Verifies the holder's blinding proof, then signs.
    pub fn sign_credential<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<(CredentialSignature, SignatureCorrectnessProof), Error> {
        self.blinded_secrets
            .verify(self.public_key, self.credential_nonce)?;
        let base = message_base(
            self.public_key,
            self.blinded_secrets,
            self.prover_id,
            self.values,
        )?;

        let mut u = Scalar::rand_nonzero(rng);
        let sigma1 = mul(&G1::one(), &u);
        let mut full = mul(&G1::one(), self.private_key.x());
        full.add(&base);
        let sigma2 = mul(&full, &u);
        let signature = CredentialSignature { sigma1, sigma2 };

        let mut r_x = Scalar::rand(rng);
        let mut r_u = Scalar::rand(rng);
        let challenge = SignatureCorrectnessProof::challenge(
            self.public_key,
            &signature,
            &base,
            &mul(&G1::one(), &r_u),
            &sum_of_products(&[&sigma1, &base], &[r_x, r_u]),
            &mul(&G2::one(), &r_x),
            self.issuance_nonce,
        );
        let proof = SignatureCorrectnessProof {
            challenge,
            x: respond(&r_x, &challenge, self.private_key.x()),
            u: respond(&r_u, &challenge, &u),
        };
        u.zeroize();
        r_x.zeroize();
        r_u.zeroize();
        Ok((signature, proof))
    }
}

/// A signature over the known values and the holder's commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSignature {
    sigma1: G1,
    sigma2: G1,
}

impl CredentialSignature {
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Proves a [CredentialSignature] was produced with the issuer's published key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureCorrectnessProof {
    challenge: Scalar,
    x: Scalar,
    u: Scalar,
}

impl SignatureCorrectnessProof {
    fn challenge(
        public: &CredentialPublicKey,
        signature: &CredentialSignature,
        base: &G1,
        u_commitment: &G1,
        signature_commitment: &G1,
        x_commitment: &G2,
        nonce: &Nonce,
    ) -> Scalar {
        let mut transcript = Transcript::new(SIGNATURE_CORRECTNESS_NAMESPACE);
        public.commit_to(&mut transcript);
        transcript
            .commit_element(&signature.sigma1)
            .commit_element(&signature.sigma2)
            .commit_element(base)
            .commit_element(u_commitment)
            .commit_element(signature_commitment)
            .commit_element(x_commitment)
            .commit(nonce.as_bytes());
        transcript.challenge()
    }

    /// Checks the proof from the holder's point of view.
    pub fn verify(
        &self,
        public: &CredentialPublicKey,
        signature: &CredentialSignature,
        blinded_secrets: &BlindedCredentialSecrets,
        prover_id: &str,
        values: &CredentialValues,
        nonce: &Nonce,
    ) -> Result<(), Error> {
        let base = message_base(public, blinded_secrets, prover_id, values)?;
        let c = &self.challenge;
        let u_commitment = recommit(&G1::one(), &self.u, &signature.sigma1, c);
        let signature_commitment = sum_of_products(
            &[&signature.sigma1, &base, &signature.sigma2],
            &[self.x, self.u, c.neg()],
        );
        let x_commitment = recommit(&G2::one(), &self.x, public.x_tilde(), c);
        let expected = Self::challenge(
            public,
            signature,
            &base,
            &u_commitment,
            &signature_commitment,
            &x_commitment,
            nonce,
        );
        if expected != self.challenge {
            return Err(Error::InvalidSignatureCorrectnessProof);
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
