//! Fiat-Shamir transcripts.

use crate::group::{sum_of_products, Element, Scalar};

/// Separates the challenge derivation from any other use of a transcript.
const CHALLENGE_DST: &[u8] = b"CREDENCE_CHALLENGE";

/// Accumulates the public inputs and commitments of a proof and derives its challenge.
///
/// Every committed item is length-prefixed, so `commit(b"A"); commit(b"B")` and `commit(b"AB")`
/// never collide.
pub(crate) struct Transcript {
    hasher: blake3::Hasher,
}

impl Transcript {
    /// Create a new transcript for the provided protocol namespace.
    pub fn new(namespace: &[u8]) -> Self {
        let mut out = Self {
            hasher: blake3::Hasher::new(),
        };
        out.commit(namespace);
        out
    }

    /// Record a single message.
    pub fn commit(&mut self, data: &[u8]) -> &mut Self {
        self.hasher.update(&(data.len() as u64).to_be_bytes());
        self.hasher.update(data);
        self
    }

    /// Record the canonical encoding of a group element or scalar.
    pub fn commit_element<E: Element>(&mut self, element: &E) -> &mut Self {
        self.commit(&element.to_bytes())
    }

    /// Derive the challenge for everything recorded so far.
    pub fn challenge(&self) -> Scalar {
        let mut wide = [0u8; 64];
        self.hasher.finalize_xof().fill(&mut wide);
        Scalar::map(CHALLENGE_DST, &wide)
    }
}

/// Computes the Schnorr response `r + c * s`.
pub(crate) fn respond(blinding: &Scalar, challenge: &Scalar, secret: &Scalar) -> Scalar {
    let mut out = *challenge;
    out.mul(secret);
    out.add(blinding);
    out
}

/// Recomputes a Schnorr commitment `base^response - public^challenge`.
pub(crate) fn recommit<E: Element>(base: &E, response: &Scalar, public: &E, challenge: &Scalar) -> E {
    sum_of_products(&[base, public], &[*response, challenge.neg()])
}
