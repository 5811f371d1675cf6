//! Attribute values and their encoding onto the scalar field.

use crate::{
    group::{Element, Scalar},
    Error,
};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use zeroize::Zeroize;

/// Domain tag for attribute values that are not non-negative integers.
const ENCODE_DST: &[u8] = b"CREDENCE_ATTRIBUTE_VALUE";

/// A raw attribute value supplied by an issuer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Text(String),
}

impl AttributeValue {
    /// Encodes the value as a scalar.
    ///
    /// Non-negative integers map to themselves. Everything else maps to the hash of its textual
    /// form.
    pub fn encode(&self) -> Scalar {
        match self {
            Self::Integer(i) if *i >= 0 => Scalar::from_u64(*i as u64),
            other => Scalar::map(ENCODE_DST, other.to_string().as_bytes()),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// The holder's link secret, hidden from every issuer.
pub struct MasterSecret(Scalar);

impl MasterSecret {
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(Scalar::rand(rng))
    }

    pub fn value(&self) -> &Scalar {
        &self.0
    }
}

impl Drop for MasterSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Collects encoded attribute values.
#[derive(Default)]
pub struct CredentialValuesBuilder {
    known: BTreeMap<String, Scalar>,
    hidden: BTreeMap<String, Scalar>,
}

impl CredentialValuesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode and record a value the issuer sees.
    pub fn add_known(&mut self, name: &str, value: &AttributeValue) -> Result<(), Error> {
        self.insert(name, value.encode(), false)
    }

    /// Record an already-encoded value only the holder sees.
    pub fn add_hidden(&mut self, name: &str, value: &Scalar) -> Result<(), Error> {
        self.insert(name, *value, true)
    }

    fn insert(&mut self, name: &str, value: Scalar, hidden: bool) -> Result<(), Error> {
        if self.known.contains_key(name) || self.hidden.contains_key(name) {
            return Err(Error::DuplicateAttribute(name.to_string()));
        }
        let target = if hidden {
            &mut self.hidden
        } else {
            &mut self.known
        };
        target.insert(name.to_string(), value);
        Ok(())
    }

    pub fn finalize(mut self) -> CredentialValues {
        CredentialValues {
            known: std::mem::take(&mut self.known),
            hidden: std::mem::take(&mut self.hidden),
        }
    }
}

impl Drop for CredentialValuesBuilder {
    fn drop(&mut self) {
        self.hidden.values_mut().for_each(Zeroize::zeroize);
    }
}

/// Encoded attribute values, split by visibility.
pub struct CredentialValues {
    known: BTreeMap<String, Scalar>,
    hidden: BTreeMap<String, Scalar>,
}

impl CredentialValues {
    pub fn known(&self) -> &BTreeMap<String, Scalar> {
        &self.known
    }

    pub fn hidden(&self) -> &BTreeMap<String, Scalar> {
        &self.hidden
    }
}

impl Drop for CredentialValues {
    fn drop(&mut self) {
        self.hidden.values_mut().for_each(Zeroize::zeroize);
    }
}
