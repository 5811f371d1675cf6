//! Group operations over BLS12-381.
//!
//! Thin wrappers around `blst` exposing exactly what credential issuance needs: scalar
//! arithmetic, G1/G2 point addition and scalar multiplication, canonical (compressed)
//! encodings, and a hash onto the scalar field for Fiat-Shamir challenges and attribute
//! encoding.
//!
//! # Warning
//!
//! Points decoded from untrusted input are checked to be on the curve, non-infinite and in the
//! correct subgroup. Always go through [Element::from_bytes] (or the serde impls, which call it)
//! rather than building points from raw bytes.

use blst::{
    blst_bendian_from_scalar, blst_fr, blst_fr_add, blst_fr_from_scalar, blst_fr_from_uint64,
    blst_fr_mul, blst_fr_sub, blst_keygen_v3, blst_p1, blst_p1_add_or_double, blst_p1_affine,
    blst_p1_compress, blst_p1_from_affine, blst_p1_in_g1, blst_p1_is_equal, blst_p1_is_inf,
    blst_p1_mult, blst_p1_uncompress, blst_p2, blst_p2_add_or_double, blst_p2_affine,
    blst_p2_compress, blst_p2_from_affine, blst_p2_in_g2, blst_p2_is_equal, blst_p2_is_inf,
    blst_p2_mult, blst_p2_uncompress, blst_scalar, blst_scalar_fr_check, blst_scalar_from_bendian,
    blst_scalar_from_fr, BLS12_381_G1, BLS12_381_G2, BLST_ERROR,
};
use rand::{CryptoRng, RngCore};
use serde::{de::Error as _, Deserializer, Serializer};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// An element of a group.
pub trait Element: Clone + Eq + PartialEq + Send + Sync + Sized {
    /// Returns the additive identity.
    fn zero() -> Self;

    /// Returns the multiplicative identity (the generator for points).
    fn one() -> Self;

    /// Adds to self in-place.
    fn add(&mut self, rhs: &Self);

    /// Multiplies self in-place.
    fn mul(&mut self, rhs: &Scalar);

    /// Canonically serializes the element.
    fn to_bytes(&self) -> Vec<u8>;

    /// Deserializes a canonically encoded element.
    fn from_bytes(bytes: &[u8]) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(transparent)]
pub struct Scalar(blst_fr);

pub const SCALAR_LENGTH: usize = 32;

/// `R = 2^256 mod q` in little-endian Montgomery form which is equivalent to 1 in little-endian
/// non-Montgomery form.
const BLST_FR_ONE: Scalar = Scalar(blst_fr {
    l: [
        0x0000_0001_ffff_fffe,
        0x5884_b7fa_0003_4802,
        0x998c_4fef_ecbc_4ff5,
        0x1824_b159_acc5_056f,
    ],
});

#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct G1(blst_p1);

pub const G1_ELEMENT_BYTE_LENGTH: usize = 48;

#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct G2(blst_p2);

pub const G2_ELEMENT_BYTE_LENGTH: usize = 96;

/// Returns the size in bits of a given blst_scalar (represented in little-endian).
fn bits(scalar: &blst_scalar) -> usize {
    let mut bits: usize = SCALAR_LENGTH * 8;
    for i in scalar.b.iter().rev() {
        let leading = i.leading_zeros();
        bits -= leading as usize;
        if leading < 8 {
            break;
        }
    }
    bits
}

/// Derives a scalar from input keying material (at least 32 bytes) and a domain tag.
fn derive(ikm: &[u8], info: &[u8]) -> Scalar {
    let mut ret = blst_fr::default();
    unsafe {
        let mut sc = blst_scalar::default();
        blst_keygen_v3(&mut sc, ikm.as_ptr(), ikm.len(), info.as_ptr(), info.len());
        blst_fr_from_scalar(&mut ret, &sc);
    }
    Scalar(ret)
}

impl Scalar {
    /// Generates a random scalar using the provided RNG.
    pub fn rand<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut ikm = [0u8; 64];
        rng.fill_bytes(&mut ikm);
        let scalar = derive(&ikm, &[]);
        ikm.zeroize();
        scalar
    }

    /// Generates a random scalar that is guaranteed to be non-zero.
    pub fn rand_nonzero<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        loop {
            let scalar = Self::rand(rng);
            if !scalar.is_zero() {
                return scalar;
            }
        }
    }

    /// Maps arbitrary bytes onto the scalar field under the provided domain tag.
    pub fn map(dst: &[u8], message: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((dst.len() as u64).to_be_bytes());
        hasher.update(dst);
        hasher.update(message);
        let digest = hasher.finalize();
        derive(digest.as_slice(), dst)
    }

    /// Returns the scalar representing the provided integer.
    pub fn from_u64(i: u64) -> Self {
        // blst requires a buffer of 4 uint64 values. Failure to provide one will
        // result in unexpected behavior (will read past the provided buffer).
        let buffer = [i, 0, 0, 0];
        let mut ret = blst_fr::default();
        unsafe { blst_fr_from_uint64(&mut ret, buffer.as_ptr()) };
        Self(ret)
    }

    /// Subtracts the provided scalar from self in-place.
    pub fn sub(&mut self, rhs: &Self) {
        unsafe { blst_fr_sub(&mut self.0, &self.0, &rhs.0) }
    }

    /// Returns the additive inverse of the scalar.
    pub fn neg(&self) -> Self {
        let mut ret = Self::zero();
        ret.sub(self);
        ret
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.l.zeroize();
    }
}

impl Element for Scalar {
    fn zero() -> Self {
        Self(blst_fr::default())
    }

    fn one() -> Self {
        BLST_FR_ONE
    }

    fn add(&mut self, rhs: &Self) {
        unsafe {
            blst_fr_add(&mut self.0, &self.0, &rhs.0);
        }
    }

    fn mul(&mut self, rhs: &Self) {
        unsafe {
            blst_fr_mul(&mut self.0, &self.0, &rhs.0);
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = [0u8; SCALAR_LENGTH];
        unsafe {
            let mut scalar = blst_scalar::default();
            blst_scalar_from_fr(&mut scalar, &self.0);
            blst_bendian_from_scalar(bytes.as_mut_ptr(), &scalar);
        }
        bytes.to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != SCALAR_LENGTH {
            return None;
        }
        let mut ret = blst_fr::default();
        unsafe {
            let mut scalar = blst_scalar::default();
            blst_scalar_from_bendian(&mut scalar, bytes.as_ptr());
            if !blst_scalar_fr_check(&scalar) {
                return None;
            }
            blst_fr_from_scalar(&mut ret, &scalar);
        }
        Some(Self(ret))
    }
}

impl PartialEq for G1 {
    fn eq(&self, other: &Self) -> bool {
        unsafe { blst_p1_is_equal(&self.0, &other.0) }
    }
}

impl Eq for G1 {}

impl Element for G1 {
    fn zero() -> Self {
        Self(blst_p1::default())
    }

    fn one() -> Self {
        let mut ret = blst_p1::default();
        unsafe {
            blst_p1_from_affine(&mut ret, &BLS12_381_G1);
        }
        Self(ret)
    }

    fn add(&mut self, rhs: &Self) {
        unsafe {
            blst_p1_add_or_double(&mut self.0, &self.0, &rhs.0);
        }
    }

    fn mul(&mut self, rhs: &Scalar) {
        let mut scalar: blst_scalar = blst_scalar::default();
        unsafe {
            blst_scalar_from_fr(&mut scalar, &rhs.0);
            blst_p1_mult(&mut self.0, &self.0, scalar.b.as_ptr(), bits(&scalar));
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = [0u8; G1_ELEMENT_BYTE_LENGTH];
        unsafe {
            blst_p1_compress(bytes.as_mut_ptr(), &self.0);
        }
        bytes.to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != G1_ELEMENT_BYTE_LENGTH {
            return None;
        }
        let mut ret = blst_p1::default();
        unsafe {
            let mut affine = blst_p1_affine::default();
            if blst_p1_uncompress(&mut affine, bytes.as_ptr()) != BLST_ERROR::BLST_SUCCESS {
                return None;
            }
            blst_p1_from_affine(&mut ret, &affine);
            if blst_p1_is_inf(&ret) || !blst_p1_in_g1(&ret) {
                return None;
            }
        }
        Some(Self(ret))
    }
}

impl PartialEq for G2 {
    fn eq(&self, other: &Self) -> bool {
        unsafe { blst_p2_is_equal(&self.0, &other.0) }
    }
}

impl Eq for G2 {}

impl Element for G2 {
    fn zero() -> Self {
        Self(blst_p2::default())
    }

    fn one() -> Self {
        let mut ret = blst_p2::default();
        unsafe {
            blst_p2_from_affine(&mut ret, &BLS12_381_G2);
        }
        Self(ret)
    }

    fn add(&mut self, rhs: &Self) {
        unsafe {
            blst_p2_add_or_double(&mut self.0, &self.0, &rhs.0);
        }
    }

    fn mul(&mut self, rhs: &Scalar) {
        let mut scalar = blst_scalar::default();
        unsafe {
            blst_scalar_from_fr(&mut scalar, &rhs.0);
            blst_p2_mult(&mut self.0, &self.0, scalar.b.as_ptr(), bits(&scalar));
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = [0u8; G2_ELEMENT_BYTE_LENGTH];
        unsafe {
            blst_p2_compress(bytes.as_mut_ptr(), &self.0);
        }
        bytes.to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != G2_ELEMENT_BYTE_LENGTH {
            return None;
        }
        let mut ret = blst_p2::default();
        unsafe {
            let mut affine = blst_p2_affine::default();
            if blst_p2_uncompress(&mut affine, bytes.as_ptr()) != BLST_ERROR::BLST_SUCCESS {
                return None;
            }
            blst_p2_from_affine(&mut ret, &affine);
            if blst_p2_is_inf(&ret) || !blst_p2_in_g2(&ret) {
                return None;
            }
        }
        Some(Self(ret))
    }
}

/// Returns `base * scalar` without mutating `base`.
pub fn mul<E: Element>(base: &E, scalar: &Scalar) -> E {
    let mut out = base.clone();
    out.mul(scalar);
    out
}

/// Computes `sum(points[i] * scalars[i])`.
///
/// Callers guarantee both slices have the same length.
pub fn sum_of_products<E: Element>(points: &[&E], scalars: &[Scalar]) -> E {
    let mut acc = E::zero();
    for (point, scalar) in points.iter().zip(scalars) {
        acc.add(&mul(*point, scalar));
    }
    acc
}

macro_rules! impl_hex_serde {
    ($type:ty, $name:literal) => {
        impl serde::Serialize for $type {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&hex::encode(self.to_bytes()))
            }
        }

        impl<'de> serde::Deserialize<'de> for $type {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let encoded = <String as serde::Deserialize>::deserialize(deserializer)?;
                let bytes = hex::decode(encoded).map_err(D::Error::custom)?;
                <$type as Element>::from_bytes(&bytes)
                    .ok_or_else(|| D::Error::custom(concat!("invalid ", $name)))
            }
        }
    };
}

impl_hex_serde!(Scalar, "scalar");
impl_hex_serde!(G1, "G1 element");
impl_hex_serde!(G2, "G2 element");
