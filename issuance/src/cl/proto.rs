//! Wire formats for credential-definition keys.
//!
//! Key material is the opaque JSON produced by `credence-primitives`.

#[derive(Clone, PartialEq, prost::Message)]
pub struct CredDefParams {
    /// Attributes signed in the clear, in schema order.
    #[prost(string, repeated, tag = "1")]
    pub attrs: Vec<String>,
}

/// A request to generate a credential definition.
#[derive(Clone, PartialEq, prost::Message)]
pub struct CredDefKeyFormat {
    #[prost(message, optional, tag = "1")]
    pub params: Option<CredDefParams>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CredDefPublicKey {
    #[prost(uint32, tag = "1")]
    pub version: u32,
    #[prost(message, optional, tag = "2")]
    pub params: Option<CredDefParams>,
    #[prost(bytes = "vec", tag = "3")]
    pub key_value: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub key_correctness_proof: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CredDefPrivateKey {
    #[prost(uint32, tag = "1")]
    pub version: u32,
    #[prost(message, optional, tag = "2")]
    pub public_key: Option<CredDefPublicKey>,
    #[prost(bytes = "vec", tag = "3")]
    pub key_value: Vec<u8>,
}
