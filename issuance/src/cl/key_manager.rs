use super::{
    proto::{CredDefKeyFormat, CredDefPrivateKey, CredDefPublicKey},
    signer::ClSigner,
    KEY_VERSION, MASTER_SECRET, TYPE_URL,
};
use crate::{
    keyset::{self, proto::KeyData, proto::KeyMaterialType, validate_key_version, Primitive},
    Error, KeyError,
};
use credence_primitives::{
    CredentialDefinition, CredentialPrivateKey, CredentialPublicKey, CredentialSchemaBuilder,
    KeyCorrectnessProof, NonCredentialSchemaBuilder,
};
use prost::Message as _;
use rand::rngs::OsRng;
use std::{str, sync::Arc};
use tracing::{debug, warn};

/// Generates credential definitions and turns serialized [CredDefPrivateKey]s into [ClSigner]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyManager;

impl KeyManager {
    pub fn new() -> Self {
        Self
    }

    /// Generates a credential definition for the attributes named in a serialized
    /// [CredDefKeyFormat].
    ///
    /// The hidden schema is always exactly [MASTER_SECRET].
    pub fn new_key(&self, serialized_key_format: &[u8]) -> Result<CredDefPrivateKey, Error> {
        if serialized_key_format.is_empty() {
            return Err(Error::InvalidKeyFormat(KeyError::Empty));
        }
        let format = CredDefKeyFormat::decode(serialized_key_format)
            .map_err(|err| Error::InvalidKeyFormat(err.into()))?;
        let params = format
            .params
            .ok_or(Error::InvalidKeyFormat(KeyError::MissingParams))?;

        let mut schema = CredentialSchemaBuilder::new();
        for attr in &params.attrs {
            schema.add_attr(attr)?;
        }
        let schema = schema.finalize()?;
        let mut non_schema = NonCredentialSchemaBuilder::new();
        non_schema.add_attr(MASTER_SECRET)?;
        let non_schema = non_schema.finalize()?;

        let definition = CredentialDefinition::new(&mut OsRng, &schema, &non_schema, false)?;
        let public_key = definition.public_key().to_json()?;
        let private_key = definition.private_key().to_json()?;
        let correctness_proof = definition.correctness_proof().to_json()?;
        debug!(attrs = params.attrs.len(), "generated credential definition");

        Ok(CredDefPrivateKey {
            version: KEY_VERSION,
            public_key: Some(CredDefPublicKey {
                version: KEY_VERSION,
                params: Some(params),
                key_value: public_key.into_bytes(),
                key_correctness_proof: correctness_proof.into_bytes(),
            }),
            key_value: private_key.into_bytes(),
        })
    }

    fn decode_private_key(serialized_key: &[u8]) -> Result<CredDefPrivateKey, KeyError> {
        if serialized_key.is_empty() {
            return Err(KeyError::Empty);
        }
        let key = CredDefPrivateKey::decode(serialized_key)?;
        validate_key_version(key.version, KEY_VERSION)?;
        let public = key.public_key.as_ref().ok_or(KeyError::MissingPublicKey)?;
        validate_key_version(public.version, KEY_VERSION)?;
        Ok(key)
    }

    fn signer(key: &CredDefPrivateKey) -> Result<ClSigner, KeyError> {
        let public = key.public_key.as_ref().ok_or(KeyError::MissingPublicKey)?;
        let public_key = CredentialPublicKey::from_json(str::from_utf8(&public.key_value)?)
            .map_err(KeyError::Backend)?;
        if let Some(params) = &public.params {
            if params.attrs != public_key.attrs() {
                return Err(KeyError::ParamsMismatch);
            }
        }
        let private_key = CredentialPrivateKey::from_json(str::from_utf8(&key.key_value)?)
            .map_err(KeyError::Backend)?;
        let correctness_proof =
            KeyCorrectnessProof::from_json(str::from_utf8(&public.key_correctness_proof)?)
                .map_err(KeyError::Backend)?;
        ClSigner::new(public_key, private_key, correctness_proof).map_err(KeyError::Backend)
    }
}

impl keyset::KeyManager for KeyManager {
    fn primitive(&self, serialized_key: &[u8]) -> Result<Arc<dyn Primitive>, Error> {
        let signer = Self::decode_private_key(serialized_key)
            .and_then(|key| Self::signer(&key))
            .map_err(|err| {
                warn!(%err, "rejected credential definition key");
                Error::InvalidKey(err)
            })?;
        Ok(Arc::new(signer))
    }

    fn new_key_data(&self, serialized_key_format: &[u8]) -> Result<KeyData, Error> {
        let key = self.new_key(serialized_key_format)?;
        Ok(KeyData {
            type_url: TYPE_URL.to_string(),
            value: key.encode_to_vec(),
            key_material_type: KeyMaterialType::AsymmetricPrivate as i32,
        })
    }

    fn public_key_data(&self, serialized_private_key: &[u8]) -> Result<KeyData, Error> {
        let key = Self::decode_private_key(serialized_private_key).map_err(Error::InvalidKey)?;
        let public = key
            .public_key
            .ok_or(Error::InvalidKey(KeyError::MissingPublicKey))?;
        Ok(KeyData {
            type_url: TYPE_URL.to_string(),
            value: public.encode_to_vec(),
            key_material_type: KeyMaterialType::AsymmetricPublic as i32,
        })
    }

    fn type_url(&self) -> &str {
        TYPE_URL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cl::{proto::CredDefParams, cred_def_key_template};
    use crate::keyset::KeyManager as _;
    use test_case::test_case;

    fn format(attrs: &[&str]) -> Vec<u8> {
        cred_def_key_template(attrs).value
    }

    #[test]
    fn test_new_key() {
        let manager = KeyManager::new();
        let key = manager.new_key(&format(&["attr1", "attr2"])).unwrap();
        assert_eq!(key.version, KEY_VERSION);
        let public = key.public_key.as_ref().unwrap();
        assert_eq!(public.version, KEY_VERSION);
        assert_eq!(public.params.as_ref().unwrap().attrs, ["attr1", "attr2"]);
        assert!(!public.key_value.is_empty());
        assert!(!public.key_correctness_proof.is_empty());
        assert!(!key.key_value.is_empty());

        let primitive = manager.primitive(&key.encode_to_vec()).unwrap();
        let signer = primitive.signer().unwrap();
        let definition = signer.public_definition().unwrap();
        let expected = CredentialPublicKey::from_json(str::from_utf8(&public.key_value).unwrap())
            .unwrap();
        assert_eq!(definition.public_key, expected);
        definition
            .correctness_proof
            .verify(&definition.public_key)
            .unwrap();
    }

    #[test]
    fn test_new_key_data() {
        let manager = KeyManager::new();
        let data = manager.new_key_data(&format(&["attr1"])).unwrap();
        assert_eq!(data.type_url, TYPE_URL);
        assert_eq!(data.key_material_type(), KeyMaterialType::AsymmetricPrivate);

        let public = manager.public_key_data(&data.value).unwrap();
        assert_eq!(public.type_url, TYPE_URL);
        assert_eq!(public.key_material_type(), KeyMaterialType::AsymmetricPublic);
        let decoded = CredDefPublicKey::decode(public.value.as_slice()).unwrap();
        assert_eq!(decoded.params.unwrap().attrs, ["attr1"]);
    }

    #[test]
    fn test_empty_inputs() {
        let manager = KeyManager::new();
        assert!(matches!(
            manager.new_key(&[]),
            Err(Error::InvalidKeyFormat(KeyError::Empty))
        ));
        assert!(matches!(
            manager.primitive(&[]),
            Err(Error::InvalidKey(KeyError::Empty))
        ));
        assert!(matches!(
            manager.public_key_data(&[]),
            Err(Error::InvalidKey(KeyError::Empty))
        ));
    }

    #[test]
    fn test_malformed_inputs() {
        let manager = KeyManager::new();
        assert!(matches!(
            manager.new_key(&[0xff, 0xff, 0xff]),
            Err(Error::InvalidKeyFormat(KeyError::Decode(_)))
        ));
        let no_params = CredDefKeyFormat { params: None }.encode_to_vec();
        // An all-default message encodes to nothing
        assert!(no_params.is_empty());
        let unknown_field = vec![0x10, 0x01];
        assert!(matches!(
            manager.new_key(&unknown_field),
            Err(Error::InvalidKeyFormat(KeyError::MissingParams))
        ));
        assert!(matches!(
            manager.primitive(&[0xff, 0xff, 0xff]),
            Err(Error::InvalidKey(KeyError::Decode(_)))
        ));
    }

    #[test]
    fn test_schema_rejected() {
        let manager = KeyManager::new();
        let duplicate = CredDefKeyFormat {
            params: Some(CredDefParams {
                attrs: vec!["attr1".to_string(), "attr1".to_string()],
            }),
        };
        assert!(matches!(
            manager.new_key(&duplicate.encode_to_vec()),
            Err(Error::Backend(credence_primitives::Error::DuplicateAttribute(_)))
        ));
        assert!(matches!(
            manager.new_key(&format(&["attr1", MASTER_SECRET])),
            Err(Error::Backend(credence_primitives::Error::OverlappingAttribute(_)))
        ));
        assert!(matches!(
            manager.new_key(&format(&["", "attr2"])),
            Err(Error::Backend(credence_primitives::Error::InvalidAttributeName(_)))
        ));
    }

    #[test_case(1, 0; "private version")]
    #[test_case(0, 1; "public version")]
    #[test_case(7, 7; "both versions")]
    #[test_case(u32::MAX, 0; "max version")]
    fn test_version_mismatch(private_version: u32, public_version: u32) {
        let manager = KeyManager::new();
        let mut key = manager.new_key(&format(&["attr1", "attr2"])).unwrap();
        key.version = private_version;
        key.public_key.as_mut().unwrap().version = public_version;
        assert!(matches!(
            manager.primitive(&key.encode_to_vec()),
            Err(Error::InvalidKey(KeyError::Version { .. }))
        ));
    }

    #[test]
    fn test_corrupted_key_material() {
        let manager = KeyManager::new();
        let original = manager.new_key(&format(&["attr1"])).unwrap();

        let mut key = original.clone();
        key.public_key = None;
        assert!(matches!(
            manager.primitive(&key.encode_to_vec()),
            Err(Error::InvalidKey(KeyError::MissingPublicKey))
        ));

        let mut key = original.clone();
        key.key_value = b"{}".to_vec();
        assert!(matches!(
            manager.primitive(&key.encode_to_vec()),
            Err(Error::InvalidKey(KeyError::Backend(_)))
        ));

        let mut key = original.clone();
        key.public_key.as_mut().unwrap().key_correctness_proof = vec![0xff];
        assert!(matches!(
            manager.primitive(&key.encode_to_vec()),
            Err(Error::InvalidKey(KeyError::Utf8(_)))
        ));

        // A private key from another definition
        let other = manager.new_key(&format(&["attr1"])).unwrap();
        let mut key = original.clone();
        key.key_value = other.key_value;
        assert!(matches!(
            manager.primitive(&key.encode_to_vec()),
            Err(Error::InvalidKey(KeyError::Backend(
                credence_primitives::Error::KeyMismatch
            )))
        ));

        // Params that disagree with the key
        let mut key = original;
        key.public_key.as_mut().unwrap().params = Some(CredDefParams {
            attrs: vec!["other".to_string()],
        });
        assert!(matches!(
            manager.primitive(&key.encode_to_vec()),
            Err(Error::InvalidKey(KeyError::ParamsMismatch))
        ));
    }

    #[test]
    fn test_does_support() {
        let manager = KeyManager::new();
        assert!(manager.does_support(TYPE_URL));
        assert!(!manager.does_support("type.credence.dev/credence.other.Key"));
        assert_eq!(manager.type_url(), TYPE_URL);
    }
}
