use super::proto::{KeyStatusType, Keyset};
use crate::{Error, KeyError};
use std::collections::BTreeSet;

/// Rejects any key version other than the one a key manager supports.
pub fn validate_key_version(found: u32, expected: u32) -> Result<(), KeyError> {
    if found != expected {
        return Err(KeyError::Version { found, expected });
    }
    Ok(())
}

/// Checks a keyset is usable: keys carry key data, ids are unique, and the primary key exists and
/// is enabled.
pub fn validate_keyset(keyset: &Keyset) -> Result<(), Error> {
    if keyset.key.is_empty() {
        return Err(Error::InvalidKeyset("no keys"));
    }
    let mut ids = BTreeSet::new();
    let mut primary = None;
    for key in &keyset.key {
        if !ids.insert(key.key_id) {
            return Err(Error::InvalidKeyset("duplicate key id"));
        }
        match &key.key_data {
            Some(data) if !data.type_url.is_empty() => {}
            _ => return Err(Error::InvalidKeyset("key without key data")),
        }
        if key.status() == KeyStatusType::Unknown {
            return Err(Error::InvalidKeyset("key with unknown status"));
        }
        if key.key_id == keyset.primary_key_id {
            primary = Some(key);
        }
    }
    match primary {
        None => Err(Error::InvalidKeyset("primary key not found")),
        Some(key) if key.status() != KeyStatusType::Enabled => {
            Err(Error::InvalidKeyset("primary key is not enabled"))
        }
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyset::proto::{Key, KeyData, KeyMaterialType};
    use test_case::test_case;

    fn key(key_id: u32, status: KeyStatusType) -> Key {
        Key {
            key_data: Some(KeyData {
                type_url: "type.test/key".to_string(),
                value: vec![1],
                key_material_type: KeyMaterialType::AsymmetricPrivate as i32,
            }),
            status: status as i32,
            key_id,
        }
    }

    #[test_case(0, 0 => true; "matching")]
    #[test_case(1, 0 => false; "newer")]
    #[test_case(u32::MAX, 0 => false; "max")]
    #[test_case(0, 1 => false; "older")]
    fn test_key_version(found: u32, expected: u32) -> bool {
        validate_key_version(found, expected).is_ok()
    }

    #[test]
    fn test_valid() {
        let keyset = Keyset {
            primary_key_id: 2,
            key: vec![key(1, KeyStatusType::Disabled), key(2, KeyStatusType::Enabled)],
        };
        validate_keyset(&keyset).unwrap();
    }

    #[test]
    fn test_invalid() {
        let empty = Keyset {
            primary_key_id: 1,
            key: vec![],
        };
        assert!(matches!(validate_keyset(&empty), Err(Error::InvalidKeyset(_))));

        let duplicate = Keyset {
            primary_key_id: 1,
            key: vec![key(1, KeyStatusType::Enabled), key(1, KeyStatusType::Enabled)],
        };
        assert!(matches!(
            validate_keyset(&duplicate),
            Err(Error::InvalidKeyset("duplicate key id"))
        ));

        let missing_primary = Keyset {
            primary_key_id: 7,
            key: vec![key(1, KeyStatusType::Enabled)],
        };
        assert!(matches!(
            validate_keyset(&missing_primary),
            Err(Error::InvalidKeyset("primary key not found"))
        ));

        let disabled_primary = Keyset {
            primary_key_id: 1,
            key: vec![key(1, KeyStatusType::Disabled)],
        };
        assert!(matches!(
            validate_keyset(&disabled_primary),
            Err(Error::InvalidKeyset("primary key is not enabled"))
        ));

        let mut no_data = key(1, KeyStatusType::Enabled);
        no_data.key_data = None;
        let no_data = Keyset {
            primary_key_id: 1,
            key: vec![no_data],
        };
        assert!(matches!(
            validate_keyset(&no_data),
            Err(Error::InvalidKeyset("key without key data"))
        ));
    }
}
