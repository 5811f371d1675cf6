//! Attribute schemas.
//!
//! A [CredentialSchema] lists the attributes an issuer signs in the clear. A
//! [NonCredentialSchema] lists the attributes the holder keeps hidden (conventionally a single
//! `master_secret`). Both are ordered: the position of an attribute decides which key component
//! signs it, so a definition is only usable with the exact schema it was generated for.

use crate::Error;
use serde::{Deserialize, Serialize};

fn check_name(name: &str) -> Result<(), Error> {
    if name.is_empty() || name.trim() != name || name.chars().any(char::is_control) {
        return Err(Error::InvalidAttributeName(name.to_string()));
    }
    Ok(())
}

fn push_unique(attrs: &mut Vec<String>, name: &str) -> Result<(), Error> {
    check_name(name)?;
    if attrs.iter().any(|existing| existing == name) {
        return Err(Error::DuplicateAttribute(name.to_string()));
    }
    attrs.push(name.to_string());
    Ok(())
}

/// Collects the attributes of a [CredentialSchema].
#[derive(Debug, Default)]
pub struct CredentialSchemaBuilder {
    attrs: Vec<String>,
}

impl CredentialSchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute.
    ///
    /// Fails if the name is empty, padded with whitespace, contains control characters, or was
    /// already added.
    pub fn add_attr(&mut self, name: &str) -> Result<(), Error> {
        push_unique(&mut self.attrs, name)
    }

    /// Freeze the schema. A schema must contain at least one attribute.
    pub fn finalize(self) -> Result<CredentialSchema, Error> {
        if self.attrs.is_empty() {
            return Err(Error::EmptySchema);
        }
        Ok(CredentialSchema { attrs: self.attrs })
    }
}

/// An ordered, immutable set of attribute names signed in the clear.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSchema {
    attrs: Vec<String>,
}

impl CredentialSchema {
    pub fn attrs(&self) -> &[String] {
        &self.attrs
    }
}

/// Collects the attributes of a [NonCredentialSchema].
#[derive(Debug, Default)]
pub struct NonCredentialSchemaBuilder {
    attrs: Vec<String>,
}

impl NonCredentialSchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hidden attribute. Same naming rules as [CredentialSchemaBuilder::add_attr].
    pub fn add_attr(&mut self, name: &str) -> Result<(), Error> {
        push_unique(&mut self.attrs, name)
    }

    /// Freeze the schema. A schema must contain at least one attribute.
    pub fn finalize(self) -> Result<NonCredentialSchema, Error> {
        if self.attrs.is_empty() {
            return Err(Error::EmptySchema);
        }
        Ok(NonCredentialSchema { attrs: self.attrs })
    }
}

/// An ordered, immutable set of attribute names the issuer never sees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonCredentialSchema {
    attrs: Vec<String>,
}

impl NonCredentialSchema {
    pub fn attrs(&self) -> &[String] {
        &self.attrs
    }
}
