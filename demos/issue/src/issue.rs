//! Load (or create) a keyset and issue one credential against a simulated holder.

use credence_issuance::{cl, keyset::Handle, keyset::Registry, Signer};
use credence_primitives::{
    blind_credential_secrets, AttributeValue, CredentialPublicKey, CredentialSignature,
    CredentialValuesBuilder, MasterSecret, Nonce, SignatureCorrectnessProof,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("issuance error: {0}")]
    Issuance(#[from] credence_issuance::Error),
    #[error("credential error: {0}")]
    Credential(#[from] credence_primitives::Error),
}

/// Issuance configuration
#[derive(Deserialize, Debug)]
pub struct Config {
    /// Identifier of the holder the credential is issued to
    pub prover_id: String,

    /// Ordered attribute names of the definition (only used when generating a keyset)
    pub attributes: Vec<String>,

    /// Value of every attribute
    pub values: BTreeMap<String, AttributeValue>,
}

#[derive(Serialize)]
struct Output<'a> {
    public_key: &'a CredentialPublicKey,
    signature: &'a CredentialSignature,
    correctness_proof: &'a SignatureCorrectnessProof,
    nonce: &'a Nonce,
}

fn load_handle(
    registry: &Registry,
    config: &Config,
    keyset_path: Option<&PathBuf>,
) -> Result<Handle, Error> {
    if let Some(path) = keyset_path {
        if path.exists() {
            let handle = Handle::decode(&std::fs::read(path)?)?;
            info!(path = ?path, keys = handle.keyset().key.len(), "loaded keyset");
            return Ok(handle);
        }
    }
    let template = cl::cred_def_key_template(config.attributes.as_slice());
    let handle = Handle::generate(registry, &template)?;
    if let Some(path) = keyset_path {
        std::fs::write(path, handle.encode())?;
        info!(path = ?path, "wrote keyset");
    }
    Ok(handle)
}

/// Issues a credential and returns it (with the public key) as JSON.
pub fn run(config_path: &Path, keyset_path: Option<&PathBuf>) -> Result<String, Error> {
    let config: Config = {
        let config_file = File::open(config_path)?;
        serde_yaml::from_reader(config_file)?
    };

    let mut registry = Registry::new();
    cl::register(&mut registry)?;
    let handle = load_handle(&registry, &config, keyset_path)?;
    let signer = cl::new_signer(&handle, &registry)?;
    let definition = signer.public_definition()?;

    // Holder side
    let nonce = Nonce::new(&mut OsRng);
    let master_secret = MasterSecret::new(&mut OsRng);
    let mut secrets = CredentialValuesBuilder::new();
    secrets.add_hidden(cl::MASTER_SECRET, master_secret.value())?;
    let (blinded, _) = blind_credential_secrets(
        &mut OsRng,
        &definition.public_key,
        &definition.correctness_proof,
        &nonce,
        &secrets.finalize(),
    )?;

    let issuance = signer.sign(&config.prover_id, &config.values, &blinded, &nonce)?;
    info!(prover_id = %config.prover_id, "issued credential");

    // Holder checks the issuer used the published key
    let mut known = CredentialValuesBuilder::new();
    for (name, value) in &config.values {
        known.add_known(name, value)?;
    }
    issuance.correctness_proof.verify(
        &definition.public_key,
        &issuance.signature,
        &blinded,
        &config.prover_id,
        &known.finalize(),
        &issuance.nonce,
    )?;
    info!("verified signature correctness proof");

    Ok(serde_json::to_string_pretty(&Output {
        public_key: &definition.public_key,
        signature: &issuance.signature,
        correctness_proof: &issuance.correctness_proof,
        nonce: &issuance.nonce,
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    const CONFIG: &str = "prover_id: prover\nattributes: [name, age]\nvalues:\n  name: Alice\n  age: 30\n";

    fn scratch(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("credence-issue-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_config() {
        let config: Config = serde_yaml::from_str(CONFIG).unwrap();
        assert_eq!(config.attributes, ["name", "age"]);
        assert_eq!(config.values["age"], AttributeValue::Integer(30));
        assert_eq!(config.values["name"], AttributeValue::from("Alice"));
    }

    #[test]
    fn test_keyset_reused() {
        let dir = scratch("reuse");
        let config_path = dir.join("config.yaml");
        fs::write(&config_path, CONFIG).unwrap();
        let keyset_path = dir.join("keyset.bin");
        let _ = fs::remove_file(&keyset_path);

        let first: serde_json::Value =
            serde_json::from_str(&run(&config_path, Some(&keyset_path)).unwrap()).unwrap();
        assert!(keyset_path.exists());
        let second: serde_json::Value =
            serde_json::from_str(&run(&config_path, Some(&keyset_path)).unwrap()).unwrap();
        assert_eq!(first["public_key"], second["public_key"]);
        assert_ne!(first["signature"], second["signature"]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_value() {
        let dir = scratch("missing");
        let config_path = dir.join("config.yaml");
        fs::write(&config_path, "prover_id: prover\nattributes: [name, age]\nvalues:\n  name: Alice\n").unwrap();
        assert!(matches!(
            run(&config_path, None),
            Err(Error::Issuance(credence_issuance::Error::Backend(
                credence_primitives::Error::MissingAttribute(_)
            )))
        ));
        fs::remove_dir_all(&dir).unwrap();
    }
}
