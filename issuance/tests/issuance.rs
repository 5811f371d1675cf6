use credence_issuance::{
    cl,
    keyset::{Handle, Manager, Registry},
    Error, Signer,
};
use credence_primitives::{
    blind_credential_secrets, AttributeValue, BlindedCredentialSecrets,
    CredentialSecretsBlindingFactors, CredentialValuesBuilder, MasterSecret, Nonce,
};
use rand::{rngs::StdRng, SeedableRng};
use std::{collections::BTreeMap, sync::Arc, thread};

fn registry() -> Arc<Registry> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
    let mut registry = Registry::new();
    cl::register(&mut registry).unwrap();
    Arc::new(registry)
}

fn blind(
    rng: &mut StdRng,
    signer: &dyn Signer,
    master_secret: &MasterSecret,
    nonce: &Nonce,
) -> (BlindedCredentialSecrets, CredentialSecretsBlindingFactors) {
    let definition = signer.public_definition().unwrap();
    let mut secrets = CredentialValuesBuilder::new();
    secrets
        .add_hidden(cl::MASTER_SECRET, master_secret.value())
        .unwrap();
    blind_credential_secrets(
        rng,
        &definition.public_key,
        &definition.correctness_proof,
        nonce,
        &secrets.finalize(),
    )
    .unwrap()
}

fn values() -> BTreeMap<String, AttributeValue> {
    BTreeMap::from([
        ("attr1".to_string(), AttributeValue::Integer(5)),
        ("attr2".to_string(), AttributeValue::from("aaa")),
    ])
}

#[test]
fn test_end_to_end() {
    let mut rng = StdRng::seed_from_u64(0);
    let registry = registry();
    let template = cl::cred_def_key_template(&["attr1", "attr2"]);
    let handle = Handle::generate(&registry, &template).unwrap();
    let signer = cl::new_signer(&handle, &registry).unwrap();

    // Holder blinds its master secret against the offer nonce
    let nonce = Nonce::new(&mut rng);
    let master_secret = MasterSecret::new(&mut rng);
    let (blinded, _) = blind(&mut rng, &signer, &master_secret, &nonce);

    let issuance = signer
        .sign("did:example:holder", &values(), &blinded, &nonce)
        .unwrap();
    assert!(!issuance.signature.to_json().unwrap().is_empty());
    assert!(!issuance.correctness_proof.to_json().unwrap().is_empty());
    assert_ne!(issuance.nonce, nonce);

    // Holder checks the signature was produced with the published key
    let definition = signer.public_definition().unwrap();
    let mut known = CredentialValuesBuilder::new();
    for (name, value) in values() {
        known.add_known(&name, &value).unwrap();
    }
    issuance
        .correctness_proof
        .verify(
            &definition.public_key,
            &issuance.signature,
            &blinded,
            "did:example:holder",
            &known.finalize(),
            &issuance.nonce,
        )
        .unwrap();
}

#[test]
fn test_signatures_are_fresh() {
    let mut rng = StdRng::seed_from_u64(1);
    let registry = registry();
    let template = cl::cred_def_key_template(&["attr1", "attr2"]);
    let handle = Handle::generate(&registry, &template).unwrap();
    let signer = cl::new_signer(&handle, &registry).unwrap();
    let nonce = Nonce::new(&mut rng);
    let master_secret = MasterSecret::new(&mut rng);
    let (blinded, _) = blind(&mut rng, &signer, &master_secret, &nonce);

    let first = signer.sign("prover", &values(), &blinded, &nonce).unwrap();
    let second = signer.sign("prover", &values(), &blinded, &nonce).unwrap();
    assert_ne!(
        first.signature.to_json().unwrap(),
        second.signature.to_json().unwrap()
    );
    assert_ne!(first.nonce, second.nonce);
}

#[test]
fn test_persisted_keyset() {
    let mut rng = StdRng::seed_from_u64(2);
    let registry = registry();
    let template = cl::cred_def_key_template(&["attr1", "attr2"]);
    let handle = Handle::generate(&registry, &template).unwrap();
    let original = cl::new_signer(&handle, &registry)
        .unwrap()
        .public_definition()
        .unwrap();

    // Reload from cleartext storage
    let reloaded = Handle::decode(&handle.encode()).unwrap();
    let signer = cl::new_signer(&reloaded, &registry).unwrap();
    assert_eq!(signer.public_definition().unwrap(), original);

    let nonce = Nonce::new(&mut rng);
    let master_secret = MasterSecret::new(&mut rng);
    let (blinded, _) = blind(&mut rng, &signer, &master_secret, &nonce);
    signer.sign("prover", &values(), &blinded, &nonce).unwrap();

    // The public handle carries no signing material
    let public = handle.public(&registry).unwrap();
    assert!(matches!(
        cl::new_signer(&public, &registry),
        Err(Error::NotPrivateKey(id)) if id == handle.keyset().primary_key_id
    ));
}

#[test]
fn test_rotation_switches_primary() {
    let registry = registry();
    let template = cl::cred_def_key_template(&["attr1", "attr2"]);
    let handle = Handle::generate(&registry, &template).unwrap();
    let before = cl::new_signer(&handle, &registry)
        .unwrap()
        .public_definition()
        .unwrap();

    let mut manager = Manager::from_handle(&handle);
    let key_id = manager.add(&registry, &template).unwrap();
    manager.set_primary(key_id).unwrap();
    let rotated = manager.handle().unwrap();
    let after = cl::new_signer(&rotated, &registry)
        .unwrap()
        .public_definition()
        .unwrap();
    assert_ne!(before, after);
    assert_eq!(after.public_key.attrs(), before.public_key.attrs());
}

#[test]
fn test_wrong_nonce_rejected() {
    let mut rng = StdRng::seed_from_u64(3);
    let registry = registry();
    let template = cl::cred_def_key_template(&["attr1", "attr2"]);
    let handle = Handle::generate(&registry, &template).unwrap();
    let signer = cl::new_signer(&handle, &registry).unwrap();
    let nonce = Nonce::new(&mut rng);
    let master_secret = MasterSecret::new(&mut rng);
    let (blinded, _) = blind(&mut rng, &signer, &master_secret, &nonce);

    let other = Nonce::new(&mut rng);
    assert!(matches!(
        signer.sign("prover", &values(), &blinded, &other),
        Err(Error::Backend(
            credence_primitives::Error::InvalidBlindedSecretsProof
        ))
    ));
}

#[test]
fn test_concurrent_signing() {
    let mut rng = StdRng::seed_from_u64(4);
    let registry = registry();
    let template = cl::cred_def_key_template(&["attr1", "attr2"]);
    let handle = Handle::generate(&registry, &template).unwrap();
    let signer = Arc::new(cl::new_signer(&handle, &registry).unwrap());
    let nonce = Nonce::new(&mut rng);
    let master_secret = MasterSecret::new(&mut rng);
    let (blinded, _) = blind(&mut rng, signer.as_ref(), &master_secret, &nonce);
    let blinded = Arc::new(blinded);

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let signer = signer.clone();
            let blinded = blinded.clone();
            thread::spawn(move || {
                signer
                    .sign("prover", &values(), &blinded, &nonce)
                    .unwrap()
                    .nonce
            })
        })
        .collect();
    let mut nonces: Vec<_> = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .collect();
    nonces.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
    nonces.dedup();
    assert_eq!(nonces.len(), 4);
}
