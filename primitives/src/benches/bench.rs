use criterion::criterion_main;

mod credential_definition;

criterion_main!(credential_definition::benches, sign_credential::benches);
