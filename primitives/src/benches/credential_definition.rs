use credence_primitives::{
    CredentialDefinition, CredentialSchemaBuilder, NonCredentialSchemaBuilder,
};
use criterion::{criterion_group, Criterion};
use rand::thread_rng;
use std::hint::black_box;

fn benchmark_credential_definition(c: &mut Criterion) {
    for attrs in [1, 10, 50].into_iter() {
        let mut schema = CredentialSchemaBuilder::new();
        for i in 0..attrs {
            schema.add_attr(&format!("attr{i}")).unwrap();
        }
        let schema = schema.finalize().unwrap();
        let mut non_schema = NonCredentialSchemaBuilder::new();
        non_schema.add_attr("master_secret").unwrap();
        let non_schema = non_schema.finalize().unwrap();
        c.bench_function(&format!("{}/attrs={}", module_path!(), attrs), |b| {
            b.iter(|| {
                black_box(
                    CredentialDefinition::new(&mut thread_rng(), &schema, &non_schema, false)
                        .unwrap(),
                )
            });
        });
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = benchmark_credential_definition
}
