use criterion::{black_box, criterion_group, Criterion};
use std::collections::HashMap;
use weft_codec::{Bind, Config, Registry, Value};

fn bench_resolve(c: &mut Criterion) {
    let ty = <HashMap<String, Vec<Option<i64>>>>::descriptor();

    // Every lookup after the first is a cache hit
    let registry = Registry::new(Config::default()).unwrap();
    c.bench_function(&format!("{}/cached", module_path!()), |b| {
        b.iter(|| black_box(registry.resolve(&ty).unwrap()));
    });

    // A fresh registry walks the chain for the type and each of its arguments
    c.bench_function(&format!("{}/cold", module_path!()), |b| {
        b.iter(|| {
            let registry = Registry::new(Config::default()).unwrap();
            black_box(registry.resolve(&ty).unwrap());
        });
    });

    // Untyped documents resolve by token kind on every value
    let document = r#"{"a":[1,2,3],"b":{"c":"d","e":[true,false,null]},"f":2.5}"#;
    c.bench_function(&format!("{}/untyped", module_path!()), |b| {
        b.iter(|| black_box(registry.deserialize::<Value>(document).unwrap()));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_resolve
}
