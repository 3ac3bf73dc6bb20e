#![no_main]

use arbitrary::Arbitrary;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use libfuzzer_sys::fuzz_target;
use std::collections::HashMap;
use weft_codec::{
    types::temporal::{Binding, Format},
    Bind, Config, Registry, Value,
};

/// Seconds between the epoch and the end of year 9999.
const MAX_SECONDS: i64 = 253_402_300_800;

#[derive(Arbitrary, Debug)]
enum FuzzInput {
    Untyped(String),
    Typed {
        ints: Vec<Option<i32>>,
        longs: HashMap<String, i64>,
        flags: Box<[bool]>,
        text: Option<String>,
    },
    Temporal {
        seconds: i64,
        nanos: u32,
        pattern: String,
    },
}

fn roundtrip<T: Bind + PartialEq + std::fmt::Debug>(registry: &Registry, value: &T) {
    let json = registry.serialize(value).expect("failed to encode a typed value");
    let decoded: T = registry
        .deserialize(&json)
        .expect("failed to decode a successfully encoded value");
    assert_eq!(value, &decoded);
}

/// Like [roundtrip], but tolerates values the registry refuses to encode (e.g. epoch
/// counts that overflow).
fn try_roundtrip<T: Bind + PartialEq + std::fmt::Debug>(registry: &Registry, value: &T) {
    let Ok(json) = registry.serialize(value) else {
        return;
    };
    let decoded: T = registry
        .deserialize(&json)
        .expect("failed to decode a successfully encoded value");
    assert_eq!(value, &decoded);
}

fn registry_with(format: Format) -> Registry {
    let cfg = Config::default()
        .with_temporal::<NaiveDateTime>(Binding::new(format.clone()))
        .with_temporal::<NaiveDate>(Binding::new(format.clone()))
        .with_temporal::<NaiveTime>(Binding::new(format.clone()))
        .with_temporal::<DateTime<Utc>>(Binding::new(format));
    Registry::new(cfg).unwrap()
}

fn fuzz_untyped(text: &str) {
    let registry = Registry::new(Config::default()).unwrap();
    let Ok(value) = registry.deserialize::<Value>(text) else {
        return;
    };
    roundtrip(&registry, &value);
}

fn fuzz_temporal(seconds: i64, nanos: u32, pattern: &str) {
    let Some(instant) = DateTime::from_timestamp(
        seconds.rem_euclid(MAX_SECONDS),
        nanos % 1_000_000_000,
    ) else {
        return;
    };
    let datetime = instant.naive_utc();

    for format in [Format::Array, Format::Object] {
        let registry = registry_with(format);
        roundtrip(&registry, &datetime);
        roundtrip(&registry, &datetime.date());
        roundtrip(&registry, &datetime.time());
        roundtrip(&registry, &instant);
    }

    let registry = registry_with(Format::Nanos);
    try_roundtrip(&registry, &datetime);
    try_roundtrip(&registry, &datetime.date());
    try_roundtrip(&registry, &datetime.time());
    try_roundtrip(&registry, &instant);

    let registry = Registry::new(Config::default()).unwrap();
    roundtrip(&registry, &datetime);
    roundtrip(&registry, &instant);

    // Arbitrary patterns must never panic
    let Ok(binding) = Binding::formatted(pattern) else {
        return;
    };
    let cfg = Config::default().with_temporal::<NaiveDateTime>(binding);
    let registry = Registry::new(cfg).unwrap();
    if let Ok(json) = registry.serialize(&datetime) {
        let _ = registry.deserialize::<NaiveDateTime>(&json);
    }
}

fuzz_target!(|input: FuzzInput| {
    match input {
        FuzzInput::Untyped(text) => fuzz_untyped(&text),
        FuzzInput::Typed {
            ints,
            longs,
            flags,
            text,
        } => {
            let registry = Registry::new(Config::default()).unwrap();
            roundtrip(&registry, &ints);
            roundtrip(&registry, &longs);
            roundtrip(&registry, &flags);
            roundtrip(&registry, &text);
        }
        FuzzInput::Temporal {
            seconds,
            nanos,
            pattern,
        } => fuzz_temporal(seconds, nanos, &pattern),
    }
});
