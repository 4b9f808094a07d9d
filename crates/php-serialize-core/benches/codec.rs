//! Benchmarks for the PHP serialize encoder and decoder.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use php_serialize_core::{from_bytes, from_reader, to_bytes, PhpValue};

fn simple_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("simple_types");

    let cases: [(&str, &[u8]); 4] = [
        ("null", b"N;"),
        ("bool", b"b:1;"),
        ("int", b"i:1234567890;"),
        ("float", b"d:3.141592653589793;"),
    ];
    for (name, data) in cases {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| b.iter(|| from_bytes(black_box(data))));
    }

    group.finish();
}

fn strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("strings");

    for (name, len) in [("short_5b", 5), ("medium_100b", 100), ("large_10kb", 10_000), ("huge_1mb", 1_000_000)] {
        let value = PhpValue::string("x".repeat(len));
        let data = to_bytes(&value).unwrap();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("decode_{}", name), |b| {
            b.iter(|| from_bytes(black_box(&data)))
        });
        group.bench_function(format!("encode_{}", name), |b| {
            b.iter(|| to_bytes(black_box(&value)))
        });
    }

    group.finish();
}

fn arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("arrays");

    for size in [0usize, 10, 100, 1000] {
        let value = PhpValue::list((0..size).map(|i| PhpValue::Int(i as i64 * 2)));
        let data = to_bytes(&value).unwrap();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("decode_indexed_{}", size), |b| {
            b.iter(|| from_bytes(black_box(&data)))
        });
        group.bench_function(format!("encode_indexed_{}", size), |b| {
            b.iter(|| to_bytes(black_box(&value)))
        });
    }

    // Associative array with string keys
    let assoc = PhpValue::map((0..100).map(|i| (format!("key_{}", i), PhpValue::Int(i))));
    let assoc_data = to_bytes(&assoc).unwrap();
    group.throughput(Throughput::Bytes(assoc_data.len() as u64));
    group.bench_function("decode_assoc_100", |b| {
        b.iter(|| from_bytes(black_box(&assoc_data)))
    });
    group.bench_function("encode_assoc_100", |b| {
        b.iter(|| to_bytes(black_box(&assoc)))
    });

    group.finish();
}

fn nested_structures(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested");

    for depth in [10, 50] {
        let mut value = PhpValue::from("leaf");
        for i in 0..depth {
            value = PhpValue::map(vec![(format!("key{}", i % 10), value)]);
        }
        let data = to_bytes(&value).unwrap();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("depth_{}", depth), |b| {
            b.iter(|| from_bytes(black_box(&data)))
        });
    }

    group.finish();
}

fn real_world(c: &mut Criterion) {
    let mut group = c.benchmark_group("real_world");

    // Simulated form data
    let form_data = br#"a:3:{s:6:"fields";a:3:{i:0;a:3:{s:4:"type";s:4:"text";s:5:"label";s:4:"Name";s:8:"required";b:1;}i:1;a:3:{s:4:"type";s:5:"email";s:5:"label";s:5:"Email";s:8:"required";b:1;}i:2;a:3:{s:4:"type";s:8:"textarea";s:5:"label";s:7:"Message";s:8:"required";b:0;}}s:8:"settings";a:2:{s:11:"submit_text";s:6:"Submit";s:15:"success_message";s:10:"Thank you!";}s:11:"permissions";a:3:{i:0;s:4:"read";i:1;s:5:"write";i:2;s:6:"delete";}}"#;
    group.throughput(Throughput::Bytes(form_data.len() as u64));
    group.bench_function("form_data", |b| {
        b.iter(|| from_bytes(black_box(form_data)))
    });

    // Session-like object read through io::Read
    let user = br#"O:7:"WP_User":3:{s:8:"username";s:5:"admin";s:5:"roles";a:1:{i:0;s:13:"administrator";}s:2:"ID";i:1;}"#;
    group.throughput(Throughput::Bytes(user.len() as u64));
    group.bench_function("object_from_reader", |b| {
        b.iter(|| from_reader(Cursor::new(black_box(&user[..]))))
    });

    group.finish();
}

#[cfg(feature = "serde")]
fn json_conversion(c: &mut Criterion) {
    use php_serialize_core::json::to_json_string;

    let mut group = c.benchmark_group("json");

    let data = br#"a:3:{s:4:"name";s:5:"Alice";s:3:"age";i:30;s:4:"tags";a:2:{i:0;s:5:"admin";i:1;s:6:"active";}}"#;

    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("parse_and_convert", |b| {
        b.iter(|| {
            let value = from_bytes(black_box(data)).unwrap();
            to_json_string(&value).unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    simple_types,
    strings,
    arrays,
    nested_structures,
    real_world,
);

#[cfg(feature = "serde")]
criterion_group!(serde_benches, json_conversion);

#[cfg(feature = "serde")]
criterion_main!(benches, serde_benches);

#[cfg(not(feature = "serde"))]
criterion_main!(benches);
