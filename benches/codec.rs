use std::collections::BTreeMap;
use std::hint::black_box;

use boxdata::{decode_with, encode_with, DecodeOptions, EncodeOptions, Tag};
use criterion::{criterion_group, criterion_main, Criterion};

fn record_list(count: i32) -> Tag {
    let elems = (0..count)
        .map(|i| {
            let mut pos = BTreeMap::new();
            pos.insert("x".to_string(), Tag::Double(i as f64));
            pos.insert("y".to_string(), Tag::Double(-(i as f64)));
            let mut map = BTreeMap::new();
            map.insert("id".to_string(), Tag::Int(i));
            map.insert("name".to_string(), Tag::String(format!("item{}", i)));
            map.insert("pos".to_string(), Tag::Compound(pos));
            Tag::Compound(map)
        })
        .collect();
    Tag::List(elems)
}

fn cached() -> EncodeOptions {
    EncodeOptions::default()
}

fn plain() -> EncodeOptions {
    EncodeOptions {
        structure_cache: false,
        ..Default::default()
    }
}

fn bench_encode(c: &mut Criterion) {
    let list = record_list(1000);
    c.bench_function("encode 1000 records cached", |b| {
        b.iter(|| black_box(encode_with(black_box(&list), &cached()).unwrap()))
    });
    c.bench_function("encode 1000 records plain", |b| {
        b.iter(|| black_box(encode_with(black_box(&list), &plain()).unwrap()))
    });
}

fn bench_decode(c: &mut Criterion) {
    let list = record_list(1000);
    let enc_cached = encode_with(&list, &cached()).unwrap();
    let enc_plain = encode_with(&list, &plain()).unwrap();
    let plain_decode = DecodeOptions {
        structure_cache: false,
        ..Default::default()
    };
    c.bench_function("decode 1000 records cached", |b| {
        b.iter(|| black_box(boxdata::decode(black_box(&enc_cached)).unwrap()))
    });
    c.bench_function("decode 1000 records plain", |b| {
        b.iter(|| black_box(decode_with(black_box(&enc_plain), &plain_decode).unwrap()))
    });
}

fn bench_compressed(c: &mut Criterion) {
    let list = record_list(1000);
    let opts = EncodeOptions {
        compress: Some(3),
        ..Default::default()
    };
    let enc = encode_with(&list, &opts).unwrap();
    c.bench_function("encode 1000 records zstd-3", |b| {
        b.iter(|| black_box(encode_with(black_box(&list), &opts).unwrap()))
    });
    c.bench_function("decode 1000 records zstd-3", |b| {
        b.iter(|| black_box(boxdata::decode(black_box(&enc)).unwrap()))
    });
}

fn bench_serde(c: &mut Criterion) {
    #[derive(serde::Serialize, serde::Deserialize)]
    struct Record {
        id: i32,
        name: String,
    }
    let records: Vec<Record> = (0..1000)
        .map(|i| Record {
            id: i,
            name: format!("item{}", i),
        })
        .collect();
    let enc = boxdata::to_vec(&records).unwrap();
    c.bench_function("to_vec 1000 structs", |b| {
        b.iter(|| black_box(boxdata::to_vec(black_box(&records)).unwrap()))
    });
    c.bench_function("from_slice 1000 structs", |b| {
        b.iter(|| black_box(boxdata::from_slice::<Vec<Record>>(black_box(&enc)).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_compressed,
    bench_serde
);
criterion_main!(benches);
