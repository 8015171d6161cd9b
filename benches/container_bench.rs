#![allow(clippy::unwrap_used, clippy::uninlined_format_args)]

use bytes::BytesMut;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use level_vault::core::codec::ContainerCodec;
use level_vault::schema::{CellDto, ColorId, Level, LevelCollectionDto, LevelConfigDto};
use level_vault::LevelCrypto;
use tokio_util::codec::Decoder;

fn bench_seal_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("container");
    let crypto = LevelCrypto::new();
    let sizes = [64usize, 4096, 65536, 1024 * 1024];

    for &size in &sizes {
        let data = vec![0x5Au8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("encrypt_{}b", size), |b| {
            b.iter(|| {
                let sealed = crypto.encrypt(&data).unwrap();
                assert_eq!(sealed.len(), LevelCrypto::sealed_len(size));
            })
        });
        group.bench_function(format!("decrypt_{}b", size), |b| {
            let sealed = crypto.encrypt(&data).unwrap();
            b.iter(|| {
                let out = crypto.decrypt(&sealed).unwrap();
                assert_eq!(out.len(), size);
            })
        });
        group.bench_function(format!("codec_decode_{}b", size), |b| {
            let sealed = crypto.encrypt(&data).unwrap();
            b.iter_batched(
                || BytesMut::from(&sealed[..]),
                |mut buf| {
                    let container = ContainerCodec::default().decode(&mut buf).unwrap();
                    assert!(container.is_some());
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn collection(levels: i32, side: i32) -> LevelCollectionDto {
    let column: Vec<Option<CellDto>> = (0..side)
        .map(|row| {
            Some(CellDto {
                colors: vec![ColorId(row % 6); 3],
                ..CellDto::default()
            })
        })
        .collect();
    LevelCollectionDto {
        levels: (1..=levels)
            .map(|level| LevelConfigDto {
                level,
                rows: side,
                columns: side,
                total_slot: 7,
                grid: vec![column.clone(); side as usize],
                ..LevelConfigDto::default()
            })
            .collect(),
    }
}

fn bench_schema(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema");
    let json = collection(200, 9).to_json_vec().unwrap();
    group.throughput(Throughput::Bytes(json.len() as u64));

    group.bench_function("parse_200_levels", |b| {
        b.iter(|| LevelCollectionDto::from_json_slice(&json).unwrap())
    });
    group.bench_function("build_200_levels", |b| {
        let parsed = LevelCollectionDto::from_json_slice(&json).unwrap();
        b.iter(|| {
            for record in &parsed.levels {
                let level = Level::from_dto(record).unwrap();
                assert_eq!(level.grid.len(), 81);
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_seal_open, bench_schema);
criterion_main!(benches);
