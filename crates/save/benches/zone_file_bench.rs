//! Zone file encode/decode throughput at different zone counts.
//!
//! Run with: `cargo bench -p save --bench zone_file_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use save::zone_file::CURRENT_ZONE_FILE_VERSION;
use save::{decode_zone_file, encode_zone_file, SaveZoneList, ZoneFileFormat};
use zones::record::ZoneRecord;
use zones::{Rgb, TileRect};

fn build_synthetic_list(count: usize) -> SaveZoneList {
    let zones = (0..count)
        .map(|i| ZoneRecord {
            id: 1_000 + i as i64,
            rect: TileRect::new((i % 100) as i32 * 8, (i / 100) as i32 * 8, 6, 6),
            owner: format!("player{}", i % 8),
            priority: (i % 5) as i32,
            title: format!("Zone {i}"),
            subtitle: String::new(),
            title_color: Rgb::WHITE,
            title_stroke: Rgb::BLACK,
            icon: None,
        })
        .collect();
    SaveZoneList {
        version: CURRENT_ZONE_FILE_VERSION,
        zones,
    }
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("zone_file_encode");
    for &count in &[100usize, 1_000, 10_000] {
        let list = build_synthetic_list(count);
        for format in [ZoneFileFormat::Binary, ZoneFileFormat::Json] {
            group.bench_with_input(
                BenchmarkId::new(format!("{format:?}"), format!("{count}_zones")),
                &list,
                |b, list| {
                    b.iter(|| black_box(encode_zone_file(list, format).unwrap().len()));
                },
            );
        }
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("zone_file_decode");
    for &count in &[100usize, 1_000, 10_000] {
        let list = build_synthetic_list(count);
        for format in [ZoneFileFormat::Binary, ZoneFileFormat::Json] {
            let bytes = encode_zone_file(&list, format).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("{format:?}"), format!("{count}_zones")),
                &bytes,
                |b, bytes| {
                    b.iter(|| black_box(decode_zone_file(bytes, format).unwrap().zones.len()));
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
