// SPDX-License-Identifier: Apache-2.0

//! Benchmarks for parsing large synthetic netlists.
//!
//! `parse_from_path` covers file reading plus parsing of long `INV` chains;
//! `parse_constant_fanout` parses in memory and stresses literal
//! interpretation and constant-net sharing.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::io::Write as IoWrite;
use tempfile::NamedTempFile;
use xlsynth_netlist::cell_library::fake_cell_library;
use xlsynth_netlist::netlist;
use xlsynth_netlist::netlist::parse::ParseOptions;

fn netlist_parse_benchmark(c: &mut Criterion) {
    let library = fake_cell_library();
    let sizes: &[usize] = &[5_000, 20_000];

    let mut group = c.benchmark_group("netlist_parse_chain_inv");

    // Keep temporary files alive until the group finishes.
    let mut temp_files: Vec<NamedTempFile> = Vec::new();

    for &instance_count in sizes {
        let netlist_text = netlist::bench_synth_netlist::make_chain_netlist(instance_count);
        let mut tmp = NamedTempFile::new().expect("create synthetic netlist temp file");
        IoWrite::write_all(&mut tmp, netlist_text.as_bytes())
            .expect("write synthetic netlist text");
        let path_buf = tmp.path().to_path_buf();
        temp_files.push(tmp);

        group.bench_with_input(
            BenchmarkId::from_parameter(instance_count),
            &path_buf,
            |b, path| {
                b.iter(|| {
                    let parsed = netlist::io::parse_netlist_from_path(
                        black_box(path),
                        &library,
                        ParseOptions::default(),
                    )
                    .expect("synthetic netlist should parse successfully");
                    black_box(parsed);
                });
            },
        );
    }

    group.finish();
    drop(temp_files);
}

fn constant_fanout_benchmark(c: &mut Criterion) {
    let library = fake_cell_library();
    let mut group = c.benchmark_group("netlist_parse_constant_fanout");
    for &instance_count in &[5_000usize] {
        let text = netlist::bench_synth_netlist::make_constant_fanout_netlist(instance_count);
        group.bench_with_input(
            BenchmarkId::from_parameter(instance_count),
            &text,
            |b, text| {
                b.iter(|| {
                    let parsed = netlist::parse::parse_netlist_str(&library, black_box(text))
                        .expect("synthetic netlist should parse successfully");
                    black_box(parsed);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, netlist_parse_benchmark, constant_fanout_benchmark);
criterion_main!(benches);
