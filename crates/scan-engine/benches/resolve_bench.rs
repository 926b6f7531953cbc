//! 경로 해석기 벤치마크 — 깊은 링크 체인과 긴 경로

use std::collections::BTreeMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use stocktake_scan::{PathResolver, SymlinkTable};

fn chain_table(depth: usize) -> SymlinkTable {
    let mut map = BTreeMap::new();
    for i in 0..depth {
        map.insert(format!("/link{i}"), format!("/link{}", i + 1));
    }
    SymlinkTable::new(map).unwrap()
}

fn bench_no_links(c: &mut Criterion) {
    let resolver = PathResolver::new(SymlinkTable::empty());
    c.bench_function("resolve_plain_path", |b| {
        b.iter(|| black_box(resolver.resolve("/usr/share/doc/zlib/README").unwrap()));
    });
}

fn bench_deep_chain(c: &mut Criterion) {
    let resolver = PathResolver::new(chain_table(64));
    c.bench_function("resolve_chain_64", |b| {
        b.iter(|| black_box(resolver.resolve("/link0/payload.bin").unwrap()));
    });
}

fn bench_cyclic(c: &mut Criterion) {
    let mut map = BTreeMap::new();
    map.insert("/a".to_owned(), "/b".to_owned());
    map.insert("/b".to_owned(), "/a".to_owned());
    let resolver = PathResolver::new(SymlinkTable::new(map).unwrap());
    c.bench_function("resolve_cycle_detection", |b| {
        b.iter(|| black_box(resolver.resolve("/a/file").unwrap()));
    });
}

criterion_group!(benches, bench_no_links, bench_deep_chain, bench_cyclic);
criterion_main!(benches);
