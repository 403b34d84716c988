//! Benchmarks for dispatch table construction.
//!
//! Measures building performance for typical hierarchy shapes:
//! - Deep override chains (one slot growing per level)
//! - Wide classes with many independent slots
//! - Interface-heavy types with interface inheritance
//! - Parallel bulk building through the cache

extern crate dotvtable;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dotvtable::prelude::*;
use std::hint::black_box;

/// A chain of `depth` classes, each overriding `Run` and adding one own method.
fn deep_chain(registry: &TypeRegistry, depth: usize) -> Token {
    let mut base: Option<Token> = None;
    for level in 0..depth {
        let mut run = MethodBuilder::new("Run").virtual_();
        let mut builder = TypeBuilder::class(&format!("Level{level}"));
        match base {
            Some(parent) => builder = builder.extends(parent),
            None => run = run.new_slot(),
        }

        let ty = builder
            .method(run)
            .method(MethodBuilder::new(&format!("Own{level}")).virtual_().new_slot())
            .build(registry)
            .unwrap();
        base = Some(ty.token);
    }
    base.unwrap()
}

/// A single class with `width` methods, half of them explicitly overriding a base method.
fn wide_class(registry: &TypeRegistry, width: usize) -> Token {
    let mut root = TypeBuilder::class("Root");
    for index in 0..width {
        root = root.method(MethodBuilder::new(&format!("M{index}")).virtual_().new_slot());
    }
    let root = root.build(registry).unwrap();

    let mut leaf = TypeBuilder::class("Leaf").extends(root.token);
    for (index, method) in root.methods.iter().enumerate() {
        let builder = MethodBuilder::new(&format!("Impl{index}")).virtual_().new_slot();
        leaf = leaf.method(if index % 2 == 0 {
            builder.overrides(*method)
        } else {
            builder
        });
    }
    leaf.build(registry).unwrap().token
}

/// A class implementing `count` interfaces, each extending the previous one.
fn interface_ladder(registry: &TypeRegistry, count: usize) -> Token {
    let mut class = TypeBuilder::class("Ladder");
    let mut parent: Option<Token> = None;
    for index in 0..count {
        let name = format!("Step{index}");
        let mut iface = TypeBuilder::interface(&format!("IStep{index}"))
            .method(MethodBuilder::new(&name));
        if let Some(parent) = parent {
            iface = iface.implements(parent);
        }
        let iface = iface.build(registry).unwrap();
        parent = Some(iface.token);
        class = class.method(MethodBuilder::new(&name).virtual_().new_slot().final_());
    }
    class.implements(parent.unwrap()).build(registry).unwrap().token
}

fn bench_deep_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("vtable_deep_chain");
    for depth in [4, 16, 64] {
        let registry = TypeRegistry::new();
        let leaf = deep_chain(&registry, depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &leaf, |b, leaf| {
            b.iter(|| black_box(VTableResolver::build(&registry, black_box(*leaf)).unwrap()));
        });
    }
    group.finish();
}

fn bench_wide_class(c: &mut Criterion) {
    let registry = TypeRegistry::new();
    let leaf = wide_class(&registry, 256);

    c.bench_function("vtable_wide_class_256", |b| {
        b.iter(|| black_box(VTableResolver::build(&registry, black_box(leaf)).unwrap()));
    });
}

fn bench_interface_ladder(c: &mut Criterion) {
    let registry = TypeRegistry::new();
    let class = interface_ladder(&registry, 32);

    c.bench_function("vtable_interface_ladder_32", |b| {
        b.iter(|| black_box(VTableResolver::build(&registry, black_box(class)).unwrap()));
    });
}

fn bench_cache_build_all(c: &mut Criterion) {
    let registry = TypeRegistry::new();
    for _ in 0..16 {
        deep_chain(&registry, 16);
    }
    let classes = registry.class_tokens();

    c.bench_function("vtable_cache_build_all_256", |b| {
        b.iter(|| {
            let cache = VTableCache::new();
            let failures = cache.build_all(&registry, black_box(&classes));
            black_box((cache.len(), failures))
        });
    });
}

criterion_group!(
    benches,
    bench_deep_chain,
    bench_wide_class,
    bench_interface_ladder,
    bench_cache_build_all
);
criterion_main!(benches);
