use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tree_repair::{CompressorConfig, DependencyTreeNode, TreeCompressor};

/// A root with `branches` identical subtrees, like a list of similar clauses
fn generate_repetitive_tree(branches: usize) -> DependencyTreeNode {
    let mut root = DependencyTreeNode::new("<root>");
    for _ in 0..branches {
        let clause = DependencyTreeNode::new("jumps")
            .with_left(DependencyTreeNode::new("fox").with_left(DependencyTreeNode::new("the")))
            .with_right(
                DependencyTreeNode::new("dog")
                    .with_left(DependencyTreeNode::new("lazy"))
                    .with_left(DependencyTreeNode::new("the")),
            );
        root.add_right_child(clause);
    }
    root
}

/// Pseudo-random tree shapes over a small vocabulary
fn generate_mixed_tree(nodes: usize) -> DependencyTreeNode {
    let words = ["a", "of", "the", "in", "cat", "sat", "mat", "on", "and", "was"];
    let mut seed = 12345u64;
    let mut next = move || {
        // Simple LCG random
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        (seed >> 16) as usize
    };

    let mut root = DependencyTreeNode::new("<root>");
    let mut built = 1;
    while built < nodes {
        let mut head = DependencyTreeNode::new(words[next() % words.len()]);
        let dependents = 1 + next() % 4;
        for _ in 0..dependents {
            let child = DependencyTreeNode::new(words[next() % words.len()]);
            if next() % 2 == 0 {
                head.add_left_child(child);
            } else {
                head.add_right_child(child);
            }
        }
        built += dependents + 1;
        root.add_right_child(head);
    }
    root
}

/// All-distinct values, nothing but markers repeats
fn generate_unique_tree(nodes: usize) -> DependencyTreeNode {
    let mut root = DependencyTreeNode::new("<root>");
    for i in 1..nodes {
        root.add_right_child(DependencyTreeNode::new(format!("w{}", i)));
    }
    root
}

fn bench_compress(c: &mut Criterion) {
    let sizes = [100, 1_000, 5_000];
    let compressor = TreeCompressor::default();

    let cases: [(&str, fn(usize) -> DependencyTreeNode); 3] = [
        ("repetitive", generate_repetitive_tree),
        ("mixed", generate_mixed_tree),
        ("unique", generate_unique_tree),
    ];

    for (name, generate) in cases {
        let mut group = c.benchmark_group(format!("compress_{}", name));
        for size in sizes.iter() {
            let tree = generate(*size);
            group.bench_with_input(BenchmarkId::new("TreeCompressor", size), &tree, |b, tree| {
                b.iter(|| compressor.compress(black_box(tree)))
            });
        }
        group.finish();
    }
}

fn bench_decompress(c: &mut Criterion) {
    let sizes = [100, 1_000, 5_000];
    let compressor = TreeCompressor::default();
    let mut group = c.benchmark_group("decompress_repetitive");

    for size in sizes.iter() {
        let Ok(compressed) = compressor.compress(&generate_repetitive_tree(*size)) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("TreeCompressor", size), &compressed, |b, compressed| {
            b.iter(|| compressor.decompress(black_box(compressed)))
        });
    }
    group.finish();
}

fn bench_pattern_lengths(c: &mut Criterion) {
    let tree = generate_mixed_tree(2_000);
    let mut group = c.benchmark_group("max_pattern_length");

    for max_len in [2, 4, 10, 20] {
        let Ok(compressor) = TreeCompressor::new(CompressorConfig::default().with_pattern_lengths(2, max_len)) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("TreeCompressor", max_len), &tree, |b, tree| {
            b.iter(|| compressor.compress(black_box(tree)))
        });
    }
    group.finish();
}

fn bench_bytes(c: &mut Criterion) {
    let compressor = TreeCompressor::default();
    let Ok(compressed) = compressor.compress(&generate_mixed_tree(5_000)) else {
        return;
    };
    let Ok(bytes) = compressed.to_bytes() else {
        return;
    };

    let mut group = c.benchmark_group("artifact_bytes");
    group.bench_function("to_bytes", |b| b.iter(|| black_box(&compressed).to_bytes()));
    group.bench_function("from_bytes", |b| {
        b.iter(|| tree_repair::CompressedTree::from_bytes(black_box(&bytes)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_compress,
    bench_decompress,
    bench_pattern_lengths,
    bench_bytes
);
criterion_main!(benches);
