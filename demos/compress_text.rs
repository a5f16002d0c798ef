use std::env;
use std::fs;
use tracing_subscriber::EnvFilter;
use tree_repair::{
    PlainTextRenderer, TextCompressor, TreeBuilder, TreeCompressor, TreeRenderer,
    WhitespaceTreeBuilder,
};

/// Compresses each line of a text file as a whitespace "parse" and verifies
/// that decompression renders the same text.
///
/// Usage: cargo run --example compress_text <filename>
/// Set RUST_LOG=tree_repair=debug to watch rules being created.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <filename>", args[0]);
        std::process::exit(1);
    }

    let filename = &args[1];
    let text = fs::read_to_string(filename).unwrap_or_else(|_| {
        eprintln!("File \"{}\" not found.", filename);
        std::process::exit(1);
    });

    let pipeline = TextCompressor::new(WhitespaceTreeBuilder, TreeCompressor::default());

    let mut lines = 0usize;
    let mut input_bytes = 0usize;
    let mut output_bytes = 0usize;
    let mut rules = 0usize;

    for line in text.lines() {
        let compressed = pipeline.compress(line).expect("Compression failed");
        let restored = pipeline.decompress(&compressed).expect("Decompression failed");

        let expected = WhitespaceTreeBuilder
            .build_tree(line)
            .map(|tree| PlainTextRenderer.render(&tree))
            .unwrap_or_default();
        if restored != expected {
            eprintln!("Mismatch on line {}: {:?} != {:?}", lines + 1, restored, expected);
        }

        input_bytes += line.len();
        output_bytes += compressed.to_bytes().expect("Serialization failed").len();
        rules += compressed.rules().len();
        lines += 1;
    }

    println!("Lines: {}", lines);
    println!("Input bytes: {}", input_bytes);
    println!("Artifact bytes: {}", output_bytes);
    println!("Rules: {}", rules);

    // Whole file as one tree
    let (compressed, stats) = pipeline
        .compressor()
        .compress_with_stats(&WhitespaceTreeBuilder.build_tree(&text).unwrap_or_default())
        .expect("Compression failed");
    println!();
    println!("Whole file: {}", compressed);
    println!("  input tokens:  {}", stats.input_tokens);
    println!("  output tokens: {}", stats.output_tokens);
    println!("  rule symbols:  {}", stats.rule_symbols);
    println!("  ratio:         {:.2}%", stats.compression_ratio());
}
