//! Benchmarks for memorybook ingestion and output.
//!
//! Run with: `cargo bench`
//! Run specific group: `cargo bench --bench ingest -- repair`

use std::path::PathBuf;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};

use memorybook::config::ProcessorConfig;
use memorybook::discovery::ConversationFile;
use memorybook::encoding::{DecodeStrategy, TextEncoding, resolve_json};
use memorybook::ingest::ingest_documents;
use memorybook::output::{to_csv, to_json, to_jsonl};
use memorybook::repair::clean_text;
use memorybook::text::extract_emojis;

// =============================================================================
// Test Data Generators
// =============================================================================

/// UTF-8 text stored as Latin-1 characters, as the platform exports it.
fn garble(s: &str) -> String {
    s.bytes().map(char::from).collect()
}

fn generate_records(count: usize) -> Vec<Value> {
    let lines = [
        "good morning ☀️",
        "Привет! как дела? 😂😂",
        "see you later",
        "👨‍👩‍👧 family pic",
        "lol 🇫🇷",
    ];
    (0..count)
        .map(|i| {
            let sender = if i % 2 == 0 { "alice_user" } else { "Zoë" };
            let mut record = json!({
                "sender_name": garble(sender),
                // Newest first, as exported
                "timestamp_ms": 1_705_314_600_000_i64 - (i as i64 * 60_000),
                "content": garble(lines[i % lines.len()]),
            });
            if i % 10 == 0 {
                record["photos"] = json!([{"uri": format!("photos/{i}.jpg")}]);
                record["reactions"] = json!([{"reaction": garble("❤"), "actor": "alice_user"}]);
            }
            record
        })
        .collect()
}

fn generate_files(count: usize, per_file: usize) -> Vec<ConversationFile> {
    let records = generate_records(count);
    records
        .chunks(per_file.max(1))
        .enumerate()
        .map(|(i, chunk)| ConversationFile {
            path: PathBuf::from(format!("message_{}.json", i + 1)),
            document: json!({
                "participants": [{"name": "alice_user"}, {"name": garble("Zoë")}],
                "messages": chunk,
            }),
            strategy: DecodeStrategy::Direct(TextEncoding::Utf8),
            matched_by: None,
        })
        .collect()
}

fn config() -> ProcessorConfig {
    ProcessorConfig::for_target("Zoë", "alice_user")
}

// =============================================================================
// Text Benchmarks
// =============================================================================

fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair");
    let texts: Vec<String> = generate_records(1_000)
        .iter()
        .filter_map(|r| r["content"].as_str().map(str::to_owned))
        .collect();

    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("clean_text_1000", |b| {
        b.iter(|| {
            for text in &texts {
                black_box(clean_text(black_box(text)));
            }
        });
    });
    group.finish();
}

fn bench_emoji_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("emoji_extraction");
    let text = "Привет! 😂😂 👨‍👩‍👧 🇫🇷 good morning ☀️ ".repeat(50);

    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("mixed_text", |b| {
        b.iter(|| black_box(extract_emojis(black_box(&text))));
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let document = json!({"messages": generate_records(1_000)});
    let utf8 = serde_json::to_vec(&document).unwrap_or_default();
    let mut utf16 = vec![0xFF, 0xFE];
    for unit in String::from_utf8_lossy(&utf8).encode_utf16() {
        utf16.extend_from_slice(&unit.to_le_bytes());
    }

    for (name, bytes) in [("utf8", &utf8), ("utf16", &utf16)] {
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), bytes, |b, bytes| {
            b.iter(|| black_box(resolve_json(black_box(bytes)).unwrap()));
        });
    }
    group.finish();
}

// =============================================================================
// Pipeline Benchmarks
// =============================================================================

fn bench_ingest_documents(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_documents");
    let config = config();

    for size in [100_usize, 1_000, 10_000] {
        let files = generate_files(size, 1_000);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &files, |b, files| {
            b.iter(|| black_box(ingest_documents(black_box(files), &config)));
        });
    }
    group.finish();
}

fn bench_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("output");
    let messages = ingest_documents(&generate_files(1_000, 1_000), &config())
        .unwrap()
        .messages;

    group.throughput(Throughput::Elements(messages.len() as u64));
    group.bench_function("csv", |b| b.iter(|| black_box(to_csv(black_box(&messages)).unwrap())));
    group.bench_function("json", |b| b.iter(|| black_box(to_json(black_box(&messages)).unwrap())));
    group.bench_function("jsonl", |b| b.iter(|| black_box(to_jsonl(black_box(&messages)).unwrap())));
    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_repair,
    bench_emoji_extraction,
    bench_decode,
    bench_ingest_documents,
    bench_output,
);

criterion_main!(benches);
