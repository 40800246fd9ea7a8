//! Performance benchmarks for the per-event hot path
//!
//! Stream parsing, activity row markup, and main-region extraction.
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use livedash::events::{decode_event, Decoded};
use livedash::live::ActivityRow;
use livedash::page::extract_region;
use livedash::sse::SseParser;

const EVENT: &str = r#"{"timestamp":"2024-03-05T14:07:09.123456+00:00","story_id":"a1b2c3","agent_name":"writer","action":"draft_complete","detail":"Chapter 3 <revised> & expanded"}"#;

/// Generate a stream body with `events` frames and periodic heartbeats
fn generate_stream(events: usize) -> String {
    let mut body = String::from("retry: 3000\n\n");
    for i in 0..events {
        if i % 10 == 0 {
            body.push_str(": heartbeat\n\n");
        }
        body.push_str("data: ");
        body.push_str(EVENT);
        body.push_str("\n\n");
    }
    body
}

/// Generate a dashboard page with `rows` activity rows
fn generate_page(rows: usize) -> String {
    let body: String = (0..rows)
        .map(|i| format!("<tr><td>2024-01-01 00:00:{:02}</td><td>agent-{}</td></tr>", i % 60, i))
        .collect();
    format!(
        r#"<html><head><title>Activity</title></head><body><nav>chrome</nav><main><table id="activity-table"><tbody>{}</tbody></table></main></body></html>"#,
        body
    )
}

/// Benchmark line parsing and frame assembly
fn bench_sse_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("sse_parse");

    for size in [1, 10, 100, 1000].iter() {
        let body = generate_stream(*size);
        group.throughput(Throughput::Bytes(body.len() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_events", size)),
            &body,
            |b, body| {
                b.iter(|| {
                    let mut parser = SseParser::new();
                    let mut frames = 0;
                    for line in black_box(body).lines() {
                        if parser.feed_line(line).is_some() {
                            frames += 1;
                        }
                    }
                    black_box(frames)
                });
            },
        );
    }

    group.finish();
}

/// Benchmark decoding an event and rendering its row
fn bench_row_render(c: &mut Criterion) {
    c.bench_function("decode_and_render_row", |b| {
        b.iter(|| match decode_event(black_box(EVENT)) {
            Decoded::Event(event) => black_box(ActivityRow::from_event(&event).to_html()),
            Decoded::Invalid(reason) => reason,
        });
    });
}

/// Benchmark pulling the main region out of a fetched page
fn bench_extract_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_region");

    for rows in [10, 200].iter() {
        let page = generate_page(*rows);
        group.throughput(Throughput::Bytes(page.len() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_rows", rows)),
            &page,
            |b, page| {
                b.iter(|| black_box(extract_region(black_box(page), "main")));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_sse_parse, bench_row_render, bench_extract_region);

criterion_main!(benches);
