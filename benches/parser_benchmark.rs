//! Result table parsing throughput
//!
//! Club-only searches return the largest fragments (whole club rosters), so
//! the parser is measured on rosters of increasing size, with and without the
//! surname filter.

use chess_grading::infrastructure::{extract_html_fragment, PlayerTableParser};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn roster(rows: usize) -> String {
    (0..rows)
        .map(|i| {
            format!(
                r#"<tr>
                    <td class="screen_large" data-column="pnum">{pnum}</td>
                    <td class="left_align" data-column="name"><a href="/player/{pnum}">Player{i}, Test</a></td>
                    <td class="screen_large">ST</td>
                    <td data-column="status">{status}</td>
                    <td data-column="standard_published">{grade}</td>
                    <td data-column="standard_live">{grade}</td>
                    <td data-column="allegro_published">&mdash;</td>
                    <td data-column="allegro_live">-</td>
                    <td data-column="blitz_published"></td>
                    <td data-column="blitz_live">1490</td>
                </tr>"#,
                pnum = 10_000 + i,
                status = if i % 3 == 0 { "J12" } else { "A" },
                grade = 1200 + i % 700,
            )
        })
        .collect()
}

fn parse_roster(c: &mut Criterion) {
    let parser = PlayerTableParser::new().expect("default selectors compile");
    let mut group = c.benchmark_group("parse_players");

    for rows in [10, 100, 500] {
        let html = roster(rows);
        group.bench_with_input(BenchmarkId::new("unfiltered", rows), &html, |b, html| {
            b.iter(|| parser.parse_players(black_box(html), None))
        });
        group.bench_with_input(BenchmarkId::new("surname_filter", rows), &html, |b, html| {
            b.iter(|| parser.parse_players(black_box(html), Some("player1")))
        });
    }

    group.finish();
}

fn decode_envelope(c: &mut Criterion) {
    let body = serde_json::json!({ "success": true, "html": roster(100) }).to_string();
    c.bench_function("extract_html_fragment_100_rows", |b| {
        b.iter(|| extract_html_fragment(black_box(&body)))
    });
}

criterion_group!(benches, parse_roster, decode_envelope);
criterion_main!(benches);
