//! 라인 파서 벤치마크
//!
//! COMMON / PERFORMANCE 포맷과 마이크로 파서의 처리량을 측정합니다.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use clickpath_access_log::format::LogFormat;
use clickpath_access_log::micro::{cookie, user_agent};
use clickpath_access_log::parser::LineParser;

/// COMMON 포맷의 짧은 라인
const COMMON_LINE: &str =
    r#"172.20.2.41 - bob [18/Sep/2016:19:18:28 -0400] "GET /account HTTP/1.1" 200 1024"#;

/// PERFORMANCE 포맷의 라인 (스레드 이름 + 처리 시간)
const PERFORMANCE_LINE: &str = r#""http-0.0.0.0-8080-watched-12" 172.20.2.41 bob [18/Sep/2016:19:18:28 -0400] "PUT /legacy/save?id=42&retry=1 HTTP/1.1" 200 18204 125993"#;

/// 따옴표 없는 쿠키 목록
const COOKIE_LIST: &str =
    "JSESSIONID=C50356AE2ED09D66943F1A1QQ7; locale=en_US; theme=dark; last=checkout next";

/// 따옴표 없는 User-Agent 문자열
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36 200";

fn bench_common_format(c: &mut Criterion) {
    let parser = LineParser::new(LogFormat::common());

    let mut group = c.benchmark_group("common_format");
    group.throughput(Throughput::Elements(1));
    group.bench_function("single_line", |b| {
        b.iter(|| parser.parse(black_box(COMMON_LINE)).unwrap())
    });

    group.throughput(Throughput::Elements(1000));
    group.bench_function("throughput_1000", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                parser.parse(black_box(COMMON_LINE)).unwrap();
            }
        })
    });
    group.finish();
}

fn bench_performance_format(c: &mut Criterion) {
    let parser = LineParser::new(LogFormat::performance_analysis());

    let mut group = c.benchmark_group("performance_format");
    group.throughput(Throughput::Elements(1));
    group.bench_function("single_line", |b| {
        b.iter(|| parser.parse(black_box(PERFORMANCE_LINE)).unwrap())
    });
    group.finish();
}

fn bench_micro_parsers(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro_parsers");
    group.throughput(Throughput::Elements(1));

    group.bench_function("cookie_identify_end", |b| {
        b.iter(|| cookie::identify_end(black_box(COOKIE_LIST), 0).unwrap())
    });

    group.bench_function("user_agent_identify_end", |b| {
        b.iter(|| user_agent::identify_end(black_box(USER_AGENT), 0).unwrap())
    });

    group.finish();
}

fn bench_format_compilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_compilation");
    group.bench_function("common_spec", |b| {
        b.iter(|| LogFormat::from_spec(black_box(clickpath_access_log::COMMON_SPEC)).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_common_format,
    bench_performance_format,
    bench_micro_parsers,
    bench_format_compilation
);
criterion_main!(benches);
