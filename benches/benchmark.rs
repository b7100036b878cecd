use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sinew::parser::prelude::*;
use sinew::stream::IterStream;
use sinew::ParseConfig;

fn number_list() -> impl Parser<char, Vec<i64>> {
    dec_num()
        .separated(equal(',').between(skip_whitespaces(), skip_whitespaces()))
        .between(equal('['), equal(']'))
}

fn arithmetic() -> Recursive<'static, char, i64> {
    expression_with(
        |expr| dec_num().or(expr.between(equal('('), equal(')'))),
        vec![
            vec![Operator::prefix(equal('-'), |x: i64| -x)],
            vec![Operator::infix_l(equal('*'), |a: i64, b: i64| a.wrapping_mul(b))],
            vec![
                Operator::infix_l(equal('+'), |a: i64, b: i64| a.wrapping_add(b)),
                Operator::infix_l(equal('-'), |a: i64, b: i64| a.wrapping_sub(b)),
            ],
        ],
    )
}

fn list_input(len: usize) -> String {
    let items: Vec<String> = (0..len).map(|i| i.to_string()).collect();
    format!("[{}]", items.join(", "))
}

fn expression_input(len: usize) -> String {
    (0..len)
        .map(|i| match i % 3 {
            0 => format!("({}+{})", i, i + 1),
            1 => format!("-{}", i),
            _ => i.to_string(),
        })
        .collect::<Vec<_>>()
        .join("*2+")
}

fn bench_number_list(c: &mut Criterion) {
    let parser = number_list();
    let input = list_input(1000);
    let mut group = c.benchmark_group("number_list");
    for chunk_size in [16, 256, 4096] {
        let config = ParseConfig::default().with_chunk_size(chunk_size);
        group.bench_with_input(BenchmarkId::new("slice", chunk_size), &config, |b, config| {
            b.iter(|| parser.parse_with(black_box(input.as_str()), config))
        });
        group.bench_with_input(BenchmarkId::new("iter", chunk_size), &config, |b, config| {
            b.iter(|| parser.parse_stream_with(IterStream::new(black_box(input.as_str()).chars()), config))
        });
    }
    group.finish();
}

fn bench_expression(c: &mut Criterion) {
    let parser = arithmetic();
    let input = expression_input(500);
    c.bench_function("expression", |b| {
        b.iter(|| parser.parse(black_box(input.as_str())))
    });
}

fn bench_backtracking(c: &mut Criterion) {
    let keyword = one_of(vec![
        attempt(string("interface")).boxed(),
        attempt(string("internal")).boxed(),
        attempt(string("integer")).boxed(),
        string("in").boxed(),
    ]);
    let parser = keyword.separated(equal(' '));
    let input = ["interface", "internal", "integer", "in"].repeat(250).join(" ");
    c.bench_function("backtracking", |b| {
        b.iter(|| parser.parse(black_box(input.as_str())))
    });
}

criterion_group!(benches, bench_number_list, bench_expression, bench_backtracking);
criterion_main!(benches);
