use bench::INPUT;
use criterion::{criterion_group, criterion_main, Criterion};
use dywoq::{lexer::lex, parser::Parser};
use std::hint::black_box;

fn criterion_benchmark(c: &mut Criterion) {
    let tokens = lex(INPUT).unwrap();
    let mut parser = Parser::new();

    c.bench_function("parser", |b| {
        b.iter(|| {
            let nodes = parser.parse(black_box(&tokens)).unwrap();
            black_box(nodes);
        });
    });

    c.bench_function("lexer+parser", |b| {
        b.iter(|| black_box(dywoq::parse_source(black_box(INPUT)).unwrap()));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
