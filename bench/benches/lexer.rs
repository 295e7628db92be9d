use bench::INPUT;
use criterion::{criterion_group, criterion_main, Criterion};
use dywoq::{
    lexer::{lex_into, SUGGESTED_TOKENS_CAPACITY},
    token::{Token, TokenKind},
};
use std::hint::black_box;

fn lexer(input: &str, tokens: &mut Vec<Token>) {
    lex_into(input, tokens).unwrap();
    let comments = tokens
        .iter()
        .filter(|token| token.kind == TokenKind::Comment)
        .count();
    black_box(comments);
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);

    c.bench_function("lexer", |b| {
        b.iter(|| {
            tokens.clear();
            lexer(black_box(INPUT), &mut tokens);
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
