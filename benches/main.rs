use codspeed_criterion_compat::*;
use tolerant_css_parser::parse;
use tolerant_css_parser::stringify;
use tolerant_css_parser::tokenize;

const SAMPLE: &str = include_str!("../fixtures/sample.css");

fn benchmark(c: &mut Criterion) {
    c.bench_function("tokenize", |b| b.iter(|| tokenize(black_box(SAMPLE))));
    c.bench_function("parse", |b| b.iter(|| parse(black_box(SAMPLE))));
    let root = parse(SAMPLE).unwrap();
    c.bench_function("stringify", |b| b.iter(|| stringify(black_box(&root))));
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
