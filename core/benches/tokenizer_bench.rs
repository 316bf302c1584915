use criterion::{criterion_group, criterion_main, Criterion};
use zipsearch_core::extract::extract;
use zipsearch_core::tokenizer::tokenize;

const PAGE: &str = r#"<html><head><title>Rock'n'roll history</title><style>p { margin: 0 }</style></head>
<body><p>The band's first record sold poorly, but the second one reached the charts in spring.
Critics wrote about the sound, the lyrics and the long tour that followed.</p>
<a href="tour.html">tour dates</a> <a href="../albums/index.html">albums</a>
<script>window.analytics = {};</script></body></html>"#;

fn bench_tokenize(c: &mut Criterion) {
    let text = PAGE.repeat(200);
    c.bench_function("tokenize_page_text", |b| b.iter(|| tokenize(&text)));
    c.bench_function("extract_page", |b| b.iter(|| extract(PAGE.as_bytes())));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
