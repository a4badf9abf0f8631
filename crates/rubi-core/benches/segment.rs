use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rubi_core::analyzer::{Analyzer, DictionaryAnalyzer};
use rubi_core::dict::{ReadingDictionary, ReadingEntry};
use rubi_core::segment::segment;
use rubi_core::unicode::katakana_to_hiragana;

const PARAGRAPH: &str = "吾輩は猫である。名前はまだ無い。どこで生れたかとんと見当がつかぬ。\
何でも薄暗いじめじめした所でニャーニャー泣いていた事だけは記憶している。";

fn bench_analyzer() -> DictionaryAnalyzer {
    let e = |reading: &str, cost: i16| ReadingEntry {
        reading: reading.into(),
        cost,
    };
    let dict = ReadingDictionary::from_entries(vec![
        ("吾輩".into(), vec![e("ワガハイ", 3000)]),
        ("猫".into(), vec![e("ネコ", 3000)]),
        ("名前".into(), vec![e("ナマエ", 3000)]),
        ("無".into(), vec![e("ナ", 4000), e("ム", 6000)]),
        ("生".into(), vec![e("ウマ", 4000), e("セイ", 5000)]),
        ("見当".into(), vec![e("ケントウ", 3500)]),
        ("何".into(), vec![e("ナン", 3000)]),
        ("薄暗".into(), vec![e("ウスグラ", 4000)]),
        ("所".into(), vec![e("トコロ", 3000)]),
        ("泣".into(), vec![e("ナ", 4000)]),
        ("事".into(), vec![e("コト", 3000)]),
        ("記憶".into(), vec![e("キオク", 3000)]),
    ]);
    DictionaryAnalyzer::with_costs(dict, 10000, 500)
}

fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");
    for repeat in [1usize, 10, 100] {
        let text = PARAGRAPH.repeat(repeat);
        group.bench_with_input(BenchmarkId::from_parameter(repeat), &text, |b, text| {
            b.iter(|| segment(text))
        });
    }
    group.finish();
}

fn bench_tokenize(c: &mut Criterion) {
    let analyzer = bench_analyzer();
    let surfaces = ["吾輩", "名前", "見当", "薄暗", "記憶", "何所事"];
    c.bench_function("tokenize_surfaces", |b| {
        b.iter(|| {
            for surface in surfaces {
                let _ = analyzer.tokenize(surface);
            }
        })
    });
}

fn bench_normalize(c: &mut Criterion) {
    let reading = "ワガハイハネコデアル".repeat(20);
    c.bench_function("katakana_to_hiragana", |b| {
        b.iter(|| katakana_to_hiragana(&reading))
    });
}

criterion_group!(benches, bench_segment, bench_tokenize, bench_normalize);
criterion_main!(benches);
