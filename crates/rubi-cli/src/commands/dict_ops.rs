use std::fs;
use std::path::Path;

use serde::Serialize;

use rubi_core::analyzer::{compose_reading, Analyzer, DictionaryAnalyzer, Token};
use rubi_core::dict::{parse_tsv, Dictionary, ReadingDictionary};
use rubi_core::unicode::katakana_to_hiragana;

use super::pad;

pub fn compile(tsv_file: &str, output_file: &str) {
    let text = die!(fs::read_to_string(tsv_file), "Error reading {tsv_file}: {}");
    let dict = die!(parse_tsv(&text), "Error parsing {tsv_file}: {}");
    let (surfaces, entries) = dict.stats();
    eprintln!("Parsed {surfaces} surfaces ({entries} entries)");

    die!(
        dict.save(Path::new(output_file)),
        "Error writing dictionary: {}"
    );
    let file_size = fs::metadata(output_file).map(|m| m.len()).unwrap_or(0);
    eprintln!("Wrote {output_file} ({:.1} KB)", file_size as f64 / 1024.0);
}

pub fn info(dict_file: &str) {
    let dict = open(dict_file);
    let path = ReadingDictionary::resolve_path(Path::new(dict_file));
    let file_size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    let (surfaces, entries) = dict.stats();

    println!("Dictionary: {}", path.display());
    println!("File size:  {:.1} KB", file_size as f64 / 1024.0);
    println!("Surfaces:   {surfaces}");
    println!("Entries:    {entries}");
    let longest = dict.iter().map(|(s, _)| s.chars().count()).max().unwrap_or(0);
    println!("Longest:    {longest} chars");

    println!();
    println!("First entries:");
    for (surface, readings) in dict.iter().take(5) {
        let list: Vec<&str> = readings.iter().map(|e| e.reading.as_str()).collect();
        println!("  {surface} → {}", list.join(", "));
    }
}

pub fn lookup(dict_file: &str, surface: &str) {
    let dict = open(dict_file);
    match dict.lookup(surface) {
        Some(entries) => {
            for e in entries {
                println!("{surface}\t{}\t{}", e.reading, e.cost);
            }
        }
        None => {
            println!("{surface} → (not found)");
            let prefixes = dict.common_prefix_search(surface);
            if !prefixes.is_empty() {
                let list: Vec<&str> = prefixes.iter().map(|r| r.surface).collect();
                println!("Prefixes: {}", list.join(", "));
            }
        }
    }
}

#[derive(Serialize)]
struct AnalyzeReport<'a> {
    input: &'a str,
    tokens: &'a [Token],
    reading: String,
}

pub fn analyze(dict_file: &str, text: &str, json: bool) {
    let analyzer = DictionaryAnalyzer::new(open(dict_file));
    let tokens = die!(analyzer.tokenize(text), "Error: {}");
    let reading = katakana_to_hiragana(&compose_reading(&tokens));

    if json {
        let report = AnalyzeReport {
            input: text,
            tokens: &tokens,
            reading,
        };
        println!(
            "{}",
            die!(serde_json::to_string_pretty(&report), "Error: {}")
        );
        return;
    }

    let width = tokens
        .iter()
        .map(|t| unicode_width::UnicodeWidthStr::width(t.surface.as_str()))
        .max()
        .unwrap_or(0);
    for t in &tokens {
        println!(
            "{}  {}",
            pad(&t.surface, width),
            t.reading.as_deref().unwrap_or("(unknown)")
        );
    }
    println!("=> {reading}");
}

fn open(dict_file: &str) -> ReadingDictionary {
    die!(
        ReadingDictionary::open(Path::new(dict_file)),
        "Error opening dictionary: {}"
    )
}
