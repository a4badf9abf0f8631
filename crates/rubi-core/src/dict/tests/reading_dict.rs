use crate::dict::{DictError, Dictionary, ReadingDictionary, ReadingEntry};

fn entry(reading: &str, cost: i16) -> ReadingEntry {
    ReadingEntry {
        reading: reading.to_string(),
        cost,
    }
}

fn sample_dict() -> ReadingDictionary {
    ReadingDictionary::from_entries(vec![
        ("日".to_string(), vec![entry("ニチ", 6000), entry("ヒ", 5500)]),
        ("日本".to_string(), vec![entry("ニホン", 3000), entry("ニッポン", 3500)]),
        ("日本語".to_string(), vec![entry("ニホンゴ", 2500)]),
        ("本".to_string(), vec![entry("ホン", 4000)]),
        ("語".to_string(), vec![entry("ゴ", 4500)]),
    ])
}

#[test]
fn test_lookup_sorted_by_cost() {
    let dict = sample_dict();
    let entries = dict.lookup("日").unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].reading, "ヒ");
    assert!(entries[0].cost <= entries[1].cost);
    assert!(dict.lookup("猫").is_none());
    assert!(dict.lookup("").is_none());
}

#[test]
fn test_merge_duplicate_surfaces() {
    let dict = ReadingDictionary::from_entries(vec![
        ("猫".to_string(), vec![entry("ネコ", 3000)]),
        ("猫".to_string(), vec![entry("ネコ", 2000), entry("ビョウ", 8000)]),
        ("".to_string(), vec![entry("ナニ", 1)]),
    ]);
    let entries = dict.lookup("猫").unwrap();
    assert_eq!(entries, &[entry("ネコ", 2000), entry("ビョウ", 8000)]);
    assert_eq!(dict.stats(), (1, 2));
}

#[test]
fn test_common_prefix_search() {
    let dict = sample_dict();
    let results = dict.common_prefix_search("日本語です");
    let surfaces: Vec<&str> = results.iter().map(|r| r.surface).collect();
    assert_eq!(surfaces, vec!["日", "日本", "日本語"]);
    assert_eq!(results[2].entries[0].reading, "ニホンゴ");

    assert!(dict.common_prefix_search("").is_empty());
    assert!(dict.common_prefix_search("猫").is_empty());
}

#[test]
fn test_loaded_dictionary_prefix_search() {
    let bytes = sample_dict().to_bytes().unwrap();
    let loaded = ReadingDictionary::from_bytes(&bytes).unwrap();

    let results = loaded.common_prefix_search("日本語");
    let surfaces: Vec<&str> = results.iter().map(|r| r.surface).collect();
    assert_eq!(surfaces, vec!["日", "日本", "日本語"]);
    assert_eq!(results[1].entries[0].reading, "ニホン");

    let iterated: Vec<&str> = loaded.iter().map(|(s, _)| s).collect();
    let original_dict = sample_dict();
    let original: Vec<&str> = original_dict.iter().map(|(s, _)| s).collect();
    assert_eq!(iterated, original);
}

#[test]
fn test_prefix_search_shares_byte_prefixes() {
    // 日 and 旦 share their first two UTF-8 bytes
    let dict = ReadingDictionary::from_entries(vec![
        ("旦".to_string(), vec![entry("タン", 5000)]),
        ("旦那".to_string(), vec![entry("ダンナ", 3000)]),
        ("日".to_string(), vec![entry("ヒ", 5000)]),
    ]);
    let surfaces: Vec<&str> = dict
        .common_prefix_search("旦那さん")
        .iter()
        .map(|r| r.surface)
        .collect();
    assert_eq!(surfaces, vec!["旦", "旦那"]);
    assert!(dict.common_prefix_search("那").is_empty());
}

#[test]
fn test_empty_dictionary() {
    let dict = ReadingDictionary::from_entries(Vec::new());
    assert_eq!(dict.stats(), (0, 0));
    assert!(dict.common_prefix_search("日本").is_empty());
    let loaded = ReadingDictionary::from_bytes(&dict.to_bytes().unwrap()).unwrap();
    assert_eq!(loaded.stats(), (0, 0));
}

#[test]
fn test_debug_reports_counts() {
    let rendered = format!("{:?}", sample_dict());
    assert_eq!(rendered, "ReadingDictionary { surfaces: 5, entries: 7 }");
}

#[test]
fn test_iter_sorted_by_surface_bytes() {
    let dict = sample_dict();
    let surfaces: Vec<&str> = dict.iter().map(|(s, _)| s).collect();
    let mut sorted = surfaces.clone();
    sorted.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
    assert_eq!(surfaces, sorted);
    assert_eq!(surfaces.len(), 5);
}

#[test]
fn test_bytes_roundtrip() {
    let dict = sample_dict();
    let bytes = dict.to_bytes().unwrap();
    assert_eq!(&bytes[..4], b"RBDX");
    let loaded = ReadingDictionary::from_bytes(&bytes).unwrap();
    assert_eq!(loaded.stats(), dict.stats());
    assert_eq!(loaded.lookup("日本"), dict.lookup("日本"));
    // serialization is deterministic
    assert_eq!(loaded.to_bytes().unwrap(), bytes);
}

#[test]
fn test_invalid_magic() {
    let result = ReadingDictionary::from_bytes(b"XXXX\x01data");
    assert!(matches!(result, Err(DictError::InvalidMagic)));
}

#[test]
fn test_too_short() {
    let result = ReadingDictionary::from_bytes(b"RBD");
    assert!(matches!(result, Err(DictError::InvalidHeader)));
}

#[test]
fn test_unsupported_version() {
    let result = ReadingDictionary::from_bytes(b"RBDX\x99");
    assert!(matches!(result, Err(DictError::UnsupportedVersion(0x99))));
}

#[test]
fn test_truncated_body() {
    let bytes = sample_dict().to_bytes().unwrap();
    let result = ReadingDictionary::from_bytes(&bytes[..bytes.len() - 1]);
    assert!(matches!(result, Err(DictError::InvalidHeader)));
}

#[test]
fn test_corrupt_body_fails_checksum() {
    let mut bytes = sample_dict().to_bytes().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    let result = ReadingDictionary::from_bytes(&bytes);
    assert!(matches!(result, Err(DictError::ChecksumMismatch { .. })));
}

#[test]
fn test_save_and_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.dict");
    sample_dict().save(&path).unwrap();

    let loaded = ReadingDictionary::open(&path).unwrap();
    assert_eq!(loaded.lookup("本").unwrap()[0].reading, "ホン");
}

#[test]
fn test_open_directory_uses_default_file_name() {
    let dir = tempfile::tempdir().unwrap();
    sample_dict().save(&dir.path().join("reading.dict")).unwrap();

    let loaded = ReadingDictionary::open(dir.path()).unwrap();
    assert_eq!(loaded.stats(), sample_dict().stats());
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = ReadingDictionary::open(&dir.path().join("missing.dict"));
    assert!(matches!(result, Err(DictError::Io(_))));
}
