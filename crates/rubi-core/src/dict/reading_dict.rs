use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use lexime_trie::{DoubleArray, TrieSearch};
use memmap2::Mmap;
use tracing::{debug, debug_span};

use super::{DictError, Dictionary, ReadingEntry, SearchResult};
use crate::settings::settings;

const MAGIC: &[u8; 4] = b"RBDX";
const VERSION: u8 = 1;
// magic + version + crc32 + trie_len + values_len = 17
const HEADER_SIZE: usize = 4 + 1 + 4 + 4 + 4;

/// Surface → readings map backed by a byte-wise double-array trie.
///
/// Trie value ids index `surfaces` and `values`, which are kept in surface
/// byte order.
pub struct ReadingDictionary {
    trie: DoubleArray<u8>,
    surfaces: Vec<String>,
    values: Vec<Vec<ReadingEntry>>,
}

impl fmt::Debug for ReadingDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (surfaces, entries) = self.stats();
        f.debug_struct("ReadingDictionary")
            .field("surfaces", &surfaces)
            .field("entries", &entries)
            .finish()
    }
}

impl ReadingDictionary {
    /// Build from `(surface, readings)` pairs.
    ///
    /// Repeated surfaces are merged. Within a surface, readings are sorted by
    /// cost and duplicate readings keep their cheapest cost.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<ReadingEntry>)>) -> Self {
        // String ordering is byte ordering, which the trie build requires.
        let mut merged: BTreeMap<String, Vec<ReadingEntry>> = BTreeMap::new();
        for (surface, readings) in entries {
            if surface.is_empty() {
                continue;
            }
            merged.entry(surface).or_default().extend(readings);
        }
        merged.retain(|_, readings| {
            readings.sort_by_key(|e| e.cost);
            let mut seen = HashSet::new();
            readings.retain(|e| seen.insert(e.reading.clone()));
            !readings.is_empty()
        });

        let keys: Vec<&[u8]> = merged.keys().map(|s| s.as_bytes()).collect();
        let trie = DoubleArray::<u8>::build(&keys);
        let (surfaces, values) = merged.into_iter().unzip();
        Self {
            trie,
            surfaces,
            values,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        let trie_data = self.trie.as_bytes();
        let values_data = bincode::serialize(&self.values).map_err(DictError::Serialize)?;

        let trie_len = section_len(&trie_data, "trie")?;
        let values_len = section_len(&values_data, "values")?;
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&trie_data);
        hasher.update(&values_data);
        let checksum = hasher.finalize();

        let mut buf = Vec::with_capacity(HEADER_SIZE + trie_data.len() + values_data.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf.extend_from_slice(&trie_len.to_le_bytes());
        buf.extend_from_slice(&values_len.to_le_bytes());
        buf.extend_from_slice(&trie_data);
        buf.extend_from_slice(&values_data);
        Ok(buf)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        if data.len() < 5 {
            return Err(DictError::InvalidHeader);
        }
        if &data[..4] != MAGIC {
            return Err(DictError::InvalidMagic);
        }
        if data[4] != VERSION {
            return Err(DictError::UnsupportedVersion(data[4]));
        }
        if data.len() < HEADER_SIZE {
            return Err(DictError::InvalidHeader);
        }

        let expected = read_u32(&data[5..9]);
        let trie_len = read_u32(&data[9..13]) as usize;
        let values_len = read_u32(&data[13..17]) as usize;
        let body = data
            .get(HEADER_SIZE..HEADER_SIZE + trie_len + values_len)
            .ok_or(DictError::InvalidHeader)?;

        let found = crc32fast::hash(body);
        if found != expected {
            return Err(DictError::ChecksumMismatch { expected, found });
        }

        let (trie_data, values_data) = body.split_at(trie_len);
        let trie = DoubleArray::<u8>::from_bytes(trie_data)?;
        let values: Vec<Vec<ReadingEntry>> =
            bincode::deserialize(values_data).map_err(DictError::Deserialize)?;

        // Surfaces are not stored; recover them from the trie keys.
        let mut surfaces = vec![String::new(); values.len()];
        let mut recovered = 0;
        for m in trie.predictive_search(b"") {
            let slot = surfaces
                .get_mut(m.value_id as usize)
                .ok_or_else(|| corrupt(format!("trie value id {} out of range", m.value_id)))?;
            *slot = String::from_utf8(m.key).map_err(|e| corrupt(e.to_string()))?;
            recovered += 1;
        }
        if recovered != values.len() {
            return Err(corrupt(format!(
                "trie holds {recovered} keys for {} value lists",
                values.len()
            )));
        }

        Ok(Self {
            trie,
            surfaces,
            values,
        })
    }

    /// Resolve a dictionary location: directories point at the configured
    /// `[analyzer] dict_file` inside them.
    pub fn resolve_path(path: &Path) -> PathBuf {
        if path.is_dir() {
            path.join(&settings().analyzer.dict_file)
        } else {
            path.to_path_buf()
        }
    }

    /// Open a dictionary file (or directory, see [`Self::resolve_path`]).
    pub fn open(path: &Path) -> Result<Self, DictError> {
        let path = Self::resolve_path(path);
        let _span = debug_span!("dict_open", path = %path.display()).entered();
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // The Mmap is dropped after deserialization completes below.
        let mmap = unsafe { Mmap::map(&file)? };
        let dict = Self::from_bytes(&mmap)?;
        debug!(surfaces = dict.values.len());
        Ok(dict)
    }

    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        Ok(fs::write(path, self.to_bytes()?)?)
    }

    /// Iterate over all `(surface, readings)` pairs sorted by surface bytes.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ReadingEntry])> {
        self.surfaces
            .iter()
            .zip(&self.values)
            .map(|(s, e)| (s.as_str(), e.as_slice()))
    }

    /// Returns (surface_count, entry_count).
    pub fn stats(&self) -> (usize, usize) {
        let surfaces = self.values.len();
        let entries: usize = self.values.iter().map(|v| v.len()).sum();
        (surfaces, entries)
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn section_len(data: &[u8], name: &str) -> Result<u32, DictError> {
    data.len()
        .try_into()
        .map_err(|_| corrupt(format!("{name} data exceeds u32::MAX")))
}

fn corrupt(reason: String) -> DictError {
    DictError::Parse { line: 0, reason }
}

impl Dictionary for ReadingDictionary {
    fn lookup(&self, surface: &str) -> Option<&[ReadingEntry]> {
        self.trie
            .exact_match(surface.as_bytes())
            .map(|id| self.values[id as usize].as_slice())
    }

    fn common_prefix_search(&self, text: &str) -> Vec<SearchResult<'_>> {
        self.trie
            .common_prefix_search(text.as_bytes())
            .map(move |m| {
                let id = m.value_id as usize;
                SearchResult {
                    surface: self.surfaces[id].as_str(),
                    entries: self.values[id].as_slice(),
                }
            })
            .collect()
    }
}
