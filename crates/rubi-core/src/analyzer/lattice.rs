use tracing::{debug, debug_span};

use crate::dict::Dictionary;

/// A node in the analysis lattice.
#[derive(Debug, Clone)]
pub struct LatticeNode {
    /// Start position (char index, inclusive)
    pub start: usize,
    /// End position (char index, exclusive)
    pub end: usize,
    /// Slice of the input covered by this node
    pub surface: String,
    /// Dictionary reading; `None` for unknown-word fallback nodes
    pub reading: Option<String>,
    /// Word cost (lower = more preferred)
    pub cost: i16,
}

/// All dictionary segmentations of an input string.
pub struct Lattice {
    pub nodes: Vec<LatticeNode>,
    /// nodes_by_end[i] = indices of nodes that end at position i
    pub nodes_by_end: Vec<Vec<usize>>,
    /// nodes_by_start[i] = indices of nodes that start at position i
    pub nodes_by_start: Vec<Vec<usize>>,
    /// Number of characters in input
    pub char_count: usize,
}

/// Build a lattice over `text` using dictionary prefix matches.
///
/// Adds a 1-char unknown node (no reading, `unknown_cost`) at every position
/// without a 1-char dictionary match, so the lattice is always connected.
pub fn build_lattice(dict: &dyn Dictionary, text: &str, unknown_cost: i16) -> Lattice {
    let char_count = text.chars().count();
    let _span = debug_span!("build_lattice", char_count).entered();
    let byte_offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let mut nodes = Vec::new();
    let mut nodes_by_end: Vec<Vec<usize>> = vec![Vec::new(); char_count + 1];
    let mut nodes_by_start: Vec<Vec<usize>> = vec![Vec::new(); char_count];

    for start in 0..char_count {
        let mut has_single_char_match = false;
        let suffix = &text[byte_offsets[start]..];

        for result in dict.common_prefix_search(suffix) {
            let len = result.surface.chars().count();
            let end = start + len;
            for entry in result.entries {
                let idx = nodes.len();
                nodes.push(LatticeNode {
                    start,
                    end,
                    surface: result.surface.to_string(),
                    reading: Some(entry.reading.clone()),
                    cost: entry.cost,
                });
                nodes_by_end[end].push(idx);
                nodes_by_start[start].push(idx);
            }
            if len == 1 {
                has_single_char_match = true;
            }
        }

        if !has_single_char_match {
            let next_offset = byte_offsets.get(start + 1).copied().unwrap_or(text.len());
            let idx = nodes.len();
            nodes.push(LatticeNode {
                start,
                end: start + 1,
                surface: text[byte_offsets[start]..next_offset].to_string(),
                reading: None,
                cost: unknown_cost,
            });
            nodes_by_end[start + 1].push(idx);
            nodes_by_start[start].push(idx);
        }
    }

    debug!(node_count = nodes.len());
    Lattice {
        nodes,
        nodes_by_end,
        nodes_by_start,
        char_count,
    }
}

/// Minimum-cost path through the lattice.
///
/// Path cost is the sum of word costs plus `segment_penalty` per node, so
/// longer dictionary matches win over equally cheap fragments.
pub fn best_path(lattice: &Lattice, segment_penalty: i64) -> Vec<&LatticeNode> {
    let char_count = lattice.char_count;
    let _span = debug_span!("best_path", char_count).entered();
    if char_count == 0 {
        return Vec::new();
    }

    // best[node] = (accumulated cost, previous node)
    let mut best: Vec<Option<(i64, Option<usize>)>> = vec![None; lattice.nodes.len()];
    for &idx in &lattice.nodes_by_start[0] {
        best[idx] = Some((node_cost(&lattice.nodes[idx], segment_penalty), None));
    }

    for pos in 1..char_count {
        for &next_idx in &lattice.nodes_by_start[pos] {
            let word = node_cost(&lattice.nodes[next_idx], segment_penalty);
            let mut winner: Option<(i64, Option<usize>)> = None;
            for &prev_idx in &lattice.nodes_by_end[pos] {
                let Some((prev_cost, _)) = best[prev_idx] else {
                    continue;
                };
                let total = prev_cost + word;
                if winner.map_or(true, |(c, _)| total < c) {
                    winner = Some((total, Some(prev_idx)));
                }
            }
            best[next_idx] = winner;
        }
    }

    let Some(mut cursor) = lattice.nodes_by_end[char_count]
        .iter()
        .filter_map(|&idx| best[idx].map(|(cost, _)| (cost, idx)))
        .min_by_key(|&(cost, _)| cost)
        .map(|(_, idx)| idx)
    else {
        return Vec::new();
    };

    let mut path = vec![&lattice.nodes[cursor]];
    while let Some((_, Some(prev))) = best[cursor] {
        path.push(&lattice.nodes[prev]);
        cursor = prev;
    }
    path.reverse();
    debug!(segments = path.len());
    path
}

fn node_cost(node: &LatticeNode, segment_penalty: i64) -> i64 {
    i64::from(node.cost) + segment_penalty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::{ReadingDictionary, ReadingEntry};

    fn test_dict() -> ReadingDictionary {
        let e = |reading: &str, cost: i16| ReadingEntry {
            reading: reading.to_string(),
            cost,
        };
        ReadingDictionary::from_entries(vec![
            ("日本".to_string(), vec![e("ニホン", 3000)]),
            ("日".to_string(), vec![e("ヒ", 4000)]),
            ("本".to_string(), vec![e("ホン", 4000)]),
            ("語".to_string(), vec![e("ゴ", 4500)]),
        ])
    }

    #[test]
    fn test_build_lattice_basic() {
        let dict = test_dict();
        let lattice = build_lattice(&dict, "日本語", 10000);
        assert_eq!(lattice.char_count, 3);
        // 日, 日本, 本, 語
        assert_eq!(lattice.nodes.len(), 4);
        assert_eq!(lattice.nodes_by_start[0].len(), 2);
        assert_eq!(lattice.nodes_by_end[2].len(), 2);
    }

    #[test]
    fn test_build_lattice_unknown_fallback() {
        let dict = test_dict();
        let lattice = build_lattice(&dict, "猫日", 10000);
        let unknown: Vec<_> = lattice.nodes.iter().filter(|n| n.reading.is_none()).collect();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].surface, "猫");
        assert_eq!(unknown[0].cost, 10000);
    }

    #[test]
    fn test_best_path_prefers_long_match() {
        let dict = test_dict();
        let lattice = build_lattice(&dict, "日本語", 10000);
        let path = best_path(&lattice, 500);
        let surfaces: Vec<&str> = path.iter().map(|n| n.surface.as_str()).collect();
        assert_eq!(surfaces, vec!["日本", "語"]);
    }

    #[test]
    fn test_best_path_covers_input() {
        let dict = test_dict();
        let input = "本日は語";
        let lattice = build_lattice(&dict, input, 10000);
        let path = best_path(&lattice, 0);
        let joined: String = path.iter().map(|n| n.surface.as_str()).collect();
        assert_eq!(joined, input);
        for pair in path.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_best_path_empty() {
        let dict = test_dict();
        let lattice = build_lattice(&dict, "", 10000);
        assert!(best_path(&lattice, 500).is_empty());
    }
}
