//! Frequent n-gram discovery over symbol sequences.
//!
//! For each candidate length one rolling-hash pass buckets every window start
//! by hash. Buckets are then verified literally, so a hash collision can never
//! merge two different windows, and their occurrences are thinned greedily
//! left-to-right to a non-overlapping set. The frequency of a pattern is the
//! size of that set.
//!
//! The winner across all lengths is the pattern with the highest frequency.
//! Ties go to the longer pattern, then to the pattern whose first occurrence
//! starts earliest. `min_frequency` only decides whether the winner qualifies,
//! never which pattern wins, so raising it can only end compression sooner.

use crate::symbol::Symbol;
use ahash::AHashMap as HashMap;

/// Multiplier of the polynomial rolling hash (arithmetic is mod 2^64).
const HASH_BASE: u64 = 1_000_000_007;

/// A repeated window selected for replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pattern {
    /// The literal symbols of the window.
    pub symbols: Vec<Symbol>,
    /// Ascending, pairwise non-overlapping start indices.
    pub positions: Vec<usize>,
    /// Window length (equals `symbols.len()`).
    pub length: usize,
}

impl Pattern {
    pub(crate) fn frequency(&self) -> usize {
        self.positions.len()
    }
}

/// Finds the best pattern of length in `min_len..=max_len` occurring at least
/// `min_frequency` times without overlap.
pub(crate) fn find_best_pattern(
    sequence: &[Symbol],
    min_len: usize,
    max_len: usize,
    min_frequency: usize,
) -> Option<Pattern> {
    let min_len = min_len.max(1);
    let min_frequency = min_frequency.max(1);
    if sequence.len() < min_len || max_len < min_len {
        return None;
    }

    let base = hash_base(sequence);
    let longest = max_len.min(sequence.len());

    // Longer lengths first: a shorter pattern must be strictly more frequent
    let mut best: Option<Pattern> = None;
    for n in (min_len..=longest).rev() {
        let floor = best
            .as_ref()
            .map_or(min_frequency, |pattern| pattern.frequency() + 1);
        if let Some(pattern) = best_of_length(sequence, n, floor, base) {
            best = Some(pattern);
        }
    }
    best
}

/// The base must exceed every symbol code in the sequence.
fn hash_base(sequence: &[Symbol]) -> u64 {
    let max_code = sequence.iter().map(|s| s.code()).max().unwrap_or(0);
    HASH_BASE.max(max_code.saturating_add(1)) | 1
}

/// Buckets every window start of length `n` by rolling hash.
fn bucket_windows(sequence: &[Symbol], n: usize, base: u64) -> HashMap<u64, Vec<usize>> {
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::default();
    if n == 0 || sequence.len() < n {
        return buckets;
    }

    // base^(n-1), the weight of the outgoing symbol
    let top_weight = (1..n).fold(1u64, |acc, _| acc.wrapping_mul(base));

    let mut hash = sequence[..n]
        .iter()
        .fold(0u64, |acc, s| acc.wrapping_mul(base).wrapping_add(s.code()));
    buckets.entry(hash).or_default().push(0);

    for start in 1..=sequence.len() - n {
        let outgoing = sequence[start - 1].code();
        let incoming = sequence[start + n - 1].code();
        hash = hash
            .wrapping_sub(outgoing.wrapping_mul(top_weight))
            .wrapping_mul(base)
            .wrapping_add(incoming);
        buckets.entry(hash).or_default().push(start);
    }

    buckets
}

/// Keeps the occurrences that do not overlap an earlier kept one.
fn non_overlapping(positions: &[usize], n: usize) -> Vec<usize> {
    let mut kept = Vec::with_capacity(positions.len());
    let mut next_free = 0;
    for &pos in positions {
        if pos >= next_free {
            kept.push(pos);
            next_free = pos + n;
        }
    }
    kept
}

/// Splits a hash bucket into classes of literally identical windows.
fn verify_bucket(sequence: &[Symbol], positions: &[usize], n: usize) -> Vec<Vec<usize>> {
    let mut classes: Vec<Vec<usize>> = Vec::new();
    for &pos in positions {
        let window = &sequence[pos..pos + n];
        match classes
            .iter_mut()
            .find(|class| &sequence[class[0]..class[0] + n] == window)
        {
            Some(class) => class.push(pos),
            None => classes.push(vec![pos]),
        }
    }
    classes
}

fn best_of_length(
    sequence: &[Symbol],
    n: usize,
    min_frequency: usize,
    base: u64,
) -> Option<Pattern> {
    let buckets = bucket_windows(sequence, n, base);

    // A bucket's raw size bounds the frequency of anything inside it
    let mut candidates: Vec<&Vec<usize>> = buckets
        .values()
        .filter(|positions| positions.len() >= min_frequency)
        .collect();
    candidates.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));

    let mut best: Option<Vec<usize>> = None;
    for raw in candidates {
        let best_frequency = best.as_ref().map_or(0, Vec::len);
        if raw.len() < best_frequency {
            break;
        }
        for class in verify_bucket(sequence, raw, n) {
            if class.len() < min_frequency.max(best_frequency) {
                continue;
            }
            let kept = non_overlapping(&class, n);
            if kept.len() < min_frequency {
                continue;
            }
            let better = match &best {
                None => true,
                Some(current) => {
                    kept.len() > current.len()
                        || (kept.len() == current.len() && kept[0] < current[0])
                }
            };
            if better {
                best = Some(kept);
            }
        }
    }

    let positions = best?;
    tracing::trace!(
        length = n,
        frequency = positions.len(),
        first = positions[0],
        "selected pattern"
    );
    Some(Pattern {
        symbols: sequence[positions[0]..positions[0] + n].to_vec(),
        positions,
        length: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(codes: &[u32]) -> Vec<Symbol> {
        codes.iter().map(|&c| Symbol::Terminal(c)).collect()
    }

    #[test]
    fn test_no_repetition() {
        let seq = terms(&[0, 1, 2, 3, 4]);
        assert_eq!(find_best_pattern(&seq, 2, 4, 2), None);
    }

    #[test]
    fn test_simple_digram() {
        let seq = terms(&[0, 1, 0, 1]);
        let pattern = find_best_pattern(&seq, 2, 2, 2).unwrap();
        assert_eq!(pattern.symbols, terms(&[0, 1]));
        assert_eq!(pattern.positions, vec![0, 2]);
        assert_eq!(pattern.length, 2);
    }

    #[test]
    fn test_longer_pattern_wins_ties() {
        // abcXabcYabc: "abc" occurs three times, the digrams too
        let seq = terms(&[0, 1, 2, 9, 0, 1, 2, 8, 0, 1, 2]);
        let pattern = find_best_pattern(&seq, 2, 5, 2).unwrap();
        assert_eq!(pattern.symbols, terms(&[0, 1, 2]));
        assert_eq!(pattern.positions, vec![0, 4, 8]);
    }

    #[test]
    fn test_overlapping_occurrences_filtered() {
        // aaaaa: "aa" starts at 0..=3 but only 0 and 2 can be replaced together
        let seq = terms(&[0, 0, 0, 0, 0]);
        let pattern = find_best_pattern(&seq, 2, 2, 2).unwrap();
        assert_eq!(pattern.positions, vec![0, 2]);
    }

    #[test]
    fn test_overlap_can_disqualify() {
        // aaa: "aa" occurs twice but the occurrences overlap
        let seq = terms(&[0, 0, 0]);
        assert_eq!(find_best_pattern(&seq, 2, 2, 2), None);
    }

    #[test]
    fn test_tie_breaks_on_first_position() {
        // "ab" and "cd" both occur twice
        let seq = terms(&[2, 3, 0, 1, 2, 3, 0, 1]);
        let pattern = find_best_pattern(&seq, 2, 2, 2).unwrap();
        assert_eq!(pattern.symbols, terms(&[2, 3]));
        assert_eq!(pattern.positions, vec![0, 4]);
    }

    #[test]
    fn test_min_frequency_respected() {
        let seq = terms(&[0, 1, 0, 1, 0, 1]);
        assert!(find_best_pattern(&seq, 2, 2, 3).is_some());
        assert!(find_best_pattern(&seq, 2, 2, 4).is_none());
    }

    #[test]
    fn test_markers_participate() {
        let seq = vec![
            Symbol::Terminal(0),
            Symbol::Separator,
            Symbol::End,
            Symbol::Terminal(1),
            Symbol::Separator,
            Symbol::End,
        ];
        let pattern = find_best_pattern(&seq, 2, 2, 2).unwrap();
        assert_eq!(pattern.symbols, vec![Symbol::Separator, Symbol::End]);
        assert_eq!(pattern.positions, vec![1, 4]);
    }

    #[test]
    fn test_verify_bucket_splits_collisions() {
        // Force everything into one bucket and check the literal split
        let seq = terms(&[0, 1, 2, 3, 0, 1]);
        let classes = verify_bucket(&seq, &[0, 2, 4], 2);
        assert_eq!(classes, vec![vec![0, 4], vec![2]]);
    }

    #[test]
    fn test_max_len_longer_than_sequence() {
        let seq = terms(&[5, 6, 5, 6]);
        let pattern = find_best_pattern(&seq, 2, 100, 2).unwrap();
        assert_eq!(pattern.length, 2);
    }

    #[test]
    fn test_deterministic_on_long_input() {
        let seq: Vec<Symbol> = (0..20_000u32).map(|i| Symbol::Terminal(i % 13)).collect();
        let first = find_best_pattern(&seq, 2, 8, 2);
        let second = find_best_pattern(&seq, 2, 8, 2);
        assert_eq!(first, second);
        // Windows of length 2..=6 starting at 0 all occur 1539 times
        let pattern = first.unwrap();
        assert_eq!(pattern.length, 6);
        assert_eq!(pattern.positions[0], 0);
        assert_eq!(pattern.frequency(), 1539);
    }

    #[test]
    fn test_more_frequent_shorter_pattern_wins() {
        // "ab" occurs four times, "abc" only twice
        let seq = terms(&[0, 1, 2, 0, 1, 9, 0, 1, 2, 0, 1]);
        let pattern = find_best_pattern(&seq, 2, 5, 2).unwrap();
        assert_eq!(pattern.symbols, terms(&[0, 1]));
        assert_eq!(pattern.positions, vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_threshold_does_not_change_winner() {
        let seq = terms(&[0, 1, 2, 0, 1, 9, 0, 1, 2, 0, 1, 2, 7, 0, 1, 2]);
        let loose = find_best_pattern(&seq, 2, 6, 2).unwrap();
        for min_frequency in 3..=loose.frequency() {
            assert_eq!(find_best_pattern(&seq, 2, 6, min_frequency).as_ref(), Some(&loose));
        }
        assert_eq!(find_best_pattern(&seq, 2, 6, loose.frequency() + 1), None);
    }
}
