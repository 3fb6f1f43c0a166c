// ============================================================
// Layer 4 — Length Sorter
// ============================================================
// Sorting pairs by source length before batching means every
// batch holds sentences of similar length, so post-padding
// adds only a handful of <pad> tokens per row.
//
//   before: [12 words, 4 words, 9 words, 5 words]
//   after:  [4 words, 5 words, 9 words, 12 words]
//
// The sort is stable: pairs of equal length keep their corpus
// order.

use crate::domain::sentence_pair::SentencePair;

/// Sort pairs ascending by source token count.
pub fn sort_by_length(mut pairs: Vec<SentencePair>) -> Vec<SentencePair> {
    pairs.sort_by_key(|p| p.source_len());
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_ascending_by_source() {
        let pairs = vec![
            SentencePair::new("a b c", "x"),
            SentencePair::new("a", "x y z"),
            SentencePair::new("a b", "x"),
        ];
        let sorted = sort_by_length(pairs);
        let lens: Vec<usize> = sorted.iter().map(|p| p.source_len()).collect();
        assert_eq!(lens, vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_is_stable() {
        let pairs = vec![
            SentencePair::new("a b", "first"),
            SentencePair::new("c", "short"),
            SentencePair::new("d e", "second"),
        ];
        let sorted = sort_by_length(pairs);
        assert_eq!(sorted[1].target, "first");
        assert_eq!(sorted[2].target, "second");
    }
}
