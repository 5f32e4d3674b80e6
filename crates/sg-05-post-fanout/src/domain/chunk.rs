//! Partitioning of a recipient set into batch-sized chunks.

/// Split `ids` into consecutive chunks of at most `size` elements.
///
/// Every element appears in exactly one chunk, in input order. A `size`
/// of zero is treated as one.
#[must_use]
pub fn chunk<T>(ids: &[T], size: usize) -> Vec<&[T]> {
    ids.chunks(size.max(1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_thousand_followers_make_three_chunks() {
        let ids: Vec<u32> = (0..1000).collect();
        let chunks = chunk(&ids, 450);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![450, 450, 100]);
    }

    #[test]
    fn test_empty_input() {
        let ids: Vec<u32> = Vec::new();
        assert!(chunk(&ids, 450).is_empty());
    }

    #[test]
    fn test_zero_size_degrades_to_one() {
        let ids = [1, 2, 3];
        assert_eq!(chunk(&ids, 0).len(), 3);
    }

    proptest! {
        #[test]
        fn prop_chunks_partition_input(
            ids in proptest::collection::vec(any::<u32>(), 0..2000),
            size in 1usize..600,
        ) {
            let chunks = chunk(&ids, size);

            prop_assert_eq!(chunks.len(), ids.len().div_ceil(size));
            prop_assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= size));
            let rejoined: Vec<u32> = chunks.concat();
            prop_assert_eq!(rejoined, ids);
        }
    }
}
