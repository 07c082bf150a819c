use std::num::NonZeroUsize;
use std::ops::Range;

/// Split rows `start..total` into contiguous batches of `size`; only the last may be shorter
pub fn partition(start: usize, total: usize, size: NonZeroUsize) -> Vec<Range<usize>> {
    (start..total)
        .step_by(size.get())
        .map(|from| from..(from + size.get()).min(total))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_partition_remainder() {
        let batches = partition(0, 23, size(10));
        assert_eq!(batches, vec![0..10, 10..20, 20..23]);
    }

    #[test]
    fn test_partition_exact() {
        let batches = partition(0, 10, size(5));
        assert_eq!(batches, vec![0..5, 5..10]);
    }

    #[test]
    fn test_partition_small() {
        assert_eq!(partition(0, 3, size(10)), vec![0..3]);
        assert!(partition(0, 0, size(10)).is_empty());
    }

    #[test]
    fn test_partition_from_offset() {
        assert_eq!(partition(10, 23, size(10)), vec![10..20, 20..23]);
        assert!(partition(23, 23, size(10)).is_empty());
        assert!(partition(30, 23, size(10)).is_empty());
    }

    #[test]
    fn test_partition_invariants() {
        for total in 0..40 {
            for b in 1..12 {
                let batches = partition(0, total, size(b));
                assert_eq!(batches.len(), total.div_ceil(b));
                assert_eq!(batches.iter().map(|r| r.len()).sum::<usize>(), total);

                let mut expected_start = 0;
                for (i, batch) in batches.iter().enumerate() {
                    assert_eq!(batch.start, expected_start);
                    assert!(!batch.is_empty());
                    if i + 1 < batches.len() {
                        assert_eq!(batch.len(), b);
                    } else {
                        assert!(batch.len() <= b);
                    }
                    expected_start = batch.end;
                }
            }
        }
    }
}
