//! Incremental painting of the channel grid

use std::ops::Range;

pub const BATCH_SIZE: usize = 40;

/// Tracks how much of the filtered view has been painted
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCursor {
    visible: usize,
    batch_size: usize,
}

impl Default for BatchCursor {
    fn default() -> Self {
        Self::new(BATCH_SIZE)
    }
}

impl BatchCursor {
    pub fn new(batch_size: usize) -> Self {
        Self {
            visible: 0,
            batch_size: batch_size.max(1),
        }
    }

    pub fn reset(&mut self) {
        self.visible = 0;
    }

    /// Next range to paint out of `total` filtered records. Empty once
    /// everything is painted.
    pub fn next_batch(&mut self, total: usize) -> Range<usize> {
        let start = self.visible.min(total);
        let end = (start + self.batch_size).min(total);
        self.visible = end;
        start..end
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_until_exhausted() {
        let mut cursor = BatchCursor::new(40);
        assert_eq!(cursor.next_batch(95), 0..40);
        assert_eq!(cursor.next_batch(95), 40..80);
        assert!(cursor.has_more(95));
        assert_eq!(cursor.next_batch(95), 80..95);
        assert!(!cursor.has_more(95));
        assert!(cursor.next_batch(95).is_empty());
        assert_eq!(cursor.visible(), 95);
    }

    #[test]
    fn test_reset_starts_over() {
        let mut cursor = BatchCursor::default();
        cursor.next_batch(100);
        cursor.reset();
        assert_eq!(cursor.visible(), 0);
        assert_eq!(cursor.next_batch(10), 0..10);
    }

    #[test]
    fn test_shrinking_total_clamps() {
        let mut cursor = BatchCursor::new(40);
        cursor.next_batch(100);
        assert!(cursor.next_batch(20).is_empty());
        assert_eq!(cursor.visible(), 20);
    }

    #[test]
    fn test_empty_view() {
        let mut cursor = BatchCursor::new(40);
        assert!(cursor.next_batch(0).is_empty());
        assert!(!cursor.has_more(0));
    }
}
