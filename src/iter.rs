//! Iterator adapters for automatic progress tracking.
//!
//! This module provides the [`ProgressIteratorExt`] trait, which adds helper methods
//! to any Rust [`Iterator`]. This allows you to attach a progress line to a loop with
//! a single method call.
//!
//! # Counting
//!
//! * [`progress`](ProgressIteratorExt::progress) and
//!   [`progress_with`](ProgressIteratorExt::progress_with) increment the
//!   value per item and complete the tracker when the iterator is exhausted.
//!   `progress` takes the total from an exact [`Iterator::size_hint`].
//! * [`progress_counting`](ProgressIteratorExt::progress_counting) increments
//!   the *total* per item instead, for enumerating work whose size is only
//!   discovered while walking it (e.g. a directory scan feeding a later pass).
//!
//! # Example
//!
//! ```
//! use progress_line::{ProgressIteratorExt, ProgressTracker};
//!
//! let tracker = ProgressTracker::builder().with_sink(std::io::sink()).build();
//! let sum: u32 = [1, 2, 3].into_iter().progress_with(tracker.clone()).sum();
//!
//! assert_eq!(sum, 6);
//! assert!(tracker.is_complete());
//! ```

use compact_str::CompactString;

use crate::ProgressTracker;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Counting {
    Value,
    Total,
}

/// An iterator adapter that wraps an underlying iterator and tracks progress.
pub struct ProgressIter<I> {
    iter: I,
    tracker: ProgressTracker,
    counting: Counting,
    exhausted: bool,
}

impl<I> ProgressIter<I> {
    /// The tracker driven by this iterator.
    pub const fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }
}

impl<I: Iterator> Iterator for ProgressIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let item = self.iter.next();
        match (&item, self.counting) {
            (Some(_), Counting::Value) => self.tracker.increment(),
            (Some(_), Counting::Total) => self.tracker.increment_total(),
            (None, counting) => {
                self.exhausted = true;
                if counting == Counting::Value {
                    self.tracker.complete();
                }
            }
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            (0, Some(0))
        } else {
            self.iter.size_hint()
        }
    }
}

/// Extension trait to easily attach progress tracking to any Iterator.
pub trait ProgressIteratorExt: Iterator + Sized {
    /// Wraps the iterator in a new stdout [`ProgressTracker`].
    ///
    /// The total comes from an exact `size_hint`; otherwise the default total
    /// applies.
    fn progress(self) -> ProgressIter<Self> {
        self.progress_with_prefix(CompactString::default())
    }

    /// Like [`progress`](Self::progress), with a line prefix.
    fn progress_with_prefix(self, prefix: impl Into<CompactString>) -> ProgressIter<Self> {
        let tracker = ProgressTracker::builder()
            .with_total(total_from_size_hint(&self))
            .with_prefix(prefix)
            .build();
        self.progress_with(tracker)
    }

    /// Wraps the iterator using an existing tracker, incrementing its value
    /// per item and completing it at the end.
    fn progress_with(self, tracker: ProgressTracker) -> ProgressIter<Self> {
        ProgressIter {
            iter: self,
            tracker,
            counting: Counting::Value,
            exhausted: false,
        }
    }

    /// Wraps the iterator using an existing tracker, incrementing its total
    /// per item.
    fn progress_counting(self, tracker: ProgressTracker) -> ProgressIter<Self> {
        ProgressIter {
            iter: self,
            tracker,
            counting: Counting::Total,
            exhausted: false,
        }
    }
}

impl<I: Iterator> ProgressIteratorExt for I {}

#[allow(clippy::cast_precision_loss)]
fn total_from_size_hint<I: Iterator>(iter: &I) -> f64 {
    match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => upper as f64,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{ProgressIteratorExt as _, total_from_size_hint};
    use crate::{
        ProgressTracker,
        testing::{SharedBuffer, fields},
    };

    /// Iterator Integration
    /// Verifies the extension trait correctly wraps and tracks an iterator.
    #[test]
    #[allow(clippy::float_cmp)]
    fn test_iterator_adapter() {
        let data = [1, 2, 3, 4, 5];
        let buf = SharedBuffer::default();
        let tracker = ProgressTracker::builder()
            .with_total(5.0)
            .with_sink(buf.clone())
            .build();

        let iter = data.iter().progress_with(tracker);
        let handle = iter.tracker().clone();
        assert_eq!(iter.count(), 5);

        assert_eq!(handle.value(), 5.0);
        assert!(handle.is_complete(), "exhaustion should complete the tracker");
        // Five increments plus the completing render.
        assert_eq!(buf.contents().matches('\r').count(), 6);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_counting_total() {
        let buf = SharedBuffer::default();
        let tracker = ProgressTracker::builder()
            .with_total(0.0)
            .with_sink(buf.clone())
            .build();

        let found: Vec<_> = (0..3)
            .filter(|n| n % 2 == 0)
            .progress_counting(tracker.clone())
            .collect();
        assert_eq!(found, vec![0, 2]);

        assert_eq!(tracker.total(), 2.0);
        assert_eq!(tracker.value(), 0.0);
        let out = buf.contents();
        let last = out.rsplit('\r').next().unwrap();
        assert_eq!(fields(last)[2], "0/2");
    }

    #[test]
    fn test_exhausted_is_fused() {
        let buf = SharedBuffer::default();
        let tracker = ProgressTracker::builder().with_sink(buf.clone()).build();
        let mut iter = std::iter::empty::<u8>().progress_with(tracker);
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
        assert_eq!(buf.contents().matches('\r').count(), 1);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_total_from_size_hint() {
        assert_eq!(total_from_size_hint(&[1, 2, 3].iter()), 3.0);
        assert_eq!(total_from_size_hint(&(0..10).filter(|_| true)), 0.0);
    }
}
