//! # Pagination
//!
//! Splits the selected items into fixed-capacity pages. The capacity is the
//! `columns × rows` product of the active sheet geometry.
//!
//! ```text
//! 25 items, capacity 21:
//!
//!   page 1: [0 .. 21)   21 items
//!   page 2: [21 .. 25)   4 items (+ 17 placeholders when rendered)
//! ```
//!
//! An empty input still yields one (empty) page so callers can render an
//! empty sheet instead of branching.

use std::num::NonZeroUsize;

/// Split `items` into pages of at most `capacity` items.
///
/// Pages borrow from `items`; concatenating them reproduces the input in
/// order.
pub fn paginate<T>(items: &[T], capacity: NonZeroUsize) -> Vec<&[T]> {
    if items.is_empty() {
        return vec![&items[..0]];
    }
    items.chunks(capacity.get()).collect()
}

/// Number of pages [`paginate`] will produce.
pub fn page_count(len: usize, capacity: NonZeroUsize) -> usize {
    len.div_ceil(capacity.get()).max(1)
}
