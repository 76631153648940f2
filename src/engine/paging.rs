use crate::model::{Entry, listing_order};

/// Visible window of a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<'s> {
    /// `(index in the addressing scope, item)` in display order.
    pub items: Vec<(usize, &'s Entry)>,
    pub total: usize,
    pub rewind: bool,
    pub forward: bool,
}

/// Whether an entry takes part in pagination. Labels of a directory listing
/// are printed in the body instead; search results page everything.
pub fn pageable(entry: &Entry, with_labels: bool) -> bool {
    with_labels || !entry.is_label()
}

pub fn pageable_count(scope: &[Entry], with_labels: bool) -> usize {
    scope.iter().filter(|e| pageable(e, with_labels)).count()
}

/// Display order and addressing order are kept apart: items are shown
/// display-sorted, but each carries its position in `scope`, which is what
/// the action payload must encode.
pub fn paginate(scope: &[Entry], offset: usize, page_size: usize, with_labels: bool) -> Page<'_> {
    let mut shown: Vec<(usize, &Entry)> = scope
        .iter()
        .enumerate()
        .filter(|(_, e)| pageable(e, with_labels))
        .collect();
    shown.sort_by(|(_, a), (_, b)| listing_order(a, b));

    let total = shown.len();
    let items = shown
        .into_iter()
        .skip(offset)
        .take(page_size)
        .collect();

    Page {
        items,
        total,
        rewind: offset > 0,
        forward: total > offset + page_size,
    }
}

#[cfg(test)]
#[path = "../tests/engine/paging_tests.rs"]
mod tests;
