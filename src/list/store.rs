//! List Store - Mutation primitives over the item sequence.
//!
//! Every function here keeps the single-selection invariant: after any call,
//! at most one item has `selected == true`. Indices are positions in the
//! slice they are applied to; an index past the end is a caller bug and
//! panics via slice indexing.

use crate::types::Item;

/// Clear the selection flag on every item. Returns the same slice.
pub fn unselect_all(items: &mut [Item]) -> &mut [Item] {
    for item in items.iter_mut() {
        item.selected = false;
    }
    items
}

/// Select the item at `index`, unselecting every other item.
pub fn select_item(items: &mut [Item], index: usize) {
    unselect_all(items)[index].selected = true;
}

/// Remove and return the item at `index`.
pub fn remove_at(items: &mut Vec<Item>, index: usize) -> Item {
    items.remove(index)
}

/// Append an item at the tail.
pub fn insert(items: &mut Vec<Item>, item: Item) {
    items.push(item);
}

/// Index of the selected item, if any.
pub fn selected_index(items: &[Item]) -> Option<usize> {
    items.iter().position(|item| item.selected)
}

/// Number of selected items. Never more than one through this module.
pub fn selected_count(items: &[Item]) -> usize {
    items.iter().filter(|item| item.selected).count()
}
