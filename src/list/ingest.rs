//! Input Ingest Controller - Decisions for keys pressed in the add input.
//!
//! - Commit (enter/tab): non-empty text becomes a new item at the tail,
//!   empty text closes the editor.
//! - Select-last (delete/backspace/left on an empty input): hand focus back
//!   to the last item.
//!
//! Like the navigation controller, this is pure: the binding layer reads the
//! buffer and the list, asks here, and carries the answer out.

use crate::types::Item;

/// What a commit key does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Append this item and clear the buffer.
    Insert(Item),
    /// Buffer was empty: close/unfocus, list untouched.
    Close,
    /// The list is at its configured maximum: keep the buffer, list untouched.
    Full,
}

/// Decide what committing `buffer` does to a list of `len` items.
pub fn commit(buffer: &str, len: usize, max: Option<usize>) -> CommitOutcome {
    if buffer.is_empty() {
        return CommitOutcome::Close;
    }
    if max.is_some_and(|max| len >= max) {
        return CommitOutcome::Full;
    }
    CommitOutcome::Insert(Item::new(buffer))
}

/// Index of the item a backspace from the input should select.
///
/// None when the buffer still has text (normal editing proceeds) or when
/// there is nothing to select.
pub fn select_last(buffer: &str, len: usize) -> Option<usize> {
    if !buffer.is_empty() {
        return None;
    }
    len.checked_sub(1)
}

/// Plain text editing for keys the controllers pass through.
///
/// Appends printable characters, removes the last character on
/// backspace/delete. Returns whether the buffer changed.
pub fn edit_buffer(buffer: &mut String, key: &str, printable: Option<char>) -> bool {
    match (key, printable) {
        (_, Some(c)) => {
            buffer.push(c);
            true
        }
        ("Backspace" | "Delete", None) => buffer.pop().is_some(),
        _ => false,
    }
}
