//! Navigation Controller - Decisions for keys pressed on an item.
//!
//! Pure logic: given the action, the index of the item that received the key,
//! and the list length, [`decide`] returns a [`Transition`]. Nothing here
//! touches the element host; the binding layer carries out the transition.
//!
//! Boundary policy:
//! - no wrap at the head (`PrevItem` on the first item does nothing)
//! - hand-off at the tail (`NextItem` on the last item moves to the add input)
//! - deleting the first item clears the selection

use super::store;
use super::KeyAction;
use crate::types::{EventFlags, Item};

/// What happens to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Leave the flags as they are.
    Keep,
    /// Unselect every item.
    Clear,
    /// Select the item at this index (post-removal numbering).
    Select(usize),
}

/// Which element receives focus afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// Focus is not moved by this controller.
    Unchanged,
    /// The rendered element of the item at this index (post-removal numbering).
    Item(usize),
    /// The add input.
    Input,
}

/// Outcome of one key on one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Item to delete before anything else.
    pub remove: Option<usize>,
    pub selection: Selection,
    pub focus: FocusTarget,
    /// Synthesize an activation (click) on the focus target after focusing it.
    pub activate: bool,
    pub flags: EventFlags,
}

impl Transition {
    /// Do nothing; let default handling proceed.
    pub const IGNORE: Self = Self {
        remove: None,
        selection: Selection::Keep,
        focus: FocusTarget::Unchanged,
        activate: false,
        flags: EventFlags::NONE,
    };

    /// Whether carrying this transition out changes the list.
    pub fn mutates(&self) -> bool {
        self.remove.is_some() || self.selection != Selection::Keep
    }
}

/// Decide what a key does to the item at `index` in a list of `len` items.
///
/// `index` must be a valid position (`index < len`); it is always derived
/// from the same sequence being navigated.
pub fn decide(action: KeyAction, index: usize, len: usize) -> Transition {
    debug_assert!(index < len, "navigation index {index} outside list of {len}");

    match action {
        KeyAction::PrevItem => select_previous(index),
        KeyAction::NextItem => select_next(index, len),
        KeyAction::DeleteItem => delete_item(index),
        KeyAction::Commit | KeyAction::SelectLast | KeyAction::Ignore => Transition::IGNORE,
    }
}

fn select_previous(index: usize) -> Transition {
    match index.checked_sub(1) {
        Some(prev) => Transition {
            selection: Selection::Select(prev),
            focus: FocusTarget::Item(prev),
            ..Transition::IGNORE
        },
        None => Transition::IGNORE,
    }
}

fn select_next(index: usize, len: usize) -> Transition {
    if index + 1 < len {
        Transition {
            selection: Selection::Select(index + 1),
            focus: FocusTarget::Item(index + 1),
            flags: EventFlags::PREVENT_DEFAULT,
            ..Transition::IGNORE
        }
    } else {
        // Last item: hand off to the add input. Its activation unselects all.
        Transition {
            focus: FocusTarget::Input,
            activate: true,
            flags: EventFlags::PREVENT_DEFAULT | EventFlags::STOP_PROPAGATION,
            ..Transition::IGNORE
        }
    }
}

fn delete_item(index: usize) -> Transition {
    let base = Transition {
        remove: Some(index),
        flags: EventFlags::PREVENT_DEFAULT,
        ..Transition::IGNORE
    };
    match index.checked_sub(1) {
        Some(prev) => Transition {
            selection: Selection::Select(prev),
            focus: FocusTarget::Item(prev),
            activate: true,
            ..base
        },
        None => Transition {
            selection: Selection::Clear,
            ..base
        },
    }
}

/// Apply the list half of a transition (removal, then selection).
pub fn apply(items: &mut Vec<Item>, transition: &Transition) {
    if let Some(index) = transition.remove {
        store::remove_at(items, index);
    }
    match transition.selection {
        Selection::Keep => {}
        Selection::Clear => {
            store::unselect_all(items);
        }
        Selection::Select(index) => store::select_item(items, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(texts: &[&str], selected: Option<usize>) -> Vec<Item> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Item {
                text: t.to_string(),
                selected: Some(i) == selected,
            })
            .collect()
    }

    fn run(action: KeyAction, items: &mut Vec<Item>, index: usize) -> Transition {
        let transition = decide(action, index, items.len());
        apply(items, &transition);
        transition
    }

    #[test]
    fn test_prev_moves_left() {
        let mut items = list(&["A", "B", "C"], Some(2));
        let t = run(KeyAction::PrevItem, &mut items, 2);

        assert_eq!(t.focus, FocusTarget::Item(1));
        assert_eq!(store::selected_index(&items), Some(1));
        assert!(!t.flags.default_prevented());
    }

    #[test]
    fn test_prev_at_head_does_not_wrap() {
        let mut items = list(&["A", "B"], Some(0));
        let before = items.clone();
        let t = run(KeyAction::PrevItem, &mut items, 0);

        assert_eq!(t, Transition::IGNORE);
        assert_eq!(items, before);
    }

    #[test]
    fn test_next_moves_right_and_keeps_tab_inside() {
        let mut items = list(&["A", "B", "C"], Some(0));
        let t = run(KeyAction::NextItem, &mut items, 0);

        assert_eq!(t.focus, FocusTarget::Item(1));
        assert!(t.flags.default_prevented());
        assert!(!t.flags.propagation_stopped());
        assert_eq!(store::selected_index(&items), Some(1));
    }

    #[test]
    fn test_next_at_tail_hands_off_to_input() {
        let mut items = list(&["A", "B"], Some(1));
        let before = items.clone();
        let t = run(KeyAction::NextItem, &mut items, 1);

        assert_eq!(t.focus, FocusTarget::Input);
        assert!(t.activate);
        assert_eq!(t.selection, Selection::Keep);
        assert!(t.flags.default_prevented());
        assert!(t.flags.propagation_stopped());
        assert_eq!(items, before);
    }

    #[test]
    fn test_delete_shifts_selection_left() {
        let mut items = list(&["A", "B", "C"], Some(1));
        let t = run(KeyAction::DeleteItem, &mut items, 1);

        assert_eq!(items, list(&["A", "C"], Some(0)));
        assert_eq!(t.focus, FocusTarget::Item(0));
        assert!(t.activate);
        assert!(t.flags.default_prevented());
    }

    #[test]
    fn test_delete_at_head_clears_selection() {
        let mut items = list(&["A", "B"], Some(0));
        let t = run(KeyAction::DeleteItem, &mut items, 0);

        assert_eq!(items, list(&["B"], None));
        assert_eq!(t.focus, FocusTarget::Unchanged);
        assert!(!t.activate);
    }

    #[test]
    fn test_delete_only_item() {
        let mut items = list(&["A"], Some(0));
        run(KeyAction::DeleteItem, &mut items, 0);
        assert!(items.is_empty());
    }

    #[test]
    fn test_input_actions_are_ignored_on_items() {
        for action in [KeyAction::Commit, KeyAction::SelectLast, KeyAction::Ignore] {
            assert_eq!(decide(action, 0, 1), Transition::IGNORE);
        }
        assert!(!Transition::IGNORE.mutates());
    }

    #[test]
    fn test_single_selection_holds_for_every_walk() {
        let mut items = list(&["A", "B", "C", "D"], Some(0));
        let mut index = 0;
        let actions = [
            KeyAction::NextItem,
            KeyAction::NextItem,
            KeyAction::PrevItem,
            KeyAction::DeleteItem,
            KeyAction::NextItem,
            KeyAction::DeleteItem,
        ];
        for action in actions {
            let t = run(action, &mut items, index);
            if let FocusTarget::Item(i) = t.focus {
                index = i;
            }
            assert!(store::selected_count(&items) <= 1);
        }
    }
}
