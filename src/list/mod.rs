//! List Module - The list editor's state machine, free of any element host.
//!
//! - [`store`] - Mutation primitives with the single-selection invariant
//! - [`navigation`] - Item-key decisions (previous, next, delete)
//! - [`ingest`] - Add-input decisions (commit, select last)
//! - [`observer`] - The injected read/write store capability
//!
//! Key handling is a two-step mapping: a raw event is classified into a
//! [`Key`] by [`keycode`](crate::state::keyboard::keycode), then the key is
//! mapped to a [`KeyAction`] depending on where it was pressed.

pub mod ingest;
pub mod navigation;
pub mod observer;
pub mod store;

pub use ingest::CommitOutcome;
pub use navigation::{FocusTarget, Selection, Transition};
pub use observer::Observer;

use crate::state::keyboard::Key;

/// Every action the list editor can take on a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    PrevItem,
    NextItem,
    DeleteItem,
    Commit,
    SelectLast,
    Ignore,
}

impl KeyAction {
    /// Action for a key pressed while an item element has focus.
    pub fn for_item(key: Option<Key>) -> Self {
        match key {
            Some(Key::Left) => Self::PrevItem,
            Some(Key::Right | Key::Tab) => Self::NextItem,
            Some(Key::Delete | Key::Backspace) => Self::DeleteItem,
            Some(Key::Enter) | None => Self::Ignore,
        }
    }

    /// Action for a key pressed while the add input has focus.
    pub fn for_input(key: Option<Key>) -> Self {
        match key {
            Some(Key::Enter | Key::Tab) => Self::Commit,
            Some(Key::Delete | Key::Backspace | Key::Left) => Self::SelectLast,
            Some(Key::Right) | None => Self::Ignore,
        }
    }
}
