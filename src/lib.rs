//! # spark-list
//!
//! Keyboard-navigable, single-selection list editor for reactive element trees.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! Elements are indices in a thread-local registry rather than objects. Focus,
//! keyboard and click handling are registries keyed by those indices, and
//! events bubble from the target element through its ancestors.
//!
//! The list editor is split into a pure decision layer and a binding layer:
//! ```text
//! KeyboardEvent → keycode → KeyAction → Transition → Observer round trip → render → focus
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (Item, EventFlags, ItemState)
//! - [`engine`] - Element registry and tree queries
//! - [`state`] - Focus, keyboard, mouse and terminal input
//! - [`list`] - Store mutations, navigation and input-ingest decisions
//! - [`primitives`] - The mounted list widget and its markup
//! - [`page_list`] - Page list metadata sync

pub mod engine;
pub mod list;
pub mod page_list;
pub mod primitives;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use engine::{
    allocate_index, children, find, find_all, get_allocated_indices, get_id, get_index,
    get_parent_index, is_allocated, next_sibling, on_destroy, pop_parent_context,
    previous_sibling, push_parent_context, release_index, reset_registry,
};

pub use list::{CommitOutcome, FocusTarget, KeyAction, Observer, Selection, Transition};

pub use primitives::{
    Binder, Binding, Cleanup, ItemView, ListTemplate, ListView, SimpleList, SimpleListProps,
    SIMPLELIST_BINDER,
};

pub use page_list::{
    get_list_data, update_page_list, JsonClient, ListData, PageListError, PageListUpdate,
    PageState, PageStore,
};

pub use state::{
    // Focus
    focus, blur, focused, get_focused_index, has_focus, is_focused,
    reset_focus_state,
    // Keyboard
    keycode, Key, KeyboardEvent, KeyState, Modifiers, KeyHandler,
    dispatch as dispatch_keyboard, dispatch_to, on as on_keyboard, on_keydown,
    last_event, last_key, reset_keyboard_state,
};
