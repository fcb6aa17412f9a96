//! Focus System - Which element receives keyboard input.
//!
//! Manages focus state: the `focused_index` signal (currently focused
//! element). Readers that track the signal re-run when focus moves.
//!
//! Unlike a full-screen app, the list editor moves focus explicitly: the
//! navigation layer decides the next element and calls [`focus`]. There is no
//! Tab cycling here; Tab belongs to the widget.
//!
//! # Example
//!
//! ```ignore
//! use spark_list::state::focus;
//!
//! focus::focus(item_index);
//! assert!(focus::is_focused(item_index));
//! ```

use spark_signals::{signal, Signal};

use crate::engine::{get_focusable, is_allocated};

// =============================================================================
// FOCUSED INDEX SIGNAL
// =============================================================================

thread_local! {
    static FOCUSED_INDEX: Signal<i32> = signal(-1);
}

/// Get the currently focused element index (-1 if none)
pub fn get_focused_index() -> i32 {
    FOCUSED_INDEX.with(|s| s.get())
}

/// Get the currently focused element, if any
pub fn focused() -> Option<usize> {
    usize::try_from(get_focused_index()).ok()
}

/// Check if any element is focused
pub fn has_focus() -> bool {
    get_focused_index() >= 0
}

/// Check if a specific element is focused
pub fn is_focused(index: usize) -> bool {
    get_focused_index() == index as i32
}

// =============================================================================
// FOCUS CONTROL
// =============================================================================

/// Focus a specific element by index.
///
/// Returns false (and leaves focus alone) if the element is not focusable.
pub fn focus(index: usize) -> bool {
    if !is_allocated(index) || !get_focusable(index) {
        return false;
    }
    FOCUSED_INDEX.with(|s| s.set(index as i32));
    true
}

/// Clear focus (no element focused)
pub fn blur() {
    FOCUSED_INDEX.with(|s| s.set(-1));
}

// =============================================================================
// RESET (for testing)
// =============================================================================

/// Reset all focus state (for testing)
pub fn reset_focus_state() {
    FOCUSED_INDEX.with(|s| s.set(-1));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate_index, reset_registry, set_focusable};

    fn setup() {
        reset_registry();
        reset_focus_state();
    }

    fn focusable() -> usize {
        let index = allocate_index(None);
        set_focusable(index, true);
        index
    }

    #[test]
    fn test_initial_state() {
        setup();
        assert_eq!(get_focused_index(), -1);
        assert_eq!(focused(), None);
        assert!(!has_focus());
    }

    #[test]
    fn test_focus_single_element() {
        setup();
        let index = focusable();

        assert!(focus(index));
        assert_eq!(focused(), Some(index));
        assert!(is_focused(index));
    }

    #[test]
    fn test_focus_non_focusable() {
        setup();
        let index = allocate_index(None);

        assert!(!focus(index));
        assert!(!has_focus());
    }

    #[test]
    fn test_blur() {
        setup();
        let a = focusable();

        focus(a);
        blur();
        assert!(!has_focus());
        assert_eq!(get_focused_index(), -1);
    }
}
