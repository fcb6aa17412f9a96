//! Core types for spark-list.
//!
//! These types are shared by the element host, the list controllers and the
//! binding layer. They are deliberately small: an item is text plus a
//! selection flag, and event outcomes are bit flags.

use serde::{Deserialize, Serialize};

// =============================================================================
// Item
// =============================================================================

/// One list entry.
///
/// Serialized as exactly `{ "text": ..., "selected": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Item {
    pub text: String,
    #[serde(default)]
    pub selected: bool,
}

impl Item {
    /// Create an unselected item.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selected: false,
        }
    }

    /// Create a selected item.
    pub fn selected(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selected: true,
        }
    }
}

impl From<&str> for Item {
    fn from(text: &str) -> Self {
        Item::new(text)
    }
}

/// The ordered item sequence. Position is identity.
pub type ItemSequence = Vec<Item>;

// =============================================================================
// Event Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// What a handler asks of the event it handled.
    ///
    /// Empty means "pass through": default handling proceeds and the event
    /// keeps bubbling to ancestor elements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EventFlags: u8 {
        const NONE = 0;
        /// Suppress the host's default action (tab-out, history back, newline).
        const PREVENT_DEFAULT = 1 << 0;
        /// Stop bubbling to ancestor and global handlers.
        const STOP_PROPAGATION = 1 << 1;
    }
}

impl EventFlags {
    /// Whether default handling was suppressed.
    #[inline]
    pub fn default_prevented(self) -> bool {
        self.contains(Self::PREVENT_DEFAULT)
    }

    /// Whether propagation was stopped.
    #[inline]
    pub fn propagation_stopped(self) -> bool {
        self.contains(Self::STOP_PROPAGATION)
    }
}

// =============================================================================
// Item visual state (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Visual state of a rendered item element.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ItemState: u8 {
        const NONE = 0;
        const SELECTED = 1 << 0;
        const FOCUSED = 1 << 1;
    }
}
