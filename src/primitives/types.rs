//! Primitive types - Props, callbacks and cleanup.

use std::fmt;
use std::rc::Rc;

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by mount-style calls.
///
/// Call this to unmount and release resources.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Callback Types
// =============================================================================

/// Called when an empty commit closes the editor.
pub type CloseCallback = Rc<dyn Fn()>;

// =============================================================================
// Simple List Props
// =============================================================================

/// Placeholder shown in the add input.
pub const DEFAULT_PLACEHOLDER: &str = "Start typing here\u{2026}";

/// Properties for the simple list widget.
///
/// # Example
///
/// ```ignore
/// let props = SimpleListProps {
///     name: "tags".into(),
///     max: Some(10),
///     ..Default::default()
/// };
/// ```
#[derive(Clone)]
pub struct SimpleListProps {
    /// Field name; becomes the container's data-field and the binding prefix.
    pub name: String,
    /// Optional container element ID.
    pub id: Option<String>,
    /// Placeholder for the add input.
    pub placeholder: String,
    /// Minimum number of items; deletes that would go below it are ignored.
    pub min: Option<usize>,
    /// Maximum number of items; commits at capacity are ignored.
    pub max: Option<usize>,
    /// Fired when an empty commit closes the editor.
    pub on_close: Option<CloseCallback>,
}

impl Default for SimpleListProps {
    fn default() -> Self {
        Self {
            name: "list".to_string(),
            id: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            min: None,
            max: None,
            on_close: None,
        }
    }
}

impl fmt::Debug for SimpleListProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleListProps")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("placeholder", &self.placeholder)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
