//! Element Engine - The element tree the widget renders into.
//!
//! The engine manages the host-side data structures:
//! - Registry: Index allocation, ID mapping, parent context
//! - Tree: Child order, sibling lookup, scoped lookup by class
//!
//! # Architecture
//!
//! Elements are NOT objects. They are indices into registry tables:
//!
//! ```text
//! Index 0: Section (class="simple-list", data-field="tags")
//! Index 1: Span    (parent=0, class="simple-list-item", text="alpha")
//! Index 2: Input   (parent=0, class="simple-list-add")
//! ```
//!
//! Handlers (keyboard, mouse, focus callbacks) are keyed by the same index.

mod registry;

pub use registry::*;
