//! Primitives - The list editor widget and its markup.
//!
//! - [`simple_list`] - The mounted widget: elements, bindings, binder
//! - [`template`] - Declarative template and rendered markup
//!
//! # Architecture
//!
//! A widget is a handful of indices in the element registry. Mounting:
//! 1. Allocates the container and the add input
//! 2. Renders one focusable item element per item, before the input
//! 3. Registers click/keydown handlers on those elements
//! 4. Runs the binder, which attaches the add input's keydown listener
//!
//! Handlers hold weak references to the widget, so unmounting (or dropping
//! the last handle) leaves them inert.

mod types;
pub mod simple_list;
pub mod template;

pub use types::*;
pub use simple_list::{Binder, Binding, SimpleList, SIMPLELIST_BINDER};
pub use template::{ItemView, ListTemplate, ListView};
