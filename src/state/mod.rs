//! State Module - Runtime state of the element host
//!
//! This module contains the state systems the list editor drives:
//!
//! - **Focus** - Focused element signal, focus callbacks
//! - **Keyboard** - Event types, key classification, keydown listeners
//! - **Mouse** - Click listeners, synthetic activation
//! - **Input** - crossterm event conversion and polling

pub mod focus;
pub mod input;
pub mod keyboard;
pub mod mouse;

pub use focus::*;
pub use keyboard::*;
