//! Mouse Module - Pointer event state and click listeners
//!
//! State and handler registry for pointer events.
//! Does NOT own stdin (that is the input module).
//!
//! # API
//!
//! - `last_event` - Get last mouse event
//! - `on_click(index, fn)` - Click listener on an element
//! - `click(index)` - Synthetic activation (what a script's `dispatchEvent(click)` does)
//! - `dispatch(event)` - Deliver a real pointer event to its target element
//!
//! Clicks bubble from the target to its ancestors, like keydown.
//!
//! # Example
//!
//! ```ignore
//! use spark_list::state::mouse;
//!
//! let cleanup = mouse::on_click(item_index, |_event| EventFlags::NONE);
//! mouse::click(item_index);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use super::keyboard::Modifiers;
use crate::engine::get_parent_index;
use crate::types::EventFlags;

// =============================================================================
// TYPES
// =============================================================================

/// Mouse action type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Down,
    Up,
    Move,
    Drag,
    Scroll,
}

/// Mouse button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    #[default]
    None,
}

/// Mouse event
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    /// Action type (down, up, move, drag, scroll)
    pub action: MouseAction,
    /// Button pressed
    pub button: MouseButton,
    /// X coordinate (0-indexed)
    pub x: u16,
    /// Y coordinate (0-indexed)
    pub y: u16,
    /// Modifier keys state
    pub modifiers: Modifiers,
    /// Target element (filled by the caller or by `click`)
    pub component_index: Option<usize>,
}

impl MouseEvent {
    /// Create a new mouse event
    pub fn new(action: MouseAction, button: MouseButton, x: u16, y: u16) -> Self {
        Self {
            action,
            button,
            x,
            y,
            modifiers: Modifiers::default(),
            component_index: None,
        }
    }

    /// A left-button release at the origin targeting `index`.
    pub fn synthetic_click(index: usize) -> Self {
        Self {
            component_index: Some(index),
            ..Self::new(MouseAction::Up, MouseButton::Left, 0, 0)
        }
    }

    /// Whether this event completes a left click.
    pub fn is_click(&self) -> bool {
        self.action == MouseAction::Up && self.button == MouseButton::Left
    }
}

/// Handler for click events. Returned flags control default and bubbling.
pub type ClickHandler = Rc<dyn Fn(&MouseEvent) -> EventFlags>;

// =============================================================================
// REACTIVE STATE
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<MouseEvent>> = signal(None);
}

/// Get the last mouse event
pub fn last_event() -> Option<MouseEvent> {
    LAST_EVENT.with(|s| s.get())
}

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

#[derive(Default)]
struct HandlerRegistry {
    click_handlers: HashMap<usize, Vec<(usize, ClickHandler)>>,
    next_id: usize,
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::default());
}

fn click_handlers(index: usize) -> Vec<ClickHandler> {
    REGISTRY.with(|reg| {
        reg.borrow()
            .click_handlers
            .get(&index)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    })
}

/// Attach a click listener to an element. Returns cleanup function.
pub fn on_click<F>(index: usize, handler: F) -> impl FnOnce()
where
    F: Fn(&MouseEvent) -> EventFlags + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.click_handlers
            .entry(index)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.click_handlers.get_mut(&index) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.click_handlers.remove(&index);
                }
            }
        });
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Deliver a pointer event. Only clicks with a target reach handlers.
pub fn dispatch(event: MouseEvent) -> EventFlags {
    LAST_EVENT.with(|s| s.set(Some(event.clone())));

    let Some(target) = event.component_index else {
        return EventFlags::NONE;
    };
    if !event.is_click() {
        return EventFlags::NONE;
    }

    let mut flags = EventFlags::NONE;
    let mut current = Some(target);
    while let Some(index) = current {
        for handler in click_handlers(index) {
            flags |= handler(&event);
        }
        if flags.propagation_stopped() {
            break;
        }
        current = get_parent_index(index);
    }
    flags
}

/// Synthetic activation of an element.
pub fn click(index: usize) -> EventFlags {
    dispatch(MouseEvent::synthetic_click(index))
}

/// Whether an element has any click listener attached.
pub fn has_listeners(index: usize) -> bool {
    REGISTRY.with(|reg| reg.borrow().click_handlers.contains_key(&index))
}

/// Clean up all handlers for an element index.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().click_handlers.remove(&index);
    });
}

/// Reset mouse state (for testing)
pub fn reset_mouse_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = HandlerRegistry::default());
    LAST_EVENT.with(|s| s.set(None));
}

// =============================================================================
// TESTS
// =============================================================================
