//! Keyboard Module - Keyboard event state, key classification, keydown listeners
//!
//! State and handler registry for keyboard events.
//! Does NOT own stdin (that is the input module).
//!
//! # API
//!
//! - `last_event` - Get last keyboard event
//! - `last_key` - Get last key pressed
//! - `keycode(event)` - Classify an event into a symbolic [`Key`]
//! - `on(handler)` - Subscribe to all keyboard events (after bubbling)
//! - `on_keydown(i, fn)` - Keydown listener on element i
//! - `dispatch(event)` - Deliver to the focused element, bubbling to ancestors
//!
//! # Example
//!
//! ```ignore
//! use spark_list::state::keyboard;
//!
//! let cleanup = keyboard::on_keydown(item_index, |event| {
//!     match keyboard::keycode(event) {
//!         Some(Key::Left) => EventFlags::PREVENT_DEFAULT,
//!         _ => EventFlags::NONE,
//!     }
//! });
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::engine::get_parent_index;
use crate::state::focus;
use crate::types::EventFlags;

// =============================================================================
// TYPES
// =============================================================================

/// Keyboard modifier state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Create empty modifiers
    pub fn none() -> Self {
        Self::default()
    }

    /// Create modifiers with ctrl
    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    /// Create modifiers with shift
    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "a", "Enter", "ArrowLeft")
    pub key: String,
    /// Modifier keys state
    pub modifiers: Modifiers,
    /// Press/repeat/release state
    pub state: KeyState,
    /// Raw escape sequence (if available)
    pub raw: Option<String>,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
            raw: None,
        }
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
            raw: None,
        }
    }

    /// Check if this is a press event
    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }

    /// The typed character, for single-character keys without ctrl/alt.
    pub fn printable(&self) -> Option<char> {
        if self.modifiers.ctrl || self.modifiers.alt {
            return None;
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

// =============================================================================
// KEY CLASSIFICATION
// =============================================================================

/// Symbolic key names the list editor reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Tab,
    Delete,
    Backspace,
    Enter,
}

/// Map a raw keyboard event to a symbolic key, or None for everything else.
///
/// Modifiers are ignored: Shift+Tab still classifies as [`Key::Tab`].
pub fn keycode(event: &KeyboardEvent) -> Option<Key> {
    match event.key.as_str() {
        "ArrowLeft" | "Left" => Some(Key::Left),
        "ArrowRight" | "Right" => Some(Key::Right),
        "Tab" => Some(Key::Tab),
        "Delete" => Some(Key::Delete),
        "Backspace" => Some(Key::Backspace),
        "Enter" => Some(Key::Enter),
        _ => None,
    }
}

/// Handler for keyboard events. Returned flags control default and bubbling.
pub type KeyHandler = Rc<dyn Fn(&KeyboardEvent) -> EventFlags>;

// =============================================================================
// STATE
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<KeyboardEvent>> = signal(None);
}

/// Get the last keyboard event
pub fn last_event() -> Option<KeyboardEvent> {
    LAST_EVENT.with(|s| s.get())
}

/// Get the last key pressed
pub fn last_key() -> String {
    last_event().map(|e| e.key).unwrap_or_default()
}

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct HandlerRegistry {
    global_handlers: Vec<(usize, KeyHandler)>,
    element_handlers: HashMap<usize, Vec<(usize, KeyHandler)>>,
    next_id: usize,
}

impl HandlerRegistry {
    fn new() -> Self {
        Self {
            global_handlers: Vec::new(),
            element_handlers: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::new());
}

/// Snapshot the handlers of one element so they can run without holding the registry.
fn element_handlers(index: usize) -> Vec<KeyHandler> {
    REGISTRY.with(|reg| {
        reg.borrow()
            .element_handlers
            .get(&index)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    })
}

fn global_handlers() -> Vec<KeyHandler> {
    REGISTRY.with(|reg| reg.borrow().global_handlers.iter().map(|(_, h)| h.clone()).collect())
}

// =============================================================================
// EVENT DISPATCH
// =============================================================================

/// Dispatch a keyboard event to the focused element.
///
/// Returns the union of the flags every reached handler asked for.
pub fn dispatch(event: KeyboardEvent) -> EventFlags {
    match focus::focused() {
        Some(target) => dispatch_to(target, event),
        None => {
            LAST_EVENT.with(|s| s.set(Some(event.clone())));
            if !event.is_press() {
                return EventFlags::NONE;
            }
            run_global(&event, EventFlags::NONE)
        }
    }
}

/// Dispatch a keyboard event as if `target` had focus.
///
/// Handlers on `target` run first, then on each ancestor, then global
/// handlers. `STOP_PROPAGATION` ends the walk after the current element.
pub fn dispatch_to(target: usize, event: KeyboardEvent) -> EventFlags {
    LAST_EVENT.with(|s| s.set(Some(event.clone())));

    // Only press events reach handlers
    if !event.is_press() {
        return EventFlags::NONE;
    }

    let mut flags = EventFlags::NONE;
    let mut current = Some(target);
    while let Some(index) = current {
        for handler in element_handlers(index) {
            flags |= handler(&event);
        }
        if flags.propagation_stopped() {
            return flags;
        }
        current = get_parent_index(index);
    }

    run_global(&event, flags)
}

fn run_global(event: &KeyboardEvent, mut flags: EventFlags) -> EventFlags {
    for handler in global_handlers() {
        flags |= handler(event);
        if flags.propagation_stopped() {
            break;
        }
    }
    flags
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to all keyboard events that bubble past every element.
/// Returns cleanup function.
pub fn on<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> EventFlags + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.global_handlers.push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            reg.global_handlers.retain(|(handler_id, _)| *handler_id != id);
        });
    }
}

/// Attach a keydown listener to an element.
/// Returns cleanup function.
pub fn on_keydown<F>(index: usize, handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> EventFlags + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.element_handlers
            .entry(index)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.element_handlers.get_mut(&index) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.element_handlers.remove(&index);
                }
            }
        });
    }
}

/// Whether an element has any keydown listener attached.
pub fn has_listeners(index: usize) -> bool {
    REGISTRY.with(|reg| reg.borrow().element_handlers.contains_key(&index))
}

/// Clean up all handlers for an element index.
/// Called when the element is released.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().element_handlers.remove(&index);
    });
}

/// Reset keyboard state (for testing)
pub fn reset_keyboard_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = HandlerRegistry::new());
    LAST_EVENT.with(|s| s.set(None));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        allocate_index, pop_parent_context, push_parent_context, reset_registry, set_focusable,
    };
    use crate::state::focus::reset_focus_state;
    use std::cell::Cell;

    fn setup() {
        reset_registry();
        reset_focus_state();
        reset_keyboard_state();
    }

    /// `parent > child`, child focusable.
    fn pair() -> (usize, usize) {
        let parent = allocate_index(None);
        push_parent_context(parent);
        let child = allocate_index(None);
        pop_parent_context();
        set_focusable(child, true);
        (parent, child)
    }

    fn counter() -> (Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let c = Rc::new(Cell::new(0));
        (c.clone(), c)
    }

    #[test]
    fn test_initial_state() {
        setup();
        assert!(last_event().is_none());
        assert_eq!(last_key(), "");
    }

    #[test]
    fn test_keycode_classification() {
        assert_eq!(keycode(&KeyboardEvent::new("ArrowLeft")), Some(Key::Left));
        assert_eq!(keycode(&KeyboardEvent::new("ArrowRight")), Some(Key::Right));
        assert_eq!(keycode(&KeyboardEvent::new("Tab")), Some(Key::Tab));
        assert_eq!(
            keycode(&KeyboardEvent::with_modifiers("Tab", Modifiers::shift())),
            Some(Key::Tab)
        );
        assert_eq!(keycode(&KeyboardEvent::new("Delete")), Some(Key::Delete));
        assert_eq!(keycode(&KeyboardEvent::new("Backspace")), Some(Key::Backspace));
        assert_eq!(keycode(&KeyboardEvent::new("Enter")), Some(Key::Enter));
        assert_eq!(keycode(&KeyboardEvent::new("ArrowUp")), None);
        assert_eq!(keycode(&KeyboardEvent::new("a")), None);
    }

    #[test]
    fn test_printable() {
        assert_eq!(KeyboardEvent::new("a").printable(), Some('a'));
        assert_eq!(KeyboardEvent::new(" ").printable(), Some(' '));
        assert_eq!(KeyboardEvent::new("Enter").printable(), None);
        assert_eq!(KeyboardEvent::with_modifiers("c", Modifiers::ctrl()).printable(), None);
    }

    #[test]
    fn test_dispatch_reaches_focused_element() {
        setup();
        let (_parent, child) = pair();
        let (count, probe) = counter();

        let cleanup = on_keydown(child, move |_| {
            count.set(count.get() + 1);
            EventFlags::NONE
        });

        // Nothing focused: element handler not reached
        dispatch(KeyboardEvent::new("a"));
        assert_eq!(probe.get(), 0);

        focus::focus(child);
        dispatch(KeyboardEvent::new("a"));
        assert_eq!(probe.get(), 1);
        assert_eq!(last_key(), "a");

        cleanup();
        dispatch(KeyboardEvent::new("a"));
        assert_eq!(probe.get(), 1);
    }

    #[test]
    fn test_bubbles_to_parent_and_global() {
        setup();
        let (parent, child) = pair();
        let (parent_count, parent_probe) = counter();
        let (global_count, global_probe) = counter();

        let _c1 = on_keydown(child, |_| EventFlags::PREVENT_DEFAULT);
        let _c2 = on_keydown(parent, move |_| {
            parent_count.set(parent_count.get() + 1);
            EventFlags::NONE
        });
        let _c3 = on(move |_| {
            global_count.set(global_count.get() + 1);
            EventFlags::NONE
        });

        let flags = dispatch_to(child, KeyboardEvent::new("Tab"));
        assert!(flags.default_prevented());
        assert_eq!(parent_probe.get(), 1);
        assert_eq!(global_probe.get(), 1);
    }

    #[test]
    fn test_stop_propagation() {
        setup();
        let (parent, child) = pair();
        let (parent_count, parent_probe) = counter();

        let _c1 = on_keydown(child, |_| EventFlags::PREVENT_DEFAULT | EventFlags::STOP_PROPAGATION);
        let _c2 = on_keydown(parent, move |_| {
            parent_count.set(parent_count.get() + 1);
            EventFlags::NONE
        });

        let flags = dispatch_to(child, KeyboardEvent::new("Tab"));
        assert!(flags.propagation_stopped());
        assert_eq!(parent_probe.get(), 0);
    }

    #[test]
    fn test_handler_may_register_handlers() {
        setup();
        let (_parent, child) = pair();

        let _c = on_keydown(child, move |_| {
            // Re-entrant registration must not double-borrow the registry
            let cleanup = on_keydown(child, |_| EventFlags::NONE);
            cleanup();
            EventFlags::NONE
        });

        dispatch_to(child, KeyboardEvent::new("x"));
        assert!(has_listeners(child));
    }

    #[test]
    fn test_only_press_dispatched() {
        setup();
        let (_parent, child) = pair();
        let (count, probe) = counter();

        let _c = on_keydown(child, move |_| {
            count.set(count.get() + 1);
            EventFlags::NONE
        });

        let mut event = KeyboardEvent::new("a");
        dispatch_to(child, event.clone());
        event.state = KeyState::Repeat;
        dispatch_to(child, event.clone());
        event.state = KeyState::Release;
        dispatch_to(child, event);
        assert_eq!(probe.get(), 1);
    }

    #[test]
    fn test_cleanup_index() {
        setup();
        let (_parent, child) = pair();
        let _c = on_keydown(child, |_| EventFlags::NONE);
        assert!(has_listeners(child));

        cleanup_index(child);
        assert!(!has_listeners(child));
    }
}
