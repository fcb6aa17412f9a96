//! Simple List - Keyboard-navigable, single-selection list editor.
//!
//! Renders a container with one element per item and a trailing add input,
//! and exposes three named bindings to the host:
//!
//! - `unselect_all` - clear the selection (the add input's click handler)
//! - `select_item` - select the clicked item
//! - `keyactions` - item-key navigation (left/right/tab/delete/backspace)
//!
//! plus the `simplelist` binder, which attaches the add input's keydown
//! listener (commit on enter/tab, select-last on delete/backspace/left).
//!
//! Every mutation reads a fresh copy of the list from the [`Observer`],
//! mutates it, writes it back, and re-renders before focus moves.
//!
//! # Example
//!
//! ```ignore
//! use spark_list::primitives::{SimpleList, SimpleListProps};
//! use spark_signals::signal;
//!
//! let tags = signal(vec![Item::new("rust"), Item::new("tui")]);
//! let list = SimpleList::mount(
//!     SimpleListProps { name: "tags".into(), ..Default::default() },
//!     Rc::new(tags.clone()),
//! );
//!
//! keyboard::dispatch(KeyboardEvent::new("ArrowLeft"));
//! list.unmount();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use super::template::{
    ItemView, ListTemplate, ListView, BINDER_NAME, CONTAINER_CLASS, INPUT_CLASS, ITEM_CLASS,
    SELECTED_CLASS,
};
use super::types::{Cleanup, CloseCallback, SimpleListProps};
use crate::engine::{
    allocate_index, find, find_all, get_data_field, get_placeholder, get_state, get_text,
    move_before, next_sibling, on_destroy, pop_parent_context, previous_sibling,
    push_parent_context, release_index, set_class, set_data_field, set_focusable,
    set_placeholder, set_state, set_text,
};
use crate::list::{ingest, navigation, store, CommitOutcome, FocusTarget, KeyAction, Observer};
use crate::state::keyboard::{self, keycode, KeyboardEvent};
use crate::state::{focus, mouse};
use crate::types::{EventFlags, Item, ItemState};

// =============================================================================
// Bindings
// =============================================================================

/// A host-invocable event-handler binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    UnselectAll,
    SelectItem(usize),
    KeyActions(usize, KeyboardEvent),
}

impl Binding {
    /// Name the template refers to this binding by.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UnselectAll => "unselect_all",
            Self::SelectItem(_) => "select_item",
            Self::KeyActions(..) => "keyactions",
        }
    }
}

/// A named two-way binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binder {
    pub name: &'static str,
    /// Whether the widget writes values back to the store.
    pub publishes: bool,
}

pub const SIMPLELIST_BINDER: Binder = Binder {
    name: BINDER_NAME,
    publishes: true,
};

// =============================================================================
// Widget
// =============================================================================

/// A mounted list editor. Cloning yields another handle to the same widget.
#[derive(Clone)]
pub struct SimpleList {
    inner: Rc<ListInner>,
}

struct ListInner {
    this: Weak<ListInner>,
    name: String,
    placeholder: String,
    min: Option<usize>,
    max: Option<usize>,
    on_close: Option<CloseCallback>,
    observer: Rc<dyn Observer>,
    container: usize,
    input: usize,
    buffer: Signal<String>,
    /// Rendered item elements, in item order.
    items: RefCell<Vec<usize>>,
    input_listener: RefCell<Option<Cleanup>>,
    mounted: Cell<bool>,
}

impl SimpleList {
    /// Mount a list editor under the current parent context.
    ///
    /// Elements are created for the observer's current items, then the
    /// binder attaches the add input's listener.
    pub fn mount(props: SimpleListProps, observer: Rc<dyn Observer>) -> Self {
        let container = allocate_index(props.id.as_deref());
        set_class(container, CONTAINER_CLASS);
        set_data_field(container, &props.name);

        push_parent_context(container);
        let input = allocate_index(None);
        pop_parent_context();

        set_class(input, INPUT_CLASS);
        set_focusable(input, true);
        set_placeholder(input, Some(&props.placeholder));

        let inner = Rc::new_cyclic(|this| ListInner {
            this: this.clone(),
            name: props.name,
            placeholder: props.placeholder,
            min: props.min,
            max: props.max,
            on_close: props.on_close,
            observer,
            container,
            input,
            buffer: signal(String::new()),
            items: RefCell::new(Vec::new()),
            input_listener: RefCell::new(None),
            mounted: Cell::new(true),
        });

        let weak = Rc::downgrade(&inner);
        on_destroy(
            input,
            mouse::on_click(input, move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.unselect_all();
                    focus::focus(inner.input);
                }
                EventFlags::NONE
            }),
        );

        log::debug!("mounted list '{}' at element {}", inner.name, container);

        let list = Self { inner };
        list.inner.render();
        list.bind();
        list
    }

    /// Run the `simplelist` binder: attach the add input's keydown listener.
    ///
    /// Binding twice is a no-op.
    pub fn bind(&self) {
        if self.inner.input_listener.borrow().is_some() || !self.inner.mounted.get() {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let cleanup = keyboard::on_keydown(self.inner.input, move |event| {
            weak.upgrade()
                .map(|inner| inner.input_keydown(event))
                .unwrap_or_default()
        });
        *self.inner.input_listener.borrow_mut() = Some(Box::new(cleanup));
    }

    /// Detach the add input's keydown listener.
    pub fn unbind(&self) {
        let cleanup = self.inner.input_listener.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }

    /// Release every element. Every handle becomes inert: the released
    /// indices may be reused by the next mount.
    pub fn unmount(self) {
        if !self.inner.mounted.replace(false) {
            return;
        }
        self.unbind();
        self.inner.items.borrow_mut().clear();
        release_index(self.inner.container);
        log::debug!("unmounted list '{}'", self.inner.name);
    }

    // -------------------------------------------------------------------------
    // Bindings
    // -------------------------------------------------------------------------

    /// Invoke a named binding.
    pub fn invoke(&self, binding: Binding) -> EventFlags {
        log::trace!("list '{}': {}", self.inner.name, binding.name());
        match binding {
            Binding::UnselectAll => {
                self.inner.unselect_all();
                EventFlags::NONE
            }
            Binding::SelectItem(index) => {
                self.inner.select_item(index);
                EventFlags::NONE
            }
            Binding::KeyActions(index, event) => self.inner.keyactions(index, &event),
        }
    }

    /// Clear the selection.
    pub fn unselect_all(&self) {
        self.inner.unselect_all();
    }

    /// Select the item at `index`. Out-of-range indices are ignored.
    pub fn select_item(&self, index: usize) {
        self.inner.select_item(index);
    }

    /// Run item-key navigation as if `event` was pressed on item `index`.
    pub fn keyactions(&self, index: usize, event: &KeyboardEvent) -> EventFlags {
        self.inner.keyactions(index, event)
    }

    /// Write `items` to the store on the widget's behalf and re-render.
    pub fn publish(&self, items: Vec<Item>) {
        if self.inner.is_mounted() {
            self.inner.write(items);
        }
    }

    /// Re-render from the store after the host changed it.
    pub fn sync(&self) {
        self.inner.render();
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn container(&self) -> usize {
        self.inner.container
    }

    pub fn input(&self) -> usize {
        self.inner.input
    }

    /// Rendered item elements, in item order.
    pub fn item_elements(&self) -> Vec<usize> {
        self.inner.items.borrow().clone()
    }

    pub fn item_element(&self, index: usize) -> Option<usize> {
        self.inner.items.borrow().get(index).copied()
    }

    /// Text typed into the add input.
    pub fn input_value(&self) -> String {
        self.inner.buffer.get()
    }

    pub fn set_input_value(&self, text: impl Into<String>) {
        if !self.inner.is_mounted() {
            return;
        }
        let text = text.into();
        set_text(self.inner.input, &text);
        self.inner.buffer.set(text);
    }

    /// The buffer signal, for hosts that track it.
    pub fn input_signal(&self) -> Signal<String> {
        self.inner.buffer.clone()
    }

    /// Snapshot of what is on screen.
    pub fn view(&self) -> ListView {
        let items = self
            .inner
            .items
            .borrow()
            .iter()
            .map(|&element| {
                let mut state = get_state(element);
                if focus::is_focused(element) {
                    state |= ItemState::FOCUSED;
                }
                ItemView {
                    text: get_text(element),
                    state,
                }
            })
            .collect();
        ListView {
            name: get_data_field(self.inner.container).unwrap_or_else(|| self.inner.name.clone()),
            items,
            input: self.inner.buffer.get(),
            placeholder: get_placeholder(self.inner.input).unwrap_or_default(),
            input_focused: focus::is_focused(self.inner.input),
        }
    }

    /// Rendered markup of the current state.
    pub fn markup(&self) -> String {
        self.view().markup()
    }

    /// The declarative template for this widget.
    pub fn template(&self) -> ListTemplate {
        ListTemplate::new(self.inner.name.clone(), self.inner.placeholder.clone())
    }
}

impl ListInner {
    // =========================================================================
    // Store access
    // =========================================================================

    fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    fn write(&self, items: Vec<Item>) {
        self.observer.set_value(items);
        self.render();
    }

    fn unselect_all(&self) {
        if !self.is_mounted() {
            return;
        }
        let mut items = self.observer.value();
        store::unselect_all(&mut items);
        self.write(items);
    }

    fn select_item(&self, index: usize) {
        if !self.is_mounted() {
            return;
        }
        let mut items = self.observer.value();
        if index >= items.len() {
            log::warn!(
                "list '{}': select_item({index}) outside list of {}",
                self.name,
                items.len()
            );
            return;
        }
        store::select_item(&mut items, index);
        self.write(items);
    }

    // =========================================================================
    // Item keys
    // =========================================================================

    fn keyactions(&self, index: usize, event: &KeyboardEvent) -> EventFlags {
        let action = KeyAction::for_item(keycode(event));
        if action == KeyAction::Ignore || !self.is_mounted() {
            return EventFlags::NONE;
        }

        let mut items = self.observer.value();
        if index >= items.len() {
            return EventFlags::NONE;
        }
        if action == KeyAction::DeleteItem && self.min.is_some_and(|min| items.len() <= min) {
            log::debug!("list '{}': delete blocked at minimum", self.name);
            return EventFlags::PREVENT_DEFAULT;
        }

        let transition = navigation::decide(action, index, items.len());
        log::debug!(
            "list '{}': {:?} on item {} -> {:?}",
            self.name,
            action,
            index,
            transition
        );

        // Resolved before mutating: a removed element has no siblings
        let element = self.items.borrow().get(index).copied();
        let target = match transition.focus {
            FocusTarget::Unchanged => None,
            FocusTarget::Item(to) if to < index => element.and_then(previous_sibling),
            FocusTarget::Item(_) => element.and_then(next_sibling),
            FocusTarget::Input => find(self.container, INPUT_CLASS),
        };

        if transition.mutates() {
            navigation::apply(&mut items, &transition);
            self.observer.set_value(items);
            if let Some(removed) = transition.remove {
                self.release_item_element(removed);
            }
            self.render();
        }

        if let Some(target) = target {
            focus::focus(target);
            if transition.activate {
                mouse::click(target);
            }
        }

        transition.flags
    }

    // =========================================================================
    // Input keys
    // =========================================================================

    fn input_keydown(&self, event: &KeyboardEvent) -> EventFlags {
        if !self.is_mounted() {
            return EventFlags::NONE;
        }
        let key = keycode(event);
        match KeyAction::for_input(key) {
            KeyAction::Commit => {
                self.commit();
                EventFlags::PREVENT_DEFAULT
            }
            KeyAction::SelectLast if self.select_last() => EventFlags::PREVENT_DEFAULT,
            _ => {
                // Default action: plain text editing
                let mut buffer = self.buffer.get();
                if ingest::edit_buffer(&mut buffer, &event.key, event.printable()) {
                    set_text(self.input, &buffer);
                    self.buffer.set(buffer);
                }
                EventFlags::NONE
            }
        }
    }

    fn commit(&self) {
        if !self.is_mounted() {
            return;
        }
        let buffer = self.buffer.get();
        let mut items = self.observer.value();
        match ingest::commit(&buffer, items.len(), self.max) {
            CommitOutcome::Insert(item) => {
                log::debug!("list '{}': add '{}'", self.name, item.text);
                store::insert(&mut items, item);
                set_text(self.input, "");
                self.buffer.set(String::new());
                self.write(items);
            }
            CommitOutcome::Close => {
                log::debug!("list '{}': close", self.name);
                if focus::is_focused(self.input) {
                    focus::blur();
                }
                if let Some(on_close) = &self.on_close {
                    on_close();
                }
            }
            CommitOutcome::Full => {
                log::debug!("list '{}': full at {} items", self.name, items.len());
            }
        }
    }

    /// Returns whether an item was selected.
    fn select_last(&self) -> bool {
        if !self.is_mounted() {
            return false;
        }
        let mut items = self.observer.value();
        let Some(last) = ingest::select_last(&self.buffer.get(), items.len()) else {
            return false;
        };
        store::select_item(&mut items, last);
        self.write(items);
        if let Some(element) = previous_sibling(self.input) {
            focus::focus(element);
        }
        true
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn release_item_element(&self, index: usize) {
        let element = {
            let mut items = self.items.borrow_mut();
            (index < items.len()).then(|| items.remove(index))
        };
        if let Some(element) = element {
            release_index(element);
        }
    }

    /// Reconcile item elements with the store, one element per item.
    fn render(&self) {
        if !self.is_mounted() {
            return;
        }
        let items = self.observer.value();

        let surplus: Vec<usize> = {
            let mut elements = self.items.borrow_mut();
            let keep = items.len().min(elements.len());
            elements.drain(keep..).collect()
        };
        for element in surplus {
            release_index(element);
        }

        while self.items.borrow().len() < items.len() {
            let element = self.create_item_element();
            self.items.borrow_mut().push(element);
        }

        for (element, item) in self.items.borrow().iter().zip(&items) {
            set_text(*element, &item.text);
            if item.selected {
                set_class(*element, &format!("{ITEM_CLASS} {SELECTED_CLASS}"));
                set_state(*element, ItemState::SELECTED);
            } else {
                set_class(*element, ITEM_CLASS);
                set_state(*element, ItemState::NONE);
            }
        }
    }

    fn create_item_element(&self) -> usize {
        push_parent_context(self.container);
        let element = allocate_index(None);
        pop_parent_context();

        set_class(element, ITEM_CLASS);
        set_focusable(element, true);
        move_before(element, self.input);

        let weak = self.item_ref(element);
        on_destroy(
            element,
            mouse::on_click(element, move |_| {
                if let Some((inner, position)) = weak.resolve() {
                    inner.select_item(position);
                    focus::focus(element);
                }
                EventFlags::NONE
            }),
        );

        let weak = self.item_ref(element);
        on_destroy(
            element,
            keyboard::on_keydown(element, move |event| {
                weak.resolve()
                    .map(|(inner, position)| inner.keyactions(position, event))
                    .unwrap_or_default()
            }),
        );

        element
    }

    fn item_ref(&self, element: usize) -> ItemRef {
        ItemRef {
            container: self.container,
            element,
            inner: self.this.clone(),
        }
    }
}

// =============================================================================
// Handler back-references
// =============================================================================

/// An item element's handle back to its widget.
struct ItemRef {
    container: usize,
    element: usize,
    inner: Weak<ListInner>,
}

impl ItemRef {
    /// The widget and the element's current item position.
    ///
    /// The position is looked up at event time from the container's rendered
    /// items, so it always indexes the sequence being navigated.
    fn resolve(&self) -> Option<(Rc<ListInner>, usize)> {
        let inner = self.inner.upgrade()?;
        let position = find_all(self.container, ITEM_CLASS)
            .iter()
            .position(|&e| e == self.element)?;
        Some((inner, position))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{children, get_allocated_count, get_class, reset_registry};
    use crate::state::focus::reset_focus_state;
    use crate::state::keyboard::reset_keyboard_state;
    use crate::state::mouse::reset_mouse_state;

    fn setup() {
        reset_registry();
        reset_focus_state();
        reset_keyboard_state();
        reset_mouse_state();
    }

    fn mount(texts: &[&str]) -> (SimpleList, Signal<Vec<Item>>) {
        let items = signal(texts.iter().map(|t| Item::new(*t)).collect::<Vec<_>>());
        let list = SimpleList::mount(
            SimpleListProps {
                name: "tags".into(),
                ..Default::default()
            },
            Rc::new(items.clone()),
        );
        (list, items)
    }

    #[test]
    fn test_mount_renders_items_before_input() {
        setup();
        let (list, _) = mount(&["a", "b"]);

        let kids = children(list.container());
        assert_eq!(kids.len(), 3);
        assert_eq!(kids[2], list.input());
        assert_eq!(&kids[..2], list.item_elements().as_slice());
        assert_eq!(get_text(kids[0]), "a");
        assert_eq!(get_class(list.input()), INPUT_CLASS);
    }

    #[test]
    fn test_render_tracks_selection() {
        setup();
        let (list, items) = mount(&["a", "b"]);

        list.select_item(1);
        assert!(items.get()[1].selected);
        assert_eq!(get_class(list.item_elements()[1]), "simple-list-item selected");
        assert_eq!(get_state(list.item_elements()[1]), ItemState::SELECTED);

        list.unselect_all();
        assert_eq!(get_state(list.item_elements()[1]), ItemState::NONE);
    }

    #[test]
    fn test_select_item_out_of_range_is_ignored() {
        setup();
        let (list, items) = mount(&["a"]);
        list.select_item(5);
        assert!(!items.get()[0].selected);
    }

    #[test]
    fn test_bind_is_idempotent() {
        setup();
        let (list, items) = mount(&[]);
        list.bind();

        keyboard::dispatch_to(list.input(), KeyboardEvent::new("y"));
        assert_eq!(list.input_value(), "y");
        keyboard::dispatch_to(list.input(), KeyboardEvent::new("Enter"));
        assert_eq!(items.get(), vec![Item::new("y")]);
    }

    #[test]
    fn test_unmount_releases_everything() {
        setup();
        let (list, _) = mount(&["a", "b"]);
        let handle = list.clone();
        list.unmount();

        assert_eq!(get_allocated_count(), 0);
        assert!(!keyboard::has_listeners(handle.input()));
        // Inert after unmount
        handle.sync();
        assert!(handle.item_elements().is_empty());
    }

    #[test]
    fn test_binding_names() {
        assert_eq!(Binding::UnselectAll.name(), "unselect_all");
        assert_eq!(Binding::SelectItem(0).name(), "select_item");
        assert_eq!(
            Binding::KeyActions(0, KeyboardEvent::new("Tab")).name(),
            "keyactions"
        );
        assert!(SIMPLELIST_BINDER.publishes);
    }
}
