//! Element Registry - Index allocation and the element tree.
//!
//! Manages the lifecycle of element indices:
//! - ID ↔ Index bidirectional mapping
//! - Free index pool for O(1) reuse
//! - Parent context stack for nested element creation
//! - Child order per parent (source order, sibling lookup)
//! - Scoped lookup by class (`find`, `find_all`)

use std::cell::RefCell;
use std::collections::HashMap;

use crate::state::{focus, keyboard, mouse};
use crate::types::ItemState;

// =============================================================================
// Element Node
// =============================================================================

/// Everything the host knows about one element.
#[derive(Debug, Clone, Default)]
struct ElementNode {
    class: String,
    parent: Option<usize>,
    children: Vec<usize>,
    focusable: bool,
    text: String,
    placeholder: Option<String>,
    data_field: Option<String>,
    state: ItemState,
}

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// Map element ID to index.
    static ID_TO_INDEX: RefCell<HashMap<String, usize>> = RefCell::new(HashMap::new());

    /// Map index to element ID.
    static INDEX_TO_ID: RefCell<HashMap<usize, String>> = RefCell::new(HashMap::new());

    /// Live elements by index.
    static ELEMENTS: RefCell<HashMap<usize, ElementNode>> = RefCell::new(HashMap::new());

    /// Pool of freed indices for reuse.
    static FREE_INDICES: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };

    /// Next index to allocate if pool is empty.
    static NEXT_INDEX: RefCell<usize> = const { RefCell::new(0) };

    /// Counter for generating unique IDs.
    static ID_COUNTER: RefCell<usize> = const { RefCell::new(0) };

    /// Stack of parent indices for nested element creation.
    static PARENT_STACK: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };

    /// Destroy callbacks registered per index.
    static DESTROY_CALLBACKS: RefCell<HashMap<usize, Vec<Box<dyn FnOnce()>>>> = RefCell::new(HashMap::new());
}

// =============================================================================
// Parent Context Stack
// =============================================================================

/// Get current parent index (None if at root).
pub fn get_current_parent_index() -> Option<usize> {
    PARENT_STACK.with(|stack| stack.borrow().last().copied())
}

/// Push a parent index onto the stack.
pub fn push_parent_context(index: usize) {
    PARENT_STACK.with(|stack| stack.borrow_mut().push(index));
}

/// Pop a parent index from the stack.
pub fn pop_parent_context() {
    PARENT_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

// =============================================================================
// Index Allocation
// =============================================================================

/// Allocate an index for a new element.
///
/// The element is appended to the children of the current parent context.
///
/// # Arguments
/// * `id` - Optional element ID. If not provided, one is generated.
///
/// # Returns
/// The allocated index. An already-registered ID returns its existing index.
pub fn allocate_index(id: Option<&str>) -> usize {
    let element_id = match id {
        Some(id) => id.to_string(),
        None => ID_COUNTER.with(|counter| {
            let mut counter = counter.borrow_mut();
            let id = format!("e{}", *counter);
            *counter += 1;
            id
        }),
    };

    if let Some(index) = get_index(&element_id) {
        return index;
    }

    let index = FREE_INDICES.with(|free| {
        free.borrow_mut().pop().unwrap_or_else(|| {
            NEXT_INDEX.with(|next| {
                let mut next = next.borrow_mut();
                let index = *next;
                *next += 1;
                index
            })
        })
    });

    ID_TO_INDEX.with(|map| {
        map.borrow_mut().insert(element_id.clone(), index);
    });
    INDEX_TO_ID.with(|map| {
        map.borrow_mut().insert(index, element_id);
    });

    let parent = get_current_parent_index();
    ELEMENTS.with(|elements| {
        let mut elements = elements.borrow_mut();
        elements.insert(
            index,
            ElementNode {
                parent,
                ..ElementNode::default()
            },
        );
        if let Some(parent) = parent {
            if let Some(node) = elements.get_mut(&parent) {
                node.children.push(index);
            }
        }
    });

    index
}

/// Release an index back to the pool.
///
/// Also recursively releases all children, drops their handlers, and clears
/// focus if a released element held it.
pub fn release_index(index: usize) {
    if !is_allocated(index) {
        return;
    }

    for child in children(index) {
        release_index(child);
    }

    run_destroy_callbacks(index);

    keyboard::cleanup_index(index);
    mouse::cleanup_index(index);
    if focus::is_focused(index) {
        focus::blur();
    }

    ELEMENTS.with(|elements| {
        let mut elements = elements.borrow_mut();
        if let Some(node) = elements.remove(&index) {
            if let Some(parent) = node.parent.and_then(|p| elements.get_mut(&p)) {
                parent.children.retain(|&c| c != index);
            }
        }
    });

    if let Some(id) = INDEX_TO_ID.with(|map| map.borrow_mut().remove(&index)) {
        ID_TO_INDEX.with(|map| {
            map.borrow_mut().remove(&id);
        });
    }

    FREE_INDICES.with(|free| free.borrow_mut().push(index));

    // All elements gone: start numbering from zero again
    if ELEMENTS.with(|elements| elements.borrow().is_empty()) {
        FREE_INDICES.with(|free| free.borrow_mut().clear());
        NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    }
}

// =============================================================================
// Destroy Callbacks
// =============================================================================

/// Register a callback to run when the element at `index` is destroyed.
pub fn on_destroy(index: usize, callback: impl FnOnce() + 'static) {
    DESTROY_CALLBACKS.with(|callbacks| {
        callbacks
            .borrow_mut()
            .entry(index)
            .or_default()
            .push(Box::new(callback));
    });
}

fn run_destroy_callbacks(index: usize) {
    let callbacks = DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().remove(&index));
    if let Some(callbacks) = callbacks {
        for callback in callbacks {
            callback();
        }
    }
}

// =============================================================================
// Element Properties
// =============================================================================

fn with_node<R>(index: usize, f: impl FnOnce(&ElementNode) -> R) -> Option<R> {
    ELEMENTS.with(|elements| elements.borrow().get(&index).map(f))
}

fn with_node_mut(index: usize, f: impl FnOnce(&mut ElementNode)) {
    ELEMENTS.with(|elements| {
        if let Some(node) = elements.borrow_mut().get_mut(&index) {
            f(node);
        }
    });
}

pub fn set_class(index: usize, class: &str) {
    with_node_mut(index, |n| n.class = class.to_string());
}

pub fn get_class(index: usize) -> String {
    with_node(index, |n| n.class.clone()).unwrap_or_default()
}

/// Whether the element's class list contains `class`.
pub fn has_class(index: usize, class: &str) -> bool {
    with_node(index, |n| n.class.split_whitespace().any(|c| c == class)).unwrap_or(false)
}

pub fn set_focusable(index: usize, focusable: bool) {
    with_node_mut(index, |n| n.focusable = focusable);
}

pub fn get_focusable(index: usize) -> bool {
    with_node(index, |n| n.focusable).unwrap_or(false)
}

pub fn set_text(index: usize, text: &str) {
    with_node_mut(index, |n| n.text = text.to_string());
}

pub fn get_text(index: usize) -> String {
    with_node(index, |n| n.text.clone()).unwrap_or_default()
}

pub fn set_placeholder(index: usize, placeholder: Option<&str>) {
    with_node_mut(index, |n| n.placeholder = placeholder.map(str::to_string));
}

pub fn get_placeholder(index: usize) -> Option<String> {
    with_node(index, |n| n.placeholder.clone()).flatten()
}

pub fn set_data_field(index: usize, field: &str) {
    with_node_mut(index, |n| n.data_field = Some(field.to_string()));
}

pub fn get_data_field(index: usize) -> Option<String> {
    with_node(index, |n| n.data_field.clone()).flatten()
}

pub fn set_state(index: usize, state: ItemState) {
    with_node_mut(index, |n| n.state = state);
}

pub fn get_state(index: usize) -> ItemState {
    with_node(index, |n| n.state).unwrap_or_default()
}

// =============================================================================
// Tree Queries
// =============================================================================

/// Parent of an element (None for roots and unknown indices).
pub fn get_parent_index(index: usize) -> Option<usize> {
    with_node(index, |n| n.parent).flatten()
}

/// Children of an element in source order.
pub fn children(index: usize) -> Vec<usize> {
    with_node(index, |n| n.children.clone()).unwrap_or_default()
}

/// Move `index` so it sits immediately before `reference` under their shared parent.
pub fn move_before(index: usize, reference: usize) {
    let Some(parent) = get_parent_index(index) else { return };
    if get_parent_index(reference) != Some(parent) || index == reference {
        return;
    }
    with_node_mut(parent, |p| {
        p.children.retain(|&c| c != index);
        let at = p
            .children
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(p.children.len());
        p.children.insert(at, index);
    });
}

/// The element immediately preceding `index` in source order.
pub fn previous_sibling(index: usize) -> Option<usize> {
    let parent = get_parent_index(index)?;
    let siblings = children(parent);
    let pos = siblings.iter().position(|&c| c == index)?;
    pos.checked_sub(1).map(|p| siblings[p])
}

/// The element immediately following `index` in source order.
pub fn next_sibling(index: usize) -> Option<usize> {
    let parent = get_parent_index(index)?;
    let siblings = children(parent);
    let pos = siblings.iter().position(|&c| c == index)?;
    siblings.get(pos + 1).copied()
}

/// First descendant of `scope` (depth-first, source order) carrying `class`.
pub fn find(scope: usize, class: &str) -> Option<usize> {
    find_all(scope, class).into_iter().next()
}

/// All descendants of `scope` (depth-first, source order) carrying `class`.
pub fn find_all(scope: usize, class: &str) -> Vec<usize> {
    let mut found = Vec::new();
    let mut stack: Vec<usize> = children(scope).into_iter().rev().collect();
    while let Some(index) = stack.pop() {
        if has_class(index, class) {
            found.push(index);
        }
        stack.extend(children(index).into_iter().rev());
    }
    found
}

// =============================================================================
// Lookups
// =============================================================================

/// Get index for an element ID.
pub fn get_index(id: &str) -> Option<usize> {
    ID_TO_INDEX.with(|map| map.borrow().get(id).copied())
}

/// Get ID for an index.
pub fn get_id(index: usize) -> Option<String> {
    INDEX_TO_ID.with(|map| map.borrow().get(&index).cloned())
}

/// Get all currently allocated indices, ascending.
pub fn get_allocated_indices() -> Vec<usize> {
    let mut indices: Vec<usize> = ELEMENTS.with(|elements| elements.borrow().keys().copied().collect());
    indices.sort_unstable();
    indices
}

/// Check if an index is currently allocated.
pub fn is_allocated(index: usize) -> bool {
    ELEMENTS.with(|elements| elements.borrow().contains_key(&index))
}

/// Get the count of currently allocated elements.
pub fn get_allocated_count() -> usize {
    ELEMENTS.with(|elements| elements.borrow().len())
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all registry state (for testing).
pub fn reset_registry() {
    ID_TO_INDEX.with(|map| map.borrow_mut().clear());
    INDEX_TO_ID.with(|map| map.borrow_mut().clear());
    ELEMENTS.with(|elements| elements.borrow_mut().clear());
    FREE_INDICES.with(|free| free.borrow_mut().clear());
    NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    ID_COUNTER.with(|counter| *counter.borrow_mut() = 0);
    PARENT_STACK.with(|stack| stack.borrow_mut().clear());
    DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().clear());
}
