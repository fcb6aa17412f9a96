//! Markup - The declarative template handed to the host, and the rendered
//! markup of a mounted list.
//!
//! The template names the bindings the host's templating layer wires up:
//!
//! ```text
//! <section data-field="tags" class="simple-list" bind-simplelist="tags.data">
//!   <span tabindex="0" bind-each-item="tags.data" class="simple-list-item"
//!         bind-class-selected="item.selected"
//!         on-click="tags.select_item" on-keydown="tags.keyactions">{ item.text }</span>
//!   <input class="simple-list-add" on-click="tags.unselect_all" placeholder="..." />
//! </section>
//! ```

use std::fmt::Write as _;

use crate::types::ItemState;

pub const CONTAINER_CLASS: &str = "simple-list";
pub const ITEM_CLASS: &str = "simple-list-item";
pub const INPUT_CLASS: &str = "simple-list-add";
pub const SELECTED_CLASS: &str = "selected";

/// Name of the publish-capable binder that attaches the input listener.
pub const BINDER_NAME: &str = "simplelist";

/// The declarative description of a list widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTemplate {
    pub name: String,
    pub placeholder: String,
}

impl ListTemplate {
    pub fn new(name: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            placeholder: placeholder.into(),
        }
    }

    /// Template markup with binding attributes.
    pub fn markup(&self) -> String {
        let name = escape(&self.name);
        format!(
            concat!(
                "<section data-field=\"{name}\" class=\"{container}\" bind-{binder}=\"{name}.data\">",
                "<span tabindex=\"0\" bind-each-item=\"{name}.data\" class=\"{item}\" ",
                "bind-class-{selected}=\"item.selected\" ",
                "on-click=\"{name}.select_item\" on-keydown=\"{name}.keyactions\">{{ item.text }}</span>",
                "<input class=\"{input}\" on-click=\"{name}.unselect_all\" placeholder=\"{placeholder}\" />",
                "</section>"
            ),
            name = name,
            container = CONTAINER_CLASS,
            binder = BINDER_NAME,
            item = ITEM_CLASS,
            selected = SELECTED_CLASS,
            input = INPUT_CLASS,
            placeholder = escape(&self.placeholder),
        )
    }
}

/// One rendered item, as the host should display it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub text: String,
    pub state: ItemState,
}

/// Snapshot of a mounted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub name: String,
    pub items: Vec<ItemView>,
    pub input: String,
    pub placeholder: String,
    pub input_focused: bool,
}

impl ListView {
    /// Rendered markup of the current state.
    pub fn markup(&self) -> String {
        let mut out = format!(
            "<section data-field=\"{}\" class=\"{}\">",
            escape(&self.name),
            CONTAINER_CLASS
        );
        for item in &self.items {
            let class = if item.state.contains(ItemState::SELECTED) {
                format!("{ITEM_CLASS} {SELECTED_CLASS}")
            } else {
                ITEM_CLASS.to_string()
            };
            let _ = write!(
                out,
                "<span tabindex=\"0\" class=\"{}\">{}</span>",
                class,
                escape(&item.text)
            );
        }
        let _ = write!(
            out,
            "<input class=\"{}\" placeholder=\"{}\" value=\"{}\" /></section>",
            INPUT_CLASS,
            escape(&self.placeholder),
            escape(&self.input)
        );
        out
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_names_bindings() {
        let markup = ListTemplate::new("tags", "Start typing").markup();
        assert!(markup.starts_with("<section data-field=\"tags\" class=\"simple-list\""));
        assert!(markup.contains("bind-simplelist=\"tags.data\""));
        assert!(markup.contains("on-click=\"tags.select_item\""));
        assert!(markup.contains("on-keydown=\"tags.keyactions\""));
        assert!(markup.contains("on-click=\"tags.unselect_all\""));
        assert!(markup.contains("{ item.text }"));
        assert!(markup.contains("placeholder=\"Start typing\""));
    }

    #[test]
    fn test_view_markup_marks_selected_and_escapes() {
        let view = ListView {
            name: "tags".into(),
            items: vec![
                ItemView { text: "a<b".into(), state: ItemState::NONE },
                ItemView { text: "c".into(), state: ItemState::SELECTED },
            ],
            input: "\"q\"".into(),
            placeholder: "p".into(),
            input_focused: false,
        };
        let markup = view.markup();
        assert!(markup.contains("<span tabindex=\"0\" class=\"simple-list-item\">a&lt;b</span>"));
        assert!(markup.contains("class=\"simple-list-item selected\">c</span>"));
        assert!(markup.contains("value=\"&quot;q&quot;\""));
    }
}
