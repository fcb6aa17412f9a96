//! List Editor Example - A tag list edited from the terminal
//!
//! Demonstrates the whole editor against a real terminal:
//! - Type and press Enter/Tab to add an item
//! - Backspace/Left on the empty input selects the last item
//! - Left/Right/Tab move between items, Delete/Backspace removes one
//! - Click an item to select it, click the input to clear the selection
//! - Enter on the empty input closes the editor
//!
//! Esc or Ctrl+C quits. Set RUST_LOG=debug and redirect stderr to watch the
//! decisions being made.
//!
//! Run with: cargo run --example list_editor 2>log.txt

use std::cell::Cell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use spark_signals::signal;
use spark_list::state::input::{poll_event, InputEvent};
use spark_list::state::{focus, keyboard, mouse};
use spark_list::{reset_registry, Item, ItemState, SimpleList, SimpleListProps};

/// Row of the first item; the title sits above it.
const FIRST_ROW: u16 = 2;

fn main() -> io::Result<()> {
    env_logger::init();
    reset_registry();

    let tags = signal(vec![Item::new("rust"), Item::new("terminal"), Item::new("signals")]);
    let closed = Rc::new(Cell::new(false));
    let closed_for_props = closed.clone();

    let list = SimpleList::mount(
        SimpleListProps {
            name: "tags".to_string(),
            max: Some(12),
            on_close: Some(Rc::new(move || closed_for_props.set(true))),
            ..Default::default()
        },
        Rc::new(tags.clone()),
    );
    focus::focus(list.input());

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;

    let result = run(&list, &closed, &mut stdout);

    execute!(stdout, Show, DisableMouseCapture, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    let saved: Vec<String> = tags.get().into_iter().map(|item| item.text).collect();
    list.unmount();
    result?;
    println!("tags: {}", saved.join(", "));
    Ok(())
}

fn run(list: &SimpleList, closed: &Cell<bool>, stdout: &mut io::Stdout) -> io::Result<()> {
    draw(list, stdout)?;

    while !closed.get() {
        let Some(event) = poll_event(Duration::from_millis(100))? else {
            continue;
        };
        match event {
            InputEvent::Key(event) => {
                if event.key == "Escape" || (event.modifiers.ctrl && event.key == "c") {
                    break;
                }
                keyboard::dispatch(event);
            }
            InputEvent::Mouse(mut event) => {
                if event.is_click() {
                    event.component_index = hit_test(list, event.y);
                    mouse::dispatch(event);
                }
            }
            InputEvent::Resize(..) | InputEvent::None => {}
        }

        // Deleting the first item leaves nothing focused; keep typing possible
        if !focus::has_focus() && !closed.get() {
            focus::focus(list.input());
        }
        draw(list, stdout)?;
    }
    Ok(())
}

/// Element drawn on `row`, if any.
fn hit_test(list: &SimpleList, row: u16) -> Option<usize> {
    let offset = usize::from(row.checked_sub(FIRST_ROW)?);
    let items = list.item_elements();
    match offset.cmp(&items.len()) {
        std::cmp::Ordering::Less => Some(items[offset]),
        std::cmp::Ordering::Equal => Some(list.input()),
        std::cmp::Ordering::Greater => None,
    }
}

fn draw(list: &SimpleList, stdout: &mut io::Stdout) -> io::Result<()> {
    let view = list.view();
    queue!(
        stdout,
        Clear(ClearType::All),
        MoveTo(0, 0),
        SetAttribute(Attribute::Bold),
        Print(format!("{} ({} items)", view.name, view.items.len())),
        SetAttribute(Attribute::Reset),
    )?;

    let mut row = FIRST_ROW;
    for item in &view.items {
        let marker = if item.state.contains(ItemState::FOCUSED) { '>' } else { ' ' };
        queue!(stdout, MoveTo(0, row), Print(format!("{marker} ")))?;
        if item.state.contains(ItemState::SELECTED) {
            queue!(stdout, SetAttribute(Attribute::Reverse))?;
        }
        queue!(
            stdout,
            Print(format!("[{}]", item.text)),
            SetAttribute(Attribute::Reset)
        )?;
        row += 1;
    }

    let marker = if view.input_focused { '>' } else { ' ' };
    queue!(stdout, MoveTo(0, row), Print(format!("{marker} + ")))?;
    if view.input.is_empty() {
        queue!(
            stdout,
            SetAttribute(Attribute::Dim),
            Print(&view.placeholder),
            SetAttribute(Attribute::Reset)
        )?;
    } else {
        queue!(stdout, Print(&view.input))?;
    }
    if view.input_focused {
        queue!(stdout, Print("_"))?;
    }

    stdout.flush()
}
