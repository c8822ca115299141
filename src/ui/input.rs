//! Input handling for the TUI.
//!
//! Key dispatch is mode-based: search mode captures typing; browse mode
//! maps keys to feed switches, navigation, comment toggles, and the
//! load-more trigger. Everything long-running is spawned through `App`,
//! so handlers never block the event loop.

use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::loop_runner::Action;
use super::model::Row;
use crate::api::FeedType;
use crate::app::{App, AppEvent};
use crate::util::validate_url_for_open;

/// Maximum allowed search query length (UI layer validation).
const MAX_SEARCH_LENGTH: usize = 256;

/// Rows from the bottom at which navigation starts asking for more.
const PROXIMITY_MARGIN: usize = 3;

pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if app.search_mode {
        return handle_search_input(app, code, tx);
    }

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Action::Quit,

        KeyCode::Char('1') => app.spawn_switch(FeedType::Stories, tx),
        KeyCode::Char('2') => app.spawn_switch(FeedType::Jobs, tx),
        KeyCode::Char('3') => app.spawn_switch(FeedType::Polls, tx),
        KeyCode::Tab => app.spawn_switch(app.feed.cycle(), tx),
        KeyCode::Char('r') => {
            app.set_status("Reloading...");
            app.spawn_switch(app.feed, tx);
        }

        KeyCode::Down | KeyCode::Char('j') => move_selection(app, 1, tx),
        KeyCode::Up | KeyCode::Char('k') => move_selection(app, -1, tx),
        KeyCode::Char('g') => {
            app.selected = 0;
        }
        KeyCode::Char('G') => {
            let len = app.view.rows().len();
            app.selected = len.saturating_sub(1);
            // Jumping to the bottom is as loud a signal as scrolling there.
            app.spawn_sentinel_signal(tx);
        }

        KeyCode::Enter | KeyCode::Char(' ') => toggle_selected(app, tx),
        KeyCode::Char('m') => app.spawn_manual_load(tx),
        KeyCode::Char('u') => app.accept_live_update(tx),
        KeyCode::Char('o') => open_selected(app),

        KeyCode::Char('/') => {
            app.search_mode = true;
        }
        KeyCode::Esc => {
            if app.view.search_active() {
                app.exit_search();
            }
        }

        _ => {}
    }
    Action::Continue
}

fn handle_search_input(app: &mut App, code: KeyCode, tx: &mpsc::Sender<AppEvent>) -> Action {
    match code {
        KeyCode::Esc => app.exit_search(),
        KeyCode::Enter => {
            // Skip the quiet window; run whatever is typed right now.
            app.search_debounce.cancel();
            app.execute_search(tx);
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            app.search_keystroke();
        }
        KeyCode::Char(c) => {
            if app.search_input.len() < MAX_SEARCH_LENGTH {
                app.search_input.push(c);
                app.search_keystroke();
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Move the selection, clamped to the row list, and raise the proximity /
/// sentinel load signals when the bottom comes near.
fn move_selection(app: &mut App, delta: isize, tx: &mpsc::Sender<AppEvent>) {
    let len = app.view.rows().len();
    if len == 0 {
        return;
    }
    let selected = app.selected as isize + delta;
    app.selected = selected.clamp(0, len as isize - 1) as usize;

    if app.view.search_active() {
        return;
    }
    if app.selected + 1 == len {
        app.spawn_sentinel_signal(tx);
    } else if app.selected + PROXIMITY_MARGIN >= len {
        app.spawn_scroll_signal(tx);
    }
}

fn toggle_selected(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let rows = app.view.rows();
    match rows.get(app.selected) {
        Some(Row::Post(item)) => {
            // Roots register lazily, on the first toggle of each post.
            app.tree.insert_root(item.clone());
            app.spawn_toggle(item.id, tx);
        }
        Some(Row::Comment { item, .. }) => {
            app.spawn_toggle(item.id, tx);
        }
        _ => {}
    }
}

fn open_selected(app: &mut App) {
    let rows = app.view.rows();
    let link = match rows.get(app.selected) {
        Some(Row::Post(item)) => item.link(),
        Some(Row::Hit(hit)) => hit.link(),
        _ => return,
    };
    match validate_url_for_open(&link) {
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                tracing::warn!(url = %url, error = %e, "Failed to open browser");
                app.set_status("Could not open browser");
            } else {
                app.set_status("Opened in browser");
            }
        }
        Err(e) => {
            tracing::warn!(link = %link, error = %e, "Refusing to open link");
            app.set_status("Link refused (not http/https)");
        }
    }
}
