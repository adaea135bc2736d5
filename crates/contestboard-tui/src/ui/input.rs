//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{is_valid_input_char, App, AppState, Focus, Tab};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::Searching) {
        return handle_search_input(app, key);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('1') => {
            app.current_tab = Tab::Contests;
        }
        KeyCode::Char('2') => {
            app.current_tab = Tab::Durations;
            app.focus = Focus::List;
        }
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
        }
        KeyCode::BackTab => {
            app.current_tab = app.current_tab.next();
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
            app.current_tab = Tab::Contests;
        }
        KeyCode::Esc => {
            if !app.pipeline.criteria().search_text.is_empty() {
                app.clear_search();
            } else {
                app.focus = Focus::List;
            }
        }
        KeyCode::Char('u') => app.refresh(),
        KeyCode::Char('t') => app.cycle_type(),
        KeyCode::Char('p') => app.cycle_phase(),
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('f') => app.toggle_favorites_only(),
        KeyCode::Char(' ') | KeyCode::Char('*') => app.toggle_selected_favorite(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.grow_page(),
        KeyCode::Char('-') => app.shrink_page(),
        KeyCode::Left | KeyCode::Char('[') => app.prev_page(),
        KeyCode::Right | KeyCode::Char(']') => app.next_page(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Home => {
            app.pipeline.set_page(1);
            app.selection = 0;
        }
        KeyCode::End => {
            let last = app.pipeline.total_pages();
            app.pipeline.set_page(last);
            app.selection = 0;
        }
        _ => {}
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.clear_search();
        }
        KeyCode::Enter => {
            // Keep search query active
            app.state = AppState::Normal;
            app.commit_search();
        }
        KeyCode::Backspace => {
            app.pop_search_char();
        }
        KeyCode::Char(c) if is_valid_input_char(c) => {
            app.push_search_char(c);
        }
        _ => {}
    }
    Ok(false)
}
