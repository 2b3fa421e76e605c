use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::state::{App, InputMode, Screen};

pub fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    // Ctrl+C quits from anywhere
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.running = false;
        return Ok(());
    }

    match (app.screen, app.input_mode) {
        (Screen::PostView, InputMode::Typing) => handle_typing_keys(app, key, now),
        (Screen::PostView, InputMode::Navigation) => handle_post_view_keys(app, key, now),
        (Screen::Board, _) => handle_board_keys(app, key),
    }
}

/// Keys while writing a comment; shortcuts are disabled
pub fn handle_typing_keys(app: &mut App, key: KeyEvent, now: Instant) -> Result<()> {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Navigation,
        KeyCode::Enter => app.submit_comment(now),
        KeyCode::Backspace => {
            if let Some(view) = app.view.as_mut() {
                view.editor.backspace();
            }
        }
        KeyCode::Char(c) => {
            if let Some(view) = app.view.as_mut() {
                view.editor.push_char(c);
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_post_view_keys(app: &mut App, key: KeyEvent, now: Instant) -> Result<()> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.close_post(),
        KeyCode::Char('l') | KeyCode::Char('L') => app.toggle_like(now),
        KeyCode::Char('i') | KeyCode::Char('I') => {
            if app.view.as_ref().is_some_and(|v| v.store.post().is_some()) {
                app.input_mode = InputMode::Typing;
            }
        }
        KeyCode::Enter => app.submit_comment(now),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => {
            if let Some(view) = app.view.as_mut() {
                view.move_selection(1);
            }
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => {
            if let Some(view) = app.view.as_mut() {
                view.move_selection(-1);
            }
        }
        KeyCode::Char('d') | KeyCode::Char('D') => app.delete_selected_comment(now),
        KeyCode::Char('e') | KeyCode::Char('E') => app.edit_comment(now),
        KeyCode::Char('x') | KeyCode::Char('X') => app.delete_post(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.share_post(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.refresh(),
        _ => {}
    }
    Ok(())
}

/// The board screen only offers quitting; it is where a closed or deleted
/// post returns to
pub fn handle_board_keys(app: &mut App, key: KeyEvent) -> Result<()> {
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
        app.running = false;
    }
    Ok(())
}
