use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.message = None;
    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Filter => handle_filter(app, key),
    }
}

fn handle_navigate(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::PageDown => app.move_cursor(10),
        KeyCode::PageUp => app.move_cursor(-10),
        KeyCode::Char('g') | KeyCode::Home => app.view.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => {
            app.view.cursor = app.visible_len().saturating_sub(1);
        }
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('d') => app.flip_direction(),
        KeyCode::Char('f') => app.cycle_completed_filter(),
        KeyCode::Char('r') => app.cycle_route(),
        KeyCode::Char('b') => app.insert_bank(true),
        KeyCode::Char('B') => app.insert_bank(false),
        KeyCode::Char('x') => app.remove_selected_placeholder(),
        KeyCode::Char('/') => {
            app.filter_input = app.text_filter.clone();
            app.mode = Mode::Filter;
        }
        _ => {}
    }
}

fn handle_filter(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.filter_input.clear();
            app.mode = Mode::Navigate;
        }
        KeyCode::Enter => {
            app.text_filter = std::mem::take(&mut app.filter_input);
            app.mode = Mode::Navigate;
            app.view.cursor = 0;
            app.apply_settings();
        }
        KeyCode::Backspace => {
            app.filter_input.pop();
        }
        KeyCode::Char(c) => app.filter_input.push(c),
        _ => {}
    }
}
