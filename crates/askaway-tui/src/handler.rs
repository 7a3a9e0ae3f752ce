use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
    // Every event is a chance to pick up a finished reply
    app.poll_reply().await;
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_history {
        handle_history_drawer(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_history_drawer(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('q') => app.show_history = false,
        KeyCode::Char('j') | KeyCode::Down => app.history_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.history_nav_up(),
        KeyCode::Enter => app.open_selected_history(),
        KeyCode::Char('x') => app.clear_history(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        KeyCode::Char('h') => app.toggle_history(),
        KeyCode::Char('n') => app.new_chat(),

        // Chat scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_down(10),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_up(u16::MAX),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown if app.show_history => app.history_nav_down(),
        MouseEventKind::ScrollUp if app.show_history => app.history_nav_up(),
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askaway_core::{ChatSession, GatewayClient, HistoryStore, MemoryStore};
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::sync::Arc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn app() -> App {
        let backend = Arc::new(GatewayClient::new("http://127.0.0.1:1"));
        App::new(ChatSession::new(backend, HistoryStore::new(MemoryStore::new())), "test")
    }

    #[tokio::test]
    async fn test_typing_and_escape() {
        let mut app = app();
        for c in "hi".chars() {
            handle_event(&mut app, key(KeyCode::Char(c))).await;
        }
        assert_eq!(app.input, "hi");

        handle_event(&mut app, key(KeyCode::Esc)).await;
        assert_eq!(app.input_mode, InputMode::Normal);

        // 'q' quits in normal mode but is text while editing
        handle_event(&mut app, key(KeyCode::Char('i'))).await;
        handle_event(&mut app, key(KeyCode::Char('q'))).await;
        assert!(!app.should_quit);
        assert_eq!(app.input, "hiq");
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_anywhere() {
        let mut app = app();
        let ctrl_c = AppEvent::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        handle_event(&mut app, ctrl_c).await;
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_history_drawer_keys() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Esc)).await;
        handle_event(&mut app, key(KeyCode::Char('h'))).await;
        assert!(app.show_history);

        handle_event(&mut app, key(KeyCode::Char('j'))).await;
        assert_eq!(app.history_state.selected(), Some(1));

        handle_event(&mut app, key(KeyCode::Enter)).await;
        assert!(!app.show_history);
        assert_eq!(app.exchanges().len(), 2);
        assert!(app.session.has_started());
    }
}
