use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::App;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.cancel(),
        KeyCode::Char('q') | KeyCode::Esc => app.cancel(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::Char(' ') => app.click_cursor(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.open_cursor(),
        KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => app.back(),
        KeyCode::Char('a') => app.select_all(),
        KeyCode::Char('c') => app.confirm(),
        KeyCode::Char('r') => app.reset(),
        KeyCode::Char(d @ '0'..='9') => app.jump(d as usize - '0' as usize),
        _ => {}
    }
}

/// Handle a mouse event: left click toggles a row, scrolling moves the cursor.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let area = app.table_area;
            if mouse.column < area.x
                || mouse.column >= area.x + area.width
                || mouse.row < area.y
                || mouse.row >= area.y + area.height
            {
                return;
            }
            let index = app.scroll_offset + (mouse.row - area.y) as usize;
            if index < app.rows().len() {
                app.cursor = index;
                app.click_cursor();
            }
        }
        MouseEventKind::ScrollDown => app.select_next(),
        MouseEventKind::ScrollUp => app.select_previous(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::SelectionCoordinator;
    use crate::listing::snapshot::dialog_fixture;
    use crate::theme::dark_theme;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use ratatui::layout::Rect;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    async fn loaded_app() -> App {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let coordinator = SelectionCoordinator::new(Arc::new(dialog_fixture()), true);
        let mut app = App::new(coordinator, dark_theme(), tx);
        for _ in 0..2 {
            if app.rows().is_empty() {
                app.back();
            } else {
                app.open_cursor();
            }
            if let Some(crate::event::Event::FetchComplete(done)) = rx.recv().await {
                app.handle_fetch_complete(done);
            }
        }
        app
    }

    #[tokio::test]
    async fn quit_keys_cancel() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut app = loaded_app().await;
            handle_key_event(&mut app, key(code));
            assert!(app.should_quit());
        }
        let mut app = loaded_app().await;
        let mut ctrl_c = key(KeyCode::Char('c'));
        ctrl_c.modifiers = KeyModifiers::CONTROL;
        handle_key_event(&mut app, ctrl_c);
        assert_eq!(app.outcome, Some(crate::app::DialogOutcome::Cancelled));
    }

    #[tokio::test]
    async fn space_toggles_file_row() {
        let mut app = loaded_app().await;
        handle_key_event(&mut app, key(KeyCode::Char('G')));
        let id = app.cursor_row().unwrap().id().to_string();
        assert_eq!(id, "file2");
        handle_key_event(&mut app, key(KeyCode::Char(' ')));
        assert!(app.coordinator.model().exists(&id));
        handle_key_event(&mut app, key(KeyCode::Char(' ')));
        assert!(!app.coordinator.model().exists(&id));
    }

    #[tokio::test]
    async fn navigation_keys_move_cursor() {
        let mut app = loaded_app().await;
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        handle_key_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.cursor, 2);
        handle_key_event(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.cursor, 1);
        handle_key_event(&mut app, key(KeyCode::Home));
        assert_eq!(app.cursor, 0);
    }

    #[tokio::test]
    async fn digit_keys_jump_within_breadcrumb() {
        let mut app = loaded_app().await;
        handle_key_event(&mut app, key(KeyCode::Char('7')));
        assert!(!app.is_loading());
        handle_key_event(&mut app, key(KeyCode::Char('0')));
        assert!(app.is_loading());
    }

    #[tokio::test]
    async fn mouse_click_hits_row() {
        let mut app = loaded_app().await;
        app.table_area = Rect::new(1, 1, 40, 10);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(&mut app, click);
        assert_eq!(app.cursor, 3);
        assert!(app.coordinator.model().exists("file2"));
    }

    #[tokio::test]
    async fn mouse_click_outside_table_is_ignored() {
        let mut app = loaded_app().await;
        app.table_area = Rect::new(1, 1, 40, 10);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(&mut app, click);
        assert_eq!(app.cursor, 0);
        assert!(!app.coordinator.has_value());
    }
}
