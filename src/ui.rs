use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::App;
use crate::components::status_bar::StatusBarWidget;
use crate::components::table::TableWidget;

/// Render the dialog: the listing table above a one-line status bar.
pub fn render(app: &mut App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let title = match app.coordinator.navigator().current() {
        Some(dir) => format!(" {} ", dir.name),
        None => " Sources ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_fg));

    // Remembered for mouse hit-testing.
    app.table_area = block.inner(chunks[0]);
    app.update_scroll(app.table_area.height as usize);

    let table = TableWidget::new(&app.coordinator, &app.theme)
        .cursor(app.cursor, app.scroll_offset)
        .block(block);
    frame.render_widget(table, chunks[0]);

    let breadcrumb = app.breadcrumb();
    let mut status_bar = StatusBarWidget::new(&breadcrumb, &app.theme)
        .counts(
            app.coordinator.model().count(),
            app.coordinator.selected_directories().len(),
        )
        .loading(app.is_loading());
    if app.coordinator.navigator().current().is_some() && app.coordinator.is_multiple() {
        status_bar = status_bar.select_all(app.coordinator.select_all_icon());
    }
    if let Some((ref msg, is_error, _)) = app.status_message {
        status_bar = status_bar.status_message(msg, is_error);
    }
    frame.render_widget(status_bar, chunks[1]);
}
