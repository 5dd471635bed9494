use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::coordinator::SelectionCoordinator;
use crate::navigator::Row;
use crate::selection::Status;
use crate::theme::ThemeColors;

/// Table of the current listing, one line per row with its selection marker.
pub struct TableWidget<'a> {
    coordinator: &'a SelectionCoordinator,
    theme: &'a ThemeColors,
    cursor: usize,
    scroll_offset: usize,
    block: Option<Block<'a>>,
}

impl<'a> TableWidget<'a> {
    pub fn new(coordinator: &'a SelectionCoordinator, theme: &'a ThemeColors) -> Self {
        Self {
            coordinator,
            theme,
            cursor: 0,
            scroll_offset: 0,
            block: None,
        }
    }

    pub fn cursor(mut self, cursor: usize, scroll_offset: usize) -> Self {
        self.cursor = cursor;
        self.scroll_offset = scroll_offset;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn marker_style(&self, status: Status) -> Style {
        match status {
            Status::Selected => Style::default()
                .fg(self.theme.selected_fg)
                .add_modifier(Modifier::BOLD),
            Status::Mixed => Style::default().fg(self.theme.mixed_fg),
            Status::Unselected => Style::default().fg(self.theme.dim_fg),
        }
    }

    fn row_line(&self, row: &Row, is_cursor: bool) -> Line<'static> {
        let name_style = if row.is_leaf {
            Style::default().fg(self.theme.row_fg)
        } else {
            Style::default()
                .fg(self.theme.dir_fg)
                .add_modifier(Modifier::BOLD)
        };
        let name_style = if is_cursor {
            name_style
                .bg(self.theme.cursor_bg)
                .fg(self.theme.cursor_fg)
        } else {
            name_style
        };

        // Sources are opened, never selected, so they carry no marker.
        let marker = if self.coordinator.navigator().current().is_none() {
            "   ".to_string()
        } else {
            row.status.marker().to_string()
        };
        let icon = if row.is_leaf { "  " } else { "▸ " };
        let mut spans = vec![
            Span::styled(marker, self.marker_style(row.status)),
            Span::raw(" "),
            Span::styled(format!("{}{}", icon, row.node.name), name_style),
        ];
        if self.coordinator.is_busy(row.id()) {
            spans.push(Span::styled(
                " …",
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::ITALIC),
            ));
        }
        Line::from(spans)
    }
}

impl<'a> Widget for TableWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        let rows = self.coordinator.rows();
        let visible_height = inner_area.height as usize;
        if visible_height == 0 {
            return;
        }

        if rows.is_empty() {
            let text = if self.coordinator.navigator().is_loaded() {
                "(empty)"
            } else {
                "Loading…"
            };
            let line = Line::from(Span::styled(text, Style::default().fg(self.theme.dim_fg)));
            buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
            return;
        }

        for (i, (idx, row)) in rows
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(visible_height)
            .enumerate()
        {
            let y = inner_area.y + i as u16;
            let line = self.row_line(row, idx == self.cursor);
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}
