use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::selection::Status;
use crate::theme::ThemeColors;

const KEY_HINTS: &str = " spc:select ⏎:open ⌫:back a:all c:confirm q:quit ";

/// Status bar: breadcrumb, selection summary and key hints, or a transient
/// status message.
pub struct StatusBarWidget<'a> {
    breadcrumb: &'a str,
    theme: &'a ThemeColors,
    files: usize,
    directories: usize,
    select_all: Option<Status>,
    loading: bool,
    status_message: Option<&'a str>,
    is_error: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(breadcrumb: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            breadcrumb,
            theme,
            files: 0,
            directories: 0,
            select_all: None,
            loading: false,
            status_message: None,
            is_error: false,
        }
    }

    pub fn counts(mut self, files: usize, directories: usize) -> Self {
        self.files = files;
        self.directories = directories;
        self
    }

    /// Show the select-all state; omitted at the sources level.
    pub fn select_all(mut self, status: Status) -> Self {
        self.select_all = Some(status);
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }

    fn summary(&self) -> String {
        let mut summary = format!("{} files | {} dirs", self.files, self.directories);
        if let Some(status) = self.select_all {
            summary.push_str(" | all: ");
            summary.push_str(status.marker());
        }
        if self.loading {
            summary.push_str(" | loading…");
        }
        summary
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Keep the last `max` characters of `s`, prefixed with `...` when cut.
fn truncate_left(s: &str, max: usize) -> String {
    let len = char_len(s);
    if len <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().take(max).collect();
    }
    let tail: String = s.chars().skip(len - (max - 3)).collect();
    format!("...{}", tail)
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_bg)
            } else {
                Style::default()
                    .bg(self.theme.status_bg)
                    .fg(self.theme.selected_fg)
            };

            let display: String = if char_len(msg) >= width {
                msg.chars().take(width).collect()
            } else {
                format!("{:<width$}", msg, width = width)
            };

            let line = Line::from(Span::styled(display, style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        // Hints are dropped first when the bar is narrow.
        let hints = if width >= char_len(KEY_HINTS) + 20 {
            KEY_HINTS
        } else {
            ""
        };
        let remaining = width.saturating_sub(char_len(hints));

        let summary = self.summary();
        let summary_display: String = summary.chars().take(remaining).collect();
        let crumb_budget = remaining
            .saturating_sub(char_len(&summary_display))
            .saturating_sub(1);
        let crumb_display = truncate_left(self.breadcrumb, crumb_budget);
        let gap = remaining
            .saturating_sub(char_len(&crumb_display))
            .saturating_sub(char_len(&summary_display));

        let base = Style::default().bg(self.theme.status_bg);
        let summary_style = match self.select_all {
            Some(Status::Selected) => base.fg(self.theme.selected_fg),
            Some(Status::Mixed) => base.fg(self.theme.mixed_fg),
            _ => base.fg(self.theme.status_fg),
        };

        let line = Line::from(vec![
            Span::styled(
                crumb_display,
                base.fg(self.theme.status_fg).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ".repeat(gap), base),
            Span::styled(summary_display, summary_style),
            Span::styled(
                hints,
                base.fg(self.theme.dim_fg).add_modifier(Modifier::DIM),
            ),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::dark_theme;

    fn render_to_string(widget: StatusBarWidget, width: u16) -> (Buffer, String) {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        let text = (0..width)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        (buf, text)
    }

    #[test]
    fn normal_bar_shows_breadcrumb_summary_and_hints() {
        let theme = dark_theme();
        let widget = StatusBarWidget::new("/ pdb-gzip /", &theme)
            .counts(5, 1)
            .select_all(Status::Mixed);
        let (_, text) = render_to_string(widget, 100);
        assert!(text.starts_with("/ pdb-gzip /"));
        assert!(text.contains("5 files | 1 dirs | all: [-]"));
        assert!(text.contains("c:confirm"));
    }

    #[test]
    fn loading_is_indicated() {
        let theme = dark_theme();
        let widget = StatusBarWidget::new("/", &theme).loading(true);
        let (_, text) = render_to_string(widget, 100);
        assert!(text.contains("loading…"));
        assert!(!text.contains("all:"));
    }

    #[test]
    fn long_breadcrumb_is_cut_from_the_left() {
        let theme = dark_theme();
        let crumb = "/ pdb-gzip / directory1 / subdirectory1 / subsubdirectory /";
        let widget = StatusBarWidget::new(crumb, &theme).counts(1, 0);
        let (_, text) = render_to_string(widget, 40);
        assert!(text.starts_with("..."));
        assert!(text.contains("subsubdirectory /"));
        assert!(!text.contains("q:quit"));
    }

    #[test]
    fn error_message_takes_whole_bar() {
        let theme = dark_theme();
        let widget = StatusBarWidget::new("/ pdb-gzip /", &theme)
            .counts(3, 0)
            .status_message("✗ not found: /gone", true);
        let (buf, text) = render_to_string(widget, 30);
        assert!(text.starts_with("✗ not found: /gone"));
        assert!(!text.contains("files"));
        assert_eq!(buf.cell((0, 0)).unwrap().bg, theme.error_fg);
        assert_eq!(buf.cell((29, 0)).unwrap().bg, theme.error_fg);
    }

    #[test]
    fn info_message_uses_selected_color() {
        let theme = dark_theme();
        let widget =
            StatusBarWidget::new("/", &theme).status_message("Selection cleared", false);
        let (buf, _) = render_to_string(widget, 30);
        assert_eq!(buf.cell((0, 0)).unwrap().fg, theme.selected_fg);
    }

    #[test]
    fn truncate_left_keeps_the_tail() {
        assert_eq!(truncate_left("abcdef", 10), "abcdef");
        assert_eq!(truncate_left("abcdefghij", 6), "...hij");
        assert_eq!(truncate_left("abcdef", 2), "ab");
    }

    #[test]
    fn zero_area_is_a_no_op() {
        let theme = dark_theme();
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new("/", &theme).render(area, &mut buf);
    }
}
