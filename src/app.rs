use std::time::Instant;

use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::coordinator::{Completion, Planned, PendingFetch, SelectionCoordinator, SelectionResult};
use crate::event::{Event, FetchDone};
use crate::navigator::Row;
use crate::theme::ThemeColors;

/// How the dialog ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Confirmed(SelectionResult),
    Cancelled,
}

/// Main application state.
pub struct App {
    pub coordinator: SelectionCoordinator,
    pub theme: ThemeColors,
    pub cursor: usize,
    pub scroll_offset: usize,
    /// Where the table was last drawn, for mouse hit-testing.
    pub table_area: Rect,
    pub status_message: Option<(String, bool, Instant)>,
    /// Fetches started but not yet completed.
    pub pending: usize,
    pub outcome: Option<DialogOutcome>,
    events: UnboundedSender<Event>,
}

impl App {
    pub fn new(
        coordinator: SelectionCoordinator,
        theme: ThemeColors,
        events: UnboundedSender<Event>,
    ) -> Self {
        Self {
            coordinator,
            theme,
            cursor: 0,
            scroll_offset: 0,
            table_area: Rect::default(),
            status_message: None,
            pending: 0,
            outcome: None,
            events,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn rows(&self) -> &[Row] {
        self.coordinator.rows()
    }

    pub fn cursor_row(&self) -> Option<&Row> {
        self.rows().get(self.cursor)
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    // ── Cursor ───────────────────────────────────────────────────────────

    pub fn select_next(&mut self) {
        let len = self.rows().len();
        if len > 0 && self.cursor < len - 1 {
            self.cursor += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.cursor = 0;
    }

    pub fn select_last(&mut self) {
        self.cursor = self.rows().len().saturating_sub(1);
    }

    fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    /// Keep the cursor row inside a viewport of `visible_height` rows.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + visible_height {
            self.scroll_offset = self.cursor - visible_height + 1;
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Toggle the row under the cursor.
    pub fn click_cursor(&mut self) {
        if let Some(id) = self.cursor_row().map(|r| r.id().to_string()) {
            let planned = self.coordinator.plan_click(&id);
            self.dispatch(planned);
        }
    }

    /// Descend into the directory under the cursor.
    pub fn open_cursor(&mut self) {
        if let Some(id) = self.cursor_row().map(|r| r.id().to_string()) {
            let planned = self.coordinator.plan_open(&id);
            self.dispatch(planned);
        }
    }

    pub fn back(&mut self) {
        let planned = self.coordinator.plan_back();
        self.dispatch(planned);
    }

    /// Jump to a breadcrumb level, 0 being the sources.
    pub fn jump(&mut self, depth: usize) {
        if depth > self.coordinator.navigator().breadcrumb().len() {
            return;
        }
        let planned = self.coordinator.plan_jump(depth);
        self.dispatch(planned);
    }

    pub fn select_all(&mut self) {
        let planned = self.coordinator.plan_select_all();
        self.dispatch(planned);
    }

    pub fn reset(&mut self) {
        let planned = self.coordinator.plan_reset();
        self.dispatch(planned);
        self.set_status_message("Selection cleared".into(), false);
    }

    /// Finish with the current selection. Refused while nothing is selected.
    pub fn confirm(&mut self) {
        if !self.coordinator.has_value() {
            self.set_status_message("Nothing selected".into(), true);
            return;
        }
        self.outcome = Some(DialogOutcome::Confirmed(self.coordinator.finalize()));
    }

    pub fn cancel(&mut self) {
        self.outcome = Some(DialogOutcome::Cancelled);
    }

    /// Apply an in-place plan, or run its fetch on a background task.
    pub fn dispatch(&mut self, planned: Planned) {
        match planned {
            Planned::Done => self.clamp_cursor(),
            Planned::Ignored => {}
            Planned::Fetch(fetch) => {
                let listing = self.coordinator.listing();
                let tx = self.events.clone();
                self.pending += 1;
                tokio::spawn(async move {
                    let result = fetch.run(listing.as_ref()).await;
                    // The receiver only goes away on shutdown.
                    let _ = tx.send(Event::FetchComplete(FetchDone { fetch, result }));
                });
            }
        }
    }

    /// Apply a fetch that finished in the background.
    pub fn handle_fetch_complete(&mut self, done: FetchDone) {
        self.pending = self.pending.saturating_sub(1);
        let navigated = matches!(done.fetch, PendingFetch::Navigate(_));
        match self.coordinator.complete(done.fetch, done.result) {
            Ok(Completion::Applied) if navigated => {
                self.cursor = 0;
                self.scroll_offset = 0;
            }
            Ok(Completion::Applied) | Ok(Completion::Ignored) => self.clamp_cursor(),
            Ok(Completion::Discarded) => {}
            Err(e) => self.set_status_message(format!("✗ {}", e), true),
        }
    }

    // ── Status messages ──────────────────────────────────────────────────

    pub fn set_status_message(&mut self, msg: String, is_error: bool) {
        self.status_message = Some((msg, is_error, Instant::now()));
    }

    /// Clear the status message if it has been displayed for more than 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, _, ref created)) = self.status_message {
            if created.elapsed().as_secs() > 3 {
                self.status_message = None;
            }
        }
    }

    /// Breadcrumb of the current location, e.g. `/ data / raw`.
    pub fn breadcrumb(&self) -> String {
        let mut crumb = String::from("/");
        for dir in self.coordinator.navigator().breadcrumb() {
            crumb.push(' ');
            crumb.push_str(&dir.name);
            crumb.push_str(" /");
        }
        crumb
    }
}
