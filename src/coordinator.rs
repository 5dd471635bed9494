//! Selection coordinator: turns row clicks and opens into changes of the
//! selection and the displayed listing.
//!
//! Every user action is split into a synchronous *plan* step, which may ask
//! for a listing fetch, and a *complete* step that applies the fetched
//! listing. The async `on_*` methods chain the two for callers that simply
//! await the listing service; the terminal host runs fetches on background
//! tasks instead and feeds the results back through [`complete`].
//!
//! [`complete`]: SelectionCoordinator::complete

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::error::ListingError;
use crate::listing::{ListingService, Node};
use crate::navigator::{Navigation, Row, TreeNavigator};
use crate::selection::model::{SelectedFile, SelectionModel};
use crate::selection::registry::{DirectoryMark, DirectorySelectionRegistry};
use crate::selection::Status;

/// Selection state of one dialog instance.
#[derive(Debug, Default)]
pub struct SelectionSession {
    pub model: SelectionModel,
    pub directories: DirectorySelectionRegistry,
}

impl SelectionSession {
    pub fn clear(&mut self) {
        self.model.clear();
        self.directories.clear();
    }
}

/// What the dialog hands back on confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionResult {
    pub files: Vec<SelectedFile>,
    pub directories: Vec<DirectoryMark>,
}

/// A listing fetch requested by a planned action.
#[derive(Debug, Clone)]
pub enum PendingFetch {
    /// Show another directory (or the sources).
    Navigate(Navigation),
    /// Select `directories` recursively together with `files`, committed only
    /// once every subtree has been fetched.
    Select {
        directories: Vec<Node>,
        files: Vec<Node>,
        /// Directory displayed when the selection was issued.
        origin: Option<String>,
    },
}

/// Listing data produced by running a [`PendingFetch`].
#[derive(Debug, Clone)]
pub enum Fetched {
    Listing(Vec<Node>),
    /// One flattened subtree per requested directory, in request order.
    Subtrees(Vec<Vec<Node>>),
}

impl PendingFetch {
    /// Perform the remote calls this fetch needs.
    pub async fn run(&self, listing: &dyn ListingService) -> Result<Fetched, ListingError> {
        match self {
            PendingFetch::Navigate(nav) => {
                let children = match &nav.target {
                    Some(dir) => listing.list(&dir.path, false).await?,
                    None => listing.list_sources().await?,
                };
                Ok(Fetched::Listing(children))
            }
            PendingFetch::Select { directories, .. } => {
                let mut subtrees = Vec::with_capacity(directories.len());
                for dir in directories {
                    subtrees.push(listing.list(&dir.path, true).await?);
                }
                Ok(Fetched::Subtrees(subtrees))
            }
        }
    }
}

/// Outcome of planning an action.
#[derive(Debug)]
pub enum Planned {
    /// Applied in place; nothing to fetch.
    Done,
    /// Not applicable (unknown row, busy row, wrong kind of row).
    Ignored,
    /// Needs this fetch before it can take effect.
    Fetch(PendingFetch),
}

/// Outcome of a finished action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Ignored,
    /// The result arrived after the user moved elsewhere and was dropped.
    Discarded,
}

/// Binds the selection session, the navigator and the listing service.
pub struct SelectionCoordinator {
    listing: Arc<dyn ListingService>,
    session: SelectionSession,
    navigator: TreeNavigator,
    multiple: bool,
    in_flight: HashSet<String>,
}

impl SelectionCoordinator {
    pub fn new(listing: Arc<dyn ListingService>, multiple: bool) -> Self {
        Self {
            listing,
            session: SelectionSession::default(),
            navigator: TreeNavigator::new(),
            multiple,
            in_flight: HashSet::new(),
        }
    }

    pub fn listing(&self) -> Arc<dyn ListingService> {
        Arc::clone(&self.listing)
    }

    // ── Read-only view for the dialog host ──────────────────────────────

    pub fn model(&self) -> &SelectionModel {
        &self.session.model
    }

    pub fn has_value(&self) -> bool {
        !self.session.model.is_empty()
    }

    pub fn selected_directories(&self) -> Vec<&DirectoryMark> {
        self.session.directories.entries()
    }

    pub fn select_all_icon(&self) -> Status {
        self.navigator.select_all_icon()
    }

    pub fn rows(&self) -> &[Row] {
        self.navigator.rows()
    }

    pub fn navigator(&self) -> &TreeNavigator {
        &self.navigator
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Whether a selection fetch is outstanding for `id`.
    pub fn is_busy(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    pub fn finalize(&self) -> SelectionResult {
        SelectionResult {
            files: self.session.model.files().into_iter().cloned().collect(),
            directories: self.session.directories.entries().into_iter().cloned().collect(),
        }
    }

    // ── Planning ─────────────────────────────────────────────────────────

    /// A click on a row: toggles files, selects or deselects directories.
    ///
    /// At the sources level, and in single-selection mode, clicking a
    /// directory opens it instead.
    pub fn plan_click(&mut self, id: &str) -> Planned {
        let Some(row) = self.navigator.row(id).cloned() else {
            return Planned::Ignored;
        };
        if self.in_flight.contains(id) {
            tracing::debug!(id, "row busy, click ignored");
            return Planned::Ignored;
        }
        if row.node.is_leaf() {
            self.toggle_file(&row.node);
            return Planned::Done;
        }
        if self.navigator.current().is_none() || !self.multiple {
            return Planned::Fetch(PendingFetch::Navigate(self.navigator.open(row.node)));
        }
        match row.status {
            Status::Selected | Status::Mixed => {
                self.deselect_directory(&row.node);
                Planned::Done
            }
            Status::Unselected => self.plan_select(vec![row.node], Vec::new()),
        }
    }

    /// Descend into a directory row.
    pub fn plan_open(&mut self, id: &str) -> Planned {
        match self.navigator.row(id) {
            Some(row) if row.node.is_dir() => {
                let dir = row.node.clone();
                Planned::Fetch(PendingFetch::Navigate(self.navigator.open(dir)))
            }
            _ => Planned::Ignored,
        }
    }

    /// Go up one level, or (re)load the sources when already at the top.
    pub fn plan_back(&mut self) -> Planned {
        Planned::Fetch(PendingFetch::Navigate(self.navigator.back()))
    }

    /// Jump to a breadcrumb level, 0 being the sources.
    pub fn plan_jump(&mut self, depth: usize) -> Planned {
        Planned::Fetch(PendingFetch::Navigate(self.navigator.jump(depth)))
    }

    /// The select-all affordance of the current listing.
    pub fn plan_select_all(&mut self) -> Planned {
        if !self.multiple || self.navigator.current().is_none() {
            return Planned::Ignored;
        }
        if self.navigator.rows().iter().any(|r| self.in_flight.contains(r.id())) {
            return Planned::Ignored;
        }
        let rows: Vec<Row> = self.navigator.rows().to_vec();
        if self.select_all_icon() == Status::Selected {
            for row in &rows {
                if row.node.is_leaf() {
                    self.deselect_file(&row.node);
                } else {
                    self.deselect_directory(&row.node);
                }
            }
            self.refresh();
            return Planned::Done;
        }
        let (dirs, files): (Vec<Node>, Vec<Node>) = rows
            .into_iter()
            .filter(|r| r.status != Status::Selected)
            .map(|r| r.node)
            .partition(|n| n.is_dir());
        self.plan_select(dirs, files)
    }

    /// Select directories (recursively) and files together.
    ///
    /// Directories that are already marked are skipped: their descendants
    /// were enumerated when they were marked.
    pub fn plan_select(&mut self, directories: Vec<Node>, files: Vec<Node>) -> Planned {
        let directories: Vec<Node> = directories
            .into_iter()
            .filter(|d| !self.session.directories.is_marked(&d.id))
            .collect();
        if directories.is_empty() {
            self.commit_selection(&[], &[], &files);
            return Planned::Done;
        }
        for dir in &directories {
            self.in_flight.insert(dir.id.clone());
        }
        Planned::Fetch(PendingFetch::Select {
            directories,
            files,
            origin: self.navigator.current_path().map(str::to_string),
        })
    }

    /// Clear the whole selection and return to the sources.
    pub fn plan_reset(&mut self) -> Planned {
        self.session.clear();
        self.in_flight.clear();
        self.navigator.reset();
        self.plan_back()
    }

    // ── Completion ───────────────────────────────────────────────────────

    /// Apply the result of a fetch requested by a plan.
    ///
    /// Results for a location the user has already left are discarded. A
    /// failed fetch changes nothing.
    pub fn complete(
        &mut self,
        fetch: PendingFetch,
        result: Result<Fetched, ListingError>,
    ) -> Result<Completion, ListingError> {
        match fetch {
            PendingFetch::Navigate(nav) => {
                if !self.navigator.is_current(&nav) {
                    tracing::debug!(target_path = ?nav.target.as_ref().map(|n| &n.path), "stale listing discarded");
                    return Ok(Completion::Discarded);
                }
                let children = match result {
                    Ok(Fetched::Listing(children)) => children,
                    Ok(Fetched::Subtrees(_)) => {
                        return Err(ListingError::Failed("unexpected recursive listing".into()))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "listing failed, keeping previous view");
                        return Err(e);
                    }
                };
                let target = nav.target.clone();
                self.navigator.apply(nav, children);
                if let Some(dir) = target {
                    self.inherit_from(&dir);
                }
                self.refresh();
                Ok(Completion::Applied)
            }
            PendingFetch::Select {
                directories,
                files,
                origin,
            } => {
                for dir in &directories {
                    self.in_flight.remove(&dir.id);
                }
                if self.navigator.current_path() != origin.as_deref() {
                    tracing::debug!(?origin, "selection issued elsewhere, discarded");
                    return Ok(Completion::Discarded);
                }
                let subtrees = match result {
                    Ok(Fetched::Subtrees(subtrees)) if subtrees.len() == directories.len() => {
                        subtrees
                    }
                    Ok(_) => {
                        return Err(ListingError::Failed("recursive listing mismatch".into()))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "recursive listing failed, selection aborted");
                        return Err(e);
                    }
                };
                self.commit_selection(&directories, &subtrees, &files);
                Ok(Completion::Applied)
            }
        }
    }

    // ── Async conveniences ───────────────────────────────────────────────

    /// Run a plan to completion against the listing service.
    pub async fn run(&mut self, planned: Planned) -> Result<Completion, ListingError> {
        match planned {
            Planned::Done => Ok(Completion::Applied),
            Planned::Ignored => Ok(Completion::Ignored),
            Planned::Fetch(fetch) => {
                let listing = self.listing();
                let result = fetch.run(listing.as_ref()).await;
                self.complete(fetch, result)
            }
        }
    }

    pub async fn on_row_clicked(&mut self, id: &str) -> Result<Completion, ListingError> {
        let planned = self.plan_click(id);
        self.run(planned).await
    }

    pub async fn on_row_opened(&mut self, id: &str) -> Result<Completion, ListingError> {
        let planned = self.plan_open(id);
        self.run(planned).await
    }

    pub async fn on_select_all_clicked(&mut self) -> Result<Completion, ListingError> {
        let planned = self.plan_select_all();
        self.run(planned).await
    }

    /// Show `target`, or go up one level when `None`.
    pub async fn load(&mut self, target: Option<Node>) -> Result<Completion, ListingError> {
        let planned = match target {
            Some(dir) if dir.is_dir() => {
                Planned::Fetch(PendingFetch::Navigate(self.navigator.open(dir)))
            }
            Some(_) => Planned::Ignored,
            None => self.plan_back(),
        };
        self.run(planned).await
    }

    pub async fn back(&mut self) -> Result<Completion, ListingError> {
        let planned = self.plan_back();
        self.run(planned).await
    }

    pub async fn reset(&mut self) -> Result<Completion, ListingError> {
        let planned = self.plan_reset();
        self.run(planned).await
    }

    // ── State transitions ────────────────────────────────────────────────

    fn toggle_file(&mut self, file: &Node) {
        if self.session.model.exists(&file.id) {
            self.deselect_file(file);
        } else {
            if !self.multiple {
                self.session.clear();
            }
            self.session.model.add(file);
            tracing::debug!(id = %file.id, "file selected");
        }
        self.refresh();
    }

    fn deselect_file(&mut self, file: &Node) {
        self.session.model.remove(&file.id);
        let demoted = self.session.directories.unmark_ancestors_of(&file.path);
        tracing::debug!(id = %file.id, demoted = demoted.len(), "file deselected");
    }

    fn deselect_directory(&mut self, dir: &Node) {
        let registry = &mut self.session.directories;
        registry.unmark(&dir.id);
        let below = registry.unmark_below(&dir.path);
        let demoted = registry.unmark_ancestors_of(&dir.path);
        let files = self.session.model.remove_below(&dir.path);
        tracing::info!(
            path = %dir.path,
            files,
            directories = below.len() + 1,
            demoted = demoted.len(),
            "directory deselected"
        );
        self.refresh();
    }

    fn commit_selection(&mut self, directories: &[Node], subtrees: &[Vec<Node>], files: &[Node]) {
        let session = &mut self.session;
        for (dir, subtree) in directories.iter().zip(subtrees) {
            let mut added = 0usize;
            for node in subtree {
                if node.is_leaf() {
                    added += usize::from(session.model.add(node));
                } else {
                    session.directories.mark(node);
                }
            }
            session.directories.mark(dir);
            tracing::info!(path = %dir.path, files = added, entries = subtree.len(), "directory selected");
        }
        for file in files {
            session.model.add(file);
        }
        self.refresh();
    }

    /// A directory opened from inside a marked one is selected by
    /// inheritance: its freshly listed children join the selection.
    fn inherit_from(&mut self, dir: &Node) {
        let session = &mut self.session;
        if !session.directories.is_marked(&dir.id) && !session.directories.covers(&dir.path) {
            return;
        }
        for row in self.navigator.rows() {
            if row.node.is_leaf() {
                session.model.add(&row.node);
            } else {
                session.directories.mark(&row.node);
            }
        }
    }

    /// Recompute displayed statuses, then mark the current directory when its
    /// whole listing has become selected.
    fn refresh(&mut self) {
        self.navigator
            .refresh(&self.session.model, &self.session.directories);
        if self.navigator.select_all_icon() != Status::Selected {
            return;
        }
        if let Some(current) = self.navigator.current().cloned() {
            if self.session.directories.mark(&current) {
                tracing::debug!(path = %current.path, "directory fully selected");
                self.navigator
                    .refresh(&self.session.model, &self.session.directories);
            }
        }
    }
}
