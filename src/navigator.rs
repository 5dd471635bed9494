//! The currently displayed directory listing and how to move between
//! listings.
//!
//! Nothing is cached between levels: every navigation re-fetches the target
//! directory's children and every status is recomputed from the selection.

use serde::Serialize;

use crate::listing::Node;
use crate::selection::model::SelectionModel;
use crate::selection::registry::DirectorySelectionRegistry;
use crate::selection::{aggregate, status_of, Status};

/// One displayed row, in the shape the table renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    #[serde(flatten)]
    pub node: Node,
    #[serde(rename = "isLeaf")]
    pub is_leaf: bool,
    #[serde(rename = "_rowVariant")]
    pub status: Status,
}

impl Row {
    fn new(node: Node) -> Self {
        Self {
            is_leaf: node.is_leaf(),
            node,
            status: Status::Unselected,
        }
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }
}

/// A navigation that has been issued but whose listing has not arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Directory to show, or `None` for the sources listing.
    pub target: Option<Node>,
    trail: Vec<Node>,
    generation: u64,
}

/// Holds the flat listing of the current directory.
#[derive(Debug, Default)]
pub struct TreeNavigator {
    trail: Vec<Node>,
    rows: Vec<Row>,
    select_all: Status,
    generation: u64,
    loaded: bool,
}

impl TreeNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory being shown; `None` at the sources level.
    pub fn current(&self) -> Option<&Node> {
        self.trail.last()
    }

    pub fn current_path(&self) -> Option<&str> {
        self.current().map(|n| n.path.as_str())
    }

    /// Opened directories from the source down to the current one.
    pub fn breadcrumb(&self) -> &[Node] {
        &self.trail
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn select_all_icon(&self) -> Status {
        self.select_all
    }

    /// Whether any listing has been applied yet.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Issue a descent into `dir`. Supersedes any navigation still in flight.
    pub fn open(&mut self, dir: Node) -> Navigation {
        let mut trail = self.trail.clone();
        trail.push(dir.clone());
        self.issue(Some(dir), trail)
    }

    /// Issue a move one level up. At the sources level this reloads the
    /// sources.
    pub fn back(&mut self) -> Navigation {
        let mut trail = self.trail.clone();
        trail.pop();
        let target = trail.last().cloned();
        self.issue(target, trail)
    }

    /// Issue a jump to the breadcrumb entry at `depth` (0 = sources).
    pub fn jump(&mut self, depth: usize) -> Navigation {
        let mut trail = self.trail.clone();
        trail.truncate(depth);
        let target = trail.last().cloned();
        self.issue(target, trail)
    }

    fn issue(&mut self, target: Option<Node>, trail: Vec<Node>) -> Navigation {
        self.generation += 1;
        Navigation {
            target,
            trail,
            generation: self.generation,
        }
    }

    /// Whether `nav` is still the latest navigation issued.
    pub fn is_current(&self, nav: &Navigation) -> bool {
        nav.generation == self.generation
    }

    /// Replace the displayed listing with the result of `nav`.
    ///
    /// Returns `false`, leaving the display untouched, when a newer
    /// navigation has been issued since. Statuses must be recomputed with
    /// [`refresh`](Self::refresh) afterwards.
    pub fn apply(&mut self, nav: Navigation, children: Vec<Node>) -> bool {
        if !self.is_current(&nav) {
            return false;
        }
        self.trail = nav.trail;
        self.rows = children.into_iter().map(Row::new).collect();
        self.loaded = true;
        true
    }

    /// Recompute every row's status and the select-all icon.
    pub fn refresh(&mut self, model: &SelectionModel, registry: &DirectorySelectionRegistry) {
        for row in &mut self.rows {
            row.status = status_of(&row.node, model, registry);
        }
        self.select_all = aggregate(self.rows.iter().map(|r| r.status));
    }

    /// Drop the listing and invalidate anything in flight.
    pub fn reset(&mut self) {
        self.trail.clear();
        self.rows.clear();
        self.select_all = Status::Unselected;
        self.loaded = false;
        self.generation += 1;
    }
}
