//! Selection state: the per-file model, the wholesale directory registry,
//! and the tri-state derived from them.

pub mod model;
pub mod registry;

use serde::Serialize;

use crate::listing::Node;
use model::SelectionModel;
use registry::DirectorySelectionRegistry;

/// Rendered selection state of a row.
///
/// `Mixed` is never stored; it only comes out of [`status_of`] and
/// [`aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Selected,
    #[default]
    Unselected,
    Mixed,
}

impl Status {
    /// Checkbox-style marker used by the table.
    pub fn marker(self) -> &'static str {
        match self {
            Status::Selected => "[x]",
            Status::Unselected => "[ ]",
            Status::Mixed => "[-]",
        }
    }
}

/// Status of a listed node against the current selection.
///
/// A directory is selected when it, or one of its ancestors, is marked; mixed
/// when anything below it is selected or marked.
///
/// A marked empty directory is `Selected` here, as a row of its parent. Inside
/// that directory the listing is empty and [`aggregate`] reports it
/// `Unselected`.
pub fn status_of(
    node: &Node,
    model: &SelectionModel,
    registry: &DirectorySelectionRegistry,
) -> Status {
    if node.is_leaf() {
        return if model.exists(&node.id) {
            Status::Selected
        } else {
            Status::Unselected
        };
    }
    if registry.is_marked(&node.id) || registry.covers(&node.path) {
        Status::Selected
    } else if model.any_below(&node.path) || registry.any_below(&node.path) {
        Status::Mixed
    } else {
        Status::Unselected
    }
}

/// Combined status of a set of rows. No rows at all is `Unselected`.
pub fn aggregate<I>(statuses: I) -> Status
where
    I: IntoIterator<Item = Status>,
{
    let mut any = false;
    let mut all_selected = true;
    let mut all_unselected = true;
    for status in statuses {
        any = true;
        all_selected &= status == Status::Selected;
        all_unselected &= status == Status::Unselected;
    }
    if !any || all_unselected {
        Status::Unselected
    } else if all_selected {
        Status::Selected
    } else {
        Status::Mixed
    }
}
