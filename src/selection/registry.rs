use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::listing::{is_below, Node};

/// A directory selected wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryMark {
    pub id: String,
    pub path: String,
}

/// Directories marked as fully selected, in marking order.
///
/// A mark stands for "every descendant is selected" without the descendants
/// having to be enumerated. Keyed by path for ancestor and prefix queries.
#[derive(Debug, Default)]
pub struct DirectorySelectionRegistry {
    by_path: BTreeMap<String, (u64, DirectoryMark)>,
    by_id: HashMap<String, String>,
    next_seq: u64,
}

impl DirectorySelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a directory. Returns `false` if already marked or not a directory.
    pub fn mark(&mut self, node: &Node) -> bool {
        if !node.is_dir() || self.by_id.contains_key(&node.id) {
            return false;
        }
        let mark = DirectoryMark {
            id: node.id.clone(),
            path: node.path.clone(),
        };
        self.by_id.insert(mark.id.clone(), mark.path.clone());
        self.by_path
            .insert(mark.path.clone(), (self.next_seq, mark));
        self.next_seq += 1;
        true
    }

    pub fn unmark(&mut self, id: &str) -> bool {
        match self.by_id.remove(id) {
            Some(path) => {
                self.by_path.remove(&path);
                true
            }
            None => false,
        }
    }

    pub fn is_marked(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Whether some marked directory strictly contains `path`.
    pub fn covers(&self, path: &str) -> bool {
        ancestors(path).any(|a| self.by_path.contains_key(a))
    }

    /// Whether any marked directory lies strictly below `dir_path`.
    pub fn any_below(&self, dir_path: &str) -> bool {
        self.paths_below(dir_path).next().is_some()
    }

    /// Unmark every directory strictly below `dir_path`.
    pub fn unmark_below(&mut self, dir_path: &str) -> Vec<DirectoryMark> {
        let paths: Vec<String> = self.paths_below(dir_path).cloned().collect();
        paths.iter().filter_map(|p| self.remove_path(p)).collect()
    }

    /// Unmark every directory strictly containing `path`.
    ///
    /// Used when something below them stops being selected: none of them is
    /// fully selected any more, however far up they are.
    pub fn unmark_ancestors_of(&mut self, path: &str) -> Vec<DirectoryMark> {
        let paths: Vec<String> = ancestors(path)
            .filter(|a| self.by_path.contains_key(*a))
            .map(str::to_string)
            .collect();
        paths.iter().filter_map(|p| self.remove_path(p)).collect()
    }

    fn remove_path(&mut self, path: &str) -> Option<DirectoryMark> {
        let (_, mark) = self.by_path.remove(path)?;
        self.by_id.remove(&mark.id);
        Some(mark)
    }

    fn paths_below<'a>(&'a self, dir_path: &str) -> impl Iterator<Item = &'a String> + 'a {
        let dir_path = dir_path.trim_end_matches('/').to_string();
        let start = format!("{}/", dir_path);
        self.by_path
            .range(start..)
            .take_while(move |(path, _)| is_below(path, &dir_path))
            .map(|(path, _)| path)
    }

    /// Marked directories in marking order.
    pub fn entries(&self) -> Vec<&DirectoryMark> {
        let mut entries: Vec<&(u64, DirectoryMark)> = self.by_path.values().collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, mark)| mark).collect()
    }

    pub fn clear(&mut self) {
        self.by_path.clear();
        self.by_id.clear();
    }
}

/// Proper ancestors of `path`, nearest first: `/a/b/c` yields `/a/b`, `/a`.
fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.trim_end_matches('/');
    trimmed
        .rmatch_indices('/')
        .map(move |(i, _)| &trimmed[..i])
        .filter(|a| !a.is_empty())
}
