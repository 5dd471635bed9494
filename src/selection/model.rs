use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::listing::{is_below, Node};

/// Metadata kept for a selected file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    pub id: String,
    pub name: String,
    pub path: String,
}

/// The set of selected files, in selection order.
///
/// Holds leaves only. Entries are indexed by identifier and by path so that
/// everything under a directory can be found without a tree.
#[derive(Debug, Default)]
pub struct SelectionModel {
    files: HashMap<String, (u64, SelectedFile)>,
    by_path: BTreeMap<String, String>,
    next_seq: u64,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file. Returns `false` if it was already present or is not a
    /// file.
    pub fn add(&mut self, node: &Node) -> bool {
        if !node.is_leaf() {
            tracing::warn!(id = %node.id, "refusing to add a directory to the file selection");
            return false;
        }
        if self.files.contains_key(&node.id) {
            return false;
        }
        let file = SelectedFile {
            id: node.id.clone(),
            name: node.name.clone(),
            path: node.path.clone(),
        };
        self.by_path.insert(file.path.clone(), file.id.clone());
        self.files.insert(file.id.clone(), (self.next_seq, file));
        self.next_seq += 1;
        true
    }

    /// Remove a file by identifier. No-op if absent.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.files.remove(id) {
            Some((_, file)) => {
                self.by_path.remove(&file.path);
                true
            }
            None => false,
        }
    }

    pub fn exists(&self, id: &str) -> bool {
        self.files.contains_key(id)
    }

    pub fn count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether any selected file lies below `dir_path`.
    pub fn any_below(&self, dir_path: &str) -> bool {
        self.ids_below(dir_path).next().is_some()
    }

    /// Remove every selected file below `dir_path`, whether or not it was ever
    /// displayed. Returns how many were removed.
    pub fn remove_below(&mut self, dir_path: &str) -> usize {
        let ids: Vec<String> = self.ids_below(dir_path).cloned().collect();
        for id in &ids {
            self.remove(id);
        }
        ids.len()
    }

    fn ids_below<'a>(&'a self, dir_path: &str) -> impl Iterator<Item = &'a String> + 'a {
        let dir_path = dir_path.trim_end_matches('/').to_string();
        let start = format!("{}/", dir_path);
        self.by_path
            .range(start..)
            .take_while(move |(path, _)| is_below(path, &dir_path))
            .map(|(_, id)| id)
    }

    /// Selected files in the order they were selected.
    pub fn files(&self) -> Vec<&SelectedFile> {
        let mut entries: Vec<&(u64, SelectedFile)> = self.files.values().collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, file)| file).collect()
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.by_path.clear();
    }
}
