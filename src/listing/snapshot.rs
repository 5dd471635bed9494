use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::{ListingService, Node};
use crate::error::ListingError;

/// In-memory listing loaded from a recorded JSON snapshot.
///
/// ```json
/// { "sources": [ {node} ], "entries": { "<dir path>": [ {node}, ... ] } }
/// ```
///
/// A directory without an `entries` key cannot be listed directly, but counts
/// as empty when reached during a recursive walk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotListing {
    sources: Vec<Node>,
    #[serde(default)]
    entries: HashMap<String, Vec<Node>>,
}

impl SnapshotListing {
    pub fn new(sources: Vec<Node>) -> Self {
        Self {
            sources,
            entries: HashMap::new(),
        }
    }

    /// Register the children of `path`.
    pub fn with_entries(mut self, path: impl Into<String>, children: Vec<Node>) -> Self {
        self.entries.insert(path.into(), children);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ListingError> {
        serde_json::from_str(json).map_err(|e| ListingError::Malformed(e.to_string()))
    }

    /// Read a snapshot file from disk.
    pub fn load(path: &Path) -> Result<Self, ListingError> {
        let display = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ListingError::io(display, &e))?;
        Self::from_json(&content)
    }

    fn subtree(&self, root: &str) -> Vec<Node> {
        let mut out = Vec::new();
        let mut stack = vec![root.to_string()];
        while let Some(dir) = stack.pop() {
            let Some(children) = self.entries.get(&dir) else {
                continue;
            };
            for child in children.iter().rev() {
                if child.is_dir() {
                    stack.push(child.path.clone());
                }
            }
            out.extend(children.iter().cloned());
        }
        out
    }
}

#[async_trait]
impl ListingService for SnapshotListing {
    async fn list_sources(&self) -> Result<Vec<Node>, ListingError> {
        Ok(self.sources.clone())
    }

    async fn list(&self, path: &str, recursive: bool) -> Result<Vec<Node>, ListingError> {
        if !self.entries.contains_key(path) {
            return Err(ListingError::NotFound(path.to_string()));
        }
        if recursive {
            Ok(self.subtree(path))
        } else {
            Ok(self.entries.get(path).cloned().unwrap_or_default())
        }
    }
}

/// The tree used by dialog tests:
///
/// ```text
/// pdb-gzip
/// |-- directory1
/// |   |-- directory1file1
/// |   |-- directory1file2
/// |   |-- directory1file3
/// |   |-- subdirectory1
/// |   |   `-- subsubdirectory
/// |   |       `-- subsubfile
/// |   `-- subdirectory2
/// |       `-- subdirectory2file
/// |-- directory2
/// |   |-- directory2file1
/// |   |-- directory2file2
/// |   `-- emptydir
/// |-- file1
/// `-- file2
/// ```
#[cfg(test)]
pub(crate) fn dialog_fixture() -> SnapshotListing {
    use super::NodeKind::{Directory, File};

    const ROOT: &str = "gxfiles://pdb-gzip";
    let node = |parent: &str, name: &str, kind| {
        Node::new(name, name, format!("{}/{}", parent, name), kind)
    };
    let d1 = format!("{ROOT}/directory1");
    let d2 = format!("{ROOT}/directory2");
    let sub1 = format!("{d1}/subdirectory1");
    let subsub = format!("{sub1}/subsubdirectory");
    let sub2 = format!("{d1}/subdirectory2");
    let empty = format!("{d2}/emptydir");

    SnapshotListing::new(vec![Node::new("pdb-gzip", "pdb-gzip", ROOT, Directory)])
        .with_entries(
            ROOT,
            vec![
                node(ROOT, "directory1", Directory),
                node(ROOT, "directory2", Directory),
                node(ROOT, "file1", File),
                node(ROOT, "file2", File),
            ],
        )
        .with_entries(
            d1.clone(),
            vec![
                node(&d1, "directory1file1", File),
                node(&d1, "directory1file2", File),
                node(&d1, "directory1file3", File),
                node(&d1, "subdirectory1", Directory),
                node(&d1, "subdirectory2", Directory),
            ],
        )
        .with_entries(sub1.clone(), vec![node(&sub1, "subsubdirectory", Directory)])
        .with_entries(subsub.clone(), vec![node(&subsub, "subsubfile", File)])
        .with_entries(sub2.clone(), vec![node(&sub2, "subdirectory2file", File)])
        .with_entries(
            d2.clone(),
            vec![
                node(&d2, "directory2file1", File),
                node(&d2, "directory2file2", File),
                node(&d2, "emptydir", Directory),
            ],
        )
        .with_entries(empty, Vec::new())
}
