//! Listing collaborator: the remote (or local) service that returns the
//! children of a path, either one level deep or as a flattened subtree.

pub mod local;
pub mod snapshot;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ListingError;

/// Kind of a listed entry. Serialized as the `class` field of the wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Directory,
}

/// One entry returned by a listing fetch.
///
/// Nodes are not persisted: they are rebuilt on every fetch, and two fetches
/// of the same path produce equal nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier, unique within its backend.
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(rename = "class")]
    pub kind: NodeKind,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
        kind: NodeKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            kind,
        }
    }

    /// Files are leaves; directories are not.
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Whether `path` lies strictly below `ancestor`.
///
/// Matching is by path segment, so `/a/bc` is not below `/a/b`.
pub fn is_below(path: &str, ancestor: &str) -> bool {
    let ancestor = ancestor.trim_end_matches('/');
    match path.strip_prefix(ancestor) {
        Some(rest) => rest.len() > 1 && rest.starts_with('/'),
        None => false,
    }
}

/// Service returning directory listings.
///
/// Implementations never return partial results: a fetch either yields the
/// whole listing or a `ListingError`.
#[async_trait]
pub trait ListingService: Send + Sync {
    /// The top-level listing shown when no directory is open.
    async fn list_sources(&self) -> Result<Vec<Node>, ListingError>;

    /// Children of `path`. With `recursive`, the whole subtree flattened,
    /// directories included.
    async fn list(&self, path: &str, recursive: bool) -> Result<Vec<Node>, ListingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_parses_wire_shape() {
        let json = r#"{"id":"d1","name":"directory1","path":"gxfiles://pdb-gzip/directory1","class":"Directory"}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind, NodeKind::Directory);
        assert!(!node.is_leaf());
        assert_eq!(node.path, "gxfiles://pdb-gzip/directory1");
    }

    #[test]
    fn node_rejects_unknown_class() {
        let json = r#"{"id":"x","name":"x","path":"/x","class":"Symlink"}"#;
        assert!(serde_json::from_str::<Node>(json).is_err());
    }

    #[test]
    fn is_below_matches_whole_segments() {
        assert!(is_below("/a/b/c", "/a/b"));
        assert!(is_below("/a/b/c", "/a/b/"));
        assert!(is_below("gxfiles://pdb/d1/f", "gxfiles://pdb/d1"));
        assert!(!is_below("/a/bc", "/a/b"));
        assert!(!is_below("/a/b", "/a/b"));
        assert!(!is_below("/a", "/a/b"));
    }
}
