use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{ListingService, Node, NodeKind};
use crate::error::ListingError;

/// A named top-level directory offered at the sources level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub path: PathBuf,
}

/// Listing backed by the local filesystem.
///
/// Node identifiers and paths are the absolute path as a string. Symlinks are
/// reported by what they point at and broken links are skipped. A recursive
/// listing reads every real directory once, so links back into the walk do
/// not loop.
#[derive(Debug, Clone)]
pub struct LocalListing {
    sources: Vec<Source>,
    show_hidden: bool,
    dirs_first: bool,
}

impl LocalListing {
    pub fn new(sources: Vec<Source>) -> Self {
        Self {
            sources,
            show_hidden: false,
            dirs_first: true,
        }
    }

    pub fn show_hidden(mut self, show: bool) -> Self {
        self.show_hidden = show;
        self
    }

    pub fn dirs_first(mut self, dirs_first: bool) -> Self {
        self.dirs_first = dirs_first;
        self
    }

    /// Read the immediate children of `dir`.
    async fn read_children(&self, dir: &Path) -> Result<Vec<Node>, ListingError> {
        let display = dir.to_string_lossy().to_string();
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| ListingError::io(display.clone(), &e))?;

        let mut nodes = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(e)) => e,
                Ok(None) => break,
                Err(e) => return Err(ListingError::io(display, &e)),
            };
            let name = entry.file_name().to_string_lossy().to_string();
            if !self.show_hidden && name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            // Follows symlinks; a broken link has no metadata and is dropped.
            let metadata = match fs::metadata(&path).await {
                Ok(m) => m,
                Err(_) => continue,
            };
            let kind = if metadata.is_dir() {
                NodeKind::Directory
            } else {
                NodeKind::File
            };
            let path_str = path.to_string_lossy().to_string();
            nodes.push(Node::new(path_str.clone(), name, path_str, kind));
        }

        self.sort(&mut nodes);
        Ok(nodes)
    }

    fn sort(&self, nodes: &mut [Node]) {
        let dirs_first = self.dirs_first;
        nodes.sort_by(|a, b| {
            let mut cmp = std::cmp::Ordering::Equal;
            if dirs_first {
                cmp = b.is_dir().cmp(&a.is_dir());
            }
            cmp.then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
    }

    /// Walk the subtree under `root`, parents before their children.
    ///
    /// Any directory that cannot be read fails the whole walk.
    async fn read_subtree(&self, root: &Path) -> Result<Vec<Node>, ListingError> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            let real = fs::canonicalize(&dir)
                .await
                .map_err(|e| ListingError::io(dir.to_string_lossy().to_string(), &e))?;
            if !visited.insert(real) {
                tracing::debug!(dir = %dir.display(), "already walked, not descending");
                continue;
            }
            let children = self.read_children(&dir).await?;
            for child in children.iter().rev() {
                if child.is_dir() {
                    stack.push(PathBuf::from(&child.path));
                }
            }
            out.extend(children);
        }

        Ok(out)
    }
}

#[async_trait]
impl ListingService for LocalListing {
    async fn list_sources(&self) -> Result<Vec<Node>, ListingError> {
        Ok(self
            .sources
            .iter()
            .map(|s| {
                let path = s.path.to_string_lossy().to_string();
                Node::new(path.clone(), s.name.clone(), path, NodeKind::Directory)
            })
            .collect())
    }

    async fn list(&self, path: &str, recursive: bool) -> Result<Vec<Node>, ListingError> {
        tracing::debug!(path, recursive, "local listing");
        let dir = Path::new(path);
        if recursive {
            self.read_subtree(dir).await
        } else {
            self.read_children(dir).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self as stdfs, File};
    use tempfile::TempDir;

    fn setup_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        stdfs::create_dir(dir.path().join("alpha")).unwrap();
        stdfs::create_dir(dir.path().join("beta")).unwrap();
        File::create(dir.path().join("file_a.txt")).unwrap();
        File::create(dir.path().join("File_b.rs")).unwrap();
        File::create(dir.path().join(".hidden")).unwrap();
        stdfs::create_dir(dir.path().join("alpha").join("nested")).unwrap();
        File::create(dir.path().join("alpha").join("inner.txt")).unwrap();
        File::create(dir.path().join("alpha").join("nested").join("deep.txt")).unwrap();
        dir
    }

    fn listing_for(dir: &TempDir) -> LocalListing {
        LocalListing::new(vec![Source {
            name: "temp".into(),
            path: dir.path().to_path_buf(),
        }])
    }

    fn names(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[tokio::test]
    async fn sources_are_directories() {
        let dir = setup_test_dir();
        let sources = listing_for(&dir).list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "temp");
        assert!(sources[0].is_dir());
        assert_eq!(sources[0].path, dir.path().to_string_lossy());
    }

    #[tokio::test]
    async fn lists_dirs_first_and_skips_hidden() {
        let dir = setup_test_dir();
        let root = dir.path().to_string_lossy().to_string();
        let nodes = listing_for(&dir).list(&root, false).await.unwrap();
        assert_eq!(names(&nodes), vec!["alpha", "beta", "file_a.txt", "File_b.rs"]);
        assert!(nodes[0].is_dir());
        assert!(nodes[2].is_leaf());
    }

    #[tokio::test]
    async fn show_hidden_includes_dotfiles() {
        let dir = setup_test_dir();
        let root = dir.path().to_string_lossy().to_string();
        let nodes = listing_for(&dir)
            .show_hidden(true)
            .list(&root, false)
            .await
            .unwrap();
        assert!(names(&nodes).contains(&".hidden"));
    }

    #[tokio::test]
    async fn dirs_first_off_sorts_by_name_only() {
        let dir = setup_test_dir();
        stdfs::create_dir(dir.path().join("zeta")).unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let nodes = listing_for(&dir)
            .dirs_first(false)
            .list(&root, false)
            .await
            .unwrap();
        assert_eq!(
            names(&nodes),
            vec!["alpha", "beta", "file_a.txt", "File_b.rs", "zeta"]
        );
    }

    #[tokio::test]
    async fn recursive_listing_flattens_subtree() {
        let dir = setup_test_dir();
        let alpha = dir.path().join("alpha").to_string_lossy().to_string();
        let nodes = listing_for(&dir).list(&alpha, true).await.unwrap();
        let mut got = names(&nodes);
        got.sort();
        assert_eq!(got, vec!["deep.txt", "inner.txt", "nested"]);
        assert!(nodes.iter().all(|n| crate::listing::is_below(&n.path, &alpha)));
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let dir = setup_test_dir();
        let missing = dir.path().join("nope").to_string_lossy().to_string();
        let err = listing_for(&dir).list(&missing, true).await.unwrap_err();
        assert_eq!(err, ListingError::NotFound(missing));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_cycles_are_walked_once() {
        let dir = TempDir::new().unwrap();
        let d = dir.path().join("d");
        stdfs::create_dir(&d).unwrap();
        File::create(d.join("f")).unwrap();
        std::os::unix::fs::symlink(&d, d.join("a")).unwrap();
        std::os::unix::fs::symlink(&d, d.join("b")).unwrap();

        let path = d.to_string_lossy().to_string();
        let listing = LocalListing::new(vec![]);
        let walk = listing.list(&path, true);
        let nodes = tokio::time::timeout(std::time::Duration::from_secs(10), walk)
            .await
            .expect("walk terminates")
            .unwrap();
        let mut got = names(&nodes);
        got.sort();
        assert_eq!(got, vec!["a", "b", "f"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unreadable_subdirectory_fails_the_walk() {
        use std::os::unix::fs::PermissionsExt;

        let dir = setup_test_dir();
        let locked = dir.path().join("alpha").join("nested");
        stdfs::set_permissions(&locked, stdfs::Permissions::from_mode(0o000)).unwrap();
        // Permission bits do not apply to root.
        let enforced = stdfs::read_dir(&locked).is_err();

        let alpha = dir.path().join("alpha").to_string_lossy().to_string();
        let result = listing_for(&dir).list(&alpha, true).await;
        stdfs::set_permissions(&locked, stdfs::Permissions::from_mode(0o755)).unwrap();

        if enforced {
            match result {
                Err(ListingError::Io { path, .. }) => assert!(path.ends_with("nested")),
                other => panic!("expected the walk to fail, got {:?}", other),
            }
        } else {
            assert!(result.is_ok());
        }
    }

    #[tokio::test]
    async fn empty_directory_lists_nothing() {
        let dir = setup_test_dir();
        let beta = dir.path().join("beta").to_string_lossy().to_string();
        let nodes = listing_for(&dir).list(&beta, false).await.unwrap();
        assert!(nodes.is_empty());
    }
}
