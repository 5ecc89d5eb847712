//! Directory-to-tree crawler.
//!
//! [`crawl`] walks a cases directory and emits one [`HierarchyNode`] per
//! directory. Leaf-ness is a flag on the node, not a pruning signal: children
//! of a case directory are still crawled, and it is the registrar that decides
//! never to register them.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostics::{HarnessError, Result};
use crate::pattern::FileGlob;

/// One directory in the crawled cases tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    /// Display name: the directory's base name, or the root label.
    pub group_name: String,
    pub directory_path: PathBuf,
    /// Whether the directory directly contains a file matching the indicator.
    pub contains_test: bool,
    /// Immediate child directories, sorted by name.
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        self.contains_test
    }

    /// Number of cases the registrar will produce for this subtree.
    pub fn case_count(&self) -> usize {
        if self.contains_test {
            return 1;
        }
        self.children.iter().map(HierarchyNode::case_count).sum()
    }

    /// Total number of directories in this subtree, including this one.
    pub fn directory_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(HierarchyNode::directory_count)
            .sum::<usize>()
    }
}

/// Crawls `directory_path` into a hierarchy labelled `group_name`.
///
/// Fails with [`HarnessError::Discovery`] when the directory (or any
/// subdirectory) cannot be listed. Discovery errors are not retried.
pub fn crawl(group_name: &str, directory_path: &Path, indicator: &FileGlob) -> Result<HierarchyNode> {
    let mut child_directories = Vec::new();
    let mut contains_test = false;

    for entry in WalkDir::new(directory_path)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| HarnessError::Discovery {
            path: directory_path.to_path_buf(),
            source: io::Error::from(e),
        })?;

        if entry.depth() == 0 {
            if !entry.file_type().is_dir() {
                return Err(HarnessError::Discovery {
                    path: directory_path.to_path_buf(),
                    source: io::Error::other("not a directory"),
                });
            }
            continue;
        }

        if entry.file_type().is_dir() {
            child_directories.push(entry.into_path());
            continue;
        }

        if !contains_test && indicator.is_match(&entry.file_name().to_string_lossy()) {
            contains_test = true;
        }
    }

    tracing::debug!(
        directory = %directory_path.display(),
        contains_test,
        children = child_directories.len(),
        "crawled directory"
    );

    let children = child_directories
        .iter()
        .map(|child| {
            let name = child
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            crawl(&name, child, indicator)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(HierarchyNode {
        group_name: group_name.to_string(),
        directory_path: directory_path.to_path_buf(),
        contains_test,
        children,
    })
}
