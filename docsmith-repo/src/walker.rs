//! Repository walker: yields every eligible file under a root directory

use crate::filter::FileFilter;
use docsmith_core::{invalid_repository_error, DiscoveredFile, DocsmithResult};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Fail with `InvalidRepositoryPath` unless `path` is an existing directory
pub fn validate_repository_root<P: AsRef<Path>>(path: P) -> DocsmithResult<PathBuf> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(invalid_repository_error!(
            path.display(),
            "path does not exist",
            "repository_walker"
        ));
    }

    if !path.is_dir() {
        return Err(invalid_repository_error!(
            path.display(),
            "path is not a directory",
            "repository_walker"
        ));
    }

    Ok(path.to_path_buf())
}

/// Lazy traversal of a repository that prunes excluded directories and
/// yields included files as (absolute path, relative path) pairs
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
    filter: FileFilter,
}

impl FileWalker {
    pub fn new<P: AsRef<Path>>(root: P, filter: FileFilter) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            filter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Iterate eligible files. Sibling entries are visited in file-name order.
    pub fn walk(&self) -> impl Iterator<Item = DiscoveredFile> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| self.should_descend(entry))
            .filter_map(move |result| match result {
                Ok(entry) => self.to_discovered(&entry),
                Err(e) => {
                    // Skip entries we can't process
                    warn!(error = %e, "Skipping unreadable repository entry");
                    None
                }
            })
    }

    fn should_descend(&self, entry: &DirEntry) -> bool {
        // The root itself is never pruned, whatever its name
        entry.depth() == 0
            || !entry.file_type().is_dir()
            || self.filter.should_traverse_directory(entry.path())
    }

    fn to_discovered(&self, entry: &DirEntry) -> Option<DiscoveredFile> {
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file || !self.filter.should_include_file(entry.path()) {
            return None;
        }

        let relative = entry.path().strip_prefix(&self.root).ok()?;
        let relative_path = to_slash_path(relative);
        if relative.to_str().is_none() {
            warn!(
                file = %relative_path,
                "File name is not valid UTF-8; reporting it with replacement characters"
            );
        }

        debug!(file = %relative_path, "Discovered file");

        Some(DiscoveredFile {
            absolute_path: entry.path().to_path_buf(),
            relative_path,
        })
    }
}

/// Join path components with `/` regardless of platform
fn to_slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
