//! Filesystem lookup along an ordered list of directories.
//!
//! Relative names never escape a search directory: names containing `..` are
//! rejected, and resolved paths must stay inside the directory they were found in.

use crate::FileFinder;
use log::debug;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct SearchPathFinder {
    dirs: Vec<PathBuf>,
}

impl SearchPathFinder {
    /// Directories are searched in the given order.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            dirs: dirs.into_iter().map(|d| d.as_ref().to_path_buf()).collect(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn resolve_in(dir: &Path, name: &str) -> Option<PathBuf> {
        let candidate = dir.join(name);
        let canonical = candidate.canonicalize().ok()?;
        let base = dir.canonicalize().ok()?;
        (canonical.starts_with(&base) && canonical.is_file()).then_some(canonical)
    }
}

impl FileFinder for SearchPathFinder {
    fn find_file(&self, name: &str) -> Option<PathBuf> {
        let path = Path::new(name);
        if path.is_absolute() {
            return path.is_file().then(|| path.to_path_buf());
        }
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            debug!("Rejected file name with parent reference: {}", name);
            return None;
        }
        let found = self.dirs.iter().find_map(|dir| Self::resolve_in(dir, name));
        if found.is_none() {
            debug!("'{}' not found in {} search path(s)", name, self.dirs.len());
        }
        found
    }
}
