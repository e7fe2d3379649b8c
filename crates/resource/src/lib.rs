//! Resource lookup for layout runs.
//!
//! - [`FileFinder`]: resolves a file name used in a layout rule to a path
//! - [`SearchPathFinder`]: looks names up in an ordered list of directories
//! - [`image_size`]: natural size of an image file in points

mod filesystem;
mod images;

use std::path::PathBuf;
use thiserror::Error;

pub use filesystem::SearchPathFinder;
pub use images::{image_size, image_size_at_dpi};

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Could not read image '{path}': {message}")]
    Image { path: String, message: String },
}

/// Locates files referenced by layout rules.
pub trait FileFinder {
    fn find_file(&self, name: &str) -> Option<PathBuf>;

    /// Like [`FileFinder::find_file`] but a miss is an error.
    fn require_file(&self, name: &str) -> Result<PathBuf, ResourceError> {
        self.find_file(name)
            .ok_or_else(|| ResourceError::NotFound(name.to_string()))
    }
}
