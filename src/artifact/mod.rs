//! Installed artifacts and how they are told apart
//!
//! After an install step the packager walks the prefix's output directories
//! and classifies every file it finds as either a core library, which is
//! linked, or a plugin, which is loaded at runtime and must not be.

mod classifier;
mod scanner;

pub use classifier::{ArtifactRole, PluginMatcher};
pub use scanner::{ScanMode, scan, scan_excluding};

use std::path::{Path, PathBuf};

/// A file found under one of the scanned output directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledArtifact {
    path: PathBuf,
    base_name: String,
    extension: Option<String>,
}

impl InstalledArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let base_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        Self {
            path,
            base_name,
            extension,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name including its extension, e.g. `libslang.so`.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Lower-cased last extension without the dot, e.g. `so`.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }
}
