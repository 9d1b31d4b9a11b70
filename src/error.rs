//! Error kinds raised by the packaging core.
//!
//! Missing scan roots and ambiguous classifications are deliberately absent:
//! the former are skipped, the latter cannot happen.

use std::path::PathBuf;
use thiserror::Error;

/// Terminal failures of a packaging run.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// The plugin destination directory could not be created. Raised before
    /// any plugin is touched.
    #[error("Failed to create plugin directory {path}: {reason}")]
    DestinationCreateFailed { path: PathBuf, reason: String },

    /// Copying a plugin into the destination failed. The source is kept.
    #[error("Failed to copy plugin {path}: {reason}")]
    RelocationCopyFailed { path: PathBuf, reason: String },

    /// The copied plugin does not match its source byte for byte. The source
    /// is kept.
    #[error("Copied plugin {path} does not match its source")]
    RelocationVerifyFailed { path: PathBuf },

    /// The plugin was copied and verified but the original could not be
    /// removed.
    #[error("Failed to remove relocated plugin source {path}: {reason}")]
    SourceRemoveFailed { path: PathBuf, reason: String },

    /// The plugin directory is a scan directory or contains one, so that
    /// directory would never be scanned.
    #[error("Plugin directory {plugin_dir} contains scan directory {scan_dir}")]
    PluginDirOverlapsScanDir { plugin_dir: PathBuf, scan_dir: PathBuf },

    /// A configuration file could not be parsed.
    #[error("Invalid configuration in {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    /// A platform name was empty.
    #[error("Unknown platform: {0:?}")]
    UnknownPlatform(String),
}
