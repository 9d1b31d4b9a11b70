//! Moves plugin artifacts into their own directory.
//!
//! A plugin is copied, the copy is compared against the source, and only then
//! is the source removed. A failure at any step stops the whole relocation
//! and leaves the failing plugin's source in place.

use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::artifact::InstalledArtifact;
use crate::error::PackagingError;
use crate::runtime::Runtime;
use crate::runtime::path::normalize_path;

/// Where a plugin ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocatedArtifact {
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[tracing::instrument(skip(runtime, plugins))]
pub fn relocate<R: Runtime>(
    runtime: &R,
    plugins: &[InstalledArtifact],
    destination: &Path,
) -> Result<Vec<RelocatedArtifact>, PackagingError> {
    runtime
        .create_dir_all(destination)
        .map_err(|e| PackagingError::DestinationCreateFailed {
            path: destination.to_path_buf(),
            reason: format!("{:#}", e),
        })?;

    let mut relocated = Vec::with_capacity(plugins.len());
    for plugin in plugins {
        relocated.push(relocate_one(runtime, plugin, destination)?);
    }

    Ok(relocated)
}

fn relocate_one<R: Runtime>(
    runtime: &R,
    plugin: &InstalledArtifact,
    destination: &Path,
) -> Result<RelocatedArtifact, PackagingError> {
    let source = plugin.path();
    let target = destination.join(plugin.base_name());

    if normalize_path(source) == normalize_path(&target) {
        debug!("Plugin {:?} already in place", source);
        return Ok(RelocatedArtifact {
            source: source.to_path_buf(),
            destination: target,
        });
    }

    runtime
        .copy(source, &target)
        .map_err(|e| PackagingError::RelocationCopyFailed {
            path: source.to_path_buf(),
            reason: format!("{:#}", e),
        })?;

    verify_copy(runtime, source, &target)?;

    runtime
        .remove_file(source)
        .map_err(|e| PackagingError::SourceRemoveFailed {
            path: source.to_path_buf(),
            reason: format!("{:#}", e),
        })?;

    info!("Relocated plugin {:?} -> {:?}", source, target);
    Ok(RelocatedArtifact {
        source: source.to_path_buf(),
        destination: target,
    })
}

fn verify_copy<R: Runtime>(runtime: &R, source: &Path, target: &Path) -> Result<(), PackagingError> {
    let copy_failed = |e: anyhow::Error| PackagingError::RelocationCopyFailed {
        path: source.to_path_buf(),
        reason: format!("{:#}", e),
    };

    let original = runtime.read(source).map_err(copy_failed)?;
    let copied = runtime.read(target).map_err(copy_failed)?;

    if original != copied {
        return Err(PackagingError::RelocationVerifyFailed {
            path: target.to_path_buf(),
        });
    }
    Ok(())
}
