//! Packaging pipeline
//!
//! One run walks an install prefix and turns what it finds into link
//! metadata: scan the output directories, classify each file, move plugins
//! aside, order the remaining libraries and attach the platform's system
//! libraries.

mod info;

pub use info::PackageInfo;

use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::artifact::{ArtifactRole, InstalledArtifact, PluginMatcher, ScanMode, scan, scan_excluding};
use crate::config::PackagingConfig;
use crate::error::PackagingError;
use crate::link_set::{library_name, resolve};
use crate::platform::system_libraries_for;
use crate::relocate::relocate;
use crate::runtime::{Runtime, is_path_under};

/// Compute the link metadata for the install tree under `prefix`.
///
/// Plugins found in the scanned directories are moved into the configured
/// plugin directory as a side effect. Any failure aborts the run; no partial
/// [`PackageInfo`] is produced.
#[tracing::instrument(skip(runtime, config))]
pub fn package_info<R: Runtime>(
    runtime: &R,
    prefix: &Path,
    config: PackagingConfig,
) -> Result<PackageInfo> {
    info!(
        "Packaging {:?} for {} ({:?} linking)",
        prefix, config.platform, config.linking
    );

    let matcher = config.matcher();
    let roots: Vec<PathBuf> = config.scan_dirs.iter().map(|d| prefix.join(d)).collect();
    let plugin_dir = prefix.join(&config.plugin_dir);

    // A scan root inside the plugin dir would be excluded from the scan
    if let Some(root) = roots.iter().find(|root| is_path_under(root, &plugin_dir)) {
        return Err(PackagingError::PluginDirOverlapsScanDir {
            plugin_dir: config.plugin_dir.clone(),
            scan_dir: relative_to(root, prefix),
        }
        .into());
    }

    let artifacts = scan_excluding(
        runtime,
        &roots,
        config.scan_mode,
        std::slice::from_ref(&plugin_dir),
    )
    .with_context(|| format!("Failed to scan install prefix {:?}", prefix))?;

    let (plugins, cores): (Vec<_>, Vec<_>) = artifacts
        .into_iter()
        .partition(|a| matcher.classify(a) == ArtifactRole::Plugin);

    for plugin in &plugins {
        debug!("Classified {:?} as plugin", plugin.path());
    }

    if !plugins.is_empty() {
        relocate(runtime, &plugins, &plugin_dir)
            .with_context(|| format!("Failed to relocate plugins into {:?}", plugin_dir))?;
    }

    let installed_plugins = installed_plugins(runtime, &plugin_dir, &matcher)?;

    let libraries: Vec<(String, &InstalledArtifact)> = cores
        .iter()
        .filter_map(|core| library_name(core, config.linking).map(|name| (name, core)))
        .collect();
    let names: BTreeSet<String> = libraries.iter().map(|(name, _)| name.clone()).collect();

    let libs = resolve(&names, &config.preferred_order, &matcher);
    debug!("Link order: {:?}", libs);

    // Only directories that hold a library which is actually linked
    let mut lib_dirs = Vec::new();
    for (name, core) in &libraries {
        if !libs.iter().any(|linked| linked == name.as_str()) {
            continue;
        }
        if let Some(dir) = core.directory() {
            let dir = relative_to(dir, prefix);
            if !lib_dirs.contains(&dir) {
                lib_dirs.push(dir);
            }
        }
    }

    let bin_dirs = roots
        .iter()
        .filter(|root| root.file_name().is_some_and(|n| n == "bin") && runtime.is_dir(root))
        .map(|root| relative_to(root, prefix))
        .collect();

    let mut runtime_env = BTreeMap::new();
    let exported_plugin_dir = if installed_plugins.is_empty() {
        None
    } else {
        runtime_env.insert(
            config.plugin_path_env.clone(),
            plugin_dir.to_string_lossy().into_owned(),
        );
        Some(plugin_dir)
    };

    Ok(PackageInfo {
        cmake_target_name: config.cmake_target_name,
        shared: config.linking.is_shared(),
        system_libs: system_libraries_for(&config.platform)
            .iter()
            .map(|s| s.to_string())
            .collect(),
        platform: config.platform,
        libs,
        lib_dirs,
        bin_dirs,
        plugin_dir: exported_plugin_dir,
        plugins: installed_plugins,
        runtime_env,
    })
}

/// File names of the plugins present in `plugin_dir`, sorted. Includes
/// plugins relocated by earlier runs.
fn installed_plugins<R: Runtime>(
    runtime: &R,
    plugin_dir: &Path,
    matcher: &PluginMatcher,
) -> Result<Vec<String>> {
    let mut names: Vec<String> = scan(runtime, &[plugin_dir.to_path_buf()], ScanMode::Shallow)?
        .iter()
        .filter(|a| matcher.classify(a) == ArtifactRole::Plugin)
        .map(InstalledArtifact::base_name)
        .map(String::from)
        .collect();
    names.sort();
    Ok(names)
}

fn relative_to(path: &Path, prefix: &Path) -> PathBuf {
    path.strip_prefix(prefix)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}
