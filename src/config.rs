//! Packaging configuration.
//!
//! A [`PackagingConfig`] is built once per run from defaults, an optional
//! JSON file and command-line overrides, then handed to the pipeline by
//! value. Nothing mutates it afterwards.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::artifact::{PluginMatcher, ScanMode};
use crate::error::PackagingError;
use crate::link_set::LinkPreference;
use crate::platform::PlatformId;
use crate::runtime::Runtime;

const CONFIG_DIR_NAME: &str = "slangpkg";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagingConfig {
    /// Case-insensitive name fragments marking a plugin
    pub plugin_fragments: Vec<String>,
    /// Dynamic-library extensions a plugin must have
    pub plugin_extensions: Vec<String>,
    /// Known static-link dependency chain, dependents first
    pub preferred_order: Vec<String>,
    /// Output directories to scan, relative to the install prefix
    pub scan_dirs: Vec<PathBuf>,
    pub scan_mode: ScanMode,
    /// Plugin destination, relative to the install prefix
    pub plugin_dir: PathBuf,
    /// Runtime search-path variable exported when plugins exist
    pub plugin_path_env: String,
    pub cmake_target_name: String,
    pub platform: PlatformId,
    pub linking: LinkPreference,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            plugin_fragments: strings(&["glsl", "glslang", "-module", "plugin"]),
            plugin_extensions: strings(&[".dll", ".so", ".dylib", ".bundle"]),
            preferred_order: strings(&["slang", "compiler-core", "core", "slang-rt"]),
            scan_dirs: vec![
                PathBuf::from("lib"),
                PathBuf::from("lib64"),
                PathBuf::from("bin"),
            ],
            scan_mode: ScanMode::Shallow,
            plugin_dir: PathBuf::from("plugins"),
            plugin_path_env: "SLANG_PLUGIN_PATH".to_string(),
            cmake_target_name: "slang::slang".to_string(),
            platform: PlatformId::detect(),
            linking: LinkPreference::Shared,
        }
    }
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub platform: Option<PlatformId>,
    pub linking: Option<LinkPreference>,
    pub scan_mode: Option<ScanMode>,
    pub plugin_dir: Option<PathBuf>,
}

impl PackagingConfig {
    /// Load the configuration for this run.
    ///
    /// Lookup order: `explicit` (from `--config` or `SLANGPKG_CONFIG`), then
    /// `<config dir>/slangpkg/config.json` if it exists, then defaults.
    /// A file named explicitly must exist.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(runtime, &path);
        }

        let fallback = runtime
            .config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .filter(|path| runtime.exists(path));
        if let Some(path) = fallback {
            return Self::from_file(runtime, &path);
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        debug!("Loading configuration from {:?}", path);
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read configuration {:?}", path))?;
        let config = serde_json::from_str(&content).map_err(|e| PackagingError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    pub fn with_overrides(self, overrides: ConfigOverrides) -> Self {
        Self {
            platform: overrides.platform.unwrap_or(self.platform),
            linking: overrides.linking.unwrap_or(self.linking),
            scan_mode: overrides.scan_mode.unwrap_or(self.scan_mode),
            plugin_dir: overrides.plugin_dir.unwrap_or(self.plugin_dir),
            ..self
        }
    }

    pub fn matcher(&self) -> PluginMatcher {
        PluginMatcher::new(&self.plugin_fragments, &self.plugin_extensions)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
