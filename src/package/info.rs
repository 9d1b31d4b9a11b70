use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::link_set::LinkSet;
use crate::platform::PlatformId;
use crate::runtime::Runtime;

/// Consumer-facing link metadata for an installed package
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PackageInfo {
    pub cmake_target_name: String,
    pub platform: PlatformId,
    pub shared: bool,
    /// Libraries to link, in link order
    pub libs: LinkSet,
    pub system_libs: Vec<String>,
    /// Directories holding `libs`, relative to the install prefix
    pub lib_dirs: Vec<PathBuf>,
    pub bin_dirs: Vec<PathBuf>,
    /// Absent when the install produced no plugins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,
    /// Environment consumers need at runtime, e.g. the plugin search path
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub runtime_env: BTreeMap<String, String>,
}

impl PackageInfo {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize package info")
    }

    pub fn save<R: Runtime>(&self, runtime: &R, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        runtime
            .write(path, json.as_bytes())
            .with_context(|| format!("Failed to write package info to {:?}", path))
    }

    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        let info: PackageInfo = serde_json::from_str(&content)?;
        Ok(info)
    }
}
