//! Link-order resolution.
//!
//! Some linkers resolve static archives in a single pass, so a library has to
//! appear before the libraries it depends on. The preferred order encodes the
//! known chain (facade first, then its core and runtime support libraries);
//! everything else follows alphabetically so the result is deterministic.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::artifact::{InstalledArtifact, PluginMatcher};

/// Whether consumers link the package statically or against shared
/// libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPreference {
    Static,
    #[default]
    Shared,
}

impl LinkPreference {
    /// Extensions of files that count as link libraries for this preference.
    /// `.lib` is both a static archive and an import library on Windows.
    pub fn library_extensions(self) -> &'static [&'static str] {
        match self {
            LinkPreference::Static => &["a", "lib"],
            LinkPreference::Shared => &["so", "dylib", "lib"],
        }
    }

    pub fn is_shared(self) -> bool {
        self == LinkPreference::Shared
    }
}

/// Ordered library names exposed to consumers. Never contains duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkSet(Vec<String>);

impl LinkSet {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Order `all` for linking.
///
/// Names from `preferred` that are present come first, in `preferred`'s
/// order. The rest follow in ascending order. Names the matcher considers
/// plugins are dropped everywhere, including from the preferred prefix.
pub fn resolve(all: &BTreeSet<String>, preferred: &[String], matcher: &PluginMatcher) -> LinkSet {
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut ordered = Vec::with_capacity(all.len());

    for name in preferred {
        if !all.contains(name) || emitted.contains(name.as_str()) {
            continue;
        }
        if matcher.is_plugin_name(name) {
            warn!("Preferred library {:?} looks like a plugin, not linking it", name);
            continue;
        }
        emitted.insert(name);
        ordered.push(name.clone());
    }

    // BTreeSet iteration is already ascending
    for name in all {
        if emitted.contains(name.as_str()) || matcher.is_plugin_name(name) {
            continue;
        }
        ordered.push(name.clone());
    }

    LinkSet(ordered)
}

/// Link name of an installed file, if it is a library under `preference`.
///
/// `libslang.so` becomes `slang`, `slang.lib` stays `slang`. Versioned
/// sonames such as `libslang.so.2025` are not link names.
pub fn library_name(artifact: &InstalledArtifact, preference: LinkPreference) -> Option<String> {
    let extension = artifact.extension()?;
    if !preference
        .library_extensions()
        .iter()
        .any(|ext| *ext == extension)
    {
        return None;
    }

    let stem = artifact.path().file_stem()?.to_string_lossy();
    let name = match stem.get(..3) {
        Some(prefix) if extension != "lib" && prefix.eq_ignore_ascii_case("lib") => &stem[3..],
        _ => stem.as_ref(),
    };

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
