use serde::Serialize;
use std::fmt;

use super::InstalledArtifact;

/// Role of an installed artifact. Every artifact has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactRole {
    Core,
    Plugin,
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactRole::Core => f.write_str("core"),
            ArtifactRole::Plugin => f.write_str("plugin"),
        }
    }
}

/// Name-based plugin heuristic.
///
/// A file is a plugin only when its extension is a dynamic-library extension
/// *and* its lower-cased name contains one of the fragments. Either condition
/// alone is not enough. File contents are never inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMatcher {
    fragments: Vec<String>,
    extensions: Vec<String>,
}

impl PluginMatcher {
    /// Build a matcher from fragment and extension sets. Matching is
    /// case-insensitive and extensions may be given with or without the
    /// leading dot.
    pub fn new<F, E>(fragments: F, extensions: E) -> Self
    where
        F: IntoIterator,
        F::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let fragments = fragments
            .into_iter()
            .map(|f| f.as_ref().to_lowercase())
            .filter(|f| !f.is_empty())
            .collect();
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            fragments,
            extensions,
        }
    }

    pub fn classify(&self, artifact: &InstalledArtifact) -> ArtifactRole {
        self.classify_parts(artifact.base_name(), artifact.extension())
    }

    /// Classify a bare file name such as `libslang-glslang.so`.
    pub fn classify_file_name(&self, file_name: &str) -> ArtifactRole {
        let extension = std::path::Path::new(file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        self.classify_parts(file_name, extension.as_deref())
    }

    /// Fragment check alone, for library names that have already lost their
    /// extension (`slang-glslang`).
    pub fn is_plugin_name(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.fragments.iter().any(|f| lower.contains(f.as_str()))
    }

    fn classify_parts(&self, file_name: &str, extension: Option<&str>) -> ArtifactRole {
        let dynamic = extension
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false);

        if dynamic && self.is_plugin_name(file_name) {
            ArtifactRole::Plugin
        } else {
            ArtifactRole::Core
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slang_matcher() -> PluginMatcher {
        PluginMatcher::new(
            ["glsl", "glslang", "-module", "plugin"],
            [".dll", ".so", ".dylib", ".bundle"],
        )
    }

    #[test]
    fn test_classify_plugin_needs_extension_and_fragment() {
        let matcher = slang_matcher();

        let plugin = InstalledArtifact::new("/p/lib/libslang-glslang.so");
        assert_eq!(matcher.classify(&plugin), ArtifactRole::Plugin);

        let module = InstalledArtifact::new("/p/bin/slang-llvm-module.dll");
        assert_eq!(matcher.classify(&module), ArtifactRole::Plugin);
    }

    #[test]
    fn test_classify_extension_without_fragment_is_core() {
        let matcher = slang_matcher();
        let artifact = InstalledArtifact::new("/p/lib/libslang.so");
        assert_eq!(matcher.classify(&artifact), ArtifactRole::Core);
    }

    #[test]
    fn test_classify_fragment_with_wrong_extension_is_core() {
        let matcher = slang_matcher();

        // Static archive and import library of a plugin are still core files
        let archive = InstalledArtifact::new("/p/lib/libslang-glslang.a");
        assert_eq!(matcher.classify(&archive), ArtifactRole::Core);

        let import = InstalledArtifact::new("/p/lib/slang-glslang.lib");
        assert_eq!(matcher.classify(&import), ArtifactRole::Core);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let matcher = slang_matcher();
        let artifact = InstalledArtifact::new("/p/bin/SLANG-GLSLANG.DLL");
        assert_eq!(matcher.classify(&artifact), ArtifactRole::Plugin);
    }

    #[test]
    fn test_classify_versioned_soname_is_core() {
        // Extension is "2", not "so"
        let matcher = slang_matcher();
        let artifact = InstalledArtifact::new("/p/lib/libslang-glslang.so.2");
        assert_eq!(matcher.classify(&artifact), ArtifactRole::Core);
    }

    #[test]
    fn test_classify_file_name_matches_classify() {
        let matcher = PluginMatcher::new(["glslang", "-module"], ["so"]);
        let names = ["libslang.so", "libslang-glslang-module.so", "libcore.a"];
        let roles: Vec<_> = names
            .iter()
            .map(|n| matcher.classify_file_name(n))
            .collect();
        assert_eq!(
            roles,
            vec![ArtifactRole::Core, ArtifactRole::Plugin, ArtifactRole::Core]
        );

        for name in names {
            let artifact = InstalledArtifact::new(format!("/p/lib/{}", name));
            assert_eq!(matcher.classify(&artifact), matcher.classify_file_name(name));
        }
    }

    #[test]
    fn test_is_plugin_name_ignores_extension_set() {
        let matcher = slang_matcher();
        assert!(matcher.is_plugin_name("slang-glslang"));
        assert!(matcher.is_plugin_name("gfx-Plugin"));
        assert!(!matcher.is_plugin_name("slang"));
        assert!(!matcher.is_plugin_name("compiler-core"));
    }

    #[test]
    fn test_empty_fragments_never_match() {
        let matcher = PluginMatcher::new(["", "glslang"], ["so"]);
        assert!(!matcher.is_plugin_name("slang"));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(ArtifactRole::Core.to_string(), "core");
        assert_eq!(ArtifactRole::Plugin.to_string(), "plugin");
    }
}
