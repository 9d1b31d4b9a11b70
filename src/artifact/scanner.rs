use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::InstalledArtifact;
use crate::runtime::{Runtime, is_path_under};

/// How deep [`scan`] looks below each root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Immediate children only
    #[default]
    Shallow,
    /// All descendants, without following symlinked directories
    Recursive,
}

/// Collect the files under `roots`.
///
/// Roots are visited in the order given and roots that do not exist are
/// skipped. A root that resolves to a directory already visited (`lib64`
/// symlinked to `lib`) is skipped too, as is, in recursive mode, a root
/// inside an earlier one. Within a directory, entries come back in filesystem enumeration
/// order, which is not sorted.
pub fn scan<R: Runtime>(
    runtime: &R,
    roots: &[PathBuf],
    mode: ScanMode,
) -> Result<Vec<InstalledArtifact>> {
    scan_excluding(runtime, roots, mode, &[])
}

/// Same as [`scan`], but nothing at or below any of `excluded` is returned
/// or descended into.
#[tracing::instrument(skip(runtime))]
pub fn scan_excluding<R: Runtime>(
    runtime: &R,
    roots: &[PathBuf],
    mode: ScanMode,
    excluded: &[PathBuf],
) -> Result<Vec<InstalledArtifact>> {
    let mut artifacts = Vec::new();
    let mut visited: Vec<PathBuf> = Vec::new();

    for root in roots {
        if !runtime.exists(root) || !runtime.is_dir(root) {
            debug!("Skipping missing scan root {:?}", root);
            continue;
        }
        if is_excluded(root, excluded) {
            debug!("Skipping excluded scan root {:?}", root);
            continue;
        }

        let canonical = runtime
            .canonicalize(root)
            .unwrap_or_else(|_| root.clone());
        let seen = visited.iter().any(|earlier| match mode {
            ScanMode::Shallow => *earlier == canonical,
            ScanMode::Recursive => is_path_under(&canonical, earlier),
        });
        if seen {
            debug!("Skipping scan root {:?}, already scanned as {:?}", root, canonical);
            continue;
        }
        visited.push(canonical);

        walk(runtime, root, mode, excluded, &mut artifacts)?;
    }

    debug!("Found {} artifact(s)", artifacts.len());
    Ok(artifacts)
}

fn walk<R: Runtime>(
    runtime: &R,
    dir: &Path,
    mode: ScanMode,
    excluded: &[PathBuf],
    artifacts: &mut Vec<InstalledArtifact>,
) -> Result<()> {
    let entries = runtime
        .read_dir(dir)
        .with_context(|| format!("Failed to list {:?}", dir))?;

    for entry in entries {
        if is_excluded(&entry, excluded) {
            continue;
        }
        if !runtime.is_dir(&entry) {
            artifacts.push(InstalledArtifact::new(entry));
            continue;
        }
        match mode {
            ScanMode::Shallow => {}
            ScanMode::Recursive if runtime.is_symlink(&entry) => {
                debug!("Not following symlinked directory {:?}", entry);
            }
            ScanMode::Recursive => walk(runtime, &entry, mode, excluded, artifacts)?,
        }
    }

    Ok(())
}

fn is_excluded(path: &Path, excluded: &[PathBuf]) -> bool {
    excluded.iter().any(|dir| is_path_under(path, dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use std::fs;
    use tempfile::tempdir;

    fn names(artifacts: &[InstalledArtifact]) -> Vec<&str> {
        artifacts.iter().map(|a| a.base_name()).collect()
    }

    #[test]
    fn test_scan_skips_missing_roots() {
        // Test that roots which do not exist are skipped without error

        let mut runtime = MockRuntime::new();

        // --- Setup Paths ---
        let lib = PathBuf::from("/opt/slang/lib");
        let lib64 = PathBuf::from("/opt/slang/lib64");

        // --- 1. Check Roots Exist ---

        // /opt/slang/lib -> true, /opt/slang/lib64 -> false
        runtime
            .expect_exists()
            .with(eq(lib.clone()))
            .returning(|_| true);
        runtime
            .expect_exists()
            .with(eq(lib64.clone()))
            .returning(|_| false);

        // Canonical paths are the paths themselves
        runtime
            .expect_canonicalize()
            .returning(|p| Ok(p.to_path_buf()));

        // --- 2. Scan lib ---

        runtime
            .expect_read_dir()
            .with(eq(lib.clone()))
            .returning(|p| Ok(vec![p.join("libslang.so")]));

        runtime
            .expect_is_dir()
            .with(eq(lib.clone()))
            .returning(|_| true);
        runtime
            .expect_is_dir()
            .with(eq(lib.join("libslang.so")))
            .returning(|_| false);

        // --- Execute & Verify ---

        let artifacts = scan(&runtime, &[lib, lib64], ScanMode::Shallow).unwrap();
        assert_eq!(names(&artifacts), vec!["libslang.so"]);
    }

    #[test]
    fn test_scan_shallow_ignores_subdirectories() {
        // Test that shallow mode neither returns nor enters subdirectories

        let mut runtime = MockRuntime::new();
        let lib = PathBuf::from("/opt/slang/lib");

        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_canonicalize()
            .returning(|p| Ok(p.to_path_buf()));

        // Read dir /opt/slang/lib -> [cmake/, libslang.so]
        runtime
            .expect_read_dir()
            .with(eq(lib.clone()))
            .times(1)
            .returning(|p| Ok(vec![p.join("cmake"), p.join("libslang.so")]));

        runtime
            .expect_is_dir()
            .returning(|p| !p.ends_with("libslang.so"));

        let artifacts = scan(&runtime, &[lib], ScanMode::Shallow).unwrap();
        assert_eq!(names(&artifacts), vec!["libslang.so"]);
    }

    #[test]
    fn test_scan_keeps_root_order_then_enumeration_order() {
        let mut runtime = MockRuntime::new();
        let lib = PathBuf::from("/p/lib");
        let bin = PathBuf::from("/p/bin");

        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_canonicalize()
            .returning(|p| Ok(p.to_path_buf()));
        runtime
            .expect_is_dir()
            .returning(|p| p == Path::new("/p/lib") || p == Path::new("/p/bin"));

        // Enumeration order is deliberately not alphabetical
        runtime
            .expect_read_dir()
            .with(eq(bin.clone()))
            .returning(|p| Ok(vec![p.join("slangc"), p.join("slang.dll")]));
        runtime
            .expect_read_dir()
            .with(eq(lib.clone()))
            .returning(|p| Ok(vec![p.join("libz.a"), p.join("liba.a")]));

        let artifacts = scan(&runtime, &[bin, lib], ScanMode::Shallow).unwrap();
        assert_eq!(
            names(&artifacts),
            vec!["slangc", "slang.dll", "libz.a", "liba.a"]
        );
    }

    #[test]
    fn test_scan_propagates_read_errors() {
        let mut runtime = MockRuntime::new();
        let lib = PathBuf::from("/p/lib");

        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_canonicalize()
            .returning(|p| Ok(p.to_path_buf()));
        runtime.expect_is_dir().returning(|_| true);
        runtime
            .expect_read_dir()
            .returning(|_| Err(anyhow::anyhow!("Permission denied")));

        let err = scan(&runtime, &[lib], ScanMode::Shallow).unwrap_err();
        assert!(format!("{:#}", err).contains("Permission denied"));
    }

    #[test]
    fn test_scan_recursive_real_tree() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir_all(lib.join("slang/nested")).unwrap();
        fs::write(lib.join("libslang.so"), b"a").unwrap();
        fs::write(lib.join("slang/libcore.a"), b"b").unwrap();
        fs::write(lib.join("slang/nested/libslang-glslang.so"), b"c").unwrap();

        let mut shallow = names(&scan(&runtime, &[lib.clone()], ScanMode::Shallow).unwrap())
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        shallow.sort();
        assert_eq!(shallow, vec!["libslang.so"]);

        let mut recursive = names(&scan(&runtime, &[lib], ScanMode::Recursive).unwrap())
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        recursive.sort();
        assert_eq!(
            recursive,
            vec!["libcore.a", "libslang-glslang.so", "libslang.so"]
        );
    }

    #[test]
    fn test_scan_excluding_skips_directory() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        let plugins = lib.join("plugins");
        fs::create_dir_all(&plugins).unwrap();
        fs::write(lib.join("libslang.so"), b"a").unwrap();
        fs::write(plugins.join("libslang-glslang.so"), b"b").unwrap();

        let artifacts =
            scan_excluding(&runtime, &[lib], ScanMode::Recursive, &[plugins]).unwrap();
        assert_eq!(names(&artifacts), vec!["libslang.so"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_recursive_does_not_follow_symlinked_dirs() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("libslang.so"), b"a").unwrap();
        // A loop back to the root would recurse forever if followed
        std::os::unix::fs::symlink(&lib, lib.join("loop")).unwrap();

        let artifacts = scan(&runtime, &[lib], ScanMode::Recursive).unwrap();
        assert_eq!(names(&artifacts), vec!["libslang.so"]);
    }

    #[test]
    fn test_scan_skips_root_resolving_to_earlier_root() {
        // lib64 and lib canonicalize to the same directory

        let mut runtime = MockRuntime::new();
        let lib = PathBuf::from("/opt/slang/lib");
        let lib64 = PathBuf::from("/opt/slang/lib64");

        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_is_dir()
            .returning(|p| !p.ends_with("libslang.so"));
        runtime
            .expect_canonicalize()
            .returning(|_| Ok(PathBuf::from("/opt/slang/lib")));

        // Only the first root is listed
        runtime
            .expect_read_dir()
            .with(eq(lib.clone()))
            .times(1)
            .returning(|p| Ok(vec![p.join("libslang.so")]));
        runtime.expect_read_dir().with(eq(lib64.clone())).never();

        let artifacts = scan(&runtime, &[lib, lib64], ScanMode::Shallow).unwrap();
        assert_eq!(names(&artifacts), vec!["libslang.so"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_symlinked_lib64_listed_once() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("libslang.so"), b"a").unwrap();
        fs::write(lib.join("libslang-glslang.so"), b"b").unwrap();
        std::os::unix::fs::symlink(&lib, dir.path().join("lib64")).unwrap();

        let roots = [lib, dir.path().join("lib64")];
        for mode in [ScanMode::Shallow, ScanMode::Recursive] {
            let artifacts = scan(&runtime, &roots, mode).unwrap();
            assert_eq!(artifacts.len(), 2);
            assert!(artifacts.iter().all(|a| a.path().starts_with(&roots[0])));
        }
    }

    #[test]
    fn test_scan_recursive_skips_root_nested_in_earlier_root() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir_all(lib.join("slang")).unwrap();
        fs::write(lib.join("slang/libslang.so"), b"a").unwrap();

        let roots = [lib.clone(), lib.join("slang")];
        let recursive = scan(&runtime, &roots, ScanMode::Recursive).unwrap();
        assert_eq!(names(&recursive), vec!["libslang.so"]);

        // Shallow scans do not overlap, so both roots are listed
        let shallow = scan(&runtime, &roots, ScanMode::Shallow).unwrap();
        assert_eq!(names(&shallow), vec!["libslang.so"]);
    }
}
