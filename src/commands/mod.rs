use anyhow::{Result, bail};
use log::debug;
use std::path::{Path, PathBuf};

use crate::{
    config::{ConfigOverrides, PackagingConfig},
    package::package_info,
    platform::{PlatformId, system_libraries_for},
    runtime::Runtime,
};

/// Package an install prefix and emit its link metadata as JSON, on stdout
/// or into `output`.
#[tracing::instrument(skip(runtime, overrides))]
pub fn package<R: Runtime>(
    runtime: R,
    prefix: &Path,
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
    output: Option<PathBuf>,
) -> Result<()> {
    if !runtime.is_dir(prefix) {
        bail!("Install prefix {:?} does not exist", prefix);
    }

    let config = PackagingConfig::load(&runtime, config_path)?.with_overrides(overrides);
    debug!("Effective configuration: {:?}", config);

    let info = package_info(&runtime, prefix, config)?;

    match output {
        Some(path) => {
            info.save(&runtime, &path)?;
            println!("Wrote package info to {}", path.display());
        }
        None => println!("{}", info.to_json()?),
    }
    Ok(())
}

/// Print how each file name would be classified.
pub fn classify<R: Runtime>(
    runtime: R,
    names: &[String],
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = PackagingConfig::load(&runtime, config_path)?;
    for line in classify_lines(&config, names) {
        println!("{}", line);
    }
    Ok(())
}

fn classify_lines(config: &PackagingConfig, names: &[String]) -> Vec<String> {
    let matcher = config.matcher();
    names
        .iter()
        .map(|name| format!("{}\t{}", matcher.classify_file_name(name), name))
        .collect()
}

/// Print the system libraries for `platform`, or for the configured platform.
pub fn system_libs<R: Runtime>(
    runtime: R,
    platform: Option<PlatformId>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let platform = match platform {
        Some(platform) => platform,
        None => PackagingConfig::load(&runtime, config_path)?.platform,
    };

    let libs = system_libraries_for(&platform);
    if libs.is_empty() {
        debug!("No system libraries listed for {}", platform);
    }
    for lib in libs {
        println!("{}", lib);
    }
    Ok(())
}
