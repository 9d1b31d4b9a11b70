use anyhow::Result;
use clap::Parser;
use slangpkg::{
    artifact::ScanMode, config::ConfigOverrides, link_set::LinkPreference, platform::PlatformId,
};
use std::path::PathBuf;

/// slangpkg - link metadata for an installed Slang build
///
/// Scans an install prefix, moves runtime-loaded plugins into their own
/// directory and prints the libraries consumers must link, in link order.
///
/// Examples:
///   slangpkg package /opt/slang              # Shared build on the host OS
///   slangpkg package /opt/slang --static     # Static archives, static link order
#[derive(Parser, Debug)]
#[command(author, version = env!("SLANGPKG_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON; also via SLANGPKG_CONFIG)
    #[arg(
        long = "config",
        short = 'c',
        env = "SLANGPKG_CONFIG",
        value_name = "PATH",
        global = true
    )]
    pub config: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Classify, relocate and resolve an install prefix
    Package(PackageArgs),

    /// Show whether file names would be treated as plugins
    Classify(ClassifyArgs),

    /// List the OS-provided libraries a platform links against
    SystemLibs(SystemLibsArgs),
}

#[derive(clap::Args, Debug)]
pub struct PackageArgs {
    /// Install prefix produced by the build's install step
    #[arg(value_name = "PREFIX")]
    pub prefix: PathBuf,

    /// Target operating system (defaults to the host)
    #[arg(long, value_name = "OS")]
    pub os: Option<PlatformId>,

    /// Link static archives
    #[arg(long = "static", conflicts_with = "shared")]
    pub static_link: bool,

    /// Link shared libraries
    #[arg(long)]
    pub shared: bool,

    /// Scan output directories recursively
    #[arg(long)]
    pub recursive: bool,

    /// Plugin directory, relative to the prefix
    #[arg(long, value_name = "DIR")]
    pub plugin_dir: Option<PathBuf>,

    /// Write the JSON to a file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl PackageArgs {
    fn overrides(&self) -> ConfigOverrides {
        let linking = match (self.static_link, self.shared) {
            (true, _) => Some(LinkPreference::Static),
            (_, true) => Some(LinkPreference::Shared),
            _ => None,
        };
        ConfigOverrides {
            platform: self.os.clone(),
            linking,
            scan_mode: self.recursive.then_some(ScanMode::Recursive),
            plugin_dir: self.plugin_dir.clone(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ClassifyArgs {
    /// File names to classify
    #[arg(value_name = "FILE", required = true)]
    pub names: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct SystemLibsArgs {
    /// Target operating system (defaults to the configured platform)
    #[arg(long, value_name = "OS")]
    pub os: Option<PlatformId>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = slangpkg::runtime::RealRuntime;

    match cli.command {
        Commands::Package(args) => {
            let overrides = args.overrides();
            slangpkg::commands::package(runtime, &args.prefix, cli.config, overrides, args.output)?
        }
        Commands::Classify(args) => slangpkg::commands::classify(runtime, &args.names, cli.config)?,
        Commands::SystemLibs(args) => {
            slangpkg::commands::system_libs(runtime, args.os, cli.config)?
        }
    }
    Ok(())
}
