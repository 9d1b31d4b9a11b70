//! Target platform identification and the OS-provided libraries each
//! platform needs at link time.

mod detection;
mod system_libs;

pub use system_libs::system_libraries_for;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PackagingError;

/// Target operating system of a packaging run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PlatformId {
    Linux,
    Windows,
    Macos,
    Android,
    FreeBsd,
    Other(String),
}

impl PlatformId {
    pub fn as_str(&self) -> &str {
        match self {
            PlatformId::Linux => "linux",
            PlatformId::Windows => "windows",
            PlatformId::Macos => "macos",
            PlatformId::Android => "android",
            PlatformId::FreeBsd => "freebsd",
            PlatformId::Other(name) => name,
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = PackagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        let id = match name.as_str() {
            "" => return Err(PackagingError::UnknownPlatform(s.to_string())),
            "linux" => PlatformId::Linux,
            "windows" | "win32" => PlatformId::Windows,
            "macos" | "darwin" | "osx" => PlatformId::Macos,
            "android" => PlatformId::Android,
            "freebsd" => PlatformId::FreeBsd,
            _ => PlatformId::Other(name),
        };
        Ok(id)
    }
}

impl TryFrom<String> for PlatformId {
    type Error = PackagingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlatformId> for String {
    fn from(value: PlatformId) -> Self {
        value.as_str().to_string()
    }
}
