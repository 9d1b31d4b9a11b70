use super::PlatformId;

/// OS-provided libraries a consumer must link against, per platform.
///
/// The table is static: these are never discovered from the install tree.
/// Platforms without an entry need nothing beyond the toolchain defaults.
pub fn system_libraries_for(os: &PlatformId) -> &'static [&'static str] {
    match os {
        PlatformId::Linux => &["dl", "pthread", "m"],
        PlatformId::FreeBsd => &["pthread", "m"],
        PlatformId::Windows => &["advapi32", "kernel32", "user32"],
        PlatformId::Macos | PlatformId::Android | PlatformId::Other(_) => &[],
    }
}
