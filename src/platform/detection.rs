use super::PlatformId;

impl PlatformId {
    /// Detect the platform this binary was compiled for.
    pub fn detect() -> Self {
        #[cfg(target_os = "linux")]
        {
            PlatformId::Linux
        }
        #[cfg(target_os = "windows")]
        {
            PlatformId::Windows
        }
        #[cfg(target_os = "macos")]
        {
            PlatformId::Macos
        }
        #[cfg(target_os = "android")]
        {
            PlatformId::Android
        }
        #[cfg(target_os = "freebsd")]
        {
            PlatformId::FreeBsd
        }
        #[cfg(not(any(
            target_os = "linux",
            target_os = "windows",
            target_os = "macos",
            target_os = "android",
            target_os = "freebsd"
        )))]
        {
            PlatformId::Other(std::env::consts::OS.to_string())
        }
    }
}
