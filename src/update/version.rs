// Four-part application version
// Released versions are major.minor.patch; the build slot only marks local dev builds

use std::fmt;

/// Ordered as (major, minor, build, patch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AppVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub patch: u32,
}

impl AppVersion {
    pub const fn new(major: u32, minor: u32, build: u32, patch: u32) -> Self {
        Self { major, minor, build, patch }
    }

    /// The running build, from Cargo metadata. A pre-release tag like `pre3` sets the build slot.
    pub fn current() -> Self {
        let number = |s: &str| s.parse().unwrap_or(0);
        let build = env!("CARGO_PKG_VERSION_PRE")
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .parse()
            .unwrap_or(0);

        Self::new(
            number(env!("CARGO_PKG_VERSION_MAJOR")),
            number(env!("CARGO_PKG_VERSION_MINOR")),
            build,
            number(env!("CARGO_PKG_VERSION_PATCH")),
        )
    }

    /// Parse `major.minor.patch` into `(major, minor, 0, patch)`
    pub fn parse_semantic(text: &str) -> Option<Self> {
        let mut parts = text.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(major, minor, 0, patch))
    }

    /// `major.minor.patch` without the dev-build suffix, as stored in the cache
    pub fn semantic(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.build > 0 {
            write!(f, " (dev build {})", self.build)?;
        }
        Ok(())
    }
}
