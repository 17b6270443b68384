// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Platform detection for Go SDK archives
//!
//! Go publishes one `.tar.gz` archive per OS/architecture pair using its
//! own naming scheme (`amd64` rather than `x86_64`). This module maps the
//! runtime environment onto those names; the catalog is the authority for
//! the actual archive file names and URLs.

/// Base URL of the official Go download host.
pub const GO_DL_BASE: &str = "https://go.dev/dl";

/// Default registry location relative to the user's home directory.
pub const GOUP_HOME_DIR: &str = ".local/goup";

/// A target platform for Go SDK archives
///
/// `os` and `arch` use Go's spelling, which is what the upstream catalog
/// reports for each published archive file.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Human-readable platform name (e.g. "linux-amd64")
    pub name: &'static str,
    /// Operating system component as Go spells it
    pub os: &'static str,
    /// Architecture component as Go spells it
    pub arch: &'static str,
}

impl Platform {
    pub const LINUX_AMD64: Platform = Platform {
        name: "linux-amd64",
        os: "linux",
        arch: "amd64",
    };

    pub const LINUX_ARM64: Platform = Platform {
        name: "linux-arm64",
        os: "linux",
        arch: "arm64",
    };

    pub const LINUX_386: Platform = Platform {
        name: "linux-386",
        os: "linux",
        arch: "386",
    };

    pub const DARWIN_AMD64: Platform = Platform {
        name: "darwin-amd64",
        os: "darwin",
        arch: "amd64",
    };

    pub const DARWIN_ARM64: Platform = Platform {
        name: "darwin-arm64",
        os: "darwin",
        arch: "arm64",
    };

    /// Automatically detect the current platform based on OS and architecture
    ///
    /// Falls back to LINUX_AMD64 for unsupported combinations.
    #[must_use]
    pub fn detect() -> Platform {
        match (std::env::consts::OS, std::env::consts::ARCH) {
            ("linux", "x86_64") => Self::LINUX_AMD64,
            ("linux", "aarch64") => Self::LINUX_ARM64,
            ("linux", "x86") => Self::LINUX_386,
            ("macos", "x86_64") => Self::DARWIN_AMD64,
            ("macos", "aarch64") => Self::DARWIN_ARM64,
            ("linux", _) => Self::LINUX_AMD64,
            ("macos", _) => Self::DARWIN_AMD64,
            _ => Self::LINUX_AMD64,
        }
    }
}
