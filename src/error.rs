// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Error taxonomy for goup operations
//!
//! Every fallible operation in the core surfaces one of these variants so
//! callers can tell "nothing to do" apart from "could not find out". In
//! particular, a catalog fetch failure is never reported as "up to date".

use std::io;

use crate::version::Version;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the registry, installer, switcher and catalog client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested version is not present in the local registry.
    #[error("Go {0} is not installed (run `goup use {0}` first)")]
    NotInstalled(Version),

    /// No published version matches the requested spec.
    #[error("no published Go version matches {0}")]
    NoMatchingVersion(String),

    /// The upstream catalog contains no stable release at all.
    #[error("no stable Go version found upstream")]
    NoStableVersion,

    /// A version string could not be parsed.
    #[error("invalid version {input:?}: {reason}")]
    InvalidVersion { input: String, reason: String },

    /// The downloaded archive does not match its published SHA-256.
    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    /// The catalog lists the version but has no archive for this platform.
    #[error("no {os}-{arch} archive published for Go {version}")]
    NoArchiveForPlatform {
        version: Version,
        os: &'static str,
        arch: &'static str,
    },

    /// A network request exceeded its deadline.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// A network request failed before a response arrived.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: attohttpc::Error,
    },

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// Another goup process holds the registry lock.
    #[error("another goup process is modifying the registry, try again later")]
    LockContention,

    /// The user home directory could not be located.
    #[error("could not locate the user home directory")]
    NoHomeDir,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to parse catalog data: {0}")]
    Catalog(#[from] serde_json::Error),
}

impl Error {
    /// Classify an attohttpc failure, mapping I/O deadline errors to the
    /// dedicated [`Error::Timeout`] variant.
    pub(crate) fn http(url: &str, err: attohttpc::Error) -> Self {
        if let attohttpc::ErrorKind::Io(io_err) = err.kind()
            && matches!(
                io_err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            )
        {
            return Self::Timeout {
                url: url.to_string(),
            };
        }
        Self::Network {
            url: url.to_string(),
            source: err,
        }
    }
}
