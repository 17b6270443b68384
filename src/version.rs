// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Parsing, ordering and matching for Go SDK version identifiers
//!
//! Go releases do not follow semver. Published identifiers have the form
//! `major(.minor(.patch))(alpha|beta|rcN)`, and `.0` patch releases are
//! published without the trailing `.0` (the catalog lists `1.19`, not
//! `1.19.0`). The [`Version`] type keeps exactly the components that were
//! written, so displaying a parsed identifier reproduces it verbatim.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Pre-release stage of an unstable Go version, ordered by maturity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Prerelease {
    Alpha(u64),
    Beta(u64),
    Rc(u64),
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alpha(n) => write!(f, "alpha{n}"),
            Self::Beta(n) => write!(f, "beta{n}"),
            Self::Rc(n) => write!(f, "rc{n}"),
        }
    }
}

/// A Go SDK version identifier
///
/// Missing components are preserved as `None` rather than normalized to
/// zero, so `"1.19"` and `"1.19.0"` compare equal in magnitude but remain
/// distinct values (the former is how Go publishes the release, the latter
/// is how a user may spell an install target).
///
/// # Examples
/// ```
/// use goup::Version;
///
/// let v: Version = "1.20.4".parse().unwrap();
/// assert_eq!(v.to_string(), "1.20.4");
///
/// let rc: Version = "1.21rc2".parse().unwrap();
/// assert!(!rc.is_stable());
/// assert!(rc < "1.21".parse().unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub pre: Option<Prerelease>,
}

impl Version {
    /// Returns `true` if this version is a stable release (no alpha, beta
    /// or rc suffix).
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.pre.is_none()
    }

    /// The `major.minor` grouping this version belongs to, with a missing
    /// minor counting as zero.
    #[must_use]
    pub fn minor_line(&self) -> (u64, u64) {
        (self.major, self.minor.unwrap_or(0))
    }

    /// Patch component with a missing patch counting as zero, the value Go
    /// implies when it publishes a `.0` release without the suffix.
    #[must_use]
    pub fn patch_level(&self) -> u64 {
        self.patch.unwrap_or(0)
    }

    /// Returns `true` if this (possibly partial) version spec covers the
    /// given concrete version: every component spelled out in `self` must
    /// match the corresponding component of `other`.
    ///
    /// # Examples
    /// ```
    /// use goup::Version;
    ///
    /// let spec: Version = "1.19".parse().unwrap();
    /// assert!(spec.covers(&"1.19.7".parse().unwrap()));
    /// assert!(!spec.covers(&"1.20.1".parse().unwrap()));
    ///
    /// // "1.19.0" covers the published "1.19" release.
    /// let exact: Version = "1.19.0".parse().unwrap();
    /// assert!(exact.covers(&"1.19".parse().unwrap()));
    /// assert!(!exact.covers(&"1.19.1".parse().unwrap()));
    /// ```
    #[must_use]
    pub fn covers(&self, other: &Version) -> bool {
        if self.major != other.major {
            return false;
        }
        if let Some(minor) = self.minor
            && minor != other.minor.unwrap_or(0)
        {
            return false;
        }
        if let Some(patch) = self.patch
            && patch != other.patch.unwrap_or(0)
        {
            return false;
        }
        if let Some(pre) = self.pre
            && other.pre != Some(pre)
        {
            return false;
        }
        true
    }
}

/// Compare optional components by magnitude first; on a tie the implicit
/// form sorts below the explicit one so ordering stays consistent with
/// equality ("1.19" < "1.19.0" < "1.19.1").
fn cmp_component(a: Option<u64>, b: Option<u64>) -> Ordering {
    a.unwrap_or(0)
        .cmp(&b.unwrap_or(0))
        .then_with(|| match (a, b) {
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            _ => Ordering::Equal,
        })
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| cmp_component(self.minor, other.minor))
            .then_with(|| cmp_component(self.patch, other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                // A release outranks its own pre-releases.
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{minor}")?;
        }
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        }
        if let Some(pre) = &self.pre {
            write!(f, "{pre}")?;
        }
        Ok(())
    }
}

fn parse_prerelease(s: &str) -> Option<Prerelease> {
    if let Some(n) = s.strip_prefix("alpha") {
        return n.parse().ok().map(Prerelease::Alpha);
    }
    if let Some(n) = s.strip_prefix("beta") {
        return n.parse().ok().map(Prerelease::Beta);
    }
    if let Some(n) = s.strip_prefix("rc") {
        return n.parse().ok().map(Prerelease::Rc);
    }
    None
}

impl FromStr for Version {
    type Err = Error;

    /// Parse a Go version identifier such as `1`, `1.19`, `1.20.4` or
    /// `1.21rc2`. An optional leading `v`/`V` is tolerated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| Error::InvalidVersion {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let body = s
            .strip_prefix('v')
            .or_else(|| s.strip_prefix('V'))
            .unwrap_or(s);

        // The numeric dotted part ends where the pre-release suffix begins.
        let split = body
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(body.len());
        let (base, suffix) = body.split_at(split);

        let mut parts = base.split('.');
        let major = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| invalid("missing major version"))?
            .parse()
            .map_err(|_| invalid("major version is not a number"))?;
        let minor = parts
            .next()
            .map(|p| {
                p.parse()
                    .map_err(|_| invalid("minor version is not a number"))
            })
            .transpose()?;
        let patch = parts
            .next()
            .map(|p| {
                p.parse()
                    .map_err(|_| invalid("patch version is not a number"))
            })
            .transpose()?;
        if parts.next().is_some() {
            return Err(invalid("too many version components"));
        }

        let pre = if suffix.is_empty() {
            None
        } else {
            Some(parse_prerelease(suffix).ok_or_else(|| invalid("unrecognized suffix"))?)
        };

        Ok(Version {
            major,
            minor,
            patch,
            pre,
        })
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
