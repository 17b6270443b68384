// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Update detection relative to the active version
//!
//! Compares the active version against the full published catalog and
//! reports up to three findings: a newer minor line, a newer patch on the
//! current line, and a pre-release newer than every stable release. The
//! comparison is pure; fetching the catalog is the caller's job so that a
//! network failure is reported as such and never as "up to date".

use crate::version::Version;

/// Newer versions found upstream, grouped by how far they stray from the
/// current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// The version the findings are relative to
    pub current: Version,
    /// Newest stable release on a higher minor line
    pub minor: Option<Version>,
    /// Newest stable patch on the current minor line
    pub patch: Option<Version>,
    /// Newest pre-release, only when it is ahead of every stable release
    pub pre: Option<Version>,
}

impl UpdateReport {
    /// Whether nothing newer was found.
    #[must_use]
    pub fn up_to_date(&self) -> bool {
        self.minor.is_none() && self.patch.is_none() && self.pre.is_none()
    }
}

/// Scan the published versions for updates relative to `current`.
#[must_use]
pub fn find_updates(available: &[Version], current: &Version) -> UpdateReport {
    let minor = available
        .iter()
        .filter(|v| v.is_stable())
        .filter(|v| v.major == current.major && v.minor_line() > current.minor_line())
        .max()
        .cloned();

    let patch = available
        .iter()
        .filter(|v| v.is_stable())
        .filter(|v| v.minor_line() == current.minor_line())
        .filter(|v| v.patch_level() > current.patch_level())
        .max()
        .cloned();

    let latest_stable = available.iter().filter(|v| v.is_stable()).max();
    let pre = available
        .iter()
        .filter(|v| !v.is_stable())
        .filter(|v| *v > current)
        .filter(|v| latest_stable.is_none_or(|stable| *v > stable))
        .max()
        .cloned();

    UpdateReport {
        current: current.clone(),
        minor,
        patch,
        pre,
    }
}
