// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Bulk and single removal of installed versions
//!
//! Removal is per-entry: one installation that fails to delete does not
//! stop the others, and the report carries both the removed versions and
//! the failures. Removing the active version clears the activation state
//! first so the symlink and pointer never dangle.

use std::io;

use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::switch;
use crate::version::Version;

/// Which installed versions a [`clean`] pass removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanScope {
    /// Everything except the active version
    NonActive,
    /// Every installed version, including the active one
    All,
}

/// Outcome of a [`clean`] pass
#[derive(Debug, Default)]
pub struct CleanReport {
    /// Versions removed, ascending
    pub removed: Vec<Version>,
    /// Versions that could not be removed, with the failure for each
    pub failed: Vec<(Version, io::Error)>,
}

/// Remove installed versions according to the scope.
///
/// # Errors
/// Returns an error only if the registry cannot be read or locked;
/// per-version removal failures are collected in the report instead.
pub fn clean(registry: &Registry, scope: CleanScope) -> Result<CleanReport> {
    let _lock = registry.lock()?;

    let entries = registry.list()?;

    if scope == CleanScope::All && entries.iter().any(|e| e.active) {
        switch::relink_current(registry, None)?;
        registry.set_active_pointer(None)?;
    }

    let mut report = CleanReport::default();
    for entry in entries {
        if scope == CleanScope::NonActive && entry.active {
            continue;
        }
        match registry.unregister(&entry.version) {
            Ok(()) => report.removed.push(entry.version),
            Err(err) => report.failed.push((entry.version, err)),
        }
    }
    Ok(report)
}

/// Remove a single installed version.
///
/// If the version is active, the activation state is cleared first.
///
/// # Errors
/// Returns [`Error::NotInstalled`] if the version is not in the registry.
pub fn remove(registry: &Registry, version: &Version) -> Result<()> {
    let _lock = registry.lock()?;

    let installed = registry
        .get(version)?
        .ok_or_else(|| Error::NotInstalled(version.clone()))?;

    if installed.active {
        switch::relink_current(registry, None)?;
        registry.set_active_pointer(None)?;
    }

    registry.unregister(version)?;
    Ok(())
}
