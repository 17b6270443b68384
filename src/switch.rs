// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Atomic switching of the active Go version
//!
//! Activation flips two pieces of durable state: the `current` symlink that
//! shell setups point PATH and GOROOT at, and the pointer record the CLI
//! reads back. Both are replaced by writing a fresh temporary and renaming
//! it over the old entry, so a reader never observes a half-switched state.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::version::Version;

/// Make an installed version the active one
///
/// Re-activating the already-active version is a no-op (the symlink is
/// still recreated if it went missing).
///
/// # Errors
/// Returns [`Error::NotInstalled`] if the version is not in the registry,
/// leaving the previous selection untouched.
pub fn activate(registry: &Registry, version: &Version) -> Result<()> {
    let _lock = registry.lock()?;

    // Looked up under the lock so a concurrent clean cannot remove the
    // installation between the check and the commit.
    let installed = registry
        .get(version)?
        .ok_or_else(|| Error::NotInstalled(version.clone()))?;

    relink_current(registry, Some(&installed.path))?;
    registry.set_active_pointer(Some(version))?;
    Ok(())
}

/// Point the `current` symlink at a new target, or remove it
///
/// Callers must hold the registry lock. Replacement goes through a
/// temporary link renamed over the old one so the link is never absent
/// mid-switch.
pub(crate) fn relink_current(registry: &Registry, target: Option<&Path>) -> Result<()> {
    let link = registry.current_link();
    match target {
        Some(target) => {
            let tmp = registry.root().join(".current.tmp");
            match fs::remove_file(&tmp) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
            std::os::unix::fs::symlink(target, &tmp)?;
            fs::rename(&tmp, &link)?;
        }
        None => {
            // is_symlink() also catches a dangling link, which exists()
            // reports as absent.
            if link.exists() || link.is_symlink() {
                fs::remove_file(&link)?;
            }
        }
    }
    Ok(())
}
