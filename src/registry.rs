// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Local registry of installed Go SDKs
//!
//! The on-disk layout under the registry root (default `~/.local/goup`,
//! overridable with `$GOUP_HOME`):
//!
//! ```text
//! installations/<version>/go/...   one complete SDK per directory
//! staging/                         installer work area, never scanned
//! version                          active-version pointer record
//! current -> installations/<v>     symlink consumed by PATH/GOROOT
//! .lock                            exclusive lock for mutations
//! ```
//!
//! The `installations/` directory scan is the source of truth; the pointer
//! file is a separate small record reconciled against it on every read. A
//! pointer naming a version no longer on disk reads as "no active version"
//! rather than an error. Every call re-reads durable state; nothing is
//! cached across invocations.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs4::FileExt;

use crate::error::{Error, Result};
use crate::platform::GOUP_HOME_DIR;
use crate::version::Version;

const INSTALLATIONS_DIR: &str = "installations";
const STAGING_DIR: &str = "staging";
const ACTIVE_VERSION_FILE: &str = "version";
const CURRENT_LINK: &str = "current";
const LOCK_FILE: &str = ".lock";

/// One complete, installed SDK known to the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub version: Version,
    /// Root of the installation directory (contains the unpacked `go/` tree)
    pub path: PathBuf,
    /// Whether this entry is the active selection
    pub active: bool,
}

/// Handle to the durable registry state rooted at a directory
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
}

impl Registry {
    /// Open a registry rooted at the given directory. The directory is
    /// created lazily by the first mutating operation.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open the registry at `$GOUP_HOME`, or `~/.local/goup` if unset.
    ///
    /// # Errors
    /// Returns [`Error::NoHomeDir`] if neither can be determined.
    pub fn from_env() -> Result<Self> {
        if let Ok(dir) = std::env::var("GOUP_HOME")
            && !dir.is_empty()
        {
            return Ok(Self::open(dir));
        }
        let home = home::home_dir().ok_or(Error::NoHomeDir)?;
        Ok(Self::open(home.join(GOUP_HOME_DIR)))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn installations_dir(&self) -> PathBuf {
        self.root.join(INSTALLATIONS_DIR)
    }

    #[must_use]
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    /// Installation directory for a specific version.
    #[must_use]
    pub fn install_path(&self, version: &Version) -> PathBuf {
        self.installations_dir().join(version.to_string())
    }

    /// The `current` symlink pointing at the active installation.
    #[must_use]
    pub fn current_link(&self) -> PathBuf {
        self.root.join(CURRENT_LINK)
    }

    /// GOROOT of the active installation (the unpacked archive has a
    /// top-level `go/` directory).
    #[must_use]
    pub fn current_goroot(&self) -> PathBuf {
        self.current_link().join("go")
    }

    /// Directory holding the active `go` binary.
    #[must_use]
    pub fn current_bin_dir(&self) -> PathBuf {
        self.current_goroot().join("bin")
    }

    fn active_file(&self) -> PathBuf {
        self.root.join(ACTIVE_VERSION_FILE)
    }

    /// Create the registry root if it does not exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Scan the installations directory for registered versions, unsorted.
    ///
    /// Directory entries that do not parse as versions (editor droppings,
    /// hidden files) are ignored.
    pub fn scan(&self) -> Result<Vec<Version>> {
        let entries = match self.installations_dir().read_dir() {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(err.into()),
        };

        let mut versions = vec![];
        for entry in entries {
            let entry = entry?;
            if let Ok(version) = entry.file_name().to_string_lossy().parse() {
                versions.push(version);
            }
        }
        Ok(versions)
    }

    /// List installed versions ascending, each flagged if it is the active
    /// selection.
    pub fn list(&self) -> Result<Vec<InstalledVersion>> {
        let mut versions = self.scan()?;
        versions.sort();

        let active = self.active_version()?;
        Ok(versions
            .into_iter()
            .map(|version| {
                let path = self.install_path(&version);
                let is_active = active.as_ref() == Some(&version);
                InstalledVersion {
                    version,
                    path,
                    active: is_active,
                }
            })
            .collect())
    }

    /// Whether an exact version is installed.
    pub fn contains(&self, version: &Version) -> Result<bool> {
        Ok(self.scan()?.iter().any(|v| v == version))
    }

    /// Look up one installed version.
    pub fn get(&self, version: &Version) -> Result<Option<InstalledVersion>> {
        if !self.contains(version)? {
            return Ok(None);
        }
        let active = self.active_version()?.as_ref() == Some(version);
        Ok(Some(InstalledVersion {
            version: version.clone(),
            path: self.install_path(version),
            active,
        }))
    }

    /// Read the raw pointer record without reconciling it against disk.
    pub(crate) fn read_pointer(&self) -> Result<Option<Version>> {
        let content = match fs::read_to_string(self.active_file()) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(trimmed.parse().ok())
    }

    /// The currently active version, if any.
    ///
    /// A pointer referencing a version that is no longer installed is
    /// reported as no active version.
    pub fn active_version(&self) -> Result<Option<Version>> {
        match self.read_pointer()? {
            Some(version) if self.contains(&version)? => Ok(Some(version)),
            _ => Ok(None),
        }
    }

    /// Atomically rewrite (or remove) the active-version pointer record.
    ///
    /// The new content is written to a temporary file first and renamed
    /// into place, so a crash can never leave a half-written pointer.
    pub fn set_active_pointer(&self, version: Option<&Version>) -> Result<()> {
        let target = self.active_file();
        match version {
            Some(version) => {
                self.ensure_root()?;
                let tmp = self.root.join(".version.tmp");
                fs::write(&tmp, version.to_string())?;
                fs::rename(&tmp, &target)?;
            }
            None => match fs::remove_file(&target) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            },
        }
        Ok(())
    }

    /// Remove an installed version's directory from the registry.
    pub fn unregister(&self, version: &Version) -> io::Result<()> {
        fs::remove_dir_all(self.install_path(version))
    }

    /// Take the exclusive registry lock for a mutating operation.
    ///
    /// Fails fast with [`Error::LockContention`] if another process holds
    /// it; the lock is released when the guard drops.
    pub fn lock(&self) -> Result<RegistryLock> {
        self.ensure_root()?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.root.join(LOCK_FILE))?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(RegistryLock { file }),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Err(Error::LockContention),
            Err(err) => Err(err.into()),
        }
    }
}

/// Guard for the exclusive registry lock; unlocks on drop.
pub struct RegistryLock {
    file: File,
}

impl Drop for RegistryLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
