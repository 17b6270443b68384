// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Download, verification and transactional installation of Go SDKs
//!
//! All work happens in the registry's staging area. The downloaded archive
//! is checked against its published SHA-256 and unpacked in staging, and
//! only a fully verified tree is renamed into `installations/`. A crash at
//! any earlier point leaves residue only in staging, which the next install
//! clears before starting.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use std::time::Duration;

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};

use crate::catalog::{self, Catalog, ReleaseFile};
use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::registry::{InstalledVersion, Registry};
use crate::version::Version;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-read deadline for the archive download; archives are ~70-150 MB so
/// there is no sensible whole-transfer deadline.
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Resolve a possibly-partial version spec against the catalog, refreshing
/// the cache once if the spec matches nothing in it.
///
/// # Errors
/// Returns [`Error::NoMatchingVersion`] if the spec matches nothing even
/// after a refresh.
pub fn resolve_version(spec: &Version, verbose: bool) -> Result<(Catalog, Version)> {
    let catalog = catalog::load_catalog(verbose)?;
    if let Some(release) = catalog.resolve(spec) {
        let version = release.version.clone();
        return Ok((catalog, version));
    }

    catalog::refresh_for_missing_version(spec, verbose)?;

    let catalog = catalog::load_catalog(verbose)?;
    match catalog.resolve(spec) {
        Some(release) => {
            let version = release.version.clone();
            Ok((catalog, version))
        }
        None => Err(Error::NoMatchingVersion(spec.to_string())),
    }
}

/// Install a version into the registry if it is not there already
///
/// The version must be a concrete catalog identifier (use
/// [`resolve_version`] first). Installing an already-installed version is
/// a no-op that reports the existing entry.
///
/// # Errors
/// Returns an error if no archive exists for the current platform, the
/// download fails, the checksum does not match, or unpacking fails.
pub fn install(
    registry: &Registry,
    catalog: &Catalog,
    version: &Version,
    verbose: bool,
) -> Result<InstalledVersion> {
    if let Some(existing) = registry.get(version)? {
        if verbose {
            eprintln!("Go {version} is already installed");
        }
        return Ok(existing);
    }

    let platform = Platform::detect();
    let file = catalog
        .archive_for(version, &platform)
        .ok_or_else(|| Error::NoArchiveForPlatform {
            version: version.clone(),
            os: platform.os,
            arch: platform.arch,
        })?
        .clone();

    let _lock = registry.lock()?;

    // Another process may have finished this install while we waited for
    // the catalog; re-check under the lock.
    if let Some(existing) = registry.get(version)? {
        return Ok(existing);
    }

    match install_locked(registry, version, &file, verbose) {
        Ok(installed) => Ok(installed),
        Err(err) => {
            let _ = fs::remove_dir_all(registry.staging_dir());
            Err(err)
        }
    }
}

fn install_locked(
    registry: &Registry,
    version: &Version,
    file: &ReleaseFile,
    verbose: bool,
) -> Result<InstalledVersion> {
    let staging = registry.staging_dir();

    // Residue from an interrupted earlier install is cleared wholesale.
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    let archive_path = staging.join(&file.filename);
    let url = file.download_url();

    if verbose {
        eprintln!("Downloading {url}");
    }
    download(&url, &archive_path)?;

    if verbose {
        eprintln!("Verifying checksum of {}", file.filename);
    }
    verify_checksum(&archive_path, &file.filename, &file.sha256)?;

    let unpack_dir = staging.join("unpack");
    fs::create_dir_all(&unpack_dir)?;

    if verbose {
        eprintln!("Unpacking {}", file.filename);
    }
    unpack(&archive_path, &unpack_dir)?;

    fs::create_dir_all(registry.installations_dir())?;
    fs::rename(&unpack_dir, registry.install_path(version))?;
    let _ = fs::remove_file(&archive_path);

    // The re-check above ruled out an existing entry, so get() only
    // returns None if the rename itself was lost.
    registry
        .get(version)?
        .ok_or_else(|| Error::Io(io::Error::other("installation directory vanished")))
}

/// Stream a URL to a file on disk.
fn download(url: &str, dest: &Path) -> Result<()> {
    let response = attohttpc::get(url)
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .send()
        .map_err(|e| Error::http(url, e))?;

    if !response.status().is_success() {
        return Err(Error::HttpStatus {
            status: response.status().as_u16(),
            url: url.to_string(),
        });
    }

    let mut out = File::create(dest)?;
    response
        .write_to(&mut out)
        .map_err(|e| Error::http(url, e))?;
    Ok(())
}

/// Compare a file's SHA-256 against the published digest.
fn verify_checksum(path: &Path, filename: &str, expected: &str) -> Result<()> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    let actual = format!("{:x}", hasher.finalize());

    if !actual.eq_ignore_ascii_case(expected) {
        return Err(Error::ChecksumMismatch {
            filename: filename.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Unpack a `.tar.gz` archive into the given directory.
fn unpack(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = BufReader::new(File::open(archive_path)?);
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive.unpack(dest)?;
    Ok(())
}
