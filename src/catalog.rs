// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Upstream version catalog client and its on-disk cache
//!
//! Fetches the list of published Go releases from the go.dev JSON endpoint
//! and caches it to minimize network round-trips. The cache never expires
//! automatically and is only refreshed when a requested version is not
//! found in it, or when an operation explicitly needs fresh data (`check`).

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::version::Version;

/// JSON listing of every Go release ever published.
pub const CATALOG_URL: &str = "https://go.dev/dl/?mode=json&include=all";

/// Deadline for the catalog request; the endpoint returns a few hundred KB.
const CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// One downloadable file belonging to a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseFile {
    /// File name on the download host (e.g. "go1.20.4.linux-amd64.tar.gz")
    pub filename: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub arch: String,
    /// SHA-256 of the file contents, lowercase hex
    pub sha256: String,
    #[serde(default)]
    pub size: u64,
    /// "archive", "installer" or "source"
    #[serde(default)]
    pub kind: String,
}

impl ReleaseFile {
    /// Full download URL for this file.
    #[must_use]
    pub fn download_url(&self) -> String {
        format!("{}/{}", crate::platform::GO_DL_BASE, self.filename)
    }
}

/// A version published upstream, with its downloadable files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub version: Version,
    pub stable: bool,
    #[serde(default)]
    pub files: Vec<ReleaseFile>,
}

/// Wire format of the go.dev endpoint; versions carry a `go` prefix there
/// ("go1.20.4") which [`Release`] strips.
#[derive(Deserialize)]
struct RawRelease {
    version: String,
    stable: bool,
    #[serde(default)]
    files: Vec<ReleaseFile>,
}

/// The set of upstream-published versions, sorted ascending
///
/// All resolution questions (latest stable, best match for a partial
/// spec, archive for a platform) are answered from this snapshot.
#[derive(Debug, Clone)]
pub struct Catalog {
    releases: Vec<Release>,
}

impl Catalog {
    /// Build a catalog from release entries, sorting them ascending.
    #[must_use]
    pub fn new(mut releases: Vec<Release>) -> Self {
        releases.sort_by(|a, b| a.version.cmp(&b.version));
        Self { releases }
    }

    /// All releases, ascending by version.
    #[must_use]
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// All published versions, ascending.
    #[must_use]
    pub fn versions(&self) -> Vec<Version> {
        self.releases.iter().map(|r| r.version.clone()).collect()
    }

    /// The newest release, optionally restricted to stable ones.
    #[must_use]
    pub fn latest(&self, include_unstable: bool) -> Option<&Release> {
        self.releases
            .iter()
            .rev()
            .find(|r| include_unstable || r.stable)
    }

    /// The newest stable release.
    #[must_use]
    pub fn latest_stable(&self) -> Option<&Release> {
        self.latest(false)
    }

    /// Resolve a possibly-partial version spec to the newest published
    /// release it covers. A stable spec only matches stable releases; a
    /// pre-release spec matches exactly the named pre-release.
    #[must_use]
    pub fn resolve(&self, spec: &Version) -> Option<&Release> {
        self.releases
            .iter()
            .rev()
            .filter(|r| r.stable || !spec.is_stable())
            .find(|r| spec.covers(&r.version))
    }

    /// The archive file for a version on the given platform, if one was
    /// published.
    #[must_use]
    pub fn archive_for(&self, version: &Version, platform: &Platform) -> Option<&ReleaseFile> {
        self.releases
            .iter()
            .find(|r| &r.version == version)?
            .files
            .iter()
            .find(|f| f.kind == "archive" && f.os == platform.os && f.arch == platform.arch)
    }
}

/// Cached catalog snapshot with the time it was taken
#[derive(Serialize, Deserialize)]
pub struct CatalogCache {
    releases: Vec<Release>,
    timestamp: DateTime<Utc>,
}

impl CatalogCache {
    #[must_use]
    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    /// Turn the cached snapshot into a usable catalog.
    #[must_use]
    pub fn into_catalog(self) -> Catalog {
        Catalog::new(self.releases)
    }
}

/// Get the cache directory path, creating it if it doesn't exist
///
/// Uses `$XDG_CACHE_HOME` if set, otherwise falls back to `$HOME/.cache`.
///
/// # Errors
/// Returns error if HOME environment variable is not set or directory creation fails
pub fn cache_dir() -> Result<PathBuf> {
    let cache_base = std::env::var("XDG_CACHE_HOME")
        .or_else(|_| std::env::var("HOME").map(|home| format!("{home}/.cache")))
        .map_err(|_| Error::NoHomeDir)?;
    let cache_dir = PathBuf::from(cache_base).join("goup");
    fs::create_dir_all(&cache_dir)?;
    Ok(cache_dir)
}

/// Get the full path to the catalog cache file
///
/// # Errors
/// Returns error if the cache directory cannot be created
pub fn cache_file_path() -> Result<PathBuf> {
    Ok(cache_dir()?.join("catalog.json"))
}

/// Load the cached catalog snapshot if one exists
///
/// A cache file that cannot be parsed is treated as absent and removed so
/// the next fetch recreates it.
///
/// # Errors
/// Returns error if the cache file exists but cannot be read
pub fn load_cached_catalog() -> Result<Option<CatalogCache>> {
    let cache_file = cache_file_path()?;

    if !cache_file.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&cache_file)?;
    match serde_json::from_str::<CatalogCache>(&content) {
        Ok(cache) => Ok(Some(cache)),
        Err(_) => {
            let _ = fs::remove_file(&cache_file);
            Ok(None)
        }
    }
}

/// Save a catalog snapshot to the cache file with the current timestamp
///
/// # Errors
/// Returns error if the cache file cannot be written
pub fn save_cached_catalog(releases: &[Release]) -> Result<()> {
    let cache_file = cache_file_path()?;
    let cache = CatalogCache {
        releases: releases.to_vec(),
        timestamp: Utc::now(),
    };
    let content = serde_json::to_string_pretty(&cache)?;
    fs::write(&cache_file, content)?;
    Ok(())
}

/// Fetch the catalog from the upstream endpoint and cache it
///
/// Release entries whose version string does not parse are skipped rather
/// than failing the whole fetch, so upstream can add new naming schemes
/// without breaking older clients.
///
/// # Errors
/// Returns a network, timeout or parse error; never falls back to stale data.
pub fn fetch_catalog(verbose: bool) -> Result<Catalog> {
    if verbose {
        eprintln!("Fetching version catalog from {CATALOG_URL}");
    }

    let response = attohttpc::get(CATALOG_URL)
        .timeout(CATALOG_TIMEOUT)
        .send()
        .map_err(|e| Error::http(CATALOG_URL, e))?;

    if !response.status().is_success() {
        return Err(Error::HttpStatus {
            status: response.status().as_u16(),
            url: CATALOG_URL.to_string(),
        });
    }

    let body = response.text().map_err(|e| Error::http(CATALOG_URL, e))?;
    let raw: Vec<RawRelease> = serde_json::from_str(&body)?;

    let releases: Vec<Release> = raw
        .into_iter()
        .filter_map(|r| {
            let version: Version = r.version.strip_prefix("go")?.parse().ok()?;
            Some(Release {
                version,
                stable: r.stable,
                files: r.files,
            })
        })
        .collect();

    let catalog = Catalog::new(releases);

    if let Err(e) = save_cached_catalog(catalog.releases()) {
        if verbose {
            eprintln!("Warning: failed to cache catalog: {e}");
        }
    } else if verbose {
        eprintln!("Cached {} releases", catalog.releases().len());
    }

    Ok(catalog)
}

/// Load the catalog, preferring the cache over the network
///
/// # Errors
/// Returns error if no cache exists and the fetch fails
pub fn load_catalog(verbose: bool) -> Result<Catalog> {
    if let Some(cache) = load_cached_catalog()? {
        if verbose {
            eprintln!(
                "Using cached catalog (last updated: {})",
                format_cache_age(cache.timestamp())
            );
        }
        return Ok(cache.into_catalog());
    }

    if verbose {
        eprintln!("No catalog cache found, fetching from upstream...");
    }

    fetch_catalog(verbose)
}

/// Refresh the cache because a requested version spec was not found in it
///
/// Re-checks the cache first in case another process already refreshed it.
///
/// # Returns
/// `true` if a fetch happened, `false` if the spec resolved from the cache
/// after all.
///
/// # Errors
/// Returns error if the fetch fails or the cache cannot be updated
pub fn refresh_for_missing_version(spec: &Version, verbose: bool) -> Result<bool> {
    if let Some(cache) = load_cached_catalog()?
        && cache.into_catalog().resolve(spec).is_some()
    {
        return Ok(false);
    }

    if verbose {
        eprintln!("No version matching {spec} in cache, refreshing from upstream...");
    }

    fetch_catalog(verbose)?;
    Ok(true)
}

/// Format cache age in human-readable form (e.g. "2h ago" or "30m ago").
#[must_use]
pub fn format_cache_age(timestamp: &DateTime<Utc>) -> String {
    let age = Utc::now().signed_duration_since(*timestamp);

    if age.num_hours() > 0 {
        format!("{}h ago", age.num_hours())
    } else if age.num_minutes() > 0 {
        format!("{}m ago", age.num_minutes())
    } else {
        format!("{}s ago", age.num_seconds().max(0))
    }
}
