// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Tests for the goup library and CLI application
//!
//! This module contains both unit tests for library functions and
//! integration tests for the CLI application, validating version handling,
//! registry state transitions and the observable command output.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use goup::catalog::{Catalog, Release, ReleaseFile};
use goup::check::find_updates;
use goup::clean::{self, CleanScope};
use goup::registry::Registry;
use goup::{Error, Platform, Version, switch};

/// Create a fake installed SDK tree under the registry, the way a real
/// install leaves it (installations/<v>/go/bin).
fn fake_install(registry: &Registry, version: &str) {
    let version: Version = version.parse().unwrap();
    let path = registry.install_path(&version).join("go").join("bin");
    fs::create_dir_all(path).unwrap();
}

fn v(s: &str) -> Version {
    s.parse().unwrap()
}

fn versions(specs: &[&str]) -> Vec<Version> {
    specs.iter().map(|s| v(s)).collect()
}

/// Build a catalog release with a linux-amd64 archive file.
fn release(version: &str, stable: bool) -> Release {
    Release {
        version: v(version),
        stable,
        files: vec![ReleaseFile {
            filename: format!("go{version}.linux-amd64.tar.gz"),
            os: "linux".to_string(),
            arch: "amd64".to_string(),
            sha256: "0".repeat(64),
            size: 1,
            kind: "archive".to_string(),
        }],
    }
}

// Helper to run the goup binary against an isolated registry
fn run_goup(home: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_goup"))
        .env("GOUP_HOME", home)
        .args(args)
        .output()
        .expect("Failed to execute goup command")
}

// =============================================================================
// UNIT TESTS - Version Parsing and Ordering
// =============================================================================

mod version_parsing_tests {
    use super::*;

    #[test]
    fn test_parse_full_version() {
        let version = v("1.20.4");
        assert_eq!(version.major, 1);
        assert_eq!(version.minor, Some(20));
        assert_eq!(version.patch, Some(4));
        assert!(version.is_stable());
    }

    #[test]
    fn test_parse_partial_versions() {
        assert_eq!(v("1").minor, None);
        assert_eq!(v("1.19").patch, None);
        assert_eq!(v("v1.19"), v("1.19"));
    }

    #[test]
    fn test_parse_prereleases() {
        assert!(!v("1.21rc2").is_stable());
        assert!(!v("1.18beta1").is_stable());
        assert!(!v("1.1alpha3").is_stable());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "go", "1.2.3.4", "1.x", "1.19-rc1", "1.19rc"] {
            assert!(bad.parse::<Version>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_display_roundtrip() {
        // Parsed identifiers print back exactly as written.
        for s in ["1", "1.19", "1.19.0", "1.20.4", "1.21rc2", "1.18beta1"] {
            assert_eq!(v(s).to_string(), s);
        }
    }
}

mod version_ordering_tests {
    use super::*;

    #[test]
    fn test_numeric_not_lexicographic() {
        assert!(v("1.9") < v("1.10"));
        assert!(v("1.20.9") < v("1.20.10"));
    }

    #[test]
    fn test_prerelease_sorts_below_release() {
        assert!(v("1.21rc2") < v("1.21"));
        assert!(v("1.21rc2") < v("1.21.0"));
        assert!(v("1.18alpha1") < v("1.18beta1"));
        assert!(v("1.18beta2") < v("1.18rc1"));
        assert!(v("1.21rc2") > v("1.20.4"));
    }

    #[test]
    fn test_implicit_patch_sorts_below_explicit() {
        assert!(v("1.19") < v("1.19.0"));
        assert!(v("1.19.0") < v("1.19.1"));
        assert!(v("1.19") < v("1.19.1"));
    }

    #[test]
    fn test_ordering_consistent_with_equality() {
        let a = v("1.19");
        let b = v("1.19.0");
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), std::cmp::Ordering::Equal);
    }
}

mod version_covers_tests {
    use super::*;

    #[test]
    fn test_partial_spec_covers_line() {
        let spec = v("1.19");
        assert!(spec.covers(&v("1.19")));
        assert!(spec.covers(&v("1.19.7")));
        assert!(!spec.covers(&v("1.20.1")));
        assert!(!spec.covers(&v("2.19")));
    }

    #[test]
    fn test_explicit_zero_patch_covers_published_form() {
        // Go publishes "1.19", users may ask for "1.19.0".
        let spec = v("1.19.0");
        assert!(spec.covers(&v("1.19")));
        assert!(spec.covers(&v("1.19.0")));
        assert!(!spec.covers(&v("1.19.1")));
    }

    #[test]
    fn test_stable_spec_does_not_cover_prerelease() {
        assert!(!v("1.21").covers(&v("1.21rc2")));
        assert!(v("1.21rc2").covers(&v("1.21rc2")));
        assert!(!v("1.21rc2").covers(&v("1.21rc1")));
    }
}

// =============================================================================
// UNIT TESTS - Catalog Resolution
// =============================================================================

mod catalog_tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            release("1.21rc2", false),
            release("1.19", true),
            release("1.20.4", true),
            release("1.19.7", true),
            release("1.20.3", true),
        ])
    }

    #[test]
    fn test_releases_sorted_ascending() {
        let catalog = sample_catalog();
        let listed = catalog.versions();
        assert_eq!(
            listed,
            versions(&["1.19", "1.19.7", "1.20.3", "1.20.4", "1.21rc2"])
        );
    }

    #[test]
    fn test_latest_stable_skips_prereleases() {
        let catalog = sample_catalog();
        assert_eq!(catalog.latest_stable().unwrap().version, v("1.20.4"));
        assert_eq!(catalog.latest(true).unwrap().version, v("1.21rc2"));
    }

    #[test]
    fn test_resolve_exact_and_partial() {
        let catalog = sample_catalog();
        assert_eq!(catalog.resolve(&v("1.20.3")).unwrap().version, v("1.20.3"));
        // Partial spec picks the newest release it covers.
        assert_eq!(catalog.resolve(&v("1.20")).unwrap().version, v("1.20.4"));
        assert_eq!(catalog.resolve(&v("1.19")).unwrap().version, v("1.19.7"));
        assert!(catalog.resolve(&v("1.22")).is_none());
    }

    #[test]
    fn test_resolve_zero_patch_finds_published_form() {
        let catalog = sample_catalog();
        assert_eq!(catalog.resolve(&v("1.19.0")).unwrap().version, v("1.19"));
    }

    #[test]
    fn test_resolve_stable_spec_never_yields_prerelease() {
        let catalog = sample_catalog();
        assert!(catalog.resolve(&v("1.21")).is_none());
        assert_eq!(catalog.resolve(&v("1.21rc2")).unwrap().version, v("1.21rc2"));
    }

    #[test]
    fn test_archive_for_platform() {
        let catalog = sample_catalog();
        let file = catalog
            .archive_for(&v("1.20.4"), &Platform::LINUX_AMD64)
            .unwrap();
        assert_eq!(file.filename, "go1.20.4.linux-amd64.tar.gz");
        assert_eq!(file.download_url(), "https://go.dev/dl/go1.20.4.linux-amd64.tar.gz");
        assert!(
            catalog
                .archive_for(&v("1.20.4"), &Platform::DARWIN_ARM64)
                .is_none()
        );
    }
}

// =============================================================================
// UNIT TESTS - Registry State
// =============================================================================

mod registry_tests {
    use super::*;

    #[test]
    fn test_empty_registry_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        assert!(registry.list().unwrap().is_empty());
        assert_eq!(registry.active_version().unwrap(), None);
    }

    #[test]
    fn test_list_sorted_with_active_flag() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.20.4");
        fake_install(&registry, "1.19");
        registry.set_active_pointer(Some(&v("1.20.4"))).unwrap();

        let entries = registry.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].version, v("1.19"));
        assert!(!entries[0].active);
        assert_eq!(entries[1].version, v("1.20.4"));
        assert!(entries[1].active);
    }

    #[test]
    fn test_scan_skips_unparsable_entries() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        fs::create_dir_all(registry.installations_dir().join(".DS_Store")).unwrap();

        assert_eq!(registry.scan().unwrap(), versions(&["1.19"]));
    }

    #[test]
    fn test_dangling_pointer_reads_as_no_active_version() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        registry.set_active_pointer(Some(&v("1.20.4"))).unwrap();

        assert_eq!(registry.active_version().unwrap(), None);
        assert!(!registry.list().unwrap()[0].active);
    }

    #[test]
    fn test_pointer_roundtrip_and_clear() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");

        registry.set_active_pointer(Some(&v("1.19"))).unwrap();
        assert_eq!(registry.active_version().unwrap(), Some(v("1.19")));

        registry.set_active_pointer(None).unwrap();
        assert_eq!(registry.active_version().unwrap(), None);
        // Clearing an already-clear pointer is fine.
        registry.set_active_pointer(None).unwrap();
    }

    #[test]
    fn test_lock_contention() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());

        let guard = registry.lock().unwrap();
        assert!(matches!(registry.lock(), Err(Error::LockContention)));
        drop(guard);
        registry.lock().unwrap();
    }
}

// =============================================================================
// UNIT TESTS - Switching and Removal
// =============================================================================

mod switch_tests {
    use super::*;

    #[test]
    fn test_activate_updates_link_and_pointer() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");

        switch::activate(&registry, &v("1.19")).unwrap();

        assert_eq!(registry.active_version().unwrap(), Some(v("1.19")));
        let target = fs::read_link(registry.current_link()).unwrap();
        assert_eq!(target, registry.install_path(&v("1.19")));
    }

    #[test]
    fn test_activate_switches_between_versions() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        fake_install(&registry, "1.20.4");

        switch::activate(&registry, &v("1.19")).unwrap();
        switch::activate(&registry, &v("1.20.4")).unwrap();

        assert_eq!(registry.active_version().unwrap(), Some(v("1.20.4")));
        let target = fs::read_link(registry.current_link()).unwrap();
        assert_eq!(target, registry.install_path(&v("1.20.4")));
    }

    #[test]
    fn test_activate_missing_version_keeps_previous_selection() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        switch::activate(&registry, &v("1.19")).unwrap();

        let err = switch::activate(&registry, &v("1.21")).unwrap_err();
        assert!(matches!(err, Error::NotInstalled(_)));
        assert_eq!(registry.active_version().unwrap(), Some(v("1.19")));
    }

    #[test]
    fn test_activate_blocked_while_registry_locked() {
        // The installation lookup happens under the lock, so a competing
        // mutator (e.g. a running clean) blocks activation entirely
        // instead of letting it commit against a stale lookup.
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");

        let guard = registry.lock().unwrap();
        let err = switch::activate(&registry, &v("1.19")).unwrap_err();
        assert!(matches!(err, Error::LockContention));
        assert_eq!(registry.active_version().unwrap(), None);
        drop(guard);

        switch::activate(&registry, &v("1.19")).unwrap();
        assert_eq!(registry.active_version().unwrap(), Some(v("1.19")));
    }

    #[test]
    fn test_reactivate_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");

        switch::activate(&registry, &v("1.19")).unwrap();
        switch::activate(&registry, &v("1.19")).unwrap();
        assert_eq!(registry.active_version().unwrap(), Some(v("1.19")));
    }
}

mod clean_tests {
    use super::*;

    #[test]
    fn test_clean_keeps_active_version() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        fake_install(&registry, "1.20.3");
        fake_install(&registry, "1.20.4");
        switch::activate(&registry, &v("1.20.4")).unwrap();

        let report = clean::clean(&registry, CleanScope::NonActive).unwrap();

        assert_eq!(report.removed, versions(&["1.19", "1.20.3"]));
        assert!(report.failed.is_empty());
        assert_eq!(registry.scan().unwrap(), versions(&["1.20.4"]));
        assert_eq!(registry.active_version().unwrap(), Some(v("1.20.4")));
        assert!(registry.current_link().is_symlink());
    }

    #[test]
    fn test_clean_all_clears_activation_state() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        fake_install(&registry, "1.20.4");
        switch::activate(&registry, &v("1.20.4")).unwrap();

        let report = clean::clean(&registry, CleanScope::All).unwrap();

        assert_eq!(report.removed, versions(&["1.19", "1.20.4"]));
        assert!(registry.list().unwrap().is_empty());
        assert_eq!(registry.active_version().unwrap(), None);
        assert!(!registry.current_link().is_symlink());
    }

    #[test]
    fn test_clean_empty_registry_reports_nothing() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        let report = clean::clean(&registry, CleanScope::NonActive).unwrap();
        assert!(report.removed.is_empty());
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_remove_single_version() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        fake_install(&registry, "1.20.4");
        switch::activate(&registry, &v("1.20.4")).unwrap();

        clean::remove(&registry, &v("1.19")).unwrap();

        assert_eq!(registry.scan().unwrap(), versions(&["1.20.4"]));
        assert_eq!(registry.active_version().unwrap(), Some(v("1.20.4")));
    }

    #[test]
    fn test_remove_active_version_clears_activation() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        switch::activate(&registry, &v("1.19")).unwrap();

        clean::remove(&registry, &v("1.19")).unwrap();

        assert!(registry.list().unwrap().is_empty());
        assert_eq!(registry.active_version().unwrap(), None);
        assert!(!registry.current_link().is_symlink());
    }

    #[test]
    fn test_remove_missing_version_errors() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        let err = clean::remove(&registry, &v("1.19")).unwrap_err();
        assert!(matches!(err, Error::NotInstalled(_)));
    }
}

// =============================================================================
// UNIT TESTS - Update Detection
// =============================================================================

mod check_tests {
    use super::*;

    #[test]
    fn test_finds_minor_and_patch_updates() {
        let available = versions(&["1.19", "1.19.7", "1.20.3", "1.20.4"]);
        let report = find_updates(&available, &v("1.19"));

        assert_eq!(report.minor, Some(v("1.20.4")));
        assert_eq!(report.patch, Some(v("1.19.7")));
        assert_eq!(report.pre, None);
        assert!(!report.up_to_date());
    }

    #[test]
    fn test_up_to_date_on_latest() {
        let available = versions(&["1.19", "1.19.7", "1.20.3", "1.20.4"]);
        let report = find_updates(&available, &v("1.20.4"));
        assert!(report.up_to_date());
    }

    #[test]
    fn test_patch_update_only() {
        let available = versions(&["1.20.3", "1.20.4"]);
        let report = find_updates(&available, &v("1.20.3"));
        assert_eq!(report.minor, None);
        assert_eq!(report.patch, Some(v("1.20.4")));
    }

    #[test]
    fn test_published_zero_patch_counts_as_current_line() {
        // The catalog lists "1.19"; a user on it must not be told to
        // update to itself.
        let available = versions(&["1.19"]);
        let report = find_updates(&available, &v("1.19"));
        assert!(report.up_to_date());
    }

    #[test]
    fn test_prerelease_reported_only_when_ahead_of_stable() {
        let available = versions(&["1.20.4", "1.21rc2"]);
        let report = find_updates(&available, &v("1.20.4"));
        assert_eq!(report.pre, Some(v("1.21rc2")));

        // A pre-release older than the newest stable is noise.
        let available = versions(&["1.20.4", "1.21rc2", "1.21.1"]);
        let report = find_updates(&available, &v("1.20.4"));
        assert_eq!(report.pre, None);
        assert_eq!(report.minor, Some(v("1.21.1")));
    }

    #[test]
    fn test_prereleases_never_count_as_minor_or_patch() {
        let available = versions(&["1.20.4", "1.20alpha1", "1.21rc2"]);
        let report = find_updates(&available, &v("1.20.4"));
        assert_eq!(report.minor, None);
        assert_eq!(report.patch, None);
    }
}

// =============================================================================
// INTEGRATION TESTS - CLI Application
// =============================================================================

mod cli_tests {
    use super::*;

    #[test]
    fn test_help_runs() {
        let tmp = TempDir::new().unwrap();
        let output = run_goup(tmp.path(), &["--help"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("use"));
        assert!(stdout.contains("clean"));
    }

    #[test]
    fn test_current_prints_active_version() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        switch::activate(&registry, &v("1.19")).unwrap();

        let output = run_goup(tmp.path(), &["current"]);
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "1.19\n");
    }

    #[test]
    fn test_current_without_active_version_warns_on_stderr() {
        let tmp = TempDir::new().unwrap();
        let output = run_goup(tmp.path(), &["current"]);
        assert!(output.status.success());
        assert!(output.stdout.is_empty());
        assert!(!output.stderr.is_empty());
    }

    #[test]
    fn test_ls_marks_active_version() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        fake_install(&registry, "1.20.4");
        switch::activate(&registry, &v("1.20.4")).unwrap();

        let output = run_goup(tmp.path(), &["ls"]);
        assert!(output.status.success());
        // Styling is disabled when stdout is not a terminal.
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "  1.19\n* 1.20.4\n"
        );
    }

    #[test]
    fn test_clean_removes_non_active_versions() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        fake_install(&registry, "1.20.4");
        switch::activate(&registry, &v("1.20.4")).unwrap();

        let output = run_goup(tmp.path(), &["clean"]);
        assert!(output.status.success());
        assert_eq!(registry.scan().unwrap(), versions(&["1.20.4"]));

        let output = run_goup(tmp.path(), &["ls"]);
        assert_eq!(String::from_utf8_lossy(&output.stdout), "* 1.20.4\n");
    }

    #[test]
    fn test_clean_all_empties_registry() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        fake_install(&registry, "1.20.4");
        switch::activate(&registry, &v("1.20.4")).unwrap();

        let output = run_goup(tmp.path(), &["clean", "--all", "--yes"]);
        assert!(output.status.success());
        assert!(registry.list().unwrap().is_empty());

        let output = run_goup(tmp.path(), &["current"]);
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn test_drop_active_version() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");
        switch::activate(&registry, &v("1.19")).unwrap();

        let output = run_goup(tmp.path(), &["drop", "1.19", "--yes"]);
        assert!(output.status.success());
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn test_drop_unknown_version_fails() {
        let tmp = TempDir::new().unwrap();
        let output = run_goup(tmp.path(), &["drop", "1.19"]);
        assert!(!output.status.success());
        assert!(!output.stderr.is_empty());
    }

    #[test]
    fn test_drop_ambiguous_spec_fails() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.20.3");
        fake_install(&registry, "1.20.4");

        let output = run_goup(tmp.path(), &["drop", "1.20"]);
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("1.20.3"));
        assert!(stderr.contains("1.20.4"));
    }

    #[test]
    fn test_env_prints_path_and_goroot() {
        let tmp = TempDir::new().unwrap();
        let output = run_goup(tmp.path(), &["env"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("export PATH="));
        assert!(stdout.contains("export GOROOT="));
        assert!(stdout.contains("current"));
    }

    #[test]
    fn test_exec_runs_active_toolchain_with_managed_env() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let registry = Registry::open(tmp.path());
        fake_install(&registry, "1.19");

        // Stand-in `go` binary that reports its arguments and GOROOT.
        let go = registry.install_path(&v("1.19")).join("go/bin/go");
        fs::write(&go, "#!/bin/sh\necho \"go1.19 args=$*\"\necho \"GOROOT=$GOROOT\"\n").unwrap();
        let mut perms = fs::metadata(&go).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&go, perms).unwrap();

        switch::activate(&registry, &v("1.19")).unwrap();

        let output = run_goup(tmp.path(), &["exec", "version"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("go1.19 args=version"));
        assert!(stdout.contains("GOROOT="));
        assert!(stdout.contains("current/go"));
    }

    #[test]
    fn test_exec_without_active_version_fails() {
        let tmp = TempDir::new().unwrap();
        let output = run_goup(tmp.path(), &["exec", "version"]);
        assert!(!output.status.success());
        assert!(!output.stderr.is_empty());
    }

    #[test]
    fn test_invalid_version_argument_fails() {
        let tmp = TempDir::new().unwrap();
        let output = run_goup(tmp.path(), &["use", "not-a-version"]);
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("not-a-version"));
    }
}
