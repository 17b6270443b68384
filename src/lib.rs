// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Go SDK version manager library
//!
//! This library provides the pieces the `goup` CLI is built from: Go
//! version parsing and matching, the upstream catalog client and its cache,
//! a local registry of installed SDKs, transactional installation, atomic
//! version switching, update detection and removal.

// Re-export public API from organized modules
pub mod catalog;
pub mod check;
pub mod clean;
pub mod cli;
pub mod error;
pub mod install;
pub mod platform;
pub mod registry;
pub mod switch;
pub mod version;

// Re-export commonly used items at the crate root for convenience
pub use error::{Error, Result};
pub use platform::{GO_DL_BASE, Platform};
pub use registry::{InstalledVersion, Registry};
pub use version::{Prerelease, Version};
