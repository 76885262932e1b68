//! Build and version metadata emitted by the build script

use serde::Serialize;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit SHA (short)
pub const GIT_SHA: &str = env!("VERGEN_GIT_SHA");

pub const GIT_COMMIT_TIMESTAMP: &str = env!("VERGEN_GIT_COMMIT_TIMESTAMP");

pub const GIT_BRANCH: &str = env!("VERGEN_GIT_BRANCH");

/// Whether the working tree had uncommitted changes
pub const GIT_DIRTY: &str = env!("VERGEN_GIT_DIRTY");

pub const RUSTC_VERSION: &str = env!("VERGEN_RUSTC_SEMVER");

pub const BUILD_TIMESTAMP: &str = env!("VERGEN_BUILD_TIMESTAMP");

/// Target triple
pub const TARGET: &str = env!("VERGEN_CARGO_TARGET_TRIPLE");

/// Returns full version string with git metadata.
/// Format: <version> (<git_sha>) [dirty]
pub fn full_version() -> String {
    let dirty = if GIT_DIRTY == "true" { " dirty" } else { "" };
    format!("{VERSION} ({GIT_SHA}{dirty})")
}

/// Multi-line build information for `--build-info`.
pub fn build_info() -> String {
    format!(
        "seedmesh-server {}\n\
         commit: {} ({})\n\
         branch: {}\n\
         built:  {}\n\
         rustc:  {}\n\
         target: {}",
        VERSION, GIT_SHA, GIT_COMMIT_TIMESTAMP, GIT_BRANCH, BUILD_TIMESTAMP, RUSTC_VERSION, TARGET
    )
}

/// Version payload served at `GET /version`
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub git_sha: &'static str,
    pub git_branch: &'static str,
    pub git_dirty: bool,
    pub build_timestamp: &'static str,
    pub rustc: &'static str,
    pub target: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            git_sha: GIT_SHA,
            git_branch: GIT_BRANCH,
            git_dirty: GIT_DIRTY == "true",
            build_timestamp: BUILD_TIMESTAMP,
            rustc: RUSTC_VERSION,
            target: TARGET,
        }
    }
}
