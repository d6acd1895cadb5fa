//! URL construction and normalization.
//!
//! Joins configured base URLs with per-page path fragments and cleans up
//! the result: duplicate slashes collapse to one (the scheme's `//` is the
//! only run that survives), and canonical page URLs follow the
//! directory-trailing-slash convention of static hosts.

use crate::config::BuildMode;
use regex::Regex;
use std::sync::LazyLock;

/// Runs of 2+ slashes preceded by a non-colon character. Keeps `https://`
/// intact while collapsing everything else.
static RE_SLASH_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([^:])/{2,}").unwrap());

/// Collapse duplicate path separators, preserving the scheme's `//`.
pub fn collapse_slashes(url: &str) -> String {
    RE_SLASH_RUN.replace_all(url, "${1}/").into_owned()
}

/// Join `base` and `relative` with a single separator.
pub fn build_url(base: &str, relative: &str) -> String {
    collapse_slashes(&format!("{base}/{relative}"))
}

/// Canonical page URL.
///
/// The home page (empty `relative`) is the bare base with no trailing
/// slash. Every other page gets a trailing slash unless it already has one
/// or points at an `.html` file: static hosts 301-redirect extensionless
/// paths to directory form, and emitting the slash up front avoids the
/// redirect loop.
pub fn canonical_url(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return collapse_slashes(base).trim_end_matches('/').to_string();
    }

    let mut url = build_url(base, relative);
    if !url.ends_with('/') && !url.ends_with(".html") {
        url.push('/');
    }
    url
}

/// OG-image URL. Images are always files, so no trailing-slash rule.
pub fn image_url(base: &str, relative: &str) -> String {
    build_url(base, relative)
}

/// Rewrite the deployed-sub-path marker for the build mode.
///
/// `marker` is the literal `/%PREFIX_REPO_NAME%/` token. The dev server
/// prepends the sub-path itself, so the marker collapses to `/`; the
/// production host serves under `/<repo>/`, so the marker expands to it.
pub fn rewrite_asset_base(html: &str, marker: &str, mode: BuildMode, repo: &str) -> String {
    let replacement = match mode {
        BuildMode::Development => "/".to_string(),
        BuildMode::Production => format!("/{repo}/"),
    };
    html.replace(marker, &replacement)
}
