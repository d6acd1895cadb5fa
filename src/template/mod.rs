//! HTML template transformation.
//!
//! This module is the heart of the build: it turns raw entry-point HTML
//! into final, deployable markup.
//!
//! # Pipeline
//!
//! ```text
//! transform(rel_path, html)
//!     │
//!     ├── page_identity()      ──► [pages.map] lookup, default fallback
//!     ├── expand_includes()    ──► splice fragments, resolve their vars
//!     ├── rewrite_asset_base() ──► mode-aware sub-path marker rewrite
//!     └── resolve()            ──► composite, page-scoped, global vars
//! ```
//!
//! Every step is a pure text transform over read-only shared state, which
//! is what lets the build run entries in parallel without locking.

pub mod include;
pub mod resolver;
pub mod url;

use crate::config::SiteConfig;
use crate::env::EnvMap;
use crate::template::resolver::Resolver;

/// Per-build transformation engine: one environment, one mode, one page map.
pub struct Engine<'a> {
    config: &'a SiteConfig,
    resolver: Resolver,
    /// Literal `/%PREFIX_REPO_NAME%/` marker consumed by the asset-base rewrite
    marker: String,
}

impl<'a> Engine<'a> {
    pub fn new(config: &'a SiteConfig, env: EnvMap) -> Self {
        let prefix = &config.env.prefix;
        Self {
            config,
            marker: format!("/%{prefix}_REPO_NAME%/"),
            resolver: Resolver::new(env, prefix),
        }
    }

    /// Map an entry path (relative to the project root, forward slashes)
    /// to its page identity.
    ///
    /// Entries missing from `[pages.map]` fall back to the default
    /// identity, so pages added without updating the map still build.
    pub fn page_identity(&self, rel_path: &str) -> &str {
        self.config
            .pages
            .map
            .get(rel_path)
            .unwrap_or(&self.config.pages.default)
    }

    /// Transform one entry's HTML into final markup.
    ///
    /// Deterministic and pure; per-entry problems (unknown keys, missing
    /// fragments) degrade to unmodified text rather than errors, so one
    /// entry can never poison its siblings.
    pub fn transform(&self, rel_path: &str, html: &str) -> String {
        let page = self.page_identity(rel_path);

        let html = include::expand_includes(html, self.config.get_root(), &self.resolver, page);
        let html = url::rewrite_asset_base(
            &html,
            &self.marker,
            self.config.build.mode,
            &self.config.site.repo,
        );
        self.resolver.resolve(&html, page)
    }
}
