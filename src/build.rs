//! Build orchestration.
//!
//! Discovers HTML entry points under the project root, transforms them in
//! parallel, and writes the results to the output directory.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── load_env()          ──► fatal if missing; everything needs it
//!     ├── collect_entries()   ──► walk root for *.html (skip output/templates)
//!     └── par_iter()
//!             └── transform_entry() ──► read, Engine::transform, write
//! ```
//!
//! Transforms are pure functions over read-only shared state, so entries
//! run in parallel without locking. A failing entry is logged and counted
//! but never stops its siblings.

use crate::config::SiteConfig;
use crate::env::load_env;
use crate::log;
use crate::template::Engine;
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use walkdir::WalkDir;

/// Transform every HTML entry and write it under the output directory.
pub fn build_site(config: &'static SiteConfig) -> Result<()> {
    // The environment configuration is the one fatal dependency: every
    // page resolves against it, so a broken environment aborts the build
    // before any transform runs.
    let env = load_env(&config.env.dir, config.build.mode)
        .context("Failed to load environment configuration")?;

    let entries = collect_entries(config);
    if entries.is_empty() {
        log!("warn"; "no HTML entries found under `{}`", config.get_root().display());
        return Ok(());
    }

    log!("build"; "transforming {} entries ({} mode)", entries.len(), config.build.mode);

    let engine = Engine::new(config, env);
    let failed = AtomicUsize::new(0);

    entries.par_iter().for_each(|path| {
        if let Err(err) = transform_entry(&engine, config, path) {
            failed.fetch_add(1, Ordering::Relaxed);
            log!("error"; "{}: {:#}", path.display(), err);
        }
    });

    let failed = failed.load(Ordering::Relaxed);
    if failed > 0 {
        bail!("{failed} of {} entries failed", entries.len());
    }

    log!("build"; "done");
    Ok(())
}

/// Transform one entry and write it to the output directory.
///
/// IO failures here are contained by the caller; sibling entries proceed.
fn transform_entry(engine: &Engine, config: &SiteConfig, path: &Path) -> Result<()> {
    let rel = path.strip_prefix(config.get_root()).unwrap_or(path);
    let html = fs::read_to_string(path).context("Failed to read entry")?;

    let out = engine.transform(&rel_key(rel), &html);

    let target = config.build.output.join(rel);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, out).context("Failed to write output")?;

    Ok(())
}

/// Collect entry HTML files under the project root.
///
/// The output and templates directories never hold entries: fragments and
/// the shared entry template are inputs, not pages. Hidden directories are
/// skipped as well.
pub fn collect_entries(config: &SiteConfig) -> Vec<PathBuf> {
    WalkDir::new(config.get_root())
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e, config))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Exclude the output dir, the templates dir, and hidden files/dirs.
fn is_excluded(entry: &walkdir::DirEntry, config: &SiteConfig) -> bool {
    let path = entry.path();
    if path == config.build.output || path == config.build.templates {
        return true;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Entry lookup key: root-relative path with forward slashes, matching the
/// `[pages.map]` keys.
fn rel_key(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
