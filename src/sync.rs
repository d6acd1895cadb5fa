//! Entry template synchronization.
//!
//! Multi-page sites keep one shared `entry.html`: every HTML entry point
//! starts from identical pre-transform markup, differing only in the
//! page-scoped variables the build injects. `stamp sync` copies that
//! template over every path in `[pages.map]` so the entries never drift.

use crate::config::SiteConfig;
use crate::log;
use anyhow::{Context, Result, bail};
use std::fs;

/// Copy the entry template to every configured entry path.
pub fn sync_entries(config: &'static SiteConfig) -> Result<()> {
    let template_path = &config.build.entry_template;
    let template = fs::read_to_string(template_path)
        .with_context(|| format!("Failed to read entry template `{}`", template_path.display()))?;

    if config.pages.map.is_empty() {
        bail!("[pages.map] is empty, nothing to sync");
    }

    let root = config.get_root();
    let mut targets: Vec<&String> = config.pages.map.keys().collect();
    targets.sort();

    for rel in targets {
        let target = root.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &template)
            .with_context(|| format!("Failed to write `{}`", target.display()))?;
        log!("sync"; "{rel}");
    }

    log!("sync"; "done, {} entries", config.pages.map.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(root: &std::path::Path) -> &'static SiteConfig {
        let mut config = SiteConfig::default();
        config.set_root(root);
        config.build.entry_template = root.join("templates/entry.html");
        config.pages.map.insert("index.html".into(), "HOME".into());
        config.pages.map.insert("oven-interface/index.html".into(), "OVEN".into());
        Box::leak(Box::new(config))
    }

    #[test]
    fn test_sync_copies_template_to_all_entries() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("templates")).unwrap();
        fs::write(dir.path().join("templates/entry.html"), "<!doctype html>").unwrap();

        let config = test_config(dir.path());
        sync_entries(config).unwrap();

        let root_entry = fs::read_to_string(dir.path().join("index.html")).unwrap();
        let sub_entry = fs::read_to_string(dir.path().join("oven-interface/index.html")).unwrap();
        assert_eq!(root_entry, "<!doctype html>");
        assert_eq!(sub_entry, "<!doctype html>");
    }

    #[test]
    fn test_sync_missing_template_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        assert!(sync_entries(config).is_err());
    }
}
