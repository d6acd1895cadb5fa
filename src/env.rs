//! Environment variable loading.
//!
//! Loads the flat key/value configuration every build depends on from
//! dotenv-style files: `.env` first, then `.env.<mode>` layered on top
//! (mode-specific values win). Keys follow the `PREFIX[_PAGEID]_NAME`
//! convention consumed by the template resolver.
//!
//! A missing environment configuration is the one fatal condition of a
//! build: every page depends on it, so there is no per-page fallback.

use crate::config::BuildMode;
use anyhow::{Context, Result, bail};
use std::{collections::HashMap, fs, path::Path};

/// Flat key/value variable mapping, read-only for the duration of a build
pub type EnvMap = HashMap<String, String>;

/// Load the environment map for a build mode.
///
/// Reads `.env` and `.env.<mode>` from `dir`, in that order; a key present
/// in both takes the mode-specific value. At least one of the two files
/// must exist, otherwise the build cannot proceed.
pub fn load_env(dir: &Path, mode: BuildMode) -> Result<EnvMap> {
    let candidates = [dir.join(".env"), dir.join(format!(".env.{mode}"))];

    let mut env = EnvMap::new();
    let mut found = false;

    for path in &candidates {
        if !path.exists() {
            continue;
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read env file `{}`", path.display()))?;
        parse_into(&content, &mut env);
        found = true;
    }

    if !found {
        bail!(
            "No env file found in `{}` (expected .env or .env.{mode})",
            dir.display()
        );
    }

    Ok(env)
}

/// Parse `KEY=VALUE` lines into `env`, overwriting existing keys.
///
/// Blank lines and `#` comments are skipped; lines without `=` are
/// ignored; matching surrounding quotes are stripped from values.
fn parse_into(content: &str, env: &mut EnvMap) {
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        env.insert(key.to_string(), unquote(value.trim()).to_string());
    }
}

/// Strip one pair of matching single or double quotes, if present.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(content: &str) -> EnvMap {
        let mut env = EnvMap::new();
        parse_into(content, &mut env);
        env
    }

    #[test]
    fn test_parse_basic_pairs() {
        let env = parse("SITE_TITLE=My Site\nSITE_BASE_URL=https://example.com\n");
        assert_eq!(env.get("SITE_TITLE").unwrap(), "My Site");
        assert_eq!(env.get("SITE_BASE_URL").unwrap(), "https://example.com");
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let env = parse("# header comment\n\nSITE_A=1\n   \n# trailing\n");
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("SITE_A").unwrap(), "1");
    }

    #[test]
    fn test_parse_strips_quotes() {
        let env = parse("A=\"quoted value\"\nB='single'\nC=\"unmatched'\n");
        assert_eq!(env.get("A").unwrap(), "quoted value");
        assert_eq!(env.get("B").unwrap(), "single");
        assert_eq!(env.get("C").unwrap(), "\"unmatched'");
    }

    #[test]
    fn test_parse_value_may_contain_equals() {
        let env = parse("SITE_QUERY=a=b&c=d\n");
        assert_eq!(env.get("SITE_QUERY").unwrap(), "a=b&c=d");
    }

    #[test]
    fn test_parse_ignores_keyless_lines() {
        let env = parse("=no-key\njust some text\n");
        assert!(env.is_empty());
    }

    #[test]
    fn test_load_env_layers_mode_file_over_base() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".env"), "SITE_A=base\nSITE_B=base\n").unwrap();
        fs::write(dir.path().join(".env.production"), "SITE_B=prod\nSITE_C=prod\n").unwrap();

        let env = load_env(dir.path(), BuildMode::Production).unwrap();
        assert_eq!(env.get("SITE_A").unwrap(), "base");
        assert_eq!(env.get("SITE_B").unwrap(), "prod");
        assert_eq!(env.get("SITE_C").unwrap(), "prod");
    }

    #[test]
    fn test_load_env_mode_file_alone_is_enough() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".env.development"), "SITE_A=dev\n").unwrap();

        let env = load_env(dir.path(), BuildMode::Development).unwrap();
        assert_eq!(env.get("SITE_A").unwrap(), "dev");
    }

    #[test]
    fn test_load_env_missing_is_fatal() {
        let dir = TempDir::new().unwrap();
        assert!(load_env(dir.path(), BuildMode::Development).is_err());
    }

    #[test]
    fn test_load_env_ignores_other_mode_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".env"), "SITE_A=base\n").unwrap();
        fs::write(dir.path().join(".env.production"), "SITE_A=prod\n").unwrap();

        let env = load_env(dir.path(), BuildMode::Development).unwrap();
        assert_eq!(env.get("SITE_A").unwrap(), "base");
    }
}
