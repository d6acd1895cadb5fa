//! Build configuration management.
//!
//! Handles loading, parsing, and validating the `stamp.toml` configuration file.

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use clap::ValueEnum;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default values for serde deserialization
pub mod config_defaults {
    pub mod site {
        pub fn repo() -> String {
            String::new()
        }
    }

    pub mod build {
        use std::path::PathBuf;

        pub fn root() -> Option<PathBuf> {
            None
        }
        pub fn output() -> PathBuf {
            "dist".into()
        }
        pub fn templates() -> PathBuf {
            "templates".into()
        }
        pub fn entry_template() -> PathBuf {
            "templates/entry.html".into()
        }
    }

    pub mod env {
        use std::path::PathBuf;

        pub fn dir() -> PathBuf {
            ".".into()
        }
        pub fn prefix() -> String {
            "SITE".into()
        }
    }

    pub mod pages {
        pub fn default() -> String {
            "HOME".into()
        }
    }
}

/// Build variant, selected once per invocation.
///
/// Controls only the asset-base rewrite: the dev server prepends the
/// deployment sub-path itself, so the marker collapses to `/`; the static
/// production host serves under `/<repo>/`, so the marker expands to it.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Local dev server build
    #[default]
    Development,
    /// Deployed static-host build
    Production,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// `[site]` section in stamp.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteInfo {
    /// Repository name, the deployed sub-path used by the production
    /// asset-base rewrite, e.g.: "my-project" for host.tld/my-project/
    #[serde(default = "config_defaults::site::repo")]
    #[educe(Default = config_defaults::site::repo())]
    pub repo: String,
}

/// `[build]` section in stamp.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Root directory path
    #[serde(default = "config_defaults::build::root")]
    #[educe(Default = config_defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Output directory path (relative to root)
    #[serde(default = "config_defaults::build::output")]
    #[educe(Default = config_defaults::build::output())]
    pub output: PathBuf,

    /// Templates directory (relative to root). Holds include fragments and
    /// the entry template; excluded from entry discovery.
    #[serde(default = "config_defaults::build::templates")]
    #[educe(Default = config_defaults::build::templates())]
    pub templates: PathBuf,

    /// Shared entry template copied by `stamp sync`
    #[serde(default = "config_defaults::build::entry_template")]
    #[educe(Default = config_defaults::build::entry_template())]
    pub entry_template: PathBuf,

    /// Default build mode when `--mode` is not given
    #[serde(default)]
    pub mode: BuildMode,
}

/// `[env]` section in stamp.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    /// Directory holding `.env` and `.env.<mode>` files (relative to root)
    #[serde(default = "config_defaults::env::dir")]
    #[educe(Default = config_defaults::env::dir())]
    pub dir: PathBuf,

    /// Variable prefix: the `PREFIX` in `%PREFIX_NAME%` placeholders and
    /// `PREFIX_*` environment keys
    #[serde(default = "config_defaults::env::prefix")]
    #[educe(Default = config_defaults::env::prefix())]
    pub prefix: String,
}

/// `[pages]` section in stamp.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    /// Identity used for entries missing from `map`. Unmapped pages still
    /// build, scoped to this identity.
    #[serde(default = "config_defaults::pages::default")]
    #[educe(Default = config_defaults::pages::default())]
    pub default: String,

    /// Entry path (relative to root) to page-identity token, e.g.:
    /// "oven-interface/index.html" = "OVEN"
    #[serde(default)]
    pub map: HashMap<String, String>,
}

/// Root configuration structure representing stamp.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Basic site information
    #[serde(default)]
    pub site: SiteInfo,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Environment variable settings
    #[serde(default)]
    pub env: EnvConfig,

    /// Page identity mapping
    #[serde(default)]
    pub pages: PagesConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Get CLI arguments reference
    pub fn get_cli(&self) -> &'static Cli {
        self.cli.unwrap()
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());
        self.set_root(&root);

        Self::update_option(&mut self.build.output, cli.output.as_ref());

        // Anchor all configured paths at the root; [pages.map] keys stay
        // root-relative since they double as entry lookup keys.
        self.build.output = root.join(&self.build.output);
        self.build.templates = root.join(&self.build.templates);
        self.build.entry_template = root.join(&self.build.entry_template);
        self.env.dir = root.join(&self.env.dir);

        if let Commands::Build { mode: Some(mode) } = &cli.command {
            self.build.mode = *mode;
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        let cli = self.get_cli();

        if !self.get_root().exists() {
            bail!(ConfigError::Validation(format!(
                "root directory `{}` not found",
                self.get_root().display()
            )));
        }

        if self.env.prefix.is_empty()
            || !self.env.prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            bail!(ConfigError::Validation(
                "[env.prefix] must be a non-empty alphanumeric token".into()
            ));
        }

        if self.build.mode == BuildMode::Production && self.site.repo.is_empty() {
            bail!(ConfigError::Validation(
                "[site.repo] is required for production builds".into()
            ));
        }

        if cli.is_sync() && !self.build.entry_template.exists() {
            bail!(ConfigError::Validation(format!(
                "[build.entry_template] `{}` not found",
                self.build.entry_template.display()
            )));
        }

        Ok(())
    }
}

#[test]
fn test_from_str_full_config() {
    let config_str = r#"
        [site]
        repo = "my-portfolio"

        [build]
        output = "public"
        mode = "production"

        [env]
        prefix = "APP"

        [pages]
        default = "HOME"
        [pages.map]
        "index.html" = "HOME"
        "oven-interface/index.html" = "OVEN"
    "#;
    let config = SiteConfig::from_str(config_str).unwrap();

    assert_eq!(config.site.repo, "my-portfolio");
    assert_eq!(config.build.output, Path::new("public"));
    assert_eq!(config.build.mode, BuildMode::Production);
    assert_eq!(config.env.prefix, "APP");
    assert_eq!(config.pages.map.len(), 2);
    assert_eq!(
        config.pages.map.get("oven-interface/index.html").map(String::as_str),
        Some("OVEN")
    );
}

#[test]
fn test_from_str_defaults() {
    let config = SiteConfig::from_str("").unwrap();

    assert_eq!(config.build.output, Path::new("dist"));
    assert_eq!(config.build.templates, Path::new("templates"));
    assert_eq!(config.build.mode, BuildMode::Development);
    assert_eq!(config.env.prefix, "SITE");
    assert_eq!(config.pages.default, "HOME");
    assert!(config.pages.map.is_empty());
}

#[test]
fn test_from_str_invalid_toml() {
    let invalid_config = r#"
        [site
        repo = "broken"
    "#;
    assert!(SiteConfig::from_str(invalid_config).is_err());
}

#[test]
fn test_from_str_unknown_field_rejected() {
    let config_str = r#"
        [build]
        ouput = "dist"
    "#;
    assert!(SiteConfig::from_str(config_str).is_err());
}

#[test]
fn test_build_mode_parsing() {
    let config: SiteConfig = SiteConfig::from_str("[build]\nmode = \"development\"").unwrap();
    assert_eq!(config.build.mode, BuildMode::Development);

    let config: SiteConfig = SiteConfig::from_str("[build]\nmode = \"production\"").unwrap();
    assert_eq!(config.build.mode, BuildMode::Production);

    assert!(SiteConfig::from_str("[build]\nmode = \"staging\"").is_err());
}

#[test]
fn test_build_mode_display() {
    assert_eq!(BuildMode::Development.to_string(), "development");
    assert_eq!(BuildMode::Production.to_string(), "production");
}

#[test]
fn test_get_root_default() {
    let config = SiteConfig::default();
    assert_eq!(config.get_root(), Path::new("./"));
}

#[test]
fn test_set_root() {
    let mut config = SiteConfig::default();
    config.set_root(Path::new("/custom/path"));
    assert_eq!(config.get_root(), Path::new("/custom/path"));
}

#[test]
fn test_config_error_display() {
    let io_err = ConfigError::Io(
        PathBuf::from("stamp.toml"),
        std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
    );
    let display = format!("{}", io_err);
    assert!(display.contains("IO error"));
    assert!(display.contains("stamp.toml"));

    let validation_err = ConfigError::Validation("Test validation error".to_string());
    let display = format!("{}", validation_err);
    assert!(display.contains("Test validation error"));
}
