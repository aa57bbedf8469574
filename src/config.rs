//! Configuration loading and parsing for `component-updates.toml` files.
//!
//! Every field is optional; an absent file yields the defaults used by the
//! Git for Windows automation.
use log::*;
use serde::Deserialize;
use std::{fs, io::ErrorKind, path::Path};

use crate::error::{ComponentUpdateError, Result};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "component-updates.toml";
/// Default GitHub API host.
pub const DEFAULT_API_HOST: &str = "api.github.com";
/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "GitForWindowsHelper/0.0";
/// Owner of the repository whose issues pull requests refer to.
pub const DEFAULT_SIBLING_OWNER: &str = "git-for-windows";
/// Repository whose issues pull requests refer to.
pub const DEFAULT_SIBLING_REPO: &str = "git";
/// Host serving the built packages.
pub const DEFAULT_ARTIFACT_BASE_URL: &str = "https://wingit.blob.core.windows.net";
/// Architectures every package is deployed for, unless excluded.
pub const DEFAULT_ARCHITECTURES: &[&str] = &["i686", "x86_64"];

/// GitHub connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// API host used when a request names none.
    pub api_host: String,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Owner of the repository holding cross-referenced issues.
    pub sibling_owner: String,
    /// Name of the repository holding cross-referenced issues.
    pub sibling_repo: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            sibling_owner: DEFAULT_SIBLING_OWNER.into(),
            sibling_repo: DEFAULT_SIBLING_REPO.into(),
        }
    }
}

/// Where deployed packages live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Base URL of the package repository.
    pub base_url: String,
    /// Ordered list of architectures.
    pub architectures: Vec<String>,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ARTIFACT_BASE_URL.into(),
            architectures: DEFAULT_ARCHITECTURES
                .iter()
                .map(|arch| arch.to_string())
                .collect(),
        }
    }
}

/// Root configuration structure for `component-updates.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub artifacts: ArtifactsConfig,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from `path`, or from [`DEFAULT_CONFIG_FILE`]
    /// in the working directory when it exists. An explicit path must be
    /// readable.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path)?;
                Self::from_toml(&content)
            }
            None => Self::load_or_default(Path::new(DEFAULT_CONFIG_FILE)),
        }
    }

    /// Only a missing file falls back to the defaults; a file that exists
    /// but cannot be read is an error.
    fn load_or_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no configuration found: using default");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.artifacts.architectures.is_empty() {
            return Err(ComponentUpdateError::invalid_config(
                "artifacts.architectures must not be empty",
            ));
        }

        if self.artifacts.base_url.is_empty() {
            return Err(ComponentUpdateError::invalid_config(
                "artifacts.base_url must not be empty",
            ));
        }

        Ok(())
    }
}
