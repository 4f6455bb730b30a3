//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/formtree/formtree.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `FORMTREE_*` prefix

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::tree::TreeType;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("config error: {message}")]
    Config { message: String },
}

fn config_err(e: impl std::fmt::Display) -> SettingsError {
    SettingsError::Config {
        message: e.to_string(),
    }
}

/// Unified configuration for formtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Id of the root vertex; when unset, paths start at the top-level question
    pub root_id: Option<String>,
    /// Tag handed to every tree built from these settings
    pub tree_type: TreeType,
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_id: Option<String>,
    pub tree_type: Option<TreeType>,
}

/// Get the XDG config directory for formtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "formtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("formtree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| SettingsError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_id: overlay.root_id.clone().or_else(|| self.root_id.clone()),
            tree_type: overlay.tree_type.unwrap_or(self.tree_type),
        }
    }

    /// Load settings from the global config, an optional local file and the
    /// process environment.
    pub fn load(local: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_layers(global_config_path().as_deref(), local, None)
    }

    /// Load settings from explicit layers.
    ///
    /// A missing global file is skipped; a missing local file is an error,
    /// since it was asked for. `env` replaces the process environment when
    /// given.
    pub fn load_layers(
        global: Option<&Path>,
        local: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, SettingsError> {
        let mut current = Self::default();

        if let Some(global_path) = global.filter(|p| p.exists()) {
            debug!("global config: {}", global_path.display());
            current = current.merge_with(&load_raw_settings(global_path)?);
        }

        if let Some(local_path) = local {
            debug!("local config: {}", local_path.display());
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        current = Self::apply_env_overrides(current, env)?;
        if current.root_id.as_deref() == Some("") {
            current.root_id = None;
        }
        Ok(current)
    }

    /// Apply FORMTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("FORMTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root_id") {
            settings.root_id = Some(val);
        }
        if let Ok(val) = config.get_string("tree_type") {
            settings.tree_type = val
                .parse()
                .map_err(|message| SettingsError::Config { message })?;
        }
        Ok(settings)
    }

    /// Render as TOML, the same shape the config files use.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(config_err)
    }
}
