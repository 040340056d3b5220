//! Viewer configuration loaded from TOML.
//!
//! Lookup order:
//! 1. explicit path (must exist)
//! 2. `./crestview.toml`
//! 3. the platform config directory (`crestview/config.toml`)
//! 4. built-in defaults

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::interaction::HighlightPalette;
use crate::layout::LayoutOptions;
use crate::materialize::MidpointPolicy;
use crate::shape::DEFAULT_EXTRUDE;

/// Name of the config file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "crestview.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl From<ConfigError> for RenderError {
    fn from(err: ConfigError) -> Self {
        RenderError::Config(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Tip/notch depth of the port glyphs.
    pub extrude: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            extrude: DEFAULT_EXTRUDE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterializeConfig {
    pub midpoint_policy: MidpointPolicy,
}

/// Everything a session can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub layout: LayoutOptions,
    pub style: StyleConfig,
    pub highlight: HighlightPalette,
    pub materialize: MaterializeConfig,
}

impl ViewerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.style.extrude.is_finite() || self.style.extrude < 0.0 {
            return Err(ConfigError::Validation(format!(
                "style.extrude must be a non-negative number, got {}",
                self.style.extrude
            )));
        }
        let h = &self.highlight;
        for (name, w) in [
            ("highlight.highlight_width", h.highlight_width),
            ("highlight.normal_width", h.normal_width),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a non-negative number, got {w}"
                )));
            }
        }
        let l = &self.layout;
        for (name, v) in [
            ("layout.layer_spacing", l.layer_spacing),
            ("layout.padding.top", l.padding.top),
            ("layout.padding.left", l.padding.left),
            ("layout.padding.bottom", l.padding.bottom),
            ("layout.padding.right", l.padding.right),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a non-negative number, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Find and load the configuration.
///
/// # Errors
///
/// Fails when an explicit path is given but missing, or when a found file
/// cannot be read or parsed.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<ViewerConfig, RenderError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local = Path::new(LOCAL_CONFIG);
    if local.exists() {
        info!(path = local.display().to_string(); "Loading configuration from local path");
        return load_config_file(local);
    }

    if let Some(dirs) = ProjectDirs::from("org", "crestdsl", "crestview") {
        let system = dirs.config_dir().join("config.toml");
        if system.exists() {
            info!(path = system.display().to_string(); "Loading configuration from system path");
            return load_config_file(&system);
        }
        debug!(path = system.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using defaults");
    Ok(ViewerConfig::default())
}

/// Load one TOML config file.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<ViewerConfig, RenderError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }
    let content = fs::read_to_string(path)?;
    Ok(ViewerConfig::from_toml(&content)?)
}
