//! Configuration file support
//!
//! Loads settings from ~/.hashpill.toml (or %USERPROFILE%\.hashpill.toml on
//! Windows). Unknown keys are ignored and each bad value only falls back to
//! its own default.
//!
//! Example:
//! ```toml
//! # hashpill configuration
//! highlight-color = "light-gray"
//! corner-radius = 5.0
//! restrict-to-hashtag-prefix = true
//! pattern = "#[-_0-9A-Za-z]+"
//! wrap-width = 60
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::warn;

use crate::error::Result;
use crate::highlight::{Color, HASHTAG_PATTERN};

/// Configuration settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Overlay background color
    pub highlight_color: Color,
    /// Overlay corner radius
    pub corner_radius: f32,
    /// Only allow edits that keep the input hashtag-first
    pub restrict_to_hashtag_prefix: bool,
    /// Token pattern
    pub pattern: String,
    /// Wrap width in columns
    pub wrap_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            highlight_color: Color::Gray,
            corner_radius: 5.0,
            restrict_to_hashtag_prefix: true,
            pattern: HASHTAG_PATTERN.to_string(),
            wrap_width: 60,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".hashpill.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".hashpill.toml"))
        }
    }

    /// Load configuration from the default path
    ///
    /// A missing or unreadable file gives the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Config::default();
        };
        if !path.exists() {
            return Config::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config ignored");
                Config::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        let table: Table = contents.parse()?;
        let mut config = Config::default();
        config.apply(&table);
        Ok(config)
    }

    /// Apply settings from a parsed table
    fn apply(&mut self, table: &Table) {
        if let Some(value) = table.get("highlight-color") {
            match value.as_str().and_then(Color::from_name) {
                Some(color) => self.highlight_color = color,
                None => warn!(?value, "unknown highlight-color"),
            }
        }

        if let Some(value) = table.get("corner-radius") {
            match as_number(value) {
                Some(n) => self.corner_radius = (n as f32).clamp(0.0, 32.0),
                None => warn!(?value, "corner-radius must be a number"),
            }
        }

        if let Some(value) = table.get("restrict-to-hashtag-prefix") {
            match value.as_bool() {
                Some(b) => self.restrict_to_hashtag_prefix = b,
                None => warn!(?value, "restrict-to-hashtag-prefix must be a boolean"),
            }
        }

        if let Some(value) = table.get("pattern") {
            match value.as_str() {
                Some(p) if !p.is_empty() => self.pattern = p.to_string(),
                _ => warn!(?value, "pattern must be a non-empty string"),
            }
        }

        if let Some(value) = table.get("wrap-width") {
            match value.as_integer() {
                Some(n) => self.wrap_width = n.clamp(8, 1000) as usize,
                None => warn!(?value, "wrap-width must be an integer"),
            }
        }
    }

    /// Save current configuration to the default path
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    /// Save current configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let mut table = Table::new();
        table.insert(
            "highlight-color".to_string(),
            Value::String(self.highlight_color.name()),
        );
        table.insert(
            "corner-radius".to_string(),
            Value::Float(self.corner_radius as f64),
        );
        table.insert(
            "restrict-to-hashtag-prefix".to_string(),
            Value::Boolean(self.restrict_to_hashtag_prefix),
        );
        table.insert("pattern".to_string(), Value::String(self.pattern.clone()));
        table.insert(
            "wrap-width".to_string(),
            Value::Integer(self.wrap_width as i64),
        );
        let contents = format!("# hashpill configuration\n\n{}", table);
        fs::write(path, contents)?;
        Ok(())
    }
}

fn as_number(value: &Value) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|n| n as f64))
}
