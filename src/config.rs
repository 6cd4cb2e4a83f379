//! Filter configuration.
//!
//! Configuration is read from an explicit `--config` path, or from
//! `.shinylive-filter.toml` in the working directory when present. Every key is
//! optional:
//!
//! ```toml
//! quarto = "quarto"
//! extension-name = "shinylive"
//! stylesheet = "resources/css/shinylive-quarto.css"
//! metadata-key = "shinylive-dependencies"
//!
//! [tools.python]
//! command = ["/opt/venv/bin/shinylive"]
//! min-version = "0.2.0"
//!
//! [tools.r]
//! command = ["Rscript", "-e", "shinylive:::quarto_ext()"]
//! ```

use crate::error::FilterError;
use crate::extension::language::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".shinylive-filter.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilterConfig {
    /// Command used to run the code-block conversion script.
    #[serde(default = "default_quarto")]
    pub quarto: String,

    /// Name of the extension dependency that language and app resources attach to.
    #[serde(default = "default_extension_name")]
    pub extension_name: String,

    /// Stylesheet registered once per document.
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,

    /// Document metadata key that receives the collected dependencies.
    #[serde(default = "default_metadata_key")]
    pub metadata_key: String,

    /// Per-language tool overrides
    #[serde(default)]
    pub tools: BTreeMap<Language, ToolOverride>,
}

/// Overrides for one language's tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ToolOverride {
    /// Replaces the built-in command prefix (first element is the executable).
    #[serde(default)]
    pub command: Option<Vec<String>>,

    /// Replaces the built-in minimum version; an empty string disables the check.
    #[serde(default)]
    pub min_version: Option<String>,
}

fn default_quarto() -> String {
    "quarto".to_string()
}

fn default_extension_name() -> String {
    "shinylive".to_string()
}

fn default_stylesheet() -> String {
    "resources/css/shinylive-quarto.css".to_string()
}

fn default_metadata_key() -> String {
    "shinylive-dependencies".to_string()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            quarto: default_quarto(),
            extension_name: default_extension_name(),
            stylesheet: default_stylesheet(),
            metadata_key: default_metadata_key(),
            tools: BTreeMap::new(),
        }
    }
}

impl FilterConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, FilterError> {
        let config: Self = toml::from_str(content).map_err(|e| FilterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, FilterError> {
        let content = fs::read_to_string(path)
            .map_err(|e| FilterError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Load the explicit config, else the default file in `dir`, else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, FilterError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            log::debug!("Using config file {}", candidate.display());
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }

    fn validate(&self) -> Result<(), FilterError> {
        if self.quarto.trim().is_empty() {
            return Err(FilterError::Config("'quarto' must not be empty".to_string()));
        }
        for (language, tool) in &self.tools {
            if tool.command.as_ref().is_some_and(|c| c.is_empty()) {
                return Err(FilterError::Config(format!(
                    "tools.{language}.command must not be empty"
                )));
            }
            if let Some(min) = tool.min_version.as_deref()
                && !min.is_empty()
                && semver::Version::parse(min).is_err()
            {
                return Err(FilterError::Config(format!(
                    "tools.{language}.min-version '{min}' is not a valid version"
                )));
            }
        }
        Ok(())
    }

    /// Command prefix for a language's tool.
    pub fn tool_command(&self, language: Language) -> Vec<String> {
        self.tools
            .get(&language)
            .and_then(|t| t.command.clone())
            .unwrap_or_else(|| language.binding().command.iter().map(|s| s.to_string()).collect())
    }

    /// Minimum tool version enforced for a language, if any.
    pub fn min_version(&self, language: Language) -> Option<String> {
        match self.tools.get(&language).and_then(|t| t.min_version.clone()) {
            Some(min) if min.is_empty() => None,
            Some(min) => Some(min),
            None => language.binding().min_version.map(str::to_string),
        }
    }
}
