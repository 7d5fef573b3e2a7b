// Configuration file loaders

use crate::{CheckerConfig, ConfigError, Result};
use formcheck_log::debug;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Configuration file loader
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::UnsupportedFormat(ext.to_string()))?;

        Ok(Self::new(format))
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<CheckerConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = self.parse(&content)?;

        debug!(
            target: "formcheck::config",
            "loaded {} field declarations from {}",
            config.fields.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse configuration from string
    pub fn parse(&self, content: &str) -> Result<CheckerConfig> {
        match self.format {
            FileFormat::Json => Ok(serde_json::from_str(content)?),
            FileFormat::Toml => Ok(toml::from_str(content)?),
        }
    }
}
