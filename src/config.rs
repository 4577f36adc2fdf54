//! Viewer configuration

use crate::error::{RawSliceError, Result};
use crate::types::{ByteOrder, ElementType, ViewingPlane};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest file read into memory by default (1024 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// File extensions opened by default
pub const DEFAULT_EXTENSIONS: &[&str] = &[".raw", ".bin"];

/// Limits and defaults for a viewing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerConfig {
    /// Files larger than this are rejected before reading
    pub max_file_size: u64,

    /// Element type offered before the user picks one
    pub default_element_type: ElementType,

    pub default_byte_order: ByteOrder,

    pub default_plane: ViewingPlane,

    /// Extensions (with leading dot) the viewer claims
    pub supported_extensions: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            default_element_type: ElementType::Float32,
            default_byte_order: ByteOrder::Little,
            default_plane: ViewingPlane::Axial,
            supported_extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

impl ViewerConfig {
    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(RawSliceError::Configuration(
                "maxFileSize must be greater than zero".to_string(),
            ));
        }
        if self.supported_extensions.is_empty() {
            return Err(RawSliceError::Configuration(
                "supportedExtensions must not be empty".to_string(),
            ));
        }
        if let Some(ext) = self.supported_extensions.iter().find(|ext| !ext.starts_with('.')) {
            return Err(RawSliceError::Configuration(format!(
                "Extension must start with '.': {}",
                ext
            )));
        }
        Ok(())
    }

    /// Check whether `path` carries one of the supported extensions (case-insensitive)
    pub fn is_supported_path(&self, path: impl AsRef<Path>) -> bool {
        let Some(ext) = path.as_ref().extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        self.supported_extensions
            .iter()
            .any(|supported| {
                supported
                    .strip_prefix('.')
                    .unwrap_or(supported)
                    .eq_ignore_ascii_case(ext)
            })
    }
}
