//! Server settings
//!
//! Settings live in an optional JSON file. Missing keys take their default;
//! a file that fails to parse is reported and ignored.

use quotation::{ControlMap, GeneratorOptions, DEFAULT_DATE_FORMAT, DEFAULT_VAT_RATE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Template shipped with the quotation system
pub const DEFAULT_TEMPLATE: &str = "standaardofferte Compufit NL.docx";

/// Settings file looked up when none is given on the command line
pub const DEFAULT_SETTINGS_FILE: &str = "quotation_settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Path of the .docx template
    pub template: PathBuf,
    /// Where generated quotations are written and served from
    pub output_dir: PathBuf,
    /// Optional directory with the web form, served for unknown paths
    pub static_dir: Option<PathBuf>,
    /// Optional control mapping file replacing the built-in bindings
    pub control_mappings: Option<PathBuf>,
    pub vat_rate: f64,
    pub date_format: String,
    /// Append the cost summary page
    pub include_summary: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            template: PathBuf::from(DEFAULT_TEMPLATE),
            output_dir: PathBuf::from("."),
            static_dir: None,
            control_mappings: None,
            vat_rate: DEFAULT_VAT_RATE,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            include_summary: true,
        }
    }
}

impl ServerSettings {
    /// Default settings listening on `port`
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the full bind address.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load settings from a JSON file
    ///
    /// A missing file gives the defaults. A file that is not valid settings
    /// JSON is logged and the defaults are used.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<ServerSettings>(&content) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse settings file {}, using defaults: {}",
                    path.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Generator options for these settings, loading the mapping file if set
    pub fn generator_options(&self) -> quotation::Result<GeneratorOptions> {
        let controls = match self.control_mappings {
            Some(ref path) => {
                let map = ControlMap::from_json_file(path)?;
                tracing::info!("Loaded {} control bindings from {}", map.len(), path.display());
                map
            }
            None => ControlMap::default(),
        };

        Ok(GeneratorOptions {
            controls,
            vat_rate: self.vat_rate,
            date_format: self.date_format.clone(),
            include_summary: self.include_summary,
        })
    }
}
