//! Render configuration.
//!
//! Everything about the output that is not invoice data: page geometry,
//! document metadata, the banner, and where the file goes. Loaded from JSON
//! with every field optional:
//!
//! ```json
//! {
//!   "page": { "size": "Letter", "margin": { "top": 36, "right": 36, "bottom": 36, "left": 36 } },
//!   "title": "Invoice #1042",
//!   "logo": "./assets/logo.png",
//!   "logoWidth": 120
//! }
//! ```

use crate::document::PageConfig;
use crate::InvoiceError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT: &str = "invoice.pdf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub page: PageConfig,

    /// PDF document title. Defaults to "Invoice".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Heading text in the banner.
    pub banner_title: String,

    /// Banner image file. No image is drawn when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<PathBuf>,
    /// Box the logo is fitted into, in points.
    pub logo_width: f64,
    pub logo_height: f64,

    /// Where the CLI writes the PDF unless `--output` is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            title: None,
            banner_title: "INVOICE".to_string(),
            logo: None,
            logo_width: 150.0,
            logo_height: 50.0,
            output: None,
        }
    }
}

impl RenderConfig {
    pub fn from_json(json: &str) -> Result<Self, InvoiceError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, InvoiceError> {
        let json = std::fs::read_to_string(path).map_err(|e| InvoiceError::io(path, e))?;
        let config = Self::from_json(&json)?;
        log::debug!("loaded render config from {}", path.display());
        Ok(config)
    }

    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo = Some(path.into());
        self
    }

    /// Output path from the config, or `invoice.pdf`.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }
}
