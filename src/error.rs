//! Structured error types for the invoice pipeline.
//!
//! Every public operation returns `InvoiceError`. Input problems (JSON,
//! invoice validation, selectors) are separated from environment problems
//! (resources, files) and from failures inside the rendering backend.

use std::path::PathBuf;
use thiserror::Error;

/// The unified error type returned by all public Invoicer API functions.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// JSON input (invoice, config or stylesheet) failed to parse.
    #[error("Failed to parse input: {source}{hint}")]
    Parse {
        #[source]
        source: serde_json::Error,
        /// Pre-formatted hint, empty when there is nothing useful to add.
        hint: String,
    },

    /// The invoice data violates a model invariant.
    #[error("Invalid invoice: {0}")]
    InvalidInvoice(String),

    /// A stylesheet selector could not be parsed.
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// A named binary resource could not be loaded or decoded.
    #[error("Resource '{name}' could not be loaded: {message}")]
    Resource { name: String, message: String },

    /// A file could not be opened, read or written.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Layout or PDF generation failed.
    #[error("Render error: {0}")]
    Render(String),
}

impl InvoiceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InvoiceError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for InvoiceError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters."
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected schema. Check field names and types."
            }
            serde_json::error::Category::Eof => "Unexpected end of input. Is the JSON truncated?",
            serde_json::error::Category::Io => "",
        };
        let hint = if hint.is_empty() {
            String::new()
        } else {
            format!("\n  Hint: {}", hint)
        };
        InvoiceError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_carries_hint() {
        let err: InvoiceError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse input"));
        assert!(msg.contains("trailing commas"));
    }

    #[test]
    fn eof_error_carries_hint() {
        let err: InvoiceError = serde_json::from_str::<serde_json::Value>("{\"a\": ")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn io_error_names_the_path() {
        let err = InvoiceError::io(
            "/nowhere/invoice.pdf",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/nowhere/invoice.pdf"));
    }
}
