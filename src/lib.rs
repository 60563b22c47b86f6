//! # Invoicer
//!
//! Builds a fixed-layout PDF invoice from a seller, a buyer and an ordered
//! list of line items.
//!
//! The invoice core is small: a value model with exact decimal totals, and
//! an assembler that turns line items into a grid with a computed total
//! row. Everything visual is data. Nodes carry class names, and a
//! [`StyleSheet`] of selector rules decides how they look. Rendering sits
//! behind the [`RenderBackend`] trait.
//!
//! ## Architecture
//!
//! ```text
//! Invoice (model)
//!       ↓
//!   [grid]      : info blocks, products grid, total row
//!       ↓
//!   [compose]   : banner, blocks, rule, grid, spacer → Document
//!       ↓
//!   [style]     : selector cascade, inheritance, defaults
//!       ↓
//!   [render]    : page-aware layout, then PDF via printpdf
//! ```

pub mod compose;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod grid;
pub mod model;
pub mod render;
pub mod resources;
pub mod style;

pub use compose::DocumentComposer;
pub use config::RenderConfig;
pub use document::{Document, Node, NodeKind};
pub use error::InvoiceError;
pub use grid::GridAssembler;
pub use model::{CompanyInfo, Invoice, InvoiceTotals, ProductEntry};
pub use render::{PdfBackend, RenderBackend};
pub use style::{StyleResolver, StyleSheet};

use std::path::Path;

/// Render an invoice with the default theme to PDF bytes.
pub fn render(invoice: &Invoice, config: RenderConfig) -> Result<Vec<u8>, InvoiceError> {
    let composer = DocumentComposer::new(config, StyleSheet::invoice_default())?;
    let mut bytes = Vec::new();
    composer.render_to(invoice, &mut bytes)?;
    Ok(bytes)
}

/// Render an invoice with the default theme to a file.
pub fn render_to_file(
    invoice: &Invoice,
    config: RenderConfig,
    path: &Path,
) -> Result<(), InvoiceError> {
    DocumentComposer::new(config, StyleSheet::invoice_default())?.write_to_path(invoice, path)
}
