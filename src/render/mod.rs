//! # Rendering
//!
//! The boundary between the invoice core and PDF production. The composer
//! only ever sees [`RenderBackend`]; [`PdfBackend`] is the implementation
//! the crate ships:
//!
//! ```text
//! Document ──layout──▶ Vec<LayoutPage> ──pdf──▶ bytes
//!     ▲                     ▲
//!  StyleResolver      ResourceRegistry
//! ```

pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod text;

use crate::document::Document;
use crate::resources::ResourceRegistry;
use crate::style::StyleResolver;
use crate::InvoiceError;
use std::io::Write;

pub use layout::{LayoutElement, LayoutEngine, LayoutPage};
pub use pdf::PdfWriter;

/// Turns a document tree into output bytes.
pub trait RenderBackend {
    fn render(
        &self,
        document: &Document,
        styles: &dyn StyleResolver,
        resources: &ResourceRegistry,
        sink: &mut dyn Write,
    ) -> Result<(), InvoiceError>;
}

/// Paginated layout followed by PDF serialization.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfBackend;

impl PdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl RenderBackend for PdfBackend {
    fn render(
        &self,
        document: &Document,
        styles: &dyn StyleResolver,
        resources: &ResourceRegistry,
        sink: &mut dyn Write,
    ) -> Result<(), InvoiceError> {
        let pages = LayoutEngine::new(styles, resources).layout(document)?;
        log::info!("laid out {} page(s)", pages.len());
        PdfWriter::new().write(&pages, &document.metadata, resources, sink)
    }
}
