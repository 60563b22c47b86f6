//! # Document Composition
//!
//! Arranges the invoice into its fixed section order and hands the result
//! to a [`RenderBackend`]:
//!
//! ```text
//! banner (logo + title)
//! info blocks: seller | "Bill to:" + buyer
//! rule
//! products grid
//! spacer
//! ```
//!
//! The composer owns the stylesheet and the resource registry. Resources
//! are loaded in [`DocumentComposer::new`], so a bad logo path fails before
//! any output file exists.

use crate::config::RenderConfig;
use crate::document::{Document, Metadata, Node};
use crate::grid::GridAssembler;
use crate::model::Invoice;
use crate::render::{PdfBackend, RenderBackend};
use crate::resources::ResourceRegistry;
use crate::style::StyleSheet;
use crate::InvoiceError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Resource name the banner image is registered under.
pub const LOGO_RESOURCE: &str = "logo";

/// Prefix of the buyer's info block.
pub const BILL_TO: &str = "Bill to:";

const TRAILING_SPACE: f64 = 20.0;

pub struct DocumentComposer<B: RenderBackend = PdfBackend> {
    config: RenderConfig,
    styles: StyleSheet,
    resources: ResourceRegistry,
    grids: GridAssembler,
    backend: B,
}

impl DocumentComposer<PdfBackend> {
    /// A composer rendering through [`PdfBackend`].
    pub fn new(config: RenderConfig, styles: StyleSheet) -> Result<Self, InvoiceError> {
        Self::with_backend(config, styles, PdfBackend::new())
    }
}

impl<B: RenderBackend> DocumentComposer<B> {
    pub fn with_backend(
        config: RenderConfig,
        styles: StyleSheet,
        backend: B,
    ) -> Result<Self, InvoiceError> {
        let mut resources = ResourceRegistry::new();
        if let Some(logo) = &config.logo {
            resources.register_file(LOGO_RESOURCE, logo)?;
            log::info!("loaded logo from {}", logo.display());
        }

        Ok(Self {
            config,
            styles,
            resources,
            grids: GridAssembler::new(),
            backend,
        })
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Build the document tree for `invoice`.
    pub fn compose(&self, invoice: &Invoice) -> Document {
        let bill_to = format!("{}\n{}", BILL_TO, invoice.buyer().display_text);
        let info = self
            .grids
            .build_info_blocks(&[invoice.seller().display_text.as_str(), bill_to.as_str()]);

        Document {
            children: vec![
                self.banner(),
                info,
                Node::rule(),
                self.grids.build_products_grid(invoice.line_items()),
                Node::spacer(TRAILING_SPACE),
            ],
            metadata: Metadata {
                title: self.config.title.clone(),
            },
            page: self.config.page.clone(),
        }
    }

    fn banner(&self) -> Node {
        let mut children = Vec::with_capacity(2);
        if self.resources.contains(LOGO_RESOURCE) {
            children.push(
                Node::image(LOGO_RESOURCE, self.config.logo_width, self.config.logo_height)
                    .with_class("logo"),
            );
        }
        children.push(Node::text(self.config.banner_title.as_str()).with_class("title"));
        Node::section(children).with_class("banner")
    }

    /// Compose `invoice` and render it into `sink`.
    pub fn render_to(&self, invoice: &Invoice, sink: &mut dyn Write) -> Result<(), InvoiceError> {
        let document = self.compose(invoice);
        self.backend
            .render(&document, &self.styles, &self.resources, sink)
    }

    /// Render `invoice` to a file at `path`.
    ///
    /// The file is created right before rendering and closed on every
    /// return path. If rendering fails the partial file is removed; if the
    /// file cannot be opened, nothing on disk is touched.
    pub fn write_to_path(&self, invoice: &Invoice, path: &Path) -> Result<(), InvoiceError> {
        let file = File::create(path).map_err(|e| InvoiceError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        let result = self
            .render_to(invoice, &mut writer)
            .and_then(|()| writer.flush().map_err(|e| InvoiceError::io(path, e)));
        drop(writer);

        if result.is_err() {
            if let Err(e) = std::fs::remove_file(path) {
                log::warn!("could not remove partial output {}: {}", path.display(), e);
            }
        }
        result
    }
}
