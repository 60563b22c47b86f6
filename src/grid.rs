//! # Grid Assembly
//!
//! Builds the two data-driven parts of the invoice document: the
//! side-by-side company blocks and the products grid with its computed
//! total row. The output is plain document nodes tagged with classes;
//! every visual decision lives in the stylesheet.

use crate::document::{ColumnWidth, Node, NodeKind};
use crate::format::{format_decimal, format_quantity};
use crate::model::{InvoiceTotals, ProductEntry};
use crate::style::{Dimension, Style};
use rust_decimal::Decimal;

/// Header labels of the products grid, left to right.
pub const PRODUCT_COLUMNS: [&str; 6] = ["#", "Product", "Qty.", "Price", "Disc.(%)", "Total"];

/// Label of the summary row.
pub const TOTAL_LABEL: &str = "Total(USD)";

/// Column span of the summary label; the amount takes the rest.
const TOTAL_LABEL_SPAN: u32 = 4;

fn product_column_widths() -> Vec<ColumnWidth> {
    vec![
        ColumnWidth::Fixed(20.0),
        ColumnWidth::Auto,
        ColumnWidth::Fixed(40.0),
        ColumnWidth::Fixed(50.0),
        ColumnWidth::Fixed(60.0),
        ColumnWidth::Fixed(60.0),
    ]
}

/// Stateless builder for the invoice's grid-shaped content.
#[derive(Debug, Default, Clone, Copy)]
pub struct GridAssembler;

impl GridAssembler {
    pub fn new() -> Self {
        Self
    }

    /// One `Columns` node holding a `Section` per text block, each given an
    /// equal share of the width. Every line of a block becomes a text node
    /// followed by a line break.
    pub fn build_info_blocks<S: AsRef<str>>(&self, blocks: &[S]) -> Node {
        let share = if blocks.is_empty() {
            0.0
        } else {
            100.0 / blocks.len() as f64
        };

        let sections = blocks
            .iter()
            .map(|block| {
                let children = block
                    .as_ref()
                    .lines()
                    .flat_map(|line| [Node::text(line), Node::line_break()])
                    .collect();
                Node::section(children)
                    .with_class("info-block")
                    .with_style(Style {
                        width: Some(Dimension::Percent(share)),
                        ..Default::default()
                    })
            })
            .collect();

        Node::columns(sections).with_class("info")
    }

    /// Header row, one row per item in input order, then the total row.
    ///
    /// The grand total is accumulated while the item rows are emitted. Raw
    /// entries whose totals overflow show `Decimal::MAX` instead of failing.
    pub fn build_products_grid(&self, items: &[ProductEntry]) -> Node {
        let mut rows = Vec::with_capacity(items.len() + 2);
        rows.push(header_row());

        let mut totals = InvoiceTotals::new();
        for item in items {
            let line_total = totals.add(item);
            rows.push(item_row(item, line_total));
        }

        rows.push(total_row(&totals));
        Node::grid(product_column_widths(), rows)
    }
}

fn header_row() -> Node {
    let cells = PRODUCT_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let cell = Node::cell(*label, 1).with_class("header");
            if i == 0 {
                cell.with_class("first")
            } else {
                cell
            }
        })
        .collect();
    Node::row(true, cells).with_class("header")
}

fn item_row(item: &ProductEntry, line_total: Decimal) -> Node {
    Node::row(
        false,
        vec![
            Node::cell(item.position.to_string(), 1).with_class("center first"),
            Node::cell(item.description.as_str(), 1).with_class("left"),
            Node::cell(format_quantity(item.quantity), 1).with_class("center"),
            Node::cell(format_decimal(item.unit_price), 1),
            Node::cell(format_decimal(item.discount_percent), 1),
            Node::cell(format_decimal(line_total), 1),
        ],
    )
    .with_class("item")
}

fn total_row(totals: &InvoiceTotals) -> Node {
    let amount_span = PRODUCT_COLUMNS.len() as u32 - TOTAL_LABEL_SPAN;
    Node::row(
        false,
        vec![
            Node::cell(TOTAL_LABEL, TOTAL_LABEL_SPAN),
            Node::cell(format_decimal(totals.grand_total()), amount_span),
        ],
    )
    .with_class("total")
}

/// The row nodes of a grid; empty for anything else.
pub fn rows(grid: &Node) -> Vec<&Node> {
    match grid.kind {
        NodeKind::Grid { .. } => grid
            .children
            .iter()
            .filter(|c| matches!(c.kind, NodeKind::GridRow { .. }))
            .collect(),
        _ => Vec::new(),
    }
}

/// The text of each cell in a row, left to right.
pub fn cell_texts(row: &Node) -> Vec<String> {
    row.children
        .iter()
        .filter(|c| matches!(c.kind, NodeKind::GridCell { .. }))
        .map(Node::text_content)
        .collect()
}
