//! # Document Tree
//!
//! The representation handed to the rendering backend. A document is a
//! tree of typed nodes; each node carries class names (matched by the
//! stylesheet), an optional inline style, and children.
//!
//! Node kinds are deliberately few: block containers (`Section`,
//! `Columns`), leaf content (`Text`, `LineBreak`, `Rule`, `Image`,
//! `Spacer`) and the table trio (`Grid`, `GridRow`, `GridCell`).

use crate::style::{Edges, Style};
use serde::{Deserialize, Serialize};

/// A complete document ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Top-level nodes, laid out top to bottom.
    pub children: Vec<Node>,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub page: PageConfig,
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
}

/// Page size and margins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default)]
    pub size: PageSize,

    /// Page margins in points (1/72 inch).
    #[serde(default = "default_margin")]
    pub margin: Edges,
}

fn default_margin() -> Edges {
    Edges::uniform(40.0)
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: default_margin(),
        }
    }
}

impl PageConfig {
    /// Width available to content between the left and right margins.
    pub fn content_width(&self) -> f64 {
        let (width, _) = self.size.dimensions();
        (width - self.margin.horizontal()).max(0.0)
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub kind: NodeKind,

    /// Class names matched by stylesheet selectors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,

    /// Inline style. Wins over every stylesheet rule.
    #[serde(default)]
    pub style: Style,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

/// The different kinds of nodes in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// Vertical container.
    Section,

    /// Horizontal container. Children take their `width`, or an equal
    /// share of what is left.
    Columns,

    /// A run of text, wrapped to the content width.
    Text { content: String },

    /// Ends the current text line; on its own it adds one empty line.
    LineBreak,

    /// A horizontal rule across the content width.
    Rule,

    /// A registered image resource drawn at the given size (points),
    /// preserving aspect ratio inside that box.
    Image {
        resource: String,
        width: f64,
        height: f64,
    },

    /// Fixed vertical space.
    Spacer { height: f64 },

    /// A table. Children are `GridRow` nodes.
    Grid { columns: Vec<ColumnWidth> },

    /// A row inside a `Grid`.
    GridRow {
        /// Header rows repeat at the top of each page the grid continues on.
        #[serde(default)]
        is_header: bool,
    },

    /// A cell inside a `GridRow`.
    GridCell {
        #[serde(default = "default_one")]
        col_span: u32,
    },
}

fn default_one() -> u32 {
    1
}

/// Column width definition for grids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColumnWidth {
    /// Fixed width in points.
    Fixed(f64),
    /// Share the width left after fixed columns evenly with other `Auto`
    /// columns.
    Auto,
}

impl NodeKind {
    /// The element name selectors match against.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Section => "section",
            NodeKind::Columns => "columns",
            NodeKind::Text { .. } => "text",
            NodeKind::LineBreak => "br",
            NodeKind::Rule => "hr",
            NodeKind::Image { .. } => "img",
            NodeKind::Spacer { .. } => "spacer",
            NodeKind::Grid { .. } => "grid",
            NodeKind::GridRow { .. } => "row",
            NodeKind::GridCell { .. } => "cell",
        }
    }
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            classes: Vec::new(),
            style: Style::default(),
            children,
        }
    }

    pub fn section(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Section, children)
    }

    pub fn columns(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Columns, children)
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(
            NodeKind::Text {
                content: content.into(),
            },
            vec![],
        )
    }

    pub fn line_break() -> Self {
        Self::new(NodeKind::LineBreak, vec![])
    }

    pub fn rule() -> Self {
        Self::new(NodeKind::Rule, vec![])
    }

    pub fn image(resource: impl Into<String>, width: f64, height: f64) -> Self {
        Self::new(
            NodeKind::Image {
                resource: resource.into(),
                width,
                height,
            },
            vec![],
        )
    }

    pub fn spacer(height: f64) -> Self {
        Self::new(NodeKind::Spacer { height }, vec![])
    }

    pub fn grid(columns: Vec<ColumnWidth>, rows: Vec<Node>) -> Self {
        Self::new(NodeKind::Grid { columns }, rows)
    }

    pub fn row(is_header: bool, cells: Vec<Node>) -> Self {
        Self::new(NodeKind::GridRow { is_header }, cells)
    }

    /// A cell holding a single text node.
    pub fn cell(content: impl Into<String>, col_span: u32) -> Self {
        Self::new(NodeKind::GridCell { col_span }, vec![Node::text(content)])
    }

    /// Add class names (space separated).
    pub fn with_class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Concatenated text of this node and its descendants, lines joined
    /// with `\n`.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join("\n")
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let NodeKind::Text { content } = &self.kind {
            out.push(content);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Column span of a grid cell, 1 for anything else.
    pub fn col_span(&self) -> u32 {
        match self.kind {
            NodeKind::GridCell { col_span } => col_span.max(1),
            _ => 1,
        }
    }
}
