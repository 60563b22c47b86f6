//! # Page-Aware Layout
//!
//! Turns a styled document tree into positioned drawing primitives, one
//! list per page. Coordinates are points with the origin at the top-left
//! corner of the page; the PDF writer flips them.
//!
//! Layout works in two levels:
//!
//! 1. Every node except a top-level grid is built into a [`Block`]: a
//!    height plus elements positioned relative to the block's top-left.
//!    Blocks are unbreakable. One that does not fit in the space left on
//!    the page moves to the next page.
//! 2. A top-level grid is placed row by row. When a body row does not
//!    fit, the grid's border box is closed on the current page, a new
//!    page starts, and the header rows are placed again before the row.
//!
//! Styles come from a [`StyleResolver`] keyed on the node's ancestor path,
//! then inherit from the parent's resolved style.

use super::metrics::{baseline_offset, Face};
use super::text::break_into_lines;
use crate::document::{ColumnWidth, Document, Node, NodeKind, PageConfig};
use crate::resources::ResourceRegistry;
use crate::style::{Color, Edges, ResolvedStyle, StyleResolver, TextAlign};
use crate::InvoiceError;

/// Room for floating point error when checking whether a block fits.
const FIT_TOLERANCE: f64 = 0.01;

/// A laid out page.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    /// Drawn in order; later elements paint over earlier ones.
    pub elements: Vec<LayoutElement>,
}

impl LayoutPage {
    /// All text on the page in drawing order, for tests and debugging.
    pub fn texts(&self) -> Vec<&str> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                LayoutElement::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// A positioned drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutElement {
    /// A filled rectangle.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
    /// A stroked straight line.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        thickness: f64,
        color: Color,
    },
    /// One line of text. `y` is the baseline.
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: f64,
        bold: bool,
        color: Color,
    },
    /// A registered image scaled into the given box.
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        resource: String,
    },
}

impl LayoutElement {
    fn offset(&mut self, dx: f64, dy: f64) {
        match self {
            LayoutElement::Rect { x, y, .. }
            | LayoutElement::Text { x, y, .. }
            | LayoutElement::Image { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
            LayoutElement::Line { x1, y1, x2, y2, .. } => {
                *x1 += dx;
                *x2 += dx;
                *y1 += dy;
                *y2 += dy;
            }
        }
    }
}

/// An unbreakable piece of layout.
#[derive(Debug, Clone, Default)]
struct Block {
    height: f64,
    elements: Vec<LayoutElement>,
}

impl Block {
    fn empty(height: f64) -> Self {
        Self {
            height,
            elements: Vec::new(),
        }
    }

    /// Move every element by (dx, dy) and append it to `out`.
    fn place(self, dx: f64, dy: f64, out: &mut Vec<LayoutElement>) {
        out.extend(self.elements.into_iter().map(|mut e| {
            e.offset(dx, dy);
            e
        }));
    }
}

/// Tracks where we are on the current page.
struct PageCursor {
    page_width: f64,
    page_height: f64,
    margin: Edges,
    content_width: f64,
    content_height: f64,
    /// Distance from the top of the content area.
    y: f64,
    elements: Vec<LayoutElement>,
    pages: Vec<LayoutPage>,
}

impl PageCursor {
    fn new(config: &PageConfig) -> Self {
        let (page_width, page_height) = config.size.dimensions();
        Self {
            page_width,
            page_height,
            margin: config.margin,
            content_width: config.content_width(),
            content_height: (page_height - config.margin.vertical()).max(0.0),
            y: 0.0,
            elements: Vec::new(),
            pages: Vec::new(),
        }
    }

    fn fits(&self, height: f64) -> bool {
        self.y + height <= self.content_height + FIT_TOLERANCE
    }

    /// Start a new page unless `height` fits here. Content taller than a
    /// whole page is placed at the top of a fresh page and overflows.
    fn ensure_fits(&mut self, height: f64) {
        if !self.fits(height) && self.y > 0.0 {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        log::debug!("page {} full at y={:.1}", self.pages.len() + 1, self.y);
        self.pages.push(LayoutPage {
            width: self.page_width,
            height: self.page_height,
            elements: std::mem::take(&mut self.elements),
        });
        self.y = 0.0;
    }

    fn advance(&mut self, height: f64) {
        self.y += height;
    }

    /// Place a block at the cursor, `indent` points in from the left margin.
    fn place(&mut self, block: Block, indent: f64) {
        let height = block.height;
        block.place(
            self.margin.left + indent,
            self.margin.top + self.y,
            &mut self.elements,
        );
        self.y += height;
    }

    /// Absolute page y of a cursor position.
    fn page_y(&self, y: f64) -> f64 {
        self.margin.top + y
    }

    fn finish(mut self) -> Vec<LayoutPage> {
        self.pages.push(LayoutPage {
            width: self.page_width,
            height: self.page_height,
            elements: self.elements,
        });
        self.pages
    }
}

/// Lays out a [`Document`] into [`LayoutPage`]s.
pub struct LayoutEngine<'a> {
    styles: &'a dyn StyleResolver,
    resources: &'a ResourceRegistry,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(styles: &'a dyn StyleResolver, resources: &'a ResourceRegistry) -> Self {
        Self { styles, resources }
    }

    /// Lay out the whole document. Always returns at least one page.
    pub fn layout(&self, document: &Document) -> Result<Vec<LayoutPage>, InvoiceError> {
        let mut cursor = PageCursor::new(&document.page);
        let width = cursor.content_width;

        let mut previous: Option<&Node> = None;
        for node in &document.children {
            if ends_text_line(previous, node) {
                previous = Some(node);
                continue;
            }
            previous = Some(node);

            match &node.kind {
                NodeKind::Grid { columns } => {
                    self.layout_paginated_grid(node, columns, &mut cursor)?
                }
                _ => {
                    let block = self.build(&[node], None, width, 0.0)?;
                    cursor.ensure_fits(block.height);
                    cursor.place(block, 0.0);
                }
            }
        }

        let pages = cursor.finish();
        log::debug!("laid out {} page(s)", pages.len());
        Ok(pages)
    }

    fn resolve(&self, path: &[&Node], parent: Option<&ResolvedStyle>) -> ResolvedStyle {
        self.styles.resolve_style(path).resolve(parent)
    }

    /// Build the node at the end of `path` into a block `width` points wide
    /// (margin box) and at least `min_height` tall.
    fn build(
        &self,
        path: &[&Node],
        parent: Option<&ResolvedStyle>,
        width: f64,
        min_height: f64,
    ) -> Result<Block, InvoiceError> {
        let Some(&node) = path.last() else {
            return Ok(Block::default());
        };
        let style = self.resolve(path, parent);
        let content_width = (width - style.horizontal_chrome()).max(0.0);

        let content = match &node.kind {
            NodeKind::Section | NodeKind::GridCell { .. } => {
                self.stack_children(path, &style, content_width)?
            }
            NodeKind::Columns => self.columns(path, &style, content_width)?,
            NodeKind::Text { content } => text_block(content, &style, content_width),
            NodeKind::LineBreak => Block::empty(style.line_box()),
            NodeKind::Rule => Block::empty(0.0),
            NodeKind::Spacer { height } => Block::empty(height.max(0.0)),
            NodeKind::Image {
                resource,
                width: box_width,
                height: box_height,
            } => self.image_block(resource, *box_width, *box_height, &style, content_width)?,
            NodeKind::Grid { columns } => {
                let widths = resolve_column_widths(columns, content_width, &node.children);
                let mut content = Block::default();
                for (_, row) in self.grid_rows(path, &style, &widths)? {
                    let height = row.height;
                    row.place(0.0, content.height, &mut content.elements);
                    content.height += height;
                }
                content
            }
            NodeKind::GridRow { .. } => {
                let columns = node.children.iter().map(|c| c.col_span() as usize).sum::<usize>();
                let widths = vec![content_width / columns.max(1) as f64; columns];
                self.row_cells(path, &style, &widths)?
            }
        };

        Ok(boxed(&style, width, min_height, content))
    }

    /// Children top to bottom. A line break directly after a text node
    /// only ends that text's line, so it takes no space.
    fn stack_children(
        &self,
        path: &[&Node],
        style: &ResolvedStyle,
        width: f64,
    ) -> Result<Block, InvoiceError> {
        let Some(&node) = path.last() else {
            return Ok(Block::default());
        };
        let mut block = Block::default();
        let mut previous: Option<&Node> = None;

        for child in &node.children {
            let skip = ends_text_line(previous, child);
            previous = Some(child);
            if skip {
                continue;
            }
            let child_path = extend(path, child);
            let child_block = self.build(&child_path, Some(style), width, 0.0)?;
            let height = child_block.height;
            child_block.place(0.0, block.height, &mut block.elements);
            block.height += height;
        }
        Ok(block)
    }

    /// Children side by side. A child with a `width` takes it; the rest
    /// share what is left equally.
    fn columns(
        &self,
        path: &[&Node],
        style: &ResolvedStyle,
        width: f64,
    ) -> Result<Block, InvoiceError> {
        let Some(&node) = path.last() else {
            return Ok(Block::default());
        };

        let requested: Vec<Option<f64>> = node
            .children
            .iter()
            .map(|child| {
                self.styles
                    .resolve_style(&extend(path, child))
                    .width
                    .map(|w| w.resolve(width))
            })
            .collect();
        let fixed: f64 = requested.iter().flatten().sum();
        let flexible = requested.iter().filter(|w| w.is_none()).count();
        let share = if flexible > 0 {
            ((width - fixed) / flexible as f64).max(0.0)
        } else {
            0.0
        };

        let mut block = Block::default();
        let mut x = 0.0;
        for (child, requested) in node.children.iter().zip(requested) {
            let child_width = requested.unwrap_or(share);
            let child_block = self.build(&extend(path, child), Some(style), child_width, 0.0)?;
            block.height = block.height.max(child_block.height);
            child_block.place(x, 0.0, &mut block.elements);
            x += child_width;
        }
        Ok(block)
    }

    fn image_block(
        &self,
        resource: &str,
        box_width: f64,
        box_height: f64,
        style: &ResolvedStyle,
        width: f64,
    ) -> Result<Block, InvoiceError> {
        let image = self.resources.image(resource).ok_or_else(|| {
            InvoiceError::Render(format!("image resource '{}' is not registered", resource))
        })?;

        let box_width = box_width.min(width).max(0.0);
        let ratio = image.aspect_ratio();
        let (draw_width, draw_height) = if box_height > 0.0 && box_width / box_height > ratio {
            (box_height * ratio, box_height)
        } else {
            (box_width, box_width / ratio)
        };

        Ok(Block {
            height: draw_height,
            elements: vec![LayoutElement::Image {
                x: align_offset(style.text_align, width, draw_width),
                y: 0.0,
                width: draw_width,
                height: draw_height,
                resource: resource.to_string(),
            }],
        })
    }

    /// Build every row of a grid at the given column widths, headers first.
    fn grid_rows(
        &self,
        path: &[&Node],
        style: &ResolvedStyle,
        widths: &[f64],
    ) -> Result<Vec<(bool, Block)>, InvoiceError> {
        let Some(&grid) = path.last() else {
            return Ok(Vec::new());
        };
        let (headers, body): (Vec<&Node>, Vec<&Node>) = grid
            .children
            .iter()
            .partition(|row| matches!(row.kind, NodeKind::GridRow { is_header: true }));

        headers
            .into_iter()
            .map(|row| (true, row))
            .chain(body.into_iter().map(|row| (false, row)))
            .map(|(is_header, row)| -> Result<(bool, Block), InvoiceError> {
                let row_path = extend(path, row);
                let row_style = self.resolve(&row_path, Some(style));
                let content = self.row_cells(&row_path, &row_style, widths)?;
                let width = widths.iter().sum::<f64>() + row_style.horizontal_chrome();
                Ok((is_header, boxed(&row_style, width, 0.0, content)))
            })
            .collect()
    }

    /// Cells left to right. Cells are measured once to find the row height,
    /// then shorter ones are rebuilt stretched to it so backgrounds and
    /// borders line up.
    fn row_cells(
        &self,
        path: &[&Node],
        style: &ResolvedStyle,
        widths: &[f64],
    ) -> Result<Block, InvoiceError> {
        let Some(&row) = path.last() else {
            return Ok(Block::default());
        };

        let mut cells = Vec::with_capacity(row.children.len());
        let mut column = 0;
        for cell in &row.children {
            let span = cell.col_span() as usize;
            let end = (column + span).min(widths.len());
            let x: f64 = widths[..column.min(widths.len())].iter().sum();
            let width: f64 = widths[column.min(widths.len())..end].iter().sum();
            let cell_path = extend(path, cell);
            let block = self.build(&cell_path, Some(style), width, 0.0)?;
            cells.push((cell_path, x, width, block));
            column += span;
        }

        let height = cells.iter().map(|(.., b)| b.height).fold(0.0, f64::max);
        let mut block = Block::empty(height);
        for (cell_path, x, width, cell_block) in cells {
            let cell_block = if cell_block.height + FIT_TOLERANCE < height {
                self.build(&cell_path, Some(style), width, height)?
            } else {
                cell_block
            };
            cell_block.place(x, 0.0, &mut block.elements);
        }
        Ok(block)
    }

    /// Place a top-level grid row by row, breaking between body rows and
    /// repeating the header rows on every continuation page.
    fn layout_paginated_grid(
        &self,
        node: &Node,
        columns: &[ColumnWidth],
        cursor: &mut PageCursor,
    ) -> Result<(), InvoiceError> {
        let path = [node];
        let style = self.resolve(&path, None);
        let box_width = (cursor.content_width - style.margin.horizontal()).max(0.0);
        let inner_width =
            (box_width - style.border_width.horizontal() - style.padding.horizontal()).max(0.0);
        let widths = resolve_column_widths(columns, inner_width, &node.children);

        let rows = self.grid_rows(&path, &style, &widths)?;
        let (headers, body): (Vec<_>, Vec<_>) = rows.into_iter().partition(|(header, _)| *header);
        let headers: Vec<Block> = headers.into_iter().map(|(_, b)| b).collect();
        let header_height: f64 = headers.iter().map(|b| b.height).sum();

        let top = style.border_width.top + style.padding.top;
        let bottom = style.padding.bottom + style.border_width.bottom;
        let inner_indent = style.margin.left + style.border_width.left + style.padding.left;

        let first_row = body.first().map(|(_, b)| b.height).unwrap_or(0.0);
        cursor.ensure_fits(style.margin.top + top + header_height + first_row + bottom);
        cursor.advance(style.margin.top);

        let mut segment = GridSegment::open(cursor, top, &headers, inner_indent);
        for (_, row) in body {
            if segment.body_rows > 0 && !cursor.fits(row.height + bottom) {
                segment.close(cursor, &style, box_width, bottom);
                cursor.new_page();
                log::debug!("grid continues on page {}", cursor.pages.len() + 1);
                segment = GridSegment::open(cursor, top, &headers, inner_indent);
            }
            cursor.place(row, inner_indent);
            segment.body_rows += 1;
        }
        segment.close(cursor, &style, box_width, bottom);
        cursor.advance(style.margin.bottom);
        Ok(())
    }
}

/// The part of a grid's border box that lands on one page.
struct GridSegment {
    start_y: f64,
    first_element: usize,
    body_rows: usize,
}

impl GridSegment {
    fn open(cursor: &mut PageCursor, top: f64, headers: &[Block], indent: f64) -> Self {
        let segment = Self {
            start_y: cursor.y,
            first_element: cursor.elements.len(),
            body_rows: 0,
        };
        cursor.advance(top);
        for header in headers {
            cursor.place(header.clone(), indent);
        }
        segment
    }

    /// Draw the segment's background behind its rows and its borders on
    /// top of them.
    fn close(self, cursor: &mut PageCursor, style: &ResolvedStyle, width: f64, bottom: f64) {
        cursor.advance(bottom);
        let x = cursor.margin.left + style.margin.left;
        let y = cursor.page_y(self.start_y);
        let height = cursor.y - self.start_y;
        if let Some(color) = style.background_color {
            cursor.elements.insert(
                self.first_element,
                LayoutElement::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                },
            );
        }
        cursor
            .elements
            .extend(border_lines(style, x, y, width, height));
    }
}

/// Wrap content in the node's padding, border and margin.
fn boxed(style: &ResolvedStyle, width: f64, min_height: f64, content: Block) -> Block {
    let border = style.border_width;
    let padding = style.padding;
    let margin = style.margin;

    let box_width = (width - margin.horizontal()).max(0.0);
    let box_height = (content.height + border.vertical() + padding.vertical())
        .max(min_height - margin.vertical());

    let mut block = Block {
        height: box_height + margin.vertical(),
        elements: Vec::with_capacity(content.elements.len() + 5),
    };
    if let Some(color) = style.background_color {
        block.elements.push(LayoutElement::Rect {
            x: margin.left,
            y: margin.top,
            width: box_width,
            height: box_height,
            color,
        });
    }
    content.place(
        margin.left + border.left + padding.left,
        margin.top + border.top + padding.top,
        &mut block.elements,
    );
    block.elements.extend(border_lines(
        style,
        margin.left,
        margin.top,
        box_width,
        box_height,
    ));
    block
}

/// One line per side with a non-zero border width, centred on the border
/// stripe.
fn border_lines(
    style: &ResolvedStyle,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<LayoutElement> {
    let b = style.border_width;
    let color = style.border_color;
    let mut lines = Vec::new();
    let mut line = |x1: f64, y1: f64, x2: f64, y2: f64, thickness: f64| {
        if thickness > 0.0 {
            lines.push(LayoutElement::Line {
                x1,
                y1,
                x2,
                y2,
                thickness,
                color,
            });
        }
    };

    line(x, y + b.top / 2.0, x + width, y + b.top / 2.0, b.top);
    line(
        x + width - b.right / 2.0,
        y,
        x + width - b.right / 2.0,
        y + height,
        b.right,
    );
    line(
        x,
        y + height - b.bottom / 2.0,
        x + width,
        y + height - b.bottom / 2.0,
        b.bottom,
    );
    line(x + b.left / 2.0, y, x + b.left / 2.0, y + height, b.left);
    lines
}

fn text_block(content: &str, style: &ResolvedStyle, width: f64) -> Block {
    let face = Face::from_weight(style.font_weight);
    let line_box = style.line_box();
    let baseline = baseline_offset(style.font_size, line_box);
    let lines = break_into_lines(content, width, style.font_size, face);

    let mut block = Block::empty(lines.len() as f64 * line_box);
    for (i, line) in lines.into_iter().enumerate() {
        if line.text.is_empty() {
            continue;
        }
        block.elements.push(LayoutElement::Text {
            x: align_offset(style.text_align, width, line.width),
            y: i as f64 * line_box + baseline,
            text: line.text,
            font_size: style.font_size,
            bold: style.is_bold(),
            color: style.color,
        });
    }
    block
}

fn align_offset(align: TextAlign, available: f64, used: f64) -> f64 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Right => (available - used).max(0.0),
        TextAlign::Center => ((available - used) / 2.0).max(0.0),
    }
}

/// Fixed columns take their width; `Auto` columns share the rest equally.
/// Without definitions every column of the first row gets an equal share.
fn resolve_column_widths(defs: &[ColumnWidth], available: f64, rows: &[Node]) -> Vec<f64> {
    if defs.is_empty() {
        let count = rows
            .first()
            .map(|row| row.children.iter().map(|c| c.col_span() as usize).sum())
            .unwrap_or(1)
            .max(1);
        return vec![available / count as f64; count];
    }

    let fixed: f64 = defs
        .iter()
        .map(|d| match d {
            ColumnWidth::Fixed(w) => *w,
            ColumnWidth::Auto => 0.0,
        })
        .sum();
    let auto_count = defs.iter().filter(|d| matches!(d, ColumnWidth::Auto)).count();
    let auto_width = if auto_count > 0 {
        ((available - fixed) / auto_count as f64).max(0.0)
    } else {
        0.0
    };

    defs.iter()
        .map(|d| match d {
            ColumnWidth::Fixed(w) => *w,
            ColumnWidth::Auto => auto_width,
        })
        .collect()
}

fn ends_text_line(previous: Option<&Node>, node: &Node) -> bool {
    matches!(node.kind, NodeKind::LineBreak)
        && matches!(previous.map(|p| &p.kind), Some(NodeKind::Text { .. }))
}

fn extend<'n>(path: &[&'n Node], child: &'n Node) -> Vec<&'n Node> {
    let mut extended = Vec::with_capacity(path.len() + 1);
    extended.extend_from_slice(path);
    extended.push(child);
    extended
}
