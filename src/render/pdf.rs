//! # PDF Output
//!
//! Draws laid out pages with `printpdf`. Layout works in points from the
//! top-left corner; printpdf takes millimetres from the bottom-left, so
//! every coordinate is converted and every `y` flipped here and nowhere
//! else.
//!
//! Text uses the builtin Helvetica faces, which are referenced by name and
//! never embedded. Images are embedded as 8-bit RGB XObjects.

use super::layout::{LayoutElement, LayoutPage};
use crate::document::Metadata;
use crate::resources::ResourceRegistry;
use crate::style::Color;
use crate::InvoiceError;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Polygon, Px, Rgb,
};
use std::io::{BufWriter, Write};

const PT_TO_MM: f64 = 25.4 / 72.0;
const DEFAULT_TITLE: &str = "Invoice";
const LAYER_NAME: &str = "Layer 1";

fn mm(pt: f64) -> Mm {
    Mm((pt * PT_TO_MM) as f32)
}

fn pdf_color(color: Color) -> printpdf::Color {
    printpdf::Color::Rgb(Rgb::new(color.r as f32, color.g as f32, color.b as f32, None))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

#[derive(Debug, Default)]
pub struct PdfWriter;

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize `pages` as a PDF into `sink`.
    pub fn write(
        &self,
        pages: &[LayoutPage],
        metadata: &Metadata,
        resources: &ResourceRegistry,
        sink: &mut dyn Write,
    ) -> Result<(), InvoiceError> {
        let Some(first) = pages.first() else {
            return Err(InvoiceError::Render("no pages to write".to_string()));
        };
        let title = metadata.title.as_deref().unwrap_or(DEFAULT_TITLE);

        let (doc, first_page, first_layer) =
            PdfDocument::new(title, mm(first.width), mm(first.height), LAYER_NAME);
        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(render_error)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(render_error)?,
        };

        for (index, page) in pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_ref, layer_ref) =
                    doc.add_page(mm(page.width), mm(page.height), LAYER_NAME);
                doc.get_page(page_ref).get_layer(layer_ref)
            };
            draw_page(page, &layer, &fonts, resources)?;
        }

        let mut writer = BufWriter::new(sink);
        doc.save(&mut writer).map_err(render_error)?;
        writer
            .flush()
            .map_err(|e| InvoiceError::Render(format!("failed to flush PDF output: {}", e)))?;
        log::debug!("wrote {} page(s) titled '{}'", pages.len(), title);
        Ok(())
    }
}

fn render_error(e: impl std::fmt::Display) -> InvoiceError {
    InvoiceError::Render(e.to_string())
}

fn draw_page(
    page: &LayoutPage,
    layer: &PdfLayerReference,
    fonts: &Fonts,
    resources: &ResourceRegistry,
) -> Result<(), InvoiceError> {
    let flip = |y: f64| page.height - y;

    for element in &page.elements {
        match element {
            LayoutElement::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                let (left, right) = (*x, x + width);
                let (top, bottom) = (flip(*y), flip(y + height));
                layer.set_fill_color(pdf_color(*color));
                layer.add_polygon(Polygon {
                    rings: vec![vec![
                        (Point::new(mm(left), mm(bottom)), false),
                        (Point::new(mm(right), mm(bottom)), false),
                        (Point::new(mm(right), mm(top)), false),
                        (Point::new(mm(left), mm(top)), false),
                    ]],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                });
            }
            LayoutElement::Line {
                x1,
                y1,
                x2,
                y2,
                thickness,
                color,
            } => {
                layer.set_outline_color(pdf_color(*color));
                layer.set_outline_thickness(*thickness as f32);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(mm(*x1), mm(flip(*y1))), false),
                        (Point::new(mm(*x2), mm(flip(*y2))), false),
                    ],
                    is_closed: false,
                });
            }
            LayoutElement::Text {
                x,
                y,
                text,
                font_size,
                bold,
                color,
            } => {
                let font = if *bold { &fonts.bold } else { &fonts.regular };
                layer.set_fill_color(pdf_color(*color));
                layer.use_text(text.as_str(), *font_size as f32, mm(*x), mm(flip(*y)), font);
            }
            LayoutElement::Image {
                x,
                y,
                width,
                height,
                resource,
            } => {
                let image = resources.image(resource).ok_or_else(|| {
                    InvoiceError::Render(format!("image resource '{}' is not registered", resource))
                })?;
                if image.width_px == 0 || image.height_px == 0 {
                    continue;
                }
                let xobject = Image::from(ImageXObject {
                    width: Px(image.width_px as usize),
                    height: Px(image.height_px as usize),
                    color_space: ColorSpace::Rgb,
                    bits_per_component: ColorBits::Bit8,
                    interpolate: true,
                    image_data: image.rgb.clone(),
                    image_filter: None,
                    clipping_bbox: None,
                    smask: None,
                });
                // At 72 dpi one pixel is one point; scale from there.
                xobject.add_to_layer(
                    layer.clone(),
                    ImageTransform {
                        translate_x: Some(mm(*x)),
                        translate_y: Some(mm(flip(y + height))),
                        scale_x: Some((width / image.width_px as f64) as f32),
                        scale_y: Some((height / image.height_px as f64) as f32),
                        dpi: Some(72.0),
                        ..Default::default()
                    },
                );
            }
        }
    }
    Ok(())
}
