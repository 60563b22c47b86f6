//! Integration tests for the invoice pipeline.
//!
//! These tests exercise the full path from invoice data to PDF output.
//! They verify:
//! - Invoice JSON loading and validation
//! - The composed document and its products grid
//! - Layout of the sample invoice and of grids that span pages
//! - PDF output is structurally valid, on disk and in memory

use invoicer::grid::{cell_texts, rows};
use invoicer::model::sample::{sample_invoice, sample_invoice_json};
use invoicer::render::{LayoutEngine, LayoutPage};
use invoicer::resources::ResourceRegistry;
use invoicer::*;
use rust_decimal::Decimal;

// ─── Helpers ────────────────────────────────────────────────────

fn make_items(count: u32) -> Vec<ProductEntry> {
    (1..=count)
        .map(|i| {
            ProductEntry::new(
                i,
                format!("Item {}", i),
                i % 7 + 1,
                Decimal::new(1999, 2),
                Decimal::ZERO,
            )
        })
        .collect()
}

fn make_invoice(count: u32) -> Invoice {
    Invoice::new(
        CompanyInfo::new("Seller Co.\n1 Main St"),
        CompanyInfo::new("Buyer Ltd.\n2 High St"),
        make_items(count),
    )
    .unwrap()
}

fn layout_invoice(invoice: &Invoice) -> Vec<LayoutPage> {
    let styles = StyleSheet::invoice_default();
    let composer = DocumentComposer::new(RenderConfig::default(), styles.clone()).unwrap();
    let document = composer.compose(invoice);
    let resources = ResourceRegistry::new();
    LayoutEngine::new(&styles, &resources)
        .layout(&document)
        .unwrap()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-"), "Missing PDF header");
    assert!(
        bytes.windows(5).any(|w| w == b"%%EOF"),
        "Missing %%EOF marker"
    );
}

// ─── Model Tests ────────────────────────────────────────────────

#[test]
fn test_invoice_from_json() {
    let json = r#"{
        "seller": "Seller Co.\n1 Main St",
        "buyer": "Buyer Ltd.",
        "lineItems": [
            {"position": 1, "description": "Paper", "quantity": 10, "unitPrice": "4.25"},
            {"position": 2, "description": "Ink", "quantity": 2, "unitPrice": 19.5, "discountPercent": 5}
        ]
    }"#;
    let invoice = Invoice::from_json(json).unwrap();
    assert_eq!(invoice.line_items().len(), 2);
    assert_eq!(invoice.grand_total(), Decimal::new(8150, 2));
    assert_eq!(invoice.line_items()[0].discount_percent, Decimal::ZERO);
}

#[test]
fn test_invoice_json_rejects_bad_positions() {
    let json = r#"{
        "seller": "S", "buyer": "B",
        "lineItems": [
            {"position": 3, "description": "a", "quantity": 1, "unitPrice": 1},
            {"position": 2, "description": "b", "quantity": 1, "unitPrice": 1}
        ]
    }"#;
    let err = Invoice::from_json(json).unwrap_err();
    assert!(err.to_string().contains("increas"), "got: {}", err);
}

#[test]
fn test_example_json_round_trips() {
    let json = sample_invoice_json().unwrap();
    assert_eq!(Invoice::from_json(&json).unwrap(), sample_invoice());
}

// ─── Composition Tests ──────────────────────────────────────────

#[test]
fn test_sample_grid_end_to_end() {
    let composer =
        DocumentComposer::new(RenderConfig::default(), StyleSheet::invoice_default()).unwrap();
    let document = composer.compose(&sample_invoice());
    let grid = &document.children[3];
    let rows = rows(grid);

    assert_eq!(rows.len(), 4, "header, two items, total");
    assert_eq!(cell_texts(rows[1])[5], "600");
    assert_eq!(cell_texts(rows[2])[5], "1200");
    assert_eq!(cell_texts(rows[3]), vec!["Total(USD)", "1800"]);
}

// ─── Layout Tests ───────────────────────────────────────────────

#[test]
fn test_sample_fits_on_one_page() {
    let pages = layout_invoice(&sample_invoice());
    assert_eq!(pages.len(), 1);
    let texts = pages[0].texts();
    for expected in ["INVOICE", "Bill to:", "Product", "Description 1", "1800"] {
        assert!(texts.contains(&expected), "missing {:?} in {:?}", expected, texts);
    }
}

#[test]
fn test_long_invoice_spans_pages_with_repeated_header() {
    let pages = layout_invoice(&make_invoice(80));
    assert!(pages.len() > 1, "80 items should not fit on one page");

    for (i, page) in pages.iter().enumerate() {
        let headers = page.texts().iter().filter(|t| **t == "Disc.(%)").count();
        assert_eq!(headers, 1, "page {} should carry exactly one header row", i + 1);
    }

    let last = pages.last().unwrap().texts();
    assert!(last.contains(&"Total(USD)"));
    let first = pages[0].texts();
    assert!(first.contains(&"Seller Co."));
    assert!(!pages[1].texts().contains(&"Seller Co."));
}

#[test]
fn test_every_item_is_laid_out_once() {
    let pages = layout_invoice(&make_invoice(80));
    let count: usize = pages
        .iter()
        .map(|p| p.texts().iter().filter(|t| t.starts_with("Item ")).count())
        .sum();
    assert_eq!(count, 80);
}

// ─── PDF Output Tests ───────────────────────────────────────────

#[test]
fn test_render_sample_produces_valid_pdf() {
    let bytes = invoicer::render(&sample_invoice(), RenderConfig::default()).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn test_render_multi_page_pdf() {
    let bytes = invoicer::render(&make_invoice(120), RenderConfig::default()).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn test_render_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invoice.pdf");
    render_to_file(&sample_invoice(), RenderConfig::default(), &path).unwrap();
    assert_valid_pdf(&std::fs::read(&path).unwrap());
}

#[test]
fn test_render_with_logo() {
    use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};

    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    let mut png = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(30, 10, Rgba([20, 40, 200, 255])))
        .write_to(&mut png, ImageOutputFormat::Png)
        .unwrap();
    std::fs::write(&logo, png.into_inner()).unwrap();

    let config = RenderConfig::default().with_logo(&logo);
    let bytes = invoicer::render(&sample_invoice(), config).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn test_missing_logo_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invoice.pdf");
    let config = RenderConfig::default().with_logo(dir.path().join("nope.png"));
    let err = render_to_file(&sample_invoice(), config, &path).unwrap_err();
    assert!(matches!(err, InvoiceError::Resource { .. }));
    assert!(!path.exists());
}

#[test]
fn test_custom_stylesheet_from_json() {
    let styles = StyleSheet::from_json(
        r#"{"rules": [
            {"selector": "grid", "style": {"borderWidth": {"top": 2, "right": 2, "bottom": 2, "left": 2}}},
            {"selector": "row.total > cell", "style": {"fontWeight": 700, "textAlign": "Center"}}
        ]}"#,
    )
    .unwrap();
    let composer = DocumentComposer::new(RenderConfig::default(), styles).unwrap();
    let mut bytes = Vec::new();
    composer.render_to(&sample_invoice(), &mut bytes).unwrap();
    assert_valid_pdf(&bytes);
}
