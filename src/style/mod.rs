//! # Style System
//!
//! A CSS-like style model for document nodes, reduced to what the invoice
//! layout needs: box model, typography, color, borders.
//!
//! Styles arrive from two places: rules in a [`StyleSheet`] matched against
//! the node's ancestor path, and the node's own inline `style`. Both are the
//! same [`Style`] type with every property optional; [`Style::merge`]
//! layers them and [`Style::resolve`] turns the result into concrete values,
//! inheriting typography from the parent.

pub mod selector;
pub mod sheet;

pub use selector::Selector;
pub use sheet::{StyleResolver, StyleRule, StyleSheet};

use serde::{Deserialize, Serialize};

/// The complete set of style properties for a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    // ── Box Model ──────────────────────────────────────────────
    /// Explicit width, used by children of a `Columns` node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    /// Padding inside the border.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Edges>,
    /// Margin outside the border.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Edges>,

    // ── Typography ─────────────────────────────────────────────
    /// Font size in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Font weight (100-900). 600 and above renders bold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u32>,
    /// Line height as a multiplier of font size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    /// Text alignment within the content box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,

    // ── Color & Background ─────────────────────────────────────
    /// Text color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Background fill of the border box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,

    // ── Border ─────────────────────────────────────────────────
    /// Border width per side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<Edges>,
    /// Border color shared by all sides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Color>,
}

/// A length that is either absolute or relative to the parent width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Dimension {
    /// Fixed size in points (1/72 inch).
    Pt(f64),
    /// Percentage of the parent's content width.
    Percent(f64),
}

impl Dimension {
    pub fn resolve(&self, parent_size: f64) -> f64 {
        match self {
            Dimension::Pt(v) => *v,
            Dimension::Percent(p) => parent_size * p / 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
}

/// Edge values (top, right, bottom, left) used for margin, padding and
/// border widths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// An RGB color, channels in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb`. Anything else yields black.
    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        if !hex.is_ascii() {
            return Color::BLACK;
        }
        let (r, g, b) = match hex.len() {
            3 => (
                channel(&hex[0..1].repeat(2)),
                channel(&hex[1..2].repeat(2)),
                channel(&hex[2..3].repeat(2)),
            ),
            6 => (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])),
            _ => (0, 0, 0),
        };
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Resolved style: every value concrete. This is what layout works with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub width: Option<Dimension>,
    pub padding: Edges,
    pub margin: Edges,

    pub font_size: f64,
    pub font_weight: u32,
    pub line_height: f64,
    pub text_align: TextAlign,

    pub color: Color,
    pub background_color: Option<Color>,
    pub border_width: Edges,
    pub border_color: Color,
}

impl ResolvedStyle {
    pub fn is_bold(&self) -> bool {
        self.font_weight >= 600
    }

    /// Height of one text line in points.
    pub fn line_box(&self) -> f64 {
        self.font_size * self.line_height
    }

    /// Margin + border + padding on the left and right.
    pub fn horizontal_chrome(&self) -> f64 {
        self.margin.horizontal() + self.border_width.horizontal() + self.padding.horizontal()
    }

    /// Margin + border + padding on the top and bottom.
    pub fn vertical_chrome(&self) -> f64 {
        self.margin.vertical() + self.border_width.vertical() + self.padding.vertical()
    }
}

impl Style {
    /// Overlay every property `other` sets onto `self`.
    pub fn merge(&mut self, other: &Style) {
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field.clone();
                    }
                )*
            };
        }
        overlay!(
            width,
            padding,
            margin,
            font_size,
            font_weight,
            line_height,
            text_align,
            color,
            background_color,
            border_width,
            border_color,
        );
    }

    /// Resolve this style against the parent's resolved style.
    ///
    /// Typography and color inherit; box properties, background and
    /// borders do not.
    pub fn resolve(&self, parent: Option<&ResolvedStyle>) -> ResolvedStyle {
        ResolvedStyle {
            width: self.width,
            padding: self.padding.unwrap_or_default(),
            margin: self.margin.unwrap_or_default(),

            font_size: self
                .font_size
                .unwrap_or(parent.map(|p| p.font_size).unwrap_or(10.0)),
            font_weight: self
                .font_weight
                .unwrap_or(parent.map(|p| p.font_weight).unwrap_or(400)),
            line_height: self
                .line_height
                .unwrap_or(parent.map(|p| p.line_height).unwrap_or(1.3)),
            text_align: self
                .text_align
                .unwrap_or(parent.map(|p| p.text_align).unwrap_or_default()),

            color: self
                .color
                .unwrap_or(parent.map(|p| p.color).unwrap_or(Color::BLACK)),
            background_color: self.background_color,
            border_width: self.border_width.unwrap_or_default(),
            border_color: self.border_color.unwrap_or(Color::BLACK),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        let c = Color::hex("#ff8000");
        assert!((c.r - 1.0).abs() < 1e-9);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-9);
        assert_eq!(c.b, 0.0);
        assert_eq!(Color::hex("#fff"), Color::WHITE);
        assert_eq!(Color::hex("nonsense"), Color::BLACK);
    }

    #[test]
    fn non_ascii_hex_is_black() {
        assert_eq!(Color::hex("#€"), Color::BLACK);
        assert_eq!(Color::hex("ff€0"), Color::BLACK);
    }

    #[test]
    fn merge_only_overwrites_set_fields() {
        let mut base = Style {
            font_size: Some(10.0),
            text_align: Some(TextAlign::Right),
            ..Default::default()
        };
        base.merge(&Style {
            text_align: Some(TextAlign::Center),
            ..Default::default()
        });
        assert_eq!(base.font_size, Some(10.0));
        assert_eq!(base.text_align, Some(TextAlign::Center));
    }

    #[test]
    fn typography_inherits_but_box_does_not() {
        let parent = Style {
            font_size: Some(14.0),
            font_weight: Some(700),
            text_align: Some(TextAlign::Center),
            padding: Some(Edges::uniform(6.0)),
            background_color: Some(Color::hex("#eee")),
            ..Default::default()
        }
        .resolve(None);

        let child = Style::default().resolve(Some(&parent));
        assert_eq!(child.font_size, 14.0);
        assert!(child.is_bold());
        assert_eq!(child.text_align, TextAlign::Center);
        assert_eq!(child.padding, Edges::default());
        assert_eq!(child.background_color, None);
    }

    #[test]
    fn percent_dimension_resolves_against_parent() {
        assert_eq!(Dimension::Percent(50.0).resolve(300.0), 150.0);
        assert_eq!(Dimension::Pt(20.0).resolve(300.0), 20.0);
    }

    #[test]
    fn camel_case_deserialization() {
        let style: Style =
            serde_json::from_str(r#"{"fontSize": 12, "textAlign": "Center", "borderWidth": {"bottom": 1}}"#)
                .unwrap();
        assert_eq!(style.font_size, Some(12.0));
        assert_eq!(style.text_align, Some(TextAlign::Center));
        assert_eq!(style.border_width, Some(Edges::new(0.0, 0.0, 1.0, 0.0)));
    }
}
