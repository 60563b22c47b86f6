//! Stylesheets and style resolution.
//!
//! A [`StyleSheet`] is configuration data: an ordered list of selector →
//! style rules. Layout never looks at rules directly; it asks a
//! [`StyleResolver`] for the cascaded style of a node path.

use super::{Color, Edges, Selector, Style, TextAlign};
use crate::document::Node;
use crate::InvoiceError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resolves the cascaded (not yet inherited) style for a node.
///
/// `path` runs from the root to the node being styled. Inheritance from
/// the parent happens later, in [`Style::resolve`].
pub trait StyleResolver {
    fn resolve_style(&self, path: &[&Node]) -> Style;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    pub selector: Selector,
    pub style: Style,
}

/// An ordered rule table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    #[serde(default)]
    rules: Vec<StyleRule>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Later rules win over earlier ones of equal specificity.
    pub fn push(&mut self, selector: Selector, style: Style) {
        self.rules.push(StyleRule { selector, style });
    }

    /// Builder form of [`push`](Self::push) taking selector text.
    pub fn rule(mut self, selector: &str, style: Style) -> Result<Self, InvoiceError> {
        self.push(selector.parse()?, style);
        Ok(self)
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// Parse a stylesheet from JSON: `{"rules": [{"selector": "...", "style": {...}}]}`.
    pub fn from_json(json: &str) -> Result<Self, InvoiceError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, InvoiceError> {
        let json = std::fs::read_to_string(path).map_err(|e| InvoiceError::io(path, e))?;
        Self::from_json(&json)
    }

    /// The stock invoice theme: bordered grid with a tinted header row,
    /// right-aligned numbers, and `center`/`left` alignment classes.
    pub fn invoice_default() -> Self {
        let border = Color::hex("#7f8fa6");
        let accent = Color::hex("#2b3a55");
        let mut sheet = StyleSheet::new();

        sheet.push(
            Selector::new("section").with_class("banner"),
            Style {
                margin: Some(Edges::new(0.0, 0.0, 12.0, 0.0)),
                ..Default::default()
            },
        );
        sheet.push(
            Selector::new("section")
                .with_class("banner")
                .descendant("text")
                .with_class("title"),
            Style {
                font_size: Some(22.0),
                font_weight: Some(700),
                color: Some(accent),
                ..Default::default()
            },
        );
        sheet.push(
            Selector::new("columns").with_class("info"),
            Style {
                font_size: Some(10.0),
                line_height: Some(1.4),
                ..Default::default()
            },
        );
        sheet.push(
            Selector::new("section").with_class("info-block"),
            Style {
                padding: Some(Edges::new(0.0, 12.0, 0.0, 0.0)),
                ..Default::default()
            },
        );
        sheet.push(
            Selector::new("hr"),
            Style {
                margin: Some(Edges::symmetric(10.0, 0.0)),
                border_width: Some(Edges::new(1.0, 0.0, 0.0, 0.0)),
                border_color: Some(border),
                ..Default::default()
            },
        );
        sheet.push(
            Selector::new("grid"),
            Style {
                border_width: Some(Edges::uniform(1.0)),
                border_color: Some(border),
                ..Default::default()
            },
        );
        sheet.push(
            Selector::new("cell"),
            Style {
                padding: Some(Edges::symmetric(4.0, 3.0)),
                font_size: Some(10.0),
                text_align: Some(TextAlign::Right),
                ..Default::default()
            },
        );
        sheet.push(
            Selector::new("cell").with_class("center"),
            Style {
                text_align: Some(TextAlign::Center),
                ..Default::default()
            },
        );
        sheet.push(
            Selector::new("cell").with_class("left"),
            Style {
                text_align: Some(TextAlign::Left),
                ..Default::default()
            },
        );
        sheet.push(
            Selector::new("row").with_class("header").descendant("cell"),
            Style {
                background_color: Some(Color::hex("#e6ebf2")),
                border_width: Some(Edges::new(0.0, 0.0, 1.0, 1.0)),
                border_color: Some(border),
                font_weight: Some(700),
                ..Default::default()
            },
        );
        sheet.push(
            Selector::new("row")
                .with_class("header")
                .child("cell")
                .with_class("first"),
            Style {
                border_width: Some(Edges::new(0.0, 0.0, 1.0, 0.0)),
                ..Default::default()
            },
        );
        sheet.push(
            Selector::new("row").with_class("total").child("cell"),
            Style {
                border_width: Some(Edges::new(1.0, 0.0, 0.0, 0.0)),
                border_color: Some(border),
                font_weight: Some(700),
                ..Default::default()
            },
        );

        sheet
    }
}

impl StyleResolver for StyleSheet {
    /// Apply every matching rule in ascending specificity, ties broken by
    /// source order, then the node's inline style.
    fn resolve_style(&self, path: &[&Node]) -> Style {
        let Some(node) = path.last() else {
            return Style::default();
        };

        let mut matched: Vec<(usize, &StyleRule)> = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.selector.matches(path))
            .collect();
        matched.sort_by_key(|(order, rule)| (rule.selector.specificity(), *order));

        let mut style = Style::default();
        for (_, rule) in matched {
            style.merge(&rule.style);
        }
        style.merge(&node.style);
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_row() -> Node {
        Node::row(
            true,
            vec![
                Node::cell("#", 1).with_class("header first"),
                Node::cell("Product", 1).with_class("header"),
            ],
        )
        .with_class("header")
    }

    #[test]
    fn more_specific_rule_wins_regardless_of_order() {
        let sheet = StyleSheet::new()
            .rule("row.header > cell.first", Style {
                font_size: Some(8.0),
                ..Default::default()
            })
            .unwrap()
            .rule("row.header cell", Style {
                font_size: Some(12.0),
                ..Default::default()
            })
            .unwrap();
        let row = header_row();
        let first = sheet.resolve_style(&[&row, &row.children[0]]);
        let second = sheet.resolve_style(&[&row, &row.children[1]]);
        assert_eq!(first.font_size, Some(8.0));
        assert_eq!(second.font_size, Some(12.0));
    }

    #[test]
    fn later_rule_wins_on_equal_specificity() {
        let sheet = StyleSheet::new()
            .rule("cell", Style {
                font_size: Some(8.0),
                ..Default::default()
            })
            .unwrap()
            .rule("cell", Style {
                font_size: Some(9.0),
                ..Default::default()
            })
            .unwrap();
        let cell = Node::cell("x", 1);
        assert_eq!(sheet.resolve_style(&[&cell]).font_size, Some(9.0));
    }

    #[test]
    fn inline_style_beats_rules() {
        let sheet = StyleSheet::invoice_default();
        let cell = Node::cell("x", 1).with_class("center").with_style(Style {
            text_align: Some(TextAlign::Left),
            ..Default::default()
        });
        let row = Node::row(false, vec![cell]);
        let resolved = sheet.resolve_style(&[&row, &row.children[0]]);
        assert_eq!(resolved.text_align, Some(TextAlign::Left));
    }

    #[test]
    fn default_theme_header_first_cell_has_no_left_border() {
        let sheet = StyleSheet::invoice_default();
        let row = header_row();
        let first = sheet.resolve_style(&[&row, &row.children[0]]);
        let other = sheet.resolve_style(&[&row, &row.children[1]]);
        assert_eq!(first.border_width.map(|b| b.left), Some(0.0));
        assert_eq!(other.border_width.map(|b| b.left), Some(1.0));
        assert!(first.background_color.is_some());
        assert_eq!(first.text_align, Some(TextAlign::Right));
    }

    #[test]
    fn default_theme_alignment_classes() {
        let sheet = StyleSheet::invoice_default();
        let row = Node::row(
            false,
            vec![
                Node::cell("1", 1).with_class("center first"),
                Node::cell("Thing", 1).with_class("left"),
                Node::cell("12.5", 1),
            ],
        );
        let align = |i: usize| sheet.resolve_style(&[&row, &row.children[i]]).text_align;
        assert_eq!(align(0), Some(TextAlign::Center));
        assert_eq!(align(1), Some(TextAlign::Left));
        assert_eq!(align(2), Some(TextAlign::Right));
    }

    #[test]
    fn loads_from_json() {
        let sheet = StyleSheet::from_json(
            r#"{"rules": [
                {"selector": "cell.left", "style": {"textAlign": "Left"}},
                {"selector": "row.total > cell", "style": {"fontWeight": 700}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(sheet.rules().len(), 2);
        assert_eq!(sheet.rules()[1].selector.to_string(), "row.total > cell");
    }

    #[test]
    fn bad_selector_in_json_is_reported() {
        let err = StyleSheet::from_json(r#"{"rules": [{"selector": "> cell", "style": {}}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("> cell"));
    }

    #[test]
    fn empty_path_resolves_to_default() {
        assert_eq!(StyleSheet::invoice_default().resolve_style(&[]), Style::default());
    }
}
