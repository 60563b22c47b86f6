//! Selectors for stylesheet rules.
//!
//! Supported grammar, a strict subset of CSS:
//!
//! ```text
//! selector  := compound (combinator compound)*
//! compound  := element? ('.' class)*      at least one part, `*` = any element
//! combinator:= whitespace (descendant) | '>' (child)
//! ```
//!
//! Matching runs right to left over the node's ancestor path, the same way
//! browsers do it.

use crate::document::Node;
use crate::InvoiceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a compound relates to the compound on its left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// One `element.class.class` part of a selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    /// `None` matches any element.
    pub element: Option<String>,
    pub classes: Vec<String>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if let Some(element) = &self.element {
            if element != node.kind.type_name() {
                return false;
            }
        }
        self.classes.iter().all(|c| node.has_class(c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    /// Relation to the part on the left. Ignored for the first part.
    combinator: Combinator,
    compound: Compound,
}

/// A parsed selector such as `row.header > cell.first`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    parts: Vec<Part>,
}

impl Selector {
    /// Start a selector with an element name (`""` or `"*"` for any).
    pub fn new(element: &str) -> Self {
        Self {
            parts: vec![Part {
                combinator: Combinator::Descendant,
                compound: compound_for(element),
            }],
        }
    }

    /// Start a selector with a bare class (`.class`).
    pub fn class(class: &str) -> Self {
        Self::new("").with_class(class)
    }

    /// Add a class requirement to the rightmost compound.
    pub fn with_class(mut self, class: &str) -> Self {
        if let Some(last) = self.parts.last_mut() {
            last.compound.classes.push(class.to_string());
        }
        self
    }

    /// Append `element` as a descendant of what came before.
    pub fn descendant(mut self, element: &str) -> Self {
        self.parts.push(Part {
            combinator: Combinator::Descendant,
            compound: compound_for(element),
        });
        self
    }

    /// Append `element` as a direct child of what came before.
    pub fn child(mut self, element: &str) -> Self {
        self.parts.push(Part {
            combinator: Combinator::Child,
            compound: compound_for(element),
        });
        self
    }

    /// `(class count, element count)`; compared lexicographically.
    pub fn specificity(&self) -> (usize, usize) {
        self.parts.iter().fold((0, 0), |(classes, elements), part| {
            (
                classes + part.compound.classes.len(),
                elements + usize::from(part.compound.element.is_some()),
            )
        })
    }

    /// Does the last node of `path` match, given its ancestors before it?
    pub fn matches(&self, path: &[&Node]) -> bool {
        let Some((node, ancestors)) = path.split_last() else {
            return false;
        };
        let Some((last, rest)) = self.parts.split_last() else {
            return false;
        };
        last.compound.matches(node) && match_ancestors(rest, last.combinator, ancestors)
    }
}

fn compound_for(element: &str) -> Compound {
    Compound {
        element: match element {
            "" | "*" => None,
            name => Some(name.to_string()),
        },
        classes: Vec::new(),
    }
}

/// Match `parts` (right to left) against `ancestors`, where the rightmost
/// remaining part must stand in `relation` to the node already matched.
fn match_ancestors(parts: &[Part], relation: Combinator, ancestors: &[&Node]) -> bool {
    let Some((part, rest)) = parts.split_last() else {
        return true;
    };
    match relation {
        Combinator::Child => match ancestors.split_last() {
            Some((parent, above)) => {
                part.compound.matches(parent) && match_ancestors(rest, part.combinator, above)
            }
            None => false,
        },
        Combinator::Descendant => (0..ancestors.len()).rev().any(|i| {
            part.compound.matches(ancestors[i])
                && match_ancestors(rest, part.combinator, &ancestors[..i])
        }),
    }
}

impl FromStr for Selector {
    type Err = InvoiceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let error = |message: &str| InvoiceError::Selector {
            selector: input.to_string(),
            message: message.to_string(),
        };

        let spaced = input.replace('>', " > ");
        let mut parts = Vec::new();
        let mut pending = Combinator::Descendant;
        let mut expecting_compound = false;

        for token in spaced.split_whitespace() {
            if token == ">" {
                if parts.is_empty() || expecting_compound {
                    return Err(error("'>' must sit between two compounds"));
                }
                pending = Combinator::Child;
                expecting_compound = true;
                continue;
            }
            parts.push(Part {
                combinator: pending,
                compound: parse_compound(token).map_err(|m| error(&m))?,
            });
            pending = Combinator::Descendant;
            expecting_compound = false;
        }

        if parts.is_empty() {
            return Err(error("selector is empty"));
        }
        if expecting_compound {
            return Err(error("selector ends with '>'"));
        }
        Ok(Selector { parts })
    }
}

fn parse_compound(token: &str) -> Result<Compound, String> {
    let mut pieces = token.split('.');
    let element = pieces.next().unwrap_or_default();
    if !(element.is_empty() || element == "*" || is_identifier(element)) {
        return Err(format!("invalid element name '{}'", element));
    }
    let mut compound = compound_for(element);
    for class in pieces {
        if !is_identifier(class) {
            return Err(format!("invalid class name '{}' in '{}'", class, token));
        }
        compound.classes.push(class.to_string());
    }
    if compound.element.is_none() && compound.classes.is_empty() && element != "*" {
        return Err(format!("empty compound '{}'", token));
    }
    Ok(compound)
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl TryFrom<String> for Selector {
    type Error = InvoiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                match part.combinator {
                    Combinator::Descendant => write!(f, " ")?,
                    Combinator::Child => write!(f, " > ")?,
                }
            }
            match &part.compound.element {
                Some(element) => write!(f, "{}", element)?,
                None if part.compound.classes.is_empty() => write!(f, "*")?,
                None => {}
            }
            for class in &part.compound.classes {
                write!(f, ".{}", class)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_grid() -> Node {
        Node::grid(
            vec![],
            vec![Node::row(
                true,
                vec![Node::cell("#", 1).with_class("header first")],
            )
            .with_class("header")],
        )
    }

    #[test]
    fn parses_and_displays() {
        let s: Selector = "row.header   >cell.first".parse().unwrap();
        assert_eq!(s.to_string(), "row.header > cell.first");
        let s: Selector = ".info text".parse().unwrap();
        assert_eq!(s.to_string(), ".info text");
    }

    #[test]
    fn builder_matches_parsed() {
        let built = Selector::new("row").with_class("header").child("cell").with_class("first");
        let parsed: Selector = "row.header > cell.first".parse().unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn rejects_malformed_selectors() {
        for bad in ["", "   ", "> cell", "row >", "row > > cell", "row..x", "ro$w", "."] {
            assert!(bad.parse::<Selector>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn specificity_counts_classes_then_elements() {
        let s: Selector = "row.header > cell.first".parse().unwrap();
        assert_eq!(s.specificity(), (2, 2));
        let s: Selector = "cell".parse().unwrap();
        assert_eq!(s.specificity(), (0, 1));
        let s: Selector = "*".parse().unwrap();
        assert_eq!(s.specificity(), (0, 0));
    }

    #[test]
    fn descendant_and_child_matching() {
        let grid = header_grid();
        let row = &grid.children[0];
        let cell = &row.children[0];
        let text = &cell.children[0];

        let cell_path = [&grid, row, cell];
        let text_path = [&grid, row, cell, text];

        let child: Selector = "row.header > cell.first".parse().unwrap();
        assert!(child.matches(&cell_path));
        assert!(!child.matches(&text_path));

        let descendant: Selector = "grid text".parse().unwrap();
        assert!(descendant.matches(&text_path));

        let direct: Selector = "grid > text".parse().unwrap();
        assert!(!direct.matches(&text_path));

        let wrong_class: Selector = "row.total cell".parse().unwrap();
        assert!(!wrong_class.matches(&cell_path));
    }

    #[test]
    fn descendant_backtracks_over_ancestors() {
        // `section.a text` must find the outer section even though the
        // nearer section lacks the class.
        let tree = Node::section(vec![Node::section(vec![Node::text("x")])]).with_class("a");
        let inner = &tree.children[0];
        let text = &inner.children[0];
        let s: Selector = "section.a section text".parse().unwrap();
        assert!(s.matches(&[&tree, inner, text]));
        let s: Selector = "section.a > section.a text".parse().unwrap();
        assert!(!s.matches(&[&tree, inner, text]));
    }

    #[test]
    fn serde_uses_string_form() {
        let s: Selector = serde_json::from_str("\"grid > row.total cell\"").unwrap();
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"grid > row.total cell\"");
        assert!(serde_json::from_str::<Selector>("\"row >\"").is_err());
    }
}
