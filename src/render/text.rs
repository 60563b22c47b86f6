//! # Line Breaking
//!
//! Greedy line breaking at UAX#14 opportunities. Segments between break
//! opportunities are appended until the next one would overflow; a single
//! segment wider than the line is split between characters.

use super::metrics::{measure, Face};
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    /// Line text with trailing whitespace removed.
    pub text: String,
    /// Width of `text` in points.
    pub width: f64,
}

impl BrokenLine {
    fn new(text: &str, face: Face, font_size: f64) -> Self {
        let text = text.trim_end();
        Self {
            text: text.to_string(),
            width: measure(text, face, font_size),
        }
    }
}

/// Break `text` into lines no wider than `max_width` where possible.
///
/// Always returns at least one line; empty input yields one empty line.
pub fn break_into_lines(text: &str, max_width: f64, font_size: f64, face: Face) -> Vec<BrokenLine> {
    if text.is_empty() {
        return vec![BrokenLine::new("", face, font_size)];
    }

    let width_of = |s: &str| measure(s.trim_end(), face, font_size);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut start = 0;

    for (offset, opportunity) in linebreaks(text) {
        let segment = &text[start..offset];
        start = offset;
        let mandatory = matches!(opportunity, BreakOpportunity::Mandatory);
        let segment = if mandatory {
            segment.trim_end_matches(['\n', '\r', '\u{2028}', '\u{2029}'])
        } else {
            segment
        };

        if !current.is_empty() && width_of(&format!("{}{}", current, segment)) > max_width {
            lines.push(BrokenLine::new(&current, face, font_size));
            current.clear();
        }

        if width_of(segment) > max_width {
            // No break opportunity inside: split between characters
            for ch in segment.chars() {
                current.push(ch);
                if current.chars().count() > 1 && width_of(&current) > max_width {
                    current.pop();
                    lines.push(BrokenLine::new(&current, face, font_size));
                    current.clear();
                    current.push(ch);
                }
            }
        } else {
            current.push_str(segment);
        }

        if mandatory {
            lines.push(BrokenLine::new(&current, face, font_size));
            current.clear();
        }
    }

    if !current.is_empty() {
        lines.push(BrokenLine::new(&current, face, font_size));
    }
    if lines.is_empty() {
        lines.push(BrokenLine::new("", face, font_size));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[BrokenLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn single_line_fits() {
        let lines = break_into_lines("Description 1", 200.0, 10.0, Face::Regular);
        assert_eq!(texts(&lines), vec!["Description 1"]);
        assert!((lines[0].width - measure("Description 1", Face::Regular, 10.0)).abs() < 1e-9);
    }

    #[test]
    fn breaks_at_spaces() {
        let text = "alpha beta gamma delta";
        let max = measure("alpha beta", Face::Regular, 10.0) + 1.0;
        let lines = break_into_lines(text, max, 10.0, Face::Regular);
        assert_eq!(texts(&lines), vec!["alpha beta", "gamma delta"]);
        assert!(lines.iter().all(|l| l.width <= max));
    }

    #[test]
    fn explicit_newlines_are_mandatory() {
        let lines = break_into_lines("Bill to:\nContoso", 500.0, 10.0, Face::Regular);
        assert_eq!(texts(&lines), vec!["Bill to:", "Contoso"]);
    }

    #[test]
    fn empty_string_is_one_empty_line() {
        let lines = break_into_lines("", 100.0, 10.0, Face::Regular);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width, 0.0);
    }

    #[test]
    fn long_word_is_force_split() {
        let word = "Supercalifragilisticexpialidocious";
        let max = 40.0;
        let lines = break_into_lines(word, max, 10.0, Face::Regular);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.width <= max));
        let rejoined: String = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(rejoined, word);
    }

    #[test]
    fn bold_wraps_earlier() {
        let text = "Total amount due on receipt";
        let max = measure(text, Face::Regular, 10.0) + 0.5;
        assert_eq!(break_into_lines(text, max, 10.0, Face::Regular).len(), 1);
        assert!(break_into_lines(text, max, 10.0, Face::Bold).len() > 1);
    }
}
