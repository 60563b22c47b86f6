//! Advance widths for the builtin Helvetica faces.
//!
//! The invoice is set in the standard PDF fonts, which are never embedded,
//! so layout measures with the published AFM widths (1/1000 em) for the
//! printable ASCII range. Anything outside it measures as a digit.

/// The two faces the backend draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
}

impl Face {
    pub fn from_weight(weight: u32) -> Self {
        if weight >= 600 {
            Face::Bold
        } else {
            Face::Regular
        }
    }
}

const FIRST_CHAR: u32 = 32;
const FALLBACK_WIDTH: u16 = 556;

/// Helvetica fraction of the em above the baseline.
pub const ASCENT: f64 = 0.718;
/// Helvetica fraction of the em below the baseline.
pub const DESCENT: f64 = 0.207;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Advance width of `ch` in points.
pub fn char_width(ch: char, face: Face, font_size: f64) -> f64 {
    let table = match face {
        Face::Regular => &HELVETICA,
        Face::Bold => &HELVETICA_BOLD,
    };
    let units = (ch as u32)
        .checked_sub(FIRST_CHAR)
        .and_then(|i| table.get(i as usize))
        .copied()
        .unwrap_or(FALLBACK_WIDTH);
    units as f64 / 1000.0 * font_size
}

/// Width of a whole string in points.
pub fn measure(text: &str, face: Face, font_size: f64) -> f64 {
    text.chars().map(|ch| char_width(ch, face, font_size)).sum()
}

/// Distance from the top of a line box to the baseline, with the leading
/// split evenly above and below the glyphs.
pub fn baseline_offset(font_size: f64, line_box: f64) -> f64 {
    let glyph_height = (ASCENT + DESCENT) * font_size;
    (line_box - glyph_height) / 2.0 + ASCENT * font_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_width() {
        assert!((char_width(' ', Face::Regular, 12.0) - 3.336).abs() < 1e-9);
    }

    #[test]
    fn bold_is_wider() {
        assert!(char_width('b', Face::Bold, 10.0) > char_width('b', Face::Regular, 10.0));
        assert!(measure("Total(USD)", Face::Bold, 10.0) > measure("Total(USD)", Face::Regular, 10.0));
    }

    #[test]
    fn digits_share_one_width() {
        let widths: Vec<f64> = "0123456789"
            .chars()
            .map(|c| char_width(c, Face::Regular, 10.0))
            .collect();
        assert!(widths.iter().all(|w| (*w - 5.56).abs() < 1e-9));
    }

    #[test]
    fn non_ascii_falls_back() {
        assert!((char_width('€', Face::Regular, 10.0) - 5.56).abs() < 1e-9);
        assert!((char_width('\u{7f}', Face::Regular, 10.0) - 5.56).abs() < 1e-9);
    }

    #[test]
    fn weight_selects_face() {
        assert_eq!(Face::from_weight(400), Face::Regular);
        assert_eq!(Face::from_weight(700), Face::Bold);
    }

    #[test]
    fn baseline_sits_inside_line_box() {
        let offset = baseline_offset(10.0, 13.0);
        assert!(offset > 7.18 && offset < 13.0);
    }
}
