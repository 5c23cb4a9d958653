//! Glyph advance widths for the two built-in PDF fonts the typesetter uses.
//!
//! Values are the Adobe standard AFM widths (units per 1000 em) for
//! printable ASCII. Anything outside that range measures as a digit.

/// Width used for characters outside printable ASCII.
const FALLBACK_WIDTH: u16 = 556;

/// Helvetica, codes 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold, codes 32..=126.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Font faces available to the typesetter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
}

impl FontFace {
    fn advance(&self, c: char) -> u16 {
        let table = match self {
            FontFace::Helvetica => &HELVETICA,
            FontFace::HelveticaBold => &HELVETICA_BOLD,
        };
        let code = c as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            FALLBACK_WIDTH
        }
    }

    /// Rendered width of `text` at `size` points.
    pub fn width_of_text_at_size(&self, text: &str, size: f32) -> f32 {
        let units: f32 = text.chars().map(|c| f32::from(self.advance(c))).sum();
        units * size / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_cover_printable_ascii() {
        assert_eq!(HELVETICA.len(), ('~' as usize) - (' ' as usize) + 1);
        assert_eq!(HELVETICA_BOLD.len(), HELVETICA.len());
    }

    #[test]
    fn known_glyph_widths() {
        assert_eq!(FontFace::Helvetica.advance(' '), 278);
        assert_eq!(FontFace::Helvetica.advance('A'), 667);
        assert_eq!(FontFace::Helvetica.advance('i'), 222);
        assert_eq!(FontFace::Helvetica.advance('W'), 944);
        assert_eq!(FontFace::HelveticaBold.advance('a'), 556);
        assert_eq!(FontFace::HelveticaBold.advance('m'), 889);
        assert_eq!(FontFace::HelveticaBold.advance('~'), 584);
    }

    #[test]
    fn width_scales_with_size() {
        let w10 = FontFace::Helvetica.width_of_text_at_size("Inspection", 10.0);
        let w20 = FontFace::Helvetica.width_of_text_at_size("Inspection", 20.0);
        assert!((w20 - 2.0 * w10).abs() < 1e-3);
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let text = "Certificate of Compliance";
        assert!(
            FontFace::HelveticaBold.width_of_text_at_size(text, 12.0)
                > FontFace::Helvetica.width_of_text_at_size(text, 12.0)
        );
    }

    #[test]
    fn non_ascii_uses_fallback() {
        assert_eq!(FontFace::Helvetica.width_of_text_at_size("é", 1000.0), 556.0);
        assert_eq!(FontFace::Helvetica.width_of_text_at_size("", 12.0), 0.0);
    }

    #[test]
    fn very_long_text_measures_without_overflow() {
        let text = "W".repeat(4_600_000);
        let width = FontFace::Helvetica.width_of_text_at_size(&text, 10.0);
        assert!(width > 4.0e7);
    }
}
