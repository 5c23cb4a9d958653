//! Document Typesetter — turns plain narrative text into a paginated PDF.
//!
//! Two stages:
//! 1. `layout_narrative` — sanitize, segment, classify, word-wrap and paginate
//!    into positioned lines (pure, no PDF involved).
//! 2. `render_layout` — draw the positioned lines with `printpdf`.
//!
//! All geometry is in PDF points on a US-Letter page.

use std::io::BufWriter;

use printpdf::{BuiltinFont, Mm, PdfDocument};
use thiserror::Error;

use super::metrics::FontFace;
use super::sanitize::sanitize_markup;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 50.0;
pub const LINE_HEIGHT: f32 = 14.0;
/// Extra space after a header, on top of the line height.
pub const HEADER_GAP: f32 = 5.0;
pub const HEADER_FONT_SIZE: f32 = 12.0;
pub const BODY_FONT_SIZE: f32 = 10.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const TOP_Y: f32 = PAGE_HEIGHT - MARGIN;

const MM_PER_PT: f32 = 25.4 / 72.0;

/// Lines starting with one of these are headers.
const HEADER_PREFIXES: &[&str] = &["Section ", "SECTION ", "RE:", "Re:", "Subject:"];

/// Lines containing one of these are headers.
const SECTION_TITLES: &[&str] = &[
    "Certificate of",
    "Certification Statement",
    "Project Information",
    "Scope of Work",
    "Inspection Summary",
    "Inspected Products",
    "Field Changes",
    "Code Compliance",
];

#[derive(Error, Debug)]
pub enum TypesetError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Header,
    Body,
}

impl LineStyle {
    pub fn font(&self) -> FontFace {
        match self {
            LineStyle::Header => FontFace::HelveticaBold,
            LineStyle::Body => FontFace::Helvetica,
        }
    }

    pub fn font_size(&self) -> f32 {
        match self {
            LineStyle::Header => HEADER_FONT_SIZE,
            LineStyle::Body => BODY_FONT_SIZE,
        }
    }

    fn gap_after(&self) -> f32 {
        match self {
            LineStyle::Header => HEADER_GAP,
            LineStyle::Body => 0.0,
        }
    }
}

/// One wrapped line at its baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub style: LineStyle,
    pub x: f32,
    pub y: f32,
}

impl PlacedLine {
    pub fn width(&self) -> f32 {
        self.style
            .font()
            .width_of_text_at_size(&self.text, self.style.font_size())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

/// Always holds at least one (possibly empty) page.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }
}

/// A finished PDF.
#[derive(Debug, Clone)]
pub struct TypesetDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Typeset narrative text into PDF bytes.
pub fn typeset_narrative(title: &str, narrative: &str) -> Result<TypesetDocument, TypesetError> {
    let layout = layout_narrative(narrative);
    let page_count = layout.pages.len();
    let bytes = render_layout(title, &layout)?;
    Ok(TypesetDocument { bytes, page_count })
}

/// Non-blank lines of sanitized text, trimmed.
pub fn segment_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Header heuristic: no lowercase letters, a header prefix, or a known
/// section title anywhere in the line.
pub fn classify_line(line: &str) -> LineStyle {
    let is_header = line == line.to_uppercase()
        || HEADER_PREFIXES.iter().any(|p| line.starts_with(p))
        || SECTION_TITLES.iter().any(|t| line.contains(t));
    if is_header {
        LineStyle::Header
    } else {
        LineStyle::Body
    }
}

/// Greedy word wrap against measured width. Words are never split; a word
/// wider than `max_width` sits alone on its own (overflowing) line.
pub fn wrap_line(text: &str, font: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if font.width_of_text_at_size(&candidate, size) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Sanitize, wrap and paginate narrative text.
///
/// The cursor starts at the top margin and drops one line height per line;
/// a line that would sit below the bottom margin starts a new page. Headers
/// add `HEADER_GAP` after their last wrapped line. Paragraphs and headers
/// may split across pages.
pub fn layout_narrative(narrative: &str) -> DocumentLayout {
    let clean = sanitize_markup(narrative);
    let mut pages = Vec::new();
    let mut current = PageLayout::default();
    let mut y = TOP_Y;

    for segment in segment_lines(&clean) {
        let style = classify_line(segment);
        for text in wrap_line(segment, style.font(), style.font_size(), CONTENT_WIDTH) {
            if y < MARGIN {
                pages.push(std::mem::take(&mut current));
                y = TOP_Y;
            }
            current.lines.push(PlacedLine {
                text,
                style,
                x: MARGIN,
                y,
            });
            y -= LINE_HEIGHT;
        }
        y -= style.gap_after();
    }
    pages.push(current);

    DocumentLayout { pages }
}

fn pt(value: f32) -> Mm {
    Mm(value * MM_PER_PT)
}

/// Draw a layout as a PDF, one PDF page per layout page.
pub fn render_layout(title: &str, layout: &DocumentLayout) -> Result<Vec<u8>, TypesetError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, pt(PAGE_WIDTH), pt(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| TypesetError::Font(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| TypesetError::Font(e.to_string()))?;

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) = doc.add_page(pt(PAGE_WIDTH), pt(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page_idx).get_layer(layer_idx)
        };

        for line in &page.lines {
            let font = match line.style {
                LineStyle::Header => &bold,
                LineStyle::Body => &regular,
            };
            layer.use_text(&line.text, line.style.font_size(), pt(line.x), pt(line.y), font);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| TypesetError::Save(e.to_string()))?;
    buf.into_inner()
        .map_err(|e| TypesetError::Save(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES_PER_PAGE: usize = 50;

    fn body_lines(n: usize) -> String {
        (1..=n).map(|i| format!("Observation line {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn usable_width_is_page_minus_margins() {
        assert_eq!(CONTENT_WIDTH, 512.0);
    }

    #[test]
    fn all_caps_line_is_header() {
        assert_eq!(classify_line("CERTIFICATE OF COMPLIANCE"), LineStyle::Header);
        assert_eq!(classify_line("PERMIT NO. 24-0917"), LineStyle::Header);
    }

    #[test]
    fn prefix_and_section_titles_are_headers() {
        assert_eq!(classify_line("Section 3: Findings"), LineStyle::Header);
        assert_eq!(classify_line("RE: 77 Harbor View Dr"), LineStyle::Header);
        assert_eq!(classify_line("1. Scope of Work"), LineStyle::Header);
        assert_eq!(classify_line("Summary of Field Changes"), LineStyle::Header);
    }

    #[test]
    fn ordinary_sentence_is_body() {
        assert_eq!(
            classify_line("The roof covering was installed per manufacturer instructions."),
            LineStyle::Body
        );
    }

    #[test]
    fn segmentation_drops_blank_lines() {
        assert_eq!(segment_lines("a\n\n   \n b \n"), vec!["a", "b"]);
        assert!(segment_lines("").is_empty());
    }

    #[test]
    fn wrap_keeps_lines_within_width() {
        let text = "The underlayment, drip edge, flashing and ventilation were observed \
                    at each stage of the work and found to conform with the approved \
                    construction documents and the manufacturer installation instructions \
                    applicable to the roof covering system listed on the permit.";
        let lines = wrap_line(text, FontFace::Helvetica, BODY_FONT_SIZE, CONTENT_WIDTH);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(FontFace::Helvetica.width_of_text_at_size(line, BODY_FONT_SIZE) <= CONTENT_WIDTH);
        }
    }

    #[test]
    fn wrap_never_splits_words() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi \
                    omicron pi rho sigma tau upsilon phi chi psi omega ".repeat(4);
        let lines = wrap_line(&text, FontFace::Helvetica, BODY_FONT_SIZE, 120.0);
        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn oversized_word_overflows_on_its_own_line() {
        let word = "W".repeat(80);
        let text = format!("before {word} after");
        let lines = wrap_line(&text, FontFace::Helvetica, BODY_FONT_SIZE, CONTENT_WIDTH);
        assert_eq!(lines, vec!["before".to_string(), word.clone(), "after".to_string()]);
        assert!(FontFace::Helvetica.width_of_text_at_size(&word, BODY_FONT_SIZE) > CONTENT_WIDTH);
    }

    #[test]
    fn wrap_survives_a_multi_megabyte_word() {
        let word = "W".repeat(4_600_000);
        let text = format!("a {word}");
        let lines = wrap_line(&text, FontFace::Helvetica, BODY_FONT_SIZE, CONTENT_WIDTH);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "a");
        assert_eq!(lines[1].len(), word.len());
    }

    #[test]
    fn empty_narrative_is_one_blank_page() {
        let layout = layout_narrative("");
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(layout.line_count(), 0);

        let doc = typeset_narrative("Empty", "  \n\n ").unwrap();
        assert_eq!(doc.page_count, 1);
        assert_eq!(&doc.bytes[0..4], b"%PDF");
    }

    #[test]
    fn fifty_body_lines_fit_one_page() {
        let layout = layout_narrative(&body_lines(LINES_PER_PAGE));
        assert_eq!(layout.pages.len(), 1);

        let layout = layout_narrative(&body_lines(LINES_PER_PAGE + 1));
        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.pages[1].lines.len(), 1);
    }

    #[test]
    fn page_count_matches_line_count() {
        for n in [1, 49, 50, 51, 120, 151] {
            let layout = layout_narrative(&body_lines(n));
            assert_eq!(layout.line_count(), n);
            assert_eq!(layout.pages.len(), n.div_ceil(LINES_PER_PAGE), "for {n} lines");
        }
    }

    #[test]
    fn lines_stay_inside_margins() {
        let layout = layout_narrative(&body_lines(140));
        for page in &layout.pages {
            for line in &page.lines {
                assert!(line.y >= MARGIN && line.y <= PAGE_HEIGHT - MARGIN);
                assert_eq!(line.x, MARGIN);
                assert!(line.width() <= CONTENT_WIDTH);
            }
        }
        assert_eq!(layout.pages[1].lines[0].y, PAGE_HEIGHT - MARGIN);
    }

    #[test]
    fn header_adds_gap_and_bold_style() {
        let layout = layout_narrative("INSPECTION SUMMARY\nAll framing inspected.");
        let lines = &layout.pages[0].lines;
        assert_eq!(lines[0].style, LineStyle::Header);
        assert_eq!(lines[1].style, LineStyle::Body);
        assert_eq!(lines[0].y - lines[1].y, LINE_HEIGHT + HEADER_GAP);
    }

    #[test]
    fn markup_stripped_before_layout() {
        let layout = layout_narrative("<p>Owner: Lee &amp; Park</p><p>inspected ok</p>");
        let texts: Vec<&str> = layout.pages[0].lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Owner: Lee & Park", "inspected ok"]);
    }

    #[test]
    fn renders_multi_page_pdf() {
        let doc = typeset_narrative("Certificate", &body_lines(120)).unwrap();
        assert_eq!(doc.page_count, 3);
        assert_eq!(&doc.bytes[0..4], b"%PDF");
    }
}
