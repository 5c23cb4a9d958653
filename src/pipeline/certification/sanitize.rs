//! Markup stripping for narrative text before typesetting.
//!
//! Never fails: anything that does not look like a tag or a known entity is
//! kept as literal text.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Tags that end a line of text when removed.
static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:br\s*/?|/(?:p|div|li|h[1-6]|tr))\s*>").expect("valid regex")
});

/// Any other tag: `<` directly followed by a name, `/` or `!`.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z!][^<>]*>").expect("valid regex"));

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(nbsp|amp|lt|gt|quot|apos|#39);").expect("valid regex"));

/// Strip markup tags and decode the supported named entities.
///
/// Runs to a fixed point so double-encoded input (`&amp;lt;b&amp;gt;`) is
/// fully reduced and `sanitize_markup(sanitize_markup(x)) == sanitize_markup(x)`.
pub fn sanitize_markup(raw: &str) -> String {
    let mut text = raw.replace("\r\n", "\n");
    loop {
        let next = sanitize_pass(&text);
        if next == text {
            return text;
        }
        text = next;
    }
}

/// One strip + decode pass. Output is never longer than input, and strictly
/// shorter whenever anything was replaced, so the fixed-point loop ends.
fn sanitize_pass(text: &str) -> String {
    let broken = BLOCK_TAG_RE.replace_all(text, "\n");
    let stripped = TAG_RE.replace_all(&broken, "");
    ENTITY_RE
        .replace_all(&stripped, |caps: &Captures| decode_entity(&caps[1]))
        .into_owned()
}

fn decode_entity(name: &str) -> &'static str {
    match name {
        "nbsp" => " ",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        _ => "'",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_inline_tags() {
        assert_eq!(
            sanitize_markup("The <b>roof</b> was <em>inspected</em>."),
            "The roof was inspected."
        );
    }

    #[test]
    fn block_tags_become_line_breaks() {
        assert_eq!(
            sanitize_markup("<p>First</p><p>Second</p>Third<br/>Fourth"),
            "First\nSecond\nThird\nFourth"
        );
    }

    #[test]
    fn decodes_named_entities() {
        assert_eq!(
            sanitize_markup("Smith&nbsp;&amp;&nbsp;Sons &quot;A&quot; &#39;B&#39; &apos;C&apos;"),
            "Smith & Sons \"A\" 'B' 'C'"
        );
    }

    #[test]
    fn malformed_markup_kept_as_text() {
        assert_eq!(sanitize_markup("slope < 2:12 and > 1:12"), "slope < 2:12 and > 1:12");
        assert_eq!(sanitize_markup("unclosed <b tag"), "unclosed <b tag");
        assert_eq!(sanitize_markup("&copy; 2026 &bogus;"), "&copy; 2026 &bogus;");
    }

    #[test]
    fn decoded_tags_are_stripped_too() {
        assert_eq!(sanitize_markup("&lt;b&gt;bold&lt;/b&gt;"), "bold");
        assert_eq!(sanitize_markup("&amp;lt;i&amp;gt;x"), "x");
    }

    #[test]
    fn sanitization_is_idempotent() {
        let samples = [
            "<h1>CERTIFICATE</h1>\r\n<p>Owner: A &amp; B</p>",
            "&amp;amp;lt;script&amp;amp;gt;alert(1)",
            "a < b > c &lt; d &gt;",
            "",
            "plain text only",
            "<<b>>nested<</b>>",
        ];
        for sample in samples {
            let once = sanitize_markup(sample);
            assert_eq!(sanitize_markup(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn normalizes_crlf() {
        assert_eq!(sanitize_markup("a\r\nb"), "a\nb");
    }
}
