use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Built once; a single left-to-right pass never re-scans the entities it emits.
static TEXT_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">"])
        .expect("Failed to build text escaper")
});

static ATTRIBUTE_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\""])
        .expect("Failed to build attribute escaper")
});

static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

/// Escape text content for HTML output.
///
/// Only `&`, `<` and `>` are replaced; ampersands are handled first so the
/// entities introduced for the other two are never escaped again.
///
/// # Examples
///
/// ```
/// use odr::common::xml::escape_text;
/// assert_eq!(escape_text("a&b<c>"), "a&amp;b&lt;c&gt;");
/// assert_eq!(escape_text("&amp;"), "&amp;amp;");
/// ```
#[inline]
pub fn escape_text(s: &str) -> String {
    TEXT_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;"])
}

/// Escape a value placed inside a double-quoted HTML attribute.
///
/// # Examples
///
/// ```
/// use odr::common::xml::escape_attribute;
/// assert_eq!(escape_attribute("say \"hi\" & <go>"), "say &quot;hi&quot; &amp; &lt;go&gt;");
/// ```
#[inline]
pub fn escape_attribute(s: &str) -> String {
    ATTRIBUTE_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;"])
}

/// Escape XML special characters when serializing a parsed tree.
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_text_exactly_once() {
        assert_eq!(escape_text("a&b<c>"), "a&amp;b&lt;c&gt;");
        assert_eq!(escape_text("plain"), "plain");
        assert_eq!(escape_text(""), "");
    }

    #[test]
    fn test_escape_text_keeps_quotes() {
        assert_eq!(escape_text("\"quoted\" 'single'"), "\"quoted\" 'single'");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("<a href='x'>&</a>"), "&lt;a href=&apos;x&apos;&gt;&amp;&lt;/a&gt;");
    }

    proptest! {
        #[test]
        fn prop_escaped_text_has_no_raw_markup(s in ".*") {
            let escaped = escape_text(&s);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            // every ampersand starts one of the three entities
            for (i, _) in escaped.match_indices('&') {
                let rest = &escaped[i..];
                prop_assert!(rest.starts_with("&amp;") || rest.starts_with("&lt;") || rest.starts_with("&gt;"));
            }
        }

        #[test]
        fn prop_escape_matches_sequential_replacement(s in ".*") {
            let sequential = s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;");
            prop_assert_eq!(escape_text(&s), sequential);
        }
    }
}
