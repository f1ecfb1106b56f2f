// src/extract/clean.rs
// =============================================================================
// Turns a chunk of inner HTML into plain text.
//
// Steps (order matters):
// 1. <br>, <br/>, <br class="..."> become "\n"
// 2. every other tag is removed (non-greedy match from '<' to the first '>')
// 3. HTML entities are decoded (&amp; -> &, &laquo; -> «, &nbsp; -> U+00A0)
//
// Entities are decoded last, so an escaped "&lt;b&gt;" survives as the text
// "<b>" instead of being stripped like a real tag.
// =============================================================================

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

// The patterns are constants, so a failure here is a programmer error
static BR_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\b[^>]*>").expect("line break pattern is valid"));
static ANY_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<.+?>").expect("tag pattern is valid"));

// Cleans one fragment of inner HTML
//
// Example:
//   "Привет<br>мир" -> "Привет\nмир"
pub fn clean_markup(markup: &str) -> String {
    let text = BR_TAG.replace_all(markup, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    decode_html_entities(&text).into_owned()
}

// True when the cleaned text carries no content at all
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_br_becomes_newline() {
        assert_eq!(clean_markup("Привет<br>мир"), "Привет\nмир");
        assert_eq!(clean_markup("a<br/>b<BR class=\"x\">c"), "a\nb\nc");
    }

    #[test]
    fn test_tags_are_stripped() {
        assert_eq!(
            clean_markup(r#"<a href="/x">ссылка</a> и <strong>жирный</strong>"#),
            "ссылка и жирный"
        );
    }

    #[test]
    fn test_entities_are_decoded_after_stripping() {
        assert_eq!(clean_markup("&laquo;да&raquo; &amp; нет"), "«да» & нет");
        assert_eq!(clean_markup("&lt;b&gt;"), "<b>");
    }

    #[test]
    fn test_tag_only_fragment_is_blank() {
        let cleaned = clean_markup("<span></span><img src=\"a.png\"> ");
        assert!(is_blank(&cleaned));
    }

    #[test]
    fn test_unclosed_tag_is_left_alone() {
        // Malformed markup never panics
        assert_eq!(clean_markup("текст <b"), "текст <b");
    }
}
