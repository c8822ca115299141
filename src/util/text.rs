use std::sync::OnceLock;

use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string in terminal columns, Unicode-aware (CJK and
/// emoji are typically 2 columns, combining marks 0).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Ellipsis string used for truncation
const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates a string to fit within a maximum display width, appending an
/// ellipsis when anything was cut. Never splits a wide character in half.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= ELLIPSIS_WIDTH {
        return ELLIPSIS.chars().take(max_width).collect();
    }

    let budget = max_width - ELLIPSIS_WIDTH;
    let mut width = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(ch);
    }
    out.push_str(ELLIPSIS);
    out
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

fn break_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<(?:p|br)\s*/?>").expect("break pattern is valid"))
}

/// Flattens an upstream HTML fragment (comment/option bodies) into plain
/// terminal text: paragraph and line breaks become newlines, remaining
/// tags are stripped, entities are decoded, runs of whitespace collapse
/// within lines.
pub fn clean_html(fragment: &str) -> String {
    let with_breaks = break_pattern().replace_all(fragment, "\n");
    let stripped = tag_pattern().replace_all(&with_breaks, "");
    let decoded = html_escape::decode_html_entities(&stripped);

    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_never_splits_wide_char() {
        // Budget lands mid-CJK-character; the character is dropped whole.
        let out = truncate_to_width("ab世界", 6);
        assert!(display_width(&out) <= 6);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_truncate_tiny_budget() {
        assert_eq!(truncate_to_width("hello", 2), "..");
    }

    #[test]
    fn test_clean_html_paragraphs_become_newlines() {
        let out = clean_html("first<p>second<p>third");
        assert_eq!(out, "first\nsecond\nthird");
    }

    #[test]
    fn test_clean_html_strips_anchors_and_decodes_entities() {
        let out = clean_html(r#"see <a href="https://example.com">this &amp; that</a> &gt; rest"#);
        assert_eq!(out, "see this & that > rest");
    }

    #[test]
    fn test_clean_html_collapses_whitespace() {
        let out = clean_html("a   b\t\tc");
        assert_eq!(out, "a b c");
    }

    #[test]
    fn test_clean_html_plain_text_passthrough() {
        assert_eq!(clean_html("no markup here"), "no markup here");
    }
}
