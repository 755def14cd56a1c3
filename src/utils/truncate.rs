//! Truncation Utilities
//!
//! Width-limited text for table cells. Keeps a prefix and a suffix and
//! counts characters, not bytes, so multi-byte labels stay intact.

const ELLIPSIS: char = '…';

/// Shorten `content` to at most `max_chars` characters by eliding its
/// middle.
pub fn truncate_middle(content: &str, max_chars: usize) -> String {
    let len = content.chars().count();
    if len <= max_chars {
        return content.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    if max_chars == 1 {
        return ELLIPSIS.to_string();
    }

    let keep = max_chars - 1;
    let prefix_len = keep.div_ceil(2);
    let suffix_len = keep - prefix_len;

    let prefix: String = content.chars().take(prefix_len).collect();
    let suffix: String = content.chars().skip(len - suffix_len).collect();
    format!("{}{}{}", prefix, ELLIPSIS, suffix)
}

/// Display width of `content` in characters.
pub fn display_width(content: &str) -> usize {
    content.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_middle("Streamlit", 20), "Streamlit");
        assert_eq!(truncate_middle("", 0), "");
    }

    #[test]
    fn test_middle_is_elided() {
        let out = truncate_middle("https://www.streamlit.io/cloud", 11);
        assert_eq!(display_width(&out), 11);
        assert_eq!(out, "https…cloud");
    }

    #[test]
    fn test_multibyte_boundaries() {
        let out = truncate_middle("Zürich Versicherungs-Gesellschaft", 8);
        assert_eq!(display_width(&out), 8);
        assert!(out.starts_with("Züri"));
    }

    #[test]
    fn test_tiny_budgets() {
        assert_eq!(truncate_middle("abc", 1), "…");
        assert_eq!(truncate_middle("abc", 0), "");
    }
}
