//! Small text helpers shared by the ranker and the renderers.

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// `text` if non-blank, otherwise `placeholder`.
pub fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.trim().is_empty() {
        placeholder
    } else {
        text
    }
}

/// Lowercased whitespace-separated words of a query.
pub fn query_words(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_counts_chars_not_bytes() {
        assert_eq!(excerpt("héllo wörld", 4), "héll");
        assert_eq!(excerpt("short", 150), "short");
        assert_eq!(excerpt("", 3), "");
    }

    #[test]
    fn placeholder_for_blank() {
        assert_eq!(or_placeholder("  ", "Not specified"), "Not specified");
        assert_eq!(or_placeholder("x", "Not specified"), "x");
    }

    #[test]
    fn query_words_lowercases() {
        assert_eq!(query_words("  Health   AI "), vec!["health", "ai"]);
        assert!(query_words("   ").is_empty());
    }
}
