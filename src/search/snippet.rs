//! Snippet construction and term highlighting
//!
//! All scanning happens in character space: query lemmas and page text
//! mix cyrillic and latin, and byte offsets would split multi-byte
//! characters.

use regex::RegexBuilder;

/// Characters kept on each side of a matched lemma
const SNIPPET_WINDOW: usize = 30;

/// Fallback snippet length when not every lemma was found
const SNIPPET_FALLBACK_LENGTH: usize = 200;

/// Builds a highlighted snippet for a page
///
/// Every case-insensitive occurrence of every query lemma contributes a
/// fragment of the surrounding text (original case preserved). When at
/// least one occurrence was found for every lemma, the fragments are
/// joined with `" ... "` and matched words are wrapped in `<b>` tags
/// (whole-word matches only). Otherwise the page's leading text is
/// returned unhighlighted.
pub fn build_snippet(text: &str, query_lemmas: &[String]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let lower: Vec<char> = chars
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();

    let mut fragments: Vec<String> = Vec::new();
    let mut lemmas_found = 0usize;

    for lemma in query_lemmas {
        let needle: Vec<char> = lemma.to_lowercase().chars().collect();
        if needle.is_empty() {
            continue;
        }

        let mut matched = false;
        let mut from = 0usize;
        while let Some(idx) = find_chars(&lower, &needle, from) {
            let start = idx.saturating_sub(SNIPPET_WINDOW);
            let end = (idx + needle.len() + SNIPPET_WINDOW).min(chars.len());
            fragments.push(chars[start..end].iter().collect());
            matched = true;
            from = end;
        }
        if matched {
            lemmas_found += 1;
        }
    }

    if query_lemmas.is_empty() || lemmas_found < query_lemmas.len() {
        let prefix: String = chars.iter().take(SNIPPET_FALLBACK_LENGTH).collect();
        return format!("{}...", prefix);
    }

    let snippet = format!("...{}...", fragments.join(" ... "));
    highlight(&snippet, query_lemmas)
}

/// First occurrence of `needle` in `haystack` at or after `from`
fn find_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len())
        .find(|&i| haystack[i..i + needle.len()] == *needle)
}

/// Wraps whole-word, case-insensitive matches of the lemmas in `<b>` tags
fn highlight(text: &str, lemmas: &[String]) -> String {
    let mut out = text.to_string();
    for lemma in lemmas {
        let Ok(pattern) = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(lemma)))
            .case_insensitive(true)
            .build()
        else {
            continue;
        };
        out = pattern.replace_all(&out, "<b>$0</b>").to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemmas(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_snippet_contains_highlighted_match() {
        let snippet = build_snippet("кот сидит на окне", &lemmas(&["кот"]));
        assert!(snippet.contains("<b>кот</b>"));
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_window_preserves_original_case() {
        let snippet = build_snippet("Кот сидит на окне", &lemmas(&["кот"]));
        assert!(snippet.contains("<b>Кот</b>"));
    }

    #[test]
    fn test_every_occurrence_produces_a_fragment() {
        let text = format!("кот {} кот", "х".repeat(100));
        let snippet = build_snippet(&text, &lemmas(&["кот"]));
        assert_eq!(snippet.matches("<b>кот</b>").count(), 2);
        assert!(snippet.contains(" ... "));
    }

    #[test]
    fn test_missing_lemma_falls_back_to_prefix() {
        let text = "собака ".repeat(50);
        let snippet = build_snippet(&text, &lemmas(&["кот", "собака"]));
        assert!(!snippet.contains("<b>"));
        assert_eq!(snippet.chars().count(), 200 + 3);
    }

    #[test]
    fn test_short_text_fallback_not_padded() {
        let snippet = build_snippet("собака", &lemmas(&["кот"]));
        assert_eq!(snippet, "собака...");
    }

    #[test]
    fn test_whole_word_matches_only() {
        let snippet = build_snippet("cat catalog cat", &lemmas(&["cat"]));
        assert!(snippet.contains("<b>cat</b>"));
        assert!(!snippet.contains("<b>cat</b>alog"));
        assert!(snippet.contains("catalog"));
    }

    #[test]
    fn test_match_at_text_bounds_is_clamped() {
        let snippet = build_snippet("кот", &lemmas(&["кот"]));
        assert_eq!(snippet, "...<b>кот</b>...");
    }

    #[test]
    fn test_case_insensitive_search() {
        let snippet = build_snippet("КОТ спит", &lemmas(&["кот"]));
        assert!(snippet.contains("<b>КОТ</b>"));
    }
}
