//! Title and keyword normalization shared by the aggregator, selector and emitter.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

/// Anything that cannot be part of a title word. `#` and `+` stay so that
/// "C#", "C++" and "C" remain distinct.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}#+]+").expect("valid regex"));

const MAX_TITLE_KEYWORDS: usize = 5;
const MIN_KEYWORD_LETTERS: usize = 4;

const STOP_WORDS: &[&str] = &[
    "about", "after", "also", "been", "before", "being", "from", "have", "here", "into", "just",
    "like", "more", "most", "over", "should", "some", "than", "that", "their", "them", "then",
    "there", "these", "they", "this", "what", "when", "where", "which", "while", "will", "with",
    "without", "your", "youre", "mastering", "github", "trending", "stack", "overflow",
];

/// Lowercase, replace every character other than letters, digits, `#` and
/// `+` with a space, drop words made only of symbols and collapse whitespace.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    NON_WORD
        .replace_all(title, " ")
        .split_whitespace()
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalized title with all spaces removed. Two titles whose compact forms
/// match are near-exact duplicates ("Dev Ops" vs "DevOps").
#[must_use]
pub fn compact_title(title: &str) -> String {
    normalize_title(title).replace(' ', "")
}

/// Lowercased, whitespace-collapsed keyword; `None` when nothing is left.
#[must_use]
pub fn normalize_keyword(keyword: &str) -> Option<String> {
    let normalized = keyword
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    (!normalized.is_empty()).then_some(normalized)
}

/// Normalize every keyword, dropping empties and duplicates.
pub fn normalize_keywords<I, S>(keywords: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .filter_map(|k| normalize_keyword(k.as_ref()))
        .collect()
}

/// Up to five distinct title words of at least four letters that are not
/// stop-words, in order of appearance.
#[must_use]
pub fn title_keywords(title: &str) -> BTreeSet<String> {
    let normalized = normalize_title(title);
    let mut picked: Vec<&str> = Vec::new();
    for word in normalized.split(' ') {
        if picked.len() == MAX_TITLE_KEYWORDS {
            break;
        }
        let letters = word.chars().filter(|c| c.is_alphabetic()).count();
        if letters < MIN_KEYWORD_LETTERS || STOP_WORDS.contains(&word) || picked.contains(&word) {
            continue;
        }
        picked.push(word);
    }
    picked.into_iter().map(str::to_owned).collect()
}

/// Stable record id: first 12 hex characters of SHA-256 over the normalized title.
#[must_use]
pub fn idea_id(normalized_title: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(normalized_title.as_bytes()));
    digest[..12].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_title_strips_punctuation_and_case() {
        assert_eq!(
            normalize_title("  Rust 2.0: What's NEW?!  "),
            "rust 2 0 what s new"
        );
    }

    #[test]
    fn normalize_title_of_symbols_is_empty() {
        assert_eq!(normalize_title("!!! --- ???"), "");
    }

    #[test]
    fn normalize_title_keeps_language_symbols() {
        assert_eq!(normalize_title("Mastering C# today"), "mastering c# today");
        assert_eq!(normalize_title("Modern C++!"), "modern c++");
        assert_ne!(normalize_title("Learn C#"), normalize_title("Learn C"));
        assert_ne!(normalize_title("Learn C++"), normalize_title("Learn C#"));
        assert_eq!(normalize_title("Rust + Go ## notes"), "rust go notes");
    }

    #[test]
    fn compact_title_joins_split_words() {
        assert_eq!(compact_title("Dev Ops tips"), compact_title("DevOps Tips!"));
    }

    #[test]
    fn normalize_keyword_rejects_blank() {
        assert_eq!(normalize_keyword("   "), None);
        assert_eq!(
            normalize_keyword("  API   Design "),
            Some("api design".to_owned())
        );
    }

    #[test]
    fn title_keywords_skip_short_and_stop_words() {
        let keywords = title_keywords("Why your API design is wrong with Kubernetes");
        let expected: BTreeSet<String> = ["design", "wrong", "kubernetes"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(keywords, expected);
    }

    #[test]
    fn title_keywords_caps_at_five() {
        let keywords =
            title_keywords("alpha bravo charlie delta echoes foxtrot golfing hotel india");
        assert_eq!(keywords.len(), 5);
        assert!(!keywords.contains("foxtrot"));
    }

    #[test]
    fn idea_id_is_twelve_hex_chars_and_stable() {
        let a = idea_id("docker tips");
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, idea_id("docker tips"));
        assert_ne!(a, idea_id("docker tricks"));
    }
}
