//! Comment text normalizer. Pure functions, no I/O.
//!
//! Steps, in order: strip URLs, strip emoji/pictographs, strip everything outside
//! `[a-zA-Z0-9\s]`, lowercase, collapse whitespace runs to single spaces (which also trims).
//! The result is always a single line.

use super::entities::CleanedComment;
use regex::Regex;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://\S+|www\.\S+").expect("URL pattern is valid")
});

static SPECIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("special-char pattern is valid"));

/// Emoji and pictograph blocks (inclusive).
const PICTOGRAPH_RANGES: &[(u32, u32)] = &[
    (0x1F600, 0x1F64F), // emoticons
    (0x1F300, 0x1F5FF), // symbols & pictographs
    (0x1F680, 0x1F6FF), // transport & map
    (0x1F1E0, 0x1F1FF), // flags
    (0x2700, 0x27BF),   // dingbats
    (0x24C2, 0x1F251),  // enclosed characters
];

fn is_pictograph(c: char) -> bool {
    let cp = c as u32;
    PICTOGRAPH_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Clean a single comment body. May return an empty string.
pub fn normalize_text(text: &str) -> String {
    let no_urls = URL_RE.replace_all(text, "");
    let no_emoji: String = no_urls.chars().filter(|c| !is_pictograph(*c)).collect();
    let plain = SPECIAL_RE.replace_all(&no_emoji, "");
    plain
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean a sequence of comment bodies. Entries that end up empty are dropped;
/// each survivor keeps the index of the body it came from.
pub fn normalize_comments<I, S>(bodies: I) -> Vec<CleanedComment>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    bodies
        .into_iter()
        .enumerate()
        .filter_map(|(source_index, body)| {
            let text = normalize_text(body.as_ref());
            (!text.is_empty()).then_some(CleanedComment { source_index, text })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_empty_and_keeps_indices() {
        let out = normalize_comments(["Check http://x.com NOW!!", "", "✨great✨"]);
        let texts: Vec<&str> = out.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["check now", "great"]);
        let indices: Vec<usize> = out.iter().map(|c| c.source_index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_strips_urls() {
        let inputs = [
            "see https://example.com/a?b=c for details",
            "www.reddit.com/r/rust is nice",
            "two links http://a.io and https://b.io/x",
        ];
        for input in inputs {
            let out = normalize_text(input);
            assert!(!out.contains("http"), "{out}");
            assert!(!out.contains("www"), "{out}");
            assert!(!out.contains("example"), "{out}");
        }
        assert_eq!(
            normalize_text("see https://example.com/a?b=c for details"),
            "see for details"
        );
    }

    #[test]
    fn test_output_charset() {
        let inputs = [
            "Héllo, Wörld! 😀 #1",
            "Tabs\tand\nnewlines — dashes",
            "ＦＵＬＬＷＩＤＴＨ text 123",
            "🚀🚀 launch 🇺🇸",
        ];
        for input in inputs {
            let out = normalize_text(input);
            assert!(
                out.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace()),
                "unexpected chars in {out:?}"
            );
        }
    }

    #[test]
    fn test_all_punctuation_is_dropped() {
        assert!(normalize_comments(["?!...,,;;"]).is_empty());
        assert!(normalize_comments(["   ", "https://only.a/link"]).is_empty());
    }

    #[test]
    fn test_multiline_body_becomes_one_line() {
        let out = normalize_text("Great update.\n\nBut please   add\ta replay mode\r\n");
        assert_eq!(out, "great update but please add a replay mode");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn test_lowercases_and_trims() {
        assert_eq!(normalize_text("  The GAME Crashed!!  "), "the game crashed");
    }
}
