//! Property-based tests for the text sanitizer
//!
//! Tests invariants:
//! - sanitize(sanitize(s)) == sanitize(s) for every string
//! - Citation markers never survive, whether spaced or glued to the
//!   preceding word
//! - Output never has private-use chars, double spaces, whitespace before
//!   punctuation, more than one blank line, or surrounding whitespace

use crate::core::generation::sanitizer::sanitize;
use proptest::prelude::*;
use regex::Regex;

const WORDS: &[&str] = &[
    "Revenue", "grew", "last", "year", "the", "plan", "works", "deep", "focus", "calendar",
    "über", "naïve", "cite", "return", "10x", "3.5", "e.g.",
];

const MARKERS: &[&str] = &[
    "cite turn0search12",
    "turn3news7",
    "CITE TURN1VIEW2",
    "[cite turn1view0]",
    "(turn0search1, turn2news4)",
    "【turn4search0】",
    "\u{E200}cite\u{E202}turn0search3\u{E202}turn1news9\u{E201}",
    "[cite: industry survey]",
];

/// Markers as they appear glued to the preceding word once private-use
/// wrappers are gone
const GLUED_MARKERS: &[&str] = &[
    "\u{E200}cite\u{E202}turn0search3\u{E201}",
    "\u{E200}cite\u{E202}turn0search3\u{E202}turn1news0\u{E201}",
    "citeturn0search12",
    "turn2news1",
    "CITETURN4VIEW0turn1search2",
];

const SEPARATORS: &[&str] = &[" ", "  ", "   ", "\t", "\n", "\n\n", "\n\n\n\n", " \n \n \n"];

const PUNCTUATION: &[&str] = &["", "", "", ".", ",", ";", ":", "!", "?", " .", "  ,"];

fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (prop::sample::select(WORDS), prop::sample::select(PUNCTUATION))
            .prop_map(|(w, p)| format!("{w}{p}")),
        1 => prop::sample::select(MARKERS).prop_map(str::to_string),
        1 => Just("\u{E000}".to_string()),
        1 => Just("\u{F8FF}x".to_string()),
    ]
}

fn noisy_text() -> impl Strategy<Value = String> {
    prop::collection::vec((prop::sample::select(SEPARATORS), token()), 0..40).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(sep, tok)| format!("{sep}{tok}"))
            .collect()
    })
}

fn is_private_use(c: char) -> bool {
    matches!(c as u32, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD)
}

proptest! {
    #[test]
    fn idempotent_on_arbitrary_strings(s in "\\PC*") {
        let once = sanitize(&s);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn idempotent_on_noisy_text(s in noisy_text()) {
        let once = sanitize(&s);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn markers_removed(s in noisy_text()) {
        let out = sanitize(&s);
        let marker = Regex::new(r"(?i)turn\d").unwrap();
        prop_assert!(!marker.is_match(&out), "marker survived in {:?}", out);
        prop_assert!(!out.contains("[cite"), "wrapped cite survived in {:?}", out);
    }

    #[test]
    fn glued_markers_removed(
        word in "[A-Za-z]{1,8}[0-9]{0,4}",
        marker in prop::sample::select(GLUED_MARKERS),
    ) {
        let lower = word.to_lowercase();
        prop_assume!(!lower.contains("turn") && !lower.ends_with("cite"));

        let text = format!("{word}{marker} tail.");
        prop_assert_eq!(sanitize(&text), format!("{word} tail."));
    }

    #[test]
    fn whitespace_normalized(s in noisy_text()) {
        let out = sanitize(&s);
        prop_assert!(!out.chars().any(is_private_use));
        prop_assert!(!out.contains("  "));
        prop_assert!(!out.contains("\n\n\n"));
        prop_assert_eq!(out.trim(), out.as_str());
        let before_punct = Regex::new(r"\s[.,;:!?]").unwrap();
        prop_assert!(!before_punct.is_match(&out), "space before punctuation in {:?}", out);
    }

    #[test]
    fn plain_words_survive(words in prop::collection::vec("[a-z]{1,8}", 1..12)) {
        let text = words.join(" ");
        prop_assume!(!text.contains("turn"));
        prop_assert_eq!(sanitize(&text), text);
    }
}
