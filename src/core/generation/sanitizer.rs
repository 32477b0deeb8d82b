//! Text sanitizer
//!
//! Strips generation artifacts from free-text fields: private-use glyph
//! placeholders, web-search citation markers, and the whitespace damage
//! their removal leaves behind.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

// ============================================================================
// Patterns
// ============================================================================

/// `[cite turn0search3]`, `(turn0news1, turn2view0)`, `【turn1search4】`
static WRAPPED_CITATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\[(【]\s*(?:cite\s*)?turn\d+[a-z]+\d+(?:[\s,]*turn\d+[a-z]+\d+)*[\s,]*[\])】]")
        .unwrap()
});

/// `[cite: source]`, `(cite 3)`
static WRAPPED_CITE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[\[(【]\s*cite\b[^\[\]()【】]*[\])】]").unwrap());

/// Bare `cite turn0search12`, `citeturn0search12turn0news3`, `turn4view1`,
/// also when glued to the preceding word (`2023citeturn0search3`). A spaced
/// `cite` is only taken at a word start so `recite` keeps its letters.
static BARE_CITATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\bcite\s*|cite)?turn\d+[a-z]+\d+(?:[\s,]*(?:cite\s*)?turn\d+[a-z]+\d+)*",
    )
    .unwrap()
});

/// Brackets emptied by marker removal: `( )`, `(see )`, `[via: ]`
static EMPTIED_BRACKETS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[\[(【](?:\s*(?:see(?:\s+also)?|via|cf\.?|sources?)(?:\s*:\s*|\s+)|\s+)[\])】]",
    )
    .unwrap()
});

static MULTI_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

static EXCESS_NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").unwrap());

static SPACE_BEFORE_PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([.,;:!?])").unwrap());

// ============================================================================
// Passes
// ============================================================================

fn is_private_use(c: char) -> bool {
    matches!(c as u32, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD)
}

fn strip_private_use(text: &str) -> Cow<'_, str> {
    if text.chars().any(is_private_use) {
        Cow::Owned(text.chars().filter(|c| !is_private_use(*c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

fn single_pass(text: &str) -> String {
    let text = strip_private_use(text);
    let text = WRAPPED_CITATION_RE.replace_all(&text, "");
    let text = WRAPPED_CITE_RE.replace_all(&text, "");
    let text = BARE_CITATION_RE.replace_all(&text, "");
    let text = EMPTIED_BRACKETS_RE.replace_all(&text, "");
    let text = MULTI_SPACE_RE.replace_all(&text, " ");
    let text = EXCESS_NEWLINES_RE.replace_all(&text, "\n\n");
    let text = SPACE_BEFORE_PUNCT_RE.replace_all(&text, "$1");
    text.trim().to_string()
}

/// Clean one free-text field.
///
/// Every pass only ever shortens the text, so repeating until nothing
/// changes terminates and makes the result idempotent.
pub fn sanitize(text: &str) -> String {
    let mut current = single_pass(text);
    loop {
        let next = single_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}
