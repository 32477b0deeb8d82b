//! Best-effort structural repair of almost-JSON model output
//!
//! [`JsonRepairer`] is a single forward pass over the text starting at the
//! first `{`. It fixes syntax defects without touching content:
//! - smart and single quotes used as string delimiters
//! - unquoted keys and Python/JS literals (`True`, `None`, `undefined`)
//! - trailing commas, `//` and `/* */` comments
//! - raw control characters and stray double quotes inside strings
//! - truncation (unterminated strings, unclosed brackets)
//!
//! Anything after the top-level object closes is discarded.

/// Pluggable repair step used as the decoder's last strategy
#[cfg_attr(test, mockall::automock)]
pub trait Repairer: Send + Sync {
    /// Repaired text, or `None` when there is nothing to repair
    fn try_repair(&self, text: &str) -> Option<String>;
}

/// In-house tolerant re-serializer
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRepairer;

impl JsonRepairer {
    pub fn new() -> Self {
        Self
    }
}

impl Repairer for JsonRepairer {
    fn try_repair(&self, text: &str) -> Option<String> {
        let start = text.find('{')?;
        let repaired = repair(&text[start..]);
        if repaired == text.trim() {
            None
        } else {
            Some(repaired)
        }
    }
}

const LEFT_DOUBLE: char = '\u{201C}';
const RIGHT_DOUBLE: char = '\u{201D}';
const LEFT_SINGLE: char = '\u{2018}';
const RIGHT_SINGLE: char = '\u{2019}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Double,
    Single,
    SmartDouble,
    SmartSingle,
}

impl Quote {
    fn opening(c: char) -> Option<Self> {
        match c {
            '"' => Some(Quote::Double),
            '\'' => Some(Quote::Single),
            LEFT_DOUBLE | RIGHT_DOUBLE => Some(Quote::SmartDouble),
            LEFT_SINGLE | RIGHT_SINGLE => Some(Quote::SmartSingle),
            _ => None,
        }
    }

    fn closes(&self, c: char) -> bool {
        match self {
            Quote::Double => c == '"',
            Quote::Single => c == '\'',
            Quote::SmartDouble => c == LEFT_DOUBLE || c == RIGHT_DOUBLE,
            Quote::SmartSingle => c == LEFT_SINGLE || c == RIGHT_SINGLE,
        }
    }
}

/// First non-whitespace char at or after `from`, and whether a newline was crossed
fn next_significant(chars: &[char], from: usize) -> (Option<char>, bool) {
    let mut newline = false;
    for &c in &chars[from.min(chars.len())..] {
        if c == '\n' {
            newline = true;
        } else if !c.is_whitespace() {
            return (Some(c), newline);
        }
    }
    (None, newline)
}

/// A quote only terminates a string when what follows looks like structure
fn ends_string(chars: &[char], after: usize) -> bool {
    match next_significant(chars, after) {
        (None, _) | (_, true) => true,
        (Some(c), false) => matches!(c, ',' | '}' | ']' | ':'),
    }
}

fn drop_trailing_comma(out: &mut String) {
    let trimmed = out.trim_end().len();
    if out[..trimmed].ends_with(',') {
        out.truncate(trimmed - 1);
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
        c => out.push(c),
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '-')
}

fn repair(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut closers: Vec<char> = Vec::new();
    let mut string: Option<Quote> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(quote) = string {
            match c {
                '\\' => match chars.get(i + 1) {
                    // `\'` is not a JSON escape
                    Some('\'') => {
                        out.push('\'');
                        i += 1;
                    }
                    Some(&next) => {
                        out.push('\\');
                        out.push(next);
                        i += 1;
                    }
                    None => {}
                },
                c if quote.closes(c) && ends_string(&chars, i + 1) => {
                    out.push('"');
                    string = None;
                }
                '"' => out.push_str("\\\""),
                c => push_escaped(&mut out, c),
            }
            i += 1;
            continue;
        }

        match c {
            '{' | '[' => {
                out.push(c);
                closers.push(if c == '{' { '}' } else { ']' });
            }
            '}' | ']' => {
                if closers.contains(&c) {
                    drop_trailing_comma(&mut out);
                    while let Some(closer) = closers.pop() {
                        out.push(closer);
                        if closer == c {
                            break;
                        }
                    }
                    if closers.is_empty() {
                        return out;
                    }
                }
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
                continue;
            }
            c if Quote::opening(c).is_some() => {
                string = Quote::opening(c);
                out.push('"');
            }
            c if c.is_ascii_digit() || c == '-' => {
                while i < chars.len() && (chars[i].is_ascii_digit() || matches!(chars[i], '.' | 'e' | 'E' | '+' | '-')) {
                    out.push(chars[i]);
                    i += 1;
                }
                continue;
            }
            c if is_ident_start(c) => {
                let begin = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[begin..i].iter().collect();
                if next_significant(&chars, i).0 == Some(':') {
                    out.push('"');
                    out.push_str(&word);
                    out.push('"');
                } else {
                    match word.as_str() {
                        "true" | "True" | "TRUE" => out.push_str("true"),
                        "false" | "False" | "FALSE" => out.push_str("false"),
                        "null" | "None" | "undefined" | "NaN" | "nil" => out.push_str("null"),
                        other => {
                            out.push('"');
                            out.push_str(other);
                            out.push('"');
                        }
                    }
                }
                continue;
            }
            c => out.push(c),
        }
        i += 1;
    }

    // Truncated input: close whatever is still open
    if string.is_some() {
        if out.ends_with('\\') && !out.ends_with("\\\\") {
            out.pop();
        }
        out.push('"');
    }
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    if out.ends_with(':') {
        out.push_str(" null");
    }
    drop_trailing_comma(&mut out);
    while let Some(closer) = closers.pop() {
        out.push(closer);
    }
    out
}
