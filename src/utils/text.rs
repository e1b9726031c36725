//! Normalization of free-text lyrics before prediction.

use once_cell::sync::Lazy;
use regex::Regex;

/// HTML line breaks: `<br>`, `<br/>`, `<br />`
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"<br\s*/?>").unwrap());

/// Anything that is not a lowercase ASCII letter, digit or whitespace
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize lyrics text into lowercase alphanumeric words separated by
/// single spaces.
///
/// Total and pure: every input, including the empty string, yields a string
/// containing only `[a-z0-9 ]` with no leading, trailing or doubled spaces.
///
/// ```
/// use lyrics_genre::utils::text::clean;
///
/// assert_eq!(clean("Hello,<br/>WORLD!!"), "hello world");
/// assert_eq!(clean("  "), "");
/// ```
#[must_use]
pub fn clean(input: &str) -> String {
    let lowered = input.to_lowercase();
    let no_breaks = LINE_BREAK.replace_all(&lowered, " ");
    let allowed = DISALLOWED.replace_all(&no_breaks, " ");
    WHITESPACE_RUN.replace_all(&allowed, " ").trim().to_string()
}
