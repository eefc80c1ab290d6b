//! Value escaping for generated facts
//!
//! Free-text values cannot appear in s(CASP) source as-is, so generated
//! facts embed them as atoms: `daSCASP_` followed by the form-urlencoded
//! value, with `%` and `+` swapped for `__perc__` and `__plus__`. The
//! solver prints such atoms verbatim, and `decode_output` restores the
//! original values in its output.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex_lite::{Captures, Regex};
use std::sync::OnceLock;

/// Prefix marking an escaped value atom
pub const ESCAPE_PREFIX: &str = "daSCASP_";

const PERCENT_TOKEN: &str = "__perc__";
const PLUS_TOKEN: &str = "__plus__";

/// Everything except ASCII alphanumerics and space is percent-encoded,
/// `_` included, so the escape tokens are the only underscores in a token.
/// Spaces become `+` afterwards.
const VALUE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b' ');

fn escaped_atom() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"daSCASP_([^),\s]*)").expect("escaped atom pattern is valid")
    })
}

/// Encode a free-text value as an s(CASP) atom
pub fn encode_value(value: &str) -> String {
    let encoded = utf8_percent_encode(value, VALUE_SET)
        .to_string()
        .replace(' ', "+");
    format!(
        "{}{}",
        ESCAPE_PREFIX,
        encoded.replace('%', PERCENT_TOKEN).replace('+', PLUS_TOKEN)
    )
}

/// Decode the token that follows `daSCASP_`.
///
/// Escape tokens are recognized in a single left-to-right scan so that
/// text between two tokens can never be read as part of a third.
pub fn decode_token(token: &str) -> String {
    let mut urlencoded = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix(PERCENT_TOKEN) {
            urlencoded.push('%');
            rest = after;
        } else if let Some(after) = rest.strip_prefix(PLUS_TOKEN) {
            urlencoded.push(' ');
            rest = after;
        } else {
            urlencoded.push(if c == '+' { ' ' } else { c });
            rest = &rest[c.len_utf8()..];
        }
    }
    percent_decode_str(&urlencoded).decode_utf8_lossy().into_owned()
}

/// Replace every escaped value atom in solver output with its original value
pub fn decode_output(output: &str) -> String {
    escaped_atom()
        .replace_all(output, |caps: &Captures<'_>| decode_token(&caps[1]))
        .into_owned()
}
