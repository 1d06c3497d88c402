//! Extraction of the movie title from the solution endpoint's script body.
//!
//! The solution endpoint answers with a JavaScript snippet containing a call
//! like `setAmazonMovieName("Le Fabuleux Destin d\u00e9 Am\u00e9lie")`. Non-ASCII
//! characters are `\uXXXX` escaped.
//!
//! Only escapes whose four characters are decimal digits are recognised. Each
//! digit's decimal value is then read as a hexadecimal nibble, so `\u0042`
//! becomes `B` while `\u00e9` is left as-is. Non-ASCII decimal digits count
//! too: Arabic-Indic `\u١٢٣٤` is U+1234.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{WtmError, WtmResult};

fn movie_name_call() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"setAmazonMovieName\("(.*)"\)"#).expect("valid regex"))
}

fn js_unicode_escape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\u(\d{4})").expect("valid regex"))
}

/// Find the `setAmazonMovieName("...")` call in `body` and return its
/// unescaped argument.
///
/// Returns `Ok(None)` when the call is absent. A matched escape that cannot
/// be read as a hexadecimal code point is an error.
pub fn decode_solution(body: &str) -> WtmResult<Option<String>> {
    match movie_name_call().captures(body) {
        Some(caps) => {
            let raw = caps.get(1).map_or("", |m| m.as_str());
            unescape_js_unicode(raw).map(Some)
        }
        None => Ok(None),
    }
}

/// Replace every `\u` + four digits with the character at that (hex) code point.
pub fn unescape_js_unicode(input: &str) -> WtmResult<String> {
    let mut failure = None;

    let out = js_unicode_escape().replace_all(input, |caps: &Captures| {
        let digits = &caps[1];
        match decode_code_point(digits) {
            Ok(c) => c.to_string(),
            Err(e) => {
                failure.get_or_insert(e);
                caps[0].to_string()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(out.into_owned()),
    }
}

fn decimal_digit() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\A\d\z").expect("valid regex"))
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    decimal_digit().is_match(c.encode_utf8(&mut buf))
}

/// Decimal value of any `\d` character, ASCII or not.
///
/// Unicode decimal digits come in contiguous runs of ten starting at zero,
/// so the value is the count of digits directly before `c`, modulo ten.
fn decimal_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut preceding = 0;
    let mut cp = c as u32;
    while let Some(prev) = cp.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        preceding += 1;
        cp -= 1;
    }
    Some(preceding % 10)
}

fn decode_code_point(digits: &str) -> WtmResult<char> {
    let code = digits.chars().try_fold(0u32, |acc, c| {
        decimal_value(c)
            .map(|d| acc * 16 + d)
            .ok_or_else(|| WtmError::SolutionDecode(format!("invalid escape \\u{digits}")))
    })?;
    char::from_u32(code)
        .ok_or_else(|| WtmError::SolutionDecode(format!("invalid code point U+{code:04X}")))
}
