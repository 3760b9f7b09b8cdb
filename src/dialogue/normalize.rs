//! Text normalization for keyword matching
//!
//! Utterances and keywords are compared after lowercasing, NFD decomposition
//! with combining marks removed, and trimming, so "Sí" and "si" match alike.

use unicode_normalization::UnicodeNormalization;

/// Combining Diacritical Marks block stripped after NFD decomposition
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Lowercase, decompose, strip diacritics and trim
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// True if the normalized text contains any of the normalized words
pub fn contains_any(normalized_text: &str, words: &[&str]) -> bool {
    words
        .iter()
        .any(|word| normalized_text.contains(normalize(word).as_str()))
}

/// Uppercase the first character and lowercase the rest
pub fn format_product_name(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Outcome of reading a quantity from an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityInput {
    /// A positive integer within the accepted range
    Valid(u32),
    /// A positive integer above the maximum
    TooLarge,
    /// Not a positive integer
    Invalid,
}

/// Parse a leading integer the way a lenient form field would:
/// optional sign, an optional `0x` hex prefix, then the leading run of digits.
/// Trailing text is ignored.
pub fn parse_quantity(text: &str, max: u32) -> QuantityInput {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, rest) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let digits_len = rest
        .chars()
        .take_while(|c| c.is_digit(radix))
        .count();
    if digits_len == 0 {
        return QuantityInput::Invalid;
    }
    // Digits are ASCII, so the char count is also the byte length
    let digits = &rest[..digits_len];

    if negative {
        return QuantityInput::Invalid;
    }

    match u64::from_str_radix(digits, radix) {
        Ok(0) => QuantityInput::Invalid,
        Ok(n) if n > u64::from(max) => QuantityInput::TooLarge,
        // n <= max, which fits in u32
        Ok(n) => QuantityInput::Valid(n as u32),
        // Only overflow is possible here; digits were validated above
        Err(_) => QuantityInput::TooLarge,
    }
}
