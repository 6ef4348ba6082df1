//! Rule-based extractors for the local fallback parser
//!
//! - `amount`: numeric amount and currency
//! - `date`: relative and absolute date references
//!
//! Both work on any of the supported scripts. Native digits (Devanagari,
//! Bengali, Tamil, Telugu, Kannada) are folded to ASCII before matching.

pub mod amount;
pub mod date;

pub use amount::{extract_amount, ExtractedAmount};
pub use date::{extract_date, DateOrder};

/// Zero code points of the native digit blocks we fold to ASCII
const DIGIT_BLOCKS: [u32; 5] = [
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0BE6, // Tamil
    0x0C66, // Telugu
    0x0CE6, // Kannada
];

/// Replace native-script digits with their ASCII equivalents
pub fn ascii_digits(text: &str) -> String {
    text.chars()
        .map(|c| {
            let cp = c as u32;
            DIGIT_BLOCKS
                .iter()
                .find(|&&zero| (zero..zero + 10).contains(&cp))
                .and_then(|&zero| char::from_digit(cp - zero, 10))
                .unwrap_or(c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_digits() {
        assert_eq!(ascii_digits("५०० रुपये"), "500 रुपये");
        assert_eq!(ascii_digits("౧౨"), "12");
        assert_eq!(ascii_digits("abc 42"), "abc 42");
    }
}
