//! Amount and currency extraction

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::ascii_digits;
use crate::models::Currency;

/// First numeral: comma-grouped (western or lakh grouping) or plain decimal
static NUMERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]+(?:,[0-9]{2,3})+(?:\.[0-9]+)?|[0-9]+(?:\.[0-9]+)?").expect("valid regex")
});

/// Currency cues per currency; matched against lower-cased text
static CURRENCY_CUES: Lazy<Vec<(Regex, Currency)>> = Lazy::new(|| {
    [
        (
            r"\$|\bdollars?\b|\busd\b|डॉलर|டாலர்|డాలర్",
            Currency::Usd,
        ),
        (
            r"₹|\brupees?\b|\brs\b|\binr\b|रुपये|रुपए|रुपया|ரூபாய்|రూపాయ|ರೂಪಾಯಿ",
            Currency::Inr,
        ),
        (r"€|\beuros?\b|यूरो", Currency::Eur),
        (r"£|\bpounds?\b|\bgbp\b|पाउंड", Currency::Gbp),
        (r"¥|\byen\b|\bjpy\b", Currency::Jpy),
    ]
    .into_iter()
    .map(|(pattern, currency)| (Regex::new(pattern).expect("valid regex"), currency))
    .collect()
});

/// Amount found in free text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedAmount {
    /// Amount in minor units; 0 when the text has no numeral
    pub amount_minor: i64,
    pub currency: Currency,
}

/// Currency named in the text (earliest cue wins), if any
pub fn detect_currency(text: &str) -> Option<Currency> {
    let lower = text.to_lowercase();
    CURRENCY_CUES
        .iter()
        .filter_map(|(re, currency)| re.find(&lower).map(|m| (m.start(), *currency)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, currency)| currency)
}

/// First numeral in the text as a major-unit value
pub fn first_numeral(text: &str) -> Option<f64> {
    let text = ascii_digits(text);
    let m = NUMERAL.find(&text)?;
    m.as_str().replace(',', "").parse::<f64>().ok()
}

/// Extract amount and currency from free text
///
/// Falls back to `home_currency` when no currency cue is present and to an
/// amount of 0 when no numeral is present or the numeral is out of range.
/// Callers must treat a zero amount as an invalid parse.
pub fn extract_amount(text: &str, home_currency: Currency) -> ExtractedAmount {
    let currency = detect_currency(text).unwrap_or(home_currency);
    let amount_minor = match first_numeral(text).map(|v| currency.to_minor(v)) {
        Some(Ok(minor)) => minor,
        Some(Err(e)) => {
            warn!(error = %e, "Ignoring unusable amount");
            0
        }
        None => 0,
    };

    ExtractedAmount {
        amount_minor,
        currency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rupees_word() {
        let amt = extract_amount("500 rupees for lunch yesterday", Currency::Usd);
        assert_eq!(amt.currency, Currency::Inr);
        assert_eq!(amt.amount_minor, 50_000);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(
            extract_amount("$12.50 coffee", Currency::Inr),
            ExtractedAmount {
                amount_minor: 1_250,
                currency: Currency::Usd
            }
        );
        assert_eq!(extract_amount("£3 tea", Currency::Inr).currency, Currency::Gbp);
        assert_eq!(extract_amount("€ 40 museum", Currency::Inr).currency, Currency::Eur);
        assert_eq!(
            extract_amount("₹1,200 groceries", Currency::Usd).amount_minor,
            120_000
        );
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(
            extract_amount("rent 15,000", Currency::Inr).amount_minor,
            1_500_000
        );
        // Indian lakh grouping
        assert_eq!(
            extract_amount("car loan 1,50,000", Currency::Inr).amount_minor,
            15_000_000
        );
        assert_eq!(
            extract_amount("laptop $1,299.99", Currency::Inr).amount_minor,
            129_999
        );
    }

    #[test]
    fn test_home_currency_default() {
        let amt = extract_amount("lunch 250", Currency::Inr);
        assert_eq!(amt.currency, Currency::Inr);
        assert_eq!(amt.amount_minor, 25_000);
    }

    #[test]
    fn test_first_cue_wins() {
        // "dollars" appears before "rupees"
        let amt = extract_amount("10 dollars which is about 830 rupees", Currency::Eur);
        assert_eq!(amt.currency, Currency::Usd);
        assert_eq!(amt.amount_minor, 1_000);
    }

    #[test]
    fn test_rs_abbreviation_is_a_whole_word() {
        assert_eq!(detect_currency("Rs. 90 auto"), Some(Currency::Inr));
        // "rs" inside "hours" is not a currency cue
        assert_eq!(detect_currency("parking 2 hours"), None);
    }

    #[test]
    fn test_indic_text_and_digits() {
        let amt = extract_amount("खाना ५०० रुपये", Currency::Usd);
        assert_eq!(amt.currency, Currency::Inr);
        assert_eq!(amt.amount_minor, 50_000);

        assert_eq!(detect_currency("சாப்பாடு 200 ரூபாய்"), Some(Currency::Inr));
    }

    #[test]
    fn test_no_numeral_is_zero() {
        let amt = extract_amount("bought some snacks", Currency::Inr);
        assert_eq!(amt.amount_minor, 0);
        assert_eq!(amt.currency, Currency::Inr);
    }

    #[test]
    fn test_huge_numeral_is_zero() {
        let amt = extract_amount("99999999999999999999 rupees for lunch", Currency::Usd);
        assert_eq!(amt.amount_minor, 0);
        assert_eq!(amt.currency, Currency::Inr);
    }

    #[test]
    fn test_yen_has_no_minor_units() {
        assert_eq!(extract_amount("980 yen ramen", Currency::Inr).amount_minor, 980);
    }
}
