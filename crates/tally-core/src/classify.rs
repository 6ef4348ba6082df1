//! Keyword-based category classifier
//!
//! Maps free text to a [`CategoryTag`] using per-category keyword tables in
//! English, Hindi, Tamil, Telugu, Kannada and Bengali. Categories are checked
//! in declaration order and the first one with any keyword hit wins; `Other`
//! has no keywords and is returned when nothing matches.
//!
//! Text is lower-cased, ASCII punctuation becomes whitespace, and the result
//! is padded with a space on each side. Short English keywords that would
//! otherwise hit inside longer words ("emi" in "premium") carry their own
//! padding so they only match as whole words.

use once_cell::sync::Lazy;

use crate::models::CategoryTag;

/// Keyword tables in category declaration order
static KEYWORDS: Lazy<Vec<(CategoryTag, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        (CategoryTag::Food, FOOD),
        (CategoryTag::Entertainment, ENTERTAINMENT),
        (CategoryTag::Travel, TRAVEL),
        (CategoryTag::Necessities, NECESSITIES),
        (CategoryTag::Loans, LOANS),
        (CategoryTag::Healthcare, HEALTHCARE),
        (CategoryTag::Education, EDUCATION),
        (CategoryTag::Utilities, UTILITIES),
    ]
});

const FOOD: &[&str] = &[
    "food", "lunch", "dinner", "breakfast", "restaurant", "cafe", "coffee", "meal", " ate ",
    "eating", "pizza", "burger", "sandwich", "biryani", " rice ", " dal ", "roti", "naan",
    "curry", "chicken", "mutton", "fish", " egg", "milk", "bread", "butter", "cheese", "paneer",
    "dosa", "idli", "vada", "samosa", "pakora", "chaat", "pani puri", "bhel", "sweets",
    "dessert", "ice cream", " cake", "pastry", " tea ", "chai", "juice", "soda", "snack",
    "chips", "biscuit", "chocolate", "fruit", "vegetable", "salad", "soup", "noodles", "pasta",
    "momos", "paratha", "sabzi", "swiggy", "zomato",
    // Hindi
    "खाना", "भोजन", "लंच", "डिनर", "नाश्ता", "चाय", "दूध", "रोटी", "चावल", "दाल", "सब्जी",
    "मिठाई", "बिरयानी", "समोसा", "पकोड़ा", "चाट", "डोसा", "इडली", "वडा", "परांठा", "पूरी",
    "पनीर",
    // Tamil
    "சாப்பாடு", "உணவு", "டோசை", "இட்லி", "வடை", "சாம்பார்", "பிரியாணி", "சப்பாத்தி",
    "பரோட்டா", "சாதம்", "கறி", "மிட்டாய்", "டீ", "காபி",
    // Telugu
    "ఆహారం", "భోజనం", "లంచ్", "డిన్నర్", "బ్రేక్ఫాస్ట్", "డోసా", "ఇడ్లీ", "వడ", "బిర్యానీ",
    "రొట్టె", "అన్నం", "కూర", "టీ", "కాఫీ", "స్వీట్స్",
    // Kannada
    "ಆಹಾರ", "ಊಟ", "ಡೋಸೆ", "ಇಡ್ಲಿ", "ವಡೆ", "ಬಿರಿಯಾನಿ", "ರೊಟ್ಟಿ", "ಅನ್ನ", "ಟೀ", "ಕಾಫಿ",
    // Bengali
    "খাবার", "খাদ্য", "ভাত", "রুটি", "ডাল", "তরকারি", "মিষ্টি", "চা", "দুধ",
];

const ENTERTAINMENT: &[&str] = &[
    "movie", "cinema", "concert", "game", "entertainment", " fun ", "party", " show", "netflix",
    "theatre", "theater",
    // Hindi
    "मूवी", "सिनेमा", "मनोरंजन",
    // Tamil
    "சினிமா", "திரைப்படம்", "விளையாட்டு",
    // Telugu
    "సినిమా", "వినోదం",
];

const TRAVEL: &[&str] = &[
    "travel", "flight", "hotel", "taxi", "uber", "ola ", "train", " bus ", " trip", "vacation",
    " auto ", "petrol", "diesel", "metro", "cab ",
    // Hindi
    "यात्रा", "टैक्सी", "ट्रेन", "बस",
    // Tamil
    "பயணம்", "டாக்ஸி", "ரயில்", "பஸ்",
    // Telugu
    "ప్రయాణం", "టాక్సీ", "రైలు",
];

const NECESSITIES: &[&str] = &[
    "grocery", "groceries", "shopping", "clothes", "clothing", "supermarket", " store",
    "market",
    // Hindi
    "किराना", "खरीदारी", "कपड़े",
    // Tamil
    "மளிகை", "கடை", "துணி",
    // Telugu
    "కిరాణా", "షాపింగ్",
];

const LOANS: &[&str] = &[
    "loan", " emi ", "installment", "instalment", "debt", "borrowed", " lent ",
    // Hindi
    "कर्ज", "ऋण", "किस्त",
    // Tamil
    "கடன்", "தவணை",
];

const HEALTHCARE: &[&str] = &[
    "doctor", "hospital", "medicine", "medical", "health", "pharmacy", "clinic", "dentist",
    // Hindi
    "डॉक्टर", "अस्पताल", "दवा", "दवाई",
    // Tamil
    "மருத்துவர்", "மருத்துவம்", "மருந்து",
    // Telugu
    "డాక్టర్", "ఆసుపత్రి", "మందు",
];

const EDUCATION: &[&str] = &[
    "education", "course", " book", "school", "college", "tuition", " class", "study",
    // Hindi
    "पढ़ाई", "किताब", "स्कूल", "कॉलेज",
    // Tamil
    "கல்வி", "புத்தகம்", "பள்ளி",
    // Telugu
    "చదువు", "పుస్తకం", "పాఠశాల",
];

const UTILITIES: &[&str] = &[
    "electricity", "water", " gas ", "internet", "phone", " bill", "utility", " rent",
    "recharge", "wifi",
    // Hindi
    "बिजली", "पानी", "गैस", "इंटरनेट", "किराया",
    // Tamil
    "மின்சாரம்", "தண்ணீர்", "வாடகை",
    // Telugu
    "విద్యుత్", "నీరు", "అద్దె",
];

/// Lower-case, turn ASCII punctuation into spaces, collapse whitespace, and
/// pad with one space on each side
pub fn normalize(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    format!(" {} ", collapsed)
}

/// Classify free text into a category (first match in declaration order)
pub fn classify(text: &str) -> CategoryTag {
    matched_keyword(text)
        .map(|(category, _)| category)
        .unwrap_or(CategoryTag::Other)
}

/// The category and the keyword that decided it, if any keyword matched
pub fn matched_keyword(text: &str) -> Option<(CategoryTag, &'static str)> {
    let normalized = normalize(text);
    KEYWORDS.iter().find_map(|(category, keywords)| {
        keywords
            .iter()
            .copied()
            .find(|kw| normalized.contains(kw))
            .map(|kw| (*category, kw.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Paid $5.50, for LUNCH!"), " paid 5 50 for lunch ");
        assert_eq!(normalize("   "), "  ");
    }

    #[test]
    fn test_classify_english() {
        assert_eq!(classify("500 rupees for lunch yesterday"), CategoryTag::Food);
        assert_eq!(classify("Movie tickets 300"), CategoryTag::Entertainment);
        assert_eq!(classify("uber to the airport"), CategoryTag::Travel);
        assert_eq!(classify("weekly groceries"), CategoryTag::Necessities);
        assert_eq!(classify("car loan EMI 12000"), CategoryTag::Loans);
        assert_eq!(classify("pharmacy 240"), CategoryTag::Healthcare);
        assert_eq!(classify("college tuition"), CategoryTag::Education);
        assert_eq!(classify("electricity bill 1800"), CategoryTag::Utilities);
    }

    #[test]
    fn test_classify_other_when_no_match() {
        assert_eq!(classify("gave 200 to a friend"), CategoryTag::Other);
        assert_eq!(classify(""), CategoryTag::Other);
    }

    #[test]
    fn test_first_match_wins_in_declaration_order() {
        // "dinner" (Food) and "movie" (Entertainment) both match
        assert_eq!(classify("dinner and a movie"), CategoryTag::Food);
        // "hotel" (Travel) beats "internet" (Utilities)
        assert_eq!(classify("hotel internet charge"), CategoryTag::Travel);
    }

    #[test]
    fn test_short_keywords_match_whole_words_only() {
        // "emi" inside "premium" must not classify as Loans
        assert_eq!(classify("premium membership"), CategoryTag::Other);
        // "rice" inside "price" must not classify as Food
        assert_eq!(classify("price of ticket"), CategoryTag::Other);
        assert_eq!(classify("paid emi today"), CategoryTag::Loans);
        assert_eq!(classify("bus fare 40"), CategoryTag::Travel);
    }

    #[test]
    fn test_classify_indic_scripts() {
        assert_eq!(classify("खाना 200 रुपये"), CategoryTag::Food);
        assert_eq!(classify("बिजली का बिल"), CategoryTag::Utilities);
        assert_eq!(classify("சினிமா 150"), CategoryTag::Entertainment);
        assert_eq!(classify("ఆసుపత్రి 900"), CategoryTag::Healthcare);
        assert_eq!(classify("ಊಟ 120"), CategoryTag::Food);
        assert_eq!(classify("ভাত 60"), CategoryTag::Food);
    }

    #[test]
    fn test_matched_keyword() {
        assert_eq!(
            matched_keyword("Paid EMI"),
            Some((CategoryTag::Loans, "emi"))
        );
        assert_eq!(matched_keyword("nothing here"), None);
    }
}
