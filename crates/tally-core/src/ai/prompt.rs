//! Prompt for model-backed parse backends

use chrono::NaiveDate;

/// Build the expense extraction prompt sent to Gemini and Ollama
pub fn expense_prompt(text: &str, categories: &[&str], today: NaiveDate) -> String {
    format!(
        r#"You are an assistant that parses expense information from natural language text.
The text may be in English, Hindi, Tamil, Telugu, Kannada or Bengali.

Extract the following information from the text:
1. Amount (numeric value)
2. Category (must be one of: {categories})
3. Description (brief description of the expense)
4. Date (if mentioned, otherwise use today's date: {today})
5. Currency (ISO code such as INR, USD, EUR, GBP or JPY, only if the text names one)

Text: "{text}"

Respond ONLY with a valid JSON object in this exact format:
{{"amount": <number>, "category": "<category>", "description": "<brief description>", "date": "<YYYY-MM-DD>", "confidence": <number between 0 and 1>, "currency": "<code or null>"}}

Rules:
- Amount must be a positive number
- Category must be exactly one of the provided categories; use "Other" if unclear
- Confidence reflects how certain you are about the extraction
- Do not include any explanation, only the JSON object"#,
        categories = categories.join(", "),
        today = today.format("%Y-%m-%d"),
        text = text.replace('"', "'"),
    )
}
