//! Parse preview command

use anyhow::Result;
use chrono::NaiveDateTime;
use tally_core::{matched_keyword, validate, ExpenseCandidate, ExpenseParser, ParseSource};

/// Parse `text` and print the candidate with its validation report
pub async fn cmd_parse(
    parser: &ExpenseParser,
    text: &str,
    now: NaiveDateTime,
    json: bool,
) -> Result<()> {
    let candidate = parser.parse_at(text, now).await;
    let report = validate(&candidate, now);
    let keyword = category_keyword(&candidate);

    if json {
        let out = serde_json::json!({
            "candidate": candidate,
            "validation": report,
            "matched_keyword": keyword,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let source = match candidate.source {
        ParseSource::Remote => "🤖 remote",
        ParseSource::Local => "📐 local rules",
    };

    println!();
    println!("🔎 Parsed Expense");
    println!("   ─────────────────────────────────────────────");
    println!(
        "   Amount:      {}",
        candidate.currency.format_minor(candidate.amount_minor)
    );
    match keyword {
        Some(kw) => println!("   Category:    {} (keyword '{}')", candidate.category, kw),
        None => println!("   Category:    {}", candidate.category),
    }
    println!("   Description: {}", candidate.description);
    println!("   Date:        {}", candidate.occurred_at.format("%Y-%m-%d %H:%M"));
    println!(
        "   Source:      {} ({:.0}% confidence)",
        source,
        candidate.confidence * 100.0
    );
    println!();

    if report.valid {
        println!("✅ Ready to save. Run 'tally add' with the same text.");
    } else {
        println!("❌ Not storable:");
        for error in &report.errors {
            println!("   - {}", error);
        }
    }

    Ok(())
}

/// Keyword behind a rule-based category; remote categories have none
pub fn category_keyword(candidate: &ExpenseCandidate) -> Option<&'static str> {
    match candidate.source {
        ParseSource::Local => matched_keyword(&candidate.source_text)
            .filter(|(category, _)| *category == candidate.category)
            .map(|(_, kw)| kw),
        ParseSource::Remote => None,
    }
}
