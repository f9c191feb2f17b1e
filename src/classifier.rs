//! Intent classifier
//!
//! Decides whether a query asks about affording a purchase, in which case the
//! reasoning engine runs a local simulation before consulting the advisor.
//! Matching is a plain case-insensitive substring scan.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryIntent {
    /// Carries the first integer found in the query, or 0.
    Affordability { amount: f64 },
    Open,
}

/// Static keyword list — zero allocation
const AFFORDABILITY_KEYWORDS: &[&str] = &["afford", "buy"];

pub struct IntentClassifier;

impl IntentClassifier {
    pub fn classify(query: &str) -> QueryIntent {
        if is_affordability_query(query) {
            QueryIntent::Affordability {
                amount: extract_amount(query).unwrap_or(0.0),
            }
        } else {
            QueryIntent::Open
        }
    }
}

pub fn is_affordability_query(query: &str) -> bool {
    let lower = query.to_lowercase();
    AFFORDABILITY_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// First run of ASCII digits in the text. Separators end the run, so
/// "40,000" reads as 40.
pub fn extract_amount(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = text[start..]
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or_default();

    digits.parse().ok()
}
