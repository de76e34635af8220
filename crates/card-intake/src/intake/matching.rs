use super::domain::MatchResult;

/// Words shorter than this are initials or particles and never decide a match.
const MIN_SIGNIFICANT_LEN: usize = 3;

/// Lenient name check: any significant declared word found inside the document name passes.
///
/// Substring matching tolerates OCR noise and reordered names. A declared name
/// with no significant words passes vacuously.
pub fn match_identity(entered_name: &str, document_name: &str) -> MatchResult {
    let entered_normalized = normalize_name(entered_name);
    let document_normalized = normalize_name(document_name);

    let is_match = {
        let mut significant = entered_normalized
            .split(' ')
            .filter(|word| word.chars().count() >= MIN_SIGNIFICANT_LEN)
            .peekable();

        significant.peek().is_none() || significant.any(|word| document_normalized.contains(word))
    };

    MatchResult {
        is_match,
        entered_normalized,
        document_normalized,
    }
}

/// Lowercase, periods to spaces, whitespace collapsed.
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase()
        .replace('.', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
