use super::patterns::{BIRTH_DATE, LETTER_RUN, NON_NAME_CHARS, UPPERCASE_NAME_LINE};

/// A single name-locating strategy over the significant lines of a card.
pub(crate) type NameHeuristic = fn(&[&str]) -> Option<String>;

/// Tried in order; the first strategy that yields a candidate wins.
pub(crate) const NAME_HEURISTICS: &[NameHeuristic] =
    &[name_before_birth_marker, name_after_government_header];

pub(crate) fn extract_name(text: &str) -> Option<String> {
    let lines = significant_lines(text);

    NAME_HEURISTICS
        .iter()
        .find_map(|heuristic| heuristic(&lines))
        .and_then(|candidate| clean_name(&candidate))
}

/// Trimmed lines longer than two characters; shorter lines are OCR debris.
pub(crate) fn significant_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| line.chars().count() > 2)
        .collect()
}

/// The holder's name is printed just above the date-of-birth line.
pub(crate) fn name_before_birth_marker(lines: &[&str]) -> Option<String> {
    let marker = lines.iter().position(|line| is_birth_marker(line))?;

    lines[..marker]
        .iter()
        .rev()
        .take(2)
        .find(|line| LETTER_RUN.is_match(line))
        .map(|line| line.to_string())
}

/// Front side layout: an all-caps name follows the "Government of India" banner.
pub(crate) fn name_after_government_header(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_government_header(line))
        .filter_map(|(index, _)| {
            lines
                .get(index + 1)
                .copied()
                .filter(|candidate| is_uppercase_name(candidate))
                .or_else(|| {
                    lines.get(index + 2).copied().filter(|candidate| {
                        is_uppercase_name(candidate)
                            && !candidate.chars().any(|ch| ch.is_ascii_digit())
                    })
                })
        })
        .last()
        .map(str::to_string)
}

fn is_birth_marker(line: &str) -> bool {
    let lowered = line.to_lowercase();
    lowered.contains("dob") || lowered.contains("year of birth") || BIRTH_DATE.is_match(line)
}

fn is_government_header(line: &str) -> bool {
    let lowered = line.to_lowercase();
    lowered.contains("government of india") || lowered.contains("govt of india")
}

fn is_uppercase_name(line: &str) -> bool {
    UPPERCASE_NAME_LINE.is_match(line) && line.chars().count() > 3
}

fn clean_name(candidate: &str) -> Option<String> {
    let cleaned = NON_NAME_CHARS.replace_all(candidate, "");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
