use once_cell::sync::Lazy;
use regex::Regex;

/// Twelve digits in groups of four on a single line, never a slice of a
/// longer digit run. Word boundaries are ASCII so Devanagari labels glued to
/// the digits do not hide the number.
pub(crate) static AADHAAR_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)[0-9]{4}[ \t-]?[0-9]{4}[ \t-]?[0-9]{4}(?-u:\b)")
        .expect("Aadhaar number regex should be valid")
});

pub(crate) static ID_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t-]").expect("separator regex should be valid"));

pub(crate) static FEMALE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)female|mahila").expect("female marker regex should be valid"));

pub(crate) static MALE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)male|purush").expect("male marker regex should be valid"));

pub(crate) static BIRTH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]{2}/[0-9]{2}/[0-9]{4}").expect("birth date regex should be valid")
});

pub(crate) static LETTER_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z]{3,}").expect("letter run regex should be valid"));

pub(crate) static UPPERCASE_NAME_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z\s.]+$").expect("uppercase name regex should be valid")
});

pub(crate) static NON_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z\s.]").expect("name cleanup regex should be valid"));

/// Canonical PAN shape, matched against lowercased text.
pub(crate) static PAN_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]{5}[0-9]{4}[a-z]").expect("PAN regex should be valid"));
