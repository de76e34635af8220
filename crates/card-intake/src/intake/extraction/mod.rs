//! Heuristic field extraction over recognized identity-document text.
//!
//! Extraction never fails: a field that cannot be located is left as `None`.

mod name;
pub(crate) mod patterns;

use super::domain::{DocumentType, ExtractedFields, Gender};
use patterns::{AADHAAR_NUMBER, FEMALE_MARKER, ID_SEPARATOR, MALE_MARKER};

pub fn extract_fields(text: &str, document_type: DocumentType) -> ExtractedFields {
    match document_type {
        DocumentType::Aadhaar => ExtractedFields {
            id_number: extract_aadhaar_number(text),
            gender: extract_gender(text),
            name: name::extract_name(text),
        },
        DocumentType::Pan => ExtractedFields::default(),
    }
}

/// First 4+4+4 digit group, separators normalized to single spaces.
pub fn extract_aadhaar_number(text: &str) -> Option<String> {
    AADHAAR_NUMBER
        .find(text)
        .map(|found| ID_SEPARATOR.replace_all(found.as_str(), " ").into_owned())
}

/// "female" contains "male", so the female markers are checked first.
pub fn extract_gender(text: &str) -> Option<Gender> {
    if FEMALE_MARKER.is_match(text) {
        Some(Gender::Female)
    } else if MALE_MARKER.is_match(text) {
        Some(Gender::Male)
    } else {
        None
    }
}
