use crate::intake::matching::{match_identity, normalize_name};

#[test]
fn declared_name_found_inside_longer_document_name() {
    let result = match_identity("Ravi Kumar", "RAVI KUMAR SHARMA");
    assert!(result.is_match);
    assert_eq!(result.entered_normalized, "ravi kumar");
    assert_eq!(result.document_normalized, "ravi kumar sharma");
}

#[test]
fn initials_only_pass_vacuously() {
    let result = match_identity("A. B.", "RAVI KUMAR");
    assert!(result.is_match);
    assert_eq!(result.entered_normalized, "a b");
}

#[test]
fn unrelated_names_do_not_match() {
    assert!(!match_identity("Suresh Singh", "RAVI KUMAR").is_match);
}

#[test]
fn one_shared_word_is_enough() {
    assert!(match_identity("Kumar Ravindra", "RAVI KUMAR").is_match);
}

#[test]
fn significant_words_match_as_substrings() {
    assert!(match_identity("Ravi", "RAVINDRA K.").is_match);
    assert!(!match_identity("Ravindra", "RAVI K.").is_match);
}

#[test]
fn normalization_collapses_periods_and_whitespace() {
    assert_eq!(normalize_name("  Dr.R.K.   Narayan \t"), "dr r k narayan");
    assert_eq!(normalize_name(""), "");
}
