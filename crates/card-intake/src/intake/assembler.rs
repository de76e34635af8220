use super::domain::{
    ApplicationRecord, ApplicationSubmission, DocumentVerifications, Gender, PaymentStatus,
    PersonalDetails, VerificationDetails, PENDING_ID_NUMBER,
};
use super::matching::match_identity;
use super::policy::resolve_status;

/// Reasons a submission is turned away before any record exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error(
        "Name mismatch detected. The name '{entered}' does not match the name on your Aadhaar card ({document}). Please match the card details exactly."
    )]
    NameMismatch { entered: String, document: String },
    #[error(
        "The uploaded documents could not be verified. Please ensure you upload valid Aadhaar and PAN card images."
    )]
    DocumentInvalid { details: VerificationDetails },
}

impl AssemblyError {
    /// Short heading shown above the detailed message.
    pub fn title(&self) -> &'static str {
        match self {
            AssemblyError::NameMismatch { .. } => "Name Verification Failed",
            AssemblyError::DocumentInvalid { .. } => "Document Verification Failed",
        }
    }
}

/// Fold verification results and declared details into an application record.
///
/// Gates run in order: the name check against the Aadhaar card, then the
/// document validity check. Releasing uploaded files on rejection is the
/// caller's job.
pub fn assemble(
    submission: ApplicationSubmission,
    verifications: &DocumentVerifications,
) -> Result<ApplicationRecord, AssemblyError> {
    let ApplicationSubmission {
        personal_details: declared,
        documents,
        application_type,
        referral_code,
    } = submission;

    let aadhaar_fields = verifications
        .aadhaar
        .as_ref()
        .filter(|_| documents.aadhaar.is_some())
        .map(|result| result.extracted.clone())
        .unwrap_or_default();

    if let Some(document_name) = aadhaar_fields.name.as_deref() {
        if !match_identity(&declared.full_name, document_name).is_match {
            return Err(AssemblyError::NameMismatch {
                entered: declared.full_name,
                document: document_name.to_string(),
            });
        }
    }

    let has_documents = documents.has_identity_documents();
    let all_documents_valid = (documents.aadhaar.is_none() || verifications.aadhaar_verified())
        && (documents.pan.is_none() || verifications.pan_verified());

    if has_documents && !all_documents_valid {
        return Err(AssemblyError::DocumentInvalid {
            details: verifications.details(),
        });
    }

    let gender = declared
        .gender
        .or(aadhaar_fields.gender)
        .unwrap_or(Gender::Other);
    let id_number = declared
        .id_number
        .or(aadhaar_fields.id_number)
        .unwrap_or_else(|| PENDING_ID_NUMBER.to_string());

    let unique_code = unique_code(&declared.mobile, &id_number);
    let outcome = resolve_status(all_documents_valid, has_documents, application_type);

    Ok(ApplicationRecord {
        personal_details: PersonalDetails {
            full_name: declared.full_name,
            email: declared.email,
            mobile: declared.mobile,
            city: declared.city,
            state: declared.state,
            gender,
            id_number,
        },
        unique_code,
        documents,
        application_type,
        status: outcome.status,
        verification_status: outcome.verification_status,
        payment_status: PaymentStatus::Paid,
        referral_code,
    })
}

/// `M-<mobile last 4>-A-<id last 4>`, with `0000` standing in for anything too short.
pub fn unique_code(mobile: &str, id_number: &str) -> String {
    let mobile_digits: Vec<char> = mobile.chars().filter(char::is_ascii_digit).collect();
    let id_suffix = if id_number == PENDING_ID_NUMBER {
        FALLBACK_SUFFIX.to_string()
    } else {
        let compact: Vec<char> = id_number.chars().filter(|ch| !ch.is_whitespace()).collect();
        last_four(&compact)
    };

    format!("M-{}-A-{}", last_four(&mobile_digits), id_suffix)
}

const FALLBACK_SUFFIX: &str = "0000";

fn last_four(chars: &[char]) -> String {
    match chars.len().checked_sub(4) {
        Some(start) => chars[start..].iter().collect(),
        None => FALLBACK_SUFFIX.to_string(),
    }
}
