use serde::{Deserialize, Serialize};

use super::domain::{ApplicationStatus, ApplicationType, VerificationStatus};

/// Statuses an application starts life with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutcome {
    pub verification_status: VerificationStatus,
    pub status: ApplicationStatus,
}

/// Initial status rules. Only free cards with passing documents are verified
/// outright; everything else waits in `Pending` for later manual transitions.
pub fn resolve_status(
    all_documents_valid: bool,
    has_documents: bool,
    application_type: ApplicationType,
) -> StatusOutcome {
    let verification_status = if has_documents && all_documents_valid {
        VerificationStatus::Passed
    } else {
        VerificationStatus::Pending
    };

    let status = if application_type == ApplicationType::Free
        && verification_status == VerificationStatus::Passed
    {
        ApplicationStatus::Verified
    } else {
        ApplicationStatus::Pending
    };

    StatusOutcome {
        verification_status,
        status,
    }
}
