//! Identity-document intake: OCR field extraction, per-document verification,
//! name cross-checks, and assembly of the application record.
//!
//! Raw text flows recognizer -> [`extraction`] -> [`verification`] -> [`assembler`],
//! with [`matching`] and [`policy`] consulted during assembly. [`service`] wires
//! the pipeline to its collaborators and [`router`] exposes it over HTTP.

pub mod assembler;
pub mod domain;
pub mod extraction;
pub mod matching;
pub mod policy;
pub mod recognizer;
pub mod repository;
pub mod router;
pub mod service;
pub mod verification;

#[cfg(test)]
mod tests;

pub use assembler::{assemble, unique_code, AssemblyError};
pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, ApplicationSubmission, ApplicationType,
    DeclaredDetails, DocumentSlots, DocumentType, DocumentVerification, DocumentVerifications,
    ExtractedFields, FileRef, Gender, MatchResult, PaymentStatus, PersonalDetails,
    RecognizedText, StoredApplication, VerificationDetails, VerificationStatus,
    PENDING_ID_NUMBER,
};
pub use extraction::extract_fields;
pub use matching::match_identity;
pub use policy::{resolve_status, StatusOutcome};
pub use recognizer::{RecognitionError, TextRecognizer};
pub use repository::{
    ApplicationRepository, CardArtifact, CardRenderer, FileStore, FileStoreError, RenderError,
    RepositoryError,
};
pub use router::intake_router;
pub use service::{IntakeError, IntakeService, SubmissionReceipt};
pub use verification::{DocumentVerifier, VerificationMode};
