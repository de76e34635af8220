use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{DocumentType, DocumentVerification, ExtractedFields};
use super::extraction::extract_fields;
use super::extraction::patterns::PAN_NUMBER;
use super::recognizer::TextRecognizer;

/// How a document without positive keyword evidence is judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    /// Accept the document anyway so OCR noise does not reject genuine cards.
    #[default]
    Relaxed,
    /// Require a keyword or id-number match.
    Strict,
}

/// Runs recognition and extraction for one document and decides whether it passes.
pub struct DocumentVerifier {
    recognizer: Arc<dyn TextRecognizer>,
    mode: VerificationMode,
}

impl DocumentVerifier {
    pub fn new(recognizer: Arc<dyn TextRecognizer>, mode: VerificationMode) -> Self {
        Self { recognizer, mode }
    }

    pub fn mode(&self) -> VerificationMode {
        self.mode
    }

    /// Recognize and verify an uploaded image. Recognizer failures fail closed.
    pub fn verify_image(&self, image: &[u8], document_type: DocumentType) -> DocumentVerification {
        match self.recognizer.recognize(image) {
            Ok(recognized) => {
                debug!(
                    document = document_type.label(),
                    confidence = recognized.confidence,
                    chars = recognized.text.len(),
                    "text recognized"
                );
                self.verify_text(&recognized.text, document_type)
            }
            Err(error) => {
                warn!(document = document_type.label(), %error, "text recognition failed");
                DocumentVerification::failed(document_type)
            }
        }
    }

    /// Verify already-recognized text.
    pub fn verify_text(&self, text: &str, document_type: DocumentType) -> DocumentVerification {
        let extracted = extract_fields(text, document_type);
        let lowered = text.to_lowercase();

        let has_evidence = match document_type {
            DocumentType::Aadhaar => has_aadhaar_evidence(&lowered, &extracted),
            DocumentType::Pan => has_pan_evidence(&lowered),
        };

        if document_type == DocumentType::Aadhaar {
            info!(
                id_number = extracted.id_number.as_deref().unwrap_or("-"),
                name = extracted.name.as_deref().unwrap_or("-"),
                "aadhaar fields extracted"
            );
        }

        let is_verified = if has_evidence {
            true
        } else {
            match self.mode {
                VerificationMode::Relaxed => {
                    warn!(
                        document = document_type.label(),
                        "document keywords missing, accepted under relaxed verification"
                    );
                    true
                }
                VerificationMode::Strict => false,
            }
        };

        DocumentVerification {
            document_type,
            is_verified,
            extracted,
        }
    }
}

fn has_aadhaar_evidence(lowered: &str, extracted: &ExtractedFields) -> bool {
    lowered.contains("government of india")
        || lowered.contains("aadhaar")
        || extracted.id_number.is_some()
}

fn has_pan_evidence(lowered: &str) -> bool {
    lowered.contains("income tax")
        || lowered.contains("permanent account number")
        || PAN_NUMBER.is_match(lowered)
}
