use super::domain::RecognizedText;

/// Capability handle for the external text-recognition engine.
///
/// A recognizer is obtained once at startup and injected into the
/// [`DocumentVerifier`](super::verification::DocumentVerifier); nothing in the
/// pipeline reaches for a global engine.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &[u8]) -> Result<RecognizedText, RecognitionError>;
}

/// Failures raised by a recognizer. The verifier converts all of them into an
/// unverified document.
#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("text recognizer unavailable: {0}")]
    Unavailable(String),
    #[error("text recognition failed: {0}")]
    Processing(String),
}
