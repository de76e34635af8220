use std::sync::Arc;
use std::thread;

use serde::Serialize;
use tracing::{info, warn};

use super::assembler::{assemble, AssemblyError};
use super::domain::{
    ApplicationId, ApplicationSubmission, DocumentSlots, DocumentType, DocumentVerification,
    DocumentVerifications, FileRef, PaymentStatus, StoredApplication, VerificationDetails,
    VerificationStatus,
};
use super::repository::{
    ApplicationRepository, CardArtifact, CardRenderer, FileStore, RenderError, RepositoryError,
};
use super::verification::DocumentVerifier;

/// Service composing the verifier, assembler, repository and file store.
pub struct IntakeService<R, F> {
    repository: Arc<R>,
    files: Arc<F>,
    verifier: Arc<DocumentVerifier>,
    renderer: Arc<dyn CardRenderer>,
}

/// Result of an accepted submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub application: StoredApplication,
    pub verification_details: VerificationDetails,
}

impl<R, F> IntakeService<R, F>
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    pub fn new(
        repository: Arc<R>,
        files: Arc<F>,
        verifier: DocumentVerifier,
        renderer: Arc<dyn CardRenderer>,
    ) -> Self {
        Self {
            repository,
            files,
            verifier: Arc::new(verifier),
            renderer,
        }
    }

    /// Verify the uploaded documents, assemble the application and persist it.
    ///
    /// Uploaded files are released on every path that ends without a record,
    /// including unwinding. Once the record is assembled they belong to it.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<SubmissionReceipt, IntakeError> {
        let mut uploads = UploadGuard::new(self.files.as_ref(), submission.documents.uploaded());

        if let Some(field) = submission.personal_details.first_missing_field() {
            return Err(IntakeError::IncompleteSubmission { field });
        }

        let verifications = self.verify_uploads(&submission.documents);
        let verification_details = verifications.details();
        info!(
            has_documents = submission.documents.has_identity_documents(),
            aadhaar = verification_details.aadhaar,
            pan = verification_details.pan,
            "document verification complete"
        );

        let record = assemble(submission, &verifications).map_err(|error| {
            warn!(reason = error.title(), %error, "rejecting application");
            error
        })?;
        uploads.keep();

        let application = self.repository.insert(record)?;
        info!(
            application_id = %application.id.0,
            unique_code = %application.record.unique_code,
            status = ?application.record.status,
            "application stored"
        );

        Ok(SubmissionReceipt {
            application,
            verification_details,
        })
    }

    /// Fetch a stored application.
    pub fn get(&self, application_id: &ApplicationId) -> Result<StoredApplication, IntakeError> {
        let application = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    /// All applications, newest first.
    pub fn list(&self) -> Result<Vec<StoredApplication>, IntakeError> {
        let mut applications = self.repository.list()?;
        applications.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(applications)
    }

    /// Standalone extraction used to pre-fill the intake form. The uploaded file
    /// is temporary and always released afterwards.
    pub fn extract_document(
        &self,
        document: Option<FileRef>,
    ) -> Result<DocumentVerification, IntakeError> {
        let document = document.ok_or(IntakeError::MissingDocument)?;
        let _cleanup = UploadGuard::new(self.files.as_ref(), vec![document.clone()]);
        Ok(self.verify_upload(&document, DocumentType::Aadhaar))
    }

    /// Render the card for a paid application whose verification has not failed.
    pub fn download_card(&self, application_id: &ApplicationId) -> Result<CardArtifact, IntakeError> {
        let application = self.get(application_id)?;

        if application.record.payment_status != PaymentStatus::Paid {
            return Err(IntakeError::PaymentRequired);
        }
        if application.record.verification_status == VerificationStatus::Failed {
            return Err(IntakeError::VerificationFailed);
        }

        let artifact = self.renderer.render(&application)?;
        Ok(artifact)
    }

    /// Aadhaar and PAN are independent, so PAN is verified on a scoped worker
    /// while Aadhaar runs on the calling thread.
    fn verify_uploads(&self, documents: &DocumentSlots) -> DocumentVerifications {
        thread::scope(|scope| {
            let pan_worker = documents.pan.as_ref().map(|file| {
                scope.spawn(move || self.verify_upload(file, DocumentType::Pan))
            });

            let aadhaar = documents
                .aadhaar
                .as_ref()
                .map(|file| self.verify_upload(file, DocumentType::Aadhaar));

            let pan = pan_worker.map(|worker| {
                worker.join().unwrap_or_else(|_| {
                    warn!("pan verification worker panicked");
                    DocumentVerification::failed(DocumentType::Pan)
                })
            });

            DocumentVerifications { aadhaar, pan }
        })
    }

    fn verify_upload(&self, file: &FileRef, document_type: DocumentType) -> DocumentVerification {
        match self.files.read(file) {
            Ok(image) => self.verifier.verify_image(&image, document_type),
            Err(error) => {
                warn!(document = document_type.label(), file = %file.0, %error, "upload unreadable");
                DocumentVerification::failed(document_type)
            }
        }
    }
}

/// Releases uploaded files on drop unless told to keep them.
struct UploadGuard<'a, F: FileStore + ?Sized> {
    files: &'a F,
    uploads: Vec<FileRef>,
}

impl<'a, F: FileStore + ?Sized> UploadGuard<'a, F> {
    fn new(files: &'a F, uploads: Vec<FileRef>) -> Self {
        Self { files, uploads }
    }

    fn keep(&mut self) {
        self.uploads.clear();
    }
}

impl<F: FileStore + ?Sized> Drop for UploadGuard<'_, F> {
    fn drop(&mut self) {
        for file in self.uploads.drain(..) {
            if let Err(error) = self.files.remove(&file) {
                warn!(file = %file.0, %error, "failed to release upload");
            }
        }
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error("missing required field '{field}'")]
    IncompleteSubmission { field: &'static str },
    #[error("no document uploaded")]
    MissingDocument,
    #[error("payment required to download card")]
    PaymentRequired,
    #[error("verification failed, cannot generate card")]
    VerificationFailed,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
