use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::intake::domain::{
    ApplicationId, ApplicationRecord, ApplicationSubmission, ApplicationType, DeclaredDetails,
    DocumentSlots, FileRef, RecognizedText, StoredApplication,
};
use crate::intake::recognizer::{RecognitionError, TextRecognizer};
use crate::intake::repository::{
    ApplicationRepository, CardArtifact, CardRenderer, FileStore, FileStoreError, RenderError,
    RepositoryError,
};
use crate::intake::service::IntakeService;
use crate::intake::verification::{DocumentVerifier, VerificationMode};

pub(super) const AADHAAR_TEXT: &str = "RAVI KUMAR\nDOB 01/01/1990\n1234 5678 9012\nMALE";
pub(super) const PAN_TEXT: &str = "INCOME TAX DEPARTMENT\nRAVI KUMAR\nABCDE1234F";
pub(super) const BLURRY_TEXT: &str = "~~ ## ~~\n..";

/// Treats uploads as pre-transcribed UTF-8 text.
pub(super) struct TranscriptRecognizer;

impl TextRecognizer for TranscriptRecognizer {
    fn recognize(&self, image: &[u8]) -> Result<RecognizedText, RecognitionError> {
        let text = std::str::from_utf8(image)
            .map_err(|err| RecognitionError::Processing(err.to_string()))?;
        Ok(RecognizedText {
            text: text.to_string(),
            confidence: 91.5,
        })
    }
}

pub(super) struct OfflineRecognizer;

impl TextRecognizer for OfflineRecognizer {
    fn recognize(&self, _image: &[u8]) -> Result<RecognizedText, RecognitionError> {
        Err(RecognitionError::Unavailable("engine offline".to_string()))
    }
}

pub(super) fn verifier(mode: VerificationMode) -> DocumentVerifier {
    DocumentVerifier::new(Arc::new(TranscriptRecognizer), mode)
}

#[derive(Default)]
pub(super) struct MemoryFileStore {
    files: Mutex<HashMap<FileRef, Vec<u8>>>,
    removed: Mutex<Vec<FileRef>>,
}

impl MemoryFileStore {
    pub(super) fn put(&self, name: &str, contents: &str) -> FileRef {
        let file = FileRef(name.to_string());
        self.files
            .lock()
            .expect("file mutex poisoned")
            .insert(file.clone(), contents.as_bytes().to_vec());
        file
    }

    pub(super) fn contains(&self, file: &FileRef) -> bool {
        self.files
            .lock()
            .expect("file mutex poisoned")
            .contains_key(file)
    }

    pub(super) fn removed(&self) -> Vec<FileRef> {
        self.removed.lock().expect("file mutex poisoned").clone()
    }
}

impl FileStore for MemoryFileStore {
    fn read(&self, file: &FileRef) -> Result<Vec<u8>, FileStoreError> {
        self.files
            .lock()
            .expect("file mutex poisoned")
            .get(file)
            .cloned()
            .ok_or_else(|| FileStoreError::NotFound(file.0.clone()))
    }

    fn remove(&self, file: &FileRef) -> Result<(), FileStoreError> {
        let existed = self
            .files
            .lock()
            .expect("file mutex poisoned")
            .remove(file)
            .is_some();
        if !existed {
            return Err(FileStoreError::NotFound(file.0.clone()));
        }
        self.removed
            .lock()
            .expect("file mutex poisoned")
            .push(file.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<StoredApplication>>,
}

pub(super) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

impl MemoryRepository {
    pub(super) fn seed(&self, application: StoredApplication) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .push(application);
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<StoredApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let sequence = guard.len() as i64 + 1;
        let stored = StoredApplication {
            id: ApplicationId(format!("app-{sequence:06}")),
            created_at: epoch() + Duration::minutes(sequence),
            record,
        };
        guard.push(stored.clone());
        Ok(stored)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|stored| &stored.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<StoredApplication>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .clone())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<StoredApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<StoredApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct SummaryRenderer;

impl CardRenderer for SummaryRenderer {
    fn render(&self, application: &StoredApplication) -> Result<CardArtifact, RenderError> {
        Ok(CardArtifact {
            content_type: "text/plain; charset=utf-8".to_string(),
            file_extension: "txt".to_string(),
            bytes: application.record.unique_code.clone().into_bytes(),
        })
    }
}

pub(super) fn declared(full_name: &str) -> DeclaredDetails {
    DeclaredDetails {
        full_name: full_name.to_string(),
        email: "ravi@example.in".to_string(),
        mobile: "9876543210".to_string(),
        city: "Pune".to_string(),
        state: "Maharashtra".to_string(),
        gender: None,
        id_number: None,
    }
}

pub(super) fn submission(
    full_name: &str,
    documents: DocumentSlots,
    application_type: ApplicationType,
) -> ApplicationSubmission {
    ApplicationSubmission {
        personal_details: declared(full_name),
        documents,
        application_type,
        referral_code: None,
    }
}

/// Aadhaar, PAN and photo uploads holding the standard sample transcripts.
pub(super) fn upload_all(files: &MemoryFileStore) -> DocumentSlots {
    DocumentSlots {
        aadhaar: Some(files.put("uploads/aadhaar.jpg", AADHAAR_TEXT)),
        pan: Some(files.put("uploads/pan.jpg", PAN_TEXT)),
        photo: Some(files.put("uploads/photo.jpg", "portrait")),
    }
}

pub(super) type MemoryService = IntakeService<MemoryRepository, MemoryFileStore>;

pub(super) fn build_service(
    mode: VerificationMode,
) -> (MemoryService, Arc<MemoryRepository>, Arc<MemoryFileStore>) {
    let repository = Arc::new(MemoryRepository::default());
    let files = Arc::new(MemoryFileStore::default());
    let service = IntakeService::new(
        repository.clone(),
        files.clone(),
        verifier(mode),
        Arc::new(SummaryRenderer),
    );
    (service, repository, files)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
