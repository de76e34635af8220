use card_intake::intake::{
    ApplicationId, ApplicationRecord, ApplicationRepository, CardArtifact, CardRenderer, FileRef,
    FileStore, FileStoreError, RecognitionError, RecognizedText, RenderError, RepositoryError,
    StoredApplication, TextRecognizer,
};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<Vec<StoredApplication>>>,
    sequence: Arc<AtomicU64>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<StoredApplication, RepositoryError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let id = ApplicationId(format!("app-{sequence:06}"));

        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|stored| stored.id == id) {
            return Err(RepositoryError::Conflict);
        }
        let stored = StoredApplication {
            id,
            created_at: Utc::now(),
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
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.clone())
    }
}

/// Uploads stored as plain files below a root directory. File references are
/// paths relative to that root.
#[derive(Debug, Clone)]
pub(crate) struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, file: &FileRef) -> Result<PathBuf, FileStoreError> {
        let relative = Path::new(&file.0);
        let confined = !file.0.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if !confined {
            return Err(FileStoreError::InvalidReference(file.0.clone()));
        }
        Ok(self.root.join(relative))
    }
}

fn io_failure(file: &FileRef, path: &Path, source: std::io::Error) -> FileStoreError {
    if source.kind() == ErrorKind::NotFound {
        FileStoreError::NotFound(file.0.clone())
    } else {
        FileStoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl FileStore for LocalFileStore {
    fn read(&self, file: &FileRef) -> Result<Vec<u8>, FileStoreError> {
        let path = self.resolve(file)?;
        std::fs::read(&path).map_err(|source| io_failure(file, &path, source))
    }

    fn remove(&self, file: &FileRef) -> Result<(), FileStoreError> {
        let path = self.resolve(file)?;
        std::fs::remove_file(&path).map_err(|source| io_failure(file, &path, source))?;
        debug!(path = %path.display(), "upload removed");
        Ok(())
    }
}

/// Upload store kept in memory for demos.
#[derive(Default)]
pub(crate) struct InMemoryFileStore {
    files: Mutex<HashMap<FileRef, Vec<u8>>>,
}

impl InMemoryFileStore {
    pub(crate) fn put(&self, name: &str, contents: &[u8]) -> FileRef {
        let file = FileRef(name.to_string());
        self.files
            .lock()
            .expect("file store mutex poisoned")
            .insert(file.clone(), contents.to_vec());
        file
    }

    pub(crate) fn len(&self) -> usize {
        self.files.lock().expect("file store mutex poisoned").len()
    }
}

impl FileStore for InMemoryFileStore {
    fn read(&self, file: &FileRef) -> Result<Vec<u8>, FileStoreError> {
        self.files
            .lock()
            .expect("file store mutex poisoned")
            .get(file)
            .cloned()
            .ok_or_else(|| FileStoreError::NotFound(file.0.clone()))
    }

    fn remove(&self, file: &FileRef) -> Result<(), FileStoreError> {
        self.files
            .lock()
            .expect("file store mutex poisoned")
            .remove(file)
            .map(|_| ())
            .ok_or_else(|| FileStoreError::NotFound(file.0.clone()))
    }
}

/// Recognizer backed by the `tesseract` command line tool, fed over stdin.
#[derive(Debug, Clone)]
pub(crate) struct TesseractCliRecognizer {
    program: String,
    language: String,
}

impl TesseractCliRecognizer {
    pub(crate) fn new(language: impl Into<String>) -> Self {
        Self {
            program: "tesseract".to_string(),
            language: language.into(),
        }
    }

    #[cfg(test)]
    fn with_program(program: &str, language: &str) -> Self {
        Self {
            program: program.to_string(),
            language: language.to_string(),
        }
    }
}

impl TextRecognizer for TesseractCliRecognizer {
    fn recognize(&self, image: &[u8]) -> Result<RecognizedText, RecognitionError> {
        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => {
                    RecognitionError::Unavailable(format!("'{}' is not installed", self.program))
                }
                _ => RecognitionError::Processing(format!("failed to run {}: {err}", self.program)),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(image) {
                drop(stdin);
                // reap the child so a failed write never leaves a zombie behind
                let _ = child.kill();
                let _ = child.wait();
                return Err(RecognitionError::Processing(format!(
                    "failed to send image: {err}"
                )));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|err| RecognitionError::Processing(format!("failed to read output: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::Processing(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(RecognizedText {
            text: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            // the CLI does not report a page-level confidence
            confidence: 80.0,
        })
    }
}

/// Treats each upload as the text a recognizer would have produced for it.
pub(crate) struct TranscriptRecognizer;

impl TextRecognizer for TranscriptRecognizer {
    fn recognize(&self, image: &[u8]) -> Result<RecognizedText, RecognitionError> {
        let text = std::str::from_utf8(image)
            .map_err(|err| RecognitionError::Processing(format!("transcript is not utf-8: {err}")))?;
        Ok(RecognizedText {
            text: text.to_string(),
            confidence: 100.0,
        })
    }
}

/// Plain-text membership card.
pub(crate) struct TextCardRenderer;

impl CardRenderer for TextCardRenderer {
    fn render(&self, application: &StoredApplication) -> Result<CardArtifact, RenderError> {
        let record = &application.record;
        let details = &record.personal_details;
        let tier = serde_json::to_value(record.application_type)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .ok_or_else(|| RenderError::Failed("application type has no label".to_string()))?;

        let card = format!(
            "BHARAT PEAK MEMBERSHIP CARD\n\
             Name: {}\n\
             Card: {}\n\
             Tier: {}\n\
             City: {}, {}\n\
             Issued: {}\n",
            details.full_name,
            record.unique_code,
            tier,
            details.city,
            details.state,
            application.created_at.format("%d %b %Y"),
        );

        Ok(CardArtifact {
            content_type: "text/plain; charset=utf-8".to_string(),
            file_extension: "txt".to_string(),
            bytes: card.into_bytes(),
        })
    }
}
