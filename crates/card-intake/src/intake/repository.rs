use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationRecord, FileRef, StoredApplication};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// The store assigns the application id and creation timestamp on insert.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<StoredApplication, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<StoredApplication>, RepositoryError>;
    fn list(&self) -> Result<Vec<StoredApplication>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Holder of uploaded document files.
pub trait FileStore: Send + Sync {
    fn read(&self, file: &FileRef) -> Result<Vec<u8>, FileStoreError>;
    fn remove(&self, file: &FileRef) -> Result<(), FileStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("file '{0}' not found")]
    NotFound(String),
    #[error("file reference '{0}' escapes the upload directory")]
    InvalidReference(String),
    #[error("file '{path}' could not be accessed: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Produces the downloadable card artifact for a finished application.
pub trait CardRenderer: Send + Sync {
    fn render(&self, application: &StoredApplication) -> Result<CardArtifact, RenderError>;
}

/// Rendered card plus the metadata needed to serve it as a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardArtifact {
    pub content_type: String,
    pub file_extension: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("card rendering failed: {0}")]
    Failed(String),
}
