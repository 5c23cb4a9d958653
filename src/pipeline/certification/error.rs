//! Error taxonomy for certificate generation.
//!
//! Inside one `generate` call any of these aborts the call; the batch
//! orchestrator converts each into a per-project failure entry instead.

use thiserror::Error;

use super::storage::StorageError;
use super::typeset::TypesetError;
use crate::db::DatabaseError;
use crate::pipeline::llm::LlmError;

#[derive(Error, Debug)]
pub enum CertificationError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Narrative generation failed: {0}")]
    GenerationFailed(String),

    #[error("Storage write failed: {0}")]
    StorageFailure(#[from] StorageError),

    #[error("Persistence failed: {0}")]
    PersistenceFailure(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Typesetting failed: {0}")]
    Typesetting(#[from] TypesetError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<LlmError> for CertificationError {
    fn from(e: LlmError) -> Self {
        CertificationError::GenerationFailed(e.to_string())
    }
}

impl CertificationError {
    pub fn project_not_found(id: &str) -> Self {
        CertificationError::NotFound {
            entity_type: "Project".into(),
            id: id.into(),
        }
    }

    /// Wraps a write-side database error.
    pub fn persistence(e: DatabaseError) -> Self {
        CertificationError::PersistenceFailure(e.to_string())
    }
}
