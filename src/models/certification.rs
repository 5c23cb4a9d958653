use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{CertificationType, ReviewStatus};

/// A generated certificate and its review-workflow state.
///
/// Rows start as `Generating` reservations holding only the version number;
/// file fields are filled when the deliverable is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationArtifact {
    pub id: String,
    pub project_id: String,
    pub certification_type: CertificationType,
    pub version: u32,
    pub file_name: Option<String>,
    pub file_key: Option<String>,
    pub file_url: Option<String>,
    pub content_sha256: Option<String>,
    pub review_status: ReviewStatus,
    pub submitted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// File details attached to a reserved artifact once its PDF is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverableRecord {
    pub file_name: String,
    pub file_key: String,
    pub file_url: String,
    pub content_sha256: String,
    pub submitted_by: Option<String>,
}
