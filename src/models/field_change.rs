use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-text note describing a deviation found in the field.
/// Append-only: created with an as-built request, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldChangeNote {
    pub id: String,
    pub project_id: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}
