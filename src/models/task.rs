use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::TaskStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskRecord {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub status: TaskStatus,
    pub completed_at: Option<DateTime<Utc>>,
}
