use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::CertificationType;

/// An inspection project as held by the project store.
///
/// The `certification_*` fields mirror the most recently generated artifact
/// and are overwritten by every new generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectRecord {
    pub id: String,
    pub project_number: Option<String>,
    pub address: Option<String>,
    pub owner_name: Option<String>,
    pub jurisdiction: Option<String>,
    pub permit_number: Option<String>,
    pub contractor: Option<String>,
    pub scope_of_work: Option<String>,
    pub customer_number: Option<String>,
    #[serde(default)]
    pub certification_type: Option<CertificationType>,
    #[serde(default)]
    pub certification_generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub certification_file_key: Option<String>,
    #[serde(default)]
    pub certification_file_url: Option<String>,
}

impl ProjectRecord {
    /// A project with only an id; everything else unset.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            project_number: None,
            address: None,
            owner_name: None,
            jurisdiction: None,
            permit_number: None,
            contractor: None,
            scope_of_work: None,
            customer_number: None,
            certification_type: None,
            certification_generated_at: None,
            certification_file_key: None,
            certification_file_url: None,
        }
    }
}

/// Values written back to a project after a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationStamp {
    pub certification_type: CertificationType,
    pub generated_at: DateTime<Utc>,
    pub file_key: String,
    pub file_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_fields() {
        let json = r#"{"id":"p1","project_number":null,"address":null,"owner_name":null,
            "jurisdiction":null,"permit_number":null,"contractor":null,"scope_of_work":null,
            "customer_number":null,"hoa_name":"Shady Acres"}"#;
        let err = serde_json::from_str::<ProjectRecord>(json).unwrap_err();
        assert!(err.to_string().contains("hoa_name"));
    }

    #[test]
    fn certification_fields_default_to_none() {
        let json = r#"{"id":"p1","project_number":"P-100","address":"1 Main St","owner_name":null,
            "jurisdiction":null,"permit_number":null,"contractor":null,"scope_of_work":null,
            "customer_number":null}"#;
        let project: ProjectRecord = serde_json::from_str(json).unwrap();
        assert_eq!(project.project_number.as_deref(), Some("P-100"));
        assert!(project.certification_type.is_none());
        assert!(project.certification_file_url.is_none());
    }
}
