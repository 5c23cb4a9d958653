use serde::{Deserialize, Serialize};

use crate::models::{CertificationType, ComponentDetails, QuantitativeDetails};

// ═══════════════════════════════════════════════════════════
// Merged extraction
// ═══════════════════════════════════════════════════════════

/// Canonical field set computed from all of a project's extraction records.
/// Derived on demand, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedExtraction {
    pub owner_name: Option<String>,
    pub address: Option<String>,
    pub jurisdiction: Option<String>,
    pub permit_number: Option<String>,
    pub issue_date: Option<String>,
    pub contractor: Option<String>,
    pub subdivision: Option<String>,
    pub lot: Option<String>,
    pub block: Option<String>,
    pub scope_of_work: Option<String>,
    pub detected_product_ids: Vec<String>,
    pub quantitative: QuantitativeDetails,
    pub components: ComponentDetails,
    pub source_count: usize,
}

// ═══════════════════════════════════════════════════════════
// Narrative payload & preview
// ═══════════════════════════════════════════════════════════

/// Everything the narrative model is given for one certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativePayload {
    pub certification_type: CertificationType,
    pub certificate_title: String,
    pub company_name: String,
    pub company_contact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_number: Option<String>,
    pub owner_name: String,
    pub site_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit_issue_date: Option<String>,
    pub contractor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdivision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    pub scope_of_work: String,
    pub inspected_products: Vec<String>,
    pub quantitative_details: QuantitativeDetails,
    pub component_details: ComponentDetails,
    pub completed_tasks: Vec<String>,
    pub building_code: String,
    pub code_year: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_changes: Vec<String>,
}

/// Structured fields shown to a reviewer before the final document is
/// generated. A reviewer may edit them and pass them back to `generate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificationPreview {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_contact: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub site_address: String,
    #[serde(default)]
    pub contractor: String,
    #[serde(default)]
    pub scope_of_work: String,
    #[serde(default)]
    pub inspected_products: Vec<String>,
    #[serde(default)]
    pub building_code: String,
    #[serde(default)]
    pub code_year: String,
    #[serde(default)]
    pub field_changes: Option<String>,
}

/// Preview fields plus the name the document would be stored under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewResult {
    pub project_id: String,
    pub certification_type: CertificationType,
    pub next_version: u32,
    pub file_name: String,
    pub fields: CertificationPreview,
}

// ═══════════════════════════════════════════════════════════
// Generation request / outcome
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationRequest {
    pub project_id: String,
    pub certification_type: CertificationType,
    #[serde(default)]
    pub field_changes: Option<String>,
    #[serde(default)]
    pub preview: Option<CertificationPreview>,
    #[serde(default)]
    pub submitted_by: Option<String>,
}

impl GenerationRequest {
    pub fn new(project_id: impl Into<String>, certification_type: CertificationType) -> Self {
        Self {
            project_id: project_id.into(),
            certification_type,
            field_changes: None,
            preview: None,
            submitted_by: None,
        }
    }

    pub fn with_field_changes(mut self, text: impl Into<String>) -> Self {
        self.field_changes = Some(text.into());
        self
    }

    pub fn with_preview(mut self, preview: CertificationPreview) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn submitted_by(mut self, who: impl Into<String>) -> Self {
        self.submitted_by = Some(who.into());
        self
    }

    /// Field-change text that should be recorded and narrated, if any.
    /// Only as-built requests carry field changes.
    pub fn effective_field_changes(&self) -> Option<&str> {
        if !self.certification_type.includes_field_changes() {
            return None;
        }
        self.field_changes
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOutcome {
    pub project_id: String,
    pub certification_type: CertificationType,
    pub url: String,
    pub file_key: String,
    pub file_name: String,
    pub version: u32,
    pub artifact_id: String,
    pub page_count: usize,
}

// ═══════════════════════════════════════════════════════════
// Batch
// ═══════════════════════════════════════════════════════════

/// Outcome for one project in a batch; exactly one of `url`/`error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItemResult {
    pub project_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn succeeded(project_id: &str, url: String) -> Self {
        Self {
            project_id: project_id.to_string(),
            success: true,
            url: Some(url),
            error: None,
        }
    }

    pub fn failed(project_id: &str, error: String) -> Self {
        Self {
            project_id: project_id.to_string(),
            success: false,
            url: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchGenerationResult {
    pub certification_type: CertificationType,
    pub results: Vec<BatchItemResult>,
    pub succeeded: u32,
    pub total: u32,
    pub duration_ms: u64,
}

impl BatchGenerationResult {
    /// "Generated N of M successfully"
    pub fn summary(&self) -> String {
        format!("Generated {} of {} successfully", self.succeeded, self.total)
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchProgressEvent {
    Started { total: u32 },
    Progress { completed: u32, total: u32, project_id: String },
    Completed { succeeded: u32, total: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_changes_ignored_for_as_permitted() {
        let req = GenerationRequest::new("p1", CertificationType::AsPermitted)
            .with_field_changes("Relocated panel");
        assert_eq!(req.effective_field_changes(), None);
    }

    #[test]
    fn blank_field_changes_ignored() {
        let req = GenerationRequest::new("p1", CertificationType::AsBuilt).with_field_changes("  \n ");
        assert_eq!(req.effective_field_changes(), None);

        let req = GenerationRequest::new("p1", CertificationType::AsBuilt).with_field_changes(" Relocated panel ");
        assert_eq!(req.effective_field_changes(), Some("Relocated panel"));
    }

    #[test]
    fn batch_item_serializes_only_relevant_field() {
        let ok = serde_json::to_value(BatchItemResult::succeeded("p1", "https://x/y.pdf".into())).unwrap();
        assert_eq!(ok["success"], true);
        assert!(ok.get("error").is_none());

        let bad = serde_json::to_value(BatchItemResult::failed("p2", "Project not found: p2".into())).unwrap();
        assert_eq!(bad["success"], false);
        assert!(bad.get("url").is_none());
    }

    #[test]
    fn summary_reports_counts() {
        let result = BatchGenerationResult {
            certification_type: CertificationType::AsPermitted,
            results: vec![],
            succeeded: 2,
            total: 3,
            duration_ms: 0,
        };
        assert_eq!(result.summary(), "Generated 2 of 3 successfully");
    }

    #[test]
    fn preview_rejects_unknown_fields() {
        let err = serde_json::from_str::<CertificationPreview>(r#"{"owner_name":"A","wind_zone":"3"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn request_deserializes_from_json() {
        let req: GenerationRequest = serde_json::from_str(
            r#"{"project_id":"p1","certification_type":"as_built","field_changes":"Moved vent"}"#,
        ).unwrap();
        assert_eq!(req.certification_type, CertificationType::AsBuilt);
        assert_eq!(req.effective_field_changes(), Some("Moved vent"));
    }
}
