//! Content Assembler — builds the narrative payload from project data and
//! calls the narrative model.
//!
//! Fill order for every descriptive field: merged extraction, then the
//! project table, then configured boilerplate.

use std::collections::HashMap;

use super::error::CertificationError;
use super::merge::backfill_from_project;
use super::prompt::{
    build_narrative_prompt, build_preview_prompt, preview_schema, CERTIFICATION_SYSTEM_PROMPT,
    PREVIEW_SYSTEM_PROMPT,
};
use super::types::{CertificationPreview, MergedExtraction, NarrativePayload};
use crate::config::CertificationConfig;
use crate::models::*;
use crate::pipeline::llm::LlmClient;

pub const NOT_PROVIDED: &str = "Not provided";

/// Everything known about a project at generation time.
pub struct ContentSources<'a> {
    pub project: &'a ProjectRecord,
    pub merged: &'a MergedExtraction,
    pub completed_tasks: &'a [TaskRecord],
    pub field_change_notes: &'a [FieldChangeNote],
    pub products: &'a [ProductRecord],
}

pub fn certificate_title(certification_type: CertificationType) -> String {
    format!("{} Certificate of Inspection", certification_type.title())
}

pub fn assemble_payload(
    sources: &ContentSources<'_>,
    certification_type: CertificationType,
    config: &CertificationConfig,
) -> NarrativePayload {
    let mut merged = sources.merged.clone();
    backfill_from_project(&mut merged, sources.project);

    let or_default = |value: Option<String>| value.unwrap_or_else(|| NOT_PROVIDED.to_string());

    let field_changes = if certification_type.includes_field_changes() {
        sources
            .field_change_notes
            .iter()
            .map(|n| n.note.trim())
            .filter(|n| !n.is_empty())
            .map(String::from)
            .collect()
    } else {
        Vec::new()
    };

    NarrativePayload {
        certification_type,
        certificate_title: certificate_title(certification_type),
        company_name: config.company_name.clone(),
        company_contact: config.company_contact.clone(),
        project_number: populated(&sources.project.project_number).map(String::from),
        owner_name: or_default(merged.owner_name),
        site_address: or_default(merged.address),
        jurisdiction: merged.jurisdiction,
        permit_number: merged.permit_number,
        permit_issue_date: merged.issue_date,
        contractor: or_default(merged.contractor),
        subdivision: merged.subdivision,
        lot: merged.lot,
        block: merged.block,
        scope_of_work: or_default(merged.scope_of_work),
        inspected_products: inspected_products(&merged.detected_product_ids, sources.products),
        quantitative_details: merged.quantitative,
        component_details: merged.components,
        completed_tasks: sources
            .completed_tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .map(|t| t.title.clone())
            .collect(),
        building_code: config.building_code.clone(),
        code_year: config.code_year.clone(),
        field_changes,
    }
}

/// Product listing sorted by display name. Ids missing from the catalog are
/// listed as-is.
pub fn inspected_products(product_ids: &[String], catalog: &[ProductRecord]) -> Vec<String> {
    let by_id: HashMap<&str, &ProductRecord> =
        catalog.iter().map(|p| (p.id.as_str(), p)).collect();
    let mut listing: Vec<String> = product_ids
        .iter()
        .map(|id| match by_id.get(id.as_str()) {
            Some(product) => product.display_name(),
            None => id.clone(),
        })
        .collect();
    listing.sort();
    listing.dedup();
    listing
}

/// Reviewer edits take precedence over assembled values; blank edits are ignored.
pub fn apply_preview(payload: &mut NarrativePayload, preview: &CertificationPreview) {
    overwrite(&mut payload.company_name, &preview.company_name);
    overwrite(&mut payload.company_contact, &preview.company_contact);
    overwrite(&mut payload.owner_name, &preview.owner_name);
    overwrite(&mut payload.site_address, &preview.site_address);
    overwrite(&mut payload.contractor, &preview.contractor);
    overwrite(&mut payload.scope_of_work, &preview.scope_of_work);
    overwrite(&mut payload.building_code, &preview.building_code);
    overwrite(&mut payload.code_year, &preview.code_year);

    let products: Vec<String> = preview
        .inspected_products
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    if !products.is_empty() {
        payload.inspected_products = products;
    }

    if payload.certification_type.includes_field_changes() {
        if let Some(text) = populated(&preview.field_changes) {
            if !payload.field_changes.iter().any(|c| c == text) {
                payload.field_changes.push(text.to_string());
            }
        }
    }
}

fn overwrite(slot: &mut String, candidate: &str) {
    let candidate = candidate.trim();
    if !candidate.is_empty() {
        *slot = candidate.to_string();
    }
}

/// The preview a reviewer would see if the model added nothing.
pub fn preview_from_payload(payload: &NarrativePayload) -> CertificationPreview {
    CertificationPreview {
        company_name: payload.company_name.clone(),
        company_contact: payload.company_contact.clone(),
        owner_name: payload.owner_name.clone(),
        site_address: payload.site_address.clone(),
        contractor: payload.contractor.clone(),
        scope_of_work: payload.scope_of_work.clone(),
        inspected_products: payload.inspected_products.clone(),
        building_code: payload.building_code.clone(),
        code_year: payload.code_year.clone(),
        field_changes: if payload.field_changes.is_empty() {
            None
        } else {
            Some(payload.field_changes.join("\n"))
        },
    }
}

/// Free-text narrative, returned exactly as the model produced it.
pub fn generate_narrative(
    llm: &dyn LlmClient,
    model: &str,
    payload: &NarrativePayload,
) -> Result<String, CertificationError> {
    let prompt = build_narrative_prompt(payload)
        .map_err(|e| CertificationError::InvalidInput(e.to_string()))?;
    let narrative = llm.generate(model, &prompt, CERTIFICATION_SYSTEM_PROMPT)?;

    if narrative.trim().is_empty() {
        return Err(CertificationError::GenerationFailed(
            "Narrative model returned no text".into(),
        ));
    }
    Ok(narrative)
}

/// Schema-constrained preview. Fields the model leaves blank are taken from
/// the assembled payload.
pub fn generate_preview(
    llm: &dyn LlmClient,
    model: &str,
    payload: &NarrativePayload,
) -> Result<CertificationPreview, CertificationError> {
    let prompt = build_preview_prompt(payload)
        .map_err(|e| CertificationError::InvalidInput(e.to_string()))?;
    let value = llm.generate_structured(model, &prompt, PREVIEW_SYSTEM_PROMPT, &preview_schema())?;

    if !value.is_object() {
        return Err(CertificationError::GenerationFailed(format!(
            "Preview model returned a non-object result: {value}"
        )));
    }
    let generated: CertificationPreview = serde_json::from_value(value)
        .map_err(|e| CertificationError::GenerationFailed(format!("Invalid preview fields: {e}")))?;

    let mut preview = preview_from_payload(payload);
    overwrite(&mut preview.company_name, &generated.company_name);
    overwrite(&mut preview.company_contact, &generated.company_contact);
    overwrite(&mut preview.owner_name, &generated.owner_name);
    overwrite(&mut preview.site_address, &generated.site_address);
    overwrite(&mut preview.contractor, &generated.contractor);
    overwrite(&mut preview.scope_of_work, &generated.scope_of_work);
    overwrite(&mut preview.building_code, &generated.building_code);
    overwrite(&mut preview.code_year, &generated.code_year);
    if !generated.inspected_products.is_empty() {
        preview.inspected_products = generated.inspected_products;
    }
    if payload.certification_type.includes_field_changes() {
        if let Some(text) = populated(&generated.field_changes) {
            preview.field_changes = Some(text.to_string());
        }
    } else {
        preview.field_changes = None;
    }
    Ok(preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BUILDING_CODE;
    use crate::pipeline::llm::{LlmError, MockLlmClient};
    use chrono::Utc;
    use serde_json::json;

    fn project() -> ProjectRecord {
        ProjectRecord {
            project_number: Some("P-1187".into()),
            address: Some("1420 Oak St".into()),
            owner_name: Some("Jordan Whitaker".into()),
            contractor: Some("Summit Roofing".into()),
            ..ProjectRecord::new("proj-1")
        }
    }

    fn note(text: &str) -> FieldChangeNote {
        FieldChangeNote {
            id: "n1".into(),
            project_id: "proj-1".into(),
            note: text.into(),
            created_at: Utc::now(),
        }
    }

    fn task(title: &str, status: TaskStatus) -> TaskRecord {
        TaskRecord {
            id: title.into(),
            project_id: "proj-1".into(),
            title: title.into(),
            status,
            completed_at: None,
        }
    }

    fn assemble(
        certification_type: CertificationType,
        merged: &MergedExtraction,
        notes: &[FieldChangeNote],
    ) -> NarrativePayload {
        let project = project();
        let tasks = vec![
            task("Final roof inspection", TaskStatus::Completed),
            task("Invoice", TaskStatus::Open),
        ];
        let sources = ContentSources {
            project: &project,
            merged,
            completed_tasks: &tasks,
            field_change_notes: notes,
            products: &[],
        };
        assemble_payload(&sources, certification_type, &CertificationConfig::default())
    }

    #[test]
    fn project_table_backfills_missing_extraction_fields() {
        let merged = MergedExtraction {
            owner_name: Some("J. Whitaker Trust".into()),
            ..Default::default()
        };
        let payload = assemble(CertificationType::AsPermitted, &merged, &[]);

        assert_eq!(payload.owner_name, "J. Whitaker Trust");
        assert_eq!(payload.site_address, "1420 Oak St");
        assert_eq!(payload.scope_of_work, NOT_PROVIDED);
        assert_eq!(payload.building_code, DEFAULT_BUILDING_CODE);
        assert_eq!(payload.project_number.as_deref(), Some("P-1187"));
        assert_eq!(payload.completed_tasks, vec!["Final roof inspection".to_string()]);
    }

    #[test]
    fn field_changes_only_for_as_built() {
        let notes = vec![note("Relocated attic vent")];
        let merged = MergedExtraction::default();

        let permitted = assemble(CertificationType::AsPermitted, &merged, &notes);
        assert!(permitted.field_changes.is_empty());

        let built = assemble(CertificationType::AsBuilt, &merged, &notes);
        assert_eq!(built.field_changes, vec!["Relocated attic vent".to_string()]);
        assert_eq!(built.certificate_title, "As-Built Certificate of Inspection");
    }

    #[test]
    fn product_listing_resolves_catalog_and_keeps_unknown_ids() {
        let catalog = vec![ProductRecord {
            id: "prd-1".into(),
            name: "Timberline HDZ".into(),
            manufacturer: Some("GAF".into()),
            approval_number: None,
        }];
        let listing = inspected_products(&["zz-unknown".into(), "prd-1".into()], &catalog);
        assert_eq!(listing, vec!["Timberline HDZ (GAF)".to_string(), "zz-unknown".to_string()]);
    }

    #[test]
    fn preview_overrides_non_blank_fields() {
        let mut payload = assemble(CertificationType::AsBuilt, &MergedExtraction::default(), &[]);
        let preview = CertificationPreview {
            owner_name: "Jordan A. Whitaker".into(),
            contractor: "   ".into(),
            field_changes: Some("Added gutter guards".into()),
            ..Default::default()
        };
        apply_preview(&mut payload, &preview);

        assert_eq!(payload.owner_name, "Jordan A. Whitaker");
        assert_eq!(payload.contractor, "Summit Roofing");
        assert_eq!(payload.field_changes, vec!["Added gutter guards".to_string()]);
    }

    #[test]
    fn narrative_returned_unmodified() {
        let payload = assemble(CertificationType::AsPermitted, &MergedExtraction::default(), &[]);
        let llm = MockLlmClient::new("  CERTIFICATE\n<b>Body</b>  ");
        let narrative = generate_narrative(&llm, "m", &payload).unwrap();
        assert_eq!(narrative, "  CERTIFICATE\n<b>Body</b>  ");
    }

    #[test]
    fn blank_narrative_is_generation_failure() {
        let payload = assemble(CertificationType::AsPermitted, &MergedExtraction::default(), &[]);
        let llm = MockLlmClient::new(" \n\t ");
        let err = generate_narrative(&llm, "m", &payload).unwrap_err();
        assert!(matches!(err, CertificationError::GenerationFailed(_)));
    }

    struct NonTextLlm;

    impl LlmClient for NonTextLlm {
        fn generate(&self, _: &str, _: &str, _: &str) -> Result<String, LlmError> {
            Err(LlmError::MalformedResponse("response was not a string".into()))
        }
        fn generate_structured(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: &serde_json::Value,
        ) -> Result<serde_json::Value, LlmError> {
            Ok(json!(["not", "an", "object"]))
        }
        fn is_model_available(&self, _: &str) -> Result<bool, LlmError> {
            Ok(true)
        }
        fn list_models(&self) -> Result<Vec<String>, LlmError> {
            Ok(vec![])
        }
    }

    #[test]
    fn non_text_results_are_generation_failures() {
        let payload = assemble(CertificationType::AsPermitted, &MergedExtraction::default(), &[]);
        assert!(matches!(
            generate_narrative(&NonTextLlm, "m", &payload),
            Err(CertificationError::GenerationFailed(_))
        ));
        assert!(matches!(
            generate_preview(&NonTextLlm, "m", &payload),
            Err(CertificationError::GenerationFailed(_))
        ));
    }

    #[test]
    fn preview_fills_blanks_from_payload() {
        let payload = assemble(CertificationType::AsPermitted, &MergedExtraction::default(), &[]);
        let llm = MockLlmClient::new("").with_structured(json!({
            "scope_of_work": "Tear-off and re-roof, 32 squares",
            "owner_name": "",
            "field_changes": "should be dropped"
        }));
        let preview = generate_preview(&llm, "m", &payload).unwrap();

        assert_eq!(preview.scope_of_work, "Tear-off and re-roof, 32 squares");
        assert_eq!(preview.owner_name, "Jordan Whitaker");
        assert_eq!(preview.code_year, "2021");
        assert_eq!(preview.field_changes, None);
    }

    #[test]
    fn preview_rejects_unknown_fields() {
        let payload = assemble(CertificationType::AsPermitted, &MergedExtraction::default(), &[]);
        let llm = MockLlmClient::new("").with_structured(json!({"hoa_name": "Shady Acres"}));
        assert!(matches!(
            generate_preview(&llm, "m", &payload),
            Err(CertificationError::GenerationFailed(_))
        ));
    }
}
