use serde_json::{json, Value};

use super::types::NarrativePayload;

pub const CERTIFICATION_SYSTEM_PROMPT: &str = r#"
You are a building-inspection certification writer. Your ONLY role is to turn
the structured project facts you are given into the text of a formal
inspection certificate.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Use ONLY facts present in the supplied project data.
2. NEVER invent permit numbers, products, quantities, dates or code sections.
3. If a fact is missing, leave it out rather than guessing.
4. Write plain text. No Markdown, no HTML, no tables.
5. Put each section title on its own line.
"#;

pub const PREVIEW_SYSTEM_PROMPT: &str = r#"
You are a building-inspection certification assistant. Fill in the requested
JSON fields from the supplied project data only. Use an empty string for any
field you cannot fill. Output JSON only.
"#;

/// Section titles the narrative is asked to use, in order.
pub const NARRATIVE_SECTIONS: &[&str] = &[
    "Project Information",
    "Scope of Work",
    "Inspection Summary",
    "Inspected Products",
    "Field Changes",
    "Code Compliance",
    "Certification Statement",
];

/// Build the free-text narrative prompt for one certificate.
pub fn build_narrative_prompt(payload: &NarrativePayload) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string_pretty(payload)?;

    let sections: Vec<&str> = NARRATIVE_SECTIONS
        .iter()
        .copied()
        .filter(|s| *s != "Field Changes" || !payload.field_changes.is_empty())
        .collect();

    let field_change_note = if payload.field_changes.is_empty() {
        String::new()
    } else {
        format!(
            "\nThe following field changes were recorded during construction. \
             Reproduce each one verbatim under \"Field Changes\":\n{}\n",
            payload
                .field_changes
                .iter()
                .map(|c| format!("- {c}"))
                .collect::<Vec<_>>()
                .join("\n")
        )
    };

    Ok(format!(
        r#"<project>
{data}
</project>

Write the {title} for the project above, issued by {company}.
Begin with the line "{title}".
Then write these sections, each title on its own line:
{sections}
{field_change_note}
Close with a statement that the work was inspected for compliance with the
{code} ({year} edition), followed by the company contact line:
{contact}
"#,
        title = payload.certificate_title,
        company = payload.company_name,
        sections = sections.join("\n"),
        code = payload.building_code,
        year = payload.code_year,
        contact = payload.company_contact,
    ))
}

/// Preview prompt: same project data, structured answer.
pub fn build_preview_prompt(payload: &NarrativePayload) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string_pretty(payload)?;
    Ok(format!(
        r#"<project>
{data}
</project>

Fill in the preview fields for the {title}. "inspected_products" is a list of
product descriptions. "field_changes" is null when there are none.
"#,
        title = payload.certificate_title,
    ))
}

/// JSON schema the preview answer is constrained to.
pub fn preview_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "company_name": { "type": "string" },
            "company_contact": { "type": "string" },
            "owner_name": { "type": "string" },
            "site_address": { "type": "string" },
            "contractor": { "type": "string" },
            "scope_of_work": { "type": "string" },
            "inspected_products": { "type": "array", "items": { "type": "string" } },
            "building_code": { "type": "string" },
            "code_year": { "type": "string" },
            "field_changes": { "type": ["string", "null"] }
        },
        "required": [
            "company_name", "company_contact", "owner_name", "site_address",
            "contractor", "scope_of_work", "inspected_products",
            "building_code", "code_year"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CertificationType, ComponentDetails, QuantitativeDetails};

    fn payload() -> NarrativePayload {
        NarrativePayload {
            certification_type: CertificationType::AsBuilt,
            certificate_title: "As-Built Certificate of Inspection".into(),
            company_name: "Certified Building Inspections, LLC".into(),
            company_contact: "(555) 010-4400".into(),
            project_number: Some("P-1187".into()),
            owner_name: "Jordan Whitaker".into(),
            site_address: "1420 Oak St".into(),
            jurisdiction: None,
            permit_number: Some("BP-2291".into()),
            permit_issue_date: None,
            contractor: "Summit Roofing".into(),
            subdivision: None,
            lot: None,
            block: None,
            scope_of_work: "Full roof replacement".into(),
            inspected_products: vec!["Timberline HDZ".into()],
            quantitative_details: QuantitativeDetails::default(),
            component_details: ComponentDetails::default(),
            completed_tasks: vec!["Final roof inspection".into()],
            building_code: "International Building Code (IBC)".into(),
            code_year: "2021".into(),
            field_changes: vec![],
        }
    }

    #[test]
    fn narrative_prompt_embeds_project_data() {
        let prompt = build_narrative_prompt(&payload()).unwrap();
        assert!(prompt.contains("\"permit_number\": \"BP-2291\""));
        assert!(prompt.contains("Begin with the line \"As-Built Certificate of Inspection\""));
        assert!(prompt.contains("(2021 edition)"));
        assert!(!prompt.contains("Field Changes"));
    }

    #[test]
    fn narrative_prompt_carries_field_changes_verbatim() {
        let mut p = payload();
        p.field_changes = vec!["Relocated attic vent 4 ft north".into()];
        let prompt = build_narrative_prompt(&p).unwrap();
        assert!(prompt.contains("- Relocated attic vent 4 ft north"));
        assert!(prompt.contains("Field Changes"));
    }

    #[test]
    fn preview_schema_lists_every_field() {
        let schema = preview_schema();
        let props = schema["properties"].as_object().unwrap();
        assert_eq!(props.len(), 10);
        assert!(props.contains_key("inspected_products"));
        assert_eq!(schema["required"].as_array().unwrap().len(), 9);
    }
}
