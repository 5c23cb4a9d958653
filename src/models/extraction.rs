use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured fields derived from one source document (permit, plan set, ...).
/// Immutable once stored; a project accumulates one per uploaded source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionRecord {
    pub id: String,
    pub project_id: String,
    pub source_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub fields: ExtractedFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractedFields {
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
}

/// Measured quantities pulled from plans and permits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuantitativeDetails {
    pub square_footage: Option<String>,
    pub number_of_stories: Option<String>,
    pub number_of_units: Option<String>,
    pub roof_squares: Option<String>,
    pub project_valuation: Option<String>,
}

/// Building components named in the source documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentDetails {
    pub roofing_material: Option<String>,
    pub underlayment: Option<String>,
    pub window_product: Option<String>,
    pub door_product: Option<String>,
    pub siding_material: Option<String>,
    pub insulation_type: Option<String>,
}

/// Treats whitespace-only strings as absent.
pub fn populated(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populated_ignores_blank_values() {
        assert_eq!(populated(&Some("  ".into())), None);
        assert_eq!(populated(&None), None);
        assert_eq!(populated(&Some(" Lot 4 ".into())), Some("Lot 4"));
    }

    #[test]
    fn partial_fields_deserialize_with_defaults() {
        let fields: ExtractedFields = serde_json::from_str(
            r#"{"permit_number":"BP-2291","quantitative":{"roof_squares":"32"}}"#,
        )
        .unwrap();
        assert_eq!(fields.permit_number.as_deref(), Some("BP-2291"));
        assert_eq!(fields.quantitative.roof_squares.as_deref(), Some("32"));
        assert!(fields.detected_product_ids.is_empty());
    }

    #[test]
    fn unknown_detail_field_rejected() {
        let result = serde_json::from_str::<ExtractedFields>(r#"{"components":{"paint":"red"}}"#);
        assert!(result.is_err());
    }
}
