//! Extraction Merger — folds a project's per-source extraction records into
//! one `MergedExtraction`.
//!
//! Policies, applied in source-upload order:
//! - scalar fields: first populated value wins
//! - scope of work: every populated value, joined by a blank line
//! - quantitative / component details: last populated value wins per sub-field
//! - detected product ids: de-duplicated union
//!
//! Scalars and nested details follow different policies. Unifying them is an
//! open decision, so neither is changed here.

use std::collections::BTreeSet;

use super::types::MergedExtraction;
use crate::models::{
    populated, ComponentDetails, ExtractionRecord, ProjectRecord, QuantitativeDetails,
};

const SCOPE_SEPARATOR: &str = "\n\n";

/// Merge extraction records, which must already be in upload order.
pub fn merge_extractions(records: &[ExtractionRecord]) -> MergedExtraction {
    let mut merged = MergedExtraction {
        source_count: records.len(),
        ..Default::default()
    };
    let mut scopes: Vec<&str> = Vec::new();
    let mut products: BTreeSet<String> = BTreeSet::new();

    for record in records {
        let f = &record.fields;

        first_wins(&mut merged.owner_name, &f.owner_name);
        first_wins(&mut merged.address, &f.address);
        first_wins(&mut merged.jurisdiction, &f.jurisdiction);
        first_wins(&mut merged.permit_number, &f.permit_number);
        first_wins(&mut merged.issue_date, &f.issue_date);
        first_wins(&mut merged.contractor, &f.contractor);
        first_wins(&mut merged.subdivision, &f.subdivision);
        first_wins(&mut merged.lot, &f.lot);
        first_wins(&mut merged.block, &f.block);

        if let Some(scope) = populated(&f.scope_of_work) {
            scopes.push(scope);
        }

        products.extend(
            f.detected_product_ids
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty())
                .map(String::from),
        );

        overlay_quantitative(&mut merged.quantitative, &f.quantitative);
        overlay_components(&mut merged.components, &f.components);
    }

    if !scopes.is_empty() {
        merged.scope_of_work = Some(scopes.join(SCOPE_SEPARATOR));
    }
    merged.detected_product_ids = products.into_iter().collect();
    merged
}

/// Fill fields the extractions left empty from the project table.
/// A project without any extraction records is described by this alone.
pub fn backfill_from_project(merged: &mut MergedExtraction, project: &ProjectRecord) {
    first_wins(&mut merged.owner_name, &project.owner_name);
    first_wins(&mut merged.address, &project.address);
    first_wins(&mut merged.jurisdiction, &project.jurisdiction);
    first_wins(&mut merged.permit_number, &project.permit_number);
    first_wins(&mut merged.contractor, &project.contractor);
    first_wins(&mut merged.scope_of_work, &project.scope_of_work);
}

fn first_wins(slot: &mut Option<String>, candidate: &Option<String>) {
    if slot.is_some() {
        return;
    }
    if let Some(value) = populated(candidate) {
        *slot = Some(value.to_string());
    }
}

fn last_wins(slot: &mut Option<String>, candidate: &Option<String>) {
    if let Some(value) = populated(candidate) {
        *slot = Some(value.to_string());
    }
}

fn overlay_quantitative(target: &mut QuantitativeDetails, source: &QuantitativeDetails) {
    last_wins(&mut target.square_footage, &source.square_footage);
    last_wins(&mut target.number_of_stories, &source.number_of_stories);
    last_wins(&mut target.number_of_units, &source.number_of_units);
    last_wins(&mut target.roof_squares, &source.roof_squares);
    last_wins(&mut target.project_valuation, &source.project_valuation);
}

fn overlay_components(target: &mut ComponentDetails, source: &ComponentDetails) {
    last_wins(&mut target.roofing_material, &source.roofing_material);
    last_wins(&mut target.underlayment, &source.underlayment);
    last_wins(&mut target.window_product, &source.window_product);
    last_wins(&mut target.door_product, &source.door_product);
    last_wins(&mut target.siding_material, &source.siding_material);
    last_wins(&mut target.insulation_type, &source.insulation_type);
}
