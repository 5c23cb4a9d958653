use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_extraction(conn: &Connection, record: &ExtractionRecord) -> Result<(), DatabaseError> {
    let f = &record.fields;
    conn.execute(
        "INSERT INTO extraction_records (id, project_id, source_name, uploaded_at, owner_name,
         address, jurisdiction, permit_number, issue_date, contractor, subdivision, lot, block,
         scope_of_work, detected_product_ids, quantitative_details, component_details)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            record.id,
            record.project_id,
            record.source_name,
            record.uploaded_at,
            f.owner_name,
            f.address,
            f.jurisdiction,
            f.permit_number,
            f.issue_date,
            f.contractor,
            f.subdivision,
            f.lot,
            f.block,
            f.scope_of_work,
            serde_json::to_string(&f.detected_product_ids)?,
            serde_json::to_string(&f.quantitative)?,
            serde_json::to_string(&f.components)?,
        ],
    )?;
    Ok(())
}

/// All extraction records for a project, in source-upload order.
pub fn list_extractions_for_project(
    conn: &Connection,
    project_id: &str,
) -> Result<Vec<ExtractionRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_id, source_name, uploaded_at, owner_name, address, jurisdiction,
         permit_number, issue_date, contractor, subdivision, lot, block, scope_of_work,
         detected_product_ids, quantitative_details, component_details
         FROM extraction_records WHERE project_id = ?1
         ORDER BY uploaded_at ASC, rowid ASC"
    )?;

    let rows = stmt.query_map(params![project_id], |row| {
        Ok(ExtractionRow {
            id: row.get(0)?,
            project_id: row.get(1)?,
            source_name: row.get(2)?,
            uploaded_at: row.get(3)?,
            owner_name: row.get(4)?,
            address: row.get(5)?,
            jurisdiction: row.get(6)?,
            permit_number: row.get(7)?,
            issue_date: row.get(8)?,
            contractor: row.get(9)?,
            subdivision: row.get(10)?,
            lot: row.get(11)?,
            block: row.get(12)?,
            scope_of_work: row.get(13)?,
            detected_product_ids: row.get(14)?,
            quantitative_details: row.get(15)?,
            component_details: row.get(16)?,
        })
    })?;

    let mut records = Vec::new();
    for row in rows {
        records.push(extraction_from_row(row?)?);
    }
    Ok(records)
}

struct ExtractionRow {
    id: String,
    project_id: String,
    source_name: String,
    uploaded_at: DateTime<Utc>,
    owner_name: Option<String>,
    address: Option<String>,
    jurisdiction: Option<String>,
    permit_number: Option<String>,
    issue_date: Option<String>,
    contractor: Option<String>,
    subdivision: Option<String>,
    lot: Option<String>,
    block: Option<String>,
    scope_of_work: Option<String>,
    detected_product_ids: String,
    quantitative_details: String,
    component_details: String,
}

fn extraction_from_row(row: ExtractionRow) -> Result<ExtractionRecord, DatabaseError> {
    Ok(ExtractionRecord {
        id: row.id,
        project_id: row.project_id,
        source_name: row.source_name,
        uploaded_at: row.uploaded_at,
        fields: ExtractedFields {
            owner_name: row.owner_name,
            address: row.address,
            jurisdiction: row.jurisdiction,
            permit_number: row.permit_number,
            issue_date: row.issue_date,
            contractor: row.contractor,
            subdivision: row.subdivision,
            lot: row.lot,
            block: row.block,
            scope_of_work: row.scope_of_work,
            detected_product_ids: serde_json::from_str(&row.detected_product_ids)?,
            quantitative: serde_json::from_str(&row.quantitative_details)?,
            components: serde_json::from_str(&row.component_details)?,
        },
    })
}
