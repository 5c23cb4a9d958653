use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

const ARTIFACT_COLUMNS: &str = "id, project_id, certification_type, version, file_name, file_key,
    file_url, content_sha256, review_status, submitted_by, created_at, updated_at";

/// Number of artifacts already recorded for a project and certificate type,
/// including in-flight reservations.
pub fn count_certifications(
    conn: &Connection,
    project_id: &str,
    certification_type: CertificationType,
) -> Result<u32, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM certification_artifacts
         WHERE project_id = ?1 AND certification_type = ?2",
        params![project_id, certification_type.as_str()],
        |row| row.get::<_, u32>(0),
    )?;
    Ok(count)
}

/// Version the next reservation would receive, without claiming it.
pub fn next_certification_version(
    conn: &Connection,
    project_id: &str,
    certification_type: CertificationType,
) -> Result<u32, DatabaseError> {
    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM certification_artifacts
         WHERE project_id = ?1 AND certification_type = ?2",
        params![project_id, certification_type.as_str()],
        |row| row.get(0),
    )?;
    Ok(current + 1)
}

/// Atomically claims the next version for (project, type).
///
/// The read of the current maximum and the placeholder insert share one
/// IMMEDIATE transaction, so two callers can never claim the same number.
/// The returned artifact is in `Generating` status until finalized.
pub fn reserve_certification_version(
    conn: &Connection,
    project_id: &str,
    certification_type: CertificationType,
) -> Result<CertificationArtifact, DatabaseError> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let current: u32 = tx.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM certification_artifacts
         WHERE project_id = ?1 AND certification_type = ?2",
        params![project_id, certification_type.as_str()],
        |row| row.get(0),
    )?;

    let now = Utc::now();
    let artifact = CertificationArtifact {
        id: Uuid::new_v4().to_string(),
        project_id: project_id.to_string(),
        certification_type,
        version: current + 1,
        file_name: None,
        file_key: None,
        file_url: None,
        content_sha256: None,
        review_status: ReviewStatus::Generating,
        submitted_by: None,
        created_at: now,
        updated_at: now,
    };

    tx.execute(
        "INSERT INTO certification_artifacts (id, project_id, certification_type, version,
         review_status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            artifact.id,
            artifact.project_id,
            artifact.certification_type.as_str(),
            artifact.version,
            artifact.review_status.as_str(),
            artifact.created_at,
            artifact.updated_at,
        ],
    )?;
    tx.commit()?;

    Ok(artifact)
}

/// Attaches the stored file to a reservation and submits it for review.
pub fn finalize_certification(
    conn: &Connection,
    artifact_id: &str,
    record: &DeliverableRecord,
) -> Result<CertificationArtifact, DatabaseError> {
    let updated = conn.execute(
        "UPDATE certification_artifacts SET file_name = ?2, file_key = ?3, file_url = ?4,
         content_sha256 = ?5, submitted_by = ?6, review_status = ?7, updated_at = ?8
         WHERE id = ?1 AND review_status = 'generating'",
        params![
            artifact_id,
            record.file_name,
            record.file_key,
            record.file_url,
            record.content_sha256,
            record.submitted_by,
            ReviewStatus::PendingReview.as_str(),
            Utc::now(),
        ],
    )?;

    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "CertificationReservation".into(),
            id: artifact_id.into(),
        });
    }

    get_certification(conn, artifact_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "CertificationArtifact".into(),
        id: artifact_id.into(),
    })
}

/// Drops a reservation that never produced a deliverable.
/// Finalized artifacts are left untouched. Returns whether a row was removed.
pub fn release_certification_reservation(
    conn: &Connection,
    artifact_id: &str,
) -> Result<bool, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM certification_artifacts WHERE id = ?1 AND review_status = 'generating'",
        params![artifact_id],
    )?;
    Ok(deleted > 0)
}

/// Moves a finalized artifact through review.
pub fn set_review_status(
    conn: &Connection,
    artifact_id: &str,
    status: ReviewStatus,
) -> Result<(), DatabaseError> {
    if status == ReviewStatus::Generating {
        return Err(DatabaseError::ConstraintViolation(
            "Artifacts cannot return to generating".into(),
        ));
    }
    let updated = conn.execute(
        "UPDATE certification_artifacts SET review_status = ?2, updated_at = ?3
         WHERE id = ?1 AND review_status != 'generating'",
        params![artifact_id, status.as_str(), Utc::now()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "CertificationArtifact".into(),
            id: artifact_id.into(),
        });
    }
    Ok(())
}

pub fn get_certification(
    conn: &Connection,
    artifact_id: &str,
) -> Result<Option<CertificationArtifact>, DatabaseError> {
    let sql = format!("SELECT {ARTIFACT_COLUMNS} FROM certification_artifacts WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(params![artifact_id], read_artifact_row);

    match result {
        Ok(row) => Ok(Some(artifact_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All artifacts for a project, grouped by type and ordered by version.
pub fn list_certifications(
    conn: &Connection,
    project_id: &str,
) -> Result<Vec<CertificationArtifact>, DatabaseError> {
    let sql = format!(
        "SELECT {ARTIFACT_COLUMNS} FROM certification_artifacts
         WHERE project_id = ?1 ORDER BY certification_type ASC, version ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![project_id], read_artifact_row)?;

    let mut artifacts = Vec::new();
    for row in rows {
        artifacts.push(artifact_from_row(row?)?);
    }
    Ok(artifacts)
}

struct ArtifactRow {
    id: String,
    project_id: String,
    certification_type: String,
    version: u32,
    file_name: Option<String>,
    file_key: Option<String>,
    file_url: Option<String>,
    content_sha256: Option<String>,
    review_status: String,
    submitted_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn read_artifact_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArtifactRow> {
    Ok(ArtifactRow {
        id: row.get(0)?,
        project_id: row.get(1)?,
        certification_type: row.get(2)?,
        version: row.get(3)?,
        file_name: row.get(4)?,
        file_key: row.get(5)?,
        file_url: row.get(6)?,
        content_sha256: row.get(7)?,
        review_status: row.get(8)?,
        submitted_by: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn artifact_from_row(row: ArtifactRow) -> Result<CertificationArtifact, DatabaseError> {
    Ok(CertificationArtifact {
        id: row.id,
        project_id: row.project_id,
        certification_type: CertificationType::from_str(&row.certification_type)?,
        version: row.version,
        file_name: row.file_name,
        file_key: row.file_key,
        file_url: row.file_url,
        content_sha256: row.content_sha256,
        review_status: ReviewStatus::from_str(&row.review_status)?,
        submitted_by: row.submitted_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
