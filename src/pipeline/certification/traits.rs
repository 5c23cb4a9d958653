//! Collaborator seams for certificate generation.
//!
//! - ProjectSource: project, extraction, task, note and product reads plus
//!   the two project-side writes (field-change notes, certification stamp)
//! - DeliverableStore: version reservation and artifact records

use rusqlite::Connection;

use crate::db::DatabaseError;
use crate::models::*;

/// Read access to a project and everything attached to it.
pub trait ProjectSource: Send + Sync {
    fn get_project(
        &self,
        conn: &Connection,
        project_id: &str,
    ) -> Result<Option<ProjectRecord>, DatabaseError>;

    /// Extraction records in upload order (oldest first).
    fn list_extractions(
        &self,
        conn: &Connection,
        project_id: &str,
    ) -> Result<Vec<ExtractionRecord>, DatabaseError>;

    fn list_completed_tasks(
        &self,
        conn: &Connection,
        project_id: &str,
    ) -> Result<Vec<TaskRecord>, DatabaseError>;

    fn list_field_change_notes(
        &self,
        conn: &Connection,
        project_id: &str,
    ) -> Result<Vec<FieldChangeNote>, DatabaseError>;

    /// Append one field-change note. Notes are never edited.
    fn append_field_change_note(
        &self,
        conn: &Connection,
        project_id: &str,
        note: &str,
    ) -> Result<FieldChangeNote, DatabaseError>;

    /// Products for the given ids. Unknown ids are skipped.
    fn resolve_products(
        &self,
        conn: &Connection,
        product_ids: &[String],
    ) -> Result<Vec<ProductRecord>, DatabaseError>;

    /// Overwrite the project's latest-certification fields.
    fn update_certification(
        &self,
        conn: &Connection,
        project_id: &str,
        stamp: &CertificationStamp,
    ) -> Result<(), DatabaseError>;
}

/// Version numbering and deliverable records.
pub trait DeliverableStore: Send + Sync {
    /// Version the next reservation would receive. Does not reserve.
    fn next_version(
        &self,
        conn: &Connection,
        project_id: &str,
        certification_type: CertificationType,
    ) -> Result<u32, DatabaseError>;

    /// Claim the next version atomically.
    fn reserve_version(
        &self,
        conn: &Connection,
        project_id: &str,
        certification_type: CertificationType,
    ) -> Result<CertificationArtifact, DatabaseError>;

    /// Record the stored file against a reservation.
    fn create_deliverable(
        &self,
        conn: &Connection,
        reservation: &CertificationArtifact,
        record: &DeliverableRecord,
    ) -> Result<CertificationArtifact, DatabaseError>;

    /// Give back a reservation that produced no deliverable.
    fn release_reservation(
        &self,
        conn: &Connection,
        reservation: &CertificationArtifact,
    ) -> Result<(), DatabaseError>;
}
