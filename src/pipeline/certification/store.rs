//! SQLite-backed collaborators over `db::repository`.

use rusqlite::Connection;

use super::traits::{DeliverableStore, ProjectSource};
use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::*;

pub struct SqliteProjectSource;

impl SqliteProjectSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SqliteProjectSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectSource for SqliteProjectSource {
    fn get_project(
        &self,
        conn: &Connection,
        project_id: &str,
    ) -> Result<Option<ProjectRecord>, DatabaseError> {
        repository::get_project(conn, project_id)
    }

    fn list_extractions(
        &self,
        conn: &Connection,
        project_id: &str,
    ) -> Result<Vec<ExtractionRecord>, DatabaseError> {
        repository::list_extractions_for_project(conn, project_id)
    }

    fn list_completed_tasks(
        &self,
        conn: &Connection,
        project_id: &str,
    ) -> Result<Vec<TaskRecord>, DatabaseError> {
        repository::list_completed_tasks(conn, project_id)
    }

    fn list_field_change_notes(
        &self,
        conn: &Connection,
        project_id: &str,
    ) -> Result<Vec<FieldChangeNote>, DatabaseError> {
        repository::list_field_change_notes(conn, project_id)
    }

    fn append_field_change_note(
        &self,
        conn: &Connection,
        project_id: &str,
        note: &str,
    ) -> Result<FieldChangeNote, DatabaseError> {
        repository::insert_field_change_note(conn, project_id, note)
    }

    fn resolve_products(
        &self,
        conn: &Connection,
        product_ids: &[String],
    ) -> Result<Vec<ProductRecord>, DatabaseError> {
        repository::get_products_by_ids(conn, product_ids)
    }

    fn update_certification(
        &self,
        conn: &Connection,
        project_id: &str,
        stamp: &CertificationStamp,
    ) -> Result<(), DatabaseError> {
        repository::update_project_certification(conn, project_id, stamp)
    }
}

pub struct SqliteDeliverableStore;

impl SqliteDeliverableStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SqliteDeliverableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliverableStore for SqliteDeliverableStore {
    fn next_version(
        &self,
        conn: &Connection,
        project_id: &str,
        certification_type: CertificationType,
    ) -> Result<u32, DatabaseError> {
        repository::next_certification_version(conn, project_id, certification_type)
    }

    fn reserve_version(
        &self,
        conn: &Connection,
        project_id: &str,
        certification_type: CertificationType,
    ) -> Result<CertificationArtifact, DatabaseError> {
        repository::reserve_certification_version(conn, project_id, certification_type)
    }

    fn create_deliverable(
        &self,
        conn: &Connection,
        reservation: &CertificationArtifact,
        record: &DeliverableRecord,
    ) -> Result<CertificationArtifact, DatabaseError> {
        repository::finalize_certification(conn, &reservation.id, record)
    }

    fn release_reservation(
        &self,
        conn: &Connection,
        reservation: &CertificationArtifact,
    ) -> Result<(), DatabaseError> {
        if !repository::release_certification_reservation(conn, &reservation.id)? {
            tracing::debug!(artifact_id = %reservation.id, "Reservation already finalized or gone");
        }
        Ok(())
    }
}
