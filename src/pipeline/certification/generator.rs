//! Single-project preview and generation.
//!
//! `generate` runs: load project → record field changes → merge extractions
//! → narrative → typeset → reserve version → store PDF → record deliverable
//! → stamp project. The first failing step aborts the call.

use chrono::Utc;
use rusqlite::Connection;
use sha2::{Digest, Sha256};

use super::content::{
    apply_preview, assemble_payload, generate_narrative, generate_preview, ContentSources,
};
use super::error::CertificationError;
use super::merge::merge_extractions;
use super::naming::{certificate_file_name, storage_key, NameParts, CONTENT_TYPE};
use super::store::{SqliteDeliverableStore, SqliteProjectSource};
use super::storage::ObjectStorage;
use super::traits::{DeliverableStore, ProjectSource};
use super::typeset::typeset_narrative;
use super::types::*;
use crate::config::CertificationConfig;
use crate::models::*;
use crate::pipeline::llm::LlmClient;

/// Certificate pipeline with its collaborators injected.
pub struct CertificationPipeline {
    llm: Box<dyn LlmClient>,
    storage: Box<dyn ObjectStorage>,
    projects: Box<dyn ProjectSource>,
    deliverables: Box<dyn DeliverableStore>,
    config: CertificationConfig,
}

impl CertificationPipeline {
    pub fn new(
        llm: Box<dyn LlmClient>,
        storage: Box<dyn ObjectStorage>,
        projects: Box<dyn ProjectSource>,
        deliverables: Box<dyn DeliverableStore>,
        config: CertificationConfig,
    ) -> Self {
        Self {
            llm,
            storage,
            projects,
            deliverables,
            config,
        }
    }

    /// Pipeline backed by the SQLite record stores.
    pub fn with_sqlite_stores(
        llm: Box<dyn LlmClient>,
        storage: Box<dyn ObjectStorage>,
        config: CertificationConfig,
    ) -> Self {
        Self::new(
            llm,
            storage,
            Box::new(SqliteProjectSource::new()),
            Box::new(SqliteDeliverableStore::new()),
            config,
        )
    }

    pub fn config(&self) -> &CertificationConfig {
        &self.config
    }

    fn load_project(
        &self,
        conn: &Connection,
        project_id: &str,
    ) -> Result<ProjectRecord, CertificationError> {
        self.projects
            .get_project(conn, project_id)?
            .ok_or_else(|| CertificationError::project_not_found(project_id))
    }

    /// Merge extractions and gather everything the narrative needs.
    fn assemble(
        &self,
        conn: &Connection,
        project: &ProjectRecord,
        certification_type: CertificationType,
    ) -> Result<(NarrativePayload, MergedExtraction), CertificationError> {
        let extractions = self.projects.list_extractions(conn, &project.id)?;
        let merged = merge_extractions(&extractions);
        let tasks = self.projects.list_completed_tasks(conn, &project.id)?;
        let notes = if certification_type.includes_field_changes() {
            self.projects.list_field_change_notes(conn, &project.id)?
        } else {
            Vec::new()
        };
        let products = self
            .projects
            .resolve_products(conn, &merged.detected_product_ids)?;

        tracing::debug!(
            project_id = %project.id,
            extractions = merged.source_count,
            tasks = tasks.len(),
            notes = notes.len(),
            products = products.len(),
            "Assembled certification sources"
        );

        let sources = ContentSources {
            project,
            merged: &merged,
            completed_tasks: &tasks,
            field_change_notes: &notes,
            products: &products,
        };
        let payload = assemble_payload(&sources, certification_type, &self.config);
        Ok((payload, merged))
    }

    fn name_parts<'a>(project: &'a ProjectRecord, merged: &'a MergedExtraction) -> NameParts<'a> {
        NameParts::for_project(project)
            .or_else(populated(&merged.address), populated(&merged.owner_name))
    }

    /// Structured fields for review, plus the version and file name the
    /// document would get. Writes nothing.
    pub fn preview(
        &self,
        conn: &Connection,
        project_id: &str,
        certification_type: CertificationType,
        field_changes: Option<&str>,
    ) -> Result<PreviewResult, CertificationError> {
        let project = self.load_project(conn, project_id)?;
        let (mut payload, merged) = self.assemble(conn, &project, certification_type)?;

        if certification_type.includes_field_changes() {
            if let Some(text) = field_changes.map(str::trim).filter(|t| !t.is_empty()) {
                payload.field_changes.push(text.to_string());
            }
        }

        let fields = generate_preview(self.llm.as_ref(), &self.config.model_name, &payload)?;
        let next_version = self
            .deliverables
            .next_version(conn, &project.id, certification_type)?;
        let file_name = certificate_file_name(&Self::name_parts(&project, &merged), next_version);

        Ok(PreviewResult {
            project_id: project.id,
            certification_type,
            next_version,
            file_name,
            fields,
        })
    }

    /// Generate, store and record one certificate.
    pub fn generate(
        &self,
        conn: &Connection,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, CertificationError> {
        let certification_type = request.certification_type;
        let project = self.load_project(conn, &request.project_id)?;

        tracing::info!(
            project_id = %project.id,
            certification_type = %certification_type,
            "Generating certificate"
        );

        let field_changes = request.effective_field_changes();
        let (mut payload, merged) = self.assemble(conn, &project, certification_type)?;
        if let Some(text) = field_changes {
            if !payload.field_changes.iter().any(|c| c == text) {
                payload.field_changes.push(text.to_string());
            }
        }
        if let Some(preview) = &request.preview {
            apply_preview(&mut payload, preview);
        }

        let narrative = generate_narrative(self.llm.as_ref(), &self.config.model_name, &payload)?;
        let title = format!("{} Certificate - {}", certification_type.title(), payload.site_address);
        let document = typeset_narrative(&title, &narrative)?;

        let reservation = self
            .deliverables
            .reserve_version(conn, &project.id, certification_type)
            .map_err(CertificationError::persistence)?;

        match self.store_and_record(conn, &project, &merged, &reservation, request, &document.bytes) {
            Ok(artifact) => {
                // Notes are written only after the deliverable is recorded.
                if let Some(text) = field_changes {
                    self.projects
                        .append_field_change_note(conn, &project.id, text)
                        .map_err(CertificationError::persistence)?;
                }

                let outcome = GenerationOutcome {
                    project_id: project.id.clone(),
                    certification_type,
                    url: artifact.file_url.clone().unwrap_or_default(),
                    file_key: artifact.file_key.clone().unwrap_or_default(),
                    file_name: artifact.file_name.clone().unwrap_or_default(),
                    version: artifact.version,
                    artifact_id: artifact.id,
                    page_count: document.page_count,
                };
                self.stamp_project(conn, &outcome)?;

                tracing::info!(
                    project_id = %outcome.project_id,
                    version = outcome.version,
                    pages = outcome.page_count,
                    bytes = document.bytes.len(),
                    "Certificate generated"
                );
                Ok(outcome)
            }
            Err(e) => {
                self.release(conn, &reservation);
                Err(e)
            }
        }
    }

    fn store_and_record(
        &self,
        conn: &Connection,
        project: &ProjectRecord,
        merged: &MergedExtraction,
        reservation: &CertificationArtifact,
        request: &GenerationRequest,
        bytes: &[u8],
    ) -> Result<CertificationArtifact, CertificationError> {
        let file_name =
            certificate_file_name(&Self::name_parts(project, merged), reservation.version);
        let key = storage_key(&self.config.key_prefix, reservation.certification_type, &file_name);

        let stored = self.storage.put(&key, bytes, CONTENT_TYPE)?;

        let record = DeliverableRecord {
            file_name,
            file_key: stored.key,
            file_url: stored.url,
            content_sha256: format!("{:x}", Sha256::digest(bytes)),
            submitted_by: request.submitted_by.clone(),
        };

        self.deliverables
            .create_deliverable(conn, reservation, &record)
            .map_err(CertificationError::persistence)
    }

    fn stamp_project(
        &self,
        conn: &Connection,
        outcome: &GenerationOutcome,
    ) -> Result<(), CertificationError> {
        let stamp = CertificationStamp {
            certification_type: outcome.certification_type,
            generated_at: Utc::now(),
            file_key: outcome.file_key.clone(),
            file_url: outcome.url.clone(),
        };
        self.projects
            .update_certification(conn, &outcome.project_id, &stamp)
            .map_err(CertificationError::persistence)
    }

    fn release(&self, conn: &Connection, reservation: &CertificationArtifact) {
        match self.deliverables.release_reservation(conn, reservation) {
            Ok(()) => tracing::debug!(
                project_id = %reservation.project_id,
                version = reservation.version,
                "Released version reservation"
            ),
            Err(e) => tracing::warn!(
                project_id = %reservation.project_id,
                version = reservation.version,
                error = %e,
                "Failed to release version reservation"
            ),
        }
    }
}
