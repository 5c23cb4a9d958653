//! Batch Orchestrator — one certificate type across many projects.
//!
//! Projects run strictly one after another in input order (the narrative
//! model serves one request at a time). A failure is recorded against its
//! project and the batch moves on.

use std::time::Instant;

use rusqlite::Connection;

use super::generator::CertificationPipeline;
use super::types::*;
use crate::models::CertificationType;

/// Generate `certification_type` certificates for every project id.
/// Always returns one result per input id, in input order.
pub fn generate_batch(
    pipeline: &CertificationPipeline,
    conn: &Connection,
    project_ids: &[String],
    certification_type: CertificationType,
    progress_fn: Option<&dyn Fn(BatchProgressEvent)>,
) -> BatchGenerationResult {
    let start = Instant::now();
    let total = project_ids.len() as u32;

    tracing::info!(total, certification_type = %certification_type, "Starting certificate batch");
    if let Some(progress) = progress_fn {
        progress(BatchProgressEvent::Started { total });
    }

    let mut results = Vec::with_capacity(project_ids.len());
    let mut succeeded = 0u32;

    for (i, project_id) in project_ids.iter().enumerate() {
        if let Some(progress) = progress_fn {
            progress(BatchProgressEvent::Progress {
                completed: i as u32,
                total,
                project_id: project_id.clone(),
            });
        }

        let request = GenerationRequest::new(project_id.as_str(), certification_type);
        match pipeline.generate(conn, &request) {
            Ok(outcome) => {
                succeeded += 1;
                results.push(BatchItemResult::succeeded(project_id, outcome.url));
            }
            Err(e) => {
                tracing::warn!(project_id = %project_id, error = %e, "Certificate generation failed");
                results.push(BatchItemResult::failed(project_id, e.to_string()));
            }
        }
    }

    let result = BatchGenerationResult {
        certification_type,
        results,
        succeeded,
        total,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    tracing::info!(
        succeeded,
        total,
        duration_ms = result.duration_ms,
        "Certificate batch finished"
    );
    if let Some(progress) = progress_fn {
        progress(BatchProgressEvent::Completed { succeeded, total });
    }

    result
}
