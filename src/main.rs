//! SiteCert - certification documents for building-inspection projects.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;

use sitecert::config::{self, CertificationConfig};
use sitecert::db::{self, repository};
use sitecert::models::{CertificationType, ReviewStatus};
use sitecert::pipeline::certification::{
    generate_batch, BatchProgressEvent, CertificationPipeline, FileSystemStorage,
    GenerationRequest,
};
use sitecert::pipeline::llm::{LlmClient, OllamaClient};

/// Generate, version and store inspection certificates.
#[derive(Parser)]
#[command(name = "sitecert", version, about = "Inspection certificate generator")]
struct Cli {
    /// SQLite database holding projects and certificates.
    #[arg(long, env = "SITECERT_DB", global = true)]
    db: Option<PathBuf>,

    /// Root directory for stored certificate files.
    #[arg(long, env = "SITECERT_STORAGE_DIR", global = true)]
    storage_dir: Option<PathBuf>,

    /// Base URL stored files are served from.
    #[arg(long, env = "SITECERT_PUBLIC_BASE_URL", global = true)]
    public_base_url: Option<String>,

    /// Ollama URL (overrides SITECERT_OLLAMA_URL).
    #[arg(long, global = true)]
    ollama_url: Option<String>,

    /// Narrative model (overrides SITECERT_MODEL).
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the structured fields a certificate would contain.
    Preview {
        project_id: String,

        /// as_permitted or as_built.
        #[arg(long = "type", value_parser = parse_certification_type)]
        certification_type: CertificationType,

        /// Field changes to include (as_built only).
        #[arg(long)]
        field_changes: Option<String>,
    },

    /// Generate one certificate.
    Generate {
        project_id: String,

        /// as_permitted or as_built.
        #[arg(long = "type", value_parser = parse_certification_type)]
        certification_type: CertificationType,

        /// Field changes to record and narrate (as_built only).
        #[arg(long)]
        field_changes: Option<String>,

        /// Who submitted the certificate for review.
        #[arg(long, env = "SITECERT_SUBMITTED_BY")]
        submitted_by: Option<String>,
    },

    /// Generate certificates for several projects, one after another.
    Batch {
        #[arg(required = true)]
        project_ids: Vec<String>,

        /// as_permitted or as_built.
        #[arg(long = "type", value_parser = parse_certification_type)]
        certification_type: CertificationType,
    },

    /// Approve or reject a generated certificate.
    Review {
        artifact_id: String,

        /// approved, rejected or pending_review.
        #[arg(long, value_parser = parse_review_status)]
        status: ReviewStatus,
    },
}

fn parse_certification_type(s: &str) -> Result<CertificationType, String> {
    s.parse().map_err(|e: db::DatabaseError| e.to_string())
}

fn parse_review_status(s: &str) -> Result<ReviewStatus, String> {
    s.parse().map_err(|e: db::DatabaseError| e.to_string())
}

fn main() -> Result<()> {
    sitecert::init_tracing();
    let cli = Cli::parse();

    let mut config = CertificationConfig::from_env();
    if let Some(url) = &cli.ollama_url {
        config.ollama_url = url.clone();
    }
    if let Some(model) = &cli.model {
        config.model_name = model.clone();
    }

    let db_path = cli.db.clone().unwrap_or_else(config::database_path);
    let conn = db::open_database(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;

    tracing::info!(version = config::APP_VERSION, db = %db_path.display(), "SiteCert starting");

    match cli.command {
        Commands::Preview {
            project_id,
            certification_type,
            field_changes,
        } => {
            let pipeline = build_pipeline(&cli.storage_dir, &cli.public_base_url, config)?;
            let preview = pipeline.preview(
                &conn,
                &project_id,
                certification_type,
                field_changes.as_deref(),
            )?;
            print_json(&preview)?;
        }

        Commands::Generate {
            project_id,
            certification_type,
            field_changes,
            submitted_by,
        } => {
            let pipeline = build_pipeline(&cli.storage_dir, &cli.public_base_url, config)?;
            let mut request = GenerationRequest::new(project_id, certification_type);
            if let Some(text) = field_changes {
                request = request.with_field_changes(text);
            }
            if let Some(who) = submitted_by {
                request = request.submitted_by(who);
            }
            let outcome = pipeline.generate(&conn, &request)?;
            print_json(&outcome)?;
        }

        Commands::Batch {
            project_ids,
            certification_type,
        } => {
            let pipeline = build_pipeline(&cli.storage_dir, &cli.public_base_url, config)?;
            let progress = |event: BatchProgressEvent| {
                if let BatchProgressEvent::Progress { completed, total, project_id } = event {
                    eprintln!("[{}/{}] {}", completed + 1, total, project_id);
                }
            };
            let result =
                generate_batch(&pipeline, &conn, &project_ids, certification_type, Some(&progress));
            print_json(&result)?;
            eprintln!("{}", result.summary());
        }

        Commands::Review { artifact_id, status } => {
            review(&conn, &artifact_id, status)?;
        }
    }

    Ok(())
}

fn build_pipeline(
    storage_dir: &Option<PathBuf>,
    public_base_url: &Option<String>,
    config: CertificationConfig,
) -> Result<CertificationPipeline> {
    let llm = OllamaClient::new(&config.ollama_url, config.llm_timeout_secs)?;
    match llm.is_model_available(&config.model_name) {
        Ok(true) => {}
        Ok(false) => tracing::warn!(model = %config.model_name, "Model not installed in Ollama"),
        Err(e) => tracing::warn!(error = %e, "Could not check Ollama models"),
    }

    let root = storage_dir.clone().unwrap_or_else(config::storage_dir);
    let storage = FileSystemStorage::new(root, public_base_url.clone());

    Ok(CertificationPipeline::with_sqlite_stores(
        Box::new(llm),
        Box::new(storage),
        config,
    ))
}

fn review(conn: &Connection, artifact_id: &str, status: ReviewStatus) -> Result<()> {
    repository::set_review_status(conn, artifact_id, status)?;
    let artifact = repository::get_certification(conn, artifact_id)?
        .with_context(|| format!("certificate {artifact_id} disappeared"))?;
    print_json(&artifact)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
