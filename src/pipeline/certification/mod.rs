//! Certification document pipeline.
//!
//! Components, leaves first:
//! - merge: Extraction Merger
//! - content + prompt: Content Assembler (narrative and preview)
//! - sanitize + metrics + typeset: Document Typesetter
//! - naming: Versioning & Naming
//! - storage + store: object storage and record stores
//! - generator: single-project preview / generate
//! - batch: Batch Orchestrator

pub mod batch;
pub mod content;
pub mod error;
pub mod generator;
pub mod merge;
pub mod metrics;
pub mod naming;
pub mod prompt;
pub mod sanitize;
pub mod storage;
pub mod store;
pub mod traits;
pub mod types;
pub mod typeset;

pub use batch::generate_batch;
pub use error::CertificationError;
pub use generator::CertificationPipeline;
pub use storage::{FileSystemStorage, MemoryStorage, ObjectStorage, StorageError, StoredObject};
pub use store::{SqliteDeliverableStore, SqliteProjectSource};
pub use traits::{DeliverableStore, ProjectSource};
pub use types::*;
pub use typeset::{typeset_narrative, TypesetDocument, TypesetError};
