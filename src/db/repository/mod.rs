//! Repository layer — table-scoped database operations.

mod certification;
mod extraction;
mod field_change;
mod product;
mod project;
mod task;

pub use certification::*;
pub use extraction::*;
pub use field_change::*;
pub use product::*;
pub use project::*;
pub use task::*;
