pub mod enums;
pub mod project;
pub mod extraction;
pub mod task;
pub mod field_change;
pub mod product;
pub mod certification;

pub use enums::*;
pub use project::*;
pub use extraction::*;
pub use task::*;
pub use field_change::*;
pub use product::*;
pub use certification::*;
