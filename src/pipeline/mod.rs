pub mod certification;
pub mod llm;
