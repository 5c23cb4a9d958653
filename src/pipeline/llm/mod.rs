//! Narrative-generation collaborator: a local Ollama model behind the
//! `LlmClient` trait so the pipeline can be driven by test doubles.

pub mod ollama;

pub use ollama::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Ollama is not running at {0}")]
    OllamaConnection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    OllamaError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

/// LLM client abstraction (allows mocking)
pub trait LlmClient {
    /// Free-text completion.
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, LlmError>;

    /// Completion constrained to a JSON schema; returns the parsed JSON value.
    fn generate_structured(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, LlmError>;

    fn is_model_available(&self, model: &str) -> Result<bool, LlmError>;

    fn list_models(&self) -> Result<Vec<String>, LlmError>;
}

/// Shared clients (one Ollama connection reused by several pipelines).
impl<T: LlmClient + ?Sized> LlmClient for std::sync::Arc<T> {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, LlmError> {
        (**self).generate(model, prompt, system)
    }

    fn generate_structured(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, LlmError> {
        (**self).generate_structured(model, prompt, system, schema)
    }

    fn is_model_available(&self, model: &str) -> Result<bool, LlmError> {
        (**self).is_model_available(model)
    }

    fn list_models(&self) -> Result<Vec<String>, LlmError> {
        (**self).list_models()
    }
}
