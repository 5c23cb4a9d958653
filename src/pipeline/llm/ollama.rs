use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::{LlmClient, LlmError};

/// Ollama HTTP client for local LLM inference.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient pointing at an Ollama instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    fn post_generate(&self, body: &OllamaGenerateRequest<'_>) -> Result<serde_json::Value, LlmError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_connect() {
            LlmError::OllamaConnection(self.base_url.clone())
        } else if e.is_timeout() {
            LlmError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
        } else {
            LlmError::HttpClient(e.to_string())
        }
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a serde_json::Value>,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

/// Pulls the `response` text out of a generate body.
/// Anything other than a JSON string there is a malformed result.
fn response_text(body: &serde_json::Value) -> Result<String, LlmError> {
    match body.get("response") {
        Some(serde_json::Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(LlmError::MalformedResponse(format!(
            "expected text response, got {}",
            json_kind(other)
        ))),
        None => Err(LlmError::MalformedResponse("missing response field".into())),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl LlmClient for OllamaClient {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, LlmError> {
        let body = OllamaGenerateRequest {
            model,
            prompt,
            system,
            stream: false,
            format: None,
        };
        response_text(&self.post_generate(&body)?)
    }

    fn generate_structured(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, LlmError> {
        let body = OllamaGenerateRequest {
            model,
            prompt,
            system,
            stream: false,
            format: Some(schema),
        };
        let text = response_text(&self.post_generate(&body)?)?;
        serde_json::from_str(&text).map_err(|e| LlmError::MalformedResponse(e.to_string()))
    }

    fn is_model_available(&self, model: &str) -> Result<bool, LlmError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Mock LLM client for testing — returns configurable responses and
/// remembers every prompt it was given.
pub struct MockLlmClient {
    response: String,
    structured: serde_json::Value,
    available_models: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            structured: serde_json::Value::Object(Default::default()),
            available_models: vec!["llama3.1:8b".to_string()],
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_structured(mut self, value: serde_json::Value) -> Self {
        self.structured = value;
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.available_models = models;
        self
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn record(&self, prompt: &str) {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _model: &str, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.record(prompt);
        Ok(self.response.clone())
    }

    fn generate_structured(
        &self,
        _model: &str,
        prompt: &str,
        _system: &str,
        _schema: &serde_json::Value,
    ) -> Result<serde_json::Value, LlmError> {
        self.record(prompt);
        Ok(self.structured.clone())
    }

    fn is_model_available(&self, model: &str) -> Result<bool, LlmError> {
        Ok(self.available_models.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, LlmError> {
        Ok(self.available_models.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockLlmClient::new("test response");
        let result = client.generate("model", "prompt", "system").unwrap();
        assert_eq!(result, "test response");
        assert_eq!(client.prompts(), vec!["prompt".to_string()]);
    }

    #[test]
    fn mock_client_returns_structured_value() {
        let client = MockLlmClient::new("").with_structured(json!({"code_year": "2021"}));
        let value = client.generate_structured("m", "p", "s", &json!({})).unwrap();
        assert_eq!(value["code_year"], "2021");
    }

    #[test]
    fn mock_client_model_availability() {
        let client = MockLlmClient::new("").with_models(vec!["llama3.1:8b".into()]);
        assert!(client.is_model_available("llama3.1").unwrap());
        assert!(!client.is_model_available("mistral").unwrap());
    }

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", 60).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.timeout_secs, 60);
    }

    #[test]
    fn response_text_accepts_strings_only() {
        assert_eq!(response_text(&json!({"response": "ok"})).unwrap(), "ok");
        assert!(matches!(
            response_text(&json!({"response": {"nested": true}})),
            Err(LlmError::MalformedResponse(_))
        ));
        assert!(matches!(
            response_text(&json!({"done": true})),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[test]
    fn structured_request_serializes_schema_as_format() {
        let schema = json!({"type": "object"});
        let body = OllamaGenerateRequest {
            model: "m",
            prompt: "p",
            system: "s",
            stream: false,
            format: Some(&schema),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["format"]["type"], "object");

        let plain = OllamaGenerateRequest { format: None, ..body };
        assert!(serde_json::to_value(&plain).unwrap().get("format").is_none());
    }
}
