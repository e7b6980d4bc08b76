use serde::{Deserialize, Serialize};

use super::{ReasoningError, TextGenerate};

/// Preferred local models in order of preference.
const PREFERRED_MODELS: &[&str] = &[
    "medgemma",
    "medgemma:27b",
    "medgemma:4b",
    "medgemma:latest",
];

/// Ollama HTTP client for local model inference.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new client pointing at an Ollama instance.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, ReasoningError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ReasoningError::MalformedResponse(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Default Ollama instance at localhost:11434 with a 5-minute timeout,
    /// using the best model the server has.
    pub fn default_local() -> Result<Self, ReasoningError> {
        let mut client = Self::new("http://localhost:11434", "", 300)?;
        client.model = client.find_best_model()?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Find the best available model from the preference list.
    pub fn find_best_model(&self) -> Result<String, ReasoningError> {
        let available = self.list_models()?;
        for preferred in PREFERRED_MODELS {
            if available.iter().any(|m| m.starts_with(preferred)) {
                return Ok(preferred.to_string());
            }
        }
        Err(ReasoningError::NoModelAvailable)
    }

    pub fn list_models(&self) -> Result<Vec<String>, ReasoningError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() {
                ReasoningError::Connection(self.base_url.clone())
            } else {
                ReasoningError::MalformedResponse(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReasoningError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TagsResponse = response
            .json()
            .map_err(|e| ReasoningError::MalformedResponse(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl TextGenerate for OllamaClient {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, ReasoningError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                ReasoningError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                ReasoningError::Timeout(self.timeout_secs)
            } else {
                ReasoningError::MalformedResponse(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReasoningError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| ReasoningError::MalformedResponse(e.to_string()))?;

        Ok(parsed.response)
    }
}
