//! Ollama API client for DDL rewriting
//!
//! ```ignore
//! use schema_inference_sdk::rewrite::OllamaRewriter;
//!
//! let rewriter = OllamaRewriter::new("http://localhost:11434", "llama3.2")
//!     .with_timeout(60);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{RewriteError, RewriteResult};
use super::prompt::{build_prompt, extract_ddl};
use super::SchemaRewriter;

/// Rewriter backed by an Ollama server
#[derive(Debug, Clone)]
pub struct OllamaRewriter {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model name to use
    model: String,
    /// Request timeout in seconds
    timeout_seconds: u64,
    /// Maximum context tokens
    max_context_tokens: usize,
    /// Temperature for sampling
    temperature: f32,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_ctx: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaRewriter {
    /// Create a new rewriter for `model` served at `base_url`
    /// (e.g. "http://localhost:11434").
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout_seconds: 120,
            max_context_tokens: 4096,
            temperature: 0.1,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the maximum context tokens
    pub fn with_max_context(mut self, tokens: usize) -> Self {
        self.max_context_tokens = tokens;
        self
    }

    /// Set the temperature for sampling
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn generate(&self, prompt: &str) -> RewriteResult<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_ctx: self.max_context_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(Duration::from_secs(self.timeout_seconds))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    RewriteError::Timeout(self.timeout_seconds)
                } else {
                    RewriteError::ConnectionError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RewriteError::ConnectionError(format!(
                "HTTP {status}: {body}"
            )));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| RewriteError::InvalidResponse(e.to_string()))?;
        Ok(body.response)
    }
}

impl SchemaRewriter for OllamaRewriter {
    fn rewrite(&self, ddl: &str, dialect: &str) -> RewriteResult<String> {
        let prompt = build_prompt(ddl, dialect)
            .ok_or_else(|| RewriteError::UnsupportedDialect(dialect.to_string()))?;
        debug!(model = %self.model, prompt_len = prompt.len(), "Sending rewrite request");
        let response = self.generate(&prompt)?;
        extract_ddl(&response).ok_or(RewriteError::MissingDdl)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let rewriter = OllamaRewriter::new("http://localhost:11434/", "llama3.2")
            .with_timeout(30)
            .with_max_context(8192)
            .with_temperature(5.0);
        assert_eq!(rewriter.base_url(), "http://localhost:11434");
        assert_eq!(rewriter.timeout_seconds, 30);
        assert_eq!(rewriter.max_context_tokens, 8192);
        assert_eq!(rewriter.temperature, 2.0);
        assert_eq!(rewriter.name(), "llama3.2");
    }

    #[test]
    fn test_unreachable_server() {
        let rewriter = OllamaRewriter::new("http://127.0.0.1:1", "m").with_timeout(2);
        let err = rewriter.rewrite("CREATE TABLE t (id INT);", "postgres").unwrap_err();
        assert!(matches!(
            err,
            RewriteError::ConnectionError(_) | RewriteError::Timeout(_)
        ));
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateRequest {
            model: "m",
            prompt: "p",
            stream: false,
            options: GenerateOptions {
                temperature: 0.1,
                num_ctx: 4096,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_ctx"], 4096);
    }
}
