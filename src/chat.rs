/*
 * @file chat.rs
 * @brief Chat service adapters for Gemini and Ollama
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Chat service adapters.
//!
//! The assistant runs in stateless mode: every turn rebuilds the whole
//! context (rules, fresh device state, trailing history, utterance) and
//! submits it as one prompt, so the model never answers from stale state.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, LlmProvider};
use crate::error::{Error, Result};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

const OLLAMA_API_URL: &str = "http://localhost:11434";

/// Text-in, text-out completion service.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Submits a prompt and returns the reply text unmodified.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Builds the configured backend.
///
/// # Errors
/// Returns [`Error::Config`] if the HTTP client cannot be built.
pub fn from_config(config: &AppConfig) -> Result<Box<dyn ChatClient>> {
    let timeout = config.request_timeout();
    let model = config.model();
    match config.llm_provider {
        LlmProvider::Gemini => {
            let base = config.llm_base_url.as_deref().unwrap_or(GEMINI_API_URL);
            Ok(Box::new(GeminiClient::new(base, &config.llm_api_key, &model, timeout)?))
        }
        LlmProvider::Ollama => {
            let base = config.llm_base_url.as_deref().unwrap_or(OLLAMA_API_URL);
            Ok(Box::new(OllamaClient::new(base, &model, timeout)?))
        }
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| Error::Config(format!("failed to build HTTP client: {}", err)))
}

/// Sends the request and maps transport and status failures.
async fn send_checked(request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
    let response = request.send().await.map_err(Error::connection)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::ChatStatus {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Google Gemini `generateContent` backend.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiReplyContent>,
}

#[derive(Deserialize)]
struct GeminiReplyContent {
    #[serde(default)]
    parts: Vec<GeminiReplyPart>,
}

#[derive(Deserialize)]
struct GeminiReplyPart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
        };
        tracing::debug!(model = %self.model, "sending prompt to Gemini");
        let response = send_checked(
            self.client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&request),
        )
        .await?;
        let reply: GeminiResponse = response
            .json()
            .await
            .map_err(|err| Error::Payload(format!("Gemini response: {}", err)))?;
        let text: String = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();
        if text.is_empty() {
            return Err(Error::Payload("Gemini returned no text".to_string()));
        }
        Ok(text)
    }
}

/// Local Ollama `/api/chat` backend.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

/// Chat message structure for the Ollama API.
#[derive(Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
        };
        tracing::debug!(model = %self.model, "sending prompt to Ollama");
        let response = send_checked(
            self.client
                .post(format!("{}/api/chat", self.base_url))
                .json(&request),
        )
        .await?;
        let reply: OllamaResponse = response
            .json()
            .await
            .map_err(|err| Error::Payload(format!("Ollama response: {}", err)))?;
        Ok(reply.message.content)
    }
}
