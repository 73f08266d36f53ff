//! Hosted multimodal capability client.
//!
//! Both pipeline stages talk to the model through `MultimodalClient`:
//! one document payload plus one instruction in, one text response out.
//! The response is treated as untrusted text; parsing lives with the
//! caller, never here.

use std::collections::VecDeque;
use std::sync::Mutex;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::ModelError;

/// A capability that accepts (payload bytes, media type, instruction text)
/// and returns a text response expected to contain a JSON body.
pub trait MultimodalClient: Send + Sync {
    fn generate(
        &self,
        model: &str,
        instruction: &str,
        system: Option<&str>,
        payload: &[u8],
        media_type: &str,
    ) -> Result<String, ModelError>;
}

/// Ollama HTTP client for multimodal inference via `/api/chat`.
pub struct OllamaMultimodalClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaMultimodalClient {
    /// Create a client pointing at an Ollama instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default local instance at localhost:11434 with 5-minute timeout.
    pub fn default_local() -> Self {
        Self::new("http://localhost:11434", 300)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl MultimodalClient for OllamaMultimodalClient {
    fn generate(
        &self,
        model: &str,
        instruction: &str,
        system: Option<&str>,
        payload: &[u8],
        media_type: &str,
    ) -> Result<String, ModelError> {
        let url = format!("{}/api/chat", self.base_url);
        let encoded = base64::engine::general_purpose::STANDARD.encode(payload);

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
                images: None,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: instruction,
            images: Some(vec![encoded]),
        });

        let body = ChatRequest {
            model,
            messages,
            stream: false,
        };

        tracing::debug!(
            model,
            media_type,
            payload_bytes = payload.len(),
            "submitting document to model"
        );

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                ModelError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                ModelError::Timeout(self.timeout_secs)
            } else {
                ModelError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ModelError::ResponseDecode(e.to_string()))?;

        Ok(parsed.message.content)
    }
}

/// One scripted reply for `MockMultimodalClient`.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text as the model response.
    Text(String),
    /// Simulate a transient service failure.
    ServiceFailure,
}

/// Mock model client for testing — replays a script of responses and
/// records every instruction it was called with.
pub struct MockMultimodalClient {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    calls: Mutex<Vec<String>>,
}

impl MockMultimodalClient {
    /// A client that always returns the same text.
    pub fn new(response: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: MockReply::Text(response.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A client that replays `replies` in order, then repeats the last one.
    pub fn scripted(replies: Vec<MockReply>) -> Self {
        let fallback = replies.last().cloned().unwrap_or(MockReply::ServiceFailure);
        Self {
            script: Mutex::new(replies.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Instructions seen so far, in call order.
    pub fn instructions(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl MultimodalClient for MockMultimodalClient {
    fn generate(
        &self,
        _model: &str,
        instruction: &str,
        _system: Option<&str>,
        _payload: &[u8],
        _media_type: &str,
    ) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(instruction.to_string());
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::ServiceFailure => Err(ModelError::Connection("http://mock:11434".into())),
        }
    }
}
