//! # Generation Client
//!
//! Thin request/response wrapper around the external generative service.
//! The [`GenerationBackend`] trait is the seam the pipeline and filler are
//! written against; [`GeminiClient`] implements it over the REST surface of
//! `generativelanguage.googleapis.com`. The base URL is overridable for
//! compatible endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::error::GenerationError;
use crate::models::ModelConfig;

/// Inline image bytes as the service returns them (base64 payload + MIME).
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub mime_type: String,
    /// Base64-encoded image bytes, passed through to the data-URI reference.
    pub data: String,
}

/// The external generation-service boundary.
///
/// All operations are stateless request/response. Credential handling is
/// part of the boundary: the pipeline gates on `has_credentials` and calls
/// `request_credentials` exactly once before giving up.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Whether a credential session is available.
    async fn has_credentials(&self) -> bool;

    /// Ask the surrounding environment to establish a credential session.
    async fn request_credentials(&self);

    /// Text call constrained to a structured-output schema. Returns the raw
    /// JSON body text of the response.
    async fn generate_structured(
        &self,
        system: &str,
        prompt: &str,
        schema: Value,
    ) -> Result<String, GenerationError>;

    /// Free-text call.
    async fn generate_text(&self, system: &str, prompt: &str)
        -> Result<String, GenerationError>;

    /// Single-image call.
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: &str,
        image_size: &str,
    ) -> Result<ImagePayload, GenerationError>;
}

/// Runtime-mutable credential session. Seeded from `GEMINI_API_KEY`;
/// replaceable through the settings surface without a restart.
#[derive(Clone, Default)]
pub struct CredentialStore {
    key: Arc<RwLock<Option<String>>>,
}

impl CredentialStore {
    pub fn from_env() -> Self {
        let store = Self::default();
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                if let Ok(mut slot) = store.key.try_write() {
                    *slot = Some(key);
                }
            }
        }
        store
    }

    pub async fn set_key(&self, key: impl Into<String>) {
        *self.key.write().await = Some(key.into());
    }

    pub async fn key(&self) -> Option<String> {
        self.key.read().await.clone()
    }

    pub async fn has_key(&self) -> bool {
        self.key.read().await.is_some()
    }
}

// === Wire types ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

impl RequestContent {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![RequestPart {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
    image_size: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct InlineData {
    mime_type: Option<String>,
    data: Option<String>,
}

impl GenerateContentResponse {
    /// First non-empty text part across candidates.
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
    }

    /// First inline image part across candidates.
    fn first_image(self) -> Option<ImagePayload> {
        self.candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.inline_data)
            .and_then(|inline| {
                inline.data.map(|data| ImagePayload {
                    mime_type: inline.mime_type.unwrap_or_else(|| "image/png".to_string()),
                    data,
                })
            })
    }
}

/// Structured-output schema for a deck, in the service's schema dialect.
/// Field descriptions double as generation guidance.
pub fn deck_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "companyName": { "type": "STRING", "description": "A catchy name for the startup" },
            "tagline": { "type": "STRING", "description": "A punchy one-liner value prop" },
            "title": { "type": "STRING", "description": "The title of the deck" },
            "slides": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": {
                            "type": "STRING",
                            "description": "DECLARATIVE slide headline. Do not use generic titles like 'Problem'. Use 'Diabetes is a Global Pandemic'."
                        },
                        "bulletPoints": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "3-4 punchy, short bullet points. Be specific with numbers and strategy."
                        },
                        "imagePrompt": {
                            "type": "STRING",
                            "description": "A detailed visual description for an AI image generator (NO TEXT IN IMAGE). Describe the scene, objects, or metaphor."
                        },
                        "speakerNotes": {
                            "type": "STRING",
                            "description": "A script for the founder to say while presenting this slide."
                        }
                    },
                    "required": ["title", "bulletPoints", "imagePrompt", "speakerNotes"]
                }
            }
        },
        "required": ["companyName", "tagline", "title", "slides"]
    })
}

/// REST client for the generation service.
pub struct GeminiClient {
    http: reqwest::Client,
    credentials: CredentialStore,
    config: ModelConfig,
}

impl GeminiClient {
    pub fn new(credentials: CredentialStore, config: ModelConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            config,
        }
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let key = self
            .credentials
            .key()
            .await
            .ok_or(GenerationError::Credential)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, model
        );

        let response = self
            .http
            .post(&url)
            .query(&[("key", key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::from_upstream(format!("{status}: {body}")));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| GenerationError::Upstream(e.to_string()))
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn has_credentials(&self) -> bool {
        self.credentials.has_key().await
    }

    async fn request_credentials(&self) {
        // No key-selection UI exists on this side of the boundary; the
        // surrounding surface reacts to the CredentialRequired event.
        tracing::warn!(
            "no API key selected; set GEMINI_API_KEY or use the settings endpoint"
        );
    }

    async fn generate_structured(
        &self,
        system: &str,
        prompt: &str,
        schema: Value,
    ) -> Result<String, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent::text(prompt)],
            system_instruction: Some(RequestContent::text(system)),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
                image_config: None,
            }),
        };
        self.generate(&self.config.text_model, &request)
            .await?
            .first_text()
            .ok_or_else(|| GenerationError::Upstream("no text returned".to_string()))
    }

    async fn generate_text(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent::text(prompt)],
            system_instruction: Some(RequestContent::text(system)),
            generation_config: None,
        };
        self.generate(&self.config.text_model, &request)
            .await?
            .first_text()
            .ok_or_else(|| GenerationError::Upstream("no text returned".to_string()))
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: &str,
        image_size: &str,
    ) -> Result<ImagePayload, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent::text(prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                response_schema: None,
                image_config: Some(ImageConfig {
                    aspect_ratio: aspect_ratio.to_string(),
                    image_size: image_size.to_string(),
                }),
            }),
        };
        self.generate(&self.config.image_model, &request)
            .await?
            .first_image()
            .ok_or_else(|| {
                GenerationError::Image("no image data found in response".to_string())
            })
    }
}
