//! Scripted backend for exercising the pipeline without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::deck::{DeckContent, SlideContent};
use crate::error::GenerationError;
use crate::gemini::{GenerationBackend, ImagePayload};

/// Backend double with scripted responses and request recording.
#[derive(Default)]
pub struct MockBackend {
    pub credentialed: AtomicBool,
    pub credential_requests: AtomicUsize,
    /// Scripted responses for structured calls, consumed in order.
    pub structured: Mutex<VecDeque<Result<String, GenerationError>>>,
    /// Scripted responses for free-text calls, consumed in order.
    pub text: Mutex<VecDeque<Result<String, GenerationError>>>,
    pub fail_all_images: AtomicBool,
    /// System instructions seen by text/structured calls.
    pub recorded_systems: Mutex<Vec<String>>,
    /// User prompts seen by text/structured calls.
    pub recorded_prompts: Mutex<Vec<String>>,
    /// Prompts seen by image calls, in issue order.
    pub image_calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    /// Peak number of concurrently outstanding image requests.
    pub max_in_flight: AtomicUsize,
    settled_images: AtomicUsize,
    /// Settled-image count observed at the moment each image request was
    /// issued. Batch sequencing shows up as [0, 0, 2, 2, 4, ...].
    pub issue_log: Mutex<Vec<usize>>,
}

impl MockBackend {
    pub fn credentialed() -> Self {
        let backend = Self::default();
        backend.credentialed.store(true, Ordering::SeqCst);
        backend
    }

    pub fn push_structured(&self, response: Result<String, GenerationError>) {
        self.structured.lock().unwrap().push_back(response);
    }

    pub fn push_text(&self, response: Result<String, GenerationError>) {
        self.text.lock().unwrap().push_back(response);
    }
}

/// A schema-valid deck body with `slides` slides, camelCase wire format.
pub fn deck_json(slides: usize) -> String {
    let content = DeckContent {
        company_name: "LensLoop".to_string(),
        tagline: "Pro glass, zero commitment".to_string(),
        title: "LensLoop Investor Deck".to_string(),
        slides: (0..slides)
            .map(|i| SlideContent {
                title: format!("Declarative Headline {i}"),
                bullet_points: vec![format!("point {i}")],
                image_prompt: format!("scene {i}"),
                speaker_notes: format!("notes {i}"),
            })
            .collect(),
    };
    serde_json::to_string(&content).unwrap()
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn has_credentials(&self) -> bool {
        self.credentialed.load(Ordering::SeqCst)
    }

    async fn request_credentials(&self) {
        self.credential_requests.fetch_add(1, Ordering::SeqCst);
    }

    async fn generate_structured(
        &self,
        system: &str,
        prompt: &str,
        _schema: Value,
    ) -> Result<String, GenerationError> {
        self.recorded_systems.lock().unwrap().push(system.to_string());
        self.recorded_prompts.lock().unwrap().push(prompt.to_string());
        self.structured
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(GenerationError::Upstream(
                    "mock: no scripted structured response".to_string(),
                ))
            })
    }

    async fn generate_text(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        self.recorded_systems.lock().unwrap().push(system.to_string());
        self.recorded_prompts.lock().unwrap().push(prompt.to_string());
        self.text.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(GenerationError::Upstream(
                "mock: no scripted text response".to_string(),
            ))
        })
    }

    async fn generate_image(
        &self,
        prompt: &str,
        _aspect_ratio: &str,
        _image_size: &str,
    ) -> Result<ImagePayload, GenerationError> {
        self.issue_log
            .lock()
            .unwrap()
            .push(self.settled_images.load(Ordering::SeqCst));
        self.image_calls.lock().unwrap().push(prompt.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Yield so batch siblings overlap.
        tokio::time::sleep(Duration::from_millis(5)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.settled_images.fetch_add(1, Ordering::SeqCst);

        if self.fail_all_images.load(Ordering::SeqCst) {
            Err(GenerationError::Image("mock: image failure".to_string()))
        } else {
            Ok(ImagePayload {
                mime_type: "image/png".to_string(),
                data: "Zm9vYmFy".to_string(),
            })
        }
    }
}
