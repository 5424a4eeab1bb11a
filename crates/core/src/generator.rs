//! # Deck Generator
//!
//! The four generation operations: structured draft, adversarial critique,
//! structured refinement, and single-slide image synthesis. Each builds its
//! prompt from the catalog data and the user submission, and owns the
//! stage-appropriate failure behavior: draft failures are fatal to the run,
//! a failed refinement degrades to the unrefined deck, a failed critique
//! degrades to a fixed fallback, and a failed image degrades to a
//! deterministic placeholder.

use std::sync::Arc;

use uuid::Uuid;

use crate::deck::{Deck, DeckContent};
use crate::error::GenerationError;
use crate::gemini::{deck_schema, GenerationBackend};
use crate::models::DeckRequest;
use crate::prompts;

/// Fixed aspect ratio for slide imagery.
pub const IMAGE_ASPECT_RATIO: &str = "16:9";
/// Fixed resolution tier for slide imagery.
pub const IMAGE_SIZE: &str = "1K";

/// Deterministic placeholder for a slide whose image request failed.
pub fn placeholder_image(slide_id: &Uuid) -> String {
    format!("https://picsum.photos/seed/{slide_id}/1280/720")
}

/// Stateless operations over the generation backend for one submission.
pub struct DeckGenerator {
    backend: Arc<dyn GenerationBackend>,
    request: DeckRequest,
}

impl DeckGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>, request: DeckRequest) -> Self {
        Self { backend, request }
    }

    pub fn request(&self) -> &DeckRequest {
        &self.request
    }

    /// Initial structured draft. Parse and slide-count failures are fatal:
    /// there is nothing to fall back to.
    pub async fn draft(&self) -> Result<Deck, GenerationError> {
        let system = prompts::draft_instruction(
            self.request.template,
            self.request.language,
            &self.request.brand,
            self.request.style_modifier(),
        );
        let prompt = prompts::draft_prompt(&self.request.idea);

        let raw = self
            .backend
            .generate_structured(&system, &prompt, deck_schema())
            .await?;
        let content: DeckContent =
            serde_json::from_str(&raw).map_err(|e| GenerationError::Parse(e.to_string()))?;
        content.validate(self.request.template.slide_count())?;
        Ok(content.into_deck(self.request.brand.clone()))
    }

    /// Adversarial review. Advisory only: an empty or failed critique
    /// becomes the fixed fallback string, never an error.
    pub async fn critique(&self, deck: &Deck) -> String {
        let system = prompts::critique_instruction(self.request.language);
        let prompt = prompts::critique_prompt(&deck.to_prompt_json());

        match self.backend.generate_text(&system, &prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => prompts::FALLBACK_CRITIQUE.to_string(),
            Err(e) => {
                tracing::warn!("critique unavailable, using fallback: {e}");
                prompts::FALLBACK_CRITIQUE.to_string()
            }
        }
    }

    /// Rewrite the deck against the critique. An empty upstream response is
    /// fatal, but a malformed one degrades gracefully: the original deck is
    /// returned unchanged, identifiers included.
    pub async fn refine(
        &self,
        original: &Deck,
        critique: &str,
    ) -> Result<Deck, GenerationError> {
        let system =
            prompts::refine_instruction(self.request.language, self.request.style_modifier());
        let prompt = prompts::refine_prompt(&original.to_prompt_json(), critique);

        let raw = self
            .backend
            .generate_structured(&system, &prompt, deck_schema())
            .await?;

        let parsed = serde_json::from_str::<DeckContent>(&raw)
            .map_err(|e| GenerationError::Parse(e.to_string()))
            .and_then(|content| {
                content.validate(original.slides.len())?;
                Ok(content)
            });

        match parsed {
            Ok(content) => Ok(content.into_deck(original.brand.clone())),
            Err(e) => {
                tracing::warn!("refinement discarded, keeping draft: {e}");
                Ok(original.clone())
            }
        }
    }

    /// Resolve one slide's image. Always produces a reference: real image
    /// bytes as a data URI, or the deterministic placeholder on any failure.
    pub async fn image_for(&self, slide_id: &Uuid, slide_prompt: &str) -> String {
        let prompt = prompts::image_prompt(slide_prompt, self.request.style_modifier());

        match self
            .backend
            .generate_image(&prompt, IMAGE_ASPECT_RATIO, IMAGE_SIZE)
            .await
        {
            Ok(payload) => format!("data:{};base64,{}", payload.mime_type, payload.data),
            Err(e) => {
                tracing::warn!(slide = %slide_id, "image generation failed, using placeholder: {e}");
                placeholder_image(slide_id)
            }
        }
    }
}
