//! # Deck Model
//!
//! Wire shapes for the structured model response (`DeckContent`,
//! `SlideContent`) and the working deck the pipeline carries
//! (`Deck`, `Slide`). Wire types are camelCase to match the
//! structured-output schema sent to the service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GenerationError;

/// Brand font preference, carried through to rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrandFont {
    #[default]
    Sans,
    Serif,
    Mono,
}

/// User-supplied brand identity. The pipeline only carries this along;
/// the model never invents brand values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandIdentity {
    #[serde(default)]
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    #[serde(default)]
    pub font: BrandFont,
}

impl Default for BrandIdentity {
    fn default() -> Self {
        Self {
            logo_url: None,
            primary_color: "#0ea5e9".to_string(),
            secondary_color: "#64748b".to_string(),
            font: BrandFont::Sans,
        }
    }
}

/// One slide as the model returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideContent {
    pub title: String,
    pub bullet_points: Vec<String>,
    pub image_prompt: String,
    pub speaker_notes: String,
}

/// A slide in the working deck. Created once by the generation client and
/// never removed; only the image fields are mutated afterwards, by the
/// progressive filler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: Uuid,
    #[serde(flatten)]
    pub content: SlideContent,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_loading: bool,
}

/// The full deck as the model returns it, before identifiers and brand
/// identity are attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckContent {
    pub company_name: String,
    pub tagline: String,
    pub title: String,
    pub slides: Vec<SlideContent>,
}

impl DeckContent {
    /// Explicit schema guard: the service declares the schema but is not
    /// guaranteed to honor the slide-count mandate. A mismatch would break
    /// the deck/template invariant, so it is rejected rather than padded
    /// or truncated.
    pub fn validate(&self, expected_slides: usize) -> Result<(), GenerationError> {
        if self.slides.len() != expected_slides {
            return Err(GenerationError::Parse(format!(
                "expected {} slides, model returned {}",
                expected_slides,
                self.slides.len()
            )));
        }
        Ok(())
    }

    /// Promote parsed content to a working deck: fresh slide identifiers,
    /// caller-supplied brand identity, image fields unset.
    pub fn into_deck(self, brand: BrandIdentity) -> Deck {
        let slides = self
            .slides
            .into_iter()
            .map(|content| Slide {
                id: Uuid::new_v4(),
                content,
                image_url: None,
                image_loading: false,
            })
            .collect();
        Deck {
            company_name: self.company_name,
            tagline: self.tagline,
            title: self.title,
            brand,
            slides,
        }
    }
}

/// The generated presentation: metadata plus ordered slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub company_name: String,
    pub tagline: String,
    pub title: String,
    pub brand: BrandIdentity,
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Serialize for embedding into a critique/refine prompt.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
