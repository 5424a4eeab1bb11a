//! # Pitchforge Models
//!
//! Centralized generation configuration: which upstream models serve the
//! text and image calls, and the per-submission request the pipeline runs.

use serde::{Deserialize, Serialize};

use crate::catalog::{Language, PitchTemplate, VisualStyle};
use crate::deck::BrandIdentity;

/// Configuration for the generation-service models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model for draft/critique/refine text calls
    pub text_model: String,
    /// Model for per-slide image synthesis
    pub image_model: String,
    /// Base URL of the generation service (overridable for compatible
    /// endpoints and test harnesses)
    pub base_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            text_model: "gemini-3-pro-preview".to_string(),
            image_model: "gemini-3-pro-image-preview".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

impl ModelConfig {
    /// Set base URL (for compatible endpoints)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// One user submission: everything a pipeline run needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRequest {
    pub idea: String,
    pub template: PitchTemplate,
    pub style: VisualStyle,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub brand: BrandIdentity,
    /// Free-text style modifier; only honored when `style` is `custom`.
    #[serde(default)]
    pub custom_style: Option<String>,
}

impl DeckRequest {
    /// Reject unusable submissions before any network call is made.
    pub fn validate(&self) -> Result<(), String> {
        if self.idea.trim().is_empty() {
            return Err("Describe your startup idea before generating.".to_string());
        }
        if self.style == VisualStyle::Custom
            && self
                .custom_style
                .as_deref()
                .map_or(true, |s| s.trim().is_empty())
        {
            return Err(
                "Custom style selected but no style description was provided.".to_string(),
            );
        }
        Ok(())
    }

    /// Effective image-style modifier for this request.
    pub fn style_modifier(&self) -> &str {
        self.style.resolved_modifier(self.custom_style.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> DeckRequest {
        DeckRequest {
            idea: "A marketplace for renting high-end cameras".to_string(),
            template: PitchTemplate::Yc,
            style: VisualStyle::TechMinimal,
            language: Language::En,
            brand: BrandIdentity::default(),
            custom_style: None,
        }
    }

    #[test]
    fn test_default_models() {
        let config = ModelConfig::default();
        assert!(config.text_model.contains("gemini"));
        assert!(config.image_model.contains("image"));
        let config = config.with_base_url("http://localhost:9090");
        assert_eq!(config.base_url, "http://localhost:9090");
    }

    #[test]
    fn test_blank_idea_is_rejected() {
        let mut req = request();
        req.idea = "   ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_custom_style_requires_override_text() {
        let mut req = request();
        req.style = VisualStyle::Custom;
        req.custom_style = None;
        assert!(req.validate().is_err());

        req.custom_style = Some("  ".to_string());
        assert!(req.validate().is_err());

        req.custom_style = Some("ukiyo-e woodblock print".to_string());
        assert!(req.validate().is_ok());
        assert_eq!(req.style_modifier(), "ukiyo-e woodblock print");
    }

    #[test]
    fn test_preset_style_ignores_override() {
        let mut req = request();
        req.custom_style = Some("ukiyo-e woodblock print".to_string());
        assert_eq!(req.style_modifier(), VisualStyle::TechMinimal.prompt_modifier());
    }
}
