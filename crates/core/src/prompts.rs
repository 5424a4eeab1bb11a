//! # Prompt Construction
//!
//! Base personas are bundled at compile time from `defaults/`; the dynamic
//! sections (output language, brand guidance, topic structure, visual style)
//! are appended per request from the catalog tables and user input.

use crate::catalog::{Language, PitchTemplate};
use crate::deck::BrandIdentity;

/// Drafter - turns an idea into a structured deck
pub const DRAFTER: &str = include_str!("defaults/drafter.md");

/// Critic - adversarial reviewer of a drafted deck
pub const CRITIC: &str = include_str!("defaults/critic.md");

/// Refiner - rewrites the deck against the critique
pub const REFINER: &str = include_str!("defaults/refiner.md");

/// Fixed critique used when the reviewer returns nothing. The critique is
/// advisory and must never block the pipeline.
pub const FALLBACK_CRITIQUE: &str = "This is trash.";

/// System instruction for the draft call.
pub fn draft_instruction(
    template: PitchTemplate,
    language: Language,
    brand: &BrandIdentity,
    style_modifier: &str,
) -> String {
    let topics = template.topics();
    let topic_list = serde_json::to_string(topics).unwrap_or_default();
    format!(
        "{DRAFTER}\n\
         OUTPUT LANGUAGE:\n\
         All slide titles, bullet points, and speaker notes MUST be in {lang}.\n\n\
         BRAND COLORS:\n\
         The user has a design system with Primary Color: {primary} and Secondary Color: {secondary}.\n\
         If appropriate, incorporate color descriptions into the 'imagePrompt' that complement these colors \
         (e.g., if Primary is blue, ask for 'cool tones' or 'blue accents').\n\n\
         STRICT STRUCTURE REQUIREMENT:\n\
         You MUST generate exactly {count} slides.\n\
         The slides MUST follow this exact order and content guide:\n\
         {topic_list}\n\n\
         VISUAL STYLE:\n\
         All image prompts must adhere to: {style_modifier}.\n\
         Do NOT ask for text in the images.\n",
        lang = language.display_name(),
        primary = brand.primary_color,
        secondary = brand.secondary_color,
        count = topics.len(),
    )
}

/// User prompt for the draft call.
pub fn draft_prompt(idea: &str) -> String {
    format!("Startup Idea: \"{idea}\"\n\nGenerate the pitch deck now.")
}

/// System instruction for the critique call.
pub fn critique_instruction(language: Language) -> String {
    format!(
        "{CRITIC}\n\
         OUTPUT LANGUAGE:\n\
         The critique MUST be in {lang}.\n",
        lang = language.display_name(),
    )
}

/// User prompt for the critique call.
pub fn critique_prompt(deck_json: &str) -> String {
    format!("Here is a pitch deck. ROAST IT.\n\nDeck: {deck_json}")
}

/// System instruction for the refine call.
pub fn refine_instruction(language: Language, style_modifier: &str) -> String {
    format!(
        "{REFINER}\n\
         OUTPUT LANGUAGE:\n\
         The refined deck MUST be in {lang}.\n\n\
         VISUAL STYLE:\n\
         Keep the image prompts aligned with: {style_modifier}.\n",
        lang = language.display_name(),
    )
}

/// User prompt for the refine call.
pub fn refine_prompt(deck_json: &str, critique: &str) -> String {
    format!(
        "Original Deck: {deck_json}\n\n\
         Reviewer Critique: {critique}\n\n\
         Re-generate the full deck now."
    )
}

/// Final prompt for a single slide image.
pub fn image_prompt(slide_prompt: &str, style_modifier: &str) -> String {
    format!(
        "{slide_prompt} . Style details: {style_modifier}. No text, no words, high quality render."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VisualStyle;

    #[test]
    fn test_all_personas_non_empty() {
        for (slug, content) in [("drafter", DRAFTER), ("critic", CRITIC), ("refiner", REFINER)] {
            assert!(!content.is_empty(), "Prompt '{}' should not be empty", slug);
            assert!(content.len() > 50, "Prompt '{}' seems too short", slug);
        }
    }

    #[test]
    fn test_draft_instruction_embeds_structure_and_language() {
        let brand = BrandIdentity::default();
        let instruction = draft_instruction(
            PitchTemplate::Yc,
            Language::De,
            &brand,
            VisualStyle::Swiss.prompt_modifier(),
        );
        assert!(instruction.contains("exactly 10 slides"));
        assert!(instruction.contains("Deutsch"));
        assert!(instruction.contains(&brand.primary_color));
        assert!(instruction.contains("swiss international style"));
        // Every topic guide makes it into the structure section.
        for topic in PitchTemplate::Yc.topics() {
            assert!(instruction.contains(topic), "missing topic guide: {topic}");
        }
    }

    #[test]
    fn test_critique_and_refine_carry_language() {
        assert!(critique_instruction(Language::Ja).contains("日本語"));
        assert!(refine_instruction(Language::Fr, "modifier").contains("Français"));
    }

    #[test]
    fn test_image_prompt_forbids_text() {
        let prompt = image_prompt("a camera on a desk", "clean lines");
        assert!(prompt.contains("a camera on a desk"));
        assert!(prompt.contains("clean lines"));
        assert!(prompt.contains("No text, no words"));
    }
}
