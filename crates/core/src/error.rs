//! # Error Taxonomy
//!
//! Typed failures for the generation boundary. How each variant is handled
//! depends on the pipeline stage: a draft parse failure aborts the run, a
//! refine parse failure falls back to the unrefined deck, and image failures
//! are absorbed into a placeholder before they can reach a caller.

use thiserror::Error;

/// Errors produced at the generation-service boundary.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No usable credential session. Also produced when the upstream service
    /// reports an expired/unknown key so the raw message is never surfaced.
    #[error("API key session expired or missing. Select a key and try again.")]
    Credential,

    /// The service answered without usable content (empty body, no candidates,
    /// transport failure).
    #[error("generation service returned no content: {0}")]
    Upstream(String),

    /// The structured response did not match the deck schema.
    #[error("failed to generate a valid deck structure: {0}")]
    Parse(String),

    /// A single image request failed. Never escapes `image_for`.
    #[error("image generation failed: {0}")]
    Image(String),
}

impl GenerationError {
    /// Remap upstream messages that indicate a dead credential session.
    ///
    /// The service reports an expired or revoked key as a generic
    /// "Requested entity was not found" error; surfacing that verbatim would
    /// send the user hunting for a missing model instead of a missing key.
    pub fn from_upstream(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("Requested entity was not found")
            || message.contains("API key expired")
        {
            GenerationError::Credential
        } else {
            GenerationError::Upstream(message)
        }
    }
}
