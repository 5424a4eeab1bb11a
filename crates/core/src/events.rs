//! # Pipeline Events
//!
//! Event types the presentation layer subscribes to. Every stage transition
//! and per-slide image settle is announced here; the server bridges these
//! onto its broadcast/SSE surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::DeckStage;

/// Kind of pipeline event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeckEventKind {
    /// A run was submitted
    PipelineStarted,
    /// The pipeline moved to a new stage
    StageChanged,
    /// No credential session; the surface should prompt for a key
    CredentialRequired,
    /// The adversarial review finished (data carries a preview)
    CritiqueReady,
    /// One slide's image settled (real or placeholder)
    SlideImageReady,
    /// Image-fill progress moved (data carries percent)
    ImageProgress,
    /// The run finished; the deck is complete
    PipelineCompleted,
    /// The run failed and the state returned to idle
    PipelineFailed,
}

/// An event in a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckEvent {
    /// Unique event ID
    pub id: Uuid,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: DeckEventKind,
    /// Stage the pipeline was in when the event fired
    pub stage: DeckStage,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl DeckEvent {
    pub fn new(kind: DeckEventKind, stage: DeckStage) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            stage,
            data: None,
        }
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = DeckEvent::new(DeckEventKind::StageChanged, DeckStage::Drafting)
            .with_data(serde_json::json!({"stage": "drafting"}));

        assert_eq!(event.kind, DeckEventKind::StageChanged);
        assert_eq!(event.stage, DeckStage::Drafting);
        assert!(event.data.is_some());
    }

    #[test]
    fn test_event_serializes_snake_case_kind() {
        let event = DeckEvent::new(DeckEventKind::SlideImageReady, DeckStage::GeneratingImages);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "slide_image_ready");
        assert_eq!(json["stage"], "generating_images");
    }
}
