//! # Pipeline Stages
//!
//! The stage machine a deck run walks through, the observable state
//! container snapshot, and the run token that lets a reset invalidate
//! whatever a discarded run still has in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::deck::Deck;

/// Stage of a deck run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeckStage {
    /// Waiting for a submission
    #[default]
    Idle,
    /// Verifying a credential session exists
    CheckingCredentials,
    /// Initial structured draft
    Drafting,
    /// Adversarial review of the draft
    Critiquing,
    /// Rewriting the draft against the critique
    Refining,
    /// Progressive per-slide image fill
    GeneratingImages,
    /// Terminal until an explicit reset
    Complete,
}

/// The deck pipeline state machine. Transitions are strictly forward on
/// success; any failure before the image stage returns to Idle.
#[derive(Debug, Clone, Default)]
pub struct DeckPipeline {
    /// Current stage
    pub stage: DeckStage,
}

impl DeckPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next stage
    pub fn advance(&mut self) {
        self.stage = match self.stage {
            DeckStage::Idle => DeckStage::CheckingCredentials,
            DeckStage::CheckingCredentials => DeckStage::Drafting,
            DeckStage::Drafting => DeckStage::Critiquing,
            DeckStage::Critiquing => DeckStage::Refining,
            DeckStage::Refining => DeckStage::GeneratingImages,
            DeckStage::GeneratingImages => DeckStage::Complete,
            DeckStage::Complete => DeckStage::Complete,
        };
    }

    /// Fail the run: partial work is discarded, state returns to Idle
    pub fn fail(&mut self) {
        self.stage = DeckStage::Idle;
    }

    /// Explicit user reset
    pub fn reset(&mut self) {
        self.stage = DeckStage::Idle;
    }

    pub fn is_complete(&self) -> bool {
        self.stage == DeckStage::Complete
    }
}

/// Snapshot of a run's observable state, surfaced over the status endpoint
/// and folded from the event stream.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    pub stage: DeckStage,
    pub idea: String,
    #[serde(default)]
    pub deck: Option<Deck>,
    #[serde(default)]
    pub error: Option<String>,
    /// 0-100, image stage only
    #[serde(default)]
    pub progress: f32,
}

/// Monotonic run-generation counter shared between the surface and the
/// pipeline. Bumped on every reset.
pub type RunGeneration = Arc<AtomicU64>;

/// Captured at the start of a run. In-flight work checks `is_current`
/// before applying an update, so a reset silently discards late-settling
/// responses instead of resurrecting a discarded run.
#[derive(Debug, Clone)]
pub struct RunToken {
    generation: RunGeneration,
    seen: u64,
}

impl RunToken {
    pub fn capture(generation: &RunGeneration) -> Self {
        Self {
            generation: Arc::clone(generation),
            seen: generation.load(Ordering::SeqCst),
        }
    }

    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.seen
    }
}

/// Invalidate all outstanding run tokens.
pub fn invalidate_runs(generation: &RunGeneration) {
    generation.fetch_add(1, Ordering::SeqCst);
}
