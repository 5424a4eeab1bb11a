//! # Deck Coordinator
//!
//! Walks one submission through the pipeline:
//! credentials → draft → critique → refine → image fill → complete.
//! Stage transitions are strictly forward; a failure in any stage before
//! the image fill discards partial work and returns the run to Idle with a
//! user-facing error. Events stream to an optional channel so a surface can
//! mirror the run live.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::{mpsc, RwLock};

use crate::deck::Deck;
use crate::error::GenerationError;
use crate::events::{DeckEvent, DeckEventKind};
use crate::filler::ImageFiller;
use crate::gemini::GenerationBackend;
use crate::generator::DeckGenerator;
use crate::models::DeckRequest;
use crate::pipeline::{DeckPipeline, DeckStage, RunGeneration, RunToken};

/// Shared slot holding the run's working deck. The filler mutates the
/// slides in place; the surface reads it for rendering.
pub type DeckSlot = Arc<RwLock<Option<Deck>>>;

/// The pipeline coordinator for a single run.
pub struct DeckCoordinator {
    backend: Arc<dyn GenerationBackend>,
    pipeline: DeckPipeline,
    deck: DeckSlot,
    events: Vec<DeckEvent>,
    event_tx: Option<mpsc::Sender<DeckEvent>>,
    token: RunToken,
}

impl DeckCoordinator {
    pub fn new(backend: Arc<dyn GenerationBackend>, generation: &RunGeneration) -> Self {
        Self {
            backend,
            pipeline: DeckPipeline::new(),
            deck: Arc::new(RwLock::new(None)),
            events: Vec::new(),
            event_tx: None,
            token: RunToken::capture(generation),
        }
    }

    /// Set event channel for streaming events
    pub fn with_event_channel(mut self, tx: mpsc::Sender<DeckEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Share an externally owned deck slot (the server passes its own so
    /// `/deck/current` observes the fill as it happens).
    pub fn with_deck_slot(mut self, slot: DeckSlot) -> Self {
        self.deck = slot;
        self
    }

    pub fn deck_slot(&self) -> DeckSlot {
        Arc::clone(&self.deck)
    }

    pub fn stage(&self) -> DeckStage {
        self.pipeline.stage
    }

    pub fn events(&self) -> &[DeckEvent] {
        &self.events
    }

    /// Emit an event. A superseded run (reset while work was in flight)
    /// goes silent instead of resurrecting state the user discarded.
    async fn emit(&mut self, event: DeckEvent) {
        if !self.token.is_current() {
            return;
        }
        self.events.push(event.clone());
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    async fn advance_stage(&mut self) {
        self.pipeline.advance();
        let stage = self.pipeline.stage;
        self.emit(DeckEvent::new(DeckEventKind::StageChanged, stage)).await;
    }

    /// Fail the run: discard partial work, surface the error, return to Idle.
    async fn fail(&mut self, error: GenerationError) -> Result<Deck, GenerationError> {
        self.pipeline.fail();
        *self.deck.write().await = None;
        self.emit(
            DeckEvent::new(DeckEventKind::PipelineFailed, DeckStage::Idle)
                .with_data(json!({ "error": error.to_string() })),
        )
        .await;
        Err(error)
    }

    /// Run the pipeline on a submission.
    #[tracing::instrument(
        skip(self, request),
        fields(idea_preview = %request.idea.chars().take(50).collect::<String>())
    )]
    pub async fn run(&mut self, request: DeckRequest) -> Result<Deck, GenerationError> {
        self.emit(
            DeckEvent::new(DeckEventKind::PipelineStarted, DeckStage::Idle)
                .with_data(json!({ "idea": request.idea })),
        )
        .await;

        // Stage 1: credential gate. Prompt exactly once, then either
        // proceed with the fresh session or give up with the distinct
        // credential message.
        self.advance_stage().await;
        if !self.backend.has_credentials().await {
            self.emit(DeckEvent::new(
                DeckEventKind::CredentialRequired,
                DeckStage::CheckingCredentials,
            ))
            .await;
            self.backend.request_credentials().await;
            if !self.backend.has_credentials().await {
                return self.fail(GenerationError::Credential).await;
            }
        }

        let generator = DeckGenerator::new(Arc::clone(&self.backend), request);

        // Stage 2: initial draft.
        self.advance_stage().await;
        let draft = match generator.draft().await {
            Ok(deck) => deck,
            Err(e) => return self.fail(e).await,
        };

        // Stage 3: adversarial review. Advisory; never fails the run.
        self.advance_stage().await;
        let critique = generator.critique(&draft).await;
        let preview: String = critique.chars().take(150).collect();
        self.emit(
            DeckEvent::new(DeckEventKind::CritiqueReady, DeckStage::Critiquing)
                .with_data(json!({ "preview": preview })),
        )
        .await;

        // Stage 4: refinement. Parse trouble degrades to the draft inside
        // the generator; only an empty upstream response lands here.
        self.advance_stage().await;
        let refined = match generator.refine(&draft, &critique).await {
            Ok(deck) => deck,
            Err(e) => return self.fail(e).await,
        };
        *self.deck.write().await = Some(refined);

        // Stage 5: progressive image fill.
        self.advance_stage().await;
        let filler = match &self.event_tx {
            Some(tx) => ImageFiller::new(self.token.clone()).with_event_channel(tx.clone()),
            None => ImageFiller::new(self.token.clone()),
        };
        let progress = filler.run(&generator, &self.deck).await;

        if !self.token.is_current() {
            tracing::info!("run superseded by reset, discarding result");
            return Err(GenerationError::Upstream(
                "run superseded by reset".to_string(),
            ));
        }

        // Complete.
        self.advance_stage().await;
        self.emit(
            DeckEvent::new(DeckEventKind::PipelineCompleted, DeckStage::Complete)
                .with_data(json!({ "progress": progress })),
        )
        .await;

        let deck = self.deck.read().await.clone();
        deck.ok_or_else(|| GenerationError::Upstream("deck vanished mid-run".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Language, PitchTemplate, VisualStyle};
    use crate::deck::BrandIdentity;
    use crate::pipeline::invalidate_runs;
    use crate::test_support::{deck_json, MockBackend};
    use std::sync::atomic::{AtomicU64, Ordering};

    fn request() -> DeckRequest {
        DeckRequest {
            idea: "A marketplace for renting high-end cameras".to_string(),
            template: PitchTemplate::Yc,
            style: VisualStyle::Corporate,
            language: Language::En,
            brand: BrandIdentity::default(),
            custom_style: None,
        }
    }

    fn generation() -> RunGeneration {
        Arc::new(AtomicU64::new(0))
    }

    fn kinds(coordinator: &DeckCoordinator) -> Vec<DeckEventKind> {
        coordinator.events().iter().map(|e| e.kind.clone()).collect()
    }

    #[tokio::test]
    async fn test_happy_path_reaches_complete() {
        let backend = Arc::new(MockBackend::credentialed());
        backend.push_structured(Ok(deck_json(10))); // draft
        backend.push_text(Ok("Titles are too generic.".to_string())); // critique
        backend.push_structured(Ok(deck_json(10))); // refine
        let mut coordinator = DeckCoordinator::new(
            Arc::clone(&backend) as Arc<dyn GenerationBackend>,
            &generation(),
        );

        let deck = coordinator.run(request()).await.unwrap();
        assert_eq!(deck.slides.len(), 10);
        assert!(deck.slides.iter().all(|s| s.image_url.is_some()));
        assert_eq!(coordinator.stage(), DeckStage::Complete);

        let kinds = kinds(&coordinator);
        assert_eq!(kinds[0], DeckEventKind::PipelineStarted);
        assert!(kinds.contains(&DeckEventKind::CritiqueReady));
        assert_eq!(*kinds.last().unwrap(), DeckEventKind::PipelineCompleted);
        // Stage walk: credentials, draft, critique, refine, images, complete.
        let stage_changes = kinds
            .iter()
            .filter(|k| **k == DeckEventKind::StageChanged)
            .count();
        assert_eq!(stage_changes, 6);
    }

    #[tokio::test]
    async fn test_missing_credentials_prompts_once_and_never_drafts() {
        let backend = Arc::new(MockBackend::default()); // no credentials
        let mut coordinator = DeckCoordinator::new(
            Arc::clone(&backend) as Arc<dyn GenerationBackend>,
            &generation(),
        );

        let err = coordinator.run(request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Credential));
        assert_eq!(backend.credential_requests.load(Ordering::SeqCst), 1);
        // The draft call was never attempted.
        assert!(backend.recorded_systems.lock().unwrap().is_empty());
        assert_eq!(coordinator.stage(), DeckStage::Idle);
        assert!(kinds(&coordinator).contains(&DeckEventKind::CredentialRequired));
    }

    #[tokio::test]
    async fn test_draft_failure_returns_to_idle_with_error() {
        let backend = Arc::new(MockBackend::credentialed());
        backend.push_structured(Err(GenerationError::Upstream(
            "no text returned".to_string(),
        )));
        let mut coordinator = DeckCoordinator::new(
            Arc::clone(&backend) as Arc<dyn GenerationBackend>,
            &generation(),
        );

        let err = coordinator.run(request()).await.unwrap_err();
        assert!(!err.to_string().is_empty());
        assert_eq!(coordinator.stage(), DeckStage::Idle);
        // No deck was kept.
        assert!(coordinator.deck_slot().read().await.is_none());

        let failed = coordinator
            .events()
            .iter()
            .find(|e| e.kind == DeckEventKind::PipelineFailed)
            .expect("failure event");
        let message = failed.data.as_ref().unwrap()["error"].as_str().unwrap();
        assert!(!message.is_empty());
    }

    #[tokio::test]
    async fn test_refine_parse_failure_still_completes_with_draft_deck() {
        let backend = Arc::new(MockBackend::credentialed());
        backend.push_structured(Ok(deck_json(10))); // draft
        backend.push_text(Ok("Weak.".to_string())); // critique
        backend.push_structured(Ok("garbage".to_string())); // refine: malformed
        let mut coordinator = DeckCoordinator::new(
            Arc::clone(&backend) as Arc<dyn GenerationBackend>,
            &generation(),
        );

        let deck = coordinator.run(request()).await.unwrap();
        assert_eq!(deck.slides.len(), 10);
        assert_eq!(coordinator.stage(), DeckStage::Complete);
    }

    #[tokio::test]
    async fn test_superseded_run_emits_no_terminal_event() {
        let backend = Arc::new(MockBackend::credentialed());
        backend.push_structured(Ok(deck_json(10)));
        backend.push_text(Ok("Fine.".to_string()));
        backend.push_structured(Ok(deck_json(10)));
        let generation = generation();
        let mut coordinator = DeckCoordinator::new(
            Arc::clone(&backend) as Arc<dyn GenerationBackend>,
            &generation,
        );
        // Reset lands while the run is already constructed.
        invalidate_runs(&generation);

        let err = coordinator.run(request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Upstream(_)));
        let kinds = kinds(&coordinator);
        assert!(!kinds.contains(&DeckEventKind::PipelineCompleted));
        assert!(!kinds.contains(&DeckEventKind::PipelineFailed));
    }
}
