//! # Progressive Image Filler
//!
//! Populates per-slide imagery after the text content is finalized.
//! Batching bounds concurrent outbound requests while still overlapping
//! latency; per-slide completion keeps one slow or failed image from
//! stalling the whole deck's perceived progress.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;
use tokio::sync::{mpsc, RwLock};

use crate::deck::Deck;
use crate::events::{DeckEvent, DeckEventKind};
use crate::generator::DeckGenerator;
use crate::pipeline::{DeckStage, RunToken};

/// Concurrent outbound image requests per batch.
pub const IMAGE_BATCH_SIZE: usize = 2;

/// One filler pass over a refined deck.
pub struct ImageFiller {
    batch_size: usize,
    token: RunToken,
    event_tx: Option<mpsc::Sender<DeckEvent>>,
}

impl ImageFiller {
    pub fn new(token: RunToken) -> Self {
        Self {
            batch_size: IMAGE_BATCH_SIZE,
            token,
            event_tx: None,
        }
    }

    /// Set event channel for streaming per-slide updates
    pub fn with_event_channel(mut self, tx: mpsc::Sender<DeckEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    #[cfg(test)]
    fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    async fn emit(&self, event: DeckEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Fill every slide's image. Batches run strictly in sequence; within a
    /// batch all requests run concurrently, and each settling request
    /// updates its slide immediately, independent of its batch siblings.
    /// Returns the final progress percentage (100 unless the run token was
    /// invalidated mid-flight).
    pub async fn run(
        &self,
        generator: &DeckGenerator,
        deck: &Arc<RwLock<Option<Deck>>>,
    ) -> f32 {
        // Snapshot the work list and flag every slide as loading.
        let jobs: Vec<(uuid::Uuid, String)> = {
            let mut guard = deck.write().await;
            match guard.as_mut() {
                Some(deck) => {
                    for slide in &mut deck.slides {
                        slide.image_loading = true;
                    }
                    deck.slides
                        .iter()
                        .map(|s| (s.id, s.content.image_prompt.clone()))
                        .collect()
                }
                None => Vec::new(),
            }
        };

        let total = jobs.len();
        if total == 0 {
            return 100.0;
        }
        let completed = AtomicUsize::new(0);
        let completed = &completed;

        for batch in jobs.chunks(self.batch_size) {
            join_all(batch.iter().map(|(slide_id, prompt)| async move {
                let image_url = generator.image_for(slide_id, prompt).await;

                // A reset while this request was in flight discards the run;
                // do not resurrect it with a late update.
                if !self.token.is_current() {
                    return;
                }

                {
                    let mut guard = deck.write().await;
                    if let Some(deck) = guard.as_mut() {
                        if let Some(slide) =
                            deck.slides.iter_mut().find(|s| s.id == *slide_id)
                        {
                            slide.image_url = Some(image_url);
                            slide.image_loading = false;
                        }
                    }
                }

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                let percent = done as f32 / total as f32 * 100.0;
                self.emit(
                    DeckEvent::new(DeckEventKind::SlideImageReady, DeckStage::GeneratingImages)
                        .with_data(json!({ "slideId": slide_id })),
                )
                .await;
                self.emit(
                    DeckEvent::new(DeckEventKind::ImageProgress, DeckStage::GeneratingImages)
                        .with_data(json!({ "percent": percent })),
                )
                .await;
            }))
            .await;
        }

        completed.load(Ordering::SeqCst) as f32 / total as f32 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Language, PitchTemplate, VisualStyle};
    use crate::deck::{BrandIdentity, DeckContent};
    use crate::models::DeckRequest;
    use crate::pipeline::{invalidate_runs, RunGeneration};
    use crate::test_support::{deck_json, MockBackend};
    use std::sync::atomic::AtomicU64;

    fn request() -> DeckRequest {
        DeckRequest {
            idea: "idea".to_string(),
            template: PitchTemplate::Unusual, // 9 topics
            style: VisualStyle::Corporate,
            language: Language::En,
            brand: BrandIdentity::default(),
            custom_style: None,
        }
    }

    fn deck_slot(slides: usize) -> Arc<RwLock<Option<Deck>>> {
        let content: DeckContent = serde_json::from_str(&deck_json(slides)).unwrap();
        Arc::new(RwLock::new(Some(content.into_deck(BrandIdentity::default()))))
    }

    fn fresh_token() -> (RunGeneration, RunToken) {
        let generation: RunGeneration = Arc::new(AtomicU64::new(0));
        let token = RunToken::capture(&generation);
        (generation, token)
    }

    #[tokio::test]
    async fn test_batches_run_in_sequence_with_bounded_concurrency() {
        let backend = Arc::new(MockBackend::credentialed());
        let generator = DeckGenerator::new(
            Arc::clone(&backend) as Arc<dyn crate::gemini::GenerationBackend>,
            request(),
        );
        let slot = deck_slot(5);
        let (_generation, token) = fresh_token();

        let progress = ImageFiller::new(token).run(&generator, &slot).await;
        assert_eq!(progress, 100.0);

        // 5 slides, batch size 2: groups of 2, 2, 1; group k+1 is only
        // issued after group k fully settled.
        let issue_log = backend.issue_log.lock().unwrap().clone();
        assert_eq!(issue_log, vec![0, 0, 2, 2, 4]);
        assert!(backend.max_in_flight.load(Ordering::SeqCst) <= 2);

        let guard = slot.read().await;
        let deck = guard.as_ref().unwrap();
        assert!(deck.slides.iter().all(|s| s.image_url.is_some()));
        assert!(deck.slides.iter().all(|s| !s.image_loading));
    }

    #[tokio::test]
    async fn test_progress_reaches_100_even_when_every_image_fails() {
        let backend = Arc::new(MockBackend::credentialed());
        backend.fail_all_images.store(true, Ordering::SeqCst);
        let generator = DeckGenerator::new(
            Arc::clone(&backend) as Arc<dyn crate::gemini::GenerationBackend>,
            request(),
        );
        let slot = deck_slot(5);
        let (_generation, token) = fresh_token();

        let progress = ImageFiller::new(token).run(&generator, &slot).await;
        assert_eq!(progress, 100.0);

        let guard = slot.read().await;
        let deck = guard.as_ref().unwrap();
        for slide in &deck.slides {
            let url = slide.image_url.as_deref().unwrap();
            assert!(url.contains(&slide.id.to_string()), "placeholder is per-slide");
        }
    }

    #[tokio::test]
    async fn test_emits_per_slide_and_progress_events() {
        let backend = Arc::new(MockBackend::credentialed());
        let generator = DeckGenerator::new(
            Arc::clone(&backend) as Arc<dyn crate::gemini::GenerationBackend>,
            request(),
        );
        let slot = deck_slot(3);
        let (_generation, token) = fresh_token();
        let (tx, mut rx) = mpsc::channel(32);

        ImageFiller::new(token)
            .with_event_channel(tx)
            .run(&generator, &slot)
            .await;

        let mut ready = 0;
        let mut last_percent = 0.0;
        while let Ok(event) = rx.try_recv() {
            match event.kind {
                DeckEventKind::SlideImageReady => ready += 1,
                DeckEventKind::ImageProgress => {
                    last_percent = event.data.unwrap()["percent"].as_f64().unwrap() as f32;
                }
                _ => {}
            }
        }
        assert_eq!(ready, 3);
        assert_eq!(last_percent, 100.0);
    }

    #[tokio::test]
    async fn test_stale_token_discards_updates() {
        let backend = Arc::new(MockBackend::credentialed());
        let generator = DeckGenerator::new(
            Arc::clone(&backend) as Arc<dyn crate::gemini::GenerationBackend>,
            request(),
        );
        let slot = deck_slot(4);
        let (generation, token) = fresh_token();
        invalidate_runs(&generation);

        let progress = ImageFiller::new(token).run(&generator, &slot).await;
        assert_eq!(progress, 0.0);

        let guard = slot.read().await;
        let deck = guard.as_ref().unwrap();
        assert!(deck.slides.iter().all(|s| s.image_url.is_none()));
    }

    #[tokio::test]
    async fn test_single_request_batches_degenerate_to_sequential() {
        let backend = Arc::new(MockBackend::credentialed());
        let generator = DeckGenerator::new(
            Arc::clone(&backend) as Arc<dyn crate::gemini::GenerationBackend>,
            request(),
        );
        let slot = deck_slot(3);
        let (_generation, token) = fresh_token();

        let progress = ImageFiller::new(token)
            .with_batch_size(1)
            .run(&generator, &slot)
            .await;
        assert_eq!(progress, 100.0);
        assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(backend.issue_log.lock().unwrap().clone(), vec![0, 1, 2]);
    }
}
