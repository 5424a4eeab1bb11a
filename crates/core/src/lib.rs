//! # Pitchforge Core
//!
//! The "Brain" of Pitchforge - turns a one-line startup idea into an
//! investor pitch deck through a draft/critique/refine pipeline and a
//! progressive image fill, all delegated to an external generative service.
//!
//! ## Architecture
//!
//! - `catalog` - pitch frameworks, visual styles, and languages (static tables)
//! - `deck` - wire shapes and the working deck model
//! - `gemini` - the generation-service boundary (backend trait + REST client)
//! - `generator` - the four operations: draft, critique, refine, image
//! - `pipeline` / `coordinator` - stage machine and run orchestration
//! - `filler` - batched, progressive per-slide image fill
//! - `events` - the subscription surface for a presentation layer
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pitchforge_core::coordinator::DeckCoordinator;
//!
//! let mut coordinator = DeckCoordinator::new(backend, &run_generation)
//!     .with_event_channel(event_tx);
//! let deck = coordinator.run(request).await?;
//! ```

pub mod catalog;
pub mod coordinator;
pub mod deck;
pub mod error;
pub mod events;
pub mod filler;
pub mod gemini;
pub mod generator;
pub mod models;
pub mod pipeline;
pub mod prompts;

#[cfg(test)]
pub(crate) mod test_support;
