// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Interruption strategy implementations.

use async_trait::async_trait;

use crate::classifier::{InterruptionClassifier, OutcomeKind};
use crate::events::TranscriptFragment;

/// Base trait for interruption strategies.
#[async_trait]
pub trait InterruptionStrategy: Send + Sync {
    /// Check if the current utterance should interrupt the bot.
    async fn should_interrupt(&self, text: &str) -> bool;
}

/// The classifier is itself a strategy: an utterance should interrupt only
/// when it classifies as a valid interruption against the current speaking
/// state and word sets.
///
/// Text-only classification carries no confidence data, so the fragment is
/// treated as fully confident. Registered outcome handlers fire exactly as
/// they would for any other classification call.
#[async_trait]
impl InterruptionStrategy for InterruptionClassifier {
    async fn should_interrupt(&self, text: &str) -> bool {
        let fragment = TranscriptFragment::new(text);
        matches!(
            self.classify(&fragment),
            Some(outcome) if outcome.kind == OutcomeKind::ValidInterruption
        )
    }
}
