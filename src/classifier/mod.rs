// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Interruption classification engine. Pure logic, free of frame types and
//! transport dependencies.
//!
//! [`InterruptionClassifier`] holds the filler/forced-stop word sets, the
//! confidence thresholds, and one piece of runtime state: whether the bot is
//! currently speaking. For each transcript fragment it produces exactly one
//! [`Outcome`] (or none for empty text) and invokes the matching registered
//! handler:
//!
//! - **Bot quiet**: every fragment is registered as normal speech; nothing
//!   is ever filtered.
//! - **Bot speaking**: filters apply in strict priority order (confidence
//!   gate, then forced-stop membership, then filler-only, then mixed
//!   tokens). First match wins; reasons never combine.
//!
//! The confidence gate deliberately outranks the forced-stop check: a
//! low-confidence fragment is treated as background murmur and ignored even
//! when it happens to contain a forced-stop token. Product may want to
//! revisit that ordering; the engine keeps it as shipped.
//!
//! The classifier is `Send + Sync` and is expected to be shared behind an
//! `Arc`, invoked concurrently from a speaking-state notifier and a
//! transcription notifier that race freely. Each call snapshots the speaking
//! flag once and depends only on its own snapshot. No lock is ever held
//! across a handler invocation, so a slow or misbehaving handler cannot
//! deadlock the classifier.

pub mod outcome;
pub mod params;
pub mod text;

use std::collections::HashSet;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use serde_json::Value;

pub use outcome::{Outcome, OutcomeKind, OutcomeReason};
pub use params::ClassifierParams;

use crate::events::{MetadataMap, SpeechEvent, TranscriptFragment};
use params::normalize_words;
use text::tokenize;

/// Handler invoked with the trimmed fragment text and the merged metadata
/// map. Handlers run synchronously on the classifying thread; they are
/// expected to hand work off quickly (e.g. push a frame, signal a task).
pub type OutcomeHandler = Arc<dyn Fn(&str, &MetadataMap) + Send + Sync>;

/// One optional handler per outcome kind. Registration replaces the previous
/// handler wholesale; there is no additive subscription.
#[derive(Default)]
struct HandlerSlots {
    valid_interruption: Mutex<Option<OutcomeHandler>>,
    ignored_filler: Mutex<Option<OutcomeHandler>>,
    speech_registered: Mutex<Option<OutcomeHandler>>,
}

/// Filler-aware interruption classifier.
///
/// # Example
///
/// ```
/// use bargein::prelude::*;
///
/// let classifier = InterruptionClassifier::new(ClassifierParams::default());
/// classifier.on_valid_interruption(|text, _metadata| {
///     println!("user barged in: {text}");
/// });
///
/// classifier.handle_bot_started_speaking();
/// classifier.classify(&TranscriptFragment::new("wait stop").with_confidence(0.9));
/// ```
pub struct InterruptionClassifier {
    /// Lowercase tokens treated as non-speech filler.
    ignored_words: RwLock<HashSet<String>>,
    /// Lowercase tokens that always trigger a stop when present.
    force_stop_words: RwLock<HashSet<String>>,
    /// Stored for host-side pre-filtering; not part of the decision tree.
    min_confidence_to_consider: f64,
    /// Confidence gate applied while the bot speaks.
    ignore_if_confidence_below: f64,
    /// Whether synthesized speech is currently playing.
    bot_speaking: AtomicBool,
    handlers: HandlerSlots,
}

impl InterruptionClassifier {
    /// Create a classifier from the given parameters.
    ///
    /// Word entries are trimmed and lowercased on the way in. Thresholds are
    /// stored as given; out-of-range values are accepted, not clamped.
    pub fn new(params: ClassifierParams) -> Self {
        Self {
            ignored_words: RwLock::new(normalize_words(&params.ignored_words)),
            force_stop_words: RwLock::new(normalize_words(&params.force_stop_words)),
            min_confidence_to_consider: params.min_confidence_to_consider,
            ignore_if_confidence_below: params.ignore_if_confidence_below,
            bot_speaking: AtomicBool::new(false),
            handlers: HandlerSlots::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Handler registration
    // -----------------------------------------------------------------------

    /// Register the handler for valid interruptions, replacing any previous
    /// one.
    pub fn on_valid_interruption<F>(&self, handler: F)
    where
        F: Fn(&str, &MetadataMap) + Send + Sync + 'static,
    {
        Self::set_handler(&self.handlers.valid_interruption, Arc::new(handler));
    }

    /// Register the handler for ignored filler fragments, replacing any
    /// previous one.
    pub fn on_ignored_filler<F>(&self, handler: F)
    where
        F: Fn(&str, &MetadataMap) + Send + Sync + 'static,
    {
        Self::set_handler(&self.handlers.ignored_filler, Arc::new(handler));
    }

    /// Register the handler for speech registered while the bot is quiet,
    /// replacing any previous one.
    pub fn on_speech_registered<F>(&self, handler: F)
    where
        F: Fn(&str, &MetadataMap) + Send + Sync + 'static,
    {
        Self::set_handler(&self.handlers.speech_registered, Arc::new(handler));
    }

    fn set_handler(slot: &Mutex<Option<OutcomeHandler>>, handler: OutcomeHandler) {
        *slot.lock().expect("handler slot lock poisoned") = Some(handler);
    }

    // -----------------------------------------------------------------------
    // Runtime configuration
    // -----------------------------------------------------------------------

    /// Atomically replace the filler word set. Visible to the next
    /// classification; in-flight calls keep the set they already read.
    pub fn update_ignored_words<I, S>(&self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = normalize_words(words);
        tracing::info!(count = words.len(), "ignored words updated");
        *self
            .ignored_words
            .write()
            .expect("ignored word set lock poisoned") = words;
    }

    /// Atomically replace the forced-stop word set.
    pub fn update_force_stop_words<I, S>(&self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = normalize_words(words);
        tracing::info!(count = words.len(), "force-stop words updated");
        *self
            .force_stop_words
            .write()
            .expect("force-stop word set lock poisoned") = words;
    }

    /// Minimum confidence for a fragment to be worth considering at all.
    /// Informational: the decision tree does not consult it.
    pub fn min_confidence_to_consider(&self) -> f64 {
        self.min_confidence_to_consider
    }

    /// The confidence gate applied while the bot speaks.
    pub fn ignore_if_confidence_below(&self) -> f64 {
        self.ignore_if_confidence_below
    }

    // -----------------------------------------------------------------------
    // Speaking state
    // -----------------------------------------------------------------------

    /// Note that speech output started playing. Idempotent.
    pub fn handle_bot_started_speaking(&self) {
        self.bot_speaking.store(true, Ordering::Release);
        tracing::debug!("bot speaking: start");
    }

    /// Note that speech output stopped. Idempotent.
    pub fn handle_bot_stopped_speaking(&self) {
        self.bot_speaking.store(false, Ordering::Release);
        tracing::debug!("bot speaking: end");
    }

    /// Whether synthesized speech is currently playing.
    pub fn is_bot_speaking(&self) -> bool {
        self.bot_speaking.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// Dispatch one inbound event. Speaking transitions return `None`;
    /// transcripts return what [`classify`](Self::classify) returns.
    pub fn handle_event(&self, event: SpeechEvent) -> Option<Outcome> {
        match event {
            SpeechEvent::BotStartedSpeaking => {
                self.handle_bot_started_speaking();
                None
            }
            SpeechEvent::BotStoppedSpeaking => {
                self.handle_bot_stopped_speaking();
                None
            }
            SpeechEvent::Transcript(fragment) => self.classify(&fragment),
        }
    }

    /// Classify one transcript fragment and notify the matching handler.
    ///
    /// Returns `None` only for empty/whitespace text, which is silently
    /// dropped without any notification. Every other fragment yields exactly
    /// one outcome; there is no error or "unclassified" kind.
    pub fn classify(&self, fragment: &TranscriptFragment) -> Option<Outcome> {
        let text = fragment.text.trim();
        if text.is_empty() {
            tracing::debug!("empty transcript received; ignoring");
            return None;
        }

        let tokens = tokenize(text);
        let average_confidence = average_confidence(fragment);

        // Single snapshot: the decision never re-reads the flag mid-call,
        // even if a speaking transition lands while we evaluate.
        let bot_speaking = self.bot_speaking.load(Ordering::Acquire);

        let (kind, reason, non_ignored_tokens) = if !bot_speaking {
            tracing::debug!(%text, "bot quiet; registering speech");
            (
                OutcomeKind::SpeechRegistered,
                OutcomeReason::AgentQuiet,
                Vec::new(),
            )
        } else {
            tracing::debug!(%text, ?tokens, average_confidence, "bot speaking; evaluating transcript");
            self.evaluate_while_speaking(text, &tokens, average_confidence)
        };

        let metadata =
            merge_diagnostics(&fragment.metadata, reason, average_confidence, &non_ignored_tokens);
        self.dispatch(kind, text, &metadata);

        Some(Outcome {
            kind,
            reason,
            average_confidence,
            non_ignored_tokens,
            metadata,
        })
    }

    /// Apply the speaking-mode filters in priority order: confidence gate,
    /// forced stop, filler-only, mixed tokens. First match wins.
    fn evaluate_while_speaking(
        &self,
        text: &str,
        tokens: &[String],
        average_confidence: f64,
    ) -> (OutcomeKind, OutcomeReason, Vec<String>) {
        if average_confidence < self.ignore_if_confidence_below {
            tracing::info!(
                average_confidence,
                "ignoring low-confidence background murmur while bot speaks"
            );
            return (
                OutcomeKind::IgnoredFiller,
                OutcomeReason::LowConfidence,
                Vec::new(),
            );
        }

        let has_force_stop = {
            let force_stop = self
                .force_stop_words
                .read()
                .expect("force-stop word set lock poisoned");
            tokens.iter().any(|t| force_stop.contains(t))
        };
        if has_force_stop {
            tracing::info!(%text, "valid interruption: force-stop word present");
            return (
                OutcomeKind::ValidInterruption,
                OutcomeReason::ForceStopWord,
                Vec::new(),
            );
        }

        let non_ignored_tokens: Vec<String> = {
            let ignored = self
                .ignored_words
                .read()
                .expect("ignored word set lock poisoned");
            tokens.iter().filter(|t| !ignored.contains(*t)).cloned().collect()
        };
        if non_ignored_tokens.is_empty() {
            tracing::info!(%text, "filler-only fragment ignored while bot speaks");
            (
                OutcomeKind::IgnoredFiller,
                OutcomeReason::FillerOnly,
                Vec::new(),
            )
        } else {
            tracing::info!(%text, "valid interruption: non-filler tokens present");
            (
                OutcomeKind::ValidInterruption,
                OutcomeReason::MixedTokens,
                non_ignored_tokens,
            )
        }
    }

    /// Invoke the registered handler for `kind`, if any.
    ///
    /// The handler `Arc` is cloned out so the slot lock is released before
    /// the call. A panicking handler is caught and logged; it never
    /// propagates back into the classification call.
    fn dispatch(&self, kind: OutcomeKind, text: &str, metadata: &MetadataMap) {
        let slot = match kind {
            OutcomeKind::ValidInterruption => &self.handlers.valid_interruption,
            OutcomeKind::IgnoredFiller => &self.handlers.ignored_filler,
            OutcomeKind::SpeechRegistered => &self.handlers.speech_registered,
        };
        let handler = slot.lock().expect("handler slot lock poisoned").clone();

        if let Some(handler) = handler {
            if let Err(panic_info) = catch_unwind(AssertUnwindSafe(|| handler(text, metadata))) {
                let msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                tracing::error!(kind = ?kind, "outcome handler panicked: {msg}");
            }
        }
    }
}

impl Default for InterruptionClassifier {
    fn default() -> Self {
        Self::new(ClassifierParams::default())
    }
}

impl fmt::Debug for InterruptionClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptionClassifier")
            .field("min_confidence_to_consider", &self.min_confidence_to_consider)
            .field("ignore_if_confidence_below", &self.ignore_if_confidence_below)
            .field("bot_speaking", &self.is_bot_speaking())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Free helpers
// ---------------------------------------------------------------------------

/// Resolve the fragment's average confidence: unweighted mean of the
/// word-level confidences when present and non-empty, else the fragment
/// confidence, else fully confident.
fn average_confidence(fragment: &TranscriptFragment) -> f64 {
    if let Some(words) = &fragment.words {
        if !words.is_empty() {
            let sum: f64 = words.iter().map(|w| w.confidence).sum();
            return sum / words.len() as f64;
        }
    }
    fragment.confidence.unwrap_or(1.0)
}

/// Merge the diagnostic fields into the caller metadata. Diagnostics win
/// key collisions.
fn merge_diagnostics(
    base: &MetadataMap,
    reason: OutcomeReason,
    average_confidence: f64,
    non_ignored_tokens: &[String],
) -> MetadataMap {
    let mut metadata = base.clone();
    metadata.insert(
        "reason".to_string(),
        Value::String(reason.as_str().to_string()),
    );
    metadata.insert(
        "avg_conf".to_string(),
        serde_json::Number::from_f64(average_confidence)
            .map(Value::Number)
            .unwrap_or(Value::Null),
    );
    if reason == OutcomeReason::MixedTokens {
        metadata.insert(
            "non_ignored".to_string(),
            Value::Array(
                non_ignored_tokens
                    .iter()
                    .map(|t| Value::String(t.clone()))
                    .collect(),
            ),
        );
    }
    metadata
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WordConfidence;

    fn speaking_classifier() -> InterruptionClassifier {
        let classifier = InterruptionClassifier::default();
        classifier.handle_bot_started_speaking();
        classifier
    }

    #[test]
    fn test_empty_text_produces_no_outcome() {
        let classifier = speaking_classifier();
        assert!(classifier.classify(&TranscriptFragment::new("")).is_none());
        assert!(classifier.classify(&TranscriptFragment::new("   \t\n")).is_none());
    }

    #[test]
    fn test_quiet_bot_always_registers_speech() {
        let classifier = InterruptionClassifier::default();
        // Confidence and content are irrelevant while the bot is quiet.
        let outcome = classifier
            .classify(&TranscriptFragment::new("hello there").with_confidence(0.1))
            .expect("outcome");
        assert_eq!(outcome.kind, OutcomeKind::SpeechRegistered);
        assert_eq!(outcome.reason, OutcomeReason::AgentQuiet);

        let outcome = classifier
            .classify(&TranscriptFragment::new("stop"))
            .expect("outcome");
        assert_eq!(outcome.kind, OutcomeKind::SpeechRegistered);
    }

    #[test]
    fn test_confidence_gate_beats_force_stop() {
        let classifier = speaking_classifier();
        // "stop" at word confidence 0.1: the gate wins over the lexical check.
        let fragment = TranscriptFragment::new("stop")
            .with_words(vec![WordConfidence::new("stop", 0.1)]);
        let outcome = classifier.classify(&fragment).expect("outcome");
        assert_eq!(outcome.kind, OutcomeKind::IgnoredFiller);
        assert_eq!(outcome.reason, OutcomeReason::LowConfidence);
    }

    #[test]
    fn test_force_stop_beats_filler() {
        let classifier = speaking_classifier();
        let outcome = classifier
            .classify(&TranscriptFragment::new("uh stop").with_confidence(0.9))
            .expect("outcome");
        assert_eq!(outcome.kind, OutcomeKind::ValidInterruption);
        assert_eq!(outcome.reason, OutcomeReason::ForceStopWord);
        assert!(outcome.non_ignored_tokens.is_empty());
    }

    #[test]
    fn test_filler_only_is_ignored() {
        let classifier = speaking_classifier();
        let outcome = classifier
            .classify(&TranscriptFragment::new("uh umm").with_confidence(0.9))
            .expect("outcome");
        assert_eq!(outcome.kind, OutcomeKind::IgnoredFiller);
        assert_eq!(outcome.reason, OutcomeReason::FillerOnly);
    }

    #[test]
    fn test_mixed_tokens_interrupt_with_token_list() {
        let classifier = speaking_classifier();
        let outcome = classifier
            .classify(&TranscriptFragment::new("book a flight").with_confidence(0.9))
            .expect("outcome");
        assert_eq!(outcome.kind, OutcomeKind::ValidInterruption);
        assert_eq!(outcome.reason, OutcomeReason::MixedTokens);
        assert_eq!(outcome.non_ignored_tokens, vec!["book", "a", "flight"]);
    }

    #[test]
    fn test_filler_mixed_with_real_speech_interrupts() {
        let classifier = speaking_classifier();
        let outcome = classifier
            .classify(&TranscriptFragment::new("umm cancel that").with_confidence(0.9))
            .expect("outcome");
        assert_eq!(outcome.reason, OutcomeReason::MixedTokens);
        // Filler tokens are stripped from the reported list, in order.
        assert_eq!(outcome.non_ignored_tokens, vec!["cancel", "that"]);
    }

    #[test]
    fn test_punctuation_only_text_counts_as_filler() {
        let classifier = speaking_classifier();
        // Non-empty text with zero tokens: nothing non-ignored, so filler.
        let outcome = classifier
            .classify(&TranscriptFragment::new("!!!").with_confidence(0.9))
            .expect("outcome");
        assert_eq!(outcome.kind, OutcomeKind::IgnoredFiller);
        assert_eq!(outcome.reason, OutcomeReason::FillerOnly);
    }

    #[test]
    fn test_average_confidence_prefers_word_level() {
        let classifier = speaking_classifier();
        // Utterance confidence says 0.9 but the word-level mean is 0.2.
        let fragment = TranscriptFragment::new("hello world")
            .with_confidence(0.9)
            .with_words(vec![
                WordConfidence::new("hello", 0.3),
                WordConfidence::new("world", 0.1),
            ]);
        let outcome = classifier.classify(&fragment).expect("outcome");
        assert!((outcome.average_confidence - 0.2).abs() < 1e-9);
        assert_eq!(outcome.reason, OutcomeReason::LowConfidence);
    }

    #[test]
    fn test_empty_word_list_falls_back_to_fragment_confidence() {
        let classifier = speaking_classifier();
        let fragment = TranscriptFragment::new("hello")
            .with_confidence(0.2)
            .with_words(vec![]);
        let outcome = classifier.classify(&fragment).expect("outcome");
        assert!((outcome.average_confidence - 0.2).abs() < f64::EPSILON);
        assert_eq!(outcome.reason, OutcomeReason::LowConfidence);
    }

    #[test]
    fn test_missing_confidence_defaults_to_fully_confident() {
        let classifier = speaking_classifier();
        let outcome = classifier
            .classify(&TranscriptFragment::new("hello"))
            .expect("outcome");
        assert!((outcome.average_confidence - 1.0).abs() < f64::EPSILON);
        assert_eq!(outcome.kind, OutcomeKind::ValidInterruption);
    }

    #[test]
    fn test_tokens_are_case_and_punctuation_insensitive() {
        let classifier = speaking_classifier();
        let outcome = classifier
            .classify(&TranscriptFragment::new("Uh, STOP!").with_confidence(0.9))
            .expect("outcome");
        assert_eq!(outcome.reason, OutcomeReason::ForceStopWord);
    }

    #[test]
    fn test_speaking_transitions_are_idempotent() {
        let classifier = InterruptionClassifier::default();
        classifier.handle_bot_started_speaking();
        classifier.handle_bot_started_speaking();
        assert!(classifier.is_bot_speaking());
        classifier.handle_bot_stopped_speaking();
        classifier.handle_bot_stopped_speaking();
        assert!(!classifier.is_bot_speaking());
    }

    #[test]
    fn test_update_ignored_words_takes_effect() {
        let classifier = speaking_classifier();
        // "well" is not filler by default.
        let outcome = classifier
            .classify(&TranscriptFragment::new("well").with_confidence(0.9))
            .expect("outcome");
        assert_eq!(outcome.kind, OutcomeKind::ValidInterruption);

        classifier.update_ignored_words(["  WELL ", "uh"]);
        let outcome = classifier
            .classify(&TranscriptFragment::new("well").with_confidence(0.9))
            .expect("outcome");
        assert_eq!(outcome.reason, OutcomeReason::FillerOnly);
    }

    #[test]
    fn test_update_force_stop_words_replaces_set() {
        let classifier = speaking_classifier();
        classifier.update_force_stop_words(["basta"]);
        // The old entries are gone...
        let outcome = classifier
            .classify(&TranscriptFragment::new("uh stop").with_confidence(0.9))
            .expect("outcome");
        assert_eq!(outcome.reason, OutcomeReason::MixedTokens);
        assert_eq!(outcome.non_ignored_tokens, vec!["stop"]);
        // ...and the new one works.
        let outcome = classifier
            .classify(&TranscriptFragment::new("basta").with_confidence(0.9))
            .expect("outcome");
        assert_eq!(outcome.reason, OutcomeReason::ForceStopWord);
    }

    #[test]
    fn test_out_of_range_gate_is_applied_as_given() {
        let params = ClassifierParams {
            ignore_if_confidence_below: 1.5,
            ..ClassifierParams::default()
        };
        let classifier = InterruptionClassifier::new(params);
        classifier.handle_bot_started_speaking();
        // Even a fully-confident forced stop is gated by the bogus threshold.
        let outcome = classifier
            .classify(&TranscriptFragment::new("stop"))
            .expect("outcome");
        assert_eq!(outcome.reason, OutcomeReason::LowConfidence);
    }

    #[test]
    fn test_metadata_diagnostics_win_collisions() {
        let classifier = speaking_classifier();
        let mut metadata = MetadataMap::new();
        metadata.insert("reason".into(), Value::String("caller-lie".into()));
        metadata.insert("session".into(), Value::String("s-1".into()));
        let fragment = TranscriptFragment::new("book a flight")
            .with_confidence(0.9)
            .with_metadata(metadata);

        let outcome = classifier.classify(&fragment).expect("outcome");
        assert_eq!(
            outcome.metadata.get("reason"),
            Some(&Value::String("mixed_tokens".into()))
        );
        // Caller keys that do not collide pass through untouched.
        assert_eq!(
            outcome.metadata.get("session"),
            Some(&Value::String("s-1".into()))
        );
        let avg = outcome.metadata.get("avg_conf").and_then(Value::as_f64);
        assert!((avg.expect("avg_conf present") - 0.9).abs() < f64::EPSILON);
        let non_ignored = outcome
            .metadata
            .get("non_ignored")
            .and_then(Value::as_array)
            .expect("non_ignored present");
        assert_eq!(non_ignored.len(), 3);
    }

    #[test]
    fn test_handle_event_dispatch() {
        let classifier = InterruptionClassifier::default();
        assert!(classifier
            .handle_event(SpeechEvent::BotStartedSpeaking)
            .is_none());
        assert!(classifier.is_bot_speaking());

        let outcome = classifier
            .handle_event(SpeechEvent::Transcript(
                TranscriptFragment::new("umm").with_confidence(0.9),
            ))
            .expect("outcome");
        assert_eq!(outcome.reason, OutcomeReason::FillerOnly);

        assert!(classifier
            .handle_event(SpeechEvent::BotStoppedSpeaking)
            .is_none());
        assert!(!classifier.is_bot_speaking());
    }
}
