// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Inbound event types consumed by the interruption classifier.
//!
//! The classifier listens to two kinds of events from the surrounding agent
//! stack: bot speaking-state transitions (speech output start/end, typically
//! driven by TTS started/stopped notifications) and transcript fragments from
//! the STT layer. Both are plain values; no event-emitter shape is assumed.
//! Hosts that deliver a unified event stream can use [`SpeechEvent`] with
//! `InterruptionClassifier::handle_event`, or wire a channel via
//! [`channel::EventFeed`]; everyone else calls the classifier entry points
//! directly.

pub mod channel;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered metadata map carried through classification unchanged, except for
/// the documented diagnostic-field injection on outcomes.
pub type MetadataMap = serde_json::Map<String, Value>;

/// Word-level confidence reported by an STT service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordConfidence {
    /// The recognized word.
    pub word: String,
    /// Recognition confidence in `[0.0, 1.0]`. Services that omit per-word
    /// scores get full confidence.
    #[serde(default = "full_confidence")]
    pub confidence: f64,
}

fn full_confidence() -> f64 {
    1.0
}

impl WordConfidence {
    pub fn new(word: impl Into<String>, confidence: f64) -> Self {
        Self {
            word: word.into(),
            confidence,
        }
    }
}

/// A transcript fragment from the STT layer.
///
/// Fragments are ephemeral: they exist only for the duration of one
/// classification call. `metadata` is forwarded to the matching outcome
/// handler for caller diagnostics.
#[derive(Debug, Clone, Default)]
pub struct TranscriptFragment {
    /// The transcribed text.
    pub text: String,
    /// Overall utterance confidence, when the service reports one.
    pub confidence: Option<f64>,
    /// Word-level confidences, when the service reports them. Takes
    /// precedence over `confidence` for averaging.
    pub words: Option<Vec<WordConfidence>>,
    /// Opaque caller metadata passed through to the outcome.
    pub metadata: MetadataMap,
}

impl TranscriptFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_words(mut self, words: Vec<WordConfidence>) -> Self {
        self.words = Some(words);
        self
    }

    pub fn with_metadata(mut self, metadata: MetadataMap) -> Self {
        self.metadata = metadata;
        self
    }

    /// Build a fragment from a raw STT result payload.
    ///
    /// Expected keys, all optional: `text` (string), `confidence` (number),
    /// `words` (array of `{word, confidence}` objects). Malformed word
    /// entries are skipped; an entry missing its confidence counts as fully
    /// confident. The entire payload is forwarded as metadata so outcome
    /// handlers see whatever the service reported.
    pub fn from_result(result: &Value) -> Self {
        let text = result
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let confidence = result.get("confidence").and_then(Value::as_f64);
        let words = result.get("words").and_then(Value::as_array).map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let obj = entry.as_object()?;
                    Some(WordConfidence {
                        word: obj
                            .get("word")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        confidence: obj
                            .get("confidence")
                            .and_then(Value::as_f64)
                            .unwrap_or(1.0),
                    })
                })
                .collect()
        });
        let metadata = result.as_object().cloned().unwrap_or_default();
        Self {
            text,
            confidence,
            words,
            metadata,
        }
    }
}

/// Events the classifier consumes from the surrounding agent stack.
#[derive(Debug, Clone)]
pub enum SpeechEvent {
    /// Speech output started playing to the user (e.g. TTS started).
    BotStartedSpeaking,
    /// Speech output stopped (e.g. TTS stopped or was cancelled).
    BotStoppedSpeaking,
    /// A transcript fragment arrived from the STT layer.
    Transcript(TranscriptFragment),
}

impl SpeechEvent {
    /// Human-readable name of the event type.
    pub fn name(&self) -> &'static str {
        match self {
            SpeechEvent::BotStartedSpeaking => "BotStartedSpeaking",
            SpeechEvent::BotStoppedSpeaking => "BotStoppedSpeaking",
            SpeechEvent::Transcript(_) => "Transcript",
        }
    }
}

impl fmt::Display for SpeechEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechEvent::Transcript(fragment) => {
                write!(f, "{}(text: [{}])", self.name(), fragment.text)
            }
            _ => write!(f, "{}", self.name()),
        }
    }
}
