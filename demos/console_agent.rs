// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! # Console Agent Demo
//!
//! Simulates the event traffic of a voice agent session and prints what the
//! interruption classifier decides at each step: user speech while the bot
//! is quiet, filler backchannel while the bot talks, a low-confidence
//! murmur, and a real barge-in.
//!
//! Logging verbosity follows `RUST_LOG` (e.g. `RUST_LOG=bargein=debug`):
//!
//! ```sh
//! RUST_LOG=bargein=debug cargo run --example console_agent
//! ```

use bargein::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let classifier = Arc::new(InterruptionClassifier::new(ClassifierParams::default()));

    classifier.on_valid_interruption(|text, metadata| {
        println!(
            ">>> barge-in ({}): \"{text}\" -- stopping TTS",
            metadata["reason"].as_str().unwrap_or("?")
        );
    });
    classifier.on_ignored_filler(|text, metadata| {
        println!(
            "... ignored ({}): \"{text}\"",
            metadata["reason"].as_str().unwrap_or("?")
        );
    });
    classifier.on_speech_registered(|text, _metadata| {
        println!("<<< user said: \"{text}\"");
    });

    let feed = EventFeed::spawn(classifier.clone());
    let tx = feed.sender();

    // User asks a question while the bot is quiet.
    tx.send(SpeechEvent::Transcript(
        TranscriptFragment::new("what's on my calendar today").with_confidence(0.96),
    ))
    .unwrap();

    // Bot starts answering; backchannel filler must not steal the floor.
    tx.send(SpeechEvent::BotStartedSpeaking).unwrap();
    tx.send(SpeechEvent::Transcript(
        TranscriptFragment::new("uh hmm").with_confidence(0.9),
    ))
    .unwrap();

    // Background murmur: low word-level confidence, gated even though it
    // contains a forced-stop token.
    tx.send(SpeechEvent::Transcript(TranscriptFragment::from_result(
        &json!({
            "text": "stop",
            "words": [{"word": "stop", "confidence": 0.12}],
            "source": "far-field-mic",
        }),
    )))
    .unwrap();

    // A real barge-in.
    tx.send(SpeechEvent::Transcript(
        TranscriptFragment::new("wait, cancel the two o'clock").with_confidence(0.93),
    ))
    .unwrap();
    tx.send(SpeechEvent::BotStoppedSpeaking).unwrap();

    drop(tx);
    feed.shutdown().await;
}
