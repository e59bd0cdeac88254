// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Channel-based attachment point for event-emitting hosts.
//!
//! Frameworks that surface named events (TTS started/stopped callbacks, STT
//! result callbacks) can clone the feed's sender into each subscription and
//! forward events as they fire. A single tokio task drains the channel into
//! the shared classifier, so event sources never block on classification and
//! never need a reference to the classifier itself. Hosts without an event
//! emitter simply call the classifier entry points directly.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::classifier::InterruptionClassifier;
use crate::events::SpeechEvent;

/// A spawned drain task plus the sender feeding it.
///
/// Dropping every sender (including the feed itself) ends the drain task.
/// [`shutdown`](EventFeed::shutdown) does that explicitly and waits for the
/// task to finish.
pub struct EventFeed {
    tx: mpsc::UnboundedSender<SpeechEvent>,
    task: JoinHandle<()>,
}

impl EventFeed {
    /// Spawn a drain task feeding `classifier`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(classifier: Arc<InterruptionClassifier>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SpeechEvent>();
        let task = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                tracing::trace!(event = %event, "EventFeed: dispatching");
                classifier.handle_event(event);
            }
            tracing::debug!("EventFeed: all senders dropped, stopping");
        });
        Self { tx, task }
    }

    /// Clone of the sender, for wiring into host event subscriptions.
    pub fn sender(&self) -> mpsc::UnboundedSender<SpeechEvent> {
        self.tx.clone()
    }

    /// Send one event into the feed.
    ///
    /// Returns `false` if the drain task is gone and the event was lost.
    pub fn send(&self, event: SpeechEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Drop the feed's sender and wait for the drain task to finish
    /// processing everything already queued.
    ///
    /// Senders previously handed out via [`sender`](EventFeed::sender) keep
    /// the task alive until they are dropped too.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::error!("EventFeed: drain task panicked during shutdown: {e}");
        }
    }
}
