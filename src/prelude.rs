// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Common re-exports for convenient use of the bargein crate.
//!
//! ```
//! use bargein::prelude::*;
//! ```

pub use std::sync::Arc;

pub use crate::classifier::params::{DEFAULT_FORCE_STOP_WORDS, DEFAULT_IGNORED_WORDS};
pub use crate::classifier::{
    ClassifierParams, InterruptionClassifier, Outcome, OutcomeHandler, OutcomeKind, OutcomeReason,
};
pub use crate::events::channel::EventFeed;
pub use crate::events::{MetadataMap, SpeechEvent, TranscriptFragment, WordConfidence};
pub use crate::strategies::InterruptionStrategy;
