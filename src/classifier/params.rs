// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Classifier configuration parameters.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Filler tokens ignored by default while the bot is speaking.
pub const DEFAULT_IGNORED_WORDS: &[&str] = &[
    "uh", "umm", "hmm", "haan", "uhh", "uhm", "erm", "ah", "mm", "mmh", "mhmm",
];

/// Tokens that force a stop by default whenever one appears in a fragment.
pub const DEFAULT_FORCE_STOP_WORDS: &[&str] = &[
    "stop",
    "wait",
    "hold",
    "pause",
    "waita",
    "no",
    "waitone",
    "one moment",
];

/// Parameters for interruption classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// Lowercase tokens treated as non-speech filler.
    pub ignored_words: HashSet<String>,
    /// Lowercase tokens that always trigger a stop when present.
    pub force_stop_words: HashSet<String>,
    /// Minimum confidence for a fragment to be worth considering at all.
    /// Not consulted by the decision tree; exposed for host-side
    /// pre-filtering of interim results.
    pub min_confidence_to_consider: f64,
    /// Fragments averaging below this confidence are treated as background
    /// murmur while the bot speaks. Stored as given; out-of-range values are
    /// accepted and simply gate everything (or nothing).
    pub ignore_if_confidence_below: f64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            ignored_words: DEFAULT_IGNORED_WORDS.iter().map(|w| w.to_string()).collect(),
            force_stop_words: DEFAULT_FORCE_STOP_WORDS
                .iter()
                .map(|w| w.to_string())
                .collect(),
            min_confidence_to_consider: 0.5,
            ignore_if_confidence_below: 0.4,
        }
    }
}

/// Trim and lowercase a word list into a lookup set.
pub(crate) fn normalize_words<I, S>(words: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .collect()
}
