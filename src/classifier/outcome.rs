// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Classification outcome types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::MetadataMap;

/// The three possible classifications of a transcript fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// The user genuinely wants the floor; the bot should yield.
    ValidInterruption,
    /// Filler or background noise while the bot speaks; keep talking.
    IgnoredFiller,
    /// Normal input while the bot is quiet.
    SpeechRegistered,
}

/// Why a fragment was classified the way it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeReason {
    /// The bot was not speaking; nothing is ever filtered.
    AgentQuiet,
    /// Average confidence fell below the ignore threshold.
    LowConfidence,
    /// At least one forced-stop token was present.
    ForceStopWord,
    /// Every token was a known filler word.
    FillerOnly,
    /// At least one token was neither filler nor forced stop.
    MixedTokens,
}

impl OutcomeReason {
    /// Stable string form used in callback metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeReason::AgentQuiet => "agent_quiet",
            OutcomeReason::LowConfidence => "low_confidence",
            OutcomeReason::ForceStopWord => "force_stop_word",
            OutcomeReason::FillerOnly => "filler_only",
            OutcomeReason::MixedTokens => "mixed_tokens",
        }
    }
}

impl fmt::Display for OutcomeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One classification decision for one transcript fragment.
///
/// Outcomes are never persisted; each is delivered synchronously to at most
/// one registered handler of the matching kind and returned to the caller.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub reason: OutcomeReason,
    /// Unweighted mean of the word-level confidences, else the fragment
    /// confidence, else 1.0.
    pub average_confidence: f64,
    /// Tokens that are neither filler nor covered by an earlier rule, in
    /// transcript order. Populated only for [`OutcomeReason::MixedTokens`].
    pub non_ignored_tokens: Vec<String>,
    /// Caller metadata merged with the diagnostic fields (`reason`,
    /// `avg_conf`, and `non_ignored` for mixed tokens). Diagnostics win
    /// key collisions.
    pub metadata: MetadataMap,
}
