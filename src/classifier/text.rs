// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Transcript text normalization and tokenization.
//!
//! This is locale-agnostic word-character splitting, not NLP segmentation:
//! anything that is not alphanumeric or an apostrophe separates tokens.

/// Lowercase `text` and collapse every run of non-word characters into a
/// single space, dropping leading and trailing separators.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '\'' {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Split `text` into lowercase tokens, discarding empty ones.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_text(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
