// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Bargein - filler-aware barge-in classification for real-time voice agents.
//!
//! While a bot's synthesized voice is playing, transcript fragments coming
//! out of the STT layer are often just backchannel filler ("uh", "umm") or
//! low-confidence background murmur that should never steal the floor.
//! Bargein classifies each fragment as an ignorable filler, a forced stop,
//! or a genuine interruption, and notifies the host through three typed
//! callback slots. When the bot is quiet, every fragment is registered as
//! normal input.
//!
//! The decision engine lives in [`classifier`] and is pure logic with no
//! transport or I/O footprint. Inbound event types and the channel-based
//! attachment point live in [`events`]; the async strategy seam for
//! pipeline integration lives in [`strategies`].

pub mod classifier;
pub mod events;
pub mod prelude;
pub mod strategies;
