//! Unit tests for the playback service internals.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod advance;
mod media_id;
