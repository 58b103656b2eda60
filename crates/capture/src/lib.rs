//! # Capture
//!
//! The acquisition pipeline for one device stream: pulls raw chunks from a
//! [`core_types::ChunkSource`], reassembles frames, decodes readings, and
//! hands records to a [`core_types::RecordSink`].
//!
//! One `Capture` owns one logical stream. Processing is strictly
//! sequential; concurrent streams get independent instances.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

pub mod pipeline;

pub use pipeline::{Capture, CaptureError, CaptureStats, StreamEvent};
