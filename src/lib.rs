//! Kireme - Segment & Subtitle Reconciliation Engine
//!
//! Turns user-chosen cut points into non-overlapping media segments,
//! reconciles freshly cut part files against previously generated ones, and
//! merges per-segment subtitle tracks into a single time-shifted SubRip
//! file, using ffmpeg and ffprobe as external tools.

pub mod cli;
pub mod completeness;
pub mod config;
pub mod confirm;
pub mod error;
pub mod media;
pub mod merge;
pub mod naming;
pub mod reconcile;
pub mod runner;
pub mod scan;
pub mod segment;
pub mod srt;
pub mod timecode;
pub mod workflow;
