//! zhsub - Subtitle preparation pipeline for Traditional Chinese translation
//!
//! Cleans English SRT subtitles into one-sentence, one-line cues, extracts
//! them to CSV for machine translation and proofreading, and re-assembles the
//! translated CSV into SRT.

pub mod cli;
pub mod config;
pub mod error;
pub mod preprocess;
pub mod stage;
pub mod subtitle;
pub mod tabular;
pub mod workflow;
