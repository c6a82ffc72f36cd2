// Subtitle data model and SRT codec
//
// - timestamp: millisecond timestamps in SRT notation
// - srt: parsing SRT text into cues and rendering cues back to SRT

pub mod srt;
pub mod timestamp;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use srt::{parse_srt, render_srt};
pub use timestamp::Timestamp;

/// One subtitle entry as authored, possibly spanning several lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub index: usize,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub text: Vec<String>,
}

/// A preprocessed subtitle entry whose text is a single line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCue {
    pub index: usize,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub text: String,
}

impl Cue {
    pub fn new<S: Into<String>>(
        index: usize,
        start_time: Timestamp,
        end_time: Timestamp,
        text: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            index,
            start_time,
            end_time,
            text: text.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start_time, self.end_time)?;
        for line in &self.text {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl fmt::Display for NormalizedCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start_time, self.end_time)?;
        writeln!(f, "{}", self.text)
    }
}
