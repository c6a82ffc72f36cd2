//! Subtitle preprocessing.
//!
//! A single left-to-right pass that turns raw cues into one-line cues. Each
//! cue's lines are joined first; then a cue whose text does not end a sentence
//! absorbs the following cue, widening its time range, until the accumulated
//! text ends with terminal punctuation or the input runs out.

use serde::Serialize;
use tracing::debug;

use crate::config::PreprocessConfig;
use crate::error::{Result, ZhsubError};
use crate::subtitle::{Cue, NormalizedCue, Timestamp};

/// Counters describing one preprocessing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PreprocessStats {
    pub input_cues: usize,
    pub output_cues: usize,
    /// Input cues absorbed into a preceding cue
    pub merged_cues: usize,
}

/// Normalize a cue sequence. See [`normalize_with_stats`].
pub fn normalize(cues: &[Cue], config: &PreprocessConfig) -> Result<Vec<NormalizedCue>> {
    normalize_with_stats(cues, config).map(|(normalized, _)| normalized)
}

/// Normalize a cue sequence and report how many cues were merged.
///
/// Fails with [`ZhsubError::MalformedInput`] on the first cue that has empty
/// text, a non-positive duration, an index that does not increase, or a start
/// time earlier than its predecessor's. Nothing is returned on failure.
pub fn normalize_with_stats(
    cues: &[Cue],
    config: &PreprocessConfig,
) -> Result<(Vec<NormalizedCue>, PreprocessStats)> {
    let mut output = Vec::new();
    let mut stats = PreprocessStats {
        input_cues: cues.len(),
        ..PreprocessStats::default()
    };

    let Some((first, rest)) = cues.split_first() else {
        return Ok((output, stats));
    };

    validate_cue(first, None)?;
    let mut acc = Accumulator::start(first, join_lines(first, config)?);
    let mut previous = first;

    for cue in rest {
        validate_cue(cue, Some(previous))?;
        let text = join_lines(cue, config)?;

        if ends_sentence(&acc.text, config) {
            output.push(acc.finish(output.len() + 1));
            acc = Accumulator::start(cue, text);
        } else {
            debug!("Merging cue {} into cue starting at {}", cue.index, acc.start_time);
            acc.absorb(cue, &text, config);
            stats.merged_cues += 1;
        }

        previous = cue;
    }

    output.push(acc.finish(output.len() + 1));
    stats.output_cues = output.len();

    Ok((output, stats))
}

/// Whether the last meaningful character of `text` is terminal punctuation.
///
/// Trailing whitespace is ignored, as are any configured closing characters.
pub fn ends_sentence(text: &str, config: &PreprocessConfig) -> bool {
    text.trim_end()
        .chars()
        .rev()
        .find(|ch| !config.is_closer(*ch))
        .is_some_and(|ch| config.is_terminal(ch))
}

/// Join a cue's lines into one trimmed line
fn join_lines(cue: &Cue, config: &PreprocessConfig) -> Result<String> {
    let joined = cue
        .text
        .iter()
        .flat_map(|line| line.split(['\n', '\r']))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let text = tidy(&joined, config);
    if text.is_empty() {
        return Err(ZhsubError::malformed(cue.index, "cue text is empty"));
    }

    Ok(text)
}

fn tidy(text: &str, config: &PreprocessConfig) -> String {
    if config.collapse_whitespace {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        text.trim().to_string()
    }
}

fn validate_cue(cue: &Cue, previous: Option<&Cue>) -> Result<()> {
    if cue.index == 0 {
        return Err(ZhsubError::malformed(cue.index, "cue index must be positive"));
    }

    if cue.start_time >= cue.end_time {
        return Err(ZhsubError::malformed(
            cue.index,
            format!("start {} is not before end {}", cue.start_time, cue.end_time),
        ));
    }

    if let Some(previous) = previous {
        if cue.index <= previous.index {
            return Err(ZhsubError::malformed(
                cue.index,
                format!("index does not follow previous index {}", previous.index),
            ));
        }

        if cue.start_time < previous.start_time {
            return Err(ZhsubError::malformed(
                cue.index,
                format!(
                    "start {} precedes previous start {}",
                    cue.start_time, previous.start_time
                ),
            ));
        }
    }

    Ok(())
}

struct Accumulator {
    start_time: Timestamp,
    end_time: Timestamp,
    text: String,
}

impl Accumulator {
    fn start(cue: &Cue, text: String) -> Self {
        Self {
            start_time: cue.start_time,
            end_time: cue.end_time,
            text,
        }
    }

    fn absorb(&mut self, cue: &Cue, text: &str, config: &PreprocessConfig) {
        self.text = tidy(&format!("{} {}", self.text, text), config);
        // Overlapping input can end earlier than the accumulator already does
        self.end_time = self.end_time.max(cue.end_time);
    }

    fn finish(self, index: usize) -> NormalizedCue {
        NormalizedCue {
            index,
            start_time: self.start_time,
            end_time: self.end_time,
            text: self.text,
        }
    }
}
