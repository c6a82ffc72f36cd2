use std::fmt::Display;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{Cue, Timestamp};

use crate::error::{Result, ZhsubError};

static TIMING_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2,}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2,}:\d{2}:\d{2},\d{3})")
        .expect("timing line pattern is valid")
});

/// A run of non-blank lines together with the line number it starts at
struct Block<'a> {
    first_line: usize,
    lines: Vec<&'a str>,
}

/// Parse SRT content into cues.
///
/// Blocks are never skipped: a block whose first line is not an index is a
/// parse error, and a block without a valid timing line is a malformed cue.
/// Blocks with no text lines yield a cue with empty text so that validation
/// downstream can report them.
pub fn parse_srt(content: &str) -> Result<Vec<Cue>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let cues = split_blocks(content)
        .into_iter()
        .map(parse_block)
        .collect::<Result<Vec<_>>>()?;

    debug!("Parsed {} cues", cues.len());
    Ok(cues)
}

/// Render cues as SRT, each block followed by a blank line
pub fn render_srt<T: Display>(cues: &[T]) -> String {
    let mut srt_content = String::new();

    for cue in cues {
        srt_content.push_str(&cue.to_string());
        srt_content.push('\n');
    }

    srt_content
}

fn split_blocks(content: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<Block<'_>> = None;

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }

        current
            .get_or_insert_with(|| Block {
                first_line: idx + 1,
                lines: Vec::new(),
            })
            .lines
            .push(line);
    }

    if let Some(block) = current {
        blocks.push(block);
    }

    blocks
}

fn parse_block(block: Block<'_>) -> Result<Cue> {
    let mut lines = block.lines.into_iter();

    let index_line = lines.next().unwrap_or_default().trim();
    let index = index_line.parse::<usize>().map_err(|_| ZhsubError::Parse {
        line: block.first_line,
        message: format!("expected cue index, got '{}'", index_line),
    })?;

    let timing_line = lines
        .next()
        .ok_or_else(|| ZhsubError::malformed(index, "missing timestamp line"))?
        .trim();
    let (start_time, end_time) = parse_timing_line(timing_line).ok_or_else(|| {
        ZhsubError::malformed(index, format!("invalid timestamp line '{}'", timing_line))
    })?;

    let text = lines.map(|line| line.trim_end().to_string()).collect();

    Ok(Cue {
        index,
        start_time,
        end_time,
        text,
    })
}

fn parse_timing_line(line: &str) -> Option<(Timestamp, Timestamp)> {
    let caps = TIMING_LINE_REGEX.captures(line)?;
    let start = caps[1].parse().ok()?;
    let end = caps[2].parse().ok()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::NormalizedCue;

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello\nworld.\n\n2\n00:00:02,500 --> 00:00:04,000\nSecond cue\n";

    #[test]
    fn test_parse_multiline_cues() {
        let cues = parse_srt(SAMPLE).unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].index, 1);
        assert_eq!(cues[0].start_time, Timestamp::from_millis(1_000));
        assert_eq!(cues[0].end_time, Timestamp::from_millis(2_000));
        assert_eq!(cues[0].text, vec!["Hello", "world."]);
        assert_eq!(cues[1].text, vec!["Second cue"]);
    }

    #[test]
    fn test_parse_handles_bom_crlf_and_extra_blank_lines() {
        let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nHi.\r\n\r\n\r\n  \r\n2\r\n00:00:03,000-->00:00:04,000\r\nBye.\r\n";
        let cues = parse_srt(content).unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, vec!["Hi."]);
        assert_eq!(cues[1].start_time, Timestamp::from_millis(3_000));
    }

    #[test]
    fn test_parse_ignores_position_suffix_on_timing_line() {
        let content = "7\n00:00:01,000 --> 00:00:02,000 X1:40 X2:600\nText\n";
        let cues = parse_srt(content).unwrap();
        assert_eq!(cues[0].end_time, Timestamp::from_millis(2_000));
    }

    #[test]
    fn test_parse_rejects_non_numeric_index() {
        let content = "1\n00:00:01,000 --> 00:00:02,000\nA\n\nabc\n00:00:03,000 --> 00:00:04,000\nB\n";
        match parse_srt(content) {
            Err(ZhsubError::Parse { line, .. }) => assert_eq!(line, 5),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_reports_missing_timestamp_with_index() {
        let content = "1\n00:00:01,000 --> 00:00:02,000\nA\n\n2\nno timing here\n";
        match parse_srt(content) {
            Err(ZhsubError::MalformedInput { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected malformed input, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_overflowing_timestamp() {
        let content = "1\n9999999999999:00:00,000 --> 9999999999999:00:01,000\nHi.\n";
        match parse_srt(content) {
            Err(ZhsubError::MalformedInput { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected malformed input, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_keeps_cue_without_text() {
        let content = "1\n00:00:01,000 --> 00:00:02,000\n";
        let cues = parse_srt(content).unwrap();
        assert_eq!(cues.len(), 1);
        assert!(cues[0].text.is_empty());
    }

    #[test]
    fn test_render_srt() {
        let cues = vec![
            NormalizedCue {
                index: 1,
                start_time: Timestamp::from_millis(1_000),
                end_time: Timestamp::from_millis(2_000),
                text: "Hello world.".to_string(),
            },
            NormalizedCue {
                index: 2,
                start_time: Timestamp::from_millis(2_000),
                end_time: Timestamp::from_millis(3_500),
                text: "Bye.".to_string(),
            },
        ];

        assert_eq!(
            render_srt(&cues),
            "1\n00:00:01,000 --> 00:00:02,000\nHello world.\n\n2\n00:00:02,000 --> 00:00:03,500\nBye.\n\n"
        );
    }

    #[test]
    fn test_render_then_parse_preserves_cues() {
        let cues = parse_srt(SAMPLE).unwrap();
        let reparsed = parse_srt(&render_srt(&cues)).unwrap();
        assert_eq!(cues, reparsed);
    }
}
