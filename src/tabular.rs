//! CSV conversions around the translation step.
//!
//! `extract` turns a preprocessed subtitle file into one row per cue for the
//! translation and proofreading collaborators; `assemble` reads their CSV back
//! and rebuilds an SRT from a translated text column.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ZhsubError};
use crate::subtitle::{Cue, Timestamp};

/// Column names of the extracted CSV
pub const INDEX_COLUMN: &str = "index";
pub const START_COLUMN: &str = "start_time";
pub const END_COLUMN: &str = "end_time";
pub const TEXT_COLUMN: &str = "text";

/// One row of the extracted CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueRecord {
    pub index: usize,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub text: String,
}

/// Result of re-assembling a translated CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub cues: Vec<Cue>,
    /// Data rows dropped because their translated text was empty
    pub skipped_rows: usize,
}

impl From<&Cue> for CueRecord {
    fn from(cue: &Cue) -> Self {
        let text = cue
            .text
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            index: cue.index,
            start_time: cue.start_time,
            end_time: cue.end_time,
            text,
        }
    }
}

/// Build one record per cue, joining multi-line text with a space
pub fn extract(cues: &[Cue]) -> Result<Vec<CueRecord>> {
    cues.iter()
        .map(|cue| {
            let record = CueRecord::from(cue);
            if record.text.is_empty() {
                return Err(ZhsubError::malformed(cue.index, "cue text is empty"));
            }
            Ok(record)
        })
        .collect()
}

/// Serialize records as CSV with an `index,start_time,end_time,text` header
pub fn write_records(records: &[CueRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if records.is_empty() {
        writer.write_record([INDEX_COLUMN, START_COLUMN, END_COLUMN, TEXT_COLUMN])?;
    }
    for record in records {
        writer.serialize(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ZhsubError::Io(e.into_error()))
}

/// Read records written by [`write_records`]
pub fn read_records(data: &[u8]) -> Result<Vec<CueRecord>> {
    let mut reader = csv::Reader::from_reader(strip_bom(data));
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<CueRecord>, _>>()
        .map_err(ZhsubError::from)
}

/// Rebuild cues from a CSV that carries timing columns and `text_column`.
///
/// Rows with empty translated text are skipped with a warning. Output cues are
/// numbered from 1 in row order. `-->` inside the text is replaced so it
/// cannot be mistaken for a timing line, and blank lines are dropped so a cue
/// cannot be split in two.
pub fn assemble(data: &[u8], text_column: &str) -> Result<Assembled> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(strip_bom(data));

    let headers = reader.headers()?.clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| ZhsubError::MissingColumn(name.to_string()))
    };
    let start_col = column(START_COLUMN)?;
    let end_col = column(END_COLUMN)?;
    let text_col = column(text_column)?;

    let mut cues = Vec::new();
    let mut skipped_rows = 0;

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        // Quoted fields may span lines, so prefer the reader's position
        let line = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(row + 2);

        let field = |col: usize| record.get(col).unwrap_or("").trim();

        let text = sanitize_text(field(text_col));
        if text.is_empty() {
            warn!("Empty {} at CSV line {}, skipping row", text_column, line);
            skipped_rows += 1;
            continue;
        }

        let parse_time = |col: usize| -> Result<Timestamp> {
            field(col).parse().map_err(|_| ZhsubError::Parse {
                line,
                message: format!("invalid timestamp '{}'", field(col)),
            })
        };
        let start_time = parse_time(start_col)?;
        let end_time = parse_time(end_col)?;

        cues.push(Cue {
            index: cues.len() + 1,
            start_time,
            end_time,
            text,
        });
    }

    debug!("Assembled {} cues, skipped {} rows", cues.len(), skipped_rows);
    Ok(Assembled { cues, skipped_rows })
}

fn sanitize_text(text: &str) -> Vec<String> {
    text.replace("-->", "→")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix("\u{feff}".as_bytes()).unwrap_or(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: u64) -> Timestamp {
        Timestamp::from_millis(secs * 1000)
    }

    #[test]
    fn test_extract_writes_one_row_per_cue() {
        let cues = vec![
            Cue::new(1, ts(1), ts(2), ["Hello,", "world."]),
            Cue::new(2, ts(3), ts(4), ["She said \"hi\"."]),
        ];
        let records = extract(&cues).unwrap();
        let csv_text = String::from_utf8(write_records(&records).unwrap()).unwrap();

        let expected = r#"index,start_time,end_time,text
1,"00:00:01,000","00:00:02,000","Hello, world."
2,"00:00:03,000","00:00:04,000","She said ""hi""."
"#;
        assert_eq!(csv_text, expected);
    }

    #[test]
    fn test_records_read_back() {
        let records = vec![CueRecord {
            index: 1,
            start_time: ts(1),
            end_time: ts(2),
            text: "a, b".to_string(),
        }];
        let data = write_records(&records).unwrap();
        assert_eq!(read_records(&data).unwrap(), records);
    }

    #[test]
    fn test_empty_extract_still_has_header() {
        let data = write_records(&[]).unwrap();
        assert_eq!(String::from_utf8(data).unwrap(), "index,start_time,end_time,text\n");
    }

    #[test]
    fn test_extract_rejects_empty_text() {
        let cues = vec![Cue::new(4, ts(1), ts(2), ["  "])];
        assert!(matches!(
            extract(&cues),
            Err(ZhsubError::MalformedInput { index: 4, .. })
        ));
    }

    #[test]
    fn test_assemble_uses_translated_column() {
        let data = "\u{feff}index,start_time,end_time,text,text_zh\n\
                    1,\"00:00:01,000\",\"00:00:02,000\",Hello.,你好。\n\
                    2,\"00:00:03,000\",\"00:00:04,000\",Skip me.,\n\
                    3,\"00:00:05,000\",\"00:00:06,000\",Arrow.,A --> B\n";
        let assembled = assemble(data.as_bytes(), "text_zh").unwrap();

        assert_eq!(assembled.skipped_rows, 1);
        assert_eq!(assembled.cues.len(), 2);
        assert_eq!(assembled.cues[0], Cue::new(1, ts(1), ts(2), ["你好。"]));
        assert_eq!(assembled.cues[1].index, 2);
        assert_eq!(assembled.cues[1].start_time, ts(5));
        assert_eq!(assembled.cues[1].text, vec!["A → B"]);
    }

    #[test]
    fn test_assemble_drops_blank_lines_inside_text() {
        let data = "start_time,end_time,text_zh\n\"00:00:01,000\",\"00:00:02,000\",\"第一行\n\n第二行\"\n";
        let assembled = assemble(data.as_bytes(), "text_zh").unwrap();
        assert_eq!(assembled.cues[0].text, vec!["第一行", "第二行"]);
    }

    #[test]
    fn test_assemble_requires_columns() {
        let data = "index,start_time,end_time,text\n1,\"00:00:01,000\",\"00:00:02,000\",Hi.\n";
        match assemble(data.as_bytes(), "text_zh") {
            Err(ZhsubError::MissingColumn(name)) => assert_eq!(name, "text_zh"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_assemble_reports_bad_timestamp_line() {
        let data = "start_time,end_time,text_zh\n\"00:00:01,000\",\"00:00:02,000\",好。\nbad,\"00:00:04,000\",壞。\n";
        match assemble(data.as_bytes(), "text_zh") {
            Err(ZhsubError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_assemble_reports_line_after_multiline_field() {
        let data = "start_time,end_time,text_zh\n\
                    \"00:00:01,000\",\"00:00:02,000\",\"第一行\n第二行\n第三行\"\n\
                    bad,\"00:00:04,000\",壞。\n";
        match assemble(data.as_bytes(), "text_zh") {
            Err(ZhsubError::Parse { line, .. }) => assert_eq!(line, 5),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
