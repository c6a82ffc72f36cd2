use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use super::{FileReport, Stage, file_stem, read_text, write_output};

use crate::error::Result;
use crate::subtitle::parse_srt;
use crate::tabular::{extract, write_records};

/// Extract: one CSV row per subtitle cue
#[derive(Default)]
pub struct ExtractStage;

impl ExtractStage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for ExtractStage {
    fn name(&self) -> &'static str {
        "extract"
    }

    fn input_extension(&self) -> &'static str {
        "srt"
    }

    fn output_file_name(&self, input: &Path) -> Result<String> {
        Ok(format!("{}.csv", file_stem(input)?))
    }

    async fn process_file(&self, input: &Path, output: &Path) -> Result<FileReport> {
        let cues = parse_srt(&read_text(input).await?)?;

        let records = extract(&cues)?;
        write_output(output, &write_records(&records)?).await?;

        info!("Extracted {} rows: {} -> {}", records.len(), input.display(), output.display());

        Ok(FileReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            items_in: cues.len(),
            items_out: records.len(),
        })
    }
}
