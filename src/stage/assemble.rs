use async_trait::async_trait;
use std::path::Path;
use tracing::{info, warn};

use super::{FileReport, Stage, file_stem, read_input, write_output};

use crate::error::Result;
use crate::subtitle::render_srt;
use crate::tabular::assemble;

/// Assemble: translated CSV back into an SRT file
pub struct AssembleStage {
    text_column: String,
}

impl AssembleStage {
    pub fn new(text_column: String) -> Self {
        Self { text_column }
    }
}

#[async_trait]
impl Stage for AssembleStage {
    fn name(&self) -> &'static str {
        "assemble"
    }

    fn input_extension(&self) -> &'static str {
        "csv"
    }

    fn output_file_name(&self, input: &Path) -> Result<String> {
        Ok(format!("{}.srt", file_stem(input)?))
    }

    async fn process_file(&self, input: &Path, output: &Path) -> Result<FileReport> {
        let raw = read_input(input).await?;
        let assembled = assemble(&raw, &self.text_column)?;

        if assembled.skipped_rows > 0 {
            warn!(
                "Skipped {} rows with empty {} in {}",
                assembled.skipped_rows,
                self.text_column,
                input.display()
            );
        }

        write_output(output, render_srt(&assembled.cues).as_bytes()).await?;
        info!(
            "Assembled {} cues: {} -> {}",
            assembled.cues.len(),
            input.display(),
            output.display()
        );

        Ok(FileReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            items_in: assembled.cues.len() + assembled.skipped_rows,
            items_out: assembled.cues.len(),
        })
    }
}
