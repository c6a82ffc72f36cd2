use async_trait::async_trait;
use std::path::Path;
use tracing::{info, warn};

use super::{FileReport, Stage, file_stem, read_text, write_output};

use crate::config::PreprocessConfig;
use crate::error::Result;
use crate::preprocess::normalize_with_stats;
use crate::subtitle::{parse_srt, render_srt};

/// Preprocess: merge multi-line cues and join sentence continuations
pub struct PreprocessStage {
    config: PreprocessConfig,
}

impl PreprocessStage {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Stage for PreprocessStage {
    fn name(&self) -> &'static str {
        "preprocess"
    }

    fn input_extension(&self) -> &'static str {
        "srt"
    }

    fn output_file_name(&self, input: &Path) -> Result<String> {
        Ok(format!("{}{}.srt", file_stem(input)?, self.config.cleaned_suffix))
    }

    async fn process_file(&self, input: &Path, output: &Path) -> Result<FileReport> {
        let content = read_text(input).await?;

        let cues = parse_srt(&content)?;
        if cues.is_empty() {
            warn!("No subtitles found in {}", input.display());
        }

        let (normalized, stats) = normalize_with_stats(&cues, &self.config)?;
        write_output(output, render_srt(&normalized).as_bytes()).await?;

        info!(
            "Preprocessed {} -> {} ({} cues -> {}, {} merged)",
            input.display(),
            output.display(),
            stats.input_cues,
            stats.output_cues,
            stats.merged_cues
        );

        Ok(FileReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            items_in: stats.input_cues,
            items_out: stats.output_cues,
        })
    }
}
