// Pipeline stages
//
// Each stage converts one file format into another:
// - Preprocess: raw SRT -> normalized SRT
// - Extract: normalized SRT -> CSV for translation and proofreading
// - Assemble: translated CSV -> SRT
//
// Stages are created through StageFactory and driven by the Workflow, which
// handles directory traversal and reporting.

pub mod assemble;
pub mod extract;
pub mod preprocess;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::Config;
use crate::error::{Result, ZhsubError};

/// Outcome of running a stage over one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Cues or rows read from the input
    pub items_in: usize,
    /// Cues or rows written to the output
    pub items_out: usize,
}

/// Main trait for pipeline stages
#[async_trait]
pub trait Stage: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// Extension (without dot) of the files this stage reads
    fn input_extension(&self) -> &'static str;

    /// Output file name for an input file
    fn output_file_name(&self, input: &Path) -> Result<String>;

    /// Convert `input` into `output`. On error nothing is written.
    async fn process_file(&self, input: &Path, output: &Path) -> Result<FileReport>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Preprocess,
    Extract,
    Assemble,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Preprocess => "preprocess",
            Self::Extract => "extract",
            Self::Assemble => "assemble",
        };
        f.write_str(name)
    }
}

/// Factory for creating stage instances
pub struct StageFactory;

impl StageFactory {
    pub fn create_stage(kind: StageKind, config: &Config) -> Box<dyn Stage> {
        match kind {
            StageKind::Preprocess => {
                Box::new(preprocess::PreprocessStage::new(config.preprocess.clone()))
            }
            StageKind::Extract => Box::new(extract::ExtractStage::new()),
            StageKind::Assemble => {
                Box::new(assemble::AssembleStage::new(config.assemble.text_column.clone()))
            }
        }
    }
}

/// File stem of `input` as UTF-8, or an error naming the path
pub(crate) fn file_stem(input: &Path) -> Result<String> {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| ZhsubError::Config(format!("Invalid input filename: {}", input.display())))
}

/// Read an input file, reporting a missing file distinctly
pub(crate) async fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(ZhsubError::FileNotFound(path.display().to_string()));
    }
    Ok(fs::read(path).await?)
}

/// Read an input file that must be UTF-8 text
pub(crate) async fn read_text(path: &Path) -> Result<String> {
    let raw = read_input(path).await?;
    String::from_utf8(raw).map_err(|e| {
        ZhsubError::UnsupportedFormat(format!("{} is not valid UTF-8: {}", path.display(), e))
    })
}

/// Write `content` next to `path` and move it into place
pub(crate) async fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let written = match fs::write(&temp_path, content).await {
        Ok(()) => fs::rename(&temp_path, path).await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_kind_names() {
        assert_eq!(StageKind::Preprocess.to_string(), "preprocess");
        assert_eq!(StageKind::Extract.to_string(), "extract");
        assert_eq!(StageKind::Assemble.to_string(), "assemble");
        assert_eq!(serde_json::to_string(&StageKind::Assemble).unwrap(), "\"assemble\"");
    }

    #[test]
    fn test_factory_output_names() {
        let config = Config::default();
        let input = Path::new("dir/Episode 01.srt");

        let preprocess = StageFactory::create_stage(StageKind::Preprocess, &config);
        assert_eq!(preprocess.output_file_name(input).unwrap(), "Episode 01_cleaned.srt");
        assert_eq!(preprocess.input_extension(), "srt");

        let extract = StageFactory::create_stage(StageKind::Extract, &config);
        assert_eq!(extract.output_file_name(input).unwrap(), "Episode 01.csv");

        let assemble = StageFactory::create_stage(StageKind::Assemble, &config);
        assert_eq!(
            assemble.output_file_name(Path::new("Episode 01.csv")).unwrap(),
            "Episode 01.srt"
        );
        assert_eq!(assemble.input_extension(), "csv");
    }

    #[tokio::test]
    async fn test_write_output_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.srt");

        write_output(&path, b"first").await.unwrap();
        write_output(&path, b"second").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert!(!dir.path().join("out.srt.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_output_cleans_up_when_rename_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the final rename fail
        let path = dir.path().join("out.srt");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        assert!(write_output(&path, b"content").await.is_err());
        assert!(!dir.path().join("out.srt.tmp").exists());
        assert!(path.join("keep").exists());
    }
}
