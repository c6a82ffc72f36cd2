use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, ZhsubError};
use crate::stage::{FileReport, Stage, StageFactory, StageKind};

/// A file the stage could not convert
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub input: PathBuf,
    pub error: String,
}

/// Outcome of running a stage over a directory
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub stage: StageKind,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub processed: Vec<FileReport>,
    pub failed: Vec<FileFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Workflow {
    config: Config,
    show_progress: bool,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            show_progress: true,
        })
    }

    /// Enable or disable the progress bar for directory runs
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Default input and output directories of a stage under a project directory
    pub fn stage_dirs(&self, kind: StageKind, project_dir: &Path) -> (PathBuf, PathBuf) {
        let paths = &self.config.paths;
        let (input, output) = match kind {
            StageKind::Preprocess => (&paths.raw_dir, &paths.preprocessed_dir),
            StageKind::Extract => (&paths.preprocessed_dir, &paths.extracted_dir),
            StageKind::Assemble => (&paths.translated_csv_dir, &paths.translated_srt_dir),
        };
        (project_dir.join(input), project_dir.join(output))
    }

    /// Run a stage on a single file
    pub async fn run_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        kind: StageKind,
        input_path: P,
        output_path: Q,
    ) -> Result<FileReport> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();
        info!("Running {} on {}", kind, input_path.display());

        if !input_path.is_file() {
            return Err(ZhsubError::FileNotFound(input_path.display().to_string()));
        }

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let stage = StageFactory::create_stage(kind, &self.config);
        stage.process_file(input_path, output_path).await
    }

    /// Run a stage on every matching file of a directory, one after another.
    ///
    /// A file that fails is logged and recorded in the report; the remaining
    /// files are still processed.
    pub async fn run_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        kind: StageKind,
        input_dir: P,
        output_dir: Q,
    ) -> Result<BatchReport> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();
        info!("Running {} on directory: {}", kind, input_dir.display());

        if !input_dir.is_dir() {
            return Err(ZhsubError::FileNotFound(input_dir.display().to_string()));
        }

        let stage = StageFactory::create_stage(kind, &self.config);
        let input_files = find_input_files(input_dir, stage.input_extension());

        if input_files.is_empty() {
            return Err(ZhsubError::NoInputFiles {
                dir: input_dir.display().to_string(),
                extension: stage.input_extension().to_string(),
            });
        }

        fs::create_dir_all(output_dir).await?;
        info!("Found {} files to {}", input_files.len(), stage.name());

        let progress = self.progress_bar(input_files.len() as u64);
        let mut report = BatchReport {
            stage: kind,
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            processed: Vec::new(),
            failed: Vec::new(),
        };

        for input_path in input_files {
            progress.set_message(display_name(&input_path));

            match process_into(stage.as_ref(), &input_path, output_dir).await {
                Ok(file_report) => report.processed.push(file_report),
                Err(e) => {
                    warn!("Failed to {} {}: {}", stage.name(), input_path.display(), e);
                    report.failed.push(FileFailure {
                        input: input_path,
                        error: e.to_string(),
                    });
                }
            }

            progress.inc(1);
        }

        progress.finish_and_clear();
        info!(
            "{} finished: {} succeeded, {} failed",
            kind,
            report.processed.len(),
            report.failed.len()
        );

        Ok(report)
    }

    /// Preprocess raw subtitles and extract them to CSV under a project directory
    pub async fn run_pipeline<P: AsRef<Path>>(&self, project_dir: P) -> Result<Vec<BatchReport>> {
        let project_dir = project_dir.as_ref();

        if !project_dir.is_dir() {
            return Err(ZhsubError::Config(format!(
                "The specified path '{}' is not a valid directory",
                project_dir.display()
            )));
        }

        let mut reports = Vec::new();
        for kind in [StageKind::Preprocess, StageKind::Extract] {
            let (input_dir, output_dir) = self.stage_dirs(kind, project_dir);
            let report = self.run_directory(kind, &input_dir, &output_dir).await?;
            reports.push(report);
        }

        Ok(reports)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

async fn process_into(
    stage: &dyn Stage,
    input_path: &Path,
    output_dir: &Path,
) -> Result<FileReport> {
    let output_path = output_dir.join(stage.output_file_name(input_path)?);
    stage.process_file(input_path, &output_path).await
}

/// Files directly inside `dir` with the given extension, sorted by name
fn find_input_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();

    files.sort();
    files
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_input_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.srt", "a.SRT", "notes.txt", "c.csv"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.srt")).unwrap();

        let files = find_input_files(dir.path(), "srt");
        let names: Vec<String> = files.iter().map(|p| display_name(p)).collect();
        assert_eq!(names, vec!["a.SRT", "b.srt"]);
    }

    #[test]
    fn test_stage_dirs_follow_config() {
        let workflow = Workflow::new(Config::default()).unwrap();
        let (input, output) = workflow.stage_dirs(StageKind::Assemble, Path::new("show"));

        assert_eq!(input, Path::new("show").join("pretranslated csv"));
        assert_eq!(output, Path::new("show").join("translated subtitles"));
    }
}
