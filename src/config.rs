use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, ZhsubError};

// Default values for preprocessing
fn default_terminal_punctuation() -> Vec<char> {
    vec!['.', '!', '?', '…', '⋯', '。', '！', '？']
}

fn default_cleaned_suffix() -> String {
    "_cleaned".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub preprocess: PreprocessConfig,
    pub paths: PathsConfig,
    pub assemble: AssembleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Characters that end a sentence. A cue whose text does not end with one
    /// of these is joined with the following cue.
    pub terminal_punctuation: Vec<char>,
    /// Characters skipped at the end of a cue before the punctuation check,
    /// e.g. closing quotes in `"Stop."`. Empty by default.
    pub trailing_closers: Vec<char>,
    /// Collapse runs of whitespace inside cue text to a single space
    pub collapse_whitespace: bool,
    /// Suffix appended to the file stem of preprocessed subtitles
    pub cleaned_suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Subdirectory holding raw downloaded subtitles
    pub raw_dir: String,
    /// Subdirectory receiving preprocessed subtitles
    pub preprocessed_dir: String,
    /// Subdirectory receiving extracted CSV files
    pub extracted_dir: String,
    /// Subdirectory holding translated CSV files
    pub translated_csv_dir: String,
    /// Subdirectory receiving re-assembled translated subtitles
    pub translated_srt_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssembleConfig {
    /// CSV column carrying the translated text
    pub text_column: String,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            terminal_punctuation: default_terminal_punctuation(),
            trailing_closers: Vec::new(),
            collapse_whitespace: true,
            cleaned_suffix: default_cleaned_suffix(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: "raw subtitles".to_string(),
            preprocessed_dir: "preprocessed subtitles".to_string(),
            extracted_dir: "extracted csv".to_string(),
            translated_csv_dir: "pretranslated csv".to_string(),
            translated_srt_dir: "translated subtitles".to_string(),
        }
    }
}

impl Default for AssembleConfig {
    fn default() -> Self {
        Self {
            text_column: "text_zh".to_string(),
        }
    }
}

impl PreprocessConfig {
    /// Build a config with a custom punctuation set and defaults elsewhere
    pub fn with_punctuation<I: IntoIterator<Item = char>>(punctuation: I) -> Self {
        Self {
            terminal_punctuation: punctuation.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn is_terminal(&self, ch: char) -> bool {
        self.terminal_punctuation.contains(&ch)
    }

    pub fn is_closer(&self, ch: char) -> bool {
        self.trailing_closers.contains(&ch)
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ZhsubError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ZhsubError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ZhsubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ZhsubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let preprocess = &self.preprocess;

        if preprocess.terminal_punctuation.is_empty() {
            return Err(ZhsubError::Config(
                "preprocess.terminal_punctuation must not be empty".to_string(),
            ));
        }

        if let Some(ch) = preprocess
            .terminal_punctuation
            .iter()
            .chain(preprocess.trailing_closers.iter())
            .find(|c| c.is_whitespace())
        {
            return Err(ZhsubError::Config(format!(
                "whitespace {:?} cannot be used as punctuation",
                ch
            )));
        }

        if self.assemble.text_column.trim().is_empty() {
            return Err(ZhsubError::Config(
                "assemble.text_column must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
