//! Model and training configuration.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{MorfemaError, Result};

/// Layout of the model's input channels and targets.
///
/// The toggles select which channels a [`Batch`](crate::batcher::Batch)
/// carries and which auxiliary targets accompany the labels. The
/// defaults match the published Russian tagger configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Emit the word-index channel.
    pub use_words: bool,

    /// Emit the grammeme-distribution channel.
    pub use_grammemes: bool,

    /// Emit the character-index channel.
    pub use_chars: bool,

    /// Emit shifted copies of the label targets for the auxiliary
    /// POS language-model heads.
    pub use_pos_lm: bool,

    /// Emit shifted copies of the word matrix for the auxiliary word
    /// language-model heads.
    pub use_word_lm: bool,

    /// Character-channel width; longer words keep their last
    /// characters.
    pub char_max_word_length: usize,

    /// Largest in-vocabulary word index; everything beyond maps to the
    /// shared out-of-vocabulary index.
    pub word_max_count: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            use_words: false,
            use_grammemes: true,
            use_chars: true,
            use_pos_lm: false,
            use_word_lm: false,
            char_max_word_length: 32,
            word_max_count: 10000,
        }
    }
}

impl ModelConfig {
    /// Loads a configuration from a JSON document.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if the document is not valid JSON
    /// or the configuration is inconsistent.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let config: Self = serde_json::from_reader(rdr)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// See [`from_reader()`](Self::from_reader).
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::from_reader(File::open(path)?)
    }

    /// Checks the configuration for consistency.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if no input channel is enabled, if
    /// the word language model is combined with the word channel, or if
    /// a limit is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.use_words && !self.use_grammemes && !self.use_chars {
            return Err(MorfemaError::invalid_argument(
                "config",
                "at least one input channel must be enabled",
            ));
        }
        if self.use_word_lm && self.use_words {
            return Err(MorfemaError::invalid_argument(
                "config",
                "use_word_lm requires use_words to be disabled",
            ));
        }
        if self.char_max_word_length == 0 {
            return Err(MorfemaError::invalid_argument(
                "config",
                "char_max_word_length must be positive",
            ));
        }
        if self.word_max_count == 0 {
            return Err(MorfemaError::invalid_argument(
                "config",
                "word_max_count must be positive",
            ));
        }
        Ok(())
    }
}

/// Paths of the four persisted resource artifacts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourcePaths {
    /// Grammeme vectorizer fed by analyzer candidates.
    pub grammemes_input: PathBuf,

    /// Grammeme vectorizer holding the output labels.
    pub grammemes_output: PathBuf,

    /// Word vocabulary.
    pub vocabulary: PathBuf,

    /// Character alphabet.
    pub alphabet: PathBuf,
}

impl ResourcePaths {
    /// Places the artifacts under a directory with their conventional
    /// file names.
    pub fn under<P>(dir: P) -> Self
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        Self {
            grammemes_input: dir.join("gram_input.json"),
            grammemes_output: dir.join("gram_output.json"),
            vocabulary: dir.join("vocabulary.txt"),
            alphabet: dir.join("char_set.txt"),
        }
    }
}

/// Settings of the batch stream and the train/validation split.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Sentences per emitted batch; a bucket reaching this size is
    /// flushed.
    pub batch_size: usize,

    /// Half-open `[lower, upper)` sentence-length ranges, one bucket
    /// each, checked in order.
    pub sentence_len_groups: Vec<(usize, usize)>,

    /// Fraction of sentences assigned to the validation set.
    pub val_part: f64,

    /// Seed of the split permutation.
    pub random_seed: u64,

    /// Locations of the persisted resources.
    pub resources: ResourcePaths,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            batch_size: 5000,
            sentence_len_groups: vec![(26, 50), (15, 25), (1, 14)],
            val_part: 0.05,
            random_seed: 42,
            resources: ResourcePaths::under("model"),
        }
    }
}

impl TrainConfig {
    /// Loads a configuration from a JSON document.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if the document is not valid JSON
    /// or the configuration is inconsistent.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let config: Self = serde_json::from_reader(rdr)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// See [`from_reader()`](Self::from_reader).
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::from_reader(File::open(path)?)
    }

    /// Checks the configuration for consistency.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if the batch size is zero, no
    /// length group is given, a range is inverted, or the validation
    /// fraction is outside `[0, 1)`.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(MorfemaError::invalid_argument(
                "config",
                "batch_size must be positive",
            ));
        }
        if self.sentence_len_groups.is_empty() {
            return Err(MorfemaError::invalid_argument(
                "config",
                "sentence_len_groups must not be empty",
            ));
        }
        for &(lower, upper) in &self.sentence_len_groups {
            if lower >= upper {
                return Err(MorfemaError::invalid_argument(
                    "config",
                    format!("invalid sentence length range: [{lower}, {upper})"),
                ));
            }
        }
        if !(0.0..1.0).contains(&self.val_part) {
            return Err(MorfemaError::invalid_argument(
                "config",
                "val_part must be in [0, 1)",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_defaults() {
        let config = ModelConfig::default();
        assert!(!config.use_words);
        assert!(config.use_grammemes);
        assert!(config.use_chars);
        assert!(!config.use_pos_lm);
        assert!(!config.use_word_lm);
        assert_eq!(32, config.char_max_word_length);
        assert_eq!(10000, config.word_max_count);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_model_config_partial_json() {
        let config = ModelConfig::from_reader(r#"{"use_pos_lm": true}"#.as_bytes()).unwrap();
        assert!(config.use_pos_lm);
        assert!(config.use_grammemes);
        assert_eq!(32, config.char_max_word_length);
    }

    #[test]
    fn test_model_config_word_lm_conflict() {
        let result = ModelConfig::from_reader(
            r#"{"use_words": true, "use_word_lm": true}"#.as_bytes(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_model_config_no_channels() {
        let result = ModelConfig::from_reader(
            r#"{"use_words": false, "use_grammemes": false, "use_chars": false}"#.as_bytes(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_train_config_json() {
        let data = r#"{
            "batch_size": 3,
            "sentence_len_groups": [[1, 6], [6, 11]],
            "val_part": 0.1,
            "random_seed": 7,
            "resources": {
                "grammemes_input": "model/gram_input.json",
                "grammemes_output": "model/gram_output.json",
                "vocabulary": "model/vocabulary.txt",
                "alphabet": "model/char_set.txt"
            }
        }"#;
        let config = TrainConfig::from_reader(data.as_bytes()).unwrap();
        assert_eq!(3, config.batch_size);
        assert_eq!(vec![(1, 6), (6, 11)], config.sentence_len_groups);
        assert_eq!(7, config.random_seed);
        assert_eq!(
            PathBuf::from("model/vocabulary.txt"),
            config.resources.vocabulary
        );
    }

    #[test]
    fn test_train_config_partial_json() {
        let config = TrainConfig::from_reader(r#"{"batch_size": 16}"#.as_bytes()).unwrap();
        assert_eq!(16, config.batch_size);
        assert_eq!(vec![(26, 50), (15, 25), (1, 14)], config.sentence_len_groups);
        assert_eq!(42, config.random_seed);
    }

    #[test]
    fn test_train_config_rejects_inverted_range() {
        let mut config = TrainConfig::default();
        config.sentence_len_groups = vec![(10, 10)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_train_config_rejects_val_part() {
        let mut config = TrainConfig::default();
        config.val_part = 1.0;
        assert!(config.validate().is_err());
    }
}
