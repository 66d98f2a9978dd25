//! # Morfema
//!
//! Morfema is the data pipeline of a neural morphological tagger for
//! Russian. It turns a tagged corpus into the padded tensor batches a
//! sequence model trains on, and turns the model's predictions back
//! into lemmatized, tagged words.
//!
//! ## Overview
//!
//! A corpus scan derives four resources shared by training and
//! inference: a grammeme vectorizer over analyzer candidates, a second
//! vectorizer holding the output label set, a frequency-ranked word
//! vocabulary and a character alphabet. The resources are persisted as
//! plain artifacts, so later runs skip the scan. On top of them,
//! sentences are encoded into parallel input channels, grouped into
//! length buckets and emitted as left-padded batches; predicted label
//! probabilities are resolved back to lemmas through a morphological
//! analyzer.
//!
//! ## Main features
//!
//! - **Streaming batch generation**: corpus files are read one
//!   sentence at a time and a batch is built only when a length bucket
//!   fills, so memory stays bounded by the batch size.
//! - **Multi-channel encoding**: word indices, blended grammeme
//!   distributions and padded character indices, each channel toggled
//!   by the model configuration.
//! - **Persisted resources**: the vectorizers, vocabulary and alphabet
//!   save to disk and load back without rescanning the corpus.
//! - **Lemma resolution**: predicted labels pick the analyzer
//!   candidate with the best grammeme agreement, with a swappable
//!   table of annotation-convention corrections.
//!
//! ## Usage example
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use morfema::{LexiconAnalyzer, ModelConfig, SampleEncoder, TaggerResources};
//!
//! let corpus = "Мама\tмама\tNOUN\tCase=Nom|Gender=Fem|Number=Sing
//! мыла\tмыть\tVERB\tGender=Fem|Mood=Ind|Number=Sing|Tense=Past
//! раму\tрама\tNOUN\tCase=Acc|Gender=Fem|Number=Sing";
//! let lexicon = "мама\tмама\tNOUN\tCase=Nom|Gender=Fem|Number=Sing
//! мыла\tмыть\tVERB\tGender=Fem|Mood=Ind|Number=Sing|Tense=Past
//! мыла\tмыло\tNOUN\tCase=Gen|Gender=Neut|Number=Sing
//! раму\tрама\tNOUN\tCase=Acc|Gender=Fem|Number=Sing";
//!
//! let analyzer = LexiconAnalyzer::from_reader(lexicon.as_bytes())?;
//! let resources = TaggerResources::from_readers(vec![corpus.as_bytes()], &analyzer)?;
//! assert_eq!(3, resources.grammemes_output().labels_count());
//! assert_eq!(3, resources.vocabulary().word_count());
//!
//! let config = ModelConfig::default();
//! let encoder = SampleEncoder::new(
//!     resources.grammemes_input(),
//!     resources.vocabulary(),
//!     resources.alphabet(),
//!     &analyzer,
//!     &config,
//! );
//! let encoded = encoder.encode(&["Мама", "мыла", "раму"]);
//! assert_eq!(3, encoded.len());
//! # Ok(())
//! # }
//! ```

/// Character alphabet of the corpus.
pub mod alphabet;

/// Morphological analysis of single words.
pub mod analyzer;

/// Streaming generation of padded training batches.
pub mod batcher;

/// Model and training configuration.
pub mod config;

/// Corpus parsing and the train/validation split.
pub mod corpus;

/// Multi-channel encoding of sentences.
pub mod encoder;

/// Error type definitions.
pub mod errors;

/// Grammeme vectorization.
pub mod grammemes;

/// Lemma and tag resolution from predictions.
pub mod resolver;

/// The persisted resources of a tagger.
pub mod resources;

/// Grammeme normalization and composite labels.
pub mod tag;

/// Frequency-ranked word vocabulary.
pub mod vocabulary;

#[cfg(test)]
mod test_utils;

// Re-exports
pub use alphabet::CharAlphabet;
pub use analyzer::{LexiconAnalyzer, MorphAnalyzer, Parse};
pub use batcher::{Batch, BatchGenerator, BatchTargets};
pub use config::{ModelConfig, ResourcePaths, TrainConfig};
pub use encoder::{EncodedSentence, SampleEncoder};
pub use errors::MorfemaError;
pub use grammemes::GrammemeVectorizer;
pub use resolver::{LemmaOverrides, LemmaResolver, WordForm};
pub use resources::TaggerResources;
pub use vocabulary::WordVocabulary;

/// The version number of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
