//! Per-sentence feature encoding.
//!
//! [`SampleEncoder`] turns the words of one sentence into the three
//! input channels of the tagger. Each word is encoded independently:
//! its suffix characters against the alphabet, its vocabulary rank, and
//! a grammeme distribution blended from every analyzer candidate.

use crate::alphabet::CharAlphabet;
use crate::analyzer::MorphAnalyzer;
use crate::config::ModelConfig;
use crate::grammemes::GrammemeVectorizer;
use crate::tag;
use crate::vocabulary::WordVocabulary;

/// Encoded input channels of one sentence, parallel over its words.
pub struct EncodedSentence {
    word_ids: Vec<u32>,
    grammemes: Vec<Vec<f32>>,
    char_ids: Vec<Vec<u32>>,
}

impl EncodedSentence {
    /// Returns the vocabulary rank of each word.
    pub fn word_ids(&self) -> &[u32] {
        &self.word_ids
    }

    /// Returns the grammeme distribution of each word.
    pub fn grammemes(&self) -> &[Vec<f32>] {
        &self.grammemes
    }

    /// Returns the character indices of each word, left-padded to the
    /// configured width.
    pub fn char_ids(&self) -> &[Vec<u32>] {
        &self.char_ids
    }

    /// Returns the number of words.
    pub fn len(&self) -> usize {
        self.word_ids.len()
    }

    /// Checks if the sentence has no words.
    pub fn is_empty(&self) -> bool {
        self.word_ids.is_empty()
    }
}

/// Encoder of sentences into model input channels.
pub struct SampleEncoder<'a> {
    vectorizer: &'a GrammemeVectorizer,
    vocabulary: &'a WordVocabulary,
    alphabet: &'a CharAlphabet,
    analyzer: &'a dyn MorphAnalyzer,
    config: &'a ModelConfig,
}

impl<'a> SampleEncoder<'a> {
    /// Creates an encoder over finalized resources.
    ///
    /// The vectorizer must be the input-side one, built from analyzer
    /// candidates.
    pub fn new(
        vectorizer: &'a GrammemeVectorizer,
        vocabulary: &'a WordVocabulary,
        alphabet: &'a CharAlphabet,
        analyzer: &'a dyn MorphAnalyzer,
        config: &'a ModelConfig,
    ) -> Self {
        Self {
            vectorizer,
            vocabulary,
            alphabet,
            analyzer,
            config,
        }
    }

    /// Returns the width of the grammeme channel.
    pub fn grammemes_count(&self) -> usize {
        self.vectorizer.grammemes_count()
    }

    /// Encodes the words of one sentence.
    pub fn encode<S>(&self, words: &[S]) -> EncodedSentence
    where
        S: AsRef<str>,
    {
        let mut word_ids = Vec::with_capacity(words.len());
        let mut grammemes = Vec::with_capacity(words.len());
        let mut char_ids = Vec::with_capacity(words.len());
        for word in words {
            let word = word.as_ref();
            word_ids.push(self.encode_word(word));
            grammemes.push(self.encode_grammemes(word));
            char_ids.push(self.encode_chars(word));
        }
        EncodedSentence {
            word_ids,
            grammemes,
            char_ids,
        }
    }

    /// Returns the clamped vocabulary rank of a word.
    ///
    /// Out-of-vocabulary words and ranks beyond `word_max_count` share
    /// the index `word_max_count`.
    fn encode_word(&self, word: &str) -> u32 {
        let index = self
            .vocabulary
            .index(word)
            .unwrap_or(self.config.word_max_count)
            .min(self.config.word_max_count);
        u32::try_from(index).unwrap()
    }

    /// Returns the alphabet indices of the last characters of a word,
    /// left-padded to `char_max_word_length`.
    fn encode_chars(&self, word: &str) -> Vec<u32> {
        let width = self.config.char_max_word_length;
        let mut ids = vec![0; width];
        let indices: Vec<u32> = word
            .chars()
            .map(|c| u32::try_from(self.alphabet.index(c)).unwrap())
            .collect();
        let keep = indices.len().min(width);
        ids[width - keep..].copy_from_slice(&indices[indices.len() - keep..]);
        ids
    }

    /// Returns the grammeme distribution of a word.
    ///
    /// Sums the vectors of every analyzer candidate, then renormalizes
    /// each category span to mass 1. A span no candidate touched stays
    /// all zero, and so does the whole vector for a word the analyzer
    /// does not know. Candidates with labels outside the vectorizer
    /// contribute nothing.
    fn encode_grammemes(&self, word: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.vectorizer.grammemes_count()];
        for parse in self.analyzer.parses(word) {
            let label = tag::label(parse.pos(), parse.grammemes());
            if let Some(one_hot) = self.vectorizer.get(&label) {
                for (acc, &v) in vector.iter_mut().zip(one_hot) {
                    *acc += v;
                }
            }
        }
        for span in self.vectorizer.category_spans() {
            let mass: f32 = vector[span.clone()].iter().sum();
            if mass != 0.0 {
                for v in &mut vector[span.clone()] {
                    *v /= mass;
                }
            }
        }
        vector
    }
}
