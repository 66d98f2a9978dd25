//! Frequency-ordered word vocabulary.

use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use hashbrown::HashMap;

use crate::errors::Result;

/// Word table mapping surface forms to frequency-rank indices.
///
/// Words are counted in lowercase during a corpus scan;
/// [`finalize()`](WordVocabulary::finalize) assigns index 0 to the most
/// frequent word, breaking ties by first occurrence. Lookups lowercase
/// their argument, so corpus-cased words hit the same entry.
#[derive(Default)]
pub struct WordVocabulary {
    /// Count and first-occurrence rank per lowercased word.
    counts: HashMap<String, (usize, usize)>,

    /// Words in frequency-rank order.
    words: Vec<String>,

    index: HashMap<String, usize>,
}

impl WordVocabulary {
    /// Creates an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of a word.
    pub fn add_word(&mut self, word: &str) {
        let next = self.counts.len();
        let entry = self.counts.entry(word.to_lowercase()).or_insert((0, next));
        entry.0 += 1;
    }

    /// Fixes the frequency-rank indices.
    ///
    /// Recomputes the order from the accumulated counts, so calling it
    /// again without intervening additions is a no-op. On a vocabulary
    /// restored with [`from_reader()`](Self::from_reader) the counts are
    /// gone and the stored order stands.
    pub fn finalize(&mut self) {
        if self.counts.is_empty() {
            return;
        }
        let mut entries: Vec<(&String, &(usize, usize))> = self.counts.iter().collect();
        entries.sort_unstable_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)));
        self.words = entries.into_iter().map(|(word, _)| word.clone()).collect();
        self.index = self
            .words
            .iter()
            .enumerate()
            .map(|(i, word)| (word.clone(), i))
            .collect();
    }

    /// Returns the rank index of a word, or [`None`] if it is out of
    /// vocabulary.
    pub fn index(&self, word: &str) -> Option<usize> {
        self.index.get(word.to_lowercase().as_str()).copied()
    }

    /// Checks if the vocabulary contains a word.
    pub fn contains(&self, word: &str) -> bool {
        self.index(word).is_some()
    }

    /// Returns the number of words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Checks if no word has been added.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.counts.is_empty()
    }

    /// Writes the words in rank order, one per line.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`](crate::errors::MorfemaError) is returned if
    /// writing fails.
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        let mut wtr = BufWriter::new(wtr);
        for word in &self.words {
            writeln!(&mut wtr, "{word}")?;
        }
        Ok(())
    }

    /// Loads a vocabulary written by [`write()`](Self::write).
    ///
    /// Line position becomes the rank index. Empty lines are skipped.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`](crate::errors::MorfemaError) is returned if
    /// reading fails.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let buf = BufReader::new(rdr);
        let mut vocabulary = Self::new();
        for line in buf.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let rank = vocabulary.words.len();
            vocabulary.index.insert(line.clone(), rank);
            vocabulary.words.push(line);
        }
        Ok(vocabulary)
    }
}
