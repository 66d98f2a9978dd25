//! Training corpus records, sentence streaming, and the
//! train/validation split.
//!
//! A corpus file holds one annotated token per line as
//! `text<TAB>lemma<TAB>POS<TAB>grammemes`; further columns are ignored.
//! A blank line ends the current sentence, and so does the end of the
//! file, so an unterminated final sentence is not lost. Runs of blank
//! lines produce no empty sentences. Sentence positions count the
//! terminated sentences in stream order and are shared by
//! [`count_sentences()`] and the batch generator, which makes the split
//! indices line up.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::errors::{MorfemaError, Result};

/// One annotated token of a training corpus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    text: String,
    lemma: String,
    pos: String,
    grammemes: String,
}

impl Record {
    /// Parses a corpus line.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if the line holds fewer than four
    /// fields.
    pub fn parse(line: &str) -> Result<Self> {
        let mut spl = line.split('\t');
        let text = spl.next();
        let lemma = spl.next();
        let pos = spl.next();
        let grammemes = spl.next();
        match (text, lemma, pos, grammemes) {
            (Some(text), Some(lemma), Some(pos), Some(grammemes)) => Ok(Self {
                text: text.to_string(),
                lemma: lemma.to_string(),
                pos: pos.to_string(),
                grammemes: grammemes.to_string(),
            }),
            _ => Err(MorfemaError::invalid_format(
                "corpus",
                "Each line must hold text<TAB>lemma<TAB>POS<TAB>grammemes",
            )),
        }
    }

    /// Returns the surface form.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the lemma.
    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    /// Returns the POS tag.
    pub fn pos(&self) -> &str {
        &self.pos
    }

    /// Returns the grammeme string.
    pub fn grammemes(&self) -> &str {
        &self.grammemes
    }
}

/// Streaming iterator over the sentences of one corpus reader.
pub struct SentenceReader<R> {
    buf: BufReader<R>,
}

impl<R> SentenceReader<R>
where
    R: Read,
{
    /// Creates a reader over a corpus source.
    pub fn new(rdr: R) -> Self {
        Self {
            buf: BufReader::new(rdr),
        }
    }
}

impl<R> Iterator for SentenceReader<R>
where
    R: Read,
{
    type Item = Result<Vec<Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut records = vec![];
        let mut line = String::new();
        loop {
            line.clear();
            match self.buf.read_line(&mut line) {
                Ok(0) => {
                    if records.is_empty() {
                        return None;
                    }
                    return Some(Ok(records));
                }
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if records.is_empty() {
                    continue;
                }
                return Some(Ok(records));
            }
            match Record::parse(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Counts the sentences of the given corpus files.
///
/// Uses the termination rules of [`SentenceReader`], so the result
/// matches the sentence positions seen by the batch generator over the
/// same files in the same order.
///
/// # Errors
///
/// [`MorfemaError`] is returned if a file cannot be read.
pub fn count_sentences<P>(paths: &[P]) -> Result<usize>
where
    P: AsRef<Path>,
{
    let mut count = 0;
    for path in paths {
        let buf = BufReader::new(File::open(path)?);
        let mut pending = false;
        for line in buf.lines() {
            let line = line?;
            if line.trim().is_empty() {
                if pending {
                    count += 1;
                    pending = false;
                }
            } else {
                pending = true;
            }
        }
        if pending {
            count += 1;
        }
    }
    Ok(count)
}

/// Splits sentence positions into train and validation sets.
///
/// The positions `0..num_sentences` are shuffled with a generator
/// seeded by `seed`; the first `floor(num_sentences * (1 - val_part))`
/// go to the train set and the rest to the validation set. The two
/// sets are disjoint and cover every position, and the same seed
/// reproduces the same split.
///
/// # Errors
///
/// [`MorfemaError`] is returned if `val_part` is outside `[0, 1)`.
pub fn train_val_split(
    num_sentences: usize,
    val_part: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&val_part) {
        return Err(MorfemaError::invalid_argument(
            "val_part",
            "val_part must be in [0, 1)",
        ));
    }
    let mut positions: Vec<usize> = (0..num_sentences).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    positions.shuffle(&mut rng);
    let border = (num_sentences as f64 * (1.0 - val_part)) as usize;
    let val = positions.split_off(border);
    Ok((positions, val))
}
