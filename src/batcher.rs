//! Streaming generation of padded training batches.
//!
//! [`BatchGenerator`] pulls sentences out of corpus files one line at a
//! time, keeps the selected ones, groups them into length buckets, and
//! yields a padded tensor batch whenever a bucket fills. Nothing is
//! read ahead of the batch being built; dropping the generator closes
//! the current file.

use std::fs::File;
use std::path::{Path, PathBuf};

use hashbrown::HashSet;
use ndarray::{s, Array2, Array3, ArrayView1};

use crate::config::{ModelConfig, TrainConfig};
use crate::corpus::SentenceReader;
use crate::encoder::SampleEncoder;
use crate::errors::Result;
use crate::grammemes::GrammemeVectorizer;
use crate::tag;

/// One word of a pending sentence with its resolved label index.
struct LabeledWord {
    text: String,
    label_index: usize,
}

/// Target tensors of one batch.
///
/// Stored label values are the vectorizer indices plus one; value 0 is
/// the padding class. The shifted variants move each row one step right
/// or left with a zero boundary and are present only when the matching
/// language-model toggle is on.
pub struct BatchTargets {
    labels: Array2<u32>,
    labels_prev: Option<Array2<u32>>,
    labels_next: Option<Array2<u32>>,
    words_prev: Option<Array2<u32>>,
    words_next: Option<Array2<u32>>,
}

impl BatchTargets {
    /// Returns the label matrix.
    pub fn labels(&self) -> &Array2<u32> {
        &self.labels
    }

    /// Returns the labels shifted one step right, if `use_pos_lm` is
    /// on.
    pub fn labels_prev(&self) -> Option<&Array2<u32>> {
        self.labels_prev.as_ref()
    }

    /// Returns the labels shifted one step left, if `use_pos_lm` is
    /// on.
    pub fn labels_next(&self) -> Option<&Array2<u32>> {
        self.labels_next.as_ref()
    }

    /// Returns the word matrix shifted one step right, if
    /// `use_word_lm` is on.
    pub fn words_prev(&self) -> Option<&Array2<u32>> {
        self.words_prev.as_ref()
    }

    /// Returns the word matrix shifted one step left, if `use_word_lm`
    /// is on.
    pub fn words_next(&self) -> Option<&Array2<u32>> {
        self.words_next.as_ref()
    }
}

/// One padded batch of encoded sentences.
///
/// Every tensor spans the same sentences; each sentence occupies the
/// last columns of its row and the padding columns before it hold
/// zeros. A channel turned off in the model configuration is absent
/// rather than zero-filled.
pub struct Batch {
    words: Option<Array2<u32>>,
    grammemes: Option<Array3<f32>>,
    chars: Option<Array3<u32>>,
    targets: BatchTargets,
}

impl Batch {
    /// Returns the word-index channel, if `use_words` is on.
    pub fn words(&self) -> Option<&Array2<u32>> {
        self.words.as_ref()
    }

    /// Returns the grammeme-distribution channel, if `use_grammemes`
    /// is on.
    pub fn grammemes(&self) -> Option<&Array3<f32>> {
        self.grammemes.as_ref()
    }

    /// Returns the character-index channel, if `use_chars` is on.
    pub fn chars(&self) -> Option<&Array3<u32>> {
        self.chars.as_ref()
    }

    /// Returns the targets.
    pub fn targets(&self) -> &BatchTargets {
        &self.targets
    }

    /// Returns the number of sentences.
    pub fn num_sentences(&self) -> usize {
        self.targets.labels.nrows()
    }

    /// Returns the padded sentence length.
    pub fn max_len(&self) -> usize {
        self.targets.labels.ncols()
    }
}

/// Pull-based stream of batches over corpus files.
///
/// The generator owns the scan state, so each call to
/// [`next()`](Iterator::next) resumes exactly where the previous one
/// stopped. Sentences are counted in stream order across all files and
/// only the positions in the supplied index set are kept, which is how
/// the train and validation streams share one corpus. After the last
/// file, the remaining non-empty buckets are flushed in the order the
/// length groups were declared.
pub struct BatchGenerator<'a> {
    paths: Vec<PathBuf>,
    next_path: usize,
    sentences: Option<SentenceReader<File>>,
    encoder: SampleEncoder<'a>,
    output: &'a GrammemeVectorizer,
    model: &'a ModelConfig,
    batch_size: usize,
    ranges: Vec<(usize, usize)>,
    buckets: Vec<Vec<Vec<LabeledWord>>>,
    indices: HashSet<usize>,
    position: usize,
    flush_cursor: usize,
    dropped: usize,
    finished: bool,
}

impl<'a> BatchGenerator<'a> {
    /// Creates a generator over the given corpus files.
    ///
    /// `indices` holds the sentence positions this stream keeps;
    /// positions follow the file order of `paths`.
    pub fn new<P, I>(
        paths: &[P],
        encoder: SampleEncoder<'a>,
        output: &'a GrammemeVectorizer,
        model: &'a ModelConfig,
        train: &TrainConfig,
        indices: I,
    ) -> Self
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = usize>,
    {
        Self {
            paths: paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
            next_path: 0,
            sentences: None,
            encoder,
            output,
            model,
            batch_size: train.batch_size,
            ranges: train.sentence_len_groups.clone(),
            buckets: train.sentence_len_groups.iter().map(|_| vec![]).collect(),
            indices: indices.into_iter().collect(),
            position: 0,
            flush_cursor: 0,
            dropped: 0,
            finished: false,
        }
    }

    /// Returns the number of kept sentences no length group covered.
    pub fn dropped_sentences(&self) -> usize {
        self.dropped
    }

    /// Stops the stream; only the EOF drain of the buckets remains.
    fn finish(&mut self) {
        self.finished = true;
        self.sentences = None;
    }

    /// Stops the stream and discards the buckets.
    fn poison(&mut self) {
        self.finish();
        self.flush_cursor = self.buckets.len();
    }

    /// Builds the padded tensors of one flushed bucket.
    fn to_batch(&self, sentences: &[Vec<LabeledWord>]) -> Batch {
        let n = sentences.len();
        let max_len = sentences.iter().map(Vec::len).max().unwrap_or(0);

        let mut words = Array2::<u32>::zeros((n, max_len));
        let mut grammemes =
            Array3::<f32>::zeros((n, max_len, self.encoder.grammemes_count()));
        let mut chars =
            Array3::<u32>::zeros((n, max_len, self.model.char_max_word_length));
        let mut labels = Array2::<u32>::zeros((n, max_len));

        for (i, sentence) in sentences.iter().enumerate() {
            let texts: Vec<&str> = sentence.iter().map(|w| w.text.as_str()).collect();
            let encoded = self.encoder.encode(&texts);
            let start = max_len - sentence.len();
            words
                .slice_mut(s![i, start..])
                .assign(&ArrayView1::from(encoded.word_ids()));
            for (j, word) in sentence.iter().enumerate() {
                let col = start + j;
                labels[[i, col]] = u32::try_from(word.label_index).unwrap() + 1;
                grammemes
                    .slice_mut(s![i, col, ..])
                    .assign(&ArrayView1::from(encoded.grammemes()[j].as_slice()));
                chars
                    .slice_mut(s![i, col, ..])
                    .assign(&ArrayView1::from(encoded.char_ids()[j].as_slice()));
            }
        }

        let (labels_prev, labels_next) = if self.model.use_pos_lm {
            (Some(shift_right(&labels)), Some(shift_left(&labels)))
        } else {
            (None, None)
        };
        let (words_prev, words_next) = if self.model.use_word_lm {
            (Some(shift_right(&words)), Some(shift_left(&words)))
        } else {
            (None, None)
        };

        Batch {
            words: if self.model.use_words { Some(words) } else { None },
            grammemes: if self.model.use_grammemes {
                Some(grammemes)
            } else {
                None
            },
            chars: if self.model.use_chars { Some(chars) } else { None },
            targets: BatchTargets {
                labels,
                labels_prev,
                labels_next,
                words_prev,
                words_next,
            },
        }
    }
}

impl<'a> Iterator for BatchGenerator<'a> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                while self.flush_cursor < self.buckets.len() {
                    let index = self.flush_cursor;
                    self.flush_cursor += 1;
                    if !self.buckets[index].is_empty() {
                        let bucket = std::mem::take(&mut self.buckets[index]);
                        return Some(Ok(self.to_batch(&bucket)));
                    }
                }
                return None;
            }

            let reader = match self.sentences.as_mut() {
                Some(reader) => reader,
                None => {
                    if self.next_path == self.paths.len() {
                        self.finished = true;
                        continue;
                    }
                    let file = match File::open(&self.paths[self.next_path]) {
                        Ok(file) => file,
                        Err(e) => {
                            self.poison();
                            return Some(Err(e.into()));
                        }
                    };
                    self.next_path += 1;
                    self.sentences.insert(SentenceReader::new(file))
                }
            };

            let records = match reader.next() {
                None => {
                    self.sentences = None;
                    continue;
                }
                Some(Err(e)) => {
                    self.poison();
                    return Some(Err(e));
                }
                Some(Ok(records)) => records,
            };

            let position = self.position;
            self.position += 1;
            if !self.indices.contains(&position) {
                continue;
            }

            let mut sentence = Vec::with_capacity(records.len());
            for record in &records {
                let label = tag::label(record.pos(), record.grammemes());
                match self.output.index(&label) {
                    Ok(label_index) => sentence.push(LabeledWord {
                        text: record.text().to_string(),
                        label_index,
                    }),
                    Err(e) => {
                        self.poison();
                        return Some(Err(e));
                    }
                }
            }

            let len = sentence.len();
            let mut placed = false;
            for (index, &(lower, upper)) in self.ranges.iter().enumerate() {
                if lower <= len && len < upper {
                    self.buckets[index].push(sentence);
                    placed = true;
                    if self.buckets[index].len() >= self.batch_size {
                        let bucket = std::mem::take(&mut self.buckets[index]);
                        return Some(Ok(self.to_batch(&bucket)));
                    }
                    break;
                }
            }
            if !placed {
                self.dropped += 1;
                log::warn!("no length group covers a sentence of {len} words; dropping it");
            }
        }
    }
}

/// Copies a matrix one column right, zeroing the first column.
fn shift_right(source: &Array2<u32>) -> Array2<u32> {
    let mut shifted = Array2::zeros(source.dim());
    shifted
        .slice_mut(s![.., 1..])
        .assign(&source.slice(s![.., ..-1]));
    shifted
}

/// Copies a matrix one column left, zeroing the last column.
fn shift_left(source: &Array2<u32>) -> Array2<u32> {
    let mut shifted = Array2::zeros(source.dim());
    shifted
        .slice_mut(s![.., ..-1])
        .assign(&source.slice(s![.., 1..]));
    shifted
}
