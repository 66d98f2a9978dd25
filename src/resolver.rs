//! Lemma and tag resolution from predicted label probabilities.
//!
//! The tagger outputs, per word, a probability over the output labels.
//! [`LemmaResolver`] turns that into a [`WordForm`]: it picks the best
//! label, then picks the analyzer candidate whose grammemes agree most
//! with the predicted ones and takes its lemma, passed through a
//! [`LemmaOverrides`] table of language-specific corrections.

use std::cmp::Ordering;

use hashbrown::HashMap;
use ndarray::Array2;

use crate::analyzer::{MorphAnalyzer, Parse};
use crate::errors::{MorfemaError, Result};
use crate::grammemes::GrammemeVectorizer;
use crate::tag;

/// Resolved analysis of one word.
#[derive(Clone, Debug)]
pub struct WordForm {
    word: String,
    lemma: String,
    pos: String,
    tag: String,
    vector: Vec<f32>,
    score: f32,
    alternatives: Vec<WordForm>,
    weighted_vector: Option<Vec<f32>>,
}

impl WordForm {
    /// Returns the surface form.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Returns the resolved lemma.
    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    /// Returns the POS tag of the resolved label.
    pub fn pos(&self) -> &str {
        &self.pos
    }

    /// Returns the grammeme string of the resolved label.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the grammeme vector of the resolved label.
    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    /// Returns the probability of the resolved label.
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Returns one form per output label, ranked by descending score.
    ///
    /// Filled only by [`LemmaResolver::resolve_all()`].
    pub fn alternatives(&self) -> &[WordForm] {
        &self.alternatives
    }

    /// Returns the probability-weighted average grammeme vector.
    ///
    /// Filled only by [`LemmaResolver::resolve_all()`].
    pub fn weighted_vector(&self) -> Option<&[f32]> {
        self.weighted_vector.as_deref()
    }
}

/// A re-inflection rule of a [`LemmaOverrides`] table.
struct ReinflectionRule {
    pos: String,
    trigger: String,
    targets: Vec<String>,
}

/// Language-specific corrections applied to resolved lemmas.
///
/// The table is consulted in a fixed order: lemma rewrites keyed by the
/// winning candidate's POS and lemma, then surface rewrites keyed by
/// the lowercased input word, then re-inflection rules that replace the
/// lemma with an inflected form. The first hit wins; with no hit the
/// candidate's lemma stands.
#[derive(Default)]
pub struct LemmaOverrides {
    lemmas: HashMap<(String, String), String>,
    surfaces: HashMap<String, String>,
    reinflections: Vec<ReinflectionRule>,
}

impl LemmaOverrides {
    /// Creates an empty table, which leaves every lemma unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a lemma rewrite for candidates of the given POS.
    pub fn lemma<S, T, U>(mut self, pos: S, from: T, to: U) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        U: Into<String>,
    {
        self.lemmas.insert((pos.into(), from.into()), to.into());
        self
    }

    /// Adds a rewrite for a fixed surface form.
    pub fn surface<S, T>(mut self, surface: S, to: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        self.surfaces.insert(surface.into(), to.into());
        self
    }

    /// Adds a re-inflection rule.
    ///
    /// A candidate of the given POS whose normalized grammemes contain
    /// `trigger` has its lemma replaced by the surface form the
    /// analyzer produces for the target grammemes. If the analyzer
    /// cannot inflect, the lemma stays.
    pub fn reinflection<S, T>(mut self, pos: S, trigger: T, targets: &[&str]) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        self.reinflections.push(ReinflectionRule {
            pos: pos.into(),
            trigger: trigger.into(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    /// Returns the correction table of the GIKRYA annotation
    /// conventions.
    ///
    /// Third-person pronouns share the lemma `он`, a few function
    /// words keep their surface forms, and participles are lemmatized
    /// as the masculine singular nominative participle.
    pub fn gikrya() -> Self {
        Self::new()
            .lemma("PRON", "она", "он")
            .lemma("PRON", "они", "он")
            .lemma("PRON", "оно", "он")
            .surface("об", "об")
            .surface("тот", "то")
            .surface("со", "со")
            .reinflection(
                "VERB",
                "VerbForm=Part",
                &["Case=Nom", "Gender=Masc", "Number=Sing", "VerbForm=Part"],
            )
    }

    /// Applies the table to a winning candidate.
    fn apply(&self, word: &str, candidate: &Parse, analyzer: &dyn MorphAnalyzer) -> String {
        let key = (candidate.pos().to_string(), candidate.lemma().to_string());
        if let Some(lemma) = self.lemmas.get(&key) {
            return lemma.clone();
        }
        if let Some(lemma) = self.surfaces.get(word.to_lowercase().as_str()) {
            return lemma.clone();
        }
        for rule in &self.reinflections {
            if rule.pos != candidate.pos() {
                continue;
            }
            let grammemes = tag::normalize(candidate.grammemes());
            if !grammemes.split('|').any(|pair| pair == rule.trigger) {
                continue;
            }
            let targets: Vec<&str> = rule.targets.iter().map(String::as_str).collect();
            if let Some(form) = analyzer.inflect(candidate.lemma(), candidate.pos(), &targets) {
                return form;
            }
        }
        candidate.lemma().to_string()
    }
}

/// Resolver of predicted probabilities into word forms.
pub struct LemmaResolver<'a> {
    output: &'a GrammemeVectorizer,
    analyzer: &'a dyn MorphAnalyzer,
    overrides: LemmaOverrides,
}

impl<'a> LemmaResolver<'a> {
    /// Creates a resolver with the [`LemmaOverrides::gikrya()`] table.
    ///
    /// The vectorizer must be the output-side one, holding the labels
    /// the model predicts over.
    pub fn new(output: &'a GrammemeVectorizer, analyzer: &'a dyn MorphAnalyzer) -> Self {
        Self::with_overrides(output, analyzer, LemmaOverrides::gikrya())
    }

    /// Creates a resolver with a custom correction table.
    pub fn with_overrides(
        output: &'a GrammemeVectorizer,
        analyzer: &'a dyn MorphAnalyzer,
        overrides: LemmaOverrides,
    ) -> Self {
        Self {
            output,
            analyzer,
            overrides,
        }
    }

    /// Resolves one word from its label probabilities.
    ///
    /// `probabilities` holds one value per output label, the padding
    /// class already stripped.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if the probability count does not
    /// match the number of output labels.
    pub fn resolve(&self, word: &str, probabilities: &[f32]) -> Result<WordForm> {
        self.check_probabilities(probabilities)?;
        let candidates = self.analyzer.parses(word);
        let best = argmax(probabilities);
        self.compose(word, best, probabilities[best], &candidates)
    }

    /// Resolves one word and fills the per-label alternatives and the
    /// weighted grammeme vector.
    ///
    /// # Errors
    ///
    /// See [`resolve()`](Self::resolve).
    pub fn resolve_all(&self, word: &str, probabilities: &[f32]) -> Result<WordForm> {
        self.check_probabilities(probabilities)?;
        let candidates = self.analyzer.parses(word);
        let best = argmax(probabilities);
        let mut top = self.compose(word, best, probabilities[best], &candidates)?;

        let mut weighted = vec![0.0f32; self.output.grammemes_count()];
        let mut alternatives = Vec::with_capacity(probabilities.len());
        for (index, &probability) in probabilities.iter().enumerate() {
            let form = self.compose(word, index, probability, &candidates)?;
            for (acc, &v) in weighted.iter_mut().zip(form.vector.iter()) {
                *acc += v * probability;
            }
            alternatives.push(form);
        }
        alternatives.sort_by(|a, b| {
            b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
        });

        top.alternatives = alternatives;
        top.weighted_vector = Some(weighted);
        Ok(top)
    }

    /// Resolves a sentence from a padded probability matrix.
    ///
    /// The matrix is the raw model output: one row per padded position
    /// with the sentence in the last rows, one column per output label
    /// plus the padding class in column 0.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if the matrix has fewer rows than
    /// words or the wrong number of columns.
    pub fn resolve_sentence<S>(
        &self,
        words: &[S],
        probabilities: &Array2<f32>,
    ) -> Result<Vec<WordForm>>
    where
        S: AsRef<str>,
    {
        self.sentence_rows(words, probabilities)?
            .map(|(word, row)| self.resolve(word, &row))
            .collect()
    }

    /// Like [`resolve_sentence()`](Self::resolve_sentence) with the
    /// alternatives filled per word.
    ///
    /// # Errors
    ///
    /// See [`resolve_sentence()`](Self::resolve_sentence).
    pub fn resolve_sentence_all<S>(
        &self,
        words: &[S],
        probabilities: &Array2<f32>,
    ) -> Result<Vec<WordForm>>
    where
        S: AsRef<str>,
    {
        self.sentence_rows(words, probabilities)?
            .map(|(word, row)| self.resolve_all(word, &row))
            .collect()
    }

    /// Pairs each word with its stripped probability row.
    fn sentence_rows<'w, S>(
        &self,
        words: &'w [S],
        probabilities: &'w Array2<f32>,
    ) -> Result<impl Iterator<Item = (&'w str, Vec<f32>)>>
    where
        S: AsRef<str>,
    {
        if probabilities.nrows() < words.len() {
            return Err(MorfemaError::invalid_argument(
                "probabilities",
                format!(
                    "matrix has {} rows for {} words",
                    probabilities.nrows(),
                    words.len()
                ),
            ));
        }
        if probabilities.ncols() != self.output.labels_count() + 1 {
            return Err(MorfemaError::invalid_argument(
                "probabilities",
                format!(
                    "matrix has {} columns for {} labels and the padding class",
                    probabilities.ncols(),
                    self.output.labels_count()
                ),
            ));
        }
        let offset = probabilities.nrows() - words.len();
        let rows: Vec<Vec<f32>> = (0..words.len())
            .map(|i| {
                probabilities
                    .row(offset + i)
                    .iter()
                    .skip(1)
                    .copied()
                    .collect()
            })
            .collect();
        Ok(words
            .iter()
            .map(|word| word.as_ref())
            .zip(rows))
    }

    fn check_probabilities(&self, probabilities: &[f32]) -> Result<()> {
        if probabilities.is_empty() || probabilities.len() != self.output.labels_count() {
            return Err(MorfemaError::invalid_argument(
                "probabilities",
                format!(
                    "expected {} probabilities, got {}",
                    self.output.labels_count(),
                    probabilities.len()
                ),
            ));
        }
        Ok(())
    }

    /// Builds the form of one word under one label.
    fn compose(
        &self,
        word: &str,
        index: usize,
        score: f32,
        candidates: &[Parse],
    ) -> Result<WordForm> {
        let label = self.output.label(index);
        let (pos, grammemes) = tag::split_label(label).ok_or_else(|| {
            MorfemaError::invalid_state(format!("label without separator: {label}"))
        })?;
        let lemma = self.choose_lemma(word, pos, grammemes, candidates);
        Ok(WordForm {
            word: word.to_string(),
            lemma,
            pos: pos.to_string(),
            tag: grammemes.to_string(),
            vector: self.output.vector(label)?.to_vec(),
            score,
            alternatives: vec![],
            weighted_vector: None,
        })
    }

    /// Picks the lemma for a predicted POS and grammeme string.
    ///
    /// The winning candidate must match the POS and strictly beat the
    /// running best grammeme overlap, so a candidate sharing nothing
    /// never wins on POS alone and the earliest candidate keeps ties.
    /// With no winner the analyzer's top candidate stands in; with no
    /// candidates at all the lowercased word itself is the lemma.
    /// Words with `_` are corpus multiword artifacts and resolve to
    /// themselves.
    fn choose_lemma(&self, word: &str, pos: &str, grammemes: &str, candidates: &[Parse]) -> String {
        if word.contains('_') {
            return word.to_string();
        }
        let mut best: Option<&Parse> = None;
        let mut max_common = 0;
        for candidate in candidates {
            let candidate_grammemes = tag::normalize(candidate.grammemes());
            let common = tag::overlap(&candidate_grammemes, grammemes);
            if common > max_common && candidate.pos() == pos {
                max_common = common;
                best = Some(candidate);
            }
        }
        match best.or_else(|| candidates.first()) {
            Some(candidate) => self.overrides.apply(word, candidate, self.analyzer),
            None => word.to_lowercase(),
        }
    }
}

/// Returns the position of the first maximum.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate() {
        if value > values[best] {
            best = i;
        }
    }
    best
}
