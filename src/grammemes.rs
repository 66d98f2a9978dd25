//! Vectorizer mapping grammatical values and labels to vector positions.
//!
//! [`GrammemeVectorizer`] is built in two phases. During a corpus scan,
//! [`add_grammemes()`](GrammemeVectorizer::add_grammemes) accumulates
//! every observed label together with its categories and values. A final
//! [`finalize()`](GrammemeVectorizer::finalize) fixes the layout: label
//! indices follow the sorted label names, and each label's vector is the
//! concatenation, over categories in sorted name order, of a one-hot
//! encoding over that category's sorted values. The POS tag participates
//! as a synthetic `POS` category. Every ordering is sorted, so rebuilding
//! from the same corpus reproduces the same indices.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::ops::Range;

use hashbrown::{HashMap, HashSet};

use crate::errors::{MorfemaError, Result};
use crate::tag;

/// Mapping between labels and their grammeme vectors.
#[derive(Default)]
pub struct GrammemeVectorizer {
    /// Accumulated values per category.
    values: HashMap<String, HashSet<String>>,

    /// Accumulated label names.
    seen: HashSet<String>,

    /// Categories with their values, both in sorted order.
    categories: Vec<(String, Vec<String>)>,

    /// Vector span of each category, aligned with `categories`.
    spans: Vec<Range<usize>>,

    /// Label names in index order.
    labels: Vec<String>,

    label_index: HashMap<String, usize>,

    /// Grammeme vector of each label, aligned with `labels`.
    vectors: Vec<Vec<f32>>,
}

impl GrammemeVectorizer {
    /// Creates an empty vectorizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a label and its grammemes.
    ///
    /// The grammeme string is normalized first, so raw corpus or
    /// analyzer tags can be passed directly.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if a grammeme pair lacks the
    /// `Category=Value` form.
    pub fn add_grammemes(&mut self, pos: &str, grammemes: &str) -> Result<()> {
        let label = tag::label(pos, grammemes);
        if self.seen.contains(&label) {
            return Ok(());
        }
        let (pos, norm) = tag::split_label(&label).ok_or_else(|| {
            MorfemaError::invalid_format("grammemes", format!("invalid label: {label}"))
        })?;
        self.values
            .entry("POS".to_string())
            .or_default()
            .insert(pos.to_string());
        if norm != "_" {
            for pair in norm.split('|') {
                let (category, value) = pair.split_once('=').ok_or_else(|| {
                    MorfemaError::invalid_format(
                        "grammemes",
                        format!("A grammeme must be Category=Value: {pair}"),
                    )
                })?;
                self.values
                    .entry(category.to_string())
                    .or_default()
                    .insert(value.to_string());
            }
        }
        self.seen.insert(label);
        Ok(())
    }

    /// Fixes the vector layout and label indices.
    ///
    /// Recomputes every ordering from the accumulated state, so calling
    /// it again without intervening additions is a no-op.
    pub fn finalize(&mut self) {
        let mut categories: Vec<(String, Vec<String>)> = self
            .values
            .iter()
            .map(|(category, values)| {
                let mut values: Vec<String> = values.iter().cloned().collect();
                values.sort_unstable();
                (category.clone(), values)
            })
            .collect();
        categories.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

        let mut spans = Vec::with_capacity(categories.len());
        let mut offset = 0;
        for (_, values) in &categories {
            spans.push(offset..offset + values.len());
            offset += values.len();
        }

        let mut labels: Vec<String> = self.seen.iter().cloned().collect();
        labels.sort_unstable();

        self.categories = categories;
        self.spans = spans;
        self.label_index = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        self.vectors = labels.iter().map(|label| self.build_vector(label)).collect();
        self.labels = labels;
    }

    fn build_vector(&self, label: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.grammemes_count()];
        // Labels pass through add_grammemes() or from_reader() first, so
        // every pair resolves to a known category and value here.
        let Some((pos, grammemes)) = tag::split_label(label) else {
            return vector;
        };
        let mut pairs = vec![("POS", pos)];
        if grammemes != "_" {
            pairs.extend(grammemes.split('|').filter_map(|p| p.split_once('=')));
        }
        for (category, value) in pairs {
            let Ok(ci) = self
                .categories
                .binary_search_by(|(name, _)| name.as_str().cmp(category))
            else {
                continue;
            };
            if let Ok(vi) = self.categories[ci].1.binary_search_by(|v| v.as_str().cmp(value)) {
                vector[self.spans[ci].start + vi] = 1.0;
            }
        }
        vector
    }

    /// Returns the grammeme vector of a label.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if the label was never registered.
    /// Use [`get()`](Self::get) where unknown labels are expected.
    pub fn vector(&self, label: &str) -> Result<&[f32]> {
        self.get(label).ok_or_else(|| {
            MorfemaError::invalid_argument("label", format!("unknown label: {label}"))
        })
    }

    /// Returns the grammeme vector of a label, or [`None`] if unknown.
    pub fn get(&self, label: &str) -> Option<&[f32]> {
        self.label_index
            .get(label)
            .map(|&i| self.vectors[i].as_slice())
    }

    /// Returns the index of a label.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if the label was never registered.
    pub fn index(&self, label: &str) -> Result<usize> {
        self.label_index.get(label).copied().ok_or_else(|| {
            MorfemaError::invalid_argument("label", format!("unknown label: {label}"))
        })
    }

    /// Returns the label at an index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of range.
    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    /// Returns the width of the grammeme vectors.
    pub fn grammemes_count(&self) -> usize {
        self.spans.last().map(|span| span.end).unwrap_or(0)
    }

    /// Returns the number of registered labels.
    pub fn labels_count(&self) -> usize {
        self.labels.len()
    }

    /// Checks if no label has been registered.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.seen.is_empty()
    }

    /// Returns the vector span of each category, ordered by category
    /// name.
    pub fn category_spans(&self) -> &[Range<usize>] {
        &self.spans
    }

    /// Exports the vectorizer in the JSON layout of
    /// [`from_reader()`](Self::from_reader).
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if writing fails.
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        let data = VectorizerData {
            grammemes: self
                .categories
                .iter()
                .map(|(category, values)| (category.clone(), values.clone()))
                .collect(),
            labels: self.labels.clone(),
        };
        serde_json::to_writer(wtr, &data)?;
        Ok(())
    }

    /// Loads a vectorizer from a JSON export.
    ///
    /// Label indices follow the stored order, which
    /// [`write()`](Self::write) emits in index order, so a reload
    /// reproduces the indices of the exported vectorizer.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if the document is not valid JSON or
    /// if a stored label refers to a category or value missing from the
    /// grammeme table.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let data: VectorizerData = serde_json::from_reader(rdr)?;

        let mut vectorizer = Self::new();
        for (category, values) in &data.grammemes {
            vectorizer
                .values
                .entry(category.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
        vectorizer.categories = data
            .grammemes
            .into_iter()
            .map(|(category, mut values)| {
                values.sort_unstable();
                (category, values)
            })
            .collect();
        let mut offset = 0;
        for (_, values) in &vectorizer.categories {
            vectorizer.spans.push(offset..offset + values.len());
            offset += values.len();
        }

        for label in &data.labels {
            let (pos, grammemes) = tag::split_label(label).ok_or_else(|| {
                MorfemaError::invalid_format("rdr", format!("invalid label: {label}"))
            })?;
            let mut pairs = vec![("POS", pos)];
            if grammemes != "_" {
                for pair in grammemes.split('|') {
                    pairs.push(pair.split_once('=').ok_or_else(|| {
                        MorfemaError::invalid_format(
                            "rdr",
                            format!("A grammeme must be Category=Value: {pair}"),
                        )
                    })?);
                }
            }
            for (category, value) in pairs {
                let known = vectorizer
                    .categories
                    .binary_search_by(|(name, _)| name.as_str().cmp(category))
                    .ok()
                    .map_or(false, |ci| {
                        vectorizer.categories[ci]
                            .1
                            .binary_search_by(|v| v.as_str().cmp(value))
                            .is_ok()
                    });
                if !known {
                    return Err(MorfemaError::invalid_format(
                        "rdr",
                        format!("label {label} refers to unknown grammeme {category}={value}"),
                    ));
                }
            }
            vectorizer.seen.insert(label.clone());
        }
        vectorizer.label_index = data
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();
        vectorizer.vectors = data
            .labels
            .iter()
            .map(|label| vectorizer.build_vector(label))
            .collect();
        vectorizer.labels = data.labels;
        Ok(vectorizer)
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct VectorizerData {
    grammemes: BTreeMap<String, Vec<String>>,
    labels: Vec<String>,
}
