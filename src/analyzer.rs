//! Morphological analyzers supplying candidate analyses.
//!
//! The tagger never commits to one analysis up front. An analyzer
//! returns every dictionary reading of a surface form; the encoder
//! blends them into a grammeme distribution and the lemma resolver
//! picks the reading closest to the predicted label.

pub mod lexicon;

pub use lexicon::LexiconAnalyzer;

/// One candidate analysis of a surface form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parse {
    lemma: String,
    pos: String,
    grammemes: String,
}

impl Parse {
    /// Creates a candidate analysis.
    ///
    /// The grammeme string is kept as given; consumers normalize it
    /// where label arithmetic requires.
    pub fn new<L, P, G>(lemma: L, pos: P, grammemes: G) -> Self
    where
        L: Into<String>,
        P: Into<String>,
        G: Into<String>,
    {
        Self {
            lemma: lemma.into(),
            pos: pos.into(),
            grammemes: grammemes.into(),
        }
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

/// Source of candidate analyses.
pub trait MorphAnalyzer {
    /// Returns the candidate analyses of a word in the analyzer's
    /// ranking order, the most plausible first. An unknown word yields
    /// an empty vector.
    fn parses(&self, word: &str) -> Vec<Parse>;

    /// Returns a surface form of `lemma` carrying every target
    /// `Category=Value` pair, or [`None`] if the analyzer cannot
    /// inflect.
    ///
    /// The default implementation always returns [`None`]; analyzers
    /// without paradigm data need not override it.
    fn inflect(&self, lemma: &str, pos: &str, targets: &[&str]) -> Option<String> {
        let _ = (lemma, pos, targets);
        None
    }
}
