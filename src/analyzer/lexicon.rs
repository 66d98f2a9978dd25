//! Dictionary-backed analyzer.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use hashbrown::HashMap;

use crate::analyzer::{MorphAnalyzer, Parse};
use crate::errors::{MorfemaError, Result};

/// Analysis entry keyed by lemma, used for inflection lookups.
struct LemmaForm {
    surface: String,
    pos: String,
    grammemes: String,
}

/// Morphological analyzer over a TSV full-form lexicon.
///
/// Each line holds `surface<TAB>lemma<TAB>POS<TAB>grammemes`. Lines
/// starting with `#` and blank lines are skipped. Lookups are
/// case-insensitive; candidates keep the file order, so the lexicon
/// should list the more plausible readings of an ambiguous form first.
pub struct LexiconAnalyzer {
    /// Lowercased surface form to its candidate analyses.
    forms: HashMap<String, Vec<Parse>>,

    /// Lowercased lemma to the surface forms of its paradigm.
    lemmas: HashMap<String, Vec<LemmaForm>>,
}

impl LexiconAnalyzer {
    /// Creates an analyzer from a lexicon in the TSV format.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`] is returned if a line does not hold exactly
    /// four fields.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let buf = BufReader::new(rdr);
        let mut forms: HashMap<String, Vec<Parse>> = HashMap::new();
        let mut lemmas: HashMap<String, Vec<LemmaForm>> = HashMap::new();
        for line in buf.lines() {
            let line = line?;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut spl = line.split('\t');
            let surface = spl.next();
            let lemma = spl.next();
            let pos = spl.next();
            let grammemes = spl.next();
            let rest = spl.next();
            match (surface, lemma, pos, grammemes, rest) {
                (Some(surface), Some(lemma), Some(pos), Some(grammemes), None) => {
                    forms
                        .entry(surface.to_lowercase())
                        .or_default()
                        .push(Parse::new(lemma, pos, grammemes));
                    lemmas.entry(lemma.to_lowercase()).or_default().push(LemmaForm {
                        surface: surface.to_string(),
                        pos: pos.to_string(),
                        grammemes: grammemes.to_string(),
                    });
                }
                _ => {
                    return Err(MorfemaError::invalid_format(
                        "rdr",
                        "Each line must be surface<TAB>lemma<TAB>POS<TAB>grammemes",
                    ))
                }
            }
        }
        Ok(Self { forms, lemmas })
    }

    /// Creates an analyzer from a lexicon file.
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

    /// Returns the number of distinct surface forms.
    pub fn num_surfaces(&self) -> usize {
        self.forms.len()
    }
}

impl MorphAnalyzer for LexiconAnalyzer {
    fn parses(&self, word: &str) -> Vec<Parse> {
        self.forms
            .get(word.to_lowercase().as_str())
            .cloned()
            .unwrap_or_default()
    }

    fn inflect(&self, lemma: &str, pos: &str, targets: &[&str]) -> Option<String> {
        let paradigm = self.lemmas.get(lemma.to_lowercase().as_str())?;
        paradigm
            .iter()
            .find(|form| {
                form.pos == pos
                    && targets
                        .iter()
                        .all(|target| form.grammemes.split('|').any(|pair| pair == *target))
            })
            .map(|form| form.surface.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEXICON: &str = "\
стали\tсталь\tNOUN\tCase=Gen|Gender=Fem|Number=Sing
стали\tстать\tVERB\tMood=Ind|Number=Plur|Tense=Past|VerbForm=Fin
# comment line
сталь\tсталь\tNOUN\tCase=Nom|Gender=Fem|Number=Sing

стать\tстать\tVERB\tVerbForm=Inf
";

    #[test]
    fn test_candidates_in_file_order() {
        let analyzer = LexiconAnalyzer::from_reader(LEXICON.as_bytes()).unwrap();
        let parses = analyzer.parses("стали");
        assert_eq!(2, parses.len());
        assert_eq!("сталь", parses[0].lemma());
        assert_eq!("NOUN", parses[0].pos());
        assert_eq!("стать", parses[1].lemma());
        assert_eq!("VERB", parses[1].pos());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let analyzer = LexiconAnalyzer::from_reader(LEXICON.as_bytes()).unwrap();
        assert_eq!(analyzer.parses("стали"), analyzer.parses("Стали"));
        assert_eq!(analyzer.parses("стали"), analyzer.parses("СТАЛИ"));
    }

    #[test]
    fn test_unknown_word() {
        let analyzer = LexiconAnalyzer::from_reader(LEXICON.as_bytes()).unwrap();
        assert!(analyzer.parses("кот").is_empty());
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let analyzer = LexiconAnalyzer::from_reader(LEXICON.as_bytes()).unwrap();
        assert_eq!(3, analyzer.num_surfaces());
    }

    #[test]
    fn test_malformed_line() {
        let result = LexiconAnalyzer::from_reader("стали\tсталь\tNOUN".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_inflect() {
        let analyzer = LexiconAnalyzer::from_reader(LEXICON.as_bytes()).unwrap();
        assert_eq!(
            Some("стать".to_string()),
            analyzer.inflect("стать", "VERB", &["VerbForm=Inf"])
        );
        assert_eq!(
            Some("стали".to_string()),
            analyzer.inflect("стать", "VERB", &["Tense=Past", "Number=Plur"])
        );
        assert_eq!(None, analyzer.inflect("стать", "VERB", &["Tense=Fut"]));
        assert_eq!(None, analyzer.inflect("кот", "NOUN", &["Case=Nom"]));
    }
}
