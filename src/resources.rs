//! Building, saving and loading of the persisted tagger resources.
//!
//! Four artifacts are derived from a corpus scan and shared by training
//! and inference: the input-side grammeme vectorizer built from
//! analyzer candidates, the output-side vectorizer holding the label
//! set, the word vocabulary and the character alphabet. They are
//! persisted next to each other so a later run can skip the scan.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

use crate::alphabet::CharAlphabet;
use crate::analyzer::MorphAnalyzer;
use crate::config::ResourcePaths;
use crate::corpus::SentenceReader;
use crate::errors::Result;
use crate::grammemes::GrammemeVectorizer;
use crate::vocabulary::WordVocabulary;

/// The four persisted resources of a tagger.
pub struct TaggerResources {
    grammemes_input: GrammemeVectorizer,
    grammemes_output: GrammemeVectorizer,
    vocabulary: WordVocabulary,
    alphabet: CharAlphabet,
}

impl TaggerResources {
    /// Builds the resources from corpus readers in one scan.
    ///
    /// Every token feeds the vocabulary and the alphabet. The output
    /// vectorizer registers the token's corpus label; the input
    /// vectorizer registers the label of every candidate the analyzer
    /// returns for the token.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`](crate::errors::MorfemaError) is returned if a
    /// corpus line or a grammeme string is malformed, or when reading
    /// fails.
    pub fn from_readers<R>(readers: Vec<R>, analyzer: &dyn MorphAnalyzer) -> Result<Self>
    where
        R: Read,
    {
        let mut resources = Self {
            grammemes_input: GrammemeVectorizer::new(),
            grammemes_output: GrammemeVectorizer::new(),
            vocabulary: WordVocabulary::new(),
            alphabet: CharAlphabet::new(),
        };
        for reader in readers {
            resources.scan(reader, analyzer)?;
        }
        resources.grammemes_input.finalize();
        resources.grammemes_output.finalize();
        resources.vocabulary.finalize();
        resources.alphabet.finalize();
        Ok(resources)
    }

    /// Builds the resources from corpus files in one scan.
    ///
    /// # Errors
    ///
    /// See [`from_readers()`](Self::from_readers).
    pub fn build<P>(paths: &[P], analyzer: &dyn MorphAnalyzer) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let mut readers = Vec::with_capacity(paths.len());
        for path in paths {
            readers.push(File::open(path.as_ref())?);
        }
        Self::from_readers(readers, analyzer)
    }

    fn scan<R>(&mut self, reader: R, analyzer: &dyn MorphAnalyzer) -> Result<()>
    where
        R: Read,
    {
        for sentence in SentenceReader::new(reader) {
            for record in &sentence? {
                self.vocabulary.add_word(record.text());
                self.alphabet.add_chars(record.text());
                self.grammemes_output
                    .add_grammemes(record.pos(), record.grammemes())?;
                for parse in analyzer.parses(record.text()) {
                    self.grammemes_input
                        .add_grammemes(parse.pos(), parse.grammemes())?;
                }
            }
        }
        Ok(())
    }

    /// Returns the vectorizer built from analyzer candidates.
    pub fn grammemes_input(&self) -> &GrammemeVectorizer {
        &self.grammemes_input
    }

    /// Returns the vectorizer holding the output labels.
    pub fn grammemes_output(&self) -> &GrammemeVectorizer {
        &self.grammemes_output
    }

    /// Returns the word vocabulary.
    pub fn vocabulary(&self) -> &WordVocabulary {
        &self.vocabulary
    }

    /// Returns the character alphabet.
    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    /// Writes the four artifacts, creating their directories as needed.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`](crate::errors::MorfemaError) is returned when
    /// writing fails.
    pub fn save(&self, paths: &ResourcePaths) -> Result<()> {
        for path in [
            &paths.grammemes_input,
            &paths.grammemes_output,
            &paths.vocabulary,
            &paths.alphabet,
        ] {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
        }
        self.grammemes_input
            .write(BufWriter::new(File::create(&paths.grammemes_input)?))?;
        self.grammemes_output
            .write(BufWriter::new(File::create(&paths.grammemes_output)?))?;
        self.vocabulary
            .write(BufWriter::new(File::create(&paths.vocabulary)?))?;
        self.alphabet
            .write(BufWriter::new(File::create(&paths.alphabet)?))?;
        Ok(())
    }

    /// Reads the four artifacts back.
    ///
    /// # Errors
    ///
    /// [`MorfemaError`](crate::errors::MorfemaError) is returned if an
    /// artifact is missing or does not parse.
    pub fn load(paths: &ResourcePaths) -> Result<Self> {
        Ok(Self {
            grammemes_input: GrammemeVectorizer::from_reader(BufReader::new(File::open(
                &paths.grammemes_input,
            )?))?,
            grammemes_output: GrammemeVectorizer::from_reader(BufReader::new(File::open(
                &paths.grammemes_output,
            )?))?,
            vocabulary: WordVocabulary::from_reader(BufReader::new(File::open(
                &paths.vocabulary,
            )?))?,
            alphabet: CharAlphabet::from_reader(BufReader::new(File::open(&paths.alphabet)?))?,
        })
    }

    /// Loads the artifacts, or rebuilds them from the corpus when any
    /// is missing or empty.
    ///
    /// The four artifacts must stay consistent with each other, so a
    /// single missing or empty one rebuilds and re-saves them all. An
    /// artifact that exists but does not parse is an error, not a
    /// rebuild trigger.
    ///
    /// # Errors
    ///
    /// See [`load()`](Self::load) and [`build()`](Self::build).
    pub fn load_or_build<P>(
        paths: &ResourcePaths,
        corpus: &[P],
        analyzer: &dyn MorphAnalyzer,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let all_present = [
            &paths.grammemes_input,
            &paths.grammemes_output,
            &paths.vocabulary,
            &paths.alphabet,
        ]
        .iter()
        .all(|path| path.exists());

        if all_present {
            let resources = Self::load(paths)?;
            if !resources.any_empty() {
                log::info!("loaded tagger resources");
                return Ok(resources);
            }
            log::info!("stored tagger resources are empty; rebuilding");
        } else {
            log::info!("tagger resources not found; building from the corpus");
        }

        let resources = Self::build(corpus, analyzer)?;
        resources.save(paths)?;
        Ok(resources)
    }

    fn any_empty(&self) -> bool {
        self.grammemes_input.is_empty()
            || self.grammemes_output.is_empty()
            || self.vocabulary.is_empty()
            || self.alphabet.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::test_utils::{corpus_file, test_analyzer, TEST_CORPUS};

    #[test]
    fn test_build_collects_all_resources() {
        let analyzer = test_analyzer();
        let resources =
            TaggerResources::from_readers(vec![TEST_CORPUS.as_bytes()], &analyzer).unwrap();

        assert_eq!(9, resources.vocabulary().word_count());
        assert_eq!(0, resources.vocabulary().index("спит").unwrap());

        let output = resources.grammemes_output();
        assert_eq!(8, output.labels_count());
        assert!(output.index("NOUN#Case=Nom|Gender=Fem|Number=Sing").is_ok());
        assert!(output.index("CCONJ#_").is_ok());

        let input = resources.grammemes_input();
        assert_eq!(9, input.labels_count());
        assert!(input.index("NOUN#Case=Gen|Gender=Neut|Number=Sing").is_ok());

        let alphabet = resources.alphabet();
        assert_eq!(0, alphabet.index(' '));
        assert!(alphabet.index('м') < alphabet.len());
    }

    #[test]
    fn test_multiple_readers_merge() {
        let analyzer = test_analyzer();
        let extra = "Сон\tсон\tNOUN\tAnimacy=Inan|Case=Nom|Gender=Masc|Number=Sing\n";
        let resources =
            TaggerResources::from_readers(vec![TEST_CORPUS.as_bytes(), extra.as_bytes()], &analyzer)
                .unwrap();

        // "сон" stays a single vocabulary entry and one more output
        // label appears.
        assert_eq!(9, resources.vocabulary().word_count());
        assert_eq!(9, resources.grammemes_output().labels_count());
    }

    #[test]
    fn test_save_load_round_trip() {
        let analyzer = test_analyzer();
        let built =
            TaggerResources::from_readers(vec![TEST_CORPUS.as_bytes()], &analyzer).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let paths = ResourcePaths::under(dir.path());
        built.save(&paths).unwrap();
        let loaded = TaggerResources::load(&paths).unwrap();

        assert_eq!(
            built.grammemes_output().labels_count(),
            loaded.grammemes_output().labels_count()
        );
        assert_eq!(
            built.grammemes_input().grammemes_count(),
            loaded.grammemes_input().grammemes_count()
        );
        assert_eq!(
            built.vocabulary().index("спит").unwrap(),
            loaded.vocabulary().index("спит").unwrap()
        );
        assert_eq!(built.alphabet().len(), loaded.alphabet().len());
        assert_eq!(built.alphabet().index('м'), loaded.alphabet().index('м'));
    }

    #[test]
    fn test_load_or_build_builds_when_missing() {
        let analyzer = test_analyzer();
        let corpus = corpus_file(TEST_CORPUS);
        let dir = tempfile::tempdir().unwrap();
        let paths = ResourcePaths::under(dir.path().join("model"));

        let resources =
            TaggerResources::load_or_build(&paths, &[corpus.path()], &analyzer).unwrap();
        assert_eq!(8, resources.grammemes_output().labels_count());
        assert!(paths.grammemes_input.exists());
        assert!(paths.grammemes_output.exists());
        assert!(paths.vocabulary.exists());
        assert!(paths.alphabet.exists());

        let reloaded =
            TaggerResources::load_or_build(&paths, &[corpus.path()], &analyzer).unwrap();
        assert_eq!(8, reloaded.grammemes_output().labels_count());
    }

    #[test]
    fn test_load_or_build_rebuilds_missing_artifact() {
        let analyzer = test_analyzer();
        let corpus = corpus_file(TEST_CORPUS);
        let dir = tempfile::tempdir().unwrap();
        let paths = ResourcePaths::under(dir.path());

        TaggerResources::load_or_build(&paths, &[corpus.path()], &analyzer).unwrap();
        fs::remove_file(&paths.vocabulary).unwrap();

        let resources =
            TaggerResources::load_or_build(&paths, &[corpus.path()], &analyzer).unwrap();
        assert!(paths.vocabulary.exists());
        assert_eq!(9, resources.vocabulary().word_count());
    }

    #[test]
    fn test_corrupt_artifact_is_fatal() {
        let analyzer = test_analyzer();
        let corpus = corpus_file(TEST_CORPUS);
        let dir = tempfile::tempdir().unwrap();
        let paths = ResourcePaths::under(dir.path());

        TaggerResources::load_or_build(&paths, &[corpus.path()], &analyzer).unwrap();
        let mut file = File::create(&paths.grammemes_input).unwrap();
        file.write_all(b"not json").unwrap();

        assert!(TaggerResources::load_or_build(&paths, &[corpus.path()], &analyzer).is_err());
    }

    #[test]
    fn test_empty_artifacts_are_rebuilt() {
        let analyzer = test_analyzer();
        let corpus = corpus_file(TEST_CORPUS);
        let dir = tempfile::tempdir().unwrap();
        let paths = ResourcePaths::under(dir.path());

        let empty = "{\"grammemes\":{},\"labels\":[]}";
        fs::write(&paths.grammemes_input, empty).unwrap();
        fs::write(&paths.grammemes_output, empty).unwrap();
        fs::write(&paths.vocabulary, "").unwrap();
        fs::write(&paths.alphabet, "").unwrap();

        let resources =
            TaggerResources::load_or_build(&paths, &[corpus.path()], &analyzer).unwrap();
        assert_eq!(8, resources.grammemes_output().labels_count());
        assert_eq!(9, resources.vocabulary().word_count());
    }
}
