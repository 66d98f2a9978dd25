//! Shared fixtures for the test modules.
//!
//! A miniature tagged corpus, a lexicon covering its tokens and
//! helpers that assemble the resources, configurations and temporary
//! corpus files the tests run against.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::analyzer::LexiconAnalyzer;
use crate::config::{ModelConfig, TrainConfig};
use crate::encoder::SampleEncoder;
use crate::resources::TaggerResources;

/// Three tagged sentences of lengths 3, 5 and 2.
pub(crate) const TEST_CORPUS: &str = "\
Мама\tмама\tNOUN\tAnimacy=Anim|Case=Nom|Gender=Fem|Number=Sing
мыла\tмыть\tVERB\tAspect=Imp|Gender=Fem|Mood=Ind|Number=Sing|Tense=Past
раму\tрама\tNOUN\tAnimacy=Inan|Case=Acc|Gender=Fem|Number=Sing

Кот\tкот\tNOUN\tAnimacy=Anim|Case=Nom|Gender=Masc|Number=Sing
спит\tспать\tVERB\tAspect=Imp|Mood=Ind|Number=Sing|Person=3|Tense=Pres
и\tи\tCCONJ\t_
видит\tвидеть\tVERB\tAspect=Imp|Mood=Ind|Number=Sing|Person=3|Tense=Pres
сон\tсон\tNOUN\tAnimacy=Inan|Case=Acc|Gender=Masc|Number=Sing

Она\tона\tPRON\tCase=Nom|Gender=Fem|Number=Sing
спит\tспать\tVERB\tAspect=Imp|Mood=Ind|Number=Sing|Person=3|Tense=Pres
";

/// A lexicon covering every corpus token, with one ambiguous form.
pub(crate) const TEST_LEXICON: &str = "\
мама\tмама\tNOUN\tAnimacy=Anim|Case=Nom|Gender=Fem|Number=Sing
мыла\tмыть\tVERB\tAspect=Imp|Gender=Fem|Mood=Ind|Number=Sing|Tense=Past
мыла\tмыло\tNOUN\tAnimacy=Inan|Case=Gen|Gender=Neut|Number=Sing
раму\tрама\tNOUN\tAnimacy=Inan|Case=Acc|Gender=Fem|Number=Sing
кот\tкот\tNOUN\tAnimacy=Anim|Case=Nom|Gender=Masc|Number=Sing
спит\tспать\tVERB\tAspect=Imp|Mood=Ind|Number=Sing|Person=3|Tense=Pres
и\tи\tCCONJ\t_
видит\tвидеть\tVERB\tAspect=Imp|Mood=Ind|Number=Sing|Person=3|Tense=Pres
сон\tсон\tNOUN\tAnimacy=Inan|Case=Acc|Gender=Masc|Number=Sing
она\tона\tPRON\tCase=Nom|Gender=Fem|Number=Sing
";

/// Resources and configurations assembled from the fixture corpus.
pub(crate) struct TestSetup {
    pub resources: TaggerResources,
    pub analyzer: LexiconAnalyzer,
    pub model: ModelConfig,
}

impl TestSetup {
    /// Returns an encoder over the fixture resources.
    pub fn encoder(&self) -> SampleEncoder<'_> {
        SampleEncoder::new(
            self.resources.grammemes_input(),
            self.resources.vocabulary(),
            self.resources.alphabet(),
            &self.analyzer,
            &self.model,
        )
    }
}

pub(crate) fn test_analyzer() -> LexiconAnalyzer {
    LexiconAnalyzer::from_reader(TEST_LEXICON.as_bytes()).unwrap()
}

pub(crate) fn test_setup() -> TestSetup {
    let analyzer = test_analyzer();
    let resources =
        TaggerResources::from_readers(vec![TEST_CORPUS.as_bytes()], &analyzer).unwrap();
    TestSetup {
        resources,
        analyzer,
        model: ModelConfig::default(),
    }
}

/// Writes the content to a temporary corpus file.
pub(crate) fn corpus_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A training configuration with the given batching parameters.
pub(crate) fn train_config(batch_size: usize, groups: Vec<(usize, usize)>) -> TrainConfig {
    TrainConfig {
        batch_size,
        sentence_len_groups: groups,
        ..TrainConfig::default()
    }
}
