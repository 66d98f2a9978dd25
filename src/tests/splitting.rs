//! Sentence counting, the split and the index-filtered streams.

use crate::batcher::BatchGenerator;
use crate::corpus::{count_sentences, train_val_split};
use crate::test_utils::{corpus_file, test_setup, train_config, TEST_CORPUS};

#[test]
fn test_split_streams_partition_the_corpus() {
    let content = format!("{TEST_CORPUS}\n{TEST_CORPUS}");
    let file = corpus_file(&content);
    let total = count_sentences(&[file.path()]).unwrap();
    assert_eq!(6, total);

    let (train_indices, val_indices) = train_val_split(total, 0.5, 42).unwrap();
    assert_eq!(3, train_indices.len());
    assert_eq!(3, val_indices.len());

    let setup = test_setup();
    let train = train_config(10, vec![(1, 11)]);
    let train_stream = BatchGenerator::new(
        &[file.path()],
        setup.encoder(),
        setup.resources.grammemes_output(),
        &setup.model,
        &train,
        train_indices.iter().copied(),
    );
    let val_stream = BatchGenerator::new(
        &[file.path()],
        setup.encoder(),
        setup.resources.grammemes_output(),
        &setup.model,
        &train,
        val_indices.iter().copied(),
    );

    let train_total: usize = train_stream.map(|batch| batch.unwrap().num_sentences()).sum();
    let val_total: usize = val_stream.map(|batch| batch.unwrap().num_sentences()).sum();
    assert_eq!(3, train_total);
    assert_eq!(3, val_total);
}

#[test]
fn test_count_matches_stream_positions() {
    let first = corpus_file(TEST_CORPUS);
    let second = corpus_file(TEST_CORPUS);
    let paths = [first.path(), second.path()];
    let total = count_sentences(&paths).unwrap();
    assert_eq!(6, total);

    let setup = test_setup();
    let train = train_config(10, vec![(1, 11)]);
    let generator = BatchGenerator::new(
        &paths,
        setup.encoder(),
        setup.resources.grammemes_output(),
        &setup.model,
        &train,
        0..total,
    );

    let streamed: usize = generator.map(|batch| batch.unwrap().num_sentences()).sum();
    assert_eq!(total, streamed);
}
