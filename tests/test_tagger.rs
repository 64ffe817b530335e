use hmmtag::{
    corpus::{self, START_TAG},
    hmm::{self, probability, Decoded, Tagger, ViterbiTagger},
    CorpusLoadError, CorpusStats, DecodeError, TagSet,
};

const CORPUS: &str = "tests/data/corpus.json";

fn words(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

#[test]
fn load_fixture() {
    let stats = corpus::load(CORPUS).expect("failed to load corpus");
    assert_eq!(stats.num_sentences(), 12);
    assert_eq!(stats.tag_count.values().sum::<usize>(), stats.total_words);
    assert_eq!(stats.tag_count("NN"), 12);
    assert_eq!(stats.transition_count(START_TAG, "PRP"), Some(6));
    assert_eq!(stats.word_tag_count("i", "PRP"), Some(4));
}

#[test]
fn load_missing_fixture() {
    match corpus::load("tests/data/missing.json") {
        Err(CorpusLoadError::NotFound(path)) => assert!(path.ends_with("missing.json")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn single_sentence_counts() {
    let stats = CorpusStats::from_corpus(&corpus::parse_str(r#"[[["the", "DT"], ["dog", "NN"]]]"#).unwrap());
    assert_eq!(stats.tag_count.len(), 2);
    assert_eq!(stats.tag_count("DT"), 1);
    assert_eq!(stats.tag_count("NN"), 1);
    assert_eq!(stats.tag_transition_count.len(), 2);
    assert_eq!(stats.transition_count(START_TAG, "DT"), Some(1));
    assert_eq!(stats.transition_count("DT", "NN"), Some(1));
    assert_eq!(stats.total_words, 2);
}

#[test]
fn tags_training_sentences() {
    let stats = corpus::load(CORPUS).unwrap();
    let vocab = stats.tag_set();
    let tags = hmm::decode(&words("The cat runs in the park"), &vocab, &stats);
    assert_eq!(tags, ["DT", "NN", "VBZ", "IN", "DT", "NN"]);
    let tags = hmm::decode(&words("I am a student"), &vocab, &stats);
    assert_eq!(tags, ["PRP", "VBP", "DT", "NN"]);
}

#[test]
fn output_length_matches_input() {
    let stats = corpus::load(CORPUS).unwrap();
    let vocab = stats.tag_set();
    let mut tagger = ViterbiTagger::new(&stats);
    for sentence in ["hello", "zzz qqq", "My dog likes the blue sofa on Monday", "a a a a a a a a a a a a"] {
        let tokens = words(sentence);
        assert_eq!(tagger.tag(&tokens, &vocab).len(), tokens.len(), "{sentence}");
    }
}

#[test]
fn empty_input_is_empty() {
    let stats = corpus::load(CORPUS).unwrap();
    let none: Vec<String> = Vec::new();
    assert!(hmm::decode(&none, &stats.tag_set(), &stats).is_empty());
    assert!(hmm::decode(&none, &TagSet::new(), &CorpusStats::default()).is_empty());
}

#[test]
fn deterministic() {
    let stats = corpus::load(CORPUS).unwrap();
    let vocab = stats.tag_set();
    let tokens = words("They like the red guitar and unknown words");
    let first = hmm::decode(&tokens, &vocab, &stats);
    let mut tagger = ViterbiTagger::new(&stats);
    assert_eq!(tagger.tag(&tokens, &vocab), first);
    assert_eq!(tagger.tag(&tokens, &vocab), first);
    assert_eq!(hmm::decode(&tokens, &vocab, &stats), first);
}

#[test]
fn empty_vocabulary_falls_back() {
    let stats = corpus::load(CORPUS).unwrap();
    let mut tagger = ViterbiTagger::new(&stats);
    let tokens = words("I am here");
    match tagger.decode(&tokens, &TagSet::new()) {
        Decoded::Fallback { tags, reason } => {
            assert_eq!(reason, DecodeError::EmptyVocabulary);
            assert_eq!(tags, ["NN", "NN", "NN"]);
        }
        other => panic!("expected fallback, got {other:?}"),
    }
}

#[test]
fn restricted_vocabulary() {
    let stats = corpus::load(CORPUS).unwrap();
    let vocab: TagSet = ["VBZ", "DT"].into_iter().collect();
    let tags = hmm::decode(&words("the dog runs"), &vocab, &stats);
    assert!(tags.iter().all(|t| vocab.contains(t)));
    assert_eq!(tags.len(), 3);
}

#[test]
fn unknown_word_penalty() {
    let stats = corpus::load(CORPUS).unwrap();
    let penalty = 1e-6_f64.ln();
    assert_eq!(probability::emission_log_prob(&stats, "xylophone", "NN"), penalty);
    assert_eq!(probability::emission_log_prob(&stats, "xylophone", ","), penalty);
}

#[test]
fn emission_case_insensitive() {
    let stats = corpus::load(CORPUS).unwrap();
    let a = probability::emission_log_prob(&stats, "Dog", "NN");
    assert_eq!(a, probability::emission_log_prob(&stats, "dog", "NN"));
    assert_eq!(a, probability::emission_log_prob(&stats, "DOG", "NN"));
    assert_eq!(a, (1.0_f64 / 12.0).ln());
}
