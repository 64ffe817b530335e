use std::{
    collections::BTreeMap,
    convert::Infallible,
    fmt::Display,
    iter::zip,
    panic::{catch_unwind, AssertUnwindSafe},
};

use rayon::prelude::*;

use crate::{
    corpus::{CorpusStats, Sentence},
    hmm,
    quark::TagSet,
};

/// Default size of the evaluation worker pool.
pub const DEFAULT_WORKERS: usize = 4;

/// Label-wise performance values.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LabelMeasure {
    /// Number of correct predictions.
    pub num_correct: usize,
    /// Number of occurrences of the label in the gold-standard data.
    pub num_observation: usize,
    /// Number of predictions.
    pub num_prediction: usize,
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl LabelMeasure {
    fn merge(&mut self, other: &Self) {
        self.num_correct += other.num_correct;
        self.num_observation += other.num_observation;
        self.num_prediction += other.num_prediction;
    }

    fn summarize(&mut self) {
        self.precision = 0.0;
        self.recall = 0.0;
        self.fmeasure = 0.0;
        if self.num_prediction > 0 {
            self.precision = self.num_correct as f64 / self.num_prediction as f64;
        }
        if self.num_observation > 0 {
            self.recall = self.num_correct as f64 / self.num_observation as f64;
        }
        if self.precision + self.recall > 0.0 {
            self.fmeasure = self.precision * self.recall * 2.0 / (self.precision + self.recall);
        }
    }
}

/// Overall tagging performance.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Evaluation {
    /// Number of labels observed in the gold-standard data; the macro averages run over these.
    pub num_labels: usize,
    pub labels: BTreeMap<String, LabelMeasure>,

    /// Number of correctly predicted items.
    pub item_total_correct: usize,
    /// Total number of items.
    pub item_total_num: usize,
    pub item_accuracy: f64,

    /// Number of instances predicted without a single error.
    pub inst_total_correct: usize,
    pub inst_total_num: usize,
    pub inst_accuracy: f64,

    /// Instances whose decode failed; they count towards nothing else.
    pub inst_failed: usize,

    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_fmeasure: f64,
}

impl Evaluation {
    pub fn accumulate<R: AsRef<str>, P: AsRef<str>>(&mut self, reference: &[R], prediction: &[P]) {
        let mut matched = 0;
        for r in reference {
            self.labels.entry(r.as_ref().to_string()).or_default().num_observation += 1;
        }
        for (r, p) in zip(reference, prediction) {
            let (r, p) = (r.as_ref(), p.as_ref());
            self.labels.entry(p.to_string()).or_default().num_prediction += 1;
            if r == p {
                self.labels.entry(r.to_string()).or_default().num_correct += 1;
                matched += 1;
            }
        }
        self.item_total_correct += matched;
        self.item_total_num += reference.len();

        if matched == reference.len() {
            self.inst_total_correct += 1;
        }
        self.inst_total_num += 1;
    }

    pub fn record_failure(&mut self) {
        self.inst_failed += 1;
    }

    pub fn merge(mut self, other: Self) -> Self {
        for (label, lev) in &other.labels {
            self.labels.entry(label.clone()).or_default().merge(lev);
        }
        self.item_total_correct += other.item_total_correct;
        self.item_total_num += other.item_total_num;
        self.inst_total_correct += other.inst_total_correct;
        self.inst_total_num += other.inst_total_num;
        self.inst_failed += other.inst_failed;
        self
    }

    /// Compute the derived ratios from the accumulated counts.
    pub fn summarize(&mut self) {
        self.macro_precision = 0.0;
        self.macro_recall = 0.0;
        self.macro_fmeasure = 0.0;
        let mut observed = 0;
        for lev in self.labels.values_mut() {
            lev.summarize();
            if lev.num_observation == 0 {
                continue;
            }
            observed += 1;
            self.macro_precision += lev.precision;
            self.macro_recall += lev.recall;
            self.macro_fmeasure += lev.fmeasure;
        }

        self.num_labels = observed;
        if observed > 0 {
            self.macro_precision /= observed as f64;
            self.macro_recall /= observed as f64;
            self.macro_fmeasure /= observed as f64;
        }

        self.item_accuracy = ratio(self.item_total_correct, self.item_total_num);
        self.inst_accuracy = ratio(self.inst_total_correct, self.inst_total_num);
    }
}

fn ratio(n: usize, d: usize) -> f64 {
    if d == 0 {
        0.0
    } else {
        n as f64 / d as f64
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Performance by label (#match, #model, #ref) (precision, recall, F1):")?;
        for (label, lev) in &self.labels {
            if lev.num_observation == 0 {
                writeln!(f, "\t{}: ({}, {}, {}) (******, ******, ******)", label, lev.num_correct, lev.num_prediction, lev.num_observation)?;
            } else {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})",
                    label, lev.num_correct, lev.num_prediction, lev.num_observation, lev.precision, lev.recall, lev.fmeasure
                )?;
            }
        }
        writeln!(f, "Macro-average precision, recall, F1: ({:.6}, {:.6}, {:.6})", self.macro_precision, self.macro_recall, self.macro_fmeasure)?;
        writeln!(f, "Item accuracy: {}/{} => {:.4}", self.item_total_correct, self.item_total_num, self.item_accuracy)?;
        write!(f, "Sequence accuracy: {}/{} => {:.4}", self.inst_total_correct, self.inst_total_num, self.inst_accuracy)?;
        if self.inst_failed > 0 {
            write!(f, "\nFailed sequences: {}", self.inst_failed)?;
        }
        Ok(())
    }
}

/// Decode one labeled sentence. `None` when the decode function failed or panicked.
fn predict<F, E>(decode_fn: &F, sentence: &Sentence, stats: &CorpusStats, vocab: &TagSet) -> Option<(Vec<String>, Vec<String>)>
where
    F: Fn(&[String], &TagSet, &CorpusStats) -> Result<Vec<String>, E>,
    E: Display,
{
    let (words, gold): (Vec<String>, Vec<String>) = sentence.iter().cloned().unzip();
    match catch_unwind(AssertUnwindSafe(|| decode_fn(&words, vocab, stats))) {
        Ok(Ok(predicted)) => Some((gold, predicted)),
        Ok(Err(e)) => {
            log::error!("error processing sentence: {e}");
            None
        }
        Err(_) => {
            log::error!("error processing sentence: decoder panicked");
            None
        }
    }
}

/// Run `f` on a pool of `workers` threads; on the calling thread if the pool cannot be built.
fn with_pool<T: Send>(workers: usize, f: impl FnOnce() -> T + Send) -> T {
    match rayon::ThreadPoolBuilder::new().num_threads(workers.max(1)).build() {
        Ok(pool) => pool.install(f),
        Err(e) => {
            log::warn!("failed to build worker pool: {e}; evaluating on the current thread");
            f()
        }
    }
}

/// Token-level accuracy of `decode_fn` on `sentences`, in `[0, 1]`.
///
/// Sentences are decoded in parallel on `workers` threads. A sentence whose
/// decode fails contributes nothing to either count. Returns `0.0` when no
/// token was scored.
pub fn evaluate<F, E>(decode_fn: F, sentences: &[Sentence], stats: &CorpusStats, vocab: &TagSet, workers: usize) -> f64
where
    F: Fn(&[String], &TagSet, &CorpusStats) -> Result<Vec<String>, E> + Sync,
    E: Display,
{
    let (correct, total) = with_pool(workers, || {
        sentences
            .par_iter()
            .map(|sentence| match predict(&decode_fn, sentence, stats, vocab) {
                Some((gold, predicted)) => {
                    let correct = zip(&gold, &predicted).filter(|(g, p)| g == p).count();
                    (correct, gold.len())
                }
                None => (0, 0),
            })
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
    });
    log::info!("evaluated {} sentences: {correct}/{total} tokens correct", sentences.len());
    ratio(correct, total)
}

/// Like [`evaluate`], but returns the full label-wise report.
pub fn evaluate_report<F, E>(decode_fn: F, sentences: &[Sentence], stats: &CorpusStats, vocab: &TagSet, workers: usize) -> Evaluation
where
    F: Fn(&[String], &TagSet, &CorpusStats) -> Result<Vec<String>, E> + Sync,
    E: Display,
{
    let mut evaluation = with_pool(workers, || {
        sentences
            .par_iter()
            .fold(Evaluation::default, |mut ev, sentence| {
                match predict(&decode_fn, sentence, stats, vocab) {
                    Some((gold, predicted)) => ev.accumulate(&gold, &predicted),
                    None => ev.record_failure(),
                }
                ev
            })
            .reduce(Evaluation::default, Evaluation::merge)
    });
    evaluation.summarize();
    evaluation
}

/// The Viterbi decoder in the shape [`evaluate`] expects.
pub fn viterbi_decode(words: &[String], vocab: &TagSet, stats: &CorpusStats) -> Result<Vec<String>, Infallible> {
    Ok(hmm::decode(words, vocab, stats))
}
