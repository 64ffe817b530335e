use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hmmtag::{
    config::Settings,
    corpus,
    evaluation::{self, viterbi_decode},
    hmm::{Tagger, ViterbiTagger},
    speaking, CorpusStats, Error, TagSet,
};

/// Tag sentences with a bigram HMM built from a tagged corpus, evaluate its
/// accuracy, or score answers to simple questions
#[derive(Debug, Parser)]
struct Argv {
    #[command(flatten)]
    settings: Settings,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// assign a tag to every word of a sentence
    Tag {
        /// report when the decoder fell back to the most frequent tag
        #[arg(short, long)]
        verbose: bool,
        /// the words of the sentence
        #[arg(value_name = "WORD", required = true)]
        words: Vec<String>,
    },
    /// report the accuracy of the tagger on labeled sentences
    Evaluate {
        /// labeled sentences to evaluate on (defaults to the training corpus)
        #[arg(short, long, value_name = "FILE")]
        test: Option<PathBuf>,
        /// print precision, recall and F1 for every tag
        #[arg(short, long)]
        report: bool,
    },
    /// score an answer to a question, printing JSON
    Score {
        #[arg(short, long)]
        question: String,
        #[arg(short, long)]
        answer: String,
    },
}

fn load(settings: &Settings) -> Result<(CorpusStats, TagSet), Error> {
    let stats = corpus::load(&settings.corpus)?;
    let vocab = stats.tag_set();
    Ok((stats, vocab))
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let argv = Argv::parse();
    log::info!("{:?}", argv);
    let (stats, vocab) = load(&argv.settings)?;

    match argv.command {
        Command::Tag { verbose, words } => {
            let mut tagger = ViterbiTagger::new(&stats);
            let decoded = tagger.decode(&words, &vocab);
            if let hmmtag::Decoded::Fallback { reason, .. } = &decoded {
                if verbose {
                    eprintln!("fallback: {reason}");
                }
            }
            for (word, tag) in words.iter().zip(decoded.tags()) {
                println!("{word}\t{tag}");
            }
        }
        Command::Evaluate { test, report } => {
            let sentences = corpus::read_corpus(test.as_ref().unwrap_or(&argv.settings.corpus))?;
            let workers = argv.settings.workers;
            if report {
                let evaluation = evaluation::evaluate_report(viterbi_decode, &sentences, &stats, &vocab, workers);
                println!("{evaluation}");
            } else {
                let accuracy = evaluation::evaluate(viterbi_decode, &sentences, &stats, &vocab, workers);
                println!("accuracy: {accuracy:.4}");
            }
        }
        Command::Score { question, answer } => {
            let score = speaking::score_answer(&question, &answer, &stats, &vocab)?;
            println!("{}", serde_json::to_string_pretty(&score)?);
        }
    }
    Ok(())
}
