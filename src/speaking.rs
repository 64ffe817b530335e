//! Scoring of short spoken answers against expected templates.
//!
//! A question is mapped to a template answer by keyword spotting; the user's
//! answer is compared to the template with a string-similarity ratio and
//! checked against a few tag-bigram patterns produced by the HMM tagger.

use serde::{Deserialize, Serialize};

use crate::{corpus::CorpusStats, error::ScoreError, hmm, quark::TagSet};

/// Keyword → expected answer. Searched in order; the first keyword found wins.
pub const QUESTION_KEYWORDS: [(&str, &str); 6] = [
    ("name", "My name is John"),
    ("from", "I am from Indonesia"),
    ("old", "I am 20 years old"),
    ("student", "Yes, I am a student"),
    ("like", "I like playing guitar and watching movie"),
    ("goodbye", "Thank you and goodbye"),
];

const SUGGESTIONS: [(&str, &str); 6] = [
    ("name", "Your name is different, but that's perfectly normal! Everyone has their own unique name."),
    ("from", "Your city or country might be different, but that's okay! Everyone comes from different places."),
    ("old", "Your age is different, but that's fine! Everyone has their own age."),
    ("student", "Your student status might be different, but that's normal! People have different educational situations."),
    ("like", "Your hobbies might be different, but that's fine! Everyone has their own interests."),
    ("goodbye", "Your goodbye message might be different, but that's fine! Everyone has different goodbye messages."),
];

const DEFAULT_SUGGESTION: &str = "Your answer is different from the example, but personal information varies for everyone!";

const QUESTION_WORDS: [&str; 9] = ["what", "where", "when", "who", "why", "how", "which", "whose", "whom"];
const QUESTION_PATTERNS: [&str; 6] = ["?", "are you", "do you", "can you", "will you", "have you"];

/// Tag bigrams reported as grammar findings: (rule name, description, pattern).
pub const GRAMMAR_RULES: [(&str, &str, [&str; 2]); 2] = [
    ("PRP_VBP", "Personal pronoun should be followed by verb", ["PRP", "VBP"]),
    ("DT_NN", "Determiner should be followed by noun", ["DT", "NN"]),
];

/// Points deducted per grammar finding from a base of 100.
const GRAMMAR_PENALTY: f64 = 10.0;

const SIMILARITY_WEIGHT: f64 = 0.4;
const GRAMMAR_WEIGHT: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakingScore {
    pub question: String,
    pub user_answer: String,
    /// Percentage in `[0, 100]`, two decimals.
    pub similarity: f64,
    pub grammar_score: f64,
    pub grammar_errors: Vec<String>,
    pub suggestion: String,
    pub pos_tags: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairResult {
    pub question: String,
    pub user_answer: String,
    pub similarity: f64,
    pub grammar_score: f64,
    pub grammar_errors: Vec<String>,
    pub suggestion: String,
    pub pos_tags: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationScore {
    pub average_similarity: f64,
    pub average_grammar: f64,
    pub final_score: f64,
    pub detailed_results: Vec<PairResult>,
    pub total_pairs: usize,
}

/// Whether `text` reads as a question.
pub fn is_question(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    QUESTION_WORDS.iter().any(|w| text.starts_with(w)) || QUESTION_PATTERNS.iter().any(|p| text.contains(p))
}

/// First known keyword contained in `question`, case-insensitively.
pub fn extract_keyword(question: &str) -> Option<&'static str> {
    let question = question.to_lowercase();
    let keyword = QUESTION_KEYWORDS.iter().map(|(k, _)| *k).find(|k| question.contains(k));
    log::debug!("keyword for {question:?}: {keyword:?}");
    keyword
}

pub fn expected_answer(keyword: &str) -> Option<&'static str> {
    QUESTION_KEYWORDS.iter().find(|(k, _)| *k == keyword).map(|(_, a)| *a)
}

pub fn available_keywords() -> Vec<&'static str> {
    QUESTION_KEYWORDS.iter().map(|(k, _)| *k).collect()
}

/// Case-insensitive similarity of two answers as a percentage with two decimals.
pub fn similarity_score(user_answer: &str, expected: &str) -> f64 {
    let a = user_answer.trim().to_lowercase();
    let b = expected.trim().to_lowercase();
    round2(strsim::normalized_levenshtein(&a, &b) * 100.0)
}

pub fn generate_suggestion(keyword: &str, similarity: f64) -> String {
    let base = SUGGESTIONS.iter().find(|(k, _)| *k == keyword).map_or(DEFAULT_SUGGESTION, |(_, s)| *s);
    let advice = if similarity >= 80.0 {
        "Your answer structure is very good!"
    } else if similarity >= 60.0 {
        "Try to use similar sentence structure as the example."
    } else if similarity >= 40.0 {
        "Consider using a sentence structure closer to the example format."
    } else {
        "Try to follow the example sentence pattern more closely."
    };
    format!("{base} {advice}")
}

/// Grammar findings for every adjacent tag pair matching one of [`GRAMMAR_RULES`].
pub fn grammar_findings<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut findings = Vec::new();
    for pair in tags.windows(2) {
        for (name, desc, pattern) in &GRAMMAR_RULES {
            if pair[0].as_ref() == pattern[0] && pair[1].as_ref() == pattern[1] {
                findings.push(format!("{name}: {desc}"));
            }
        }
    }
    findings
}

/// Score one answer to one question.
pub fn score_answer(question: &str, user_answer: &str, stats: &CorpusStats, vocab: &TagSet) -> Result<SpeakingScore, ScoreError> {
    if question.is_empty() || user_answer.is_empty() {
        return Err(ScoreError::MissingInput);
    }
    if !is_question(question) {
        return Err(ScoreError::NotAQuestion(question.to_string()));
    }
    let keyword = extract_keyword(question).ok_or_else(|| ScoreError::UnknownKeyword(question.to_string()))?;
    let expected = expected_answer(keyword).ok_or_else(|| ScoreError::UnknownKeyword(question.to_string()))?;

    let similarity = similarity_score(user_answer, expected);
    let words: Vec<&str> = user_answer.split_whitespace().collect();
    let tags = hmm::decode(&words, vocab, stats);
    log::debug!("predicted tags: {tags:?}");

    let grammar_errors = grammar_findings(&tags);
    Ok(SpeakingScore {
        question: question.to_string(),
        user_answer: user_answer.to_string(),
        similarity,
        grammar_score: 100.0 - grammar_errors.len() as f64 * GRAMMAR_PENALTY,
        grammar_errors,
        suggestion: generate_suggestion(keyword, similarity),
        pos_tags: words.iter().map(|w| w.to_string()).zip(tags).collect(),
    })
}

/// Score a conversation: bot messages are questions, user messages answers,
/// paired in order. A pair that cannot be scored counts as zero.
pub fn score_conversation(messages: &[Message], stats: &CorpusStats, vocab: &TagSet) -> Result<ConversationScore, ScoreError> {
    let questions: Vec<&str> = messages.iter().filter(|m| m.role == "bot").map(|m| m.message.as_str()).collect();
    let answers: Vec<&str> = messages.iter().filter(|m| m.role == "user").map(|m| m.message.as_str()).collect();
    if questions.len() != answers.len() {
        return Err(ScoreError::UnbalancedConversation { questions: questions.len(), answers: answers.len() });
    }

    let detailed_results: Vec<PairResult> = questions
        .iter()
        .zip(&answers)
        .map(|(q, a)| match score_answer(q, a, stats, vocab) {
            Ok(s) => PairResult {
                question: s.question,
                user_answer: s.user_answer,
                similarity: s.similarity,
                grammar_score: s.grammar_score,
                grammar_errors: s.grammar_errors,
                suggestion: s.suggestion,
                pos_tags: s.pos_tags,
                error: None,
            },
            Err(e) => {
                log::warn!("could not score answer to {q:?}: {e}");
                PairResult {
                    question: q.to_string(),
                    user_answer: a.to_string(),
                    similarity: 0.0,
                    grammar_score: 0.0,
                    grammar_errors: Vec::new(),
                    suggestion: String::new(),
                    pos_tags: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    let pair_count = detailed_results.len().max(1) as f64;
    let average_similarity = detailed_results.iter().map(|r| r.similarity).sum::<f64>() / pair_count;
    let average_grammar = detailed_results.iter().map(|r| r.grammar_score).sum::<f64>() / pair_count;
    let final_score = average_similarity * SIMILARITY_WEIGHT + average_grammar * GRAMMAR_WEIGHT;
    Ok(ConversationScore {
        average_similarity: round2(average_similarity),
        average_grammar: round2(average_grammar),
        final_score: round2(final_score),
        total_pairs: detailed_results.len().max(1),
        detailed_results,
    })
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::parse_str;

    fn stats() -> CorpusStats {
        let corpus = parse_str(
            r#"[
                [["My", "PRP$"], ["name", "NN"], ["is", "VBZ"], ["John", "NNP"]],
                [["I", "PRP"], ["am", "VBP"], ["from", "IN"], ["Indonesia", "NNP"]],
                [["I", "PRP"], ["like", "VBP"], ["the", "DT"], ["guitar", "NN"]]
            ]"#,
        )
        .unwrap();
        CorpusStats::from_corpus(&corpus)
    }

    fn msg(role: &str, message: &str) -> Message {
        Message { role: role.into(), message: message.into() }
    }

    #[test]
    fn detects_questions() {
        assert!(is_question("What is your name"));
        assert!(is_question("  Where are you from?"));
        assert!(is_question("Tell me, do you like music"));
        assert!(!is_question("I am a student"));
    }

    #[test]
    fn keywords_in_order() {
        assert_eq!(extract_keyword("What is your NAME?"), Some("name"));
        assert_eq!(extract_keyword("Where are you from?"), Some("from"));
        assert_eq!(extract_keyword("Why?"), None);
        assert_eq!(expected_answer("old"), Some("I am 20 years old"));
        assert_eq!(available_keywords().len(), 6);
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity_score(" My name is John ", "my name is john"), 100.0);
        assert_eq!(similarity_score("", "abc"), 0.0);
        let s = similarity_score("My name is Jane", "My name is John");
        assert!(s > 60.0 && s < 100.0, "{s}");
    }

    #[test]
    fn suggestions() {
        assert!(generate_suggestion("name", 90.0).ends_with("Your answer structure is very good!"));
        assert!(generate_suggestion("unknown", 10.0).starts_with(DEFAULT_SUGGESTION));
        assert!(generate_suggestion("like", 45.0).contains("closer to the example format"));
    }

    #[test]
    fn grammar_patterns() {
        let findings = grammar_findings(&["PRP", "VBP", "DT", "NN", "NN"]);
        assert_eq!(
            findings,
            vec!["PRP_VBP: Personal pronoun should be followed by verb", "DT_NN: Determiner should be followed by noun"]
        );
        assert!(grammar_findings::<&str>(&[]).is_empty());
    }

    #[test]
    fn scores_answer() {
        let stats = stats();
        let score = score_answer("Where are you from?", "I am from Indonesia", &stats, &stats.tag_set()).unwrap();
        assert_eq!(score.similarity, 100.0);
        assert_eq!(score.pos_tags.len(), 4);
        assert_eq!(score.pos_tags[0], ("I".to_string(), "PRP".to_string()));
        assert_eq!(score.grammar_errors.len(), 1);
        assert_eq!(score.grammar_score, 90.0);
    }

    #[test]
    fn rejects_bad_questions() {
        let stats = stats();
        let vocab = stats.tag_set();
        assert_eq!(score_answer("", "hi", &stats, &vocab), Err(ScoreError::MissingInput));
        assert_eq!(score_answer("What is your name?", "", &stats, &vocab), Err(ScoreError::MissingInput));
        /* blank but non-empty text is scored, not rejected */
        assert!(matches!(score_answer("   ", "hi", &stats, &vocab), Err(ScoreError::NotAQuestion(_))));
        let blank = score_answer("What is your name?", "   ", &stats, &vocab).unwrap();
        assert_eq!(blank.similarity, 0.0);
        assert!(blank.pos_tags.is_empty());
        assert!(matches!(score_answer("Hello there", "hi", &stats, &vocab), Err(ScoreError::NotAQuestion(_))));
        assert!(matches!(score_answer("How is the weather?", "hi", &stats, &vocab), Err(ScoreError::UnknownKeyword(_))));
    }

    #[test]
    fn conversation() {
        let stats = stats();
        let vocab = stats.tag_set();
        let messages = [
            msg("bot", "What is your name?"),
            msg("user", "My name is John"),
            msg("bot", "How is the weather?"),
            msg("user", "Sunny"),
        ];
        let score = score_conversation(&messages, &stats, &vocab).unwrap();
        assert_eq!(score.total_pairs, 2);
        assert_eq!(score.detailed_results[0].similarity, 100.0);
        assert!(score.detailed_results[1].error.is_some());
        assert_eq!(score.average_similarity, 50.0);
        let grammar = score.detailed_results[0].grammar_score / 2.0;
        assert_eq!(score.average_grammar, grammar);
        assert_eq!(score.final_score, round2(50.0 * 0.4 + grammar * 0.6));
    }

    #[test]
    fn unbalanced_conversation() {
        let stats = stats();
        let err = score_conversation(&[msg("bot", "What is your name?")], &stats, &stats.tag_set()).unwrap_err();
        assert_eq!(err, ScoreError::UnbalancedConversation { questions: 1, answers: 0 });
    }

    #[test]
    fn empty_conversation() {
        let stats = stats();
        let score = score_conversation(&[], &stats, &stats.tag_set()).unwrap();
        assert_eq!(score.total_pairs, 1);
        assert_eq!(score.final_score, 0.0);
    }
}
