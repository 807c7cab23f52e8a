//! Answer validation and raw scoring. A submission is scanned left to right
//! and the first violation wins; the completeness check runs after the scan.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::scoring_key::{Choice, ScoringKey};

/// One submitted answer: which question, which letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: u32,
    pub answer: Choice,
}

/// Score a full answer set against the scoring key.
///
/// Per-entry checks run in submission order: a repeated question id, then an
/// id the key does not know, then a choice the question does not offer. Once
/// the scan survives, the set must cover every question exactly once.
pub fn calculate_score(answers: &[Answer], key: &ScoringKey) -> Result<u32, ScoreError> {
    let mut answered = HashSet::new();
    let mut total: u32 = 0;

    for entry in answers {
        if !answered.insert(entry.question) {
            return Err(ScoreError::DuplicateQuestion(entry.question));
        }
        if !key.contains_question(entry.question) {
            return Err(ScoreError::UnknownQuestion(entry.question));
        }
        match key.points(entry.question, entry.answer) {
            Some(points) => total = total.saturating_add(points),
            None => {
                return Err(ScoreError::InvalidChoice {
                    question: entry.question,
                    choice: entry.answer,
                    allowed: key.allowed_choices(entry.question),
                })
            }
        }
    }

    if answered.len() != key.question_count() {
        return Err(ScoreError::IncompleteAnswerSet {
            answered: answered.len(),
            expected: key.question_count(),
        });
    }

    Ok(total)
}

/// Why an answer set was rejected. Each variant maps to a client error at the
/// API boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    DuplicateQuestion(u32),
    UnknownQuestion(u32),
    InvalidChoice {
        question: u32,
        choice: Choice,
        allowed: Vec<Choice>,
    },
    IncompleteAnswerSet {
        answered: usize,
        expected: usize,
    },
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateQuestion(question) => {
                write!(f, "question {question} answered more than once")
            }
            Self::UnknownQuestion(question) => write!(f, "unknown question id {question}"),
            Self::InvalidChoice {
                question,
                choice,
                allowed,
            } => {
                let allowed = allowed
                    .iter()
                    .map(|choice| choice.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "invalid choice '{choice}' for question {question} (allowed: {allowed})"
                )
            }
            Self::IncompleteAnswerSet { answered, expected } => {
                write!(
                    f,
                    "expected answers for all {expected} questions, got {answered}"
                )
            }
        }
    }
}

impl std::error::Error for ScoreError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::scoring_key::{FIRST_QUESTION_ID, LAST_QUESTION_ID};

    fn full_answer_set(choose: impl Fn(u32) -> Choice) -> Vec<Answer> {
        (FIRST_QUESTION_ID..=LAST_QUESTION_ID)
            .map(|question| Answer {
                question,
                answer: choose(question),
            })
            .collect()
    }

    #[test]
    fn scores_the_bounds_of_the_builtin_key() {
        let key = ScoringKey::builtin();

        // Question 1 is reverse-scored, so D is its lowest-value letter.
        let lowest = full_answer_set(|q| if q == 1 { Choice::D } else { Choice::A });
        assert_eq!(calculate_score(&lowest, &key), Ok(13));

        let highest = full_answer_set(|q| match q {
            1 => Choice::A,
            4 | 5 => Choice::C,
            9 | 10 => Choice::B,
            _ => Choice::D,
        });
        assert_eq!(calculate_score(&highest, &key), Ok(48));
    }

    #[test]
    fn duplicate_wins_over_later_checks() {
        let key = ScoringKey::builtin();
        let mut answers = full_answer_set(|_| Choice::A);
        // Repeat question 2 with an unknown id also present later; the scan
        // hits the duplicate first.
        answers[4] = Answer {
            question: 2,
            answer: Choice::B,
        };
        answers[9] = Answer {
            question: 99,
            answer: Choice::A,
        };
        assert_eq!(
            calculate_score(&answers, &key),
            Err(ScoreError::DuplicateQuestion(2))
        );
    }

    #[test]
    fn error_text_lists_the_allowed_letters() {
        let err = ScoreError::InvalidChoice {
            question: 4,
            choice: Choice::D,
            allowed: vec![Choice::A, Choice::B, Choice::C],
        };
        assert_eq!(
            err.to_string(),
            "invalid choice 'D' for question 4 (allowed: A, B, C)"
        );
    }
}
