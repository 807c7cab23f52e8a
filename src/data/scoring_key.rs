//! Scoring key: per-question answer-choice point values for the 13-question
//! risk tolerance questionnaire. The builtin table mirrors the upstream
//! Grable-Lytton key; JSON overrides may retune point values but not the
//! question set itself.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest and highest question id of the fixed questionnaire.
pub const FIRST_QUESTION_ID: u32 = 1;
pub const LAST_QUESTION_ID: u32 = 13;

/// Number of questions every answer set must cover.
pub const QUESTION_COUNT: usize = 13;

/// Answer-choice letter. The questionnaire never goes past D; other letters
/// are rejected when a request is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Parse a choice letter from override-file text. Exact uppercase match.
    pub fn parse(raw: &str) -> Option<Choice> {
        match raw {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scoring key for the full questionnaire: question id -> choice -> points.
/// Choice sets are heterogeneous: questions 4 and 5 have three choices,
/// questions 9 and 10 are binary, the rest offer all four letters.
#[derive(Debug, Clone)]
pub struct ScoringKey {
    questions: BTreeMap<u32, BTreeMap<Choice, u32>>,
}

/// Canonical point values (question id, choice -> points). Question 1 is
/// reverse-scored in the source instrument.
const BUILTIN_SCORING_KEY: &[(u32, &[(Choice, u32)])] = &[
    (1, &[(Choice::A, 4), (Choice::B, 3), (Choice::C, 2), (Choice::D, 1)]),
    (2, &[(Choice::A, 1), (Choice::B, 2), (Choice::C, 3), (Choice::D, 4)]),
    (3, &[(Choice::A, 1), (Choice::B, 2), (Choice::C, 3), (Choice::D, 4)]),
    (4, &[(Choice::A, 1), (Choice::B, 2), (Choice::C, 3)]),
    (5, &[(Choice::A, 1), (Choice::B, 2), (Choice::C, 3)]),
    (6, &[(Choice::A, 1), (Choice::B, 2), (Choice::C, 3), (Choice::D, 4)]),
    (7, &[(Choice::A, 1), (Choice::B, 2), (Choice::C, 3), (Choice::D, 4)]),
    (8, &[(Choice::A, 1), (Choice::B, 2), (Choice::C, 3), (Choice::D, 4)]),
    (9, &[(Choice::A, 1), (Choice::B, 3)]),
    (10, &[(Choice::A, 1), (Choice::B, 3)]),
    (11, &[(Choice::A, 1), (Choice::B, 2), (Choice::C, 3), (Choice::D, 4)]),
    (12, &[(Choice::A, 1), (Choice::B, 2), (Choice::C, 3), (Choice::D, 4)]),
    (13, &[(Choice::A, 1), (Choice::B, 2), (Choice::C, 3), (Choice::D, 4)]),
];

impl ScoringKey {
    /// The canonical compiled-in scoring key.
    pub fn builtin() -> ScoringKey {
        let questions = BUILTIN_SCORING_KEY
            .iter()
            .map(|(id, choices)| (*id, choices.iter().copied().collect()))
            .collect();
        ScoringKey { questions }
    }

    /// Build a key from override-file rows. The question set is fixed: rows
    /// must cover exactly ids 1..=13, each with at least two known choices.
    pub fn from_rows(rows: &[ScoringKeyRow]) -> Result<ScoringKey, ScoringKeyError> {
        let mut questions: BTreeMap<u32, BTreeMap<Choice, u32>> = BTreeMap::new();

        for row in rows {
            if !(FIRST_QUESTION_ID..=LAST_QUESTION_ID).contains(&row.id) {
                return Err(ScoringKeyError::UnexpectedQuestion(row.id));
            }
            if questions.contains_key(&row.id) {
                return Err(ScoringKeyError::DuplicateQuestion(row.id));
            }

            let mut choices = BTreeMap::new();
            for (letter, points) in &row.points {
                let Some(choice) = Choice::parse(letter) else {
                    return Err(ScoringKeyError::UnknownChoice {
                        question: row.id,
                        letter: letter.clone(),
                    });
                };
                choices.insert(choice, *points);
            }
            if choices.len() < 2 {
                return Err(ScoringKeyError::TooFewChoices {
                    question: row.id,
                    count: choices.len(),
                });
            }
            questions.insert(row.id, choices);
        }

        for id in FIRST_QUESTION_ID..=LAST_QUESTION_ID {
            if !questions.contains_key(&id) {
                return Err(ScoringKeyError::MissingQuestion(id));
            }
        }

        Ok(ScoringKey { questions })
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn contains_question(&self, id: u32) -> bool {
        self.questions.contains_key(&id)
    }

    /// Point value for (question, choice); None when the question does not
    /// exist or the choice is not in that question's set.
    pub fn points(&self, id: u32, choice: Choice) -> Option<u32> {
        self.questions.get(&id)?.get(&choice).copied()
    }

    /// The valid choices for a question, in letter order. Empty for an
    /// unknown question id.
    pub fn allowed_choices(&self, id: u32) -> Vec<Choice> {
        self.questions
            .get(&id)
            .map(|choices| choices.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Question ids in ascending order.
    pub fn question_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.questions.keys().copied()
    }

    /// Highest total a fully-answered set can reach. 48 for the builtin key,
    /// one past the rescaler's 47.0 ceiling, so a perfect set clamps onto the
    /// top tier.
    pub fn max_total(&self) -> u32 {
        self.questions
            .values()
            .map(|choices| choices.values().copied().max().unwrap_or(0))
            .sum()
    }

    /// Lowest total a fully-answered set can reach. 13 for the builtin key.
    pub fn min_total(&self) -> u32 {
        self.questions
            .values()
            .map(|choices| choices.values().copied().min().unwrap_or(0))
            .sum()
    }

    /// Row form, for serialization and validation reporting.
    pub fn to_rows(&self) -> Vec<ScoringKeyRow> {
        self.questions
            .iter()
            .map(|(id, choices)| ScoringKeyRow {
                id: *id,
                points: choices
                    .iter()
                    .map(|(choice, points)| (choice.as_str().to_string(), *points))
                    .collect(),
            })
            .collect()
    }
}

/// One question's row in an override file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringKeyRow {
    pub id: u32,
    pub points: BTreeMap<String, u32>,
}

/// Top-level shape of `scoring_key.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringKeyFile {
    pub questions: Vec<ScoringKeyRow>,
}

/// Structural defects in an override scoring key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringKeyError {
    UnexpectedQuestion(u32),
    DuplicateQuestion(u32),
    MissingQuestion(u32),
    TooFewChoices { question: u32, count: usize },
    UnknownChoice { question: u32, letter: String },
}

impl fmt::Display for ScoringKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedQuestion(id) => {
                write!(f, "question id {id} is outside the fixed 1..=13 set")
            }
            Self::DuplicateQuestion(id) => write!(f, "question {id} defined more than once"),
            Self::MissingQuestion(id) => write!(f, "question {id} has no scoring row"),
            Self::TooFewChoices { question, count } => write!(
                f,
                "question {question} defines {count} choice(s), need at least 2"
            ),
            Self::UnknownChoice { question, letter } => {
                write!(f, "question {question} has unknown choice letter '{letter}'")
            }
        }
    }
}

impl std::error::Error for ScoringKeyError {}
