pub mod rescale;
pub mod score;

pub use rescale::{rescale, Tier, RAW_SCORE_MAX, RAW_SCORE_MIN, TIER_VALUE_MAX, TIER_VALUE_MIN};
pub use score::{calculate_score, Answer, ScoreError};

use std::fmt;

use crate::data::allocation::{AllocationNotConfigured, AllocationRecord};
use crate::data::registry::DataRegistry;

/// Outcome of a successful assessment: the raw questionnaire total plus the
/// tier it rescales to and that tier's allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub raw_score: u32,
    pub tier: Tier,
    pub allocation: AllocationRecord,
}

/// Full pipeline from raw answers to an allocation recommendation. Fails with
/// exactly one structured error; never partial output.
pub fn assess(answers: &[Answer], registry: &DataRegistry) -> Result<Assessment, AssessError> {
    let raw_score = calculate_score(answers, registry.scoring_key())?;
    let tier = rescale(f64::from(raw_score));
    let allocation = *registry.allocations().lookup(tier)?;
    Ok(Assessment {
        raw_score,
        tier,
        allocation,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessError {
    Score(ScoreError),
    Allocation(AllocationNotConfigured),
}

impl fmt::Display for AssessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Score(err) => err.fmt(f),
            Self::Allocation(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for AssessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Score(err) => Some(err),
            Self::Allocation(err) => Some(err),
        }
    }
}

impl From<ScoreError> for AssessError {
    fn from(err: ScoreError) -> Self {
        Self::Score(err)
    }
}

impl From<AllocationNotConfigured> for AssessError {
    fn from(err: AllocationNotConfigured) -> Self {
        Self::Allocation(err)
    }
}
