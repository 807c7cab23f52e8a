//! Allocation table: recommended money-market/obligation/stocks split per
//! risk tier, plus the profile label that goes with it. The builtin table
//! mirrors the upstream service with English profile labels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scoring::rescale::Tier;

/// Risk profile label attached to each allocation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "Conservative",
            Self::Moderate => "Moderate",
            Self::Aggressive => "Aggressive",
        }
    }

    /// Parse an override-file label. Exact match.
    pub fn parse(raw: &str) -> Option<RiskProfile> {
        match raw {
            "Conservative" => Some(Self::Conservative),
            "Moderate" => Some(Self::Moderate),
            "Aggressive" => Some(Self::Aggressive),
            _ => None,
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tier's recommendation: profile plus three percentage weights that sum
/// to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocationRecord {
    pub profile: RiskProfile,
    pub money_market: u32,
    pub obligation: u32,
    pub stocks: u32,
}

impl AllocationRecord {
    pub fn weight_total(&self) -> u64 {
        u64::from(self.money_market) + u64::from(self.obligation) + u64::from(self.stocks)
    }
}

/// Canonical allocation table, keyed by tier half-steps (value = tier x 2).
const BUILTIN_ALLOCATIONS: &[(u8, RiskProfile, u32, u32, u32)] = &[
    (2, RiskProfile::Conservative, 70, 20, 10),
    (3, RiskProfile::Conservative, 70, 20, 10),
    (4, RiskProfile::Conservative, 58, 32, 10),
    (5, RiskProfile::Conservative, 47, 43, 10),
    (6, RiskProfile::Conservative, 36, 54, 10),
    (7, RiskProfile::Conservative, 27, 62, 11),
    (8, RiskProfile::Conservative, 18, 69, 13),
    (9, RiskProfile::Moderate, 12, 70, 18),
    (10, RiskProfile::Moderate, 10, 65, 25),
    (11, RiskProfile::Moderate, 10, 59, 31),
    (12, RiskProfile::Moderate, 10, 53, 37),
    (13, RiskProfile::Moderate, 10, 48, 42),
    (14, RiskProfile::Moderate, 10, 43, 47),
    (15, RiskProfile::Aggressive, 10, 38, 52),
    (16, RiskProfile::Aggressive, 10, 34, 56),
    (17, RiskProfile::Aggressive, 10, 29, 61),
    (18, RiskProfile::Aggressive, 10, 24, 66),
    (19, RiskProfile::Aggressive, 10, 20, 70),
    (20, RiskProfile::Aggressive, 10, 20, 70),
];

/// Read-only allocation table with one slot per tier. The builtin table is
/// total; a table built from override rows may have gaps, which surface as
/// [`AllocationNotConfigured`] at lookup time.
#[derive(Debug, Clone)]
pub struct AllocationTable {
    records: [Option<AllocationRecord>; Tier::COUNT],
}

impl AllocationTable {
    /// The canonical compiled-in table. Covers all 19 tiers.
    pub fn builtin() -> AllocationTable {
        let mut records = [None; Tier::COUNT];
        for (half_steps, profile, money_market, obligation, stocks) in BUILTIN_ALLOCATIONS {
            records[(half_steps - Tier::MIN.half_steps()) as usize] = Some(AllocationRecord {
                profile: *profile,
                money_market: *money_market,
                obligation: *obligation,
                stocks: *stocks,
            });
        }
        AllocationTable { records }
    }

    /// Build a table from override-file rows. Per-row integrity is enforced
    /// (exact half-step tier, known profile, no duplicates, weights sum 100);
    /// coverage gaps are allowed and left to [`AllocationTable::lookup`] and
    /// the table validator to report.
    pub fn from_rows(rows: &[AllocationRow]) -> Result<AllocationTable, AllocationTableError> {
        let mut records = [None; Tier::COUNT];

        for row in rows {
            let Some(tier) = Tier::from_value(row.risk_tier) else {
                return Err(AllocationTableError::InvalidTier(row.risk_tier));
            };
            let Some(profile) = RiskProfile::parse(&row.profile) else {
                return Err(AllocationTableError::UnknownProfile {
                    tier,
                    label: row.profile.clone(),
                });
            };
            let record = AllocationRecord {
                profile,
                money_market: row.money_market,
                obligation: row.obligation,
                stocks: row.stocks,
            };
            if record.weight_total() != 100 {
                return Err(AllocationTableError::WeightSum {
                    tier,
                    total: record.weight_total(),
                });
            }
            if records[tier.index()].replace(record).is_some() {
                return Err(AllocationTableError::DuplicateTier(tier));
            }
        }

        Ok(AllocationTable { records })
    }

    /// Allocation for a tier. A miss means the configured table has a gap,
    /// which is a server-side defect rather than a user input error.
    pub fn lookup(&self, tier: Tier) -> Result<&AllocationRecord, AllocationNotConfigured> {
        self.records[tier.index()]
            .as_ref()
            .ok_or(AllocationNotConfigured(tier))
    }

    /// Configured (tier, record) pairs in ascending tier order.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &AllocationRecord)> + '_ {
        Tier::all().zip(self.records.iter()).filter_map(|(tier, slot)| {
            slot.as_ref().map(|record| (tier, record))
        })
    }

    /// Number of tiers with a configured record.
    pub fn configured_count(&self) -> usize {
        self.records.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.configured_count() == Tier::COUNT
    }

    /// Row form, for serialization and validation reporting.
    pub fn to_rows(&self) -> Vec<AllocationRow> {
        self.iter()
            .map(|(tier, record)| AllocationRow {
                risk_tier: tier.value(),
                profile: record.profile.as_str().to_string(),
                money_market: record.money_market,
                obligation: record.obligation,
                stocks: record.stocks,
            })
            .collect()
    }
}

/// One tier's row in an override file (and in the `/api/allocations` payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRow {
    pub risk_tier: f64,
    pub profile: String,
    pub money_market: u32,
    pub obligation: u32,
    pub stocks: u32,
}

/// Top-level shape of `allocations.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationsFile {
    pub allocations: Vec<AllocationRow>,
}

/// Lookup miss: the table has no record for a tier the rescaler produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationNotConfigured(pub Tier);

impl fmt::Display for AllocationNotConfigured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "allocation table has no entry for tier {}", self.0)
    }
}

impl std::error::Error for AllocationNotConfigured {}

/// Per-row integrity defects in an override allocation table.
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationTableError {
    InvalidTier(f64),
    DuplicateTier(Tier),
    UnknownProfile { tier: Tier, label: String },
    WeightSum { tier: Tier, total: u64 },
}

impl fmt::Display for AllocationTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTier(value) => {
                write!(f, "'{value}' is not a half-step tier in [1.0, 10.0]")
            }
            Self::DuplicateTier(tier) => write!(f, "tier {tier} defined more than once"),
            Self::UnknownProfile { tier, label } => {
                write!(f, "tier {tier} has unknown profile label '{label}'")
            }
            Self::WeightSum { tier, total } => {
                write!(f, "tier {tier} weights sum to {total}, expected 100")
            }
        }
    }
}

impl std::error::Error for AllocationTableError {}
