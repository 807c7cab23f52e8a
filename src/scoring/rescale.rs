//! Linear rescaling of raw questionnaire scores onto the 1.0-10.0 risk tier
//! range in 0.5 steps. The formula and clamps mirror the upstream service
//! behavior exactly.

use std::fmt;

/// Theoretical raw-score domain. The canonical scoring key cannot produce a
/// total below 13, but the rescaler's floor stays at 0.
pub const RAW_SCORE_MIN: f64 = 0.0;
pub const RAW_SCORE_MAX: f64 = 47.0;

pub const TIER_VALUE_MIN: f64 = 1.0;
pub const TIER_VALUE_MAX: f64 = 10.0;

/// Normalized risk tier: one of 1.0, 1.5, ..., 10.0. Stored as integer
/// half-steps (tier value x 2, range 2..=20) so allocation lookups never
/// depend on floating-point equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tier(u8);

impl Tier {
    pub const MIN: Tier = Tier(2);
    pub const MAX: Tier = Tier(20);

    /// Number of distinct tiers.
    pub const COUNT: usize = 19;

    /// Build from half-steps (tier value x 2). None outside 2..=20.
    pub fn from_half_steps(half_steps: u8) -> Option<Tier> {
        if (Self::MIN.0..=Self::MAX.0).contains(&half_steps) {
            Some(Tier(half_steps))
        } else {
            None
        }
    }

    /// Build from an exact tier value such as 7.5. None when the value is not
    /// a half-step inside [1.0, 10.0]. Half-step values are exactly
    /// representable in an f64, so no tolerance is involved.
    pub fn from_value(value: f64) -> Option<Tier> {
        let doubled = value * 2.0;
        if !doubled.is_finite() || doubled.fract() != 0.0 {
            return None;
        }
        let half_steps = doubled as i64;
        if !(Self::MIN.0 as i64..=Self::MAX.0 as i64).contains(&half_steps) {
            return None;
        }
        Some(Tier(half_steps as u8))
    }

    /// Nearest tier to an arbitrary value: round to the nearest 0.5 with ties
    /// away from zero (x.25 and x.75 round up), then clamp into [1.0, 10.0].
    pub fn nearest(value: f64) -> Tier {
        let half_steps = (value * 2.0).round() as i64;
        let pinned = half_steps.clamp(Self::MIN.0 as i64, Self::MAX.0 as i64);
        Tier(pinned as u8)
    }

    pub fn half_steps(self) -> u8 {
        self.0
    }

    /// Zero-based slot for dense table storage; `Tier::MIN` maps to 0.
    pub fn index(self) -> usize {
        (self.0 - Self::MIN.0) as usize
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    /// All 19 tiers in ascending order.
    pub fn all() -> impl Iterator<Item = Tier> {
        (Self::MIN.0..=Self::MAX.0).map(Tier)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

/// Rescale a raw score from [0, 47] onto the tier range:
/// `y = 1.0 + raw * (10.0 - 1.0) / (47.0 - 0.0)`, quantized to the nearest
/// 0.5 and clamped. Scores at or below the domain floor pin to tier 1.0,
/// scores at or above the ceiling to tier 10.0. Cannot fail.
pub fn rescale(raw_score: f64) -> Tier {
    if raw_score <= RAW_SCORE_MIN {
        return Tier::MIN;
    }
    if raw_score >= RAW_SCORE_MAX {
        return Tier::MAX;
    }

    let unrounded = TIER_VALUE_MIN
        + raw_score * (TIER_VALUE_MAX - TIER_VALUE_MIN) / (RAW_SCORE_MAX - RAW_SCORE_MIN);
    Tier::nearest(unrounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_rounds_to_half_steps_with_ties_away_from_zero() {
        assert_eq!(Tier::nearest(5.55).value(), 5.5);
        assert_eq!(Tier::nearest(5.74).value(), 5.5);
        assert_eq!(Tier::nearest(5.75).value(), 6.0);
        assert_eq!(Tier::nearest(5.25).value(), 5.5);
        assert_eq!(Tier::nearest(5.24).value(), 5.0);
    }

    #[test]
    fn nearest_clamps_out_of_range_values() {
        assert_eq!(Tier::nearest(0.2), Tier::MIN);
        assert_eq!(Tier::nearest(-3.0), Tier::MIN);
        assert_eq!(Tier::nearest(10.3), Tier::MAX);
        assert_eq!(Tier::nearest(250.0), Tier::MAX);
    }

    #[test]
    fn from_value_accepts_only_in_range_half_steps() {
        assert_eq!(Tier::from_value(7.5).map(Tier::half_steps), Some(15));
        assert_eq!(Tier::from_value(1.0), Some(Tier::MIN));
        assert_eq!(Tier::from_value(10.0), Some(Tier::MAX));
        assert_eq!(Tier::from_value(1.25), None);
        assert_eq!(Tier::from_value(0.5), None);
        assert_eq!(Tier::from_value(10.5), None);
        assert_eq!(Tier::from_value(f64::NAN), None);
    }

    #[test]
    fn all_yields_nineteen_ascending_tiers() {
        let tiers: Vec<Tier> = Tier::all().collect();
        assert_eq!(tiers.len(), Tier::COUNT);
        assert_eq!(tiers.first(), Some(&Tier::MIN));
        assert_eq!(tiers.last(), Some(&Tier::MAX));
        assert!(tiers.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn display_formats_one_decimal() {
        assert_eq!(Tier::MIN.to_string(), "1.0");
        assert_eq!(Tier::nearest(7.5).to_string(), "7.5");
    }
}
