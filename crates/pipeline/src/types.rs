//! Shared value types for the ad-script pipeline domain.
//!
//! `QualityScore` is the only one with an invariant worth enforcing: the
//! evaluator's scale is `[0.0, 5.0]` and decoding rejects anything else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tokens billed for one side of a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenCount(u64);

impl TokenCount {
    pub fn new(count: u64) -> Self {
        Self(count)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::ops::Add for TokenCount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

// ---------------------------------------------------------------------------
// Score types
// ---------------------------------------------------------------------------

/// A script quality score on the evaluator's five-point scale, `[0.0, 5.0]`.
///
/// Deserialisation rejects out-of-range values, so a structured LLM response
/// carrying a score of `7` fails decoding instead of reaching the router.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct QualityScore(f64);

impl QualityScore {
    /// Upper bound of the scale.
    pub const MAX: f64 = 5.0;

    /// Creates a [`QualityScore`], returning `None` if `value` is outside
    /// the valid range `[0.0, 5.0]`.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && (0.0..=Self::MAX).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the score as an `f64` in `[0.0, 5.0]`.
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for QualityScore {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("score {value} is outside [0.0, {}]", Self::MAX))
    }
}

impl From<QualityScore> for f64 {
    fn from(score: QualityScore) -> Self {
        score.0
    }
}

impl std::fmt::Display for QualityScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}/{:.1}", self.0, Self::MAX)
    }
}

/// When a campaign session started, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_score_bounds() {
        assert!(QualityScore::new(0.0).is_some());
        assert!(QualityScore::new(5.0).is_some());
        assert!(QualityScore::new(5.01).is_none());
        assert!(QualityScore::new(-0.1).is_none());
        assert!(QualityScore::new(f64::NAN).is_none());
    }

    #[test]
    fn quality_score_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<QualityScore>("4.5").is_ok());
        assert!(serde_json::from_str::<QualityScore>("7").is_err());
    }

    #[test]
    fn quality_score_display_uses_five_point_scale() {
        let score = QualityScore::new(4.3).unwrap();
        assert_eq!(score.to_string(), "4.3/5.0");
    }
}
