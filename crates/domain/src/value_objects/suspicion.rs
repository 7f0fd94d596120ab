//! Suspicion scale and tiers
//!
//! Engines score suspicion on different scales (a small count in some
//! builds, a percentage in others). The scale is configuration; tiers are
//! derived from it and never hard-code a bound.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Display tier for a character's suspicion level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspicionTier {
    /// Nobody has raised suspicion yet
    Clear,
    /// Some suspicion, below the high threshold
    Low,
    /// At or above the high threshold
    High,
}

/// Engine-defined suspicion scale
///
/// # Examples
///
/// ```
/// use phantomlog_domain::{SuspicionScale, SuspicionTier};
///
/// let scale = SuspicionScale::new(100, 50).unwrap();
/// assert_eq!(scale.tier(0), SuspicionTier::Clear);
/// assert_eq!(scale.tier(49), SuspicionTier::Low);
/// assert_eq!(scale.tier(50), SuspicionTier::High);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspicionScale {
    max: u32,
    high_threshold: u32,
}

impl SuspicionScale {
    pub fn new(max: u32, high_threshold: u32) -> Result<Self, DomainError> {
        if max == 0 {
            return Err(DomainError::validation("suspicion scale max must be positive"));
        }
        if high_threshold == 0 || high_threshold > max {
            return Err(DomainError::validation(format!(
                "suspicion high threshold must be within 1..={}, got {}",
                max, high_threshold
            )));
        }
        Ok(Self {
            max,
            high_threshold,
        })
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn high_threshold(&self) -> u32 {
        self.high_threshold
    }

    pub fn tier(&self, level: u32) -> SuspicionTier {
        if level == 0 {
            SuspicionTier::Clear
        } else if level >= self.high_threshold {
            SuspicionTier::High
        } else {
            SuspicionTier::Low
        }
    }

    /// Fill ratio for meters, clamped to `0.0..=1.0`.
    pub fn ratio(&self, level: u32) -> f32 {
        (level.min(self.max) as f32) / (self.max as f32)
    }
}

impl Default for SuspicionScale {
    fn default() -> Self {
        Self {
            max: 10,
            high_threshold: 5,
        }
    }
}
