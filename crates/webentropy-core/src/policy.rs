//! Mandatory-source policy engine.
//!
//! Given the full set of outcomes, decide whether the invocation proceeds to
//! digest computation or terminates. Conditions are evaluated in a fixed
//! priority order so the reported error always names the most fundamental
//! unmet requirement, even when several conditions hold at once.

use crate::harvest::HarvestResult;

/// Invocations with this many failed sources (or more) are rejected, even
/// when every mandatory condition holds.
pub const MAX_FAILED_SOURCES: usize = 3;

/// Terminal failure classification for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFailure {
    /// Neither the external randomness anchor nor the local CSPRNG produced
    /// bytes.
    CoreUnavailable,
    /// No source in the Radar ranking-aggregate group succeeded.
    RadarUnavailable,
    /// Too many sources failed, or nothing produced usable bytes.
    TooManyFailures,
}

impl std::fmt::Display for PolicyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CoreUnavailable => write!(f, "core entropy sources unavailable"),
            Self::RadarUnavailable => write!(f, "radar entropy unavailable"),
            Self::TooManyFailures => write!(f, "too many entropy sources failed"),
        }
    }
}

/// Apply the three conditions in priority order; first match wins.
pub fn evaluate(result: &HarvestResult) -> Result<(), PolicyFailure> {
    if !result.anchor_ok() && !result.local_ok() {
        return Err(PolicyFailure::CoreUnavailable);
    }
    if !result.radar_ok() {
        return Err(PolicyFailure::RadarUnavailable);
    }
    if result.failed_count() >= MAX_FAILED_SOURCES || result.successful_bytes() == 0 {
        return Err(PolicyFailure::TooManyFailures);
    }
    Ok(())
}
