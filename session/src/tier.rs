//! Authorization facts derived from the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every consumer that needs "is this an admin", "is this a trial", or "how
//! many documents may I upload" calls into this module instead of
//! re-deriving it. All functions are pure over `Option<&UserProfile>` so the
//! same answers come out of a live session snapshot and an admin listing row.

#[cfg(test)]
#[path = "tier_test.rs"]
mod tier_test;

use std::fmt;

use serde::Serialize;

use crate::types::{Role, Tier, UserProfile};

/// Days left at or below which an active trial is reported as ending.
pub const TRIAL_ENDING_DAYS: u32 = 7;

// =============================================================================
// LIMITS
// =============================================================================

/// A usage cap. `Unlimited` is the sentinel for tiers without a cap.
///
/// Serializes as a plain number, or the string `"unlimited"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limit {
    Bounded(u32),
    Unlimited,
}

impl Serialize for Limit {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bounded(max) => serializer.serialize_u32(*max),
            Self::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl Limit {
    /// Whether `used` more items still fit under this cap.
    #[must_use]
    pub fn allows(self, used: u32) -> bool {
        match self {
            Self::Bounded(max) => used < max,
            Self::Unlimited => true,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{max}"),
            Self::Unlimited => f.write_str("unlimited"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TierLimits {
    pub documents: Limit,
    pub queries_per_day: Limit,
}

impl TierLimits {
    pub const UNLIMITED: Self = Self { documents: Limit::Unlimited, queries_per_day: Limit::Unlimited };
}

/// Static limit table. Free and unrecognized tiers get the smallest caps.
#[must_use]
pub fn tier_limits(tier: Tier) -> TierLimits {
    match tier {
        Tier::Basic => TierLimits { documents: Limit::Bounded(50), queries_per_day: Limit::Bounded(100) },
        Tier::Premium | Tier::WhiteLabel => TierLimits::UNLIMITED,
        Tier::Free => TierLimits { documents: Limit::Bounded(10), queries_per_day: Limit::Bounded(20) },
    }
}

// =============================================================================
// DERIVED FLAGS
// =============================================================================

#[must_use]
pub fn is_authenticated(user: Option<&UserProfile>) -> bool {
    user.is_some()
}

#[must_use]
pub fn is_admin(user: Option<&UserProfile>) -> bool {
    user.is_some_and(|u| u.role == Role::Admin)
}

/// A trial counts only while the flag is set and at least one day remains.
#[must_use]
pub fn is_in_trial(user: Option<&UserProfile>) -> bool {
    user.is_some_and(|u| u.is_trial_active && u.days_left_in_trial > 0)
}

/// Trials grant premium regardless of the stored tier. No user means basic.
#[must_use]
pub fn effective_tier(user: Option<&UserProfile>) -> Tier {
    if is_in_trial(user) {
        return Tier::Premium;
    }
    user.map_or(Tier::Basic, |u| u.tier)
}

#[must_use]
pub fn effective_limits(user: Option<&UserProfile>) -> TierLimits {
    tier_limits(effective_tier(user))
}

/// Short tier description for listings, e.g. `"premium (trial)"`.
#[must_use]
pub fn tier_label(user: &UserProfile) -> String {
    if is_in_trial(Some(user)) {
        format!("{} (trial)", Tier::Premium)
    } else {
        user.tier.to_string()
    }
}

// =============================================================================
// TRIAL STATUS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    /// No trial flag on the account.
    Inactive,
    /// More than [`TRIAL_ENDING_DAYS`] days left.
    Active,
    /// Between one and [`TRIAL_ENDING_DAYS`] days left.
    Ending,
    /// Flag still set but no days left.
    Expired,
}

#[must_use]
pub fn trial_status(user: &UserProfile) -> TrialStatus {
    if !user.is_trial_active {
        return TrialStatus::Inactive;
    }
    match user.days_left_in_trial {
        0 => TrialStatus::Expired,
        days if days > TRIAL_ENDING_DAYS => TrialStatus::Active,
        _ => TrialStatus::Ending,
    }
}
