use super::*;

fn user(tier: Tier, trial: bool, days: u32) -> UserProfile {
    UserProfile {
        id: 1,
        username: "anna".to_owned(),
        email: "anna@example.nl".to_owned(),
        role: Role::User,
        tier,
        is_active: true,
        is_trial_active: trial,
        days_left_in_trial: days,
        created_at: None,
    }
}

// =============================================================================
// tier_limits
// =============================================================================

#[test]
fn basic_limits_match_table() {
    assert_eq!(
        tier_limits(Tier::Basic),
        TierLimits { documents: Limit::Bounded(50), queries_per_day: Limit::Bounded(100) }
    );
}

#[test]
fn premium_and_white_label_are_unlimited() {
    assert_eq!(tier_limits(Tier::Premium), TierLimits::UNLIMITED);
    assert_eq!(tier_limits(Tier::WhiteLabel), TierLimits::UNLIMITED);
}

#[test]
fn free_tier_gets_smallest_caps() {
    assert_eq!(
        tier_limits(Tier::Free),
        TierLimits { documents: Limit::Bounded(10), queries_per_day: Limit::Bounded(20) }
    );
}

#[test]
fn limit_allows_until_cap() {
    assert!(Limit::Bounded(2).allows(1));
    assert!(!Limit::Bounded(2).allows(2));
    assert!(Limit::Unlimited.allows(u32::MAX));
}

#[test]
fn limits_serialize_with_unlimited_sentinel() {
    let json = serde_json::to_value(TierLimits::UNLIMITED).unwrap();
    assert_eq!(json, serde_json::json!({ "documents": "unlimited", "queries_per_day": "unlimited" }));
    let json = serde_json::to_value(tier_limits(Tier::Basic)).unwrap();
    assert_eq!(json, serde_json::json!({ "documents": 50, "queries_per_day": 100 }));
}

// =============================================================================
// derived flags
// =============================================================================

#[test]
fn anonymous_has_no_flags_and_basic_tier() {
    assert!(!is_authenticated(None));
    assert!(!is_admin(None));
    assert!(!is_in_trial(None));
    assert_eq!(effective_tier(None), Tier::Basic);
    assert_eq!(effective_limits(None), tier_limits(Tier::Basic));
}

#[test]
fn admin_requires_admin_role() {
    let mut u = user(Tier::Basic, false, 0);
    assert!(!is_admin(Some(&u)));
    u.role = Role::Admin;
    assert!(is_admin(Some(&u)));
}

#[test]
fn trial_requires_flag_and_days_left() {
    assert!(is_in_trial(Some(&user(Tier::Basic, true, 3))));
    assert!(!is_in_trial(Some(&user(Tier::Basic, true, 0))));
    assert!(!is_in_trial(Some(&user(Tier::Basic, false, 5))));
}

#[test]
fn trial_overrides_stored_tier() {
    for tier in [Tier::Free, Tier::Basic, Tier::Premium, Tier::WhiteLabel] {
        assert_eq!(effective_tier(Some(&user(tier, true, 1))), Tier::Premium);
    }
}

#[test]
fn effective_tier_falls_back_to_stored_tier() {
    assert_eq!(effective_tier(Some(&user(Tier::WhiteLabel, false, 0))), Tier::WhiteLabel);
    assert_eq!(effective_tier(Some(&user(Tier::Free, true, 0))), Tier::Free);
    assert_eq!(effective_limits(Some(&user(Tier::Free, false, 0))).documents, Limit::Bounded(10));
}

#[test]
fn tier_label_marks_trial() {
    assert_eq!(tier_label(&user(Tier::Basic, true, 4)), "premium (trial)");
    assert_eq!(tier_label(&user(Tier::Basic, false, 0)), "basic");
}

// =============================================================================
// trial_status
// =============================================================================

#[test]
fn trial_status_classifies_days_left() {
    assert_eq!(trial_status(&user(Tier::Basic, false, 10)), TrialStatus::Inactive);
    assert_eq!(trial_status(&user(Tier::Basic, true, 8)), TrialStatus::Active);
    assert_eq!(trial_status(&user(Tier::Basic, true, 7)), TrialStatus::Ending);
    assert_eq!(trial_status(&user(Tier::Basic, true, 1)), TrialStatus::Ending);
    assert_eq!(trial_status(&user(Tier::Basic, true, 0)), TrialStatus::Expired);
}
