//! Plan gating: whether a tenant may stream under its current plan.
//!
//! The plan is plain data ([`PlanType`]); every limit decision lives here as
//! pure functions of the tenant record and the current time.

use chrono::{DateTime, Utc};

use crate::db::{PlanType, Tenant};

/// Length of the trial window, and the longest single request a trial tenant may make.
pub const TRIAL_LIMIT_SECONDS: i64 = 30 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanDecision {
    Allowed,
    Denied(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    TenantInactive,
    TrialExpired,
    RequestExceedsTrialLimit,
}

impl DenyReason {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::TenantInactive => "Venue account is inactive",
            Self::TrialExpired => "Trial period has ended",
            Self::RequestExceedsTrialLimit => "Requested playback exceeds the trial limit",
        }
    }
}

/// Single-request bound: Trial allows at most [`TRIAL_LIMIT_SECONDS`], Paid is unlimited.
#[must_use]
pub const fn check_stream_limit(plan: PlanType, requested_playtime_secs: i64) -> bool {
    match plan {
        PlanType::Trial => requested_playtime_secs <= TRIAL_LIMIT_SECONDS,
        PlanType::Paid => true,
    }
}

/// Seconds left in the trial window, clamped at zero.
///
/// `None` for paid tenants, and for trial tenants without a recorded start.
#[must_use]
pub fn remaining_trial_seconds(tenant: &Tenant, now: DateTime<Utc>) -> Option<i64> {
    match (tenant.plan_type, tenant.trial_started_at) {
        (PlanType::Trial, Some(started)) => {
            let elapsed = (now - started).num_seconds();
            Some((TRIAL_LIMIT_SECONDS - elapsed).max(0))
        }
        _ => None,
    }
}

#[must_use]
pub fn trial_window_open(tenant: &Tenant, now: DateTime<Utc>) -> bool {
    remaining_trial_seconds(tenant, now).is_none_or(|remaining| remaining > 0)
}

/// Full streaming decision for one request.
#[must_use]
pub fn evaluate(
    tenant: &Tenant,
    requested_playtime_secs: i64,
    now: DateTime<Utc>,
    enforce_trial_window: bool,
) -> PlanDecision {
    if !tenant.is_active {
        return PlanDecision::Denied(DenyReason::TenantInactive);
    }
    if enforce_trial_window && !trial_window_open(tenant, now) {
        return PlanDecision::Denied(DenyReason::TrialExpired);
    }
    if !check_stream_limit(tenant.plan_type, requested_playtime_secs) {
        return PlanDecision::Denied(DenyReason::RequestExceedsTrialLimit);
    }
    PlanDecision::Allowed
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn trial_started(ago_secs: i64) -> Tenant {
        Tenant::new_trial("Corner Cafe", "Lisbon", Utc::now() - Duration::seconds(ago_secs))
    }

    fn paid() -> Tenant {
        let mut tenant = trial_started(0);
        tenant.change_plan(PlanType::Paid, Utc::now());
        tenant
    }

    #[test]
    fn test_trial_limit_boundary() {
        assert!(check_stream_limit(PlanType::Trial, 1800));
        assert!(!check_stream_limit(PlanType::Trial, 1801));
    }

    #[test]
    fn test_paid_is_unlimited() {
        assert!(check_stream_limit(PlanType::Paid, 999_999));
    }

    #[test]
    fn test_remaining_trial_seconds_fresh_trial() {
        let remaining = remaining_trial_seconds(&trial_started(0), Utc::now()).unwrap();
        assert!((1798..=1800).contains(&remaining));
    }

    #[test]
    fn test_remaining_trial_seconds_exactly_elapsed() {
        let now = Utc::now();
        let tenant = Tenant::new_trial("Corner Cafe", "Lisbon", now - Duration::seconds(1800));
        assert_eq!(remaining_trial_seconds(&tenant, now), Some(0));
    }

    #[test]
    fn test_remaining_trial_seconds_never_negative() {
        assert_eq!(remaining_trial_seconds(&trial_started(3600), Utc::now()), Some(0));
    }

    #[test]
    fn test_remaining_trial_seconds_paid_is_none() {
        assert_eq!(remaining_trial_seconds(&paid(), Utc::now()), None);
    }

    #[test]
    fn test_trial_window() {
        assert!(trial_window_open(&trial_started(60), Utc::now()));
        assert!(!trial_window_open(&trial_started(3600), Utc::now()));
        assert!(trial_window_open(&paid(), Utc::now()));
    }

    #[test]
    fn test_evaluate_denies_inactive_tenant() {
        let mut tenant = paid();
        tenant.is_active = false;
        assert_eq!(
            evaluate(&tenant, 60, Utc::now(), true),
            PlanDecision::Denied(DenyReason::TenantInactive)
        );
    }

    #[test]
    fn test_evaluate_expired_trial_depends_on_enforcement() {
        let tenant = trial_started(3600);
        assert_eq!(
            evaluate(&tenant, 60, Utc::now(), true),
            PlanDecision::Denied(DenyReason::TrialExpired)
        );
        assert_eq!(evaluate(&tenant, 60, Utc::now(), false), PlanDecision::Allowed);
    }

    #[test]
    fn test_evaluate_request_over_trial_limit() {
        assert_eq!(
            evaluate(&trial_started(0), 1801, Utc::now(), true),
            PlanDecision::Denied(DenyReason::RequestExceedsTrialLimit)
        );
        assert_eq!(evaluate(&paid(), 86_400, Utc::now(), true), PlanDecision::Allowed);
    }
}
