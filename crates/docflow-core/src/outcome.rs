//! Decision presenter: map a routing decision to a user-facing outcome.
//!
//! First-match-wins ladder, evaluated in a fixed order so ties always
//! resolve the same way. High risk is checked before the amount rule —
//! a document that is both high risk and over the amount ceiling shows
//! the rejection label, never the finance one.

use serde::{Deserialize, Serialize};

use crate::routing::{RoutingDecision, RoutingVerdict};

/// Visual tone hint for the outcome badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Info,
}

/// User-facing label and description for a routing decision.
///
/// Presentation-only: derived deterministically, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub label: String,
    pub tone: Tone,
    pub description: String,
}

/// Derive the display outcome for an optional routing decision.
///
/// Ladder order: no decision → pending; auto-approve; high risk; amount
/// exceeded; otherwise manager approval.
pub fn derive_decision_outcome(decision: Option<&RoutingDecision>) -> DecisionOutcome {
    let Some(decision) = decision else {
        return DecisionOutcome {
            label: "Pending Decision".to_string(),
            tone: Tone::Info,
            description: "Awaiting analysis results.".to_string(),
        };
    };

    let (label, tone) = if decision.decision == RoutingVerdict::AutoApprove {
        ("Auto-Approve", Tone::Success)
    } else if decision.high_risk {
        ("Reject / Manual Review", Tone::Danger)
    } else if decision.amount_exceeds_threshold {
        ("Finance Approval", Tone::Warning)
    } else {
        ("Manager Approval", Tone::Info)
    };

    DecisionOutcome {
        label: label.to_string(),
        tone,
        description: decision.reason.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutingPolicy;
    use crate::routing::evaluate_routing_rules;

    fn policy() -> RoutingPolicy {
        RoutingPolicy {
            amount_threshold: 10_000.0,
            high_risk_levels: vec!["high".into(), "critical".into()],
            confidence_threshold: 0.8,
        }
    }

    #[test]
    fn no_decision_is_pending() {
        let outcome = derive_decision_outcome(None);
        assert_eq!(outcome.label, "Pending Decision");
        assert_eq!(outcome.tone, Tone::Info);
    }

    #[test]
    fn small_clean_amount_auto_approves() {
        let d = evaluate_routing_rules(Some(5.0), Some("low"), &policy());
        let outcome = derive_decision_outcome(Some(&d));
        assert_eq!(outcome.label, "Auto-Approve");
        assert_eq!(outcome.tone, Tone::Success);
    }

    #[test]
    fn large_amount_goes_to_finance() {
        let d = evaluate_routing_rules(Some(999_999.0), None, &policy());
        let outcome = derive_decision_outcome(Some(&d));
        assert_eq!(outcome.label, "Finance Approval");
        assert_eq!(outcome.tone, Tone::Warning);
    }

    #[test]
    fn high_risk_dominates_amount() {
        let d = evaluate_routing_rules(Some(999_999.0), Some("critical"), &policy());
        assert!(d.high_risk && d.amount_exceeds_threshold);
        let outcome = derive_decision_outcome(Some(&d));
        assert_eq!(outcome.label, "Reject / Manual Review");
        assert_eq!(outcome.tone, Tone::Danger);
    }

    #[test]
    fn description_carries_the_reason() {
        let d = evaluate_routing_rules(Some(20_000.0), None, &policy());
        let outcome = derive_decision_outcome(Some(&d));
        assert_eq!(outcome.description, d.reason);
    }

    #[test]
    fn review_without_fired_rules_is_manager_approval() {
        // Synthesized decision: requires review but neither rule flagged.
        // Falls through to the final ladder rung.
        let d = RoutingDecision {
            decision: RoutingVerdict::RequiresReview,
            amount_exceeds_threshold: false,
            high_risk: false,
            reason: "manual hold".into(),
            amount: None,
            risk_level: None,
        };
        let outcome = derive_decision_outcome(Some(&d));
        assert_eq!(outcome.label, "Manager Approval");
    }
}
