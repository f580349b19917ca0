//! Routing rule engine.
//!
//! `evaluate_routing_rules` is a pure function: the same analysis fields and
//! policy always produce the same verdict. No hidden state, no clock, no
//! configuration reads — both thresholds come in as arguments.

use serde::{Deserialize, Serialize};

use crate::config::RoutingPolicy;

/// The routing verdict for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingVerdict {
    AutoApprove,
    RequiresReview,
}

impl RoutingVerdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoApprove => "AUTO_APPROVE",
            Self::RequiresReview => "REQUIRES_REVIEW",
        }
    }
}

/// Verdict plus the facts that produced it, for display and audit.
///
/// Ephemeral — recomputed on demand from an analysis and the configured
/// policy, never persisted by the pipeline itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDecision {
    pub decision: RoutingVerdict,
    pub amount_exceeds_threshold: bool,
    pub high_risk: bool,
    pub reason: String,
    pub amount: Option<f64>,
    pub risk_level: Option<String>,
}

/// Evaluate the configured thresholds against one analysis.
///
/// An amount strictly greater than the policy ceiling, or a risk level in
/// the policy's high-risk set (case-insensitive), routes the document to
/// review. The reason string concatenates whichever rules fired, joined by
/// `" and "`.
pub fn evaluate_routing_rules(
    amount: Option<f64>,
    risk_level: Option<&str>,
    policy: &RoutingPolicy,
) -> RoutingDecision {
    let amount = amount.filter(|a| a.is_finite());
    let amount_exceeds_threshold = amount.is_some_and(|a| a > policy.amount_threshold);

    let risk_lower = risk_level.map(str::to_lowercase).unwrap_or_default();
    let high_risk = !risk_lower.is_empty()
        && policy
            .high_risk_levels
            .iter()
            .any(|l| l.eq_ignore_ascii_case(&risk_lower));

    let mut reasons = Vec::new();
    if amount_exceeds_threshold {
        reasons.push(format!(
            "Amount {} is greater than {}",
            amount.unwrap_or_default(),
            policy.amount_threshold
        ));
    }
    if high_risk {
        reasons.push(format!("Risk level {risk_lower} requires review"));
    }
    let reason = if reasons.is_empty() {
        "Within automatic approval thresholds".to_string()
    } else {
        reasons.join(" and ")
    };

    let decision = if amount_exceeds_threshold || high_risk {
        RoutingVerdict::RequiresReview
    } else {
        RoutingVerdict::AutoApprove
    };

    RoutingDecision {
        decision,
        amount_exceeds_threshold,
        high_risk,
        reason,
        amount,
        risk_level: risk_level.map(str::to_string),
    }
}
