//! Compliance Gate
//!
//! Evaluates a submission's provenance attestations against the ethical
//! policy and admits or rejects it. The gate refuses to proceed without the
//! required attestations; deciding whether content is actually sacred is an
//! upstream curation responsibility.

pub mod rules;

pub use rules::{PolicyRule, RuleOutcome};

use crate::types::KnowledgeSubmission;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Admission decision for one submission
///
/// Created once by the gate and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceVerdict {
    admitted: bool,
    violated: BTreeSet<PolicyRule>,
    checks: Vec<RuleOutcome>,
    attribution: Option<String>,
    evaluated_at: DateTime<Utc>,
}

impl ComplianceVerdict {
    pub(crate) fn from_checks(
        checks: Vec<RuleOutcome>,
        attribution: Option<String>,
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        let violated: BTreeSet<PolicyRule> = checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.rule)
            .collect();

        Self {
            admitted: violated.is_empty(),
            violated,
            checks,
            attribution,
            evaluated_at,
        }
    }

    pub fn admitted(&self) -> bool {
        self.admitted
    }

    /// Violated rules (empty when admitted)
    pub fn violated(&self) -> &BTreeSet<PolicyRule> {
        &self.violated
    }

    /// Rules that were checked and passed
    pub fn satisfied(&self) -> impl Iterator<Item = PolicyRule> + '_ {
        self.checks.iter().filter(|c| c.passed).map(|c| c.rule)
    }

    pub fn checks(&self) -> &[RuleOutcome] {
        &self.checks
    }

    /// Attested knowledge source, as evaluated
    pub fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }

    pub fn evaluated_at(&self) -> DateTime<Utc> {
        self.evaluated_at
    }
}

/// Policy-check component admitting or rejecting submissions
#[derive(Debug, Clone)]
pub struct ComplianceGate {
    rules: Vec<PolicyRule>,
}

impl Default for ComplianceGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplianceGate {
    /// Gate enforcing every policy rule
    pub fn new() -> Self {
        Self {
            rules: PolicyRule::ALL.to_vec(),
        }
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    /// Evaluate a submission, stamping the verdict with the current time
    pub fn evaluate(&self, submission: &KnowledgeSubmission) -> ComplianceVerdict {
        self.evaluate_at(submission, ethnopath_common::time::now())
    }

    /// Evaluate a submission with an explicit evaluation timestamp
    pub fn evaluate_at(
        &self,
        submission: &KnowledgeSubmission,
        evaluated_at: DateTime<Utc>,
    ) -> ComplianceVerdict {
        let checks: Vec<RuleOutcome> = self
            .rules
            .iter()
            .map(|rule| rule.evaluate(&submission.provenance))
            .collect();

        let attribution = submission
            .provenance
            .attribution
            .as_ref()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        let verdict = ComplianceVerdict::from_checks(checks, attribution, evaluated_at);

        if verdict.admitted() {
            debug!(plant = %submission.plant.common_name, "Compliance gate admitted submission");
        } else {
            warn!(
                plant = %submission.plant.common_name,
                violated = ?verdict.violated().iter().map(|r| r.name()).collect::<Vec<_>>(),
                "Compliance gate rejected submission"
            );
        }

        verdict
    }
}
