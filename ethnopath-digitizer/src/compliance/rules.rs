// Compliance Rules - Named Ethical Policy Checks
//
// Each rule is evaluated independently against the submission's provenance
// attestations. Rules never inspect free text: sacredness and public status
// are attested upstream by curation.

use crate::types::{is_blank, SourceMetadata};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of ethical policy rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyRule {
    /// Content must not be attested as non-public
    PublicKnowledgeOnly,
    /// Content must not be flagged sacred/restricted
    SacredKnowledgeExcluded,
    /// A non-empty knowledge source must be given
    AttributionRequired,
}

impl PolicyRule {
    /// Every rule, in evaluation order
    pub const ALL: [PolicyRule; 3] = [
        PolicyRule::PublicKnowledgeOnly,
        PolicyRule::SacredKnowledgeExcluded,
        PolicyRule::AttributionRequired,
    ];

    /// Stable rule name used in verdicts and rejection logs
    pub fn name(&self) -> &'static str {
        match self {
            PolicyRule::PublicKnowledgeOnly => "public_knowledge_only",
            PolicyRule::SacredKnowledgeExcluded => "sacred_knowledge_excluded",
            PolicyRule::AttributionRequired => "attribution_required",
        }
    }

    /// Evaluate this rule against provenance metadata
    pub fn evaluate(&self, provenance: &SourceMetadata) -> RuleOutcome {
        match self {
            PolicyRule::PublicKnowledgeOnly => check_public_knowledge_only(provenance),
            PolicyRule::SacredKnowledgeExcluded => check_sacred_knowledge_excluded(provenance),
            PolicyRule::AttributionRequired => check_attribution_required(provenance),
        }
    }
}

impl fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Individual rule evaluation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule: PolicyRule,
    pub passed: bool,
    pub message: Option<String>,
}

impl RuleOutcome {
    fn pass(rule: PolicyRule) -> Self {
        Self {
            rule,
            passed: true,
            message: None,
        }
    }

    fn fail(rule: PolicyRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            passed: false,
            message: Some(message.into()),
        }
    }
}

/// `public_knowledge_only`: only an explicit non-public attestation fails
///
/// Unspecified admits: the flag is advisory metadata, not a classifier.
pub fn check_public_knowledge_only(provenance: &SourceMetadata) -> RuleOutcome {
    match provenance.public_knowledge {
        Some(false) => RuleOutcome::fail(
            PolicyRule::PublicKnowledgeOnly,
            "Source attests the content is not publicly documented",
        ),
        Some(true) | None => RuleOutcome::pass(PolicyRule::PublicKnowledgeOnly),
    }
}

/// `sacred_knowledge_excluded`: fails when the source flags sacred content
pub fn check_sacred_knowledge_excluded(provenance: &SourceMetadata) -> RuleOutcome {
    if provenance.sacred {
        RuleOutcome::fail(
            PolicyRule::SacredKnowledgeExcluded,
            "Source metadata flags the content as sacred or restricted",
        )
    } else {
        RuleOutcome::pass(PolicyRule::SacredKnowledgeExcluded)
    }
}

/// `attribution_required`: fails on missing or blank provenance string
pub fn check_attribution_required(provenance: &SourceMetadata) -> RuleOutcome {
    if is_blank(provenance.attribution.as_deref()) {
        RuleOutcome::fail(
            PolicyRule::AttributionRequired,
            "Submission carries no knowledge-source attribution",
        )
    } else {
        RuleOutcome::pass(PolicyRule::AttributionRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributed() -> SourceMetadata {
        SourceMetadata {
            attribution: Some("Ethnobotanical literature".into()),
            public_knowledge: None,
            sacred: false,
        }
    }

    #[test]
    fn test_public_knowledge_unspecified_admits() {
        assert!(check_public_knowledge_only(&attributed()).passed);
    }

    #[test]
    fn test_public_knowledge_explicit_false_fails() {
        let provenance = SourceMetadata {
            public_knowledge: Some(false),
            ..attributed()
        };
        let outcome = check_public_knowledge_only(&provenance);
        assert!(!outcome.passed);
        assert!(outcome.message.is_some());
    }

    #[test]
    fn test_sacred_flag_fails() {
        let provenance = SourceMetadata {
            sacred: true,
            ..attributed()
        };
        assert!(!check_sacred_knowledge_excluded(&provenance).passed);
        assert!(check_sacred_knowledge_excluded(&attributed()).passed);
    }

    #[test]
    fn test_blank_attribution_fails() {
        let provenance = SourceMetadata {
            attribution: Some("   ".into()),
            ..attributed()
        };
        assert!(!check_attribution_required(&provenance).passed);
        assert!(!check_attribution_required(&SourceMetadata::default()).passed);
    }

    #[test]
    fn test_rule_names() {
        let names: Vec<_> = PolicyRule::ALL.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "public_knowledge_only",
                "sacred_knowledge_excluded",
                "attribution_required"
            ]
        );
    }
}
