//! Entity types and undoable actions for devtrack.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `AuditAction` is the closed set of logged mutations that have an inverse;
//! an audit row whose tag does not map to a variant cannot be undone.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Category of the row an audit entry targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Phase,
    Decision,
    Feature,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phase => "phase",
            Self::Decision => "decision",
            Self::Feature => "feature",
        }
    }

    /// Parse the `entity_type` column of an audit row.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "phase" => Some(Self::Phase),
            "decision" => Some(Self::Decision),
            "feature" => Some(Self::Feature),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// A logged mutation that has a compensating write.
///
/// Mutation commands have written both `verb_noun` and `noun_verb` spellings
/// over time, so [`AuditAction::from_tag`] accepts either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    #[serde(alias = "phase_complete")]
    CompletePhase,
    #[serde(alias = "decision_create")]
    CreateDecision,
    #[serde(alias = "decision_update")]
    UpdateDecision,
    #[serde(alias = "feature_update")]
    UpdateFeature,
}

impl AuditAction {
    pub const ALL: [Self; 4] = [
        Self::CompletePhase,
        Self::CreateDecision,
        Self::UpdateDecision,
        Self::UpdateFeature,
    ];

    /// Canonical tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CompletePhase => "complete_phase",
            Self::CreateDecision => "create_decision",
            Self::UpdateDecision => "update_decision",
            Self::UpdateFeature => "update_feature",
        }
    }

    /// Resolve a raw `action` column value, accepting both spellings.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "complete_phase" | "phase_complete" => Some(Self::CompletePhase),
            "create_decision" | "decision_create" => Some(Self::CreateDecision),
            "update_decision" | "decision_update" => Some(Self::UpdateDecision),
            "update_feature" | "feature_update" => Some(Self::UpdateFeature),
            _ => None,
        }
    }

    /// Entity category the action mutates.
    #[must_use]
    pub const fn entity_type(self) -> EntityType {
        match self {
            Self::CompletePhase => EntityType::Phase,
            Self::CreateDecision | Self::UpdateDecision => EntityType::Decision,
            Self::UpdateFeature => EntityType::Feature,
        }
    }

    /// Whether the inverse needs a parsed `old_data` snapshot.
    #[must_use]
    pub const fn requires_snapshot(self) -> bool {
        !matches!(self, Self::CreateDecision)
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a raw action tag records the creation of its target.
///
/// Covers tags without an inverse too (e.g. `create_phase`), since
/// pre-checks run against whatever the log holds.
#[must_use]
pub fn is_creation_tag(tag: &str) -> bool {
    tag == "create" || tag.starts_with("create_") || tag.ends_with("_create")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val: $ty = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let back: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(back, val);
            }
        };
    }

    test_serde_roundtrip!(entity_phase, EntityType, EntityType::Phase, "phase");
    test_serde_roundtrip!(
        entity_feature,
        EntityType,
        EntityType::Feature,
        "feature"
    );
    test_serde_roundtrip!(
        action_complete_phase,
        AuditAction,
        AuditAction::CompletePhase,
        "complete_phase"
    );
    test_serde_roundtrip!(
        action_update_feature,
        AuditAction,
        AuditAction::UpdateFeature,
        "update_feature"
    );

    #[rstest]
    #[case("complete_phase", AuditAction::CompletePhase)]
    #[case("phase_complete", AuditAction::CompletePhase)]
    #[case("create_decision", AuditAction::CreateDecision)]
    #[case("decision_create", AuditAction::CreateDecision)]
    #[case("update_decision", AuditAction::UpdateDecision)]
    #[case("decision_update", AuditAction::UpdateDecision)]
    #[case("update_feature", AuditAction::UpdateFeature)]
    #[case("feature_update", AuditAction::UpdateFeature)]
    fn from_tag_accepts_both_spellings(#[case] tag: &str, #[case] expected: AuditAction) {
        assert_eq!(AuditAction::from_tag(tag), Some(expected));
    }

    #[test]
    fn serde_alias_matches_from_tag() {
        let parsed: AuditAction = serde_json::from_str("\"decision_update\"").unwrap();
        assert_eq!(parsed, AuditAction::UpdateDecision);
    }

    #[rstest]
    #[case("create")]
    #[case("update")]
    #[case("create_phase")]
    #[case("")]
    #[case("COMPLETE_PHASE")]
    fn from_tag_rejects_unknown(#[case] tag: &str) {
        assert_eq!(AuditAction::from_tag(tag), None);
    }

    #[test]
    fn canonical_tags_roundtrip_through_from_tag() {
        for action in AuditAction::ALL {
            assert_eq!(AuditAction::from_tag(action.as_str()), Some(action));
        }
    }

    #[test]
    fn action_entity_types() {
        assert_eq!(AuditAction::CompletePhase.entity_type(), EntityType::Phase);
        assert_eq!(
            AuditAction::CreateDecision.entity_type(),
            EntityType::Decision
        );
        assert_eq!(
            AuditAction::UpdateDecision.entity_type(),
            EntityType::Decision
        );
        assert_eq!(AuditAction::UpdateFeature.entity_type(), EntityType::Feature);
    }

    #[test]
    fn only_decision_create_skips_snapshot() {
        let without: Vec<_> = AuditAction::ALL
            .into_iter()
            .filter(|a| !a.requires_snapshot())
            .collect();
        assert_eq!(without, vec![AuditAction::CreateDecision]);
    }

    #[rstest]
    #[case("create_phase", true)]
    #[case("create_decision", true)]
    #[case("decision_create", true)]
    #[case("create", true)]
    #[case("update_decision", false)]
    #[case("complete_phase", false)]
    #[case("recreated", false)]
    fn creation_tags(#[case] tag: &str, #[case] expected: bool) {
        assert_eq!(is_creation_tag(tag), expected);
    }

    #[test]
    fn entity_type_from_tag() {
        assert_eq!(EntityType::from_tag("decision"), Some(EntityType::Decision));
        assert_eq!(EntityType::from_tag("category"), None);
    }
}
