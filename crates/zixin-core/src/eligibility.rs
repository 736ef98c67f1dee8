//! Eligibility gate over normalized profile attributes.

use serde::{Deserialize, Serialize};

use crate::profile::{NormalizedProfile, ProfileAttributes};

/// Numeric profile attributes a predicate can test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Followers,
    Following,
    PublicRepos,
    PublicGists,
}

impl NumericField {
    pub fn name(&self) -> &'static str {
        match self {
            NumericField::Followers => "followers",
            NumericField::Following => "following",
            NumericField::PublicRepos => "public_repos",
            NumericField::PublicGists => "public_gists",
        }
    }

    /// Read the field from a profile's attributes.
    pub fn read(&self, attributes: &ProfileAttributes) -> Option<u64> {
        match self {
            NumericField::Followers => attributes.followers,
            NumericField::Following => attributes.following,
            NumericField::PublicRepos => attributes.public_repos,
            NumericField::PublicGists => attributes.public_gists,
        }
    }
}

/// A named "field >= minimum" condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPredicate {
    pub field: NumericField,
    pub minimum: u64,
}

impl EligibilityPredicate {
    pub fn new(field: NumericField, minimum: u64) -> Self {
        Self { field, minimum }
    }

    /// Shorthand for a minimum follower count.
    pub fn min_followers(minimum: u64) -> Self {
        Self::new(NumericField::Followers, minimum)
    }

    /// Human-readable predicate name, e.g. `followers >= 10`.
    pub fn name(&self) -> String {
        format!("{} >= {}", self.field.name(), self.minimum)
    }
}

/// Outcome of evaluating a predicate against one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    /// Whether the profile satisfies the predicate.
    pub eligible: bool,

    /// Name of the predicate evaluated.
    pub predicate: String,

    /// Value read from the profile; `None` when the provider did not report it.
    pub observed: Option<u64>,
}

/// Evaluates eligibility predicates.
pub struct EligibilityEvaluator;

impl EligibilityEvaluator {
    /// Evaluate `predicate` against `profile`.
    ///
    /// A profile that lacks the tested field is ineligible.
    pub fn evaluate(
        profile: &NormalizedProfile,
        predicate: &EligibilityPredicate,
    ) -> EligibilityVerdict {
        let observed = predicate.field.read(&profile.attributes);
        EligibilityVerdict {
            eligible: observed.is_some_and(|value| value >= predicate.minimum),
            predicate: predicate.name(),
            observed,
        }
    }
}
