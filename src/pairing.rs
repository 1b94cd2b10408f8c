//! Structural checks on gifter -> giftee assignments.
//!
//! A candidate list is legal when every id is on the roster, no participant is used twice as a
//! gifter or twice as a giftee, and (optionally) nobody gifts to themselves. Repeating the exact
//! same edge is not an error; the repeat is dropped. Completeness is only demanded when asked
//! for, which is the case for the administrator's results.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Pair, ParticipantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Gifter,
    Giftee,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Gifter => write!(f, "gifter"),
            Role::Giftee => write!(f, "giftee"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Unknown participant {participant_id} used as {role}")]
    UnknownParticipant {
        participant_id: ParticipantId,
        role: Role,
    },

    #[error("Participant {participant_id} is assigned more than once as {role}")]
    DuplicateAssignment {
        participant_id: ParticipantId,
        role: Role,
    },

    #[error("Participant {participant_id} cannot gift to themselves")]
    SelfAssignment { participant_id: ParticipantId },

    #[error(
        "Incomplete assignment: missing gifters {unassigned_gifters:?}, missing giftees {unassigned_giftees:?}"
    )]
    IncompleteAssignment {
        unassigned_gifters: Vec<ParticipantId>,
        unassigned_giftees: Vec<ParticipantId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Every roster member must appear exactly once as gifter and once as giftee.
    pub require_complete: bool,
    pub forbid_self_pairs: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            require_complete: false,
            forbid_self_pairs: true,
        }
    }
}

impl ValidationOptions {
    /// Options for a participant's predictions: partial sets allowed.
    pub fn predictions(forbid_self_pairs: bool) -> Self {
        Self {
            require_complete: false,
            forbid_self_pairs,
        }
    }

    /// Options for the ground truth: the set must cover the whole roster.
    pub fn results(forbid_self_pairs: bool) -> Self {
        Self {
            require_complete: true,
            forbid_self_pairs,
        }
    }
}

/// A pair list that has passed [`validate_assignments`]. Storage only accepts this type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatedPairs(Vec<Pair>);

impl ValidatedPairs {
    pub fn pairs(&self) -> &[Pair] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Pair> {
        self.0
    }
}

/// Checks `pairs` against `roster` and returns them with exact repeats removed, in first-seen
/// order. Fails on the first offending pair.
pub fn validate_assignments(
    pairs: &[Pair],
    roster: &[ParticipantId],
    options: ValidationOptions,
) -> Result<ValidatedPairs, ValidationError> {
    let roster: HashSet<ParticipantId> = roster.iter().copied().collect();

    let mut seen = HashSet::new();
    let mut gifters = HashSet::new();
    let mut giftees = HashSet::new();
    let mut normalized = Vec::with_capacity(pairs.len());

    for pair in pairs {
        if !roster.contains(&pair.gifter_id) {
            return Err(ValidationError::UnknownParticipant {
                participant_id: pair.gifter_id,
                role: Role::Gifter,
            });
        }
        if !roster.contains(&pair.giftee_id) {
            return Err(ValidationError::UnknownParticipant {
                participant_id: pair.giftee_id,
                role: Role::Giftee,
            });
        }
        if options.forbid_self_pairs && pair.is_self_pair() {
            return Err(ValidationError::SelfAssignment {
                participant_id: pair.gifter_id,
            });
        }

        // Resubmitting the same edge is harmless.
        if !seen.insert(*pair) {
            continue;
        }
        if !gifters.insert(pair.gifter_id) {
            return Err(ValidationError::DuplicateAssignment {
                participant_id: pair.gifter_id,
                role: Role::Gifter,
            });
        }
        if !giftees.insert(pair.giftee_id) {
            return Err(ValidationError::DuplicateAssignment {
                participant_id: pair.giftee_id,
                role: Role::Giftee,
            });
        }
        normalized.push(*pair);
    }

    let validated = ValidatedPairs(normalized);
    if options.require_complete {
        let ids: Vec<ParticipantId> = roster.into_iter().collect();
        check_complete(&validated, &ids)?;
    }
    Ok(validated)
}

/// Fails with `IncompleteAssignment` unless every roster member is both a gifter and a giftee in
/// `pairs`. Missing ids are reported in ascending order.
pub fn check_complete(
    pairs: &ValidatedPairs,
    roster: &[ParticipantId],
) -> Result<(), ValidationError> {
    let gifters: HashSet<ParticipantId> = pairs.pairs().iter().map(|p| p.gifter_id).collect();
    let giftees: HashSet<ParticipantId> = pairs.pairs().iter().map(|p| p.giftee_id).collect();

    let mut unassigned_gifters: Vec<ParticipantId> = roster
        .iter()
        .copied()
        .filter(|id| !gifters.contains(id))
        .collect();
    let mut unassigned_giftees: Vec<ParticipantId> = roster
        .iter()
        .copied()
        .filter(|id| !giftees.contains(id))
        .collect();

    if unassigned_gifters.is_empty() && unassigned_giftees.is_empty() {
        return Ok(());
    }
    unassigned_gifters.sort_unstable();
    unassigned_gifters.dedup();
    unassigned_giftees.sort_unstable();
    unassigned_giftees.dedup();
    Err(ValidationError::IncompleteAssignment {
        unassigned_gifters,
        unassigned_giftees,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: [ParticipantId; 4] = [1, 2, 3, 4];

    fn pairs(edges: &[(ParticipantId, ParticipantId)]) -> Vec<Pair> {
        edges.iter().map(|&(a, b)| Pair::new(a, b)).collect()
    }

    #[test]
    fn test_partial_set_is_valid() {
        let input = pairs(&[(1, 2), (3, 4)]);
        let validated = validate_assignments(&input, &ROSTER, ValidationOptions::default())
            .expect("Partial set should validate");
        assert_eq!(validated.pairs(), input.as_slice());
    }

    #[test]
    fn test_empty_set_is_valid_for_predictions() {
        let validated = validate_assignments(&[], &ROSTER, ValidationOptions::predictions(true))
            .expect("Empty set should validate");
        assert!(validated.is_empty());
    }

    #[test]
    fn test_full_cycle_is_valid() {
        let input = pairs(&[(1, 2), (2, 3), (3, 4), (4, 1)]);
        let validated = validate_assignments(&input, &ROSTER, ValidationOptions::results(true))
            .expect("Full cycle should validate");
        assert_eq!(validated.len(), 4);
    }

    #[test]
    fn test_unknown_gifter() {
        let err = validate_assignments(&pairs(&[(9, 2)]), &ROSTER, ValidationOptions::default())
            .expect_err("Should fail");
        assert_eq!(
            err,
            ValidationError::UnknownParticipant {
                participant_id: 9,
                role: Role::Gifter
            }
        );
    }

    #[test]
    fn test_unknown_giftee() {
        let err = validate_assignments(&pairs(&[(1, 42)]), &ROSTER, ValidationOptions::default())
            .expect_err("Should fail");
        assert_eq!(
            err,
            ValidationError::UnknownParticipant {
                participant_id: 42,
                role: Role::Giftee
            }
        );
    }

    #[test]
    fn test_duplicate_gifter() {
        let err = validate_assignments(
            &pairs(&[(1, 2), (1, 3)]),
            &ROSTER,
            ValidationOptions::default(),
        )
        .expect_err("Should fail");
        assert_eq!(
            err,
            ValidationError::DuplicateAssignment {
                participant_id: 1,
                role: Role::Gifter
            }
        );
    }

    #[test]
    fn test_duplicate_giftee() {
        let err = validate_assignments(
            &pairs(&[(1, 3), (2, 3)]),
            &ROSTER,
            ValidationOptions::default(),
        )
        .expect_err("Should fail");
        assert_eq!(
            err,
            ValidationError::DuplicateAssignment {
                participant_id: 3,
                role: Role::Giftee
            }
        );
    }

    #[test]
    fn test_identical_edges_are_deduplicated() {
        let validated = validate_assignments(
            &pairs(&[(1, 2), (3, 4), (1, 2)]),
            &ROSTER,
            ValidationOptions::default(),
        )
        .expect("Exact repeats should be dropped, not rejected");
        assert_eq!(validated.pairs(), pairs(&[(1, 2), (3, 4)]).as_slice());
    }

    #[test]
    fn test_self_pairs_forbidden_by_default() {
        let err = validate_assignments(&pairs(&[(2, 2)]), &ROSTER, ValidationOptions::default())
            .expect_err("Should fail");
        assert_eq!(err, ValidationError::SelfAssignment { participant_id: 2 });
    }

    #[test]
    fn test_self_pairs_allowed_when_configured() {
        let validated = validate_assignments(
            &pairs(&[(2, 2), (1, 3)]),
            &ROSTER,
            ValidationOptions::predictions(false),
        )
        .expect("Self pair should be allowed");
        assert_eq!(validated.len(), 2);
    }

    #[test]
    fn test_incomplete_results_rejected() {
        let err = validate_assignments(
            &pairs(&[(1, 2), (2, 1)]),
            &ROSTER,
            ValidationOptions::results(true),
        )
        .expect_err("Should fail");
        assert_eq!(
            err,
            ValidationError::IncompleteAssignment {
                unassigned_gifters: vec![3, 4],
                unassigned_giftees: vec![3, 4],
            }
        );
    }

    #[test]
    fn test_unknown_is_reported_before_duplicate() {
        // The second pair reuses gifter 1 and also names an unknown giftee.
        let err = validate_assignments(
            &pairs(&[(1, 2), (1, 7)]),
            &ROSTER,
            ValidationOptions::default(),
        )
        .expect_err("Should fail");
        assert!(matches!(
            err,
            ValidationError::UnknownParticipant {
                participant_id: 7,
                ..
            }
        ));
    }

    #[test]
    fn test_check_complete_on_empty_roster() {
        assert!(check_complete(&ValidatedPairs::default(), &[]).is_ok());
    }
}
