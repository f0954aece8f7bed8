//! Moving a ballot from the candidate holding it to its next standing
//! preference.

use crate::model::{Ballot, CandidateId, CandidateStatus, Weight};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferKind {
    /// Part of an elected candidate's surplus; the ballot is scaled.
    Surplus,
    /// The holding candidate was eliminated; the ballot keeps its weight.
    Elimination,
}

/// Fraction of a ballot's weight that moves on, kept as an exact ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferValue {
    pub numerator: Weight,
    pub denominator: Weight,
}

impl TransferValue {
    pub const ONE: Self = Self {
        numerator: Weight::ONE,
        denominator: Weight::ONE,
    };

    /// `surplus / total` for a candidate elected with `total` votes.
    pub fn surplus(surplus: Weight, total: Weight) -> Self {
        Self {
            numerator: surplus,
            denominator: total,
        }
    }

    pub fn is_one(&self) -> bool {
        self.numerator == self.denominator
    }

    pub fn apply(&self, weight: Weight) -> Weight {
        if self.is_one() {
            weight
        } else {
            weight.mul_div(self.numerator, self.denominator)
        }
    }

    /// The ratio as a fixed-point weight, truncated.
    pub fn as_weight(&self) -> Weight {
        self.apply(Weight::ONE)
    }
}

impl fmt::Display for TransferValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_weight())
    }
}

/// Where a transferred ballot ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Destination {
    Candidate(CandidateId),
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    pub destination: Destination,
    pub weight: Weight,
}

/// Moves `ballot` off `source`.
///
/// Surplus transfers scale the weight by `value` first; elimination transfers
/// ignore it. The cursor then skips every preference that is no longer
/// standing, stopping at the first standing candidate or exhausting the
/// ballot.
pub fn resolve<F>(
    ballot: &mut Ballot,
    source: CandidateId,
    kind: TransferKind,
    value: TransferValue,
    status_of: F,
) -> TransferOutcome
where
    F: Fn(CandidateId) -> CandidateStatus,
{
    debug_assert_eq!(ballot.current(), Some(source), "ballot is not held by {}", source);

    if kind == TransferKind::Surplus {
        ballot.set_weight(value.apply(ballot.weight()));
    }

    let skipped = ballot
        .remaining()
        .iter()
        .position(|candidate| status_of(*candidate) == CandidateStatus::Standing);

    let destination = match skipped {
        Some(offset) => {
            ballot.advance_to(ballot.cursor() + 1 + offset);
            ballot
                .current()
                .map_or(Destination::Exhausted, Destination::Candidate)
        }
        None => {
            ballot.advance_to(ballot.choices().len());
            Destination::Exhausted
        }
    };

    TransferOutcome {
        destination,
        weight: ballot.weight(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ballot;

    const A: CandidateId = CandidateId::new(0);
    const B: CandidateId = CandidateId::new(1);
    const C: CandidateId = CandidateId::new(2);
    const D: CandidateId = CandidateId::new(3);

    fn statuses(elected: &[CandidateId], eliminated: &[CandidateId]) -> impl Fn(CandidateId) -> CandidateStatus {
        let elected = elected.to_vec();
        let eliminated = eliminated.to_vec();
        move |id| {
            if elected.contains(&id) {
                CandidateStatus::Elected
            } else if eliminated.contains(&id) {
                CandidateStatus::Eliminated
            } else {
                CandidateStatus::Standing
            }
        }
    }

    #[test]
    fn elimination_keeps_full_weight() {
        let mut ballot = Ballot::with_count(vec![A, B, C], 2);
        let outcome = resolve(
            &mut ballot,
            A,
            TransferKind::Elimination,
            TransferValue::ONE,
            statuses(&[], &[A]),
        );
        assert_eq!(outcome.destination, Destination::Candidate(B));
        assert_eq!(outcome.weight, Weight::from_votes(2));
        assert_eq!(ballot.cursor(), 1);
    }

    #[test]
    fn surplus_scales_by_transfer_value() {
        let value = TransferValue::surplus(Weight::from_votes(4), Weight::from_votes(10));
        let mut ballot = Ballot::single(vec![A, B]);
        let outcome = resolve(&mut ballot, A, TransferKind::Surplus, value, statuses(&[A], &[]));
        assert_eq!(outcome.weight, "0.4".parse().unwrap());
        assert_eq!(outcome.destination, Destination::Candidate(B));
        assert_eq!(value.to_string(), "0.4");
    }

    #[test]
    fn skips_elected_and_eliminated_preferences() {
        let mut ballot = Ballot::single(vec![A, B, C, D]);
        let outcome = resolve(
            &mut ballot,
            A,
            TransferKind::Elimination,
            TransferValue::ONE,
            statuses(&[B], &[A, C]),
        );
        assert_eq!(outcome.destination, Destination::Candidate(D));
        assert_eq!(ballot.cursor(), 3);
    }

    #[test]
    fn exhausts_when_nobody_is_standing() {
        let mut ballot = Ballot::single(vec![A, B]);
        let outcome = resolve(
            &mut ballot,
            A,
            TransferKind::Elimination,
            TransferValue::ONE,
            statuses(&[B], &[A]),
        );
        assert_eq!(outcome.destination, Destination::Exhausted);
        assert_eq!(outcome.weight, Weight::ONE);
        assert!(ballot.is_exhausted());
    }
}
