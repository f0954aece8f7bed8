use super::{CandidateId, Weight};
use serde::{Deserialize, Serialize};

/// One normalized ballot: a ranking, the position of the preference currently
/// holding it, and the value it carries.
///
/// Identical rankings may be aggregated into one ballot whose weight is the
/// number of voters who cast it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    choices: Vec<CandidateId>,
    /// Engine state; a deserialized ballot always starts at its first preference.
    #[serde(skip_deserializing)]
    cursor: usize,
    #[serde(default = "one_vote")]
    weight: Weight,
}

fn one_vote() -> Weight {
    Weight::ONE
}

impl Ballot {
    pub fn new(choices: Vec<CandidateId>, weight: Weight) -> Self {
        Self {
            choices,
            cursor: 0,
            weight,
        }
    }

    /// A single voter's ballot.
    pub fn single(choices: Vec<CandidateId>) -> Self {
        Self::new(choices, Weight::ONE)
    }

    /// `count` identical ballots folded into one.
    pub fn with_count(choices: Vec<CandidateId>, count: u64) -> Self {
        Self::new(choices, Weight::from_votes(count))
    }

    pub fn choices(&self) -> &[CandidateId] {
        &self.choices
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// The preference currently holding this ballot, if any remain.
    pub fn current(&self) -> Option<CandidateId> {
        self.choices.get(self.cursor).copied()
    }

    /// Preferences after the current one.
    pub fn remaining(&self) -> &[CandidateId] {
        self.choices.get(self.cursor + 1..).unwrap_or(&[])
    }

    pub fn is_blank(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.choices.len()
    }

    /// Moves the cursor forward to `position`; a position past the last
    /// preference exhausts the ballot.
    pub(crate) fn advance_to(&mut self, position: usize) {
        debug_assert!(position > self.cursor, "ballot cursor must only advance");
        self.cursor = position.max(self.cursor).min(self.choices.len());
    }

    pub(crate) fn set_weight(&mut self, weight: Weight) {
        self.weight = weight;
    }
}
