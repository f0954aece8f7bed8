use crate::config::{QuotaMethod, QuotaRecompute};
use crate::model::{CandidateId, Weight};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

pub mod standings;
pub mod tabulation;

pub use standings::{standings, StandingRow, StandingState};
pub use tabulation::{
    CandidateTally, RoundAction, RoundSnapshot, SurplusTransfer, TieResolution, VoteMovement,
};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Append-only log of completed rounds.
#[derive(Debug, Default, Clone)]
pub struct ResultsRecorder {
    rounds: Vec<RoundSnapshot>,
}

impl ResultsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, snapshot: RoundSnapshot) {
        debug_assert_eq!(
            snapshot.round as usize,
            self.rounds.len() + 1,
            "rounds must be appended in order"
        );
        self.rounds.push(snapshot);
    }

    pub fn rounds(&self) -> &[RoundSnapshot] {
        &self.rounds
    }

    pub fn last(&self) -> Option<&RoundSnapshot> {
        self.rounds.last()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn into_rounds(self) -> Vec<RoundSnapshot> {
        self.rounds
    }
}

/// A seat winner, in election order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectedCandidate {
    pub candidate: CandidateId,
    pub name: String,
    pub round: u32,
    /// Vote total in the round the candidate was elected.
    pub votes: Weight,
    /// Whether the seat was won by reaching the quota.
    pub reached_quota: bool,
}

/// Everything a completed run hands to the reporting side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabulationResult {
    pub seats: u32,
    pub quota_method: QuotaMethod,
    pub quota_recompute: QuotaRecompute,
    pub initial_quota: Weight,
    pub valid_weight: Weight,
    pub blank_weight: Weight,
    pub rounds: Vec<RoundSnapshot>,
    pub elected: Vec<ElectedCandidate>,
    pub underfilled: bool,
    pub exhausted_weight: Weight,
    pub rounding_loss: Weight,
}

/// Headline numbers for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub winners: Vec<String>,
    pub total_rounds: u32,
    pub valid_weight: Weight,
    pub exhausted_weight: Weight,
    pub underfilled: bool,
}

impl TabulationResult {
    pub fn winner_names(&self) -> Vec<String> {
        self.elected.iter().map(|winner| winner.name.clone()).collect()
    }

    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            winners: self.winner_names(),
            total_rounds: self.rounds.len() as u32,
            valid_weight: self.valid_weight,
            exhausted_weight: self.exhausted_weight,
            underfilled: self.underfilled,
        }
    }

    /// Standings table after `round` (1-based); empty when out of range.
    pub fn standings(&self, round: u32) -> Vec<StandingRow> {
        self.rounds
            .get(..round as usize)
            .map_or_else(Vec::new, standings)
    }

    /// SHA-1 of the canonical JSON of the rounds and winners.
    ///
    /// Two runs over the same input agree on this value exactly when their
    /// round histories are identical.
    pub fn fingerprint(&self) -> ReportResult<String> {
        let mut hasher = Sha1::new();
        serde_json::to_writer(&mut hasher, &self.rounds)?;
        serde_json::to_writer(&mut hasher, &self.elected)?;
        Ok(format!("{:x}", hasher.finalize()))
    }
}
