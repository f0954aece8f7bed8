//! Round-by-round audit records produced by the tabulator.

use crate::model::{CandidateId, CandidateStatus, Weight};
use crate::tabulator::tie_break::TiePurpose;
use crate::tabulator::transfer::{Destination, TransferValue};
use serde::{Deserialize, Serialize};

/// Weight that moved between two piles during a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteMovement {
    pub from: CandidateId,
    pub to: Destination,
    pub weight: Weight,
}

/// A candidate's standing at the start of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTally {
    pub candidate: CandidateId,
    pub name: String,
    pub status: CandidateStatus,
    pub total: Weight,
}

/// Surplus distributed from one elected candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurplusTransfer {
    pub candidate: CandidateId,
    pub surplus: Weight,
    pub transfer_value: TransferValue,
    /// Weight lost to fixed-point truncation.
    pub rounding_loss: Weight,
}

/// How a tie was settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TieResolution {
    pub purpose: TiePurpose,
    pub tied: Vec<CandidateId>,
    /// Most favoured first.
    pub order: Vec<CandidateId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RoundAction {
    /// Candidates reached the quota.
    Elect { candidates: Vec<CandidateId> },
    /// Candidates took the last seats without reaching the quota.
    ElectRemaining { candidates: Vec<CandidateId> },
    Eliminate { candidates: Vec<CandidateId> },
    /// Seats left open because no weight remained to fill them.
    Underfilled { open_seats: u32 },
}

impl RoundAction {
    pub fn candidates(&self) -> &[CandidateId] {
        match self {
            RoundAction::Elect { candidates }
            | RoundAction::ElectRemaining { candidates }
            | RoundAction::Eliminate { candidates } => candidates,
            RoundAction::Underfilled { .. } => &[],
        }
    }
}

/// Immutable record of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    pub round: u32,
    pub quota: Weight,
    pub tallies: Vec<CandidateTally>,
    pub action: RoundAction,
    pub surpluses: Vec<SurplusTransfer>,
    pub movements: Vec<VoteMovement>,
    pub tie_breaks: Vec<TieResolution>,
    /// Exhausted weight once the round's transfers are done.
    pub exhausted: Weight,
}

impl RoundSnapshot {
    pub fn total_of(&self, candidate: CandidateId) -> Weight {
        self.tallies
            .get(candidate.index())
            .map_or(Weight::ZERO, |tally| tally.total)
    }

    pub fn action_elects(&self, candidate: CandidateId) -> bool {
        matches!(
            &self.action,
            RoundAction::Elect { candidates } | RoundAction::ElectRemaining { candidates }
                if candidates.contains(&candidate)
        )
    }

    /// Weight that moved into `to` during this round.
    pub fn received_by(&self, to: Destination) -> Weight {
        self.movements
            .iter()
            .filter(|movement| movement.to == to)
            .map(|movement| movement.weight)
            .sum()
    }
}
