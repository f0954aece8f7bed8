//! Per-round standings table.
//!
//! Rows are grouped by where each candidate stands once the round's action is
//! applied: winners first, in the order they were elected; then the
//! candidates still running, highest total first; then the eliminated, most
//! recent first. A candidate eliminated in the round itself is shown as
//! transferring, since its ballots move on during that round.

use super::tabulation::{RoundAction, RoundSnapshot};
use crate::model::{CandidateId, CandidateStatus, Weight};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StandingState {
    Won,
    Running,
    Transferring,
    Eliminated,
}

impl fmt::Display for StandingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandingState::Won => write!(f, "WON"),
            StandingState::Running => write!(f, "RUNNING"),
            StandingState::Transferring => write!(f, "TRANSFERRING"),
            StandingState::Eliminated => write!(f, "ELIMINATED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub candidate: CandidateId,
    pub name: String,
    pub state: StandingState,
    /// Total at the start of the round.
    pub total: Weight,
    /// `total / quota`.
    pub quota_ratio: Weight,
}

/// Round and total at the moment a candidate was elected or eliminated.
#[derive(Clone, Copy)]
struct Decided {
    round: u32,
    total: Weight,
}

/// Standings for the last round in `rounds`, using the earlier rounds to
/// place winners and eliminated candidates.
pub fn standings(rounds: &[RoundSnapshot]) -> Vec<StandingRow> {
    let Some(current) = rounds.last() else {
        return Vec::new();
    };

    let mut won: HashMap<CandidateId, Decided> = HashMap::new();
    let mut eliminated: HashMap<CandidateId, Decided> = HashMap::new();
    for snapshot in rounds {
        let decided = match &snapshot.action {
            RoundAction::Elect { .. } | RoundAction::ElectRemaining { .. } => &mut won,
            RoundAction::Eliminate { .. } => &mut eliminated,
            RoundAction::Underfilled { .. } => continue,
        };
        for id in snapshot.action.candidates() {
            decided.insert(
                *id,
                Decided {
                    round: snapshot.round,
                    total: snapshot.total_of(*id),
                },
            );
        }
    }

    let mut rows: Vec<(StandingRow, Option<Decided>)> = current
        .tallies
        .iter()
        .map(|tally| {
            let (state, decided) = if let Some(decided) = won.get(&tally.candidate) {
                (StandingState::Won, Some(*decided))
            } else if let Some(decided) = eliminated.get(&tally.candidate) {
                let state = if decided.round == current.round {
                    StandingState::Transferring
                } else {
                    StandingState::Eliminated
                };
                (state, Some(*decided))
            } else if tally.status == CandidateStatus::Eliminated {
                // eliminated before the first round in `rounds`
                (StandingState::Eliminated, None)
            } else {
                (StandingState::Running, None)
            };

            let row = StandingRow {
                candidate: tally.candidate,
                name: tally.name.clone(),
                state,
                total: tally.total,
                quota_ratio: ratio(tally.total, current.quota),
            };
            (row, decided)
        })
        .collect();

    rows.sort_by(|(a, a_decided), (b, b_decided)| compare(a, *a_decided, b, *b_decided));
    rows.into_iter().map(|(row, _)| row).collect()
}

fn ratio(total: Weight, quota: Weight) -> Weight {
    if quota.is_zero() {
        Weight::ZERO
    } else {
        total.mul_div(Weight::ONE, quota)
    }
}

fn group(state: StandingState) -> u8 {
    match state {
        StandingState::Won => 0,
        StandingState::Running => 1,
        StandingState::Transferring | StandingState::Eliminated => 2,
    }
}

fn compare(a: &StandingRow, a_decided: Option<Decided>, b: &StandingRow, b_decided: Option<Decided>) -> Ordering {
    let round_of = |decided: Option<Decided>| decided.map_or(0, |decided| decided.round);
    let total_of = |decided: Option<Decided>, row: &StandingRow| decided.map_or(row.total, |decided| decided.total);

    let within = match a.state {
        StandingState::Won => round_of(a_decided)
            .cmp(&round_of(b_decided))
            .then(total_of(b_decided, b).cmp(&total_of(a_decided, a))),
        StandingState::Running => b.total.cmp(&a.total),
        StandingState::Transferring | StandingState::Eliminated => Reverse(round_of(a_decided))
            .cmp(&Reverse(round_of(b_decided)))
            .then(total_of(b_decided, b).cmp(&total_of(a_decided, a))),
    };

    group(a.state)
        .cmp(&group(b.state))
        .then(within)
        .then_with(|| a.name.cmp(&b.name))
}
