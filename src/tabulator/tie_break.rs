//! Deterministic tie resolution.
//!
//! Every policy produces a total order over the tied candidates, most
//! favoured first: the first is elected or has its surplus moved first, the
//! last is eliminated. The same policy, seed, roster and history always give
//! the same order.

use crate::config::{ConfigResult, ConfigurationError, TieBreakPolicy};
use crate::model::{CandidateId, Roster};
use crate::reports::RoundSnapshot;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// What a tie is being broken for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TiePurpose {
    SurplusOrder,
    EliminationOrder,
    LastSeat,
}

impl fmt::Display for TiePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiePurpose::SurplusOrder => write!(f, "surplus order"),
            TiePurpose::EliminationOrder => write!(f, "elimination order"),
            TiePurpose::LastSeat => write!(f, "last seat"),
        }
    }
}

enum Strategy {
    Random(StdRng),
    ReverseChronological,
    ConfiguredOrder {
        rank: HashMap<CandidateId, usize>,
        names: Vec<String>,
    },
}

pub struct TieBreaker {
    strategy: Strategy,
}

impl TieBreaker {
    pub fn from_policy(policy: &TieBreakPolicy, roster: &Roster) -> ConfigResult<Self> {
        let strategy = match policy {
            TieBreakPolicy::Random { seed } => Strategy::Random(StdRng::seed_from_u64(*seed)),
            TieBreakPolicy::ReverseChronological => Strategy::ReverseChronological,
            TieBreakPolicy::ConfiguredOrder { precedence } => {
                let mut rank = HashMap::with_capacity(precedence.len());
                for (position, name) in precedence.iter().enumerate() {
                    let id = roster.id_of(name).ok_or_else(|| {
                        ConfigurationError::UnknownPrecedenceCandidate(name.clone())
                    })?;
                    rank.entry(id).or_insert(position);
                }
                Strategy::ConfiguredOrder {
                    rank,
                    names: roster.names().to_vec(),
                }
            }
        };
        Ok(Self { strategy })
    }

    /// Orders `tied`, most favoured first.
    ///
    /// `history` holds the rounds completed before the current one.
    pub fn order(
        &mut self,
        tied: &[CandidateId],
        purpose: TiePurpose,
        history: &[RoundSnapshot],
    ) -> ConfigResult<Vec<CandidateId>> {
        let mut order = tied.to_vec();
        order.sort();
        if order.len() < 2 {
            return Ok(order);
        }

        match &mut self.strategy {
            Strategy::Random(rng) => order.shuffle(rng),
            Strategy::ReverseChronological => {
                order.sort_by(|a, b| compare_history(*a, *b, history));
            }
            Strategy::ConfiguredOrder { rank, names } => {
                let missing: Vec<String> = order
                    .iter()
                    .filter(|id| !rank.contains_key(id))
                    .map(|id| names.get(id.index()).cloned().unwrap_or_else(|| id.to_string()))
                    .collect();
                if !missing.is_empty() {
                    return Err(ConfigurationError::IncompletePrecedence(missing));
                }
                order.sort_by_key(|id| rank[id]);
            }
        }

        tracing::debug!(%purpose, tied = ?tied, order = ?order, "tie resolved");
        Ok(order)
    }
}

/// More votes in the latest round where the two differ sorts first; a tie
/// through the whole history falls back to roster position.
fn compare_history(a: CandidateId, b: CandidateId, history: &[RoundSnapshot]) -> Ordering {
    history
        .iter()
        .rev()
        .map(|round| round.total_of(b).cmp(&round.total_of(a)))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or_else(|| a.cmp(&b))
}
