//! The STV round executor.
//!
//! A [`Tabulator`] owns one run. Each call to [`Tabulator::step`] executes a
//! whole round (tally, then elect and transfer surpluses, or eliminate) and
//! appends its snapshot; a round either completes or the run aborts.

pub mod quota;
pub mod simulate;
pub mod state;
pub mod tie_break;
pub mod transfer;

pub use simulate::{alternate_seeds, SeedOutcome};
pub use state::ElectionState;
pub use tie_break::{TieBreaker, TiePurpose};
pub use transfer::{Destination, TransferKind, TransferOutcome, TransferValue};

use crate::config::{
    ConfigurationError, ElectionConfig, ExhaustionPolicy, LastSeatsRule, QuotaRecompute,
};
use crate::model::{Ballot, CandidateId, Roster, Weight};
use crate::reports::{
    ElectedCandidate, ResultsRecorder, RoundAction, RoundSnapshot, SurplusTransfer,
    TabulationResult, TieResolution, VoteMovement,
};
use itertools::Itertools;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum TabulationError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("candidate roster is empty")]
    EmptyRoster,
    #[error("{seats} seats requested but only {candidates} candidates are standing")]
    SeatsExceedCandidates { seats: u32, candidates: usize },
    #[error("ballot {ballot} ranks candidate {candidate} which is not on the roster")]
    UnknownCandidate { ballot: usize, candidate: CandidateId },
    #[error("tabulation did not finish within {limit} rounds")]
    RoundLimitExceeded {
        limit: u32,
        last_round: Option<Box<RoundSnapshot>>,
    },
}

impl TabulationError {
    /// The last round that completed before the run aborted.
    pub fn last_round(&self) -> Option<&RoundSnapshot> {
        match self {
            TabulationError::RoundLimitExceeded { last_round, .. } => last_round.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TabulationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Tallying,
    Electing,
    Transferring,
    Eliminating,
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Tallying => write!(f, "tallying"),
            Phase::Electing => write!(f, "electing"),
            Phase::Transferring => write!(f, "transferring"),
            Phase::Eliminating => write!(f, "eliminating"),
            Phase::Complete => write!(f, "complete"),
        }
    }
}

/// Everything gathered while a round runs, frozen into a snapshot at the end.
struct RoundRecord {
    round: u32,
    quota: Weight,
    tallies: Vec<crate::reports::CandidateTally>,
    action: Option<RoundAction>,
    surpluses: Vec<SurplusTransfer>,
    movements: Vec<VoteMovement>,
    tie_breaks: Vec<TieResolution>,
}

pub struct Tabulator {
    config: ElectionConfig,
    roster: Roster,
    state: ElectionState,
    tie_breaker: TieBreaker,
    recorder: ResultsRecorder,
    phase: Phase,
    initial_quota: Weight,
    round_limit: u32,
    quota_reached: Vec<bool>,
    underfilled: bool,
}

impl Tabulator {
    /// Validates the whole input; nothing is tabulated until every fatal
    /// precondition has been checked.
    pub fn new(config: ElectionConfig, roster: Roster, ballots: Vec<Ballot>) -> Result<Self> {
        if roster.is_empty() {
            return Err(TabulationError::EmptyRoster);
        }
        config.validate(&roster)?;
        if config.seats as usize > roster.len() {
            return Err(TabulationError::SeatsExceedCandidates {
                seats: config.seats,
                candidates: roster.len(),
            });
        }
        for (index, ballot) in ballots.iter().enumerate() {
            if let Some(unknown) = ballot.choices().iter().find(|id| !roster.contains(**id)) {
                return Err(TabulationError::UnknownCandidate {
                    ballot: index,
                    candidate: *unknown,
                });
            }
        }

        let tie_breaker = TieBreaker::from_policy(&config.tie_break, &roster)?;
        let mut state = ElectionState::new(&roster, ballots, config.seats);
        let initial_quota = quota::calculate(config.quota_method, state.valid_weight(), config.seats)?;
        state.set_quota(initial_quota);

        info!(
            candidates = roster.len(),
            seats = config.seats,
            valid = %state.valid_weight(),
            blank = %state.blank_weight(),
            quota = %initial_quota,
            method = %config.quota_method,
            recompute = %config.quota_recompute,
            "tabulation prepared"
        );

        let round_limit = (roster.len() as u32).saturating_add(config.seats);
        let quota_reached = vec![false; roster.len()];
        Ok(Self {
            config,
            roster,
            state,
            tie_breaker,
            recorder: ResultsRecorder::new(),
            phase: Phase::Tallying,
            initial_quota,
            round_limit,
            quota_reached,
            underfilled: false,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &ElectionState {
        &self.state
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn rounds(&self) -> &[RoundSnapshot] {
        self.recorder.rounds()
    }

    #[cfg(test)]
    pub(crate) fn with_round_limit(mut self, limit: u32) -> Self {
        self.round_limit = limit;
        self
    }

    /// Runs rounds until the election is complete.
    pub fn run(mut self) -> Result<TabulationResult> {
        while self.step()? != Phase::Complete {}
        Ok(self.into_result())
    }

    /// Executes one full round and returns the phase the run is left in.
    pub fn step(&mut self) -> Result<Phase> {
        if self.phase == Phase::Complete {
            return Ok(Phase::Complete);
        }

        let round = self.recorder.len() as u32 + 1;
        if round > self.round_limit {
            warn!(round, limit = self.round_limit, "round limit exceeded, aborting");
            return Err(TabulationError::RoundLimitExceeded {
                limit: self.round_limit,
                last_round: self.recorder.last().cloned().map(Box::new),
            });
        }

        self.enter(Phase::Tallying);
        if self.config.quota_recompute == QuotaRecompute::PerRound {
            let active = self.state.active_weight();
            if !active.is_zero() {
                let quota = quota::calculate(self.config.quota_method, active, self.config.seats)?;
                debug!(round, quota = %quota, active = %active, "quota recomputed");
                self.state.set_quota(quota);
            }
        }
        self.state.tally();

        let mut record = RoundRecord {
            round,
            quota: self.state.quota(),
            tallies: self.state.tallies(&self.roster),
            action: None,
            surpluses: Vec::new(),
            movements: Vec::new(),
            tie_breaks: Vec::new(),
        };

        let next = self.execute_round(&mut record)?;

        let snapshot = RoundSnapshot {
            round: record.round,
            quota: record.quota,
            tallies: record.tallies,
            action: record
                .action
                .unwrap_or(RoundAction::Underfilled { open_seats: self.state.open_seats() }),
            surpluses: record.surpluses,
            movements: record.movements,
            tie_breaks: record.tie_breaks,
            exhausted: self.state.exhausted(),
        };
        self.recorder.append(snapshot);
        debug_assert_eq!(self.state.accounted_weight(), self.state.valid_weight());

        self.enter(next);
        Ok(next)
    }

    fn execute_round(&mut self, record: &mut RoundRecord) -> Result<Phase> {
        let standing = self.state.standing();
        let open = self.state.open_seats();

        if self.config.last_seats_rule == LastSeatsRule::FillRemaining
            && !standing.is_empty()
            && standing.len() <= open as usize
        {
            let order = self.rank(&standing, None, TiePurpose::LastSeat, record)?;
            info!(round = record.round, open, "standing candidates fill the remaining seats");
            self.elect_all(&order, record.round);
            self.underfilled = self.state.open_seats() > 0;
            record.action = Some(RoundAction::ElectRemaining { candidates: order });
            return Ok(Phase::Complete);
        }

        if self.state.continuing_weight().is_zero() {
            return self.resolve_exhaustion(&standing, open, record);
        }

        self.enter(Phase::Electing);
        let quota = self.state.quota();
        let qualified: Vec<CandidateId> = standing
            .iter()
            .copied()
            .filter(|id| self.state.total(*id) >= quota)
            .collect();

        if !qualified.is_empty() {
            let winners = self.rank(&qualified, Some(open as usize), TiePurpose::SurplusOrder, record)?;
            self.elect_all(&winners, record.round);
            record.action = Some(RoundAction::Elect {
                candidates: winners.clone(),
            });

            if self.state.open_seats() == 0 {
                info!(round = record.round, "all seats filled");
                return Ok(Phase::Complete);
            }

            self.enter(Phase::Transferring);
            for winner in winners {
                if self.state.total(winner) > quota {
                    let (surplus, movements) = self.state.transfer_surplus(winner);
                    info!(
                        round = record.round,
                        candidate = %self.roster.name(winner),
                        surplus = %surplus.surplus,
                        transfer_value = %surplus.transfer_value,
                        "surplus transferred"
                    );
                    record.surpluses.push(surplus);
                    record.movements.extend(movements);
                }
            }
            return Ok(Phase::Tallying);
        }

        self.enter(Phase::Eliminating);
        let losers = self.select_eliminations(&standing, open, record)?;
        for loser in &losers {
            self.state.eliminate(*loser);
        }
        for loser in &losers {
            info!(
                round = record.round,
                candidate = %self.roster.name(*loser),
                votes = %self.state.total(*loser),
                "candidate eliminated"
            );
            let movements = self.state.transfer_eliminated(*loser);
            record.movements.extend(movements);
        }
        record.action = Some(RoundAction::Eliminate { candidates: losers });
        Ok(Phase::Tallying)
    }

    /// Seats remain but nothing standing holds any weight.
    fn resolve_exhaustion(
        &mut self,
        standing: &[CandidateId],
        open: u32,
        record: &mut RoundRecord,
    ) -> Result<Phase> {
        match self.config.exhaustion_policy {
            ExhaustionPolicy::DeclareByTally if !standing.is_empty() => {
                let order = self.rank(standing, Some(open as usize), TiePurpose::LastSeat, record)?;
                info!(round = record.round, declared = order.len(), "no transferable weight left, declaring by tally");
                self.elect_all(&order, record.round);
                record.action = Some(RoundAction::ElectRemaining { candidates: order });
            }
            _ => {
                record.action = Some(RoundAction::Underfilled { open_seats: open });
            }
        }

        self.underfilled = self.state.open_seats() > 0;
        if self.underfilled {
            warn!(
                round = record.round,
                open_seats = self.state.open_seats(),
                "election finished with seats unfilled"
            );
        }
        Ok(Phase::Complete)
    }

    /// Orders candidates by total, highest first, breaking equal totals with
    /// the tie-breaker. With a `cut`, only that many are returned and a tie
    /// straddling the cut is broken for the last seat.
    fn rank(
        &mut self,
        candidates: &[CandidateId],
        cut: Option<usize>,
        purpose: TiePurpose,
        record: &mut RoundRecord,
    ) -> Result<Vec<CandidateId>> {
        let limit = cut.unwrap_or(candidates.len());
        let sorted = candidates
            .iter()
            .copied()
            .sorted_by(|a, b| self.state.total(*b).cmp(&self.state.total(*a)).then(a.cmp(b)));

        let mut groups: Vec<Vec<CandidateId>> = Vec::new();
        for (_, group) in &sorted.group_by(|id| self.state.total(*id)) {
            groups.push(group.collect());
        }

        let mut ranked = Vec::with_capacity(candidates.len());
        for group in groups {
            if ranked.len() >= limit {
                break;
            }
            if group.len() == 1 {
                ranked.extend(group);
                continue;
            }
            let straddles = ranked.len() + group.len() > limit;
            let purpose = if straddles { TiePurpose::LastSeat } else { purpose };
            let order = self.break_tie(&group, purpose, record)?;
            ranked.extend(order);
        }
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// The lowest candidate goes. With bulk elimination, every zero-vote
    /// candidate goes along with the lowest candidate that still holds votes,
    /// as long as at least `open` candidates keep standing.
    fn select_eliminations(
        &mut self,
        standing: &[CandidateId],
        open: u32,
        record: &mut RoundRecord,
    ) -> Result<Vec<CandidateId>> {
        let Some((lowest, order)) = self.lowest_group(standing, record)? else {
            return Ok(Vec::new());
        };

        if !(self.config.bulk_eliminate_zero && lowest.is_zero()) {
            return Ok(order.last().copied().into_iter().collect());
        }

        let spare = standing.len().saturating_sub(open as usize).max(1);
        let mut losers: Vec<CandidateId> = order.iter().rev().take(spare).copied().collect();
        if losers.len() < spare {
            let holding: Vec<CandidateId> = standing
                .iter()
                .copied()
                .filter(|id| !self.state.total(*id).is_zero())
                .collect();
            if let Some((_, order)) = self.lowest_group(&holding, record)? {
                losers.extend(order.last().copied());
            }
        }
        Ok(losers)
    }

    /// Candidates sharing the lowest total, most favoured first.
    fn lowest_group(
        &mut self,
        candidates: &[CandidateId],
        record: &mut RoundRecord,
    ) -> Result<Option<(Weight, Vec<CandidateId>)>> {
        let Some(lowest) = candidates.iter().map(|id| self.state.total(*id)).min() else {
            return Ok(None);
        };
        let bottom: Vec<CandidateId> = candidates
            .iter()
            .copied()
            .filter(|id| self.state.total(*id) == lowest)
            .collect();

        let order = if bottom.len() > 1 {
            self.break_tie(&bottom, TiePurpose::EliminationOrder, record)?
        } else {
            bottom
        };
        Ok(Some((lowest, order)))
    }

    fn break_tie(
        &mut self,
        tied: &[CandidateId],
        purpose: TiePurpose,
        record: &mut RoundRecord,
    ) -> Result<Vec<CandidateId>> {
        let order = self.tie_breaker.order(tied, purpose, self.recorder.rounds())?;
        info!(
            round = record.round,
            %purpose,
            tied = %tied.iter().map(|id| self.roster.name(*id)).join(", "),
            "tie broken"
        );
        record.tie_breaks.push(TieResolution {
            purpose,
            tied: tied.to_vec(),
            order: order.clone(),
        });
        Ok(order)
    }

    fn elect_all(&mut self, candidates: &[CandidateId], round: u32) {
        for candidate in candidates {
            let reached_quota = self.state.total(*candidate) >= self.state.quota();
            self.state.elect(*candidate);
            self.quota_reached[candidate.index()] = reached_quota;
            info!(
                round,
                candidate = %self.roster.name(*candidate),
                votes = %self.state.total(*candidate),
                reached_quota,
                "candidate elected"
            );
        }
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "phase change");
            self.phase = phase;
        }
    }

    fn into_result(self) -> TabulationResult {
        let rounds = self.recorder.into_rounds();
        let elected = self
            .state
            .elected()
            .iter()
            .map(|id| {
                let (round, votes) = rounds
                    .iter()
                    .find(|snapshot| snapshot.action_elects(*id))
                    .map_or((0, Weight::ZERO), |snapshot| (snapshot.round, snapshot.total_of(*id)));
                ElectedCandidate {
                    candidate: *id,
                    name: self.roster.name(*id),
                    round,
                    votes,
                    reached_quota: self.quota_reached[id.index()],
                }
            })
            .collect();

        info!(
            rounds = rounds.len(),
            elected = %self.state.elected().iter().map(|id| self.roster.name(*id)).join(", "),
            exhausted = %self.state.exhausted(),
            underfilled = self.underfilled,
            "tabulation complete"
        );

        TabulationResult {
            seats: self.config.seats,
            quota_method: self.config.quota_method,
            quota_recompute: self.config.quota_recompute,
            initial_quota: self.initial_quota,
            valid_weight: self.state.valid_weight(),
            blank_weight: self.state.blank_weight(),
            rounds,
            elected,
            underfilled: self.underfilled,
            exhausted_weight: self.state.exhausted(),
            rounding_loss: self.state.rounding_loss(),
        }
    }
}
