//! Mutable record of one tabulation run.

use super::transfer::{self, Destination, TransferKind, TransferValue};
use crate::model::{Ballot, Candidate, CandidateId, CandidateStatus, Roster, Weight};
use crate::reports::{CandidateTally, SurplusTransfer, VoteMovement};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Sole owner of the ballots and candidates for the duration of a run.
#[derive(Debug, Clone)]
pub struct ElectionState {
    candidates: Vec<Candidate>,
    ballots: Vec<Ballot>,
    seats: u32,
    quota: Weight,
    elected: Vec<CandidateId>,
    eliminated: Vec<CandidateId>,
    valid_weight: Weight,
    blank_weight: Weight,
    exhausted: Weight,
    rounding_loss: Weight,
}

impl ElectionState {
    /// Blank ballots are set aside here and never enter the valid total.
    pub fn new(roster: &Roster, ballots: Vec<Ballot>, seats: u32) -> Self {
        let (blank, ballots): (Vec<Ballot>, Vec<Ballot>) =
            ballots.into_iter().partition(Ballot::is_blank);

        let valid_weight = ballots.iter().map(Ballot::weight).sum();
        let blank_weight = blank.iter().map(Ballot::weight).sum();

        Self {
            candidates: roster.ids().map(Candidate::new).collect(),
            ballots,
            seats,
            quota: Weight::ZERO,
            elected: Vec::new(),
            eliminated: Vec::new(),
            valid_weight,
            blank_weight,
            exhausted: Weight::ZERO,
            rounding_loss: Weight::ZERO,
        }
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }

    pub fn quota(&self) -> Weight {
        self.quota
    }

    pub(crate) fn set_quota(&mut self, quota: Weight) {
        self.quota = quota;
    }

    pub fn open_seats(&self) -> u32 {
        self.seats.saturating_sub(self.elected.len() as u32)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn status(&self, id: CandidateId) -> CandidateStatus {
        self.candidates[id.index()].status
    }

    pub fn total(&self, id: CandidateId) -> Weight {
        self.candidates[id.index()].total
    }

    pub fn standing(&self) -> Vec<CandidateId> {
        self.candidates
            .iter()
            .filter(|candidate| candidate.is_standing())
            .map(|candidate| candidate.id)
            .collect()
    }

    /// Elected candidates in election order.
    pub fn elected(&self) -> &[CandidateId] {
        &self.elected
    }

    /// Eliminated candidates in elimination order.
    pub fn eliminated(&self) -> &[CandidateId] {
        &self.eliminated
    }

    pub fn valid_weight(&self) -> Weight {
        self.valid_weight
    }

    pub fn blank_weight(&self) -> Weight {
        self.blank_weight
    }

    pub fn exhausted(&self) -> Weight {
        self.exhausted
    }

    pub fn rounding_loss(&self) -> Weight {
        self.rounding_loss
    }

    /// Weight still held by standing candidates.
    pub fn continuing_weight(&self) -> Weight {
        self.candidates
            .iter()
            .filter(|candidate| candidate.is_standing())
            .map(|candidate| candidate.total)
            .sum()
    }

    /// Weight kept by elected candidates.
    pub fn retained_weight(&self) -> Weight {
        self.elected.iter().map(|id| self.total(*id)).sum()
    }

    /// Weight still in play: everything not exhausted or lost to rounding.
    pub fn active_weight(&self) -> Weight {
        self.valid_weight
            .saturating_sub(self.exhausted)
            .saturating_sub(self.rounding_loss)
    }

    /// Continuing + retained + exhausted + rounding loss; equals the valid
    /// weight at every round boundary.
    pub fn accounted_weight(&self) -> Weight {
        self.continuing_weight() + self.retained_weight() + self.exhausted + self.rounding_loss
    }

    /// Recounts every standing candidate from the ballots they hold.
    ///
    /// A pure read pass split across threads; the per-thread sums are exact
    /// integers, so the reduction order cannot change the result.
    pub fn tally(&mut self) {
        let width = self.candidates.len();
        let standing: Vec<bool> = self.candidates.iter().map(Candidate::is_standing).collect();

        let sums = self
            .ballots
            .par_iter()
            .fold(
                || vec![0u128; width],
                |mut sums, ballot| {
                    if let Some(current) = ballot.current() {
                        if standing[current.index()] {
                            sums[current.index()] += ballot.weight().raw();
                        }
                    }
                    sums
                },
            )
            .reduce(
                || vec![0u128; width],
                |mut left, right| {
                    for (sum, other) in left.iter_mut().zip(right) {
                        *sum += other;
                    }
                    left
                },
            );

        for (candidate, sum) in self.candidates.iter_mut().zip(sums) {
            if candidate.is_standing() {
                candidate.total = Weight::from_raw(sum);
            }
        }
    }

    pub fn tallies(&self, roster: &Roster) -> Vec<CandidateTally> {
        self.candidates
            .iter()
            .map(|candidate| CandidateTally {
                candidate: candidate.id,
                name: roster.name(candidate.id),
                status: candidate.status,
                total: candidate.total,
            })
            .collect()
    }

    pub(crate) fn elect(&mut self, id: CandidateId) {
        debug_assert_eq!(self.status(id), CandidateStatus::Standing);
        self.candidates[id.index()].status = CandidateStatus::Elected;
        self.elected.push(id);
    }

    pub(crate) fn eliminate(&mut self, id: CandidateId) {
        debug_assert_eq!(self.status(id), CandidateStatus::Standing);
        self.candidates[id.index()].status = CandidateStatus::Eliminated;
        self.eliminated.push(id);
    }

    /// Moves the part of an elected candidate's total above the quota.
    ///
    /// Every ballot the candidate holds moves on at `surplus / total`; the
    /// candidate keeps exactly the quota and whatever truncation shaved off
    /// is booked as rounding loss.
    pub(crate) fn transfer_surplus(&mut self, id: CandidateId) -> (SurplusTransfer, Vec<VoteMovement>) {
        let total = self.total(id);
        let surplus = total.saturating_sub(self.quota);
        let value = TransferValue::surplus(surplus, total);

        let moved = self.move_ballots(id, TransferKind::Surplus, value);
        let transferred: Weight = moved.values().sum();
        let rounding_loss = surplus.saturating_sub(transferred);

        self.rounding_loss += rounding_loss;
        self.candidates[id.index()].total = self.quota;

        let transfer = SurplusTransfer {
            candidate: id,
            surplus,
            transfer_value: value,
            rounding_loss,
        };
        (transfer, into_movements(id, moved))
    }

    /// Moves every ballot of an eliminated candidate at full weight.
    pub(crate) fn transfer_eliminated(&mut self, id: CandidateId) -> Vec<VoteMovement> {
        debug_assert_eq!(self.status(id), CandidateStatus::Eliminated);
        let moved = self.move_ballots(id, TransferKind::Elimination, TransferValue::ONE);
        self.candidates[id.index()].total = Weight::ZERO;
        into_movements(id, moved)
    }

    fn move_ballots(
        &mut self,
        source: CandidateId,
        kind: TransferKind,
        value: TransferValue,
    ) -> BTreeMap<Destination, Weight> {
        let statuses: Vec<CandidateStatus> =
            self.candidates.iter().map(|candidate| candidate.status).collect();
        let mut moved: BTreeMap<Destination, Weight> = BTreeMap::new();

        for ballot in self
            .ballots
            .iter_mut()
            .filter(|ballot| ballot.current() == Some(source))
        {
            let outcome =
                transfer::resolve(ballot, source, kind, value, |id| statuses[id.index()]);
            *moved.entry(outcome.destination).or_default() += outcome.weight;
        }

        for (destination, weight) in &moved {
            match destination {
                Destination::Candidate(to) => self.candidates[to.index()].total += *weight,
                Destination::Exhausted => self.exhausted += *weight,
            }
        }

        moved
    }
}

fn into_movements(from: CandidateId, moved: BTreeMap<Destination, Weight>) -> Vec<VoteMovement> {
    moved
        .into_iter()
        .map(|(to, weight)| VoteMovement { from, to, weight })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: CandidateId = CandidateId::new(0);
    const B: CandidateId = CandidateId::new(1);
    const C: CandidateId = CandidateId::new(2);

    fn state(ballots: Vec<Ballot>) -> ElectionState {
        let roster = Roster::from_names(["A", "B", "C"]).unwrap();
        ElectionState::new(&roster, ballots, 1)
    }

    #[test]
    fn blank_ballots_are_set_aside() {
        let state = state(vec![
            Ballot::with_count(vec![A], 3),
            Ballot::with_count(vec![], 2),
        ]);
        assert_eq!(state.valid_weight(), Weight::from_votes(3));
        assert_eq!(state.blank_weight(), Weight::from_votes(2));
        assert_eq!(state.ballots().len(), 1);
    }

    #[test]
    fn tally_counts_current_preferences() {
        let mut state = state(vec![
            Ballot::with_count(vec![A, B], 3),
            Ballot::single(vec![B]),
            Ballot::with_count(vec![A], 2),
        ]);
        state.tally();
        assert_eq!(state.total(A), Weight::from_votes(5));
        assert_eq!(state.total(B), Weight::ONE);
        assert_eq!(state.total(C), Weight::ZERO);
    }

    #[test]
    fn surplus_transfer_keeps_quota_and_books_rounding() {
        let mut state = state(vec![
            Ballot::single(vec![A, B]),
            Ballot::single(vec![A, B]),
            Ballot::single(vec![A, C]),
            Ballot::single(vec![B]),
        ]);
        state.set_quota(Weight::from_votes(2));
        state.tally();
        state.elect(A);

        let (transfer, movements) = state.transfer_surplus(A);
        assert_eq!(transfer.surplus, Weight::ONE);
        assert_eq!(state.total(A), Weight::from_votes(2));
        assert_eq!(movements.len(), 2);
        // three ballots at 1/3 each truncate to 0.333333333
        assert_eq!(transfer.rounding_loss, Weight::from_raw(1));
        assert_eq!(state.accounted_weight(), state.valid_weight());
    }

    #[test]
    fn elimination_exhausts_ballots_once() {
        let mut state = state(vec![Ballot::with_count(vec![C], 2), Ballot::single(vec![A])]);
        state.tally();
        state.eliminate(C);
        let movements = state.transfer_eliminated(C);
        assert_eq!(
            movements,
            vec![VoteMovement {
                from: C,
                to: Destination::Exhausted,
                weight: Weight::from_votes(2),
            }]
        );
        assert_eq!(state.exhausted(), Weight::from_votes(2));

        state.tally();
        assert_eq!(state.exhausted(), Weight::from_votes(2));
        assert_eq!(state.accounted_weight(), state.valid_weight());
    }
}
