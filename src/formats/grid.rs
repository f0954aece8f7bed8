use super::{build_ballot, FormatError, FormatResult, ParsesInto};
use crate::model::{Ballot, Roster};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rank numbers per candidate, the layout of grid-style form exports.
///
/// Unranked candidates are simply absent. Gaps between ranks are closed, and
/// two candidates sharing a rank is an overvote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankGrid {
    pub ranks: BTreeMap<String, u32>,
    #[serde(default = "one")]
    pub count: u64,
}

fn one() -> u64 {
    1
}

impl ParsesInto<Ballot> for RankGrid {
    fn parse_into(&self, roster: &Roster) -> FormatResult<Ballot> {
        let by_rank = self
            .ranks
            .iter()
            .map(|(name, rank)| (*rank, name.as_str()))
            .sorted();

        let mut names = Vec::with_capacity(self.ranks.len());
        for (rank, group) in &by_rank.group_by(|(rank, _)| *rank) {
            let group: Vec<_> = group.collect();
            if group.len() > 1 {
                return Err(FormatError::Overvote { rank });
            }
            names.extend(group.into_iter().map(|(_, name)| name));
        }

        build_ballot(names, self.count, roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CandidateId;

    fn roster() -> Roster {
        Roster::from_names(["Alice", "Bob", "Carol"]).unwrap()
    }

    fn grid(entries: &[(&str, u32)]) -> RankGrid {
        RankGrid {
            ranks: entries.iter().map(|(n, r)| (n.to_string(), *r)).collect(),
            count: 1,
        }
    }

    #[test]
    fn orders_by_rank_and_closes_gaps() {
        let ballot = grid(&[("Alice", 4), ("Carol", 1)]).parse_into(&roster()).unwrap();
        assert_eq!(ballot.choices(), &[CandidateId::new(2), CandidateId::new(0)]);
    }

    #[test]
    fn shared_rank_is_an_overvote() {
        let err = grid(&[("Alice", 1), ("Bob", 2), ("Carol", 2)])
            .parse_into(&roster())
            .unwrap_err();
        assert_eq!(err, FormatError::Overvote { rank: 2 });
    }
}
