//! Re-running one election under several random tie-break seeds.

use super::{Tabulator, TabulationError};
use crate::config::{ElectionConfig, TieBreakPolicy};
use crate::model::{Ballot, Roster};
use crate::reports::TabulationResult;
use rayon::prelude::*;

#[derive(Debug)]
pub struct SeedOutcome {
    pub seed: u64,
    pub result: Result<TabulationResult, TabulationError>,
}

/// One independent run per seed, in parallel.
///
/// Each run gets its own copy of the roster and ballots; results come back in
/// the order of `seeds`.
pub fn alternate_seeds(
    config: &ElectionConfig,
    roster: &Roster,
    ballots: &[Ballot],
    seeds: &[u64],
) -> Vec<SeedOutcome> {
    seeds
        .par_iter()
        .map(|&seed| {
            let config = config
                .clone()
                .with_tie_break(TieBreakPolicy::Random { seed });
            let result = Tabulator::new(config, roster.clone(), ballots.to_vec())
                .and_then(Tabulator::run);
            SeedOutcome { seed, result }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuotaMethod;
    use crate::formats::{parse_all, RankedNames};

    #[test]
    fn seeds_run_independently_and_in_order() {
        let roster = Roster::from_names(["A", "B", "C"]).unwrap();
        let ballots = parse_all(
            &[
                RankedNames::new(["A"]).times(2),
                RankedNames::new(["B"]).times(2),
                RankedNames::new(["C"]).times(3),
            ],
            &roster,
        )
        .unwrap();
        let config = ElectionConfig::new(1, QuotaMethod::Droop);

        let outcomes = alternate_seeds(&config, &roster, &ballots, &[1, 2, 3, 1]);
        let seeds: Vec<u64> = outcomes.iter().map(|outcome| outcome.seed).collect();
        assert_eq!(seeds, vec![1, 2, 3, 1]);

        let first = outcomes[0].result.as_ref().unwrap();
        let repeat = outcomes[3].result.as_ref().unwrap();
        assert_eq!(first, repeat);
        for outcome in &outcomes {
            let result = outcome.result.as_ref().unwrap();
            assert_eq!(result.winner_names(), vec!["C".to_string()]);
        }
    }
}
