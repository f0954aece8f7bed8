use super::{CommandResult, ElectionDocument};
use colored::Colorize;
use itertools::Itertools;
use std::path::Path;
use stv_tabulator::tabulator::alternate_seeds;

/// Prints the winners under each seed and how many distinct outcomes occurred.
pub fn simulate(path: &Path, seeds: &[u64]) -> CommandResult {
    let election = ElectionDocument::read(path)?.load()?;
    let outcomes = alternate_seeds(&election.config, &election.roster, &election.ballots, seeds);

    let mut failures = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => {
                let summary = result.summary();
                println!(
                    "🎲 seed {:>8}: {} ({} rounds)",
                    outcome.seed,
                    summary.winners.join(", ").green(),
                    summary.total_rounds
                );
            }
            Err(err) => {
                failures += 1;
                println!("🎲 seed {:>8}: {}", outcome.seed, err.to_string().red());
            }
        }
    }

    let distinct = outcomes
        .iter()
        .filter_map(|outcome| outcome.result.as_ref().ok())
        .map(|result| result.summary().winners)
        .counts();
    println!();
    for (winners, count) in distinct.iter().sorted_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0))) {
        println!("  {:>4} × {}", count, winners.join(", "));
    }

    if failures > 0 {
        return Err(format!("{} of {} seeds failed", failures, outcomes.len()).into());
    }
    Ok(())
}
