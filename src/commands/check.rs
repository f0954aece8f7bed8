use super::{CommandResult, ElectionDocument};
use colored::Colorize;
use std::path::Path;
use stv_tabulator::Tabulator;

/// Runs every up-front validation the tabulator performs, then stops.
pub fn check(path: &Path) -> CommandResult {
    let election = ElectionDocument::read(path)?.load()?;
    let ballots = election.ballots.len();
    let config = election.config.clone();

    let tabulator = Tabulator::new(election.config, election.roster, election.ballots)?;
    let state = tabulator.state();

    println!("✅ {} is valid", path.display().to_string().cyan());
    println!(
        "  {} candidates, {} seat(s), {} ballot entries",
        tabulator.roster().len(),
        config.seats,
        ballots
    );
    println!(
        "  valid weight {}, blank weight {}",
        state.valid_weight(),
        state.blank_weight()
    );
    println!(
        "  {} quota ({}) {}",
        config.quota_method,
        config.quota_recompute,
        state.quota().to_string().green()
    );
    println!("  tie-break {}", config.tie_break);
    Ok(())
}
