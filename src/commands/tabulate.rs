use super::{CommandResult, ElectionDocument};
use colored::Colorize;
use instant::Instant;
use itertools::Itertools;
use std::path::Path;
use stv_tabulator::reports::{standings, RoundAction, RoundSnapshot, StandingRow, StandingState};
use stv_tabulator::tabulator::Destination;
use stv_tabulator::{CandidateId, Roster, TabulationResult, Tabulator, TieBreakPolicy};

pub struct TabulateOptions {
    pub json: bool,
    /// Replaces the document's tie-break policy.
    pub tie_break: Option<TieBreakPolicy>,
}

pub fn tabulate(path: &Path, options: &TabulateOptions) -> CommandResult {
    let start = Instant::now();
    let election = ElectionDocument::read(path)?.load()?;

    let mut config = election.config;
    if let Some(policy) = &options.tie_break {
        config = config.with_tie_break(policy.clone());
    }

    let roster = election.roster.clone();
    let tabulator = Tabulator::new(config, election.roster, election.ballots)?;
    let result = match tabulator.run() {
        Ok(result) => result,
        Err(err) => {
            if let Some(last) = err.last_round() {
                eprintln!("Last completed round before the run stopped:");
                print_round(last, &standings(std::slice::from_ref(last)), &roster);
            }
            return Err(err.into());
        }
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "🗳️  {} seat(s), {} quota {}, {} valid, {} blank",
        result.seats,
        result.quota_method,
        result.initial_quota.to_string().cyan(),
        result.valid_weight,
        result.blank_weight
    );
    for round in &result.rounds {
        print_round(round, &result.standings(round.round), &roster);
    }
    print_winners(&result);

    println!("🔑 Fingerprint: {}", result.fingerprint()?);
    println!("⏱️  Tabulated in {} ms", start.elapsed().as_millis());
    Ok(())
}

fn print_round(round: &RoundSnapshot, rows: &[StandingRow], roster: &Roster) {
    println!();
    println!(
        "{} {}  (quota {})",
        "Round".bold(),
        round.round.to_string().bold(),
        round.quota
    );

    for row in rows {
        let line = format!(
            "  {:<24} {:<13} {:>16} {:>8.2}%",
            row.name,
            row.state.to_string(),
            row.total.to_string(),
            row.quota_ratio.as_f64() * 100.0
        );
        match row.state {
            StandingState::Won => println!("{}", line.green()),
            StandingState::Running => println!("{}", line),
            StandingState::Transferring => println!("{}", line.yellow()),
            StandingState::Eliminated => println!("{}", line.dimmed()),
        }
    }

    for tie in &round.tie_breaks {
        println!(
            "  ⚖️  {} tie among {} settled as {}",
            tie.purpose,
            names(&tie.tied, roster),
            names(&tie.order, roster)
        );
    }

    match &round.action {
        RoundAction::Elect { candidates } => {
            println!("  ✅ Elected: {}", names(candidates, roster).green())
        }
        RoundAction::ElectRemaining { candidates } => println!(
            "  ✅ Elected without quota: {}",
            names(candidates, roster).green()
        ),
        RoundAction::Eliminate { candidates } => {
            println!("  ❌ Eliminated: {}", names(candidates, roster).red())
        }
        RoundAction::Underfilled { open_seats } => println!(
            "  ⚠️  {} seat(s) left unfilled",
            open_seats.to_string().yellow()
        ),
    }

    for surplus in &round.surpluses {
        println!(
            "  ↪ surplus {} from {} at transfer value {}",
            surplus.surplus,
            roster.name(surplus.candidate),
            surplus.transfer_value
        );
    }
    for movement in &round.movements {
        let to = match movement.to {
            Destination::Candidate(id) => roster.name(id),
            Destination::Exhausted => "exhausted".dimmed().to_string(),
        };
        println!(
            "    {} → {}: {}",
            roster.name(movement.from),
            to,
            movement.weight
        );
    }
}

fn print_winners(result: &TabulationResult) {
    println!();
    println!("{}", "Winners".bold());
    for (position, winner) in result.elected.iter().enumerate() {
        let note = if winner.reached_quota {
            String::new()
        } else {
            " (without quota)".to_string()
        };
        println!(
            "  {}. {} in round {} with {}{}",
            position + 1,
            winner.name.green().bold(),
            winner.round,
            winner.votes,
            note
        );
    }
    if result.underfilled {
        println!("  ⚠️  {}", "Not every seat was filled".yellow());
    }
    println!(
        "  Exhausted: {}, rounding loss: {}",
        result.exhausted_weight, result.rounding_loss
    );
}

fn names(candidates: &[CandidateId], roster: &Roster) -> String {
    candidates.iter().map(|id| roster.name(*id)).join(", ")
}
