//! Ballot format adapters.
//!
//! Every supported layout implements [`ParsesInto<Ballot>`]; the tabulator
//! itself only ever sees the normalized [`Ballot`].

mod compact;
mod grid;
mod ranked;

pub use compact::CompactLine;
pub use grid::RankGrid;
pub use ranked::RankedNames;

use crate::model::{Ballot, CandidateId, Roster};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("unknown candidate: {0}")]
    UnknownCandidate(String),
    #[error("candidate {0} is ranked more than once")]
    DuplicateCandidate(String),
    #[error("rank {rank} is given to more than one candidate")]
    Overvote { rank: u32 },
    #[error("ballot count must be at least 1")]
    ZeroCount,
    #[error("cannot parse ballot {line:?}: {reason}")]
    Syntax { line: String, reason: String },
    #[error("candidate {0} appears twice in the roster")]
    DuplicateRosterEntry(String),
}

pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// Conversion of one format-specific ballot into a normalized value.
pub trait ParsesInto<T> {
    fn parse_into(&self, roster: &Roster) -> FormatResult<T>;
}

/// Parses a batch of format-specific ballots.
pub fn parse_all<'a, F, I>(items: I, roster: &Roster) -> FormatResult<Vec<Ballot>>
where
    F: ParsesInto<Ballot> + 'a,
    I: IntoIterator<Item = &'a F>,
{
    items.into_iter().map(|item| item.parse_into(roster)).collect()
}

/// Resolves names against the roster, rejecting unknown and repeated entries.
fn build_ballot<'a, I>(names: I, count: u64, roster: &Roster) -> FormatResult<Ballot>
where
    I: IntoIterator<Item = &'a str>,
{
    if count == 0 {
        return Err(FormatError::ZeroCount);
    }

    let mut seen = HashSet::new();
    let mut choices: Vec<CandidateId> = Vec::new();
    for name in names {
        let id = roster
            .id_of(name)
            .ok_or_else(|| FormatError::UnknownCandidate(name.to_string()))?;
        if !seen.insert(id) {
            return Err(FormatError::DuplicateCandidate(name.to_string()));
        }
        choices.push(id);
    }

    Ok(Ballot::with_count(choices, count))
}
