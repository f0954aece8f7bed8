//! The JSON election document read by every command.
//!
//! ```json
//! {
//!   "config": { "seats": 2, "quotaMethod": "droop", "transferMethod": "gregory" },
//!   "candidates": ["Alice", "Bob", "Carol"],
//!   "ballots": [
//!     "12: Alice > Bob",
//!     { "ranking": ["Bob", "Carol"], "count": 4 },
//!     { "ranks": { "Carol": 1, "Alice": 2 } }
//!   ]
//! }
//! ```

use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use stv_tabulator::formats::{CompactLine, FormatError, FormatResult, ParsesInto, RankGrid, RankedNames};
use stv_tabulator::{Ballot, ElectionConfig, Roster};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid election document {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("roster: {0}")]
    Roster(FormatError),
    #[error("ballot {index}: {source}")]
    Ballot { index: usize, source: FormatError },
}

/// Any of the supported ballot layouts.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BallotEntry {
    Line(String),
    Ranked(RankedNames),
    Grid(RankGrid),
}

impl ParsesInto<Ballot> for BallotEntry {
    fn parse_into(&self, roster: &Roster) -> FormatResult<Ballot> {
        match self {
            BallotEntry::Line(line) => CompactLine(line).parse_into(roster),
            BallotEntry::Ranked(ranked) => ranked.parse_into(roster),
            BallotEntry::Grid(grid) => grid.parse_into(roster),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionDocument {
    pub config: ElectionConfig,
    pub candidates: Vec<String>,
    #[serde(default)]
    pub ballots: Vec<BallotEntry>,
}

/// A document resolved against its own roster, ready for the tabulator.
#[derive(Debug, Clone)]
pub struct LoadedElection {
    pub config: ElectionConfig,
    pub roster: Roster,
    pub ballots: Vec<Ballot>,
}

impl ElectionDocument {
    pub fn read(path: &Path) -> Result<Self, DocumentError> {
        let file = File::open(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| DocumentError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(self) -> Result<LoadedElection, DocumentError> {
        let roster = Roster::from_names(self.candidates).map_err(DocumentError::Roster)?;
        let ballots = self
            .ballots
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                entry
                    .parse_into(&roster)
                    .map_err(|source| DocumentError::Ballot { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LoadedElection {
            config: self.config,
            roster,
            ballots,
        })
    }
}
