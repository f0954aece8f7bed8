//! Ballots, candidates and the roster that ties candidate names to ids.

pub mod ballot;
pub mod weight;

pub use ballot::Ballot;
pub use weight::Weight;

use crate::formats::FormatError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Dense index of a candidate in its [`Roster`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(u32);

impl CandidateId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CandidateStatus {
    Standing,
    Elected,
    Eliminated,
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateStatus::Standing => write!(f, "standing"),
            CandidateStatus::Elected => write!(f, "elected"),
            CandidateStatus::Eliminated => write!(f, "eliminated"),
        }
    }
}

/// A candidate as the tabulator tracks it during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: CandidateId,
    pub status: CandidateStatus,
    /// Weight of the ballots currently on this candidate; for an elected
    /// candidate, the weight it keeps.
    pub total: Weight,
}

impl Candidate {
    pub fn new(id: CandidateId) -> Self {
        Self {
            id,
            status: CandidateStatus::Standing,
            total: Weight::ZERO,
        }
    }

    pub fn is_standing(&self) -> bool {
        self.status == CandidateStatus::Standing
    }
}

/// The ordered list of candidates in a contest.
///
/// Display names are opaque to the tabulator; only their position matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
    ids: HashMap<String, CandidateId>,
}

impl Roster {
    pub fn from_names<I, S>(names: I) -> Result<Self, FormatError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roster = Roster::default();
        for name in names {
            let name = name.into();
            if roster.ids.contains_key(&name) {
                return Err(FormatError::DuplicateRosterEntry(name));
            }
            let id = CandidateId::new(roster.names.len() as u32);
            roster.ids.insert(name.clone(), id);
            roster.names.push(name);
        }
        Ok(roster)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, id: CandidateId) -> bool {
        id.index() < self.names.len()
    }

    pub fn id_of(&self, name: &str) -> Option<CandidateId> {
        self.ids.get(name).copied()
    }

    /// Name of a candidate; ids outside the roster render as their index.
    pub fn name(&self, id: CandidateId) -> String {
        self.names
            .get(id.index())
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn ids(&self) -> impl Iterator<Item = CandidateId> + '_ {
        (0..self.names.len()).map(|index| CandidateId::new(index as u32))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_assigns_ids_in_declaration_order() {
        let roster = Roster::from_names(["Alice", "Bob", "Carol"]).unwrap();
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.id_of("Carol"), Some(CandidateId::new(2)));
        assert_eq!(roster.name(CandidateId::new(1)), "Bob");
        assert!(!roster.contains(CandidateId::new(3)));
        assert_eq!(roster.ids().count(), 3);
    }

    #[test]
    fn roster_rejects_duplicate_names() {
        let err = Roster::from_names(["Alice", "Alice"]).unwrap_err();
        assert_eq!(err, FormatError::DuplicateRosterEntry("Alice".to_string()));
    }
}
