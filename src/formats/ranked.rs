use super::{build_ballot, FormatResult, ParsesInto};
use crate::model::{Ballot, Roster};
use serde::{Deserialize, Serialize};

/// Candidate names in preference order, optionally aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedNames {
    pub ranking: Vec<String>,
    #[serde(default = "one")]
    pub count: u64,
}

fn one() -> u64 {
    1
}

impl RankedNames {
    pub fn new<I, S>(ranking: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ranking: ranking.into_iter().map(Into::into).collect(),
            count: 1,
        }
    }

    pub fn times(mut self, count: u64) -> Self {
        self.count = count;
        self
    }
}

impl ParsesInto<Ballot> for RankedNames {
    fn parse_into(&self, roster: &Roster) -> FormatResult<Ballot> {
        build_ballot(self.ranking.iter().map(String::as_str), self.count, roster)
    }
}
