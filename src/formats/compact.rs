//! One ballot per line: `[count:] name > name > ...`.
//!
//! ```text
//! 3: Alice > Carol
//! Bob > Alice > Carol
//! 2:
//! ```
//!
//! A line with a count but no names is a blank ballot.

use super::{build_ballot, FormatError, FormatResult, ParsesInto};
use crate::model::{Ballot, Roster};
use nom::{
    bytes::complete::take_while1,
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map, map_res, opt, verify},
    multi::separated_list0,
    sequence::{delimited, pair, terminated},
    IResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactLine<'a>(pub &'a str);

fn count_prefix(input: &str) -> IResult<&str, u64> {
    terminated(
        map_res(delimited(space0, digit1, space0), str::parse::<u64>),
        char(':'),
    )(input)
}

fn candidate_name(input: &str) -> IResult<&str, &str> {
    verify(
        map(take_while1(|c: char| c != '>'), str::trim),
        |name: &str| !name.is_empty(),
    )(input)
}

fn ballot_line(input: &str) -> IResult<&str, (Option<u64>, Vec<&str>)> {
    all_consuming(pair(
        opt(count_prefix),
        terminated(separated_list0(char('>'), candidate_name), space0),
    ))(input)
}

impl ParsesInto<Ballot> for CompactLine<'_> {
    fn parse_into(&self, roster: &Roster) -> FormatResult<Ballot> {
        let (_, (count, names)) = ballot_line(self.0).map_err(|err| FormatError::Syntax {
            line: self.0.to_string(),
            reason: err.to_string(),
        })?;
        build_ballot(names, count.unwrap_or(1), roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CandidateId, Weight};

    fn roster() -> Roster {
        Roster::from_names(["Alice", "Bob", "Carol Ann"]).unwrap()
    }

    #[test]
    fn parses_counted_line() {
        let ballot = CompactLine("3: Alice > Carol Ann").parse_into(&roster()).unwrap();
        assert_eq!(ballot.choices(), &[CandidateId::new(0), CandidateId::new(2)]);
        assert_eq!(ballot.weight(), Weight::from_votes(3));
    }

    #[test]
    fn count_is_optional() {
        let ballot = CompactLine("Bob>Alice").parse_into(&roster()).unwrap();
        assert_eq!(ballot.choices(), &[CandidateId::new(1), CandidateId::new(0)]);
        assert_eq!(ballot.weight(), Weight::ONE);
    }

    #[test]
    fn count_without_names_is_blank() {
        let ballot = CompactLine("2: ").parse_into(&roster()).unwrap();
        assert!(ballot.is_blank());
        assert_eq!(ballot.weight(), Weight::from_votes(2));
    }

    #[test]
    fn reports_syntax_errors() {
        let err = CompactLine("Alice > > Bob").parse_into(&roster()).unwrap_err();
        assert!(matches!(err, FormatError::Syntax { .. }));
    }

    #[test]
    fn rejects_zero_count() {
        let err = CompactLine("0: Alice").parse_into(&roster()).unwrap_err();
        assert_eq!(err, FormatError::ZeroCount);
    }
}
