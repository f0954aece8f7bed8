//! Single transferable vote tabulation.
//!
//! Hand a [`Tabulator`] a roster, the normalized ballots and an
//! [`ElectionConfig`]; it returns the full round history and the winners in
//! election order. Ballot weights are fixed-point, tie-breaks are seeded or
//! rule-based, and every run over the same input produces the same rounds.
//!
//! ```
//! use stv_tabulator::{ElectionConfig, QuotaMethod, Roster, Tabulator};
//! use stv_tabulator::formats::{parse_all, CompactLine};
//!
//! let roster = Roster::from_names(["A", "B", "C"]).unwrap();
//! let lines = [CompactLine("3: A"), CompactLine("2: B"), CompactLine("2: C > B")];
//! let ballots = parse_all(&lines, &roster).unwrap();
//!
//! let config = ElectionConfig::new(1, QuotaMethod::Droop);
//! let result = Tabulator::new(config, roster, ballots).unwrap().run().unwrap();
//! assert_eq!(result.winner_names(), vec!["B".to_string()]);
//! ```

pub mod config;
pub mod formats;
pub mod model;
pub mod reports;
pub mod tabulator;

pub use config::{
    ConfigurationError, ElectionConfig, ExhaustionPolicy, LastSeatsRule, QuotaMethod,
    QuotaRecompute, TieBreakPolicy, TransferMethod,
};
pub use model::{Ballot, CandidateId, CandidateStatus, Roster, Weight};
pub use reports::{ElectedCandidate, RoundAction, RoundSnapshot, TabulationResult};
pub use tabulator::{Phase, TabulationError, Tabulator};
