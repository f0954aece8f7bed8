//! Election rules handed to the tabulator.
//!
//! A configuration is an explicit value passed to [`crate::Tabulator::new`];
//! nothing here is process-wide. The quota and transfer methods have no
//! defaults and must be stated by the caller.

use crate::model::Roster;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("seat count must be at least 1")]
    InvalidSeatCount,
    #[error("no valid votes to compute a quota from")]
    NoValidVotes,
    #[error("unsupported quota method: {0}")]
    UnsupportedQuotaMethod(String),
    #[error("unsupported quota recompute mode: {0}")]
    UnsupportedRecompute(String),
    #[error("unsupported transfer method: {0}")]
    UnsupportedTransferMethod(String),
    #[error("unsupported tie-break policy: {0}")]
    UnsupportedTieBreakPolicy(String),
    #[error("unsupported last-seats rule: {0}")]
    UnsupportedLastSeatsRule(String),
    #[error("unsupported exhaustion policy: {0}")]
    UnsupportedExhaustionPolicy(String),
    #[error("precedence list is missing candidates: {}", .0.join(", "))]
    IncompletePrecedence(Vec<String>),
    #[error("precedence list names unknown candidate: {0}")]
    UnknownPrecedenceCandidate(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigurationError>;

/// Formula turning the valid vote total into the quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaMethod {
    /// `floor(V / (S + 1)) + 1`
    Droop,
    /// `V / S`
    Hare,
}

/// When the quota is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuotaRecompute {
    /// Once, from the initial valid weight.
    #[default]
    PerElection,
    /// At the start of every round, from the weight still in play.
    PerRound,
}

/// How a surplus is shared among the next preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMethod {
    /// Every ballot of the elected candidate moves on at `surplus / total`.
    Gregory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum TieBreakPolicy {
    /// Seeded shuffle; the same seed reproduces the same decisions.
    Random { seed: u64 },
    /// Fewer votes in the most recent earlier round loses.
    ReverseChronological,
    /// Earlier in the list wins.
    ConfiguredOrder { precedence: Vec<String> },
}

impl Default for TieBreakPolicy {
    fn default() -> Self {
        TieBreakPolicy::ReverseChronological
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LastSeatsRule {
    /// Once the standing candidates no longer outnumber the open seats they
    /// are all elected without reaching quota.
    #[default]
    FillRemaining,
    /// Every seat needs a quota; seats may stay open.
    RequireQuota,
}

/// What happens when seats remain but no standing candidate holds any weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExhaustionPolicy {
    /// Elect the standing candidates in vote-total order.
    #[default]
    DeclareByTally,
    /// Stop and report the open seats.
    FlagUnderfilled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionConfig {
    pub seats: u32,
    pub quota_method: QuotaMethod,
    #[serde(default)]
    pub quota_recompute: QuotaRecompute,
    pub transfer_method: TransferMethod,
    #[serde(default)]
    pub tie_break: TieBreakPolicy,
    #[serde(default)]
    pub last_seats_rule: LastSeatsRule,
    #[serde(default)]
    pub exhaustion_policy: ExhaustionPolicy,
    /// Eliminate every zero-vote candidate in one round.
    #[serde(default = "default_bulk_eliminate_zero")]
    pub bulk_eliminate_zero: bool,
}

fn default_bulk_eliminate_zero() -> bool {
    true
}

impl ElectionConfig {
    pub fn new(seats: u32, quota_method: QuotaMethod) -> Self {
        Self {
            seats,
            quota_method,
            quota_recompute: QuotaRecompute::default(),
            transfer_method: TransferMethod::Gregory,
            tie_break: TieBreakPolicy::default(),
            last_seats_rule: LastSeatsRule::default(),
            exhaustion_policy: ExhaustionPolicy::default(),
            bulk_eliminate_zero: default_bulk_eliminate_zero(),
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreakPolicy) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_quota_recompute(mut self, recompute: QuotaRecompute) -> Self {
        self.quota_recompute = recompute;
        self
    }

    pub fn with_last_seats_rule(mut self, rule: LastSeatsRule) -> Self {
        self.last_seats_rule = rule;
        self
    }

    pub fn with_exhaustion_policy(mut self, policy: ExhaustionPolicy) -> Self {
        self.exhaustion_policy = policy;
        self
    }

    pub fn with_bulk_eliminate_zero(mut self, enabled: bool) -> Self {
        self.bulk_eliminate_zero = enabled;
        self
    }

    /// Checks everything that can be checked against the roster alone.
    pub fn validate(&self, roster: &Roster) -> ConfigResult<()> {
        if self.seats == 0 {
            return Err(ConfigurationError::InvalidSeatCount);
        }

        if let TieBreakPolicy::ConfiguredOrder { precedence } = &self.tie_break {
            if let Some(unknown) = precedence.iter().find(|name| roster.id_of(name).is_none()) {
                return Err(ConfigurationError::UnknownPrecedenceCandidate(unknown.clone()));
            }
            let missing: Vec<String> = roster
                .names()
                .iter()
                .filter(|name| !precedence.contains(name))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(ConfigurationError::IncompletePrecedence(missing));
            }
        }

        Ok(())
    }
}

impl fmt::Display for QuotaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaMethod::Droop => write!(f, "droop"),
            QuotaMethod::Hare => write!(f, "hare"),
        }
    }
}

impl FromStr for QuotaMethod {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "droop" => Ok(QuotaMethod::Droop),
            "hare" => Ok(QuotaMethod::Hare),
            other => Err(ConfigurationError::UnsupportedQuotaMethod(other.to_string())),
        }
    }
}

impl fmt::Display for QuotaRecompute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaRecompute::PerElection => write!(f, "per-election"),
            QuotaRecompute::PerRound => write!(f, "per-round"),
        }
    }
}

impl FromStr for QuotaRecompute {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim() {
            "per-election" => Ok(QuotaRecompute::PerElection),
            "per-round" => Ok(QuotaRecompute::PerRound),
            other => Err(ConfigurationError::UnsupportedRecompute(other.to_string())),
        }
    }
}

impl FromStr for TransferMethod {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gregory" => Ok(TransferMethod::Gregory),
            other => Err(ConfigurationError::UnsupportedTransferMethod(other.to_string())),
        }
    }
}

impl FromStr for LastSeatsRule {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim() {
            "fill-remaining" => Ok(LastSeatsRule::FillRemaining),
            "require-quota" => Ok(LastSeatsRule::RequireQuota),
            other => Err(ConfigurationError::UnsupportedLastSeatsRule(other.to_string())),
        }
    }
}

impl FromStr for ExhaustionPolicy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim() {
            "declare-by-tally" => Ok(ExhaustionPolicy::DeclareByTally),
            "flag-underfilled" => Ok(ExhaustionPolicy::FlagUnderfilled),
            other => Err(ConfigurationError::UnsupportedExhaustionPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for TieBreakPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreakPolicy::Random { seed } => write!(f, "random:{}", seed),
            TieBreakPolicy::ReverseChronological => write!(f, "reverse-chronological"),
            TieBreakPolicy::ConfiguredOrder { precedence } => {
                write!(f, "configured-order:{}", precedence.join(","))
            }
        }
    }
}

/// Accepts `random:<seed>`, `reverse-chronological` and
/// `configured-order:<name>,<name>,...`.
impl FromStr for TieBreakPolicy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        let unsupported = || ConfigurationError::UnsupportedTieBreakPolicy(s.to_string());
        let (name, argument) = match s.trim().split_once(':') {
            Some((name, argument)) => (name, Some(argument)),
            None => (s.trim(), None),
        };
        match (name, argument) {
            ("reverse-chronological", None) => Ok(TieBreakPolicy::ReverseChronological),
            ("random", Some(seed)) => seed
                .trim()
                .parse()
                .map(|seed| TieBreakPolicy::Random { seed })
                .map_err(|_| unsupported()),
            ("configured-order", Some(list)) => Ok(TieBreakPolicy::ConfiguredOrder {
                precedence: list
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect(),
            }),
            _ => Err(unsupported()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::from_names(["A", "B", "C"]).unwrap()
    }

    #[test]
    fn parses_camel_case_json() {
        let json = r#"{
            "seats": 2,
            "quotaMethod": "droop",
            "quotaRecompute": "per-round",
            "transferMethod": "gregory",
            "tieBreak": { "policy": "random", "seed": 42 },
            "lastSeatsRule": "require-quota"
        }"#;
        let config: ElectionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.seats, 2);
        assert_eq!(config.quota_method, QuotaMethod::Droop);
        assert_eq!(config.quota_recompute, QuotaRecompute::PerRound);
        assert_eq!(config.tie_break, TieBreakPolicy::Random { seed: 42 });
        assert_eq!(config.last_seats_rule, LastSeatsRule::RequireQuota);
        assert_eq!(config.exhaustion_policy, ExhaustionPolicy::DeclareByTally);
        assert!(config.bulk_eliminate_zero);
    }

    #[test]
    fn quota_method_is_required() {
        let json = r#"{ "seats": 1, "transferMethod": "gregory" }"#;
        assert!(serde_json::from_str::<ElectionConfig>(json).is_err());
    }

    #[test]
    fn rejects_unsupported_names() {
        assert_eq!(
            "imperiali".parse::<QuotaMethod>(),
            Err(ConfigurationError::UnsupportedQuotaMethod("imperiali".to_string()))
        );
        assert!("meek".parse::<TransferMethod>().is_err());
        assert!("coin-flip".parse::<TieBreakPolicy>().is_err());
        assert!("random:abc".parse::<TieBreakPolicy>().is_err());
    }

    #[test]
    fn tie_break_policy_round_trips_through_text() {
        let policy: TieBreakPolicy = "configured-order:C, A,B".parse().unwrap();
        assert_eq!(
            policy,
            TieBreakPolicy::ConfiguredOrder {
                precedence: vec!["C".into(), "A".into(), "B".into()]
            }
        );
        assert_eq!(policy.to_string(), "configured-order:C,A,B");
        assert_eq!(
            "random:7".parse::<TieBreakPolicy>().unwrap(),
            TieBreakPolicy::Random { seed: 7 }
        );
    }

    #[test]
    fn validate_rejects_zero_seats() {
        let config = ElectionConfig::new(0, QuotaMethod::Droop);
        assert_eq!(config.validate(&roster()), Err(ConfigurationError::InvalidSeatCount));
    }

    #[test]
    fn validate_requires_complete_precedence() {
        let config = ElectionConfig::new(1, QuotaMethod::Hare).with_tie_break(
            TieBreakPolicy::ConfiguredOrder {
                precedence: vec!["B".into(), "A".into()],
            },
        );
        assert_eq!(
            config.validate(&roster()),
            Err(ConfigurationError::IncompletePrecedence(vec!["C".into()]))
        );

        let config = config.with_tie_break(TieBreakPolicy::ConfiguredOrder {
            precedence: vec!["B".into(), "A".into(), "C".into(), "Z".into()],
        });
        assert_eq!(
            config.validate(&roster()),
            Err(ConfigurationError::UnknownPrecedenceCandidate("Z".into()))
        );
    }
}
