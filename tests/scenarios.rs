use stv_tabulator::formats::{parse_all, CompactLine};
use stv_tabulator::reports::{RoundAction, StandingState};
use stv_tabulator::tabulator::{alternate_seeds, Destination};
use stv_tabulator::{
    CandidateId, ElectionConfig, QuotaMethod, Roster, TabulationResult, Tabulator, TieBreakPolicy,
    Weight,
};

fn run(names: &[&str], lines: &[&str], config: ElectionConfig) -> TabulationResult {
    let roster = Roster::from_names(names.iter().copied()).unwrap();
    let lines: Vec<CompactLine> = lines.iter().map(|line| CompactLine(line)).collect();
    let ballots = parse_all(&lines, &roster).unwrap();
    Tabulator::new(config, roster, ballots).unwrap().run().unwrap()
}

fn weight(text: &str) -> Weight {
    text.parse().unwrap()
}

const FIVE: [&str; 5] = ["Alice", "Bob", "Carol", "Dave", "Eve"];

const CASCADE: [&str; 5] = [
    "8: Alice > Bob",
    "3: Bob > Carol",
    "4: Carol",
    "2: Dave > Carol",
    "1: Eve > Dave",
];

#[test]
fn three_seats_with_cascading_surpluses() {
    let result = run(&FIVE, &CASCADE, ElectionConfig::new(3, QuotaMethod::Droop));

    assert_eq!(result.initial_quota, Weight::from_votes(5));
    assert_eq!(result.rounds.len(), 5);
    assert_eq!(
        result.winner_names(),
        vec!["Alice".to_string(), "Bob".to_string(), "Carol".to_string()]
    );

    let second = &result.rounds[1];
    assert_eq!(second.surpluses[0].surplus, Weight::ONE);
    assert_eq!(
        second.received_by(Destination::Candidate(CandidateId::new(2))),
        weight("0.5")
    );
    assert_eq!(second.received_by(Destination::Exhausted), weight("0.5"));

    assert_eq!(
        result.rounds[2].action,
        RoundAction::Eliminate {
            candidates: vec![CandidateId::new(4)]
        }
    );

    let carol = &result.elected[2];
    assert_eq!(carol.round, 5);
    assert_eq!(carol.votes, weight("6.5"));
    assert!(carol.reached_quota);

    assert_eq!(result.exhausted_weight, weight("1.5"));
    assert_eq!(result.rounding_loss, Weight::ZERO);

    let summary = result.summary();
    assert_eq!(summary.winners, result.winner_names());
    assert_eq!(summary.total_rounds, 5);
    assert!(!summary.underfilled);
}

#[test]
fn standings_group_winners_running_and_eliminated() {
    let result = run(&FIVE, &CASCADE, ElectionConfig::new(3, QuotaMethod::Droop));

    let rows = result.standings(4);
    let table: Vec<(&str, StandingState, Weight)> = rows
        .iter()
        .map(|row| (row.name.as_str(), row.state, row.quota_ratio))
        .collect();
    assert_eq!(
        table,
        vec![
            ("Alice", StandingState::Won, Weight::ONE),
            ("Bob", StandingState::Won, Weight::ONE),
            ("Carol", StandingState::Running, weight("0.9")),
            ("Dave", StandingState::Transferring, weight("0.6")),
            ("Eve", StandingState::Eliminated, Weight::ZERO),
        ]
    );

    assert!(result.standings(0).is_empty());
    assert!(result.standings(6).is_empty());
}

#[test]
fn hare_quota_keeps_fractional_precision() {
    let result = run(
        &["A", "B", "C", "D"],
        &["4: A > B", "3: B", "2: C > D", "1: D"],
        ElectionConfig::new(3, QuotaMethod::Hare),
    );

    assert_eq!(result.initial_quota.to_string(), "3.333333333");
    assert_eq!(result.elected[0].name, "A");
    assert_eq!(result.elected.len(), 3);
}

#[test]
fn blank_ballots_do_not_count_toward_quota() {
    let result = run(
        &["A", "B"],
        &["3: A", "2: B", "5:"],
        ElectionConfig::new(1, QuotaMethod::Droop),
    );

    assert_eq!(result.valid_weight, Weight::from_votes(5));
    assert_eq!(result.blank_weight, Weight::from_votes(5));
    assert_eq!(result.initial_quota, Weight::from_votes(3));
    assert_eq!(result.winner_names(), vec!["A".to_string()]);
}

#[test]
fn repeated_runs_share_a_fingerprint() {
    let config = ElectionConfig::new(3, QuotaMethod::Droop);
    let first = run(&FIVE, &CASCADE, config.clone());
    let second = run(&FIVE, &CASCADE, config);

    assert_eq!(first, second);
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
}

#[test]
fn tie_break_policy_changes_the_fingerprint() {
    let lines = ["1: A", "1: B"];
    let by_history = run(&["A", "B"], &lines, ElectionConfig::new(1, QuotaMethod::Droop));
    let by_order = run(
        &["A", "B"],
        &lines,
        ElectionConfig::new(1, QuotaMethod::Droop).with_tie_break(TieBreakPolicy::ConfiguredOrder {
            precedence: vec!["B".into(), "A".into()],
        }),
    );

    assert_eq!(by_history.winner_names(), vec!["A".to_string()]);
    assert_eq!(by_order.winner_names(), vec!["B".to_string()]);
    assert_ne!(
        by_history.fingerprint().unwrap(),
        by_order.fingerprint().unwrap()
    );
}

#[test]
fn alternate_seeds_reproduce_their_own_runs() {
    let roster = Roster::from_names(["A", "B", "C"]).unwrap();
    let lines = [CompactLine("2: A"), CompactLine("2: B"), CompactLine("2: C")];
    let ballots = parse_all(&lines, &roster).unwrap();
    let config = ElectionConfig::new(1, QuotaMethod::Droop);
    let seeds = [11, 12, 13, 14];

    let outcomes = alternate_seeds(&config, &roster, &ballots, &seeds);
    assert_eq!(outcomes.len(), seeds.len());

    for outcome in &outcomes {
        let simulated = outcome.result.as_ref().unwrap();
        let direct = Tabulator::new(
            config
                .clone()
                .with_tie_break(TieBreakPolicy::Random { seed: outcome.seed }),
            roster.clone(),
            ballots.clone(),
        )
        .unwrap()
        .run()
        .unwrap();
        assert_eq!(simulated, &direct);
        assert_eq!(simulated.elected.len(), 1);
    }
}

#[test]
fn result_serializes_with_camel_case_keys() {
    let result = run(&FIVE, &CASCADE, ElectionConfig::new(3, QuotaMethod::Droop));
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["initialQuota"], "5");
    assert_eq!(json["rounds"][0]["action"]["type"], "elect");
    assert_eq!(json["elected"][0]["reachedQuota"], true);

    let restored: TabulationResult = serde_json::from_value(json).unwrap();
    assert_eq!(restored, result);
}

#[test]
fn config_reads_from_json() {
    let config: ElectionConfig = serde_json::from_str(
        r#"{
            "seats": 2,
            "quotaMethod": "hare",
            "quotaRecompute": "per-round",
            "transferMethod": "gregory",
            "tieBreak": { "policy": "random", "seed": 9 },
            "exhaustionPolicy": "flag-underfilled"
        }"#,
    )
    .unwrap();

    assert_eq!(config.seats, 2);
    assert_eq!(config.tie_break, TieBreakPolicy::Random { seed: 9 });
    assert!(config.bulk_eliminate_zero);
}
