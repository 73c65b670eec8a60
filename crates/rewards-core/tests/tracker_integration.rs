//! Integration tests for the tracker lifecycle.
//!
//! Each test runs against its own temporary data directory with audio
//! disabled, except the cue test which installs a recording player.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use rewards_core::{
    Config, CuePlayer, Event, Reward, RewardsState, StrikePolicy, Tracker, RULES, STRIKE_LIMIT,
};

fn quiet_config() -> Config {
    let mut config = Config::default();
    config.audio.enabled = false;
    config
}

fn backups(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with(prefix))
                .unwrap_or(false)
        })
        .collect();
    found.sort();
    found
}

#[test]
fn test_two_strikes_earn_a_point() {
    let dir = tempfile::tempdir().unwrap();
    let mut tracker = Tracker::open_in(dir.path(), &quiet_config());

    tracker.add_strike(0).unwrap();
    tracker.add_strike(1).unwrap();
    let outcome = tracker.end_day();

    assert!(outcome.awarded);
    assert_eq!(outcome.new_day_id, 2);
    assert_eq!(tracker.points(), 1);

    let days = tracker.state().days();
    assert_eq!(days.len(), 2);
    assert!(days[0].point_awarded);
    assert_eq!(days[0].strikes.len(), 2);
    assert_eq!(days[1].id, 2);
    assert!(days[1].strikes.is_empty());
    assert!(!days[1].point_awarded);
}

#[test]
fn test_three_strikes_earn_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut tracker = Tracker::open_in(dir.path(), &quiet_config());

    tracker.add_strike(2).unwrap();
    tracker.add_strike(2).unwrap();
    tracker.add_strike(6).unwrap();
    let outcome = tracker.end_day();

    assert!(!outcome.awarded);
    assert_eq!(tracker.points(), 0);
    assert!(!tracker.state().days()[0].point_awarded);
}

#[test]
fn test_redeem_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    let mut tracker = Tracker::open_in(dir.path(), &quiet_config());

    tracker.admin("3136").unwrap().adjust(4);
    assert!(!tracker.redeem("toy"));
    assert_eq!(tracker.points(), 4);

    tracker.admin("3136").unwrap().add_point();
    assert!(tracker.redeem("toy"));
    assert_eq!(tracker.points(), 0);

    tracker.admin("3136").unwrap().adjust(9);
    assert!(!tracker.redeem("hockey_game"));
    assert_eq!(tracker.points(), 9);

    tracker.admin("3136").unwrap().add_point();
    assert!(tracker.redeem("hockey_game"));
    assert_eq!(tracker.points(), 0);
}

#[test]
fn test_configured_reward_is_redeemable() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = quiet_config();
    config
        .set("rewards", r#"[{"key": "movie", "name": "Movie Night", "cost": 2}]"#)
        .unwrap();
    let mut tracker = Tracker::open_in(dir.path(), &config);

    tracker.end_day();
    tracker.end_day();
    assert!(tracker.redeem("movie"));
    assert_eq!(tracker.points(), 0);
}

#[test]
fn test_free_reward_cannot_raise_points() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = quiet_config();
    config.rewards.push(Reward::new("bonus", "Bonus", -50));
    assert!(config.validate().is_err());

    let mut tracker = Tracker::open_in(dir.path(), &config);
    assert!(!tracker.redeem("bonus"));
    assert_eq!(tracker.points(), 0);
}

#[test]
fn test_corrupt_state_file_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let garbage = b"{\"points\": 12, \"days\": [{\"id\": 1,";
    std::fs::write(dir.path().join("data.json"), garbage).unwrap();

    let mut tracker = Tracker::open_in(dir.path(), &quiet_config());

    assert_eq!(tracker.points(), 0);
    assert_eq!(tracker.state().days().len(), 1);
    assert_eq!(tracker.current_day().id, 1);

    let found = backups(dir.path(), "data_corrupt_");
    assert_eq!(found.len(), 1);
    assert_eq!(std::fs::read(&found[0]).unwrap(), garbage);

    let log = std::fs::read_to_string(dir.path().join("logs.txt")).unwrap();
    assert!(log.contains("Bad data.json detected"));
}

#[test]
fn test_legacy_bare_string_strikes_load() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = format!(
        r#"{{"points": 2, "days": [{{"id": 1, "strikes": ["{}", "{}"]}}]}}"#,
        RULES[3], RULES[4]
    );
    std::fs::write(dir.path().join("data.json"), legacy).unwrap();

    let mut tracker = Tracker::open_in(dir.path(), &quiet_config());
    let day = tracker.current_day().clone();
    assert_eq!(day.strikes.len(), 2);
    assert_eq!(day.strikes[0].rule_index, 3);
    assert_eq!(day.strikes[1].rule_index, 4);

    // Legacy days have no award flag; two strikes still earn the point.
    assert!(tracker.end_day().awarded);
    assert_eq!(tracker.points(), 3);
}

#[test]
fn test_reset_twice_keeps_both_backups() {
    let dir = tempfile::tempdir().unwrap();
    let mut tracker = Tracker::open_in(dir.path(), &quiet_config());

    tracker.end_day();
    tracker.admin("3136").unwrap().reset();
    tracker.end_day();
    tracker.end_day();
    tracker.admin("3136").unwrap().reset();

    let found = backups(dir.path(), "data_reset_");
    assert_eq!(found.len(), 2);
    let points: Vec<i64> = found
        .iter()
        .map(|p| {
            let state: RewardsState =
                serde_json::from_str(&std::fs::read_to_string(p).unwrap()).unwrap();
            state.points()
        })
        .collect();
    let mut sorted = points.clone();
    sorted.sort();
    assert_eq!(sorted, vec![1, 2]);
}

#[test]
fn test_strike_plays_cue_in_background() {
    #[derive(Default)]
    struct Recorder(Mutex<Vec<PathBuf>>);

    impl CuePlayer for Recorder {
        fn play(&self, path: &Path) -> std::io::Result<()> {
            self.0.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("audio");
    std::fs::create_dir_all(&audio).unwrap();
    std::fs::write(audio.join("rule5.wav"), b"RIFF").unwrap();

    let recorder = Arc::new(Recorder::default());
    let player: Arc<dyn CuePlayer> = recorder.clone();
    let mut tracker = Tracker::with_player(dir.path(), &Config::default(), Some(player));
    let strike = tracker.add_strike(4).unwrap().expect("strike recorded");
    assert_eq!(strike.rule_index, 4);

    assert!(tracker.wait_for_cues(std::time::Duration::from_secs(5)));
    assert_eq!(*recorder.0.lock().unwrap(), vec![audio.join("rule5.wav")]);
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    /// `end_day` awards exactly when the day stayed under the strike limit,
    /// and never twice for one day.
    #[test]
    fn end_day_awards_iff_under_limit(
        per_day in proptest::collection::vec(
            proptest::collection::vec(0usize..RULES.len(), 0..6),
            1..8,
        ),
        unlimited in any::<bool>(),
    ) {
        let policy = if unlimited { StrikePolicy::Unlimited } else { StrikePolicy::Capped };
        let mut state = RewardsState::new();
        let mut expected_points = 0;

        for (i, rules) in per_day.iter().enumerate() {
            for &rule in rules {
                state.add_strike(rule, policy).unwrap();
            }
            let recorded = state.current_day().strikes.len();
            if policy == StrikePolicy::Capped {
                prop_assert!(recorded <= STRIKE_LIMIT);
            } else {
                prop_assert_eq!(recorded, rules.len());
            }

            let (outcome, event) = state.end_day();
            let should_award = recorded < STRIKE_LIMIT;
            if should_award {
                expected_points += 1;
            }
            prop_assert_eq!(outcome.awarded, should_award);
            prop_assert_eq!(outcome.new_day_id as usize, i + 2);
            let is_day_ended = matches!(
                event,
                Event::DayEnded { strikes, .. } if strikes == recorded
            );
            prop_assert!(is_day_ended);
            prop_assert_eq!(state.points(), expected_points);

            let ids: Vec<u32> = state.days().iter().map(|d| d.id).collect();
            let contiguous: Vec<u32> = (1..=ids.len() as u32).collect();
            prop_assert_eq!(ids, contiguous);
        }

        let new_day = state.current_day();
        prop_assert!(new_day.strikes.is_empty());
        prop_assert!(!new_day.point_awarded);
    }

    /// Saving and loading reproduces the same state.
    #[test]
    fn save_load_roundtrip(
        per_day in proptest::collection::vec(
            proptest::collection::vec(0usize..RULES.len(), 0..4),
            1..5,
        ),
        delta in -20i64..20,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let store = rewards_core::Store::new(
            dir.path().join("data.json"),
            rewards_core::AuditLog::new(dir.path().join("logs.txt")),
        );

        let mut state = RewardsState::new();
        for rules in &per_day {
            for &rule in rules {
                state.add_strike(rule, StrikePolicy::Unlimited).unwrap();
            }
            state.end_day();
        }
        state.adjust_points(delta);

        prop_assert!(store.save(&state));
        let loaded = store.load();
        prop_assert!(loaded.recovered_backup.is_none());
        prop_assert_eq!(loaded.state, state);
    }
}
