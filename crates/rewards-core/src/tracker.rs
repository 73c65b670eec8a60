//! The tracker: one owned context object per process.
//!
//! Front-ends construct a [`Tracker`] once at startup and pass it by `&mut`
//! to every handler. Each operation runs to completion before returning:
//! mutate the state, persist it, append one audit line.

use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::admin::AdminGate;
use crate::audio::{CommandPlayer, CueDispatcher, CuePlayer, SystemPlayer};
use crate::audit::AuditLog;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::rewards::RewardCatalog;
use crate::state::{Day, DayOutcome, RewardsState, Strike, StrikePolicy};
use crate::storage::{data_dir, Config, Store};

/// Summary of the open day, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub day_id: u32,
    pub date: Option<String>,
    pub strikes: usize,
    pub points: i64,
    pub point_awarded: bool,
}

pub struct Tracker {
    state: RewardsState,
    store: Store,
    log: AuditLog,
    cues: Option<CueDispatcher>,
    playing: Vec<JoinHandle<()>>,
    gate: AdminGate,
    policy: StrikePolicy,
    rewards: RewardCatalog,
}

impl Tracker {
    /// Open the tracker in the default data directory with its config.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created or the
    /// config file cannot be parsed.
    pub fn open() -> Result<Self> {
        let dir = data_dir()?;
        let config = Config::load_from(&dir)?;
        Ok(Self::open_in(&dir, &config))
    }

    /// Open the tracker in `dir`, playing cues through `audio.player` (or
    /// the system handler) if audio is enabled.
    pub fn open_in(dir: &Path, config: &Config) -> Self {
        let player: Option<Arc<dyn CuePlayer>> = if !config.audio.enabled {
            None
        } else if let Some(program) = &config.audio.player {
            Some(Arc::new(CommandPlayer::new(program.clone())))
        } else {
            Some(Arc::new(SystemPlayer))
        };
        Self::with_player(dir, config, player)
    }

    /// Open the tracker in `dir` with an explicit cue player (`None` disables
    /// audio).
    ///
    /// Never fails: unusable state is backed up and replaced, and Day 1 is
    /// opened (and persisted) if there is no day yet.
    pub fn with_player(dir: &Path, config: &Config, player: Option<Arc<dyn CuePlayer>>) -> Self {
        let log = AuditLog::new(dir.join(&config.storage.log_file));
        let store = Store::new(dir.join(&config.storage.data_file), log.clone());
        let cues = player.map(|p| CueDispatcher::new(config.audio_dir(dir), p, log.clone()));

        let mut state = store.load().state;
        if let Some(event) = state.ensure_current_day() {
            store.save(&state);
            log.log(event.to_string());
        }
        tracing::info!(
            points = state.points(),
            days = state.days().len(),
            path = %store.path().display(),
            "tracker opened"
        );

        Self {
            state,
            store,
            log,
            cues,
            playing: Vec::new(),
            gate: AdminGate::new(config.admin.pin.clone()),
            policy: config.strikes.policy,
            rewards: config.reward_catalog(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &RewardsState {
        &self.state
    }

    pub fn points(&self) -> i64 {
        self.state.points()
    }

    pub fn current_day(&mut self) -> &Day {
        self.state.current_day()
    }

    pub fn status(&mut self) -> Status {
        let points = self.state.points();
        let day = self.state.current_day();
        Status {
            day_id: day.id,
            date: day.date.clone(),
            strikes: day.strike_count(),
            points,
            point_awarded: day.point_awarded,
        }
    }

    pub fn rewards(&self) -> &RewardCatalog {
        &self.rewards
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Record a strike for `rule_index` and start its audio cue.
    ///
    /// Returns the recorded strike, or `None` if the capped policy refused
    /// it (the refusal is logged).
    ///
    /// # Errors
    /// Returns a validation error if `rule_index` is outside the catalog;
    /// nothing changes and the attempt is logged.
    pub fn add_strike(&mut self, rule_index: usize) -> Result<Option<Strike>> {
        let event = match self.state.add_strike(rule_index, self.policy) {
            Ok(event) => event,
            Err(e) => {
                let number = rule_index.wrapping_add(1);
                self.log.log(format!("Strike rejected: no rule number {number}"));
                return Err(e.into());
            }
        };

        if !matches!(event, Event::StrikeRecorded { .. }) {
            self.log.log(event.to_string());
            return Ok(None);
        }

        self.commit(&event);
        if let Some(handle) = self.cues.as_ref().and_then(|c| c.dispatch(rule_index)) {
            self.playing.push(handle);
        }
        Ok(self
            .state
            .peek_current_day()
            .and_then(|day| day.strikes.last())
            .cloned())
    }

    /// Close the current day, awarding a point if it earned one, and open
    /// the next.
    pub fn end_day(&mut self) -> DayOutcome {
        let (outcome, event) = self.state.end_day();
        self.commit(&event);
        outcome
    }

    /// Redeem the reward with `key`. Returns whether points were spent.
    pub fn redeem(&mut self, key: &str) -> bool {
        let Some(reward) = self.rewards.find(key).cloned() else {
            self.log.log(
                Event::UnknownReward {
                    key: key.to_string(),
                    at: chrono::Local::now(),
                }
                .to_string(),
            );
            return false;
        };

        let event = self.state.redeem(&reward);
        let redeemed = matches!(event, Event::Redeemed { .. });
        if redeemed {
            self.commit(&event);
        } else {
            self.log.log(event.to_string());
        }
        redeemed
    }

    /// Wait up to `timeout` for cues started by [`Tracker::add_strike`] to
    /// finish. Returns `true` if none is still playing.
    ///
    /// Playback threads do not outlive the process, so short-lived
    /// front-ends call this before exiting.
    pub fn wait_for_cues(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let (done, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.playing)
                .into_iter()
                .partition(JoinHandle::is_finished);
            for handle in done {
                if handle.join().is_err() {
                    tracing::warn!("audio thread panicked");
                }
            }
            self.playing = running;

            if self.playing.is_empty() {
                return true;
            }
            if Instant::now() >= deadline {
                tracing::warn!(running = self.playing.len(), "audio cues still playing");
                return false;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    /// Unlock the admin operations with the shared PIN.
    ///
    /// # Errors
    /// Returns [`CoreError::AccessDenied`] on a wrong PIN; the attempt is
    /// logged.
    pub fn admin(&mut self, pin: &str) -> Result<Admin<'_>> {
        if self.gate.check(pin) {
            Ok(Admin { tracker: self })
        } else {
            tracing::warn!("admin access denied");
            self.log.log(
                Event::AccessDenied {
                    at: chrono::Local::now(),
                }
                .to_string(),
            );
            Err(CoreError::AccessDenied)
        }
    }

    fn commit(&mut self, event: &Event) {
        self.store.save(&self.state);
        self.log.log(event.to_string());
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("state", &self.state)
            .field("store", &self.store)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Admin operations, available only through [`Tracker::admin`].
pub struct Admin<'a> {
    tracker: &'a mut Tracker,
}

impl Admin<'_> {
    /// Full audit log, verbatim.
    ///
    /// # Errors
    /// Returns an error if the log file exists but cannot be read.
    pub fn logs(&self) -> Result<String> {
        Ok(self.tracker.log.read_all()?)
    }

    /// Add `delta` to the balance; the result may be negative.
    pub fn adjust(&mut self, delta: i64) -> i64 {
        let event = self.tracker.state.adjust_points(delta);
        self.tracker.commit(&event);
        self.tracker.points()
    }

    pub fn add_point(&mut self) -> i64 {
        let event = self.tracker.state.add_point();
        self.tracker.commit(&event);
        self.tracker.points()
    }

    /// Remove one point unless the balance is already zero (or below).
    pub fn remove_point(&mut self) -> i64 {
        let event = self.tracker.state.remove_point();
        if matches!(event, Event::PointsAdjusted { .. }) {
            self.tracker.commit(&event);
        } else {
            self.tracker.log.log(event.to_string());
        }
        self.tracker.points()
    }

    /// Back up the stored state, then start over from Day 1 with no points.
    ///
    /// A failed backup is logged and the reset goes ahead.
    pub fn reset(&mut self) {
        let backup = match self.tracker.store.backup("reset") {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(error = %e, "reset backup failed");
                self.tracker.log.log(format!("Reset: failed to backup data ({e})"));
                None
            }
        };

        self.tracker.state.reset();
        let event = Event::SystemReset {
            backup: backup
                .as_deref()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned()),
            at: chrono::Local::now(),
        };
        self.tracker.commit(&event);
    }
}
