//! Day/strike/points state machine.
//!
//! ## Day lifecycle
//!
//! ```text
//! Open(strikes < 3, not awarded) --end_day--> Closed(awarded)
//! Open(strikes >= 3)             --end_day--> Closed(not awarded)
//! ```
//!
//! `end_day` always opens the next day, so the last element of `days` is the
//! only open one. All transitions here are in-memory; persistence and
//! logging belong to [`crate::Tracker`].

mod day;

pub use day::{Day, Strike};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;
use crate::rewards::Reward;
use crate::rules::{self, RULES};

/// A day with this many strikes no longer earns a point.
pub const STRIKE_LIMIT: usize = 3;

/// How `add_strike` treats a day that already reached [`STRIKE_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrikePolicy {
    /// Further strikes are refused.
    #[default]
    Capped,
    /// Strikes are always recorded; the limit only gates the point award.
    Unlimited,
}

/// Result of [`RewardsState::end_day`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayOutcome {
    pub awarded: bool,
    pub new_day_id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsState {
    #[serde(default)]
    points: i64,
    #[serde(default)]
    days: Vec<Day>,
}

impl RewardsState {
    /// Fresh state with Day 1 already open.
    pub fn new() -> Self {
        let mut state = Self::default();
        state.ensure_current_day();
        state
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn points(&self) -> i64 {
        self.points
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    /// The open day, without creating one.
    pub fn peek_current_day(&self) -> Option<&Day> {
        self.days.last()
    }

    /// The open day, creating Day 1 if there is none yet.
    pub fn current_day(&mut self) -> &Day {
        self.current_day_mut()
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Open Day 1 if `days` is empty.
    pub fn ensure_current_day(&mut self) -> Option<Event> {
        if self.days.is_empty() {
            Some(self.open_day(1, Local::now()))
        } else {
            None
        }
    }

    /// Record a strike against the open day.
    ///
    /// Under [`StrikePolicy::Capped`] a full day yields
    /// [`Event::StrikeRejected`] and nothing changes.
    ///
    /// # Errors
    /// Returns [`ValidationError::OutOfBounds`] if `rule_index` is not in the
    /// rule catalog.
    pub fn add_strike(
        &mut self,
        rule_index: usize,
        policy: StrikePolicy,
    ) -> Result<Event, ValidationError> {
        let reason = rules::rule_text(rule_index).ok_or_else(|| ValidationError::OutOfBounds {
            collection: "rules".into(),
            index: rule_index,
            len: RULES.len(),
        })?;

        let now = Local::now();
        let day = self.current_day_mut();
        if policy == StrikePolicy::Capped && day.strike_count() >= STRIKE_LIMIT {
            return Ok(Event::StrikeRejected {
                day_id: day.id,
                limit: STRIKE_LIMIT,
                at: now,
            });
        }

        day.strikes.push(Strike {
            rule_index,
            reason: reason.to_string(),
            time: Some(now.format("%H:%M:%S").to_string()),
        });
        Ok(Event::StrikeRecorded {
            day_id: day.id,
            rule_index,
            reason: reason.to_string(),
            at: now,
        })
    }

    /// Close the open day and open the next one.
    ///
    /// Awards one point if the day stayed under [`STRIKE_LIMIT`] and has not
    /// been awarded before.
    pub fn end_day(&mut self) -> (DayOutcome, Event) {
        let now = Local::now();
        let day = self.current_day_mut();
        let day_id = day.id;
        let strikes = day.strike_count();
        let awarded = strikes < STRIKE_LIMIT && !day.point_awarded;
        if awarded {
            day.point_awarded = true;
            self.points += 1;
        }

        let next_day_id = day_id + 1;
        self.open_day(next_day_id, now);
        let outcome = DayOutcome {
            awarded,
            new_day_id: next_day_id,
        };
        let event = Event::DayEnded {
            day_id,
            strikes,
            awarded,
            next_day_id,
            at: now,
        };
        (outcome, event)
    }

    /// Exchange `reward.cost` points for `reward`, if the balance allows.
    pub fn redeem(&mut self, reward: &Reward) -> Event {
        let at = Local::now();
        if self.points >= reward.cost {
            self.points -= reward.cost;
            Event::Redeemed {
                reward: reward.name.clone(),
                cost: reward.cost,
                points: self.points,
                at,
            }
        } else {
            Event::RedeemFailed {
                reward: reward.name.clone(),
                cost: reward.cost,
                points: self.points,
                at,
            }
        }
    }

    /// Add `delta` to the balance unconditionally. The result may be negative.
    pub fn adjust_points(&mut self, delta: i64) -> Event {
        self.points = self.points.saturating_add(delta);
        Event::PointsAdjusted {
            delta,
            points: self.points,
            at: Local::now(),
        }
    }

    pub fn add_point(&mut self) -> Event {
        self.adjust_points(1)
    }

    /// Remove exactly one point; refused when the balance is not positive.
    pub fn remove_point(&mut self) -> Event {
        if self.points > 0 {
            self.adjust_points(-1)
        } else {
            Event::AdjustRejected {
                points: self.points,
                at: Local::now(),
            }
        }
    }

    /// Drop everything and start over from Day 1 with no points.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn current_day_mut(&mut self) -> &mut Day {
        self.ensure_current_day();
        let last = self.days.len() - 1;
        &mut self.days[last]
    }

    fn open_day(&mut self, id: u32, now: DateTime<Local>) -> Event {
        let date = now.format("%Y-%m-%d").to_string();
        self.days.push(Day::new(id, Some(date.clone())));
        Event::DayStarted {
            day_id: id,
            date: Some(date),
            at: now,
        }
    }
}
