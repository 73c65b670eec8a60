use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Every state change (and every refused attempt at one) produces an Event.
/// Its `Display` form is the line written to the audit log; front-ends may
/// also render or serialize it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    DayStarted {
        day_id: u32,
        date: Option<String>,
        at: DateTime<Local>,
    },
    StrikeRecorded {
        day_id: u32,
        rule_index: usize,
        reason: String,
        at: DateTime<Local>,
    },
    /// Capped policy refused a strike because the day is already full.
    StrikeRejected {
        day_id: u32,
        limit: usize,
        at: DateTime<Local>,
    },
    DayEnded {
        day_id: u32,
        strikes: usize,
        awarded: bool,
        next_day_id: u32,
        at: DateTime<Local>,
    },
    Redeemed {
        reward: String,
        cost: i64,
        points: i64,
        at: DateTime<Local>,
    },
    RedeemFailed {
        reward: String,
        cost: i64,
        points: i64,
        at: DateTime<Local>,
    },
    UnknownReward {
        key: String,
        at: DateTime<Local>,
    },
    PointsAdjusted {
        delta: i64,
        points: i64,
        at: DateTime<Local>,
    },
    /// `remove_point` with nothing left to remove.
    AdjustRejected {
        points: i64,
        at: DateTime<Local>,
    },
    SystemReset {
        backup: Option<String>,
        at: DateTime<Local>,
    },
    AccessDenied {
        at: DateTime<Local>,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::DayStarted { day_id, .. } => write!(f, "New day started (Day {day_id})"),
            Event::StrikeRecorded { reason, .. } => write!(f, "Strike recorded: {reason}"),
            Event::StrikeRejected { day_id, limit, .. } => write!(
                f,
                "Strike limit reached for current day (Day {day_id}, {limit} strikes)."
            ),
            Event::DayEnded {
                day_id,
                strikes,
                awarded: true,
                ..
            } => write!(f, "Day {day_id} ended: +1 point awarded (strikes: {strikes})."),
            Event::DayEnded {
                day_id, strikes, ..
            } => write!(f, "Day {day_id} ended: no point (strikes: {strikes})."),
            Event::Redeemed { reward, cost, .. } => {
                write!(f, "Redeemed {cost} points for {reward}.")
            }
            Event::RedeemFailed { reward, .. } => {
                write!(f, "Redeem failed (not enough points) for {reward}.")
            }
            Event::UnknownReward { key, .. } => {
                write!(f, "Redeem failed (unknown reward) for {key}.")
            }
            Event::PointsAdjusted { delta, .. } => {
                let unit = if delta.abs() == 1 { "point" } else { "points" };
                write!(f, "Manual {delta:+} {unit} (System).")
            }
            Event::AdjustRejected { .. } => {
                write!(f, "Manual -1 point refused: no points to remove (System).")
            }
            Event::SystemReset { backup: Some(b), .. } => write!(
                f,
                "System reset to default state. Previous data backed up to {b}."
            ),
            Event::SystemReset { backup: None, .. } => {
                write!(f, "System reset to default state.")
            }
            Event::AccessDenied { .. } => write!(f, "Incorrect PIN attempt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_message_is_signed() {
        let at = Local::now();
        let up = Event::PointsAdjusted { delta: 3, points: 3, at };
        let down = Event::PointsAdjusted { delta: -1, points: 2, at };
        assert_eq!(up.to_string(), "Manual +3 points (System).");
        assert_eq!(down.to_string(), "Manual -1 point (System).");
    }

    #[test]
    fn day_ended_message_names_outcome() {
        let at = Local::now();
        let ended = |strikes, awarded| Event::DayEnded {
            day_id: 4,
            strikes,
            awarded,
            next_day_id: 5,
            at,
        };
        let awarded = ended(1, true);
        let missed = ended(3, false);
        assert_eq!(awarded.to_string(), "Day 4 ended: +1 point awarded (strikes: 1).");
        assert_eq!(missed.to_string(), "Day 4 ended: no point (strikes: 3).");
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::AccessDenied { at: Local::now() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "AccessDenied");
    }
}
