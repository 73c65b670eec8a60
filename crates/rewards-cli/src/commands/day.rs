//! Day and strike commands for CLI.

use std::time::Duration;

use rewards_core::{CoreError, Tracker, RULES};
use serde_json::json;

/// Upper bound on how long `strike` keeps the process alive for its cue.
const CUE_WAIT: Duration = Duration::from_secs(10);

pub fn status() -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = Tracker::open()?;
    println!("{}", serde_json::to_string_pretty(&tracker.status())?);
    Ok(())
}

pub fn rules() -> Result<(), Box<dyn std::error::Error>> {
    for (i, rule) in RULES.iter().enumerate() {
        println!("{}. {rule}", i + 1);
    }
    Ok(())
}

pub fn strike(rule: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = Tracker::open()?;
    // Rule 0 wraps past the catalog; the tracker rejects and logs it like 9.
    let strike = match tracker.add_strike(rule.wrapping_sub(1)) {
        Err(CoreError::Validation(_)) => {
            return Err(format!("no rule number {rule} (see `kids-rewards rules`)").into());
        }
        result => result?,
    };
    let output = json!({
        "recorded": strike.is_some(),
        "strike": strike,
        "status": tracker.status(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    tracker.wait_for_cues(CUE_WAIT);
    Ok(())
}

pub fn end_day() -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = Tracker::open()?;
    let outcome = tracker.end_day();
    let output = json!({
        "awarded": outcome.awarded,
        "new_day_id": outcome.new_day_id,
        "points": tracker.points(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn days() -> Result<(), Box<dyn std::error::Error>> {
    let tracker = Tracker::open()?;
    println!("{}", serde_json::to_string_pretty(tracker.state().days())?);
    Ok(())
}
