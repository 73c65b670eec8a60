//! Reward commands for CLI.

use rewards_core::Tracker;
use serde_json::json;

pub fn list() -> Result<(), Box<dyn std::error::Error>> {
    let tracker = Tracker::open()?;
    let rewards: Vec<_> = tracker.rewards().iter().collect();
    println!("{}", serde_json::to_string_pretty(&rewards)?);
    Ok(())
}

pub fn redeem(key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = Tracker::open()?;
    let redeemed = tracker.redeem(key);
    let output = json!({
        "reward": key,
        "redeemed": redeemed,
        "points": tracker.points(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
