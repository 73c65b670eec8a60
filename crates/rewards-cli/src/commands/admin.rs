//! PIN-gated admin commands for CLI.

use clap::Subcommand;
use rewards_core::Tracker;
use serde_json::json;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Print the full audit log
    Logs,
    /// Add or subtract any number of points
    Adjust {
        /// Signed change, e.g. 3 or -2
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Add one point
    AddPoint,
    /// Remove one point (never below zero)
    RemovePoint,
    /// Back up all data and start over from Day 1
    Reset,
}

pub fn run(pin: &str, action: AdminAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = Tracker::open()?;
    let mut admin = tracker.admin(pin)?;

    match action {
        AdminAction::Logs => {
            print!("{}", admin.logs()?);
        }
        AdminAction::Adjust { delta } => {
            let points = admin.adjust(delta);
            let output = json!({ "delta": delta, "points": points });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        AdminAction::AddPoint => {
            let points = admin.add_point();
            println!("{}", serde_json::to_string_pretty(&json!({ "points": points }))?);
        }
        AdminAction::RemovePoint => {
            let points = admin.remove_point();
            println!("{}", serde_json::to_string_pretty(&json!({ "points": points }))?);
        }
        AdminAction::Reset => {
            admin.reset();
            println!("{}", serde_json::to_string_pretty(&tracker.status())?);
        }
    }
    Ok(())
}
