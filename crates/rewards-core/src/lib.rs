//! # Kids Rewards Core Library
//!
//! This library provides the core business logic for the Kids Rewards
//! tracker. Every operation is available through a standalone CLI binary;
//! any other front-end is meant to be a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **State machine**: [`RewardsState`] holds the points balance and the
//!   ordered list of days, and enforces the strike/award/redeem rules
//! - **Tracker**: [`Tracker`] is the owned context object that runs each
//!   operation to completion (mutate, persist, log)
//! - **Storage**: JSON state file with timestamped backups, TOML configuration
//! - **Audit log**: append-only, timestamp-prefixed text log
//! - **Audio cues**: fire-and-forget playback of per-rule sound files
//!
//! ## Key Components
//!
//! - [`Tracker`]: entry point for front-ends
//! - [`RewardsState`]: pure day/strike/points transitions
//! - [`Store`]: state file persistence and recovery
//! - [`Config`]: application configuration management

pub mod admin;
pub mod audio;
pub mod audit;
pub mod error;
pub mod events;
pub mod rewards;
pub mod rules;
pub mod state;
pub mod storage;
pub mod tracker;

pub use admin::AdminGate;
pub use audio::{CommandPlayer, CueDispatcher, CuePlayer, SystemPlayer};
pub use audit::AuditLog;
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use rewards::{Reward, RewardCatalog};
pub use rules::{rule_text, RULES};
pub use state::{Day, DayOutcome, RewardsState, Strike, StrikePolicy, STRIKE_LIMIT};
pub use storage::{Config, LoadOutcome, Store};
pub use tracker::{Admin, Status, Tracker};
