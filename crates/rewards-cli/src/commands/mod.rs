pub mod admin;
pub mod config;
pub mod day;
pub mod rewards;
