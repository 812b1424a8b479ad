//! `charterdesk-dashboard`
//!
//! **Responsibility:** the host side of the dashboard, composed from the
//! pure crates.
//!
//! This crate provides:
//! - Environment configuration and logging bootstrap
//! - Route resolution through the guard (loading / redirect / denied / render)
//! - The sidebar for the current session
//! - The flight board: fetched payload in, round-trip listing out
//!
//! Fetching and rendering stay with the caller.

pub mod board;
pub mod config;
pub mod dashboard;

pub use board::{parse_flights, BoardRow, DayGroup, FlightBoard};
pub use config::DashboardConfig;
pub use dashboard::{bootstrap, Dashboard, FlightBoardView, Screen};
