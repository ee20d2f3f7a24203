//! # Plantcare Core
//!
//! Core library for Plantcare - a CLI-first plant care tracker with
//! schedule management and sensor-driven health monitoring.
//!
//! This crate provides the domain logic, storage abstractions, and data
//! models independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **storage**: Plant store trait and the SQLite backend
//! - **model**: Users, plant types, plants, care tasks, sensor readings
//! - **status**: Plant health evaluation (basic and sensor branches)
//! - **schedule**: Next-due-date math and care task reconciliation
//! - **calendar**: Date, month, upcoming and overdue task views
//! - **plants**: Plant lifecycle operations
//! - **sensors**: Reading ingestion and sensor assignment
//! - **admin**: Premium management, status sweep, statistics

pub mod admin;
pub mod calendar;
pub mod clock;
pub mod error;
pub mod model;
pub mod plants;
pub mod schedule;
pub mod sensors;
pub mod status;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CareError, Result};
pub use storage::{PlantStore, SqliteStore, TaskFilter};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
