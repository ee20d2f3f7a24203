//! Storage layer: trait definition and SQLite backend.

pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteStore;
pub use traits::{PlantStore, TaskFilter};
