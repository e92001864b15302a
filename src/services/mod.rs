//! Service layer for CAM Ledger
//!
//! Business logic on top of the storage layer: the allocation pipeline
//! (space classifier, cost aggregator, allocation engine), directory
//! capabilities, access control, and the expense record lifecycle.

pub mod access;
pub mod allocation;
pub mod directory;
pub mod expense;

pub use access::{AccessPolicy, AllowAll, BuildingScope};
pub use allocation::{aggregate_costs, allocate, classify_space, compute, validate_period};
pub use directory::{import_directory, prepare_input, BuildingDirectory, OccupancyLookup};
pub use expense::{ExpenseService, RecordFilter};
