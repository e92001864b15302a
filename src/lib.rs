//! CAM Ledger - common-area maintenance cost allocation
//!
//! This library splits a building's shared running costs (generator fee,
//! transformer fee and other CAM costs) between the tenants of occupied
//! units and the building owner, who absorbs the cost of vacant and
//! unallocated area. The owner's share for each billing period is recorded
//! as an expense record, at most once per building and period.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Buildings, units, allocation results and expense records
//! - `storage`: JSON file storage layer
//! - `services`: Allocation pipeline and expense record lifecycle
//! - `audit`: Audit logging system
//! - `cli`: Command handlers for the `camledger` binary
//! - `display`: Terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use cam_ledger::config::paths::LedgerPaths;
//! use cam_ledger::services::ExpenseService;
//! use cam_ledger::storage::Storage;
//!
//! let mut storage = Storage::new(LedgerPaths::new()?)?;
//! storage.load_all()?;
//!
//! let service = ExpenseService::new(&storage);
//! let input = service.prepare(building_id, period, other_cam_costs)?;
//! let summary = service.preview(&input)?;
//! let record = service.create(input)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{CamError, CamResult};
