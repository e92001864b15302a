//! Custom error types for CAM Ledger
//!
//! This module defines the error hierarchy for the ledger using thiserror.
//! Every allocation failure carries the offending field or value so the
//! caller can render a specific message.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{BuildingId, ExpenseStatus};

/// The main error type for CAM Ledger operations
#[derive(Error, Debug)]
pub enum CamError {
    /// Period end not after start, or start in the future
    #[error("Invalid period {start}..{end}: {reason}")]
    InvalidPeriod {
        start: NaiveDate,
        end: NaiveDate,
        reason: &'static str,
    },

    /// Referenced building is not in the directory
    #[error("Building not found: {0}")]
    BuildingNotFound(BuildingId),

    /// The building has no unit records to classify
    #[error("No units defined for building {0}")]
    NoUnitsDefined(BuildingId),

    /// Total leasable area is zero, negative or unset
    #[error("Building {building} has no usable leasable area ({area})")]
    DivisionByZeroArea { building: BuildingId, area: f64 },

    /// A unit area is unusable, or units exceed the registered area
    #[error("Invalid area for {subject}: {reason}")]
    InvalidArea { subject: String, reason: String },

    /// A cost component is below zero
    #[error("Cost component '{component}' cannot be negative: {amount}")]
    NegativeCost {
        component: &'static str,
        amount: String,
    },

    /// The cost components are too large to add up in cents
    #[error(
        "Cost pool overflows: generator fee {generator_fee} + transformer fee \
         {transformer_fee} + other CAM costs {other_cam_costs}"
    )]
    CostPoolOverflow {
        generator_fee: String,
        transformer_fee: String,
        other_cam_costs: String,
    },

    /// A record already exists for the building and period
    #[error("An allocation already exists for building {building} in period {start}..{end}")]
    DuplicatePeriod {
        building: BuildingId,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Caller is not allowed to touch the building's records
    #[error("Not authorized for building {0}")]
    Unauthorized(BuildingId),

    /// Status change refused by the transition policy
    #[error("Cannot change status from {from} to {to}")]
    InvalidStatusTransition {
        from: ExpenseStatus,
        to: ExpenseStatus,
    },

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CamError {
    /// Create a "not found" error for expense records
    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense record",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a duplicate-period rejection
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicatePeriod { .. })
    }

    /// Check if this error was raised while validating allocation input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidPeriod { .. }
                | Self::NoUnitsDefined(_)
                | Self::DivisionByZeroArea { .. }
                | Self::InvalidArea { .. }
                | Self::NegativeCost { .. }
                | Self::CostPoolOverflow { .. }
        )
    }
}

impl From<std::io::Error> for CamError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for CAM Ledger operations
pub type CamResult<T> = Result<T, CamError>;
