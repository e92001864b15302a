//! Strongly-typed identifiers
//!
//! Records minted by the ledger get random UUIDs. Buildings and units come
//! from the external directory, which issues numeric ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of an expense record
///
/// Displayed in short form (`exp-` plus the first 8 hex digits), which is
/// also accepted wherever a record is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseRecordId(Uuid);

impl ExpenseRecordId {
    const PREFIX: &'static str = "exp-";

    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Whether a short or partial form (e.g. "exp-1a2b3c4d") refers to this ID
    pub fn matches_prefix(&self, s: &str) -> bool {
        let hex = s.strip_prefix(Self::PREFIX).unwrap_or(s);
        !hex.is_empty() && self.0.to_string().starts_with(hex)
    }
}

impl Default for ExpenseRecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExpenseRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.0.simple().to_string();
        write!(f, "{}{}", Self::PREFIX, &hex[..8])
    }
}

impl FromStr for ExpenseRecordId {
    type Err = uuid::Error;

    /// Parses a full UUID, with or without the `exp-` prefix
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(Self::PREFIX).unwrap_or(s);
        Uuid::parse_str(s).map(Self)
    }
}

/// Macro to generate ID wrappers for directory-issued numeric ids
macro_rules! define_numeric_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_numeric_id!(BuildingId, "bld-");
define_numeric_id!(UnitId, "unit-");
