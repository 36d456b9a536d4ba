//! Vehicle stock unit vocabulary and location state machine
//!
//! A unit's location columns are the single source of truth for stock
//! counts; per-warehouse quantities are always derived by counting unit
//! rows, never kept as separate counters.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a physical vehicle unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Available,
    Reserved,
    Sold,
}

impl UnitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Available => "available",
            UnitStatus::Reserved => "reserved",
            UnitStatus::Sold => "sold",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(UnitStatus::Available),
            "reserved" => Some(UnitStatus::Reserved),
            "sold" => Some(UnitStatus::Sold),
            _ => None,
        }
    }
}

/// Which kind of warehouse currently holds a unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnitLocation {
    Manufacturer,
    Dealer,
}

impl UnitLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitLocation::Manufacturer => "manufacturer",
            UnitLocation::Dealer => "dealer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "manufacturer" => Some(UnitLocation::Manufacturer),
            "dealer" => Some(UnitLocation::Dealer),
            _ => None,
        }
    }
}

/// A unit may be allocated only out of manufacturer stock and only while
/// still available.
pub fn can_allocate(status: UnitStatus, location: UnitLocation) -> bool {
    status == UnitStatus::Available && location == UnitLocation::Manufacturer
}

/// A unit may be recalled only out of dealer stock; sold units never move.
pub fn can_recall(status: UnitStatus, location: UnitLocation) -> bool {
    status == UnitStatus::Available && location == UnitLocation::Dealer
}

/// A unit may be sold only once it sits in a dealer's stock. Selling is
/// irreversible; no transition leaves the sold state.
pub fn can_mark_sold(status: UnitStatus, location: UnitLocation) -> bool {
    status == UnitStatus::Available && location == UnitLocation::Dealer
}
