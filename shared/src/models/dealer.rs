//! Dealer directory model vocabulary

use serde::{Deserialize, Serialize};

/// Operating status of a dealer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DealerStatus {
    Active,
    Suspended,
    Closed,
}

impl DealerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealerStatus::Active => "active",
            DealerStatus::Suspended => "suspended",
            DealerStatus::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(DealerStatus::Active),
            "suspended" => Some(DealerStatus::Suspended),
            "closed" => Some(DealerStatus::Closed),
            _ => None,
        }
    }

    /// Only active dealers may receive allocations
    pub fn is_active(&self) -> bool {
        matches!(self, DealerStatus::Active)
    }

    /// Valid status changes; closed is terminal
    pub fn can_transition_to(&self, next: DealerStatus) -> bool {
        matches!(
            (*self, next),
            (DealerStatus::Active, DealerStatus::Suspended)
                | (DealerStatus::Active, DealerStatus::Closed)
                | (DealerStatus::Suspended, DealerStatus::Active)
                | (DealerStatus::Suspended, DealerStatus::Closed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            DealerStatus::Active,
            DealerStatus::Suspended,
            DealerStatus::Closed,
        ] {
            assert_eq!(DealerStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_closed_is_terminal() {
        assert!(!DealerStatus::Closed.can_transition_to(DealerStatus::Active));
        assert!(!DealerStatus::Closed.can_transition_to(DealerStatus::Suspended));
    }
}
