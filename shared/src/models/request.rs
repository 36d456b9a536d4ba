//! Dealer stock request lifecycle

use serde::{Deserialize, Serialize};

/// Lifecycle status of a dealer stock request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Delivered,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Delivered => "delivered",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "rejected" => Some(RequestStatus::Rejected),
            "delivered" => Some(RequestStatus::Delivered),
            "cancelled" => Some(RequestStatus::Cancelled),
            _ => None,
        }
    }

    /// Valid lifecycle transitions. Rejected, delivered and cancelled are
    /// terminal.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (*self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
                | (RequestStatus::Pending, RequestStatus::Cancelled)
                | (RequestStatus::Approved, RequestStatus::Delivered)
                | (RequestStatus::Approved, RequestStatus::Cancelled)
        )
    }

    /// Stock may be allocated against a request only after approval and
    /// before delivery.
    pub fn allows_allocation(&self) -> bool {
        matches!(self, RequestStatus::Approved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Rejected));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Cancelled));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Delivered));
    }

    #[test]
    fn test_approved_transitions() {
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::Delivered));
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::Cancelled));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Pending));
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Rejected));
    }

    #[test]
    fn test_only_approved_allows_allocation() {
        assert!(RequestStatus::Approved.allows_allocation());
        assert!(!RequestStatus::Pending.allows_allocation());
        assert!(!RequestStatus::Delivered.allows_allocation());
        assert!(!RequestStatus::Rejected.allows_allocation());
        assert!(!RequestStatus::Cancelled.allows_allocation());
    }
}
