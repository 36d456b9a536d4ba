//! User roles
//!
//! Role checks are explicit enum matches rather than free-form
//! permission strings.

use serde::{Deserialize, Serialize};

/// Roles on the platform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    EvmStaff,
    DealerManager,
    DealerStaff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::EvmStaff => "evm_staff",
            UserRole::DealerManager => "dealer_manager",
            UserRole::DealerStaff => "dealer_staff",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "evm_staff" => Some(UserRole::EvmStaff),
            "dealer_manager" => Some(UserRole::DealerManager),
            "dealer_staff" => Some(UserRole::DealerStaff),
            _ => None,
        }
    }

    /// Moving stock between warehouses is manufacturer-side work
    pub fn can_move_stock(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::EvmStaff)
    }

    /// Dealer directory and catalog administration
    pub fn can_manage_directory(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::EvmStaff)
    }

    /// Dealer-side staff may raise stock requests for their own dealer
    pub fn can_create_request(&self) -> bool {
        matches!(
            self,
            UserRole::Admin | UserRole::EvmStaff | UserRole::DealerManager
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            UserRole::Admin,
            UserRole::EvmStaff,
            UserRole::DealerManager,
            UserRole::DealerStaff,
        ] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::from_str("owner"), None);
    }

    #[test]
    fn test_stock_moves_are_manufacturer_side() {
        assert!(UserRole::Admin.can_move_stock());
        assert!(UserRole::EvmStaff.can_move_stock());
        assert!(!UserRole::DealerManager.can_move_stock());
        assert!(!UserRole::DealerStaff.can_move_stock());
    }

    #[test]
    fn test_dealer_staff_cannot_create_requests() {
        assert!(UserRole::DealerManager.can_create_request());
        assert!(!UserRole::DealerStaff.can_create_request());
    }
}
