//! Inventory allocation and recall between the manufacturer warehouse
//! and dealer stocks
//!
//! All location mutations of vehicle units go through this service; the
//! unit rows themselves are the only record of where stock sits, so every
//! count is derived by counting rows rather than trusting a cached number.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{DealerStatus, RequestStatus};

/// Inventory service for moving vehicle units between warehouses
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Which warehouse a stock query is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockScope {
    Manufacturer,
    Dealer(Uuid),
}

/// One requested (variant, color, quantity) line of an allocation call
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationItem {
    pub variant_id: Uuid,
    pub color: String,
    pub quantity: i32,
}

/// Input for allocating stock against an approved dealer request
#[derive(Debug, Deserialize)]
pub struct AllocateInput {
    pub dealer_id: Uuid,
    pub items: Vec<AllocationItem>,
}

/// Input for recalling a dealer's stock
#[derive(Debug, Deserialize)]
pub struct RecallInput {
    pub dealer_id: Uuid,
}

/// Outcome of a single allocation line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    Fulfilled,
    Failed,
}

/// Per-item result inside an allocation response
#[derive(Debug, Clone, Serialize)]
pub struct LineItemResult {
    pub variant_id: Uuid,
    pub color: String,
    pub requested: i32,
    pub moved: i32,
    pub unit_ids: Vec<Uuid>,
    pub outcome: ItemOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of an allocation call. Per-item failures are collected here
/// rather than raised, so a caller moving five lines can see three
/// succeed and two fail in one response.
#[derive(Debug, Serialize)]
pub struct AllocationResult {
    pub message: String,
    pub request_id: Uuid,
    pub dealer_id: Uuid,
    pub total_quantity_moved: i64,
    pub moved_unit_ids: Vec<Uuid>,
    pub items: Vec<LineItemResult>,
}

/// Result of a recall call. Zero matching units is a zero-effect
/// success, not an error.
#[derive(Debug, Serialize)]
pub struct RecallResult {
    pub message: String,
    pub request_id: Uuid,
    pub dealer_id: Uuid,
    pub quantity_recalled: i64,
    pub unit_ids: Vec<Uuid>,
}

/// Row for dealer precondition checks
#[derive(Debug, FromRow)]
struct DealerGate {
    status: String,
    has_stock: bool,
}

/// Row for request precondition checks
#[derive(Debug, FromRow)]
struct RequestGate {
    dealer_id: Uuid,
    status: String,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Count units of (variant, color) currently available at a location.
    /// Derived from unit rows on every call; no counter column exists.
    pub async fn count_available(
        &self,
        scope: StockScope,
        variant_id: Uuid,
        color: &str,
    ) -> AppResult<i64> {
        let count = match scope {
            StockScope::Manufacturer => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT COUNT(*) FROM vehicle_units
                    WHERE location = 'manufacturer'
                      AND status = 'available'
                      AND variant_id = $1 AND color = $2
                    "#,
                )
                .bind(variant_id)
                .bind(color)
                .fetch_one(&self.db)
                .await?
            }
            StockScope::Dealer(dealer_id) => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT COUNT(*) FROM vehicle_units
                    WHERE location = 'dealer' AND dealer_id = $3
                      AND status = 'available'
                      AND variant_id = $1 AND color = $2
                    "#,
                )
                .bind(variant_id)
                .bind(color)
                .bind(dealer_id)
                .fetch_one(&self.db)
                .await?
            }
        };

        Ok(count)
    }

    /// Allocate stock from the manufacturer warehouse to a dealer against
    /// an approved request.
    ///
    /// Policy: atomic within an item, best-effort across items. Each line
    /// either moves its full quantity inside one transaction or moves
    /// nothing and is reported as failed; sibling lines are unaffected.
    pub async fn allocate(
        &self,
        request_id: Uuid,
        input: AllocateInput,
    ) -> AppResult<AllocationResult> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "At least one line item is required".to_string(),
            });
        }

        self.check_dealer(input.dealer_id, true).await?;
        self.check_request(request_id, input.dealer_id, true).await?;

        let warehouse_id = self.active_warehouse_id().await?;

        let mut items = Vec::with_capacity(input.items.len());
        let mut moved_unit_ids: Vec<Uuid> = Vec::new();
        let mut total_quantity_moved: i64 = 0;

        for item in &input.items {
            match self
                .allocate_item(warehouse_id, input.dealer_id, request_id, item)
                .await
            {
                Ok(unit_ids) => {
                    total_quantity_moved += unit_ids.len() as i64;
                    items.push(LineItemResult {
                        variant_id: item.variant_id,
                        color: item.color.clone(),
                        requested: item.quantity,
                        moved: unit_ids.len() as i32,
                        unit_ids: unit_ids.clone(),
                        outcome: ItemOutcome::Fulfilled,
                        reason: None,
                    });
                    moved_unit_ids.extend(unit_ids);
                }
                Err(err) => {
                    let reason = match &err {
                        AppError::InsufficientStock {
                            requested,
                            available,
                        } => format!(
                            "Insufficient stock: requested {}, available {}",
                            requested, available
                        ),
                        AppError::Validation { message, .. } => message.clone(),
                        AppError::InvalidStateTransition(msg) => msg.clone(),
                        AppError::DatabaseError(db_err) => {
                            tracing::error!(
                                "Allocation item transaction failed for variant {} / {}: {}",
                                item.variant_id,
                                item.color,
                                db_err
                            );
                            "Storage failure, item rolled back".to_string()
                        }
                        // Anything else is not an item-level condition
                        _ => return Err(err),
                    };
                    items.push(LineItemResult {
                        variant_id: item.variant_id,
                        color: item.color.clone(),
                        requested: item.quantity,
                        moved: 0,
                        unit_ids: Vec::new(),
                        outcome: ItemOutcome::Failed,
                        reason: Some(reason),
                    });
                }
            }
        }

        let fulfilled = items
            .iter()
            .filter(|i| i.outcome == ItemOutcome::Fulfilled)
            .count();
        let message = format!(
            "Allocated {} of {} line items ({} units) to dealer",
            fulfilled,
            items.len(),
            total_quantity_moved
        );

        Ok(AllocationResult {
            message,
            request_id,
            dealer_id: input.dealer_id,
            total_quantity_moved,
            moved_unit_ids,
            items,
        })
    }

    /// Recall all available units from a dealer back to the manufacturer
    /// warehouse. Sold units are never touched.
    pub async fn recall(&self, request_id: Uuid, input: RecallInput) -> AppResult<RecallResult> {
        self.check_dealer(input.dealer_id, false).await?;
        self.check_request(request_id, input.dealer_id, false).await?;

        let warehouse_id = self.active_warehouse_id().await?;

        let mut tx = self.db.begin().await?;

        // Lock the candidate rows so a concurrent sale or allocation
        // cannot race the move
        let unit_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM vehicle_units
            WHERE location = 'dealer' AND dealer_id = $1
              AND status = 'available'
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(input.dealer_id)
        .fetch_all(&mut *tx)
        .await?;

        if unit_ids.is_empty() {
            // Dropping the transaction rolls it back; nothing moved
            return Ok(RecallResult {
                message: "No units to recall".to_string(),
                request_id,
                dealer_id: input.dealer_id,
                quantity_recalled: 0,
                unit_ids: Vec::new(),
            });
        }

        sqlx::query(
            r#"
            UPDATE vehicle_units
            SET location = 'manufacturer', warehouse_id = $1, dealer_id = NULL,
                updated_at = NOW()
            WHERE id = ANY($2)
            "#,
        )
        .bind(warehouse_id)
        .bind(&unit_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let quantity_recalled = unit_ids.len() as i64;

        Ok(RecallResult {
            message: format!("Recalled {} units to manufacturer warehouse", quantity_recalled),
            request_id,
            dealer_id: input.dealer_id,
            quantity_recalled,
            unit_ids,
        })
    }

    /// Move one line item inside a single transaction: pick, relocate,
    /// and update the originating request line's fulfillment bookkeeping.
    async fn allocate_item(
        &self,
        warehouse_id: Uuid,
        dealer_id: Uuid,
        request_id: Uuid,
        item: &AllocationItem,
    ) -> AppResult<Vec<Uuid>> {
        shared::validate_line_quantity(item.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        let mut tx = self.db.begin().await?;

        let unit_ids = Self::pick_units(
            &mut tx,
            warehouse_id,
            item.variant_id,
            &item.color,
            i64::from(item.quantity),
        )
        .await?;

        sqlx::query(
            r#"
            UPDATE vehicle_units
            SET location = 'dealer', dealer_id = $1, warehouse_id = NULL,
                updated_at = NOW()
            WHERE id = ANY($2)
            "#,
        )
        .bind(dealer_id)
        .bind(&unit_ids)
        .execute(&mut *tx)
        .await?;

        // A line is fulfilled only once its full requested quantity is
        // covered; a partially covered line stays open for later calls
        sqlx::query(
            r#"
            UPDATE dealer_request_items
            SET allocated_quantity = allocated_quantity + $4,
                fulfilled = allocated_quantity + $4 >= quantity
            WHERE request_id = $1 AND variant_id = $2 AND color = $3
            "#,
        )
        .bind(request_id)
        .bind(item.variant_id)
        .bind(&item.color)
        .bind(item.quantity)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(unit_ids)
    }

    /// Select `quantity` available unit ids at the manufacturer warehouse
    /// in ascending id order, locking them for the caller's transaction.
    /// The lock makes concurrent picks of the same units impossible: the
    /// second transaction blocks and then no longer sees the rows as
    /// available.
    async fn pick_units(
        tx: &mut Transaction<'_, Postgres>,
        warehouse_id: Uuid,
        variant_id: Uuid,
        color: &str,
        quantity: i64,
    ) -> AppResult<Vec<Uuid>> {
        let unit_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM vehicle_units
            WHERE location = 'manufacturer' AND warehouse_id = $1
              AND status = 'available'
              AND variant_id = $2 AND color = $3
            ORDER BY id
            LIMIT $4
            FOR UPDATE
            "#,
        )
        .bind(warehouse_id)
        .bind(variant_id)
        .bind(color)
        .bind(quantity)
        .fetch_all(&mut **tx)
        .await?;

        if (unit_ids.len() as i64) < quantity {
            return Err(AppError::InsufficientStock {
                requested: quantity,
                available: unit_ids.len() as i64,
            });
        }

        Ok(unit_ids)
    }

    /// Validate dealer existence, stock record, and (optionally) active
    /// status. Allocation requires an active dealer; recall does not, so
    /// stock can be pulled out of a suspended or closing dealer.
    async fn check_dealer(&self, dealer_id: Uuid, must_be_active: bool) -> AppResult<()> {
        let gate = sqlx::query_as::<_, DealerGate>(
            r#"
            SELECT d.status, (s.id IS NOT NULL) AS has_stock
            FROM dealers d
            LEFT JOIN dealer_inventory_stocks s ON s.dealer_id = d.id
            WHERE d.id = $1
            "#,
        )
        .bind(dealer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dealer".to_string()))?;

        if !gate.has_stock {
            return Err(AppError::NotFound("Dealer inventory stock".to_string()));
        }

        if must_be_active && DealerStatus::from_str(&gate.status) != Some(DealerStatus::Active) {
            return Err(AppError::InvalidStateTransition(format!(
                "Dealer is {} and cannot receive allocations",
                gate.status
            )));
        }

        Ok(())
    }

    /// Validate request existence, dealer ownership, and (for allocation)
    /// that its state permits moving stock against it.
    async fn check_request(
        &self,
        request_id: Uuid,
        dealer_id: Uuid,
        for_allocation: bool,
    ) -> AppResult<()> {
        let gate = sqlx::query_as::<_, RequestGate>(
            "SELECT dealer_id, status FROM dealer_requests WHERE id = $1",
        )
        .bind(request_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dealer request".to_string()))?;

        if gate.dealer_id != dealer_id {
            return Err(AppError::Validation {
                field: "dealer_id".to_string(),
                message: "Request does not belong to this dealer".to_string(),
            });
        }

        if for_allocation {
            let allows = RequestStatus::from_str(&gate.status)
                .map(|s| s.allows_allocation())
                .unwrap_or(false);
            if !allows {
                return Err(AppError::InvalidStateTransition(format!(
                    "Request in state '{}' does not permit allocation",
                    gate.status
                )));
            }
        }

        Ok(())
    }

    /// The active manufacturer warehouse, source of allocations and
    /// destination of recalls
    async fn active_warehouse_id(&self) -> AppResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM manufacturer_warehouses
            WHERE status = 'active'
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Active manufacturer warehouse".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_outcome_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ItemOutcome::Fulfilled).unwrap(),
            "\"fulfilled\""
        );
        assert_eq!(
            serde_json::to_string(&ItemOutcome::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_failure_reason_is_serialized_only_when_present() {
        let ok = LineItemResult {
            variant_id: Uuid::new_v4(),
            color: "red".to_string(),
            requested: 2,
            moved: 2,
            unit_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
            outcome: ItemOutcome::Fulfilled,
            reason: None,
        };
        let json = serde_json::to_value(&ok).unwrap();
        assert!(json.get("reason").is_none());

        let failed = LineItemResult {
            reason: Some("Insufficient stock: requested 3, available 2".to_string()),
            outcome: ItemOutcome::Failed,
            moved: 0,
            unit_ids: Vec::new(),
            ..ok
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert!(json["reason"].as_str().unwrap().contains("Insufficient"));
    }
}
