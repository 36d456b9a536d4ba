//! Dealer directory service
//!
//! Dealers and their 1:1 inventory stock records. The stock record is
//! created in the same transaction as the dealer so the allocation
//! engine can rely on it existing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::DealerStatus;

/// Dealer directory service
#[derive(Clone)]
pub struct DealerService {
    db: PgPool,
}

/// Dealer record with its inventory stock id
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DealerRecord {
    pub id: Uuid,
    pub name: String,
    pub dealer_code: String,
    pub region: Option<String>,
    pub status: String,
    pub inventory_stock_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a dealer
#[derive(Debug, Deserialize)]
pub struct CreateDealerInput {
    pub name: String,
    pub dealer_code: String,
    pub region: Option<String>,
}

/// Input for updating dealer master data
#[derive(Debug, Deserialize)]
pub struct UpdateDealerInput {
    pub name: Option<String>,
    pub region: Option<String>,
}

impl DealerService {
    /// Create a new DealerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a dealer together with its inventory stock record
    pub async fn create_dealer(&self, input: CreateDealerInput) -> AppResult<DealerRecord> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Dealer name cannot be empty".to_string(),
            });
        }

        shared::validate_dealer_code(&input.dealer_code).map_err(|msg| AppError::Validation {
            field: "dealer_code".to_string(),
            message: msg.to_string(),
        })?;

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM dealers WHERE dealer_code = $1",
        )
        .bind(&input.dealer_code)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("dealer_code".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let dealer_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO dealers (name, dealer_code, region, status)
            VALUES ($1, $2, $3, 'active')
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.dealer_code)
        .bind(&input.region)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO dealer_inventory_stocks (dealer_id, name)
            VALUES ($1, $2)
            "#,
        )
        .bind(dealer_id)
        .bind(format!("{} stock", input.dealer_code))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_dealer(dealer_id).await
    }

    /// Get a dealer with its inventory stock id
    pub async fn get_dealer(&self, dealer_id: Uuid) -> AppResult<DealerRecord> {
        sqlx::query_as::<_, DealerRecord>(
            r#"
            SELECT d.id, d.name, d.dealer_code, d.region, d.status,
                   s.id AS inventory_stock_id, d.created_at, d.updated_at
            FROM dealers d
            JOIN dealer_inventory_stocks s ON s.dealer_id = d.id
            WHERE d.id = $1
            "#,
        )
        .bind(dealer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dealer".to_string()))
    }

    /// List dealers, optionally filtered by status
    pub async fn list_dealers(&self, status: Option<DealerStatus>) -> AppResult<Vec<DealerRecord>> {
        let dealers = match status {
            Some(status) => {
                sqlx::query_as::<_, DealerRecord>(
                    r#"
                    SELECT d.id, d.name, d.dealer_code, d.region, d.status,
                           s.id AS inventory_stock_id, d.created_at, d.updated_at
                    FROM dealers d
                    JOIN dealer_inventory_stocks s ON s.dealer_id = d.id
                    WHERE d.status = $1
                    ORDER BY d.dealer_code
                    "#,
                )
                .bind(status.as_str())
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, DealerRecord>(
                    r#"
                    SELECT d.id, d.name, d.dealer_code, d.region, d.status,
                           s.id AS inventory_stock_id, d.created_at, d.updated_at
                    FROM dealers d
                    JOIN dealer_inventory_stocks s ON s.dealer_id = d.id
                    ORDER BY d.dealer_code
                    "#,
                )
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(dealers)
    }

    /// Update dealer master data
    pub async fn update_dealer(
        &self,
        dealer_id: Uuid,
        input: UpdateDealerInput,
    ) -> AppResult<DealerRecord> {
        let existing = sqlx::query_as::<_, (String, Option<String>)>(
            "SELECT name, region FROM dealers WHERE id = $1",
        )
        .bind(dealer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dealer".to_string()))?;

        let name = input.name.unwrap_or(existing.0);
        let region = input.region.or(existing.1);

        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Dealer name cannot be empty".to_string(),
            });
        }

        sqlx::query("UPDATE dealers SET name = $1, region = $2, updated_at = NOW() WHERE id = $3")
            .bind(&name)
            .bind(&region)
            .bind(dealer_id)
            .execute(&self.db)
            .await?;

        self.get_dealer(dealer_id).await
    }

    /// Change a dealer's operating status, enforcing the lifecycle
    /// (closed is terminal)
    pub async fn set_status(
        &self,
        dealer_id: Uuid,
        next: DealerStatus,
    ) -> AppResult<DealerRecord> {
        let current = sqlx::query_scalar::<_, String>("SELECT status FROM dealers WHERE id = $1")
            .bind(dealer_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Dealer".to_string()))?;

        let current = DealerStatus::from_str(&current)
            .ok_or_else(|| AppError::Internal(format!("Unknown dealer status '{}'", current)))?;

        if !current.can_transition_to(next) {
            return Err(AppError::InvalidStateTransition(format!(
                "Dealer cannot move from {} to {}",
                current.as_str(),
                next.as_str()
            )));
        }

        sqlx::query("UPDATE dealers SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(next.as_str())
            .bind(dealer_id)
            .execute(&self.db)
            .await?;

        self.get_dealer(dealer_id).await
    }

    /// Whether the dealer exists and may currently receive allocations
    pub async fn is_active_dealer(&self, dealer_id: Uuid) -> AppResult<bool> {
        let status = sqlx::query_scalar::<_, String>("SELECT status FROM dealers WHERE id = $1")
            .bind(dealer_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(matches!(
            status.as_deref().and_then(DealerStatus::from_str),
            Some(DealerStatus::Active)
        ))
    }
}
