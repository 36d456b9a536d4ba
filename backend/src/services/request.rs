//! Dealer stock request service
//!
//! Requests raised by dealers for stock out of the manufacturer
//! warehouse. The allocation engine moves units against approved
//! requests and updates line fulfillment as it goes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::RequestStatus;

/// Dealer request service
#[derive(Clone)]
pub struct RequestService {
    db: PgPool,
}

/// Dealer request record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RequestRecord {
    pub id: Uuid,
    pub dealer_id: Uuid,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item of a dealer request
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RequestItemRecord {
    pub id: Uuid,
    pub request_id: Uuid,
    pub variant_id: Uuid,
    pub color: String,
    pub quantity: i32,
    pub allocated_quantity: i32,
    pub fulfilled: bool,
}

/// Request with its line items
#[derive(Debug, Serialize)]
pub struct RequestWithItems {
    #[serde(flatten)]
    pub request: RequestRecord,
    pub items: Vec<RequestItemRecord>,
}

/// Input line for creating a request
#[derive(Debug, Deserialize)]
pub struct RequestItemInput {
    pub variant_id: Uuid,
    pub color: String,
    pub quantity: i32,
}

/// Input for creating a dealer request
#[derive(Debug, Deserialize)]
pub struct CreateRequestInput {
    pub dealer_id: Uuid,
    pub notes: Option<String>,
    pub items: Vec<RequestItemInput>,
}

impl RequestService {
    /// Create a new RequestService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a request with its line items
    pub async fn create_request(
        &self,
        created_by: Uuid,
        input: CreateRequestInput,
    ) -> AppResult<RequestWithItems> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "At least one line item is required".to_string(),
            });
        }

        for item in &input.items {
            shared::validate_line_quantity(item.quantity).map_err(|msg| {
                AppError::Validation {
                    field: "quantity".to_string(),
                    message: msg.to_string(),
                }
            })?;
            shared::validate_color(&item.color).map_err(|msg| AppError::Validation {
                field: "color".to_string(),
                message: msg.to_string(),
            })?;
        }

        // Reject duplicate (variant, color) lines; fulfillment tracking
        // keys on that pair
        for (i, item) in input.items.iter().enumerate() {
            if input.items[..i]
                .iter()
                .any(|other| other.variant_id == item.variant_id && other.color == item.color)
            {
                return Err(AppError::Validation {
                    field: "items".to_string(),
                    message: format!(
                        "Duplicate line for variant {} color {}",
                        item.variant_id, item.color
                    ),
                });
            }
        }

        // Dealer must exist and be active
        let dealer_status =
            sqlx::query_scalar::<_, String>("SELECT status FROM dealers WHERE id = $1")
                .bind(input.dealer_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Dealer".to_string()))?;

        if dealer_status != "active" {
            return Err(AppError::InvalidStateTransition(format!(
                "Dealer is {} and cannot raise requests",
                dealer_status
            )));
        }

        // All referenced variants must exist
        for item in &input.items {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM vehicle_variants WHERE id = $1)",
            )
            .bind(item.variant_id)
            .fetch_one(&self.db)
            .await?;

            if !exists {
                return Err(AppError::NotFound(format!("Variant {}", item.variant_id)));
            }
        }

        let mut tx = self.db.begin().await?;

        let request_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO dealer_requests (dealer_id, status, notes, created_by)
            VALUES ($1, 'pending', $2, $3)
            RETURNING id
            "#,
        )
        .bind(input.dealer_id)
        .bind(&input.notes)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        for item in &input.items {
            sqlx::query(
                r#"
                INSERT INTO dealer_request_items (request_id, variant_id, color, quantity)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(request_id)
            .bind(item.variant_id)
            .bind(&item.color)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_request(request_id).await
    }

    /// Get a request with its line items
    pub async fn get_request(&self, request_id: Uuid) -> AppResult<RequestWithItems> {
        let request = sqlx::query_as::<_, RequestRecord>(
            r#"
            SELECT id, dealer_id, status, notes, created_by, created_at, updated_at
            FROM dealer_requests
            WHERE id = $1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dealer request".to_string()))?;

        let items = sqlx::query_as::<_, RequestItemRecord>(
            r#"
            SELECT id, request_id, variant_id, color, quantity, allocated_quantity, fulfilled
            FROM dealer_request_items
            WHERE request_id = $1
            ORDER BY variant_id, color
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.db)
        .await?;

        Ok(RequestWithItems { request, items })
    }

    /// List requests, optionally scoped to a dealer and/or status
    pub async fn list_requests(
        &self,
        dealer_id: Option<Uuid>,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<RequestRecord>> {
        let requests = sqlx::query_as::<_, RequestRecord>(
            r#"
            SELECT id, dealer_id, status, notes, created_by, created_at, updated_at
            FROM dealer_requests
            WHERE ($1::uuid IS NULL OR dealer_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(dealer_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(requests)
    }

    /// Move a request through its lifecycle, rejecting transitions the
    /// state machine does not allow
    pub async fn update_status(
        &self,
        request_id: Uuid,
        next: RequestStatus,
    ) -> AppResult<RequestWithItems> {
        let current =
            sqlx::query_scalar::<_, String>("SELECT status FROM dealer_requests WHERE id = $1")
                .bind(request_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Dealer request".to_string()))?;

        let current = RequestStatus::from_str(&current)
            .ok_or_else(|| AppError::Internal(format!("Unknown request status '{}'", current)))?;

        if !current.can_transition_to(next) {
            return Err(AppError::InvalidStateTransition(format!(
                "Request cannot move from {} to {}",
                current.as_str(),
                next.as_str()
            )));
        }

        sqlx::query("UPDATE dealer_requests SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(next.as_str())
            .bind(request_id)
            .execute(&self.db)
            .await?;

        tracing::info!(
            "Dealer request {} moved {} -> {}",
            request_id,
            current.as_str(),
            next.as_str()
        );

        self.get_request(request_id).await
    }
}
