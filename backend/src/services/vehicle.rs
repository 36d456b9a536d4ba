//! Vehicle catalog and stock intake service
//!
//! Variants, unit registration into the manufacturer warehouse, and the
//! terminal sale transition for dealer-held units.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{can_mark_sold, UnitLocation, UnitStatus};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};

/// Vehicle catalog service
#[derive(Clone)]
pub struct VehicleService {
    db: PgPool,
}

/// Vehicle variant record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VariantRecord {
    pub id: Uuid,
    pub model_name: String,
    pub trim_name: String,
    pub battery_kwh: Decimal,
    pub base_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Vehicle unit record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UnitRecord {
    pub id: Uuid,
    pub vin: String,
    pub variant_id: Uuid,
    pub color: String,
    pub status: String,
    pub location: String,
    pub warehouse_id: Option<Uuid>,
    pub dealer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a variant
#[derive(Debug, Deserialize)]
pub struct CreateVariantInput {
    pub model_name: String,
    pub trim_name: String,
    pub battery_kwh: Decimal,
    pub base_price: Decimal,
}

/// Input for registering a batch of units into manufacturer stock
#[derive(Debug, Deserialize)]
pub struct RegisterUnitsInput {
    pub variant_id: Uuid,
    pub color: String,
    pub vins: Vec<String>,
}

/// Filters for listing units
#[derive(Debug, Default, Deserialize)]
pub struct UnitFilter {
    pub variant_id: Option<Uuid>,
    pub color: Option<String>,
    pub status: Option<UnitStatus>,
    pub location: Option<UnitLocation>,
    pub dealer_id: Option<Uuid>,
}

impl VehicleService {
    /// Create a new VehicleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a vehicle variant
    pub async fn create_variant(&self, input: CreateVariantInput) -> AppResult<VariantRecord> {
        if input.model_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "model_name".to_string(),
                message: "Model name cannot be empty".to_string(),
            });
        }
        if input.trim_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "trim_name".to_string(),
                message: "Trim name cannot be empty".to_string(),
            });
        }
        if input.battery_kwh <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "battery_kwh".to_string(),
                message: "Battery capacity must be positive".to_string(),
            });
        }
        if input.base_price <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "base_price".to_string(),
                message: "Base price must be positive".to_string(),
            });
        }

        let variant = sqlx::query_as::<_, VariantRecord>(
            r#"
            INSERT INTO vehicle_variants (model_name, trim_name, battery_kwh, base_price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, model_name, trim_name, battery_kwh, base_price, created_at
            "#,
        )
        .bind(&input.model_name)
        .bind(&input.trim_name)
        .bind(input.battery_kwh)
        .bind(input.base_price)
        .fetch_one(&self.db)
        .await?;

        Ok(variant)
    }

    /// Get a variant
    pub async fn get_variant(&self, variant_id: Uuid) -> AppResult<VariantRecord> {
        sqlx::query_as::<_, VariantRecord>(
            r#"
            SELECT id, model_name, trim_name, battery_kwh, base_price, created_at
            FROM vehicle_variants
            WHERE id = $1
            "#,
        )
        .bind(variant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Variant".to_string()))
    }

    /// List all variants
    pub async fn list_variants(&self) -> AppResult<Vec<VariantRecord>> {
        let variants = sqlx::query_as::<_, VariantRecord>(
            r#"
            SELECT id, model_name, trim_name, battery_kwh, base_price, created_at
            FROM vehicle_variants
            ORDER BY model_name, trim_name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(variants)
    }

    /// Register a batch of units into the active manufacturer warehouse.
    /// The whole batch lands or none of it does.
    pub async fn register_units(&self, input: RegisterUnitsInput) -> AppResult<Vec<UnitRecord>> {
        if input.vins.is_empty() {
            return Err(AppError::Validation {
                field: "vins".to_string(),
                message: "At least one VIN is required".to_string(),
            });
        }

        shared::validate_color(&input.color).map_err(|msg| AppError::Validation {
            field: "color".to_string(),
            message: msg.to_string(),
        })?;

        for vin in &input.vins {
            shared::validate_vin(vin).map_err(|msg| AppError::Validation {
                field: "vins".to_string(),
                message: format!("{}: {}", vin, msg),
            })?;
        }

        for (i, vin) in input.vins.iter().enumerate() {
            if input.vins[..i].contains(vin) {
                return Err(AppError::DuplicateEntry(format!("vin {}", vin)));
            }
        }

        // Variant must exist
        self.get_variant(input.variant_id).await?;

        let warehouse_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM manufacturer_warehouses
            WHERE status = 'active'
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Active manufacturer warehouse".to_string()))?;

        let mut tx = self.db.begin().await?;
        let mut units = Vec::with_capacity(input.vins.len());

        for vin in &input.vins {
            let exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM vehicle_units WHERE vin = $1)")
                    .bind(vin)
                    .fetch_one(&mut *tx)
                    .await?;

            if exists {
                return Err(AppError::DuplicateEntry(format!("vin {}", vin)));
            }

            let unit = sqlx::query_as::<_, UnitRecord>(
                r#"
                INSERT INTO vehicle_units (vin, variant_id, color, status, location, warehouse_id)
                VALUES ($1, $2, $3, 'available', 'manufacturer', $4)
                RETURNING id, vin, variant_id, color, status, location, warehouse_id, dealer_id,
                          created_at, updated_at
                "#,
            )
            .bind(vin)
            .bind(input.variant_id)
            .bind(&input.color)
            .bind(warehouse_id)
            .fetch_one(&mut *tx)
            .await?;

            units.push(unit);
        }

        tx.commit().await?;

        tracing::info!(
            "Registered {} units of variant {} ({}) into manufacturer stock",
            units.len(),
            input.variant_id,
            input.color
        );

        Ok(units)
    }

    /// Get a unit
    pub async fn get_unit(&self, unit_id: Uuid) -> AppResult<UnitRecord> {
        sqlx::query_as::<_, UnitRecord>(
            r#"
            SELECT id, vin, variant_id, color, status, location, warehouse_id, dealer_id,
                   created_at, updated_at
            FROM vehicle_units
            WHERE id = $1
            "#,
        )
        .bind(unit_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle unit".to_string()))
    }

    /// List units matching the given filters, paginated
    pub async fn list_units(
        &self,
        filter: UnitFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<UnitRecord>> {
        let total_items = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM vehicle_units
            WHERE ($1::uuid IS NULL OR variant_id = $1)
              AND ($2::text IS NULL OR color = $2)
              AND ($3::text IS NULL OR status = $3)
              AND ($4::text IS NULL OR location = $4)
              AND ($5::uuid IS NULL OR dealer_id = $5)
            "#,
        )
        .bind(filter.variant_id)
        .bind(filter.color.clone())
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.location.map(|l| l.as_str()))
        .bind(filter.dealer_id)
        .fetch_one(&self.db)
        .await?;

        let page = pagination.page.max(1);
        let per_page = pagination.per_page.clamp(1, 200);
        let offset = i64::from(page - 1) * i64::from(per_page);

        let units = sqlx::query_as::<_, UnitRecord>(
            r#"
            SELECT id, vin, variant_id, color, status, location, warehouse_id, dealer_id,
                   created_at, updated_at
            FROM vehicle_units
            WHERE ($1::uuid IS NULL OR variant_id = $1)
              AND ($2::text IS NULL OR color = $2)
              AND ($3::text IS NULL OR status = $3)
              AND ($4::text IS NULL OR location = $4)
              AND ($5::uuid IS NULL OR dealer_id = $5)
            ORDER BY id
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(filter.variant_id)
        .bind(filter.color)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.location.map(|l| l.as_str()))
        .bind(filter.dealer_id)
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let meta = PaginationMeta::new(
            &Pagination { page, per_page },
            total_items.max(0) as u64,
        );

        Ok(PaginatedResponse {
            data: units,
            pagination: meta,
        })
    }

    /// Mark a dealer-held unit as sold. The transition is irreversible
    /// and takes the unit out of everything the allocation and recall
    /// engines may touch.
    pub async fn mark_unit_sold(&self, unit_id: Uuid) -> AppResult<UnitRecord> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT status, location FROM vehicle_units WHERE id = $1 FOR UPDATE",
        )
        .bind(unit_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle unit".to_string()))?;

        let status = UnitStatus::from_str(&row.0)
            .ok_or_else(|| AppError::Internal(format!("Unknown unit status '{}'", row.0)))?;
        let location = UnitLocation::from_str(&row.1)
            .ok_or_else(|| AppError::Internal(format!("Unknown unit location '{}'", row.1)))?;

        if !can_mark_sold(status, location) {
            return Err(AppError::InvalidStateTransition(format!(
                "Unit is {} at {} and cannot be sold",
                row.0, row.1
            )));
        }

        sqlx::query("UPDATE vehicle_units SET status = 'sold', updated_at = NOW() WHERE id = $1")
            .bind(unit_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_unit(unit_id).await
    }
}
