//! Stock reporting service
//!
//! Read-only grouped counts over vehicle units. Multi-query reports run
//! inside one REPEATABLE READ transaction so a concurrent allocation
//! cannot split the snapshot across groups.

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Grouped unit count for one (variant, color, status) cell
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockGroupCount {
    pub variant_id: Uuid,
    pub model_name: String,
    pub trim_name: String,
    pub color: String,
    pub status: String,
    pub quantity: i64,
}

/// Grouped unit count within one dealer's stock
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DealerStockRow {
    pub dealer_id: Uuid,
    pub dealer_code: String,
    pub dealer_name: String,
    pub variant_id: Uuid,
    pub model_name: String,
    pub color: String,
    pub status: String,
    pub quantity: i64,
}

/// Network-wide stock snapshot
#[derive(Debug, Serialize)]
pub struct NetworkStockOverview {
    pub manufacturer: Vec<StockGroupCount>,
    pub dealers: Vec<DealerStockRow>,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Grouped counts of units in the manufacturer warehouse
    pub async fn manufacturer_stock_report(&self) -> AppResult<Vec<StockGroupCount>> {
        let groups = sqlx::query_as::<_, StockGroupCount>(
            r#"
            SELECT u.variant_id, v.model_name, v.trim_name, u.color, u.status,
                   COUNT(*) AS quantity
            FROM vehicle_units u
            JOIN vehicle_variants v ON v.id = u.variant_id
            WHERE u.location = 'manufacturer'
            GROUP BY u.variant_id, v.model_name, v.trim_name, u.color, u.status
            ORDER BY v.model_name, v.trim_name, u.color, u.status
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(groups)
    }

    /// Grouped counts of units in one dealer's stock
    pub async fn dealer_stock_report(&self, dealer_id: Uuid) -> AppResult<Vec<StockGroupCount>> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM dealers WHERE id = $1)")
                .bind(dealer_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Dealer".to_string()));
        }

        let groups = sqlx::query_as::<_, StockGroupCount>(
            r#"
            SELECT u.variant_id, v.model_name, v.trim_name, u.color, u.status,
                   COUNT(*) AS quantity
            FROM vehicle_units u
            JOIN vehicle_variants v ON v.id = u.variant_id
            WHERE u.location = 'dealer' AND u.dealer_id = $1
            GROUP BY u.variant_id, v.model_name, v.trim_name, u.color, u.status
            ORDER BY v.model_name, v.trim_name, u.color, u.status
            "#,
        )
        .bind(dealer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(groups)
    }

    /// Network-wide snapshot: manufacturer groups plus per-dealer groups.
    /// Both queries read the same snapshot so totals reconcile even while
    /// allocations run.
    pub async fn network_stock_overview(&self) -> AppResult<NetworkStockOverview> {
        let mut tx = self.db.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let manufacturer = sqlx::query_as::<_, StockGroupCount>(
            r#"
            SELECT u.variant_id, v.model_name, v.trim_name, u.color, u.status,
                   COUNT(*) AS quantity
            FROM vehicle_units u
            JOIN vehicle_variants v ON v.id = u.variant_id
            WHERE u.location = 'manufacturer'
            GROUP BY u.variant_id, v.model_name, v.trim_name, u.color, u.status
            ORDER BY v.model_name, v.trim_name, u.color, u.status
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let dealers = sqlx::query_as::<_, DealerStockRow>(
            r#"
            SELECT u.dealer_id, d.dealer_code, d.name AS dealer_name,
                   u.variant_id, v.model_name, u.color, u.status,
                   COUNT(*) AS quantity
            FROM vehicle_units u
            JOIN dealers d ON d.id = u.dealer_id
            JOIN vehicle_variants v ON v.id = u.variant_id
            WHERE u.location = 'dealer'
            GROUP BY u.dealer_id, d.dealer_code, d.name, u.variant_id, v.model_name,
                     u.color, u.status
            ORDER BY d.dealer_code, v.model_name, u.color, u.status
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(NetworkStockOverview {
            manufacturer,
            dealers,
        })
    }

    /// Serialize report rows to CSV for download
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record).map_err(|e| {
                crate::error::AppError::Internal(format!("CSV serialization error: {}", e))
            })?;
        }
        let csv_data = String::from_utf8(wtr.into_inner().map_err(|e| {
            crate::error::AppError::Internal(format!("CSV writer error: {}", e))
        })?)
        .map_err(|e| crate::error::AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_to_csv_includes_headers_and_rows() {
        let rows = vec![
            StockGroupCount {
                variant_id: Uuid::nil(),
                model_name: "Metro EV".to_string(),
                trim_name: "Standard".to_string(),
                color: "red".to_string(),
                status: "available".to_string(),
                quantity: 5,
            },
            StockGroupCount {
                variant_id: Uuid::nil(),
                model_name: "Metro EV".to_string(),
                trim_name: "Standard".to_string(),
                color: "blue".to_string(),
                status: "sold".to_string(),
                quantity: 2,
            },
        ];

        let csv = ReportingService::export_to_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().contains("model_name"));
        assert_eq!(lines.count(), 2);
        assert!(csv.contains("Metro EV"));
        assert!(csv.contains("available"));
    }

    #[test]
    fn test_export_to_csv_empty() {
        let rows: Vec<StockGroupCount> = vec![];
        let csv = ReportingService::export_to_csv(&rows).unwrap();
        assert!(csv.is_empty());
    }
}
