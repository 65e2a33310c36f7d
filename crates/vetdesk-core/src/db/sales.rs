//! Pending sale database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{PendingSale, SaleStatus};

impl Database {
    /// Record the sale for a completed appointment.
    pub fn insert_pending_sale(&self, sale: &PendingSale) -> DbResult<()> {
        let summary_json = serde_json::to_string(&sale.summary)?;

        self.conn.execute(
            r#"
            INSERT INTO pending_sales (
                id, appointment_id, summary, subtotal, status, created_at, exported_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                sale.id,
                sale.appointment_id,
                summary_json,
                sale.subtotal(),
                status_to_string(sale.status),
                sale.created_at,
                sale.exported_at,
            ],
        )?;
        Ok(())
    }

    /// Get a sale by ID.
    pub fn get_pending_sale(&self, id: &str) -> DbResult<Option<PendingSale>> {
        let result = self
            .conn
            .query_row(
                r#"
                SELECT id, appointment_id, summary, status, created_at, exported_at
                FROM pending_sales
                WHERE id = ?
                "#,
                [id],
                sale_row,
            )
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// Get the sale recorded for an appointment.
    pub fn get_sale_for_appointment(&self, appointment_id: &str) -> DbResult<Option<PendingSale>> {
        let result = self
            .conn
            .query_row(
                r#"
                SELECT id, appointment_id, summary, status, created_at, exported_at
                FROM pending_sales
                WHERE appointment_id = ?
                "#,
                [appointment_id],
                sale_row,
            )
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// Sales not yet picked up by the point of sale, oldest first.
    pub fn list_pending_sales(&self) -> DbResult<Vec<PendingSale>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, appointment_id, summary, status, created_at, exported_at
            FROM pending_sales
            WHERE status = 'pending'
            ORDER BY created_at, id
            "#,
        )?;

        let rows = stmt.query_map([], sale_row)?;

        let mut sales = Vec::new();
        for row in rows {
            sales.push(row?.try_into()?);
        }
        Ok(sales)
    }

    /// Mark a sale as exported. Returns false when the sale is unknown or
    /// already exported.
    pub fn mark_sale_exported(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE pending_sales SET status = 'exported', exported_at = datetime('now')
            WHERE id = ? AND status = 'pending'
            "#,
            [id],
        )?;
        Ok(rows_affected > 0)
    }
}

fn sale_row(row: &Row<'_>) -> rusqlite::Result<SaleRow> {
    Ok(SaleRow {
        id: row.get(0)?,
        appointment_id: row.get(1)?,
        summary: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
        exported_at: row.get(5)?,
    })
}

/// Intermediate row struct for database mapping.
struct SaleRow {
    id: String,
    appointment_id: String,
    summary: String,
    status: String,
    created_at: String,
    exported_at: Option<String>,
}

impl TryFrom<SaleRow> for PendingSale {
    type Error = DbError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        Ok(PendingSale {
            id: row.id,
            appointment_id: row.appointment_id,
            summary: serde_json::from_str(&row.summary)?,
            status: string_to_status(&row.status)?,
            created_at: row.created_at,
            exported_at: row.exported_at,
        })
    }
}

fn status_to_string(status: SaleStatus) -> &'static str {
    status.as_str()
}

fn string_to_status(s: &str) -> Result<SaleStatus, DbError> {
    match s {
        "pending" => Ok(SaleStatus::Pending),
        "exported" => Ok(SaleStatus::Exported),
        _ => Err(DbError::Constraint(format!("Unknown sale status: {}", s))),
    }
}
