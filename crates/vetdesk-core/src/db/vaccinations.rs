//! Vaccination record database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::slot::{format_date, parse_date};
use crate::models::{DoseScheduleEntry, DoseStatus, VaccinationRecord};

const RECORD_COLUMNS: &str = "id, animal_id, vaccine_name, veterinarian_id, series_id, \
     sequence_number, application_date, due_interval_days, next_due, status, cancellation_reason";

impl Database {
    /// Insert every dose of a generated series.
    ///
    /// Callers wanting all-or-nothing behavior run this inside
    /// [`Database::with_immediate_transaction`].
    pub fn insert_vaccination_series(&self, records: &[VaccinationRecord]) -> DbResult<()> {
        let mut stmt = self.conn.prepare(
            r#"
            INSERT INTO vaccination_records (
                id, animal_id, vaccine_name, veterinarian_id, series_id,
                sequence_number, application_date, due_interval_days, next_due,
                status, cancellation_reason
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )?;

        for record in records {
            stmt.execute(params![
                record.id,
                record.animal_id,
                record.vaccine_name,
                record.veterinarian_id,
                record.series_id,
                record.dose.sequence_number,
                format_date(record.dose.application_date),
                record.dose.due_interval_days,
                format_date(record.dose.next_due),
                status_to_string(record.dose.status),
                record.dose.cancellation_reason,
            ])?;
        }
        Ok(())
    }

    /// Get a vaccination record by ID.
    pub fn get_vaccination_record(&self, id: &str) -> DbResult<Option<VaccinationRecord>> {
        let result = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM vaccination_records WHERE id = ?",
                    RECORD_COLUMNS
                ),
                [id],
                record_row,
            )
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// Persist the dose state of an existing record.
    pub fn update_vaccination_record(&self, record: &VaccinationRecord) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE vaccination_records SET
                veterinarian_id = ?2,
                application_date = ?3,
                next_due = ?4,
                status = ?5,
                cancellation_reason = ?6,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                record.id,
                record.veterinarian_id,
                format_date(record.dose.application_date),
                format_date(record.dose.next_due),
                status_to_string(record.dose.status),
                record.dose.cancellation_reason,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Vaccination history of an animal, oldest first.
    pub fn list_vaccinations_for_animal(&self, animal_id: &str) -> DbResult<Vec<VaccinationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM vaccination_records WHERE animal_id = ?
             ORDER BY application_date, series_id, sequence_number",
            RECORD_COLUMNS
        ))?;
        let rows = stmt.query_map([animal_id], record_row)?;
        collect_records(rows)
    }

    /// All doses of one series in sequence order.
    pub fn list_vaccination_series(&self, series_id: &str) -> DbResult<Vec<VaccinationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM vaccination_records WHERE series_id = ? ORDER BY sequence_number",
            RECORD_COLUMNS
        ))?;
        let rows = stmt.query_map([series_id], record_row)?;
        collect_records(rows)
    }

    /// Scheduled doses dated on or after `as_of`, optionally for one animal.
    pub fn list_upcoming_doses(
        &self,
        animal_id: Option<&str>,
        as_of: NaiveDate,
    ) -> DbResult<Vec<VaccinationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM vaccination_records
             WHERE status = 'scheduled'
               AND application_date >= ?1
               AND (?2 IS NULL OR animal_id = ?2)
             ORDER BY application_date, animal_id, sequence_number",
            RECORD_COLUMNS
        ))?;
        let rows = stmt.query_map(params![format_date(as_of), animal_id], record_row)?;
        collect_records(rows)
    }
}

fn record_row(row: &Row<'_>) -> rusqlite::Result<VaccinationRow> {
    Ok(VaccinationRow {
        id: row.get(0)?,
        animal_id: row.get(1)?,
        vaccine_name: row.get(2)?,
        veterinarian_id: row.get(3)?,
        series_id: row.get(4)?,
        sequence_number: row.get(5)?,
        application_date: row.get(6)?,
        due_interval_days: row.get(7)?,
        next_due: row.get(8)?,
        status: row.get(9)?,
        cancellation_reason: row.get(10)?,
    })
}

fn collect_records(
    rows: impl Iterator<Item = rusqlite::Result<VaccinationRow>>,
) -> DbResult<Vec<VaccinationRecord>> {
    let mut records = Vec::new();
    for row in rows {
        records.push(row?.try_into()?);
    }
    Ok(records)
}

/// Intermediate row struct for database mapping.
struct VaccinationRow {
    id: String,
    animal_id: String,
    vaccine_name: String,
    veterinarian_id: Option<String>,
    series_id: String,
    sequence_number: u32,
    application_date: String,
    due_interval_days: u32,
    next_due: String,
    status: String,
    cancellation_reason: Option<String>,
}

impl TryFrom<VaccinationRow> for VaccinationRecord {
    type Error = DbError;

    fn try_from(row: VaccinationRow) -> Result<Self, Self::Error> {
        Ok(VaccinationRecord {
            id: row.id,
            animal_id: row.animal_id,
            vaccine_name: row.vaccine_name,
            veterinarian_id: row.veterinarian_id,
            series_id: row.series_id,
            dose: DoseScheduleEntry {
                sequence_number: row.sequence_number,
                application_date: parse_date(&row.application_date)?,
                due_interval_days: row.due_interval_days,
                next_due: parse_date(&row.next_due)?,
                status: string_to_status(&row.status)?,
                cancellation_reason: row.cancellation_reason,
            },
        })
    }
}

fn status_to_string(status: DoseStatus) -> &'static str {
    status.as_str()
}

fn string_to_status(s: &str) -> Result<DoseStatus, DbError> {
    match s {
        "applied" => Ok(DoseStatus::Applied),
        "scheduled" => Ok(DoseStatus::Scheduled),
        "canceled" => Ok(DoseStatus::Canceled),
        _ => Err(DbError::Constraint(format!("Unknown dose status: {}", s))),
    }
}
