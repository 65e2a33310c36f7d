//! Appointment database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::{Database, DbError, DbResult};
use crate::models::slot::{format_date, format_slot_time, parse_date, parse_slot_time};
use crate::models::{Appointment, AppointmentStatus};

const APPOINTMENT_COLUMNS: &str = "id, animal_id, veterinarian_id, service_type_id, room_id, \
     date, time, status, products, total_price, notes, cancellation_reason, created_at, updated_at";

impl Database {
    /// Insert a new appointment.
    pub fn insert_appointment(&self, appointment: &Appointment) -> DbResult<()> {
        let products_json = serde_json::to_string(&appointment.products)?;

        self.conn.execute(
            r#"
            INSERT INTO appointments (
                id, animal_id, veterinarian_id, service_type_id, room_id,
                date, time, status, products, total_price, notes,
                cancellation_reason, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                appointment.id,
                appointment.animal_id,
                appointment.veterinarian_id,
                appointment.service_type_id,
                appointment.room_id,
                format_date(appointment.date),
                format_slot_time(appointment.time),
                status_to_string(appointment.status),
                products_json,
                appointment.total_price,
                appointment.notes,
                appointment.cancellation_reason,
                appointment.created_at,
                appointment.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing appointment.
    pub fn update_appointment(&self, appointment: &Appointment) -> DbResult<bool> {
        let products_json = serde_json::to_string(&appointment.products)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE appointments SET
                animal_id = ?2,
                veterinarian_id = ?3,
                service_type_id = ?4,
                room_id = ?5,
                date = ?6,
                time = ?7,
                status = ?8,
                products = ?9,
                total_price = ?10,
                notes = ?11,
                cancellation_reason = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
            params![
                appointment.id,
                appointment.animal_id,
                appointment.veterinarian_id,
                appointment.service_type_id,
                appointment.room_id,
                format_date(appointment.date),
                format_slot_time(appointment.time),
                status_to_string(appointment.status),
                products_json,
                appointment.total_price,
                appointment.notes,
                appointment.cancellation_reason,
                appointment.updated_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get an appointment by ID.
    pub fn get_appointment(&self, id: &str) -> DbResult<Option<Appointment>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {} FROM appointments WHERE id = ?", APPOINTMENT_COLUMNS),
                [id],
                appointment_row,
            )
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// All appointments on `date`, any status, ordered by time.
    ///
    /// Day view only; the booking validator reads
    /// [`list_booked_appointments_on`](Self::list_booked_appointments_on).
    pub fn list_appointments_on(&self, date: NaiveDate) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM appointments WHERE date = ? ORDER BY time, created_at",
            APPOINTMENT_COLUMNS
        ))?;
        let rows = stmt.query_map([format_date(date)], appointment_row)?;
        collect_appointments(rows)
    }

    /// Appointments on `date` that still hold their slot.
    ///
    /// Cancelled and no-show appointments release the slot and are left out.
    pub fn list_booked_appointments_on(&self, date: NaiveDate) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM appointments
             WHERE date = ? AND status NOT IN ('cancelled', 'no_show')
             ORDER BY time, created_at",
            APPOINTMENT_COLUMNS
        ))?;
        let rows = stmt.query_map([format_date(date)], appointment_row)?;
        collect_appointments(rows)
    }

    /// All appointments for an animal, most recent first.
    pub fn list_appointments_for_animal(&self, animal_id: &str) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM appointments WHERE animal_id = ? ORDER BY date DESC, time DESC",
            APPOINTMENT_COLUMNS
        ))?;
        let rows = stmt.query_map([animal_id], appointment_row)?;
        collect_appointments(rows)
    }

    /// A veterinarian's appointments on `date`, ordered by time.
    pub fn list_appointments_for_veterinarian(
        &self,
        veterinarian_id: &str,
        date: NaiveDate,
    ) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM appointments WHERE veterinarian_id = ?1 AND date = ?2 ORDER BY time",
            APPOINTMENT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![veterinarian_id, format_date(date)], appointment_row)?;
        collect_appointments(rows)
    }

    /// Appointments in a given status, ordered by slot.
    pub fn list_appointments_by_status(
        &self,
        status: AppointmentStatus,
    ) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM appointments WHERE status = ? ORDER BY date, time",
            APPOINTMENT_COLUMNS
        ))?;
        let rows = stmt.query_map([status_to_string(status)], appointment_row)?;
        collect_appointments(rows)
    }

    /// Hard-delete an appointment.
    ///
    /// Non-terminal appointments are only deleted with `confirmed = true`.
    /// Appointments with a recorded sale are never deleted.
    pub fn delete_appointment(&self, id: &str, confirmed: bool) -> DbResult<bool> {
        let status: Option<String> = self
            .conn
            .query_row("SELECT status FROM appointments WHERE id = ?", [id], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(status) = status else {
            return Ok(false);
        };

        let status = string_to_status(&status)?;
        if !status.is_terminal() && !confirmed {
            return Err(DbError::Constraint(format!(
                "Appointment {} is {}; deleting it requires confirmation",
                id, status
            )));
        }

        let has_sale: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM pending_sales WHERE appointment_id = ?)",
            [id],
            |row| row.get(0),
        )?;
        if has_sale {
            return Err(DbError::Constraint(format!(
                "Appointment {} has a recorded sale",
                id
            )));
        }

        let rows_affected = self
            .conn
            .execute("DELETE FROM appointments WHERE id = ?", [id])?;
        info!(appointment_id = id, status = %status, "appointment deleted");
        Ok(rows_affected > 0)
    }
}

fn appointment_row(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        animal_id: row.get(1)?,
        veterinarian_id: row.get(2)?,
        service_type_id: row.get(3)?,
        room_id: row.get(4)?,
        date: row.get(5)?,
        time: row.get(6)?,
        status: row.get(7)?,
        products: row.get(8)?,
        total_price: row.get(9)?,
        notes: row.get(10)?,
        cancellation_reason: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn collect_appointments(
    rows: impl Iterator<Item = rusqlite::Result<AppointmentRow>>,
) -> DbResult<Vec<Appointment>> {
    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(row?.try_into()?);
    }
    Ok(appointments)
}

/// Intermediate row struct for database mapping.
struct AppointmentRow {
    id: String,
    animal_id: String,
    veterinarian_id: Option<String>,
    service_type_id: String,
    room_id: Option<String>,
    date: String,
    time: String,
    status: String,
    products: String,
    total_price: f64,
    notes: Option<String>,
    cancellation_reason: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DbError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            animal_id: row.animal_id,
            veterinarian_id: row.veterinarian_id,
            service_type_id: row.service_type_id,
            room_id: row.room_id,
            date: parse_date(&row.date)?,
            time: parse_slot_time(&row.time)?,
            status: string_to_status(&row.status)?,
            products: serde_json::from_str(&row.products)?,
            total_price: row.total_price,
            notes: row.notes,
            cancellation_reason: row.cancellation_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn status_to_string(status: AppointmentStatus) -> &'static str {
    status.as_str()
}

fn string_to_status(s: &str) -> Result<AppointmentStatus, DbError> {
    match s {
        "scheduled" => Ok(AppointmentStatus::Scheduled),
        "confirmed" => Ok(AppointmentStatus::Confirmed),
        "in_progress" => Ok(AppointmentStatus::InProgress),
        "completed" => Ok(AppointmentStatus::Completed),
        "cancelled" => Ok(AppointmentStatus::Cancelled),
        "no_show" => Ok(AppointmentStatus::NoShow),
        _ => Err(DbError::Constraint(format!(
            "Unknown appointment status: {}",
            s
        ))),
    }
}
