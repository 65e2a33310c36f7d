//! Catalog database operations: veterinarians, service types and products.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Product, ServiceCategory, ServiceType, Veterinarian};
use crate::schedule::WorkSchedule;

impl Database {
    /// Insert or update a veterinarian.
    pub fn upsert_veterinarian(&self, vet: &Veterinarian) -> DbResult<()> {
        let schedule_json = vet
            .work_schedule
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            r#"
            INSERT INTO veterinarians (id, name, license_number, work_schedule, active, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                license_number = excluded.license_number,
                work_schedule = excluded.work_schedule,
                active = excluded.active,
                updated_at = datetime('now')
            "#,
            params![vet.id, vet.name, vet.license_number, schedule_json, vet.active],
        )?;
        Ok(())
    }

    /// Get a veterinarian by ID.
    pub fn get_veterinarian(&self, id: &str) -> DbResult<Option<Veterinarian>> {
        let result = self
            .conn
            .query_row(
                r#"
                SELECT id, name, license_number, work_schedule, active
                FROM veterinarians
                WHERE id = ?
                "#,
                [id],
                veterinarian_row,
            )
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// List veterinarians ordered by name.
    pub fn list_veterinarians(&self, active_only: bool) -> DbResult<Vec<Veterinarian>> {
        let sql = if active_only {
            "SELECT id, name, license_number, work_schedule, active
             FROM veterinarians WHERE active = 1 ORDER BY name"
        } else {
            "SELECT id, name, license_number, work_schedule, active
             FROM veterinarians ORDER BY name"
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], veterinarian_row)?;

        let mut vets = Vec::new();
        for row in rows {
            vets.push(row?.try_into()?);
        }
        Ok(vets)
    }

    /// Replace a veterinarian's weekly schedule. `None` lifts the restriction.
    pub fn update_work_schedule(
        &self,
        vet_id: &str,
        schedule: Option<&WorkSchedule>,
    ) -> DbResult<bool> {
        let schedule_json = schedule.map(serde_json::to_string).transpose()?;
        let rows_affected = self.conn.execute(
            "UPDATE veterinarians SET work_schedule = ?2, updated_at = datetime('now') WHERE id = ?1",
            params![vet_id, schedule_json],
        )?;
        Ok(rows_affected > 0)
    }

    /// Mark a veterinarian as inactive (soft delete).
    pub fn deactivate_veterinarian(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE veterinarians SET active = 0, updated_at = datetime('now') WHERE id = ?",
            [id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Insert or update a service type.
    pub fn upsert_service_type(&self, service: &ServiceType) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO service_types (id, name, category, price, duration_minutes, active, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                category = excluded.category,
                price = excluded.price,
                duration_minutes = excluded.duration_minutes,
                active = excluded.active,
                updated_at = datetime('now')
            "#,
            params![
                service.id,
                service.name,
                service.category.as_str(),
                service.price,
                service.duration_minutes,
                service.active,
            ],
        )?;
        Ok(())
    }

    /// Get a service type by ID.
    pub fn get_service_type(&self, id: &str) -> DbResult<Option<ServiceType>> {
        let result = self
            .conn
            .query_row(
                r#"
                SELECT id, name, category, price, duration_minutes, active
                FROM service_types
                WHERE id = ?
                "#,
                [id],
                service_type_row,
            )
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// List service types ordered by name.
    pub fn list_service_types(&self, active_only: bool) -> DbResult<Vec<ServiceType>> {
        let sql = if active_only {
            "SELECT id, name, category, price, duration_minutes, active
             FROM service_types WHERE active = 1 ORDER BY name"
        } else {
            "SELECT id, name, category, price, duration_minutes, active
             FROM service_types ORDER BY name"
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], service_type_row)?;

        let mut services = Vec::new();
        for row in rows {
            services.push(row?.try_into()?);
        }
        Ok(services)
    }

    /// Insert or update a product.
    pub fn upsert_product(&self, product: &Product) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO products (id, name, unit_price, active, updated_at)
            VALUES (?1, ?2, ?3, ?4, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                unit_price = excluded.unit_price,
                active = excluded.active,
                updated_at = datetime('now')
            "#,
            params![product.id, product.name, product.unit_price, product.active],
        )?;
        Ok(())
    }

    /// Get a product by ID.
    pub fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let product = self
            .conn
            .query_row(
                "SELECT id, name, unit_price, active FROM products WHERE id = ?",
                [id],
                product_row,
            )
            .optional()?;
        Ok(product)
    }

    /// List products ordered by name.
    pub fn list_products(&self, active_only: bool) -> DbResult<Vec<Product>> {
        let sql = if active_only {
            "SELECT id, name, unit_price, active FROM products WHERE active = 1 ORDER BY name"
        } else {
            "SELECT id, name, unit_price, active FROM products ORDER BY name"
        };

        let mut stmt = self.conn.prepare(sql)?;
        let products = stmt
            .query_map([], product_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }
}

fn veterinarian_row(row: &Row<'_>) -> rusqlite::Result<VeterinarianRow> {
    Ok(VeterinarianRow {
        id: row.get(0)?,
        name: row.get(1)?,
        license_number: row.get(2)?,
        work_schedule: row.get(3)?,
        active: row.get(4)?,
    })
}

fn service_type_row(row: &Row<'_>) -> rusqlite::Result<ServiceTypeRow> {
    Ok(ServiceTypeRow {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        price: row.get(3)?,
        duration_minutes: row.get(4)?,
        active: row.get(5)?,
    })
}

fn product_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        unit_price: row.get(2)?,
        active: row.get(3)?,
    })
}

/// Intermediate row struct for database mapping.
struct VeterinarianRow {
    id: String,
    name: String,
    license_number: Option<String>,
    work_schedule: Option<String>,
    active: bool,
}

impl TryFrom<VeterinarianRow> for Veterinarian {
    type Error = DbError;

    fn try_from(row: VeterinarianRow) -> Result<Self, Self::Error> {
        Ok(Veterinarian {
            id: row.id,
            name: row.name,
            license_number: row.license_number,
            work_schedule: row
                .work_schedule
                .map(|s| serde_json::from_str(&s))
                .transpose()?,
            active: row.active,
        })
    }
}

struct ServiceTypeRow {
    id: String,
    name: String,
    category: String,
    price: f64,
    duration_minutes: u32,
    active: bool,
}

impl TryFrom<ServiceTypeRow> for ServiceType {
    type Error = DbError;

    fn try_from(row: ServiceTypeRow) -> Result<Self, Self::Error> {
        let category: ServiceCategory = row.category.parse().map_err(DbError::Constraint)?;
        Ok(ServiceType {
            id: row.id,
            name: row.name,
            category,
            price: row.price,
            duration_minutes: row.duration_minutes,
            active: row.active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{DayOfWeek, DaySchedule};
    use chrono::NaiveTime;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_upsert_and_get_veterinarian() {
        let db = setup_db();

        let mut vet = Veterinarian::new("Dr. Carla Souza".into());
        vet.license_number = Some("CRMV-SP 12345".into());
        db.upsert_veterinarian(&vet).unwrap();

        let retrieved = db.get_veterinarian(&vet.id).unwrap().unwrap();
        assert_eq!(retrieved, vet);
    }

    #[test]
    fn test_veterinarian_without_schedule() {
        let db = setup_db();

        let mut vet = Veterinarian::new("Dr. Free".into());
        vet.work_schedule = None;
        db.upsert_veterinarian(&vet).unwrap();

        let retrieved = db.get_veterinarian(&vet.id).unwrap().unwrap();
        assert!(retrieved.work_schedule.is_none());
    }

    #[test]
    fn test_update_work_schedule() {
        let db = setup_db();
        let vet = Veterinarian::new("Dr. Ana".into());
        db.upsert_veterinarian(&vet).unwrap();

        let mut schedule = WorkSchedule::business_default();
        schedule
            .set_day(
                DayOfWeek::Sunday,
                DaySchedule::new(
                    true,
                    NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
                ),
            )
            .unwrap();

        assert!(db.update_work_schedule(&vet.id, Some(&schedule)).unwrap());
        let retrieved = db.get_veterinarian(&vet.id).unwrap().unwrap();
        assert_eq!(retrieved.work_schedule, Some(schedule));

        assert!(!db.update_work_schedule("missing", None).unwrap());
    }

    #[test]
    fn test_deactivate_veterinarian() {
        let db = setup_db();
        let vet = Veterinarian::new("Dr. Ana".into());
        db.upsert_veterinarian(&vet).unwrap();

        db.deactivate_veterinarian(&vet.id).unwrap();

        assert!(db.list_veterinarians(true).unwrap().is_empty());
        assert_eq!(db.list_veterinarians(false).unwrap().len(), 1);
    }

    #[test]
    fn test_service_type_round_trip() {
        let db = setup_db();

        let mut service = ServiceType::new("Annual exam".into(), ServiceCategory::Exam, 120.0);
        service.duration_minutes = 45;
        db.upsert_service_type(&service).unwrap();

        let retrieved = db.get_service_type(&service.id).unwrap().unwrap();
        assert_eq!(retrieved, service);

        service.price = 150.0;
        db.upsert_service_type(&service).unwrap();
        let retrieved = db.get_service_type(&service.id).unwrap().unwrap();
        assert_eq!(retrieved.price, 150.0);
    }

    #[test]
    fn test_list_products_sorted() {
        let db = setup_db();

        db.upsert_product(&Product::new("Syringe".into(), 2.5)).unwrap();
        db.upsert_product(&Product::new("Bandage".into(), 8.0)).unwrap();

        let names: Vec<String> = db
            .list_products(true)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Bandage", "Syringe"]);
    }

    #[test]
    fn test_missing_records() {
        let db = setup_db();
        assert!(db.get_veterinarian("nope").unwrap().is_none());
        assert!(db.get_service_type("nope").unwrap().is_none());
        assert!(db.get_product("nope").unwrap().is_none());
    }
}
