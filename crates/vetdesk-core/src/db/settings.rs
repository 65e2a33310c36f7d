//! Clinic settings (single row).

use rusqlite::OptionalExtension;
use tracing::info;

use super::{Database, DbResult};
use crate::models::ClinicPolicy;

impl Database {
    /// Load the stored booking policy, if one has been saved.
    pub fn load_policy(&self) -> DbResult<Option<ClinicPolicy>> {
        let json: Option<String> = self
            .conn
            .query_row("SELECT policy FROM clinic_settings WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(json.map(|s| serde_json::from_str(&s)).transpose()?)
    }

    /// Store the booking policy, replacing any previous one.
    pub fn save_policy(&self, policy: &ClinicPolicy) -> DbResult<()> {
        let json = serde_json::to_string(policy)?;
        self.conn.execute(
            r#"
            INSERT INTO clinic_settings (id, policy, updated_at)
            VALUES (1, ?1, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                policy = excluded.policy,
                updated_at = datetime('now')
            "#,
            [json],
        )?;
        info!(?policy, "clinic policy saved");
        Ok(())
    }

    /// Store `initial` only when no policy exists yet; return the policy in force.
    pub fn seed_policy(&self, initial: &ClinicPolicy) -> DbResult<ClinicPolicy> {
        match self.load_policy()? {
            Some(existing) => Ok(existing),
            None => {
                self.save_policy(initial)?;
                Ok(*initial)
            }
        }
    }

    /// The policy in force, falling back to the default when none is stored.
    pub fn effective_policy(&self) -> DbResult<ClinicPolicy> {
        Ok(self.load_policy()?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_policy_initially() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_policy().unwrap().is_none());
        assert_eq!(db.effective_policy().unwrap(), ClinicPolicy::default());
    }

    #[test]
    fn test_save_and_load_policy() {
        let db = Database::open_in_memory().unwrap();
        let mut policy = ClinicPolicy::default();
        policy.allow_double_booking_for_exam_services = true;

        db.save_policy(&policy).unwrap();
        assert_eq!(db.load_policy().unwrap(), Some(policy));

        policy.prevent_vet_double_booking = false;
        db.save_policy(&policy).unwrap();
        assert_eq!(db.load_policy().unwrap(), Some(policy));
    }

    #[test]
    fn test_seed_only_applies_once() {
        let db = Database::open_in_memory().unwrap();
        let permissive = ClinicPolicy::permissive();

        assert_eq!(db.seed_policy(&permissive).unwrap(), permissive);
        // Later seeds do not overwrite the stored value
        assert_eq!(db.seed_policy(&ClinicPolicy::default()).unwrap(), permissive);
    }
}
