//! Environment configuration.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::info;

use crate::db::Database;
use crate::models::ClinicPolicy;

const DEFAULT_DATABASE_PATH: &str = "vetdesk.db";

/// Startup configuration read from the environment (and `.env`).
#[derive(Clone, Debug, PartialEq)]
pub struct ClinicConfig {
    pub database_path: PathBuf,
    /// Policy stored on first open; an existing stored policy wins
    pub initial_policy: ClinicPolicy,
}

impl ClinicConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup("VETDESK_DATABASE_PATH")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        let defaults = ClinicPolicy::default();
        let flag = |key: &str, default: bool| -> anyhow::Result<bool> {
            match lookup(key) {
                Some(raw) => parse_flag(&raw).with_context(|| format!("invalid value for {}", key)),
                None => Ok(default),
            }
        };

        let initial_policy = ClinicPolicy {
            prevent_animal_double_booking: flag(
                "VETDESK_PREVENT_ANIMAL_DOUBLE_BOOKING",
                defaults.prevent_animal_double_booking,
            )?,
            prevent_vet_double_booking: flag(
                "VETDESK_PREVENT_VET_DOUBLE_BOOKING",
                defaults.prevent_vet_double_booking,
            )?,
            prevent_booking_outside_work_hours: flag(
                "VETDESK_PREVENT_BOOKING_OUTSIDE_WORK_HOURS",
                defaults.prevent_booking_outside_work_hours,
            )?,
            allow_double_booking_for_exam_services: flag(
                "VETDESK_ALLOW_EXAM_DOUBLE_BOOKING",
                defaults.allow_double_booking_for_exam_services,
            )?,
        };

        Ok(Self {
            database_path: PathBuf::from(database_path),
            initial_policy,
        })
    }

    /// Open the configured database and seed the policy if none is stored.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = Database::open(&self.database_path).with_context(|| {
            format!("failed to open database at {}", self.database_path.display())
        })?;
        let policy = db.seed_policy(&self.initial_policy)?;
        info!(path = %self.database_path.display(), ?policy, "clinic database opened");
        Ok(db)
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {:?}", other),
    }
}
