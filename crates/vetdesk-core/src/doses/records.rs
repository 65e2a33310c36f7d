//! Persisted vaccination series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{generate_doses, VaccinationError, VaccinationResult};
use crate::db::Database;
use crate::models::{VaccinationRecord, VaccineProtocol};

/// First dose of a new series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FirstDose {
    pub animal_id: String,
    pub vaccine_name: String,
    pub veterinarian_id: Option<String>,
    pub application_date: NaiveDate,
    pub dose_count: u32,
    pub interval_days: u32,
    /// Generate the remaining doses now instead of registering them by hand
    pub auto_schedule: bool,
}

impl FirstDose {
    /// First dose following a standard protocol.
    pub fn from_protocol(
        animal_id: impl Into<String>,
        protocol: &VaccineProtocol,
        application_date: NaiveDate,
    ) -> Self {
        Self {
            animal_id: animal_id.into(),
            vaccine_name: protocol.name.clone(),
            veterinarian_id: None,
            application_date,
            dose_count: protocol.dose_count,
            interval_days: protocol.interval_days,
            auto_schedule: true,
        }
    }
}

/// Vaccination log manager.
pub struct VaccinationLog<'a> {
    db: &'a mut Database,
}

impl<'a> VaccinationLog<'a> {
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    /// Register a first dose and store the generated series in one batch.
    pub fn record_first_dose(&mut self, first: FirstDose) -> VaccinationResult<Vec<VaccinationRecord>> {
        let vaccine_name = first.vaccine_name.trim().to_string();
        if vaccine_name.is_empty() {
            return Err(VaccinationError::MissingVaccine);
        }

        let doses = generate_doses(
            first.application_date,
            first.dose_count,
            first.interval_days,
            first.auto_schedule,
        )?;

        self.db.with_immediate_transaction(|db| {
            if let Some(vet_id) = first.veterinarian_id.as_deref() {
                if db.get_veterinarian(vet_id)?.is_none() {
                    return Err(VaccinationError::NotFound {
                        kind: "Veterinarian",
                        id: vet_id.to_string(),
                    });
                }
            }

            let series_id = uuid::Uuid::new_v4().to_string();
            let records: Vec<VaccinationRecord> = doses
                .into_iter()
                .map(|dose| {
                    let mut record = VaccinationRecord::new(
                        first.animal_id.clone(),
                        vaccine_name.clone(),
                        series_id.clone(),
                        dose,
                    );
                    record.veterinarian_id = first.veterinarian_id.clone();
                    record
                })
                .collect();

            db.insert_vaccination_series(&records)?;
            info!(
                animal_id = %first.animal_id,
                vaccine = %vaccine_name,
                doses = records.len(),
                "vaccination series recorded"
            );
            Ok(records)
        })
    }

    /// Register a first dose following a named standard protocol.
    pub fn record_protocol(
        &mut self,
        animal_id: &str,
        protocol_name: &str,
        application_date: NaiveDate,
    ) -> VaccinationResult<Vec<VaccinationRecord>> {
        let protocol = VaccineProtocol::find_standard(protocol_name)
            .ok_or_else(|| VaccinationError::UnknownProtocol(protocol_name.to_string()))?;
        self.record_first_dose(FirstDose::from_protocol(animal_id, &protocol, application_date))
    }

    /// Mark a scheduled dose as given on `applied_on`.
    pub fn apply_dose(
        &mut self,
        record_id: &str,
        applied_on: NaiveDate,
    ) -> VaccinationResult<VaccinationRecord> {
        self.update(record_id, |record| Ok(record.dose.apply(applied_on)?))
    }

    /// Cancel a scheduled dose with a mandatory reason.
    pub fn cancel_dose(&mut self, record_id: &str, reason: &str) -> VaccinationResult<VaccinationRecord> {
        self.update(record_id, |record| Ok(record.dose.cancel(reason)?))
    }

    /// Scheduled doses dated on or after `as_of`.
    pub fn upcoming_doses(
        &self,
        animal_id: Option<&str>,
        as_of: NaiveDate,
    ) -> VaccinationResult<Vec<VaccinationRecord>> {
        Ok(self.db.list_upcoming_doses(animal_id, as_of)?)
    }

    /// Full vaccination history of an animal.
    pub fn history(&self, animal_id: &str) -> VaccinationResult<Vec<VaccinationRecord>> {
        Ok(self.db.list_vaccinations_for_animal(animal_id)?)
    }

    fn update<F>(&mut self, record_id: &str, f: F) -> VaccinationResult<VaccinationRecord>
    where
        F: FnOnce(&mut VaccinationRecord) -> VaccinationResult<()>,
    {
        self.db.with_immediate_transaction(|db| {
            let mut record = db.get_vaccination_record(record_id)?.ok_or_else(|| {
                VaccinationError::NotFound {
                    kind: "Vaccination record",
                    id: record_id.to_string(),
                }
            })?;
            f(&mut record)?;
            db.update_vaccination_record(&record)?;
            Ok(record)
        })
    }
}
