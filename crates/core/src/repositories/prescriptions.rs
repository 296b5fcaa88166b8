//! Prescriptions.
//!
//! A prescription starts `active`. It can be dispensed only while active, cancelled unless it is
//! already cancelled, and edited only until it has been dispensed.

use super::shared::{clean, lenient_number, required, Collection, NumberInput, Record, SeedPolicy};
use crate::constants::{PRESCRIPTIONS_KEY, PRESCRIPTION_ID_PREFIX};
use crate::error::{DataError, DataResult};
use crate::ids::next_id;
use crate::seed;
use crate::store::Store;
use portal_types::normalize_email;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    #[default]
    Active,
    Dispensed,
    Cancelled,
}

impl PrescriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PrescriptionStatus::Active => "active",
            PrescriptionStatus::Dispensed => "dispensed",
            PrescriptionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: String,
    pub patient_email: String,
    pub patient: String,
    pub doctor_email: String,
    pub doctor: String,
    pub medication: String,
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_days: Option<f64>,
    #[serde(default)]
    pub instructions: String,
    /// Older documents stored this as `date`.
    #[serde(alias = "date")]
    pub date_issued: String,
    #[serde(default)]
    pub status: PrescriptionStatus,
}

impl Record for Prescription {
    const KIND: &'static str = "Prescription";

    fn id(&self) -> &str {
        &self.id
    }
}

const DURATION_MESSAGE: &str = "Duration must be a valid number.";

fn valid_duration(days: Option<&NumberInput>) -> DataResult<Option<f64>> {
    Ok(days
        .map(|d| d.non_negative(DURATION_MESSAGE))
        .transpose()?
        .flatten())
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPrescription {
    pub patient_email: String,
    pub patient_name: String,
    pub doctor_email: String,
    pub doctor_name: String,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub duration_days: Option<NumberInput>,
    pub instructions: String,
    pub date_issued: String,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PrescriptionPatch {
    pub medication: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    /// Blank clears the duration.
    pub duration_days: Option<NumberInput>,
    pub instructions: Option<String>,
    pub date_issued: Option<String>,
}

pub struct PrescriptionRepository {
    records: Collection<Prescription>,
}

impl PrescriptionRepository {
    pub fn load(store: Arc<dyn Store>) -> DataResult<Self> {
        let records = Collection::load(
            store,
            PRESCRIPTIONS_KEY,
            SeedPolicy::WhenMissing,
            seed::prescriptions,
        )?;
        Ok(Self { records })
    }

    pub fn all(&self) -> &[Prescription] {
        self.records.items()
    }

    pub fn get(&self, id: &str) -> Option<&Prescription> {
        self.records.get(id)
    }

    pub(crate) fn create(&mut self, new: NewPrescription) -> DataResult<Prescription> {
        let patient_email = required(&normalize_email(&new.patient_email), "Patient is required.")?;
        let doctor_email = required(&normalize_email(&new.doctor_email), "Doctor is required.")?;
        let medication = required(&new.medication, "Medication is required.")?;
        let dosage = required(&new.dosage, "Dosage is required.")?;
        let frequency = required(&new.frequency, "Frequency is required.")?;
        let date_issued = required(&new.date_issued, "Date Issued is required.")?;
        let duration_days = valid_duration(new.duration_days.as_ref())?;

        let patient = Some(clean(Some(&new.patient_name)))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| patient_email.clone());
        let doctor = Some(clean(Some(&new.doctor_name)))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| doctor_email.clone());

        let prescription = Prescription {
            id: next_id(PRESCRIPTION_ID_PREFIX, self.records.ids()),
            patient_email,
            patient,
            doctor_email,
            doctor,
            medication,
            dosage,
            frequency,
            duration_days,
            instructions: clean(Some(&new.instructions)),
            date_issued,
            status: PrescriptionStatus::Active,
        };
        self.records.insert_first(prescription.clone())?;
        tracing::info!("issued prescription {}", prescription.id);
        Ok(prescription)
    }

    /// Edits a prescription that has not been dispensed yet.
    pub fn update(&mut self, id: &str, patch: PrescriptionPatch) -> DataResult<Prescription> {
        let index = self.records.position(id)?;
        let mut rx = self.records.items()[index].clone();
        if rx.status == PrescriptionStatus::Dispensed {
            return Err(invalid_transition(&rx, "edit"));
        }

        if let Some(v) = patch.medication {
            rx.medication = required(&v, "Medication is required.")?;
        }
        if let Some(v) = patch.dosage {
            rx.dosage = required(&v, "Dosage is required.")?;
        }
        if let Some(v) = patch.frequency {
            rx.frequency = required(&v, "Frequency is required.")?;
        }
        if let Some(days) = &patch.duration_days {
            rx.duration_days = valid_duration(Some(days))?;
        }
        if let Some(v) = patch.instructions {
            rx.instructions = v.trim().to_owned();
        }
        if let Some(v) = patch.date_issued {
            rx.date_issued = required(&v, "Date Issued is required.")?;
        }

        self.records.replace_at(index, rx.clone())?;
        Ok(rx)
    }

    pub fn dispense(&mut self, id: &str) -> DataResult<Prescription> {
        self.transition(id, "dispense", PrescriptionStatus::Dispensed, |s| {
            s == PrescriptionStatus::Active
        })
    }

    pub fn cancel(&mut self, id: &str) -> DataResult<Prescription> {
        self.transition(id, "cancel", PrescriptionStatus::Cancelled, |s| {
            s != PrescriptionStatus::Cancelled
        })
    }

    pub fn delete(&mut self, id: &str) -> DataResult<Prescription> {
        let index = self.records.position(id)?;
        self.records.remove_at(index)
    }

    fn transition(
        &mut self,
        id: &str,
        action: &'static str,
        to: PrescriptionStatus,
        allowed_from: impl Fn(PrescriptionStatus) -> bool,
    ) -> DataResult<Prescription> {
        let index = self.records.position(id)?;
        let mut rx = self.records.items()[index].clone();
        if !allowed_from(rx.status) {
            return Err(invalid_transition(&rx, action));
        }
        rx.status = to;
        self.records.replace_at(index, rx.clone())?;
        tracing::info!("prescription {} is now {}", rx.id, to);
        Ok(rx)
    }
}

fn invalid_transition(rx: &Prescription, action: &'static str) -> DataError {
    DataError::InvalidTransition {
        kind: Prescription::KIND,
        id: rx.id.clone(),
        from: rx.status.to_string(),
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn repo() -> PrescriptionRepository {
        PrescriptionRepository::load(Arc::new(MemoryStore::new())).unwrap()
    }

    fn new_rx() -> NewPrescription {
        NewPrescription {
            patient_email: "patient@health.rw".into(),
            doctor_email: "doctor@health.rw".into(),
            medication: "Amoxicillin".into(),
            dosage: "500mg".into(),
            frequency: "3x daily".into(),
            duration_days: Some(7.0.into()),
            date_issued: "2026-03-01".into(),
            ..Default::default()
        }
    }

    #[test]
    fn legacy_date_key_and_blank_duration_are_accepted() {
        let raw = r#"[{"id":"RX001","patientEmail":"p@x.rw","patient":"P","doctorEmail":"d@x.rw","doctor":"D","medication":"M","dosage":"1","durationDays":"","date":"2025-12-10"}]"#;
        let store = MemoryStore::new().with_entry(PRESCRIPTIONS_KEY, raw);
        let repo = PrescriptionRepository::load(Arc::new(store)).unwrap();

        let rx = repo.get("RX001").unwrap();
        assert_eq!(rx.date_issued, "2025-12-10");
        assert_eq!(rx.duration_days, None);
        assert_eq!(rx.status, PrescriptionStatus::Active);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let mut repo = repo();
        let err = repo
            .create(NewPrescription {
                duration_days: Some((-3.0).into()),
                ..new_rx()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Duration must be a valid number.");
    }

    #[test]
    fn duration_takes_form_values() {
        let mut repo = repo();
        for (raw, expected) in [(r#""""#, None), (r#""7""#, Some(7.0)), ("7.5", Some(7.5))] {
            let new: NewPrescription =
                serde_json::from_str(&format!(r#"{{"durationDays":{raw}}}"#)).unwrap();
            let rx = repo
                .create(NewPrescription {
                    duration_days: new.duration_days,
                    ..new_rx()
                })
                .unwrap();
            assert_eq!(rx.duration_days, expected, "{raw}");
        }

        let patch: PrescriptionPatch = serde_json::from_str(r#"{"durationDays":""}"#).unwrap();
        let rx = repo.update("RX001", patch).unwrap();
        assert_eq!(rx.duration_days, None);
    }

    #[test]
    fn stored_fractional_duration_survives_reload() {
        let raw = r#"[{"id":"RX900","patientEmail":"p@x.rw","patient":"P","doctorEmail":"d@x.rw","doctor":"D","medication":"M","dosage":"1","durationDays":7.5,"dateIssued":"2026-01-01","status":"active"}]"#;
        let store = Arc::new(MemoryStore::new().with_entry(PRESCRIPTIONS_KEY, raw));
        let repo = PrescriptionRepository::load(store.clone()).unwrap();

        assert_eq!(repo.all().len(), 1);
        assert_eq!(repo.get("RX900").unwrap().duration_days, Some(7.5));
        assert!(store.load("app_prescriptions_v1.corrupt").unwrap().is_none());
    }

    #[test]
    fn cancelled_prescription_is_never_dispensed() {
        let mut repo = repo();
        let rx = repo.create(new_rx()).unwrap();
        repo.cancel(&rx.id).unwrap();

        let err = repo.dispense(&rx.id).unwrap_err();
        assert!(matches!(err, DataError::InvalidTransition { action: "dispense", .. }));
        assert_eq!(repo.get(&rx.id).unwrap().status, PrescriptionStatus::Cancelled);
        assert!(repo.cancel(&rx.id).is_err());
    }

    #[test]
    fn dispensed_prescription_cannot_be_edited_or_redispensed() {
        let mut repo = repo();
        let rx = repo.create(new_rx()).unwrap();
        repo.dispense(&rx.id).unwrap();

        assert!(repo.dispense(&rx.id).is_err());
        let err = repo
            .update(
                &rx.id,
                PrescriptionPatch {
                    dosage: Some("250mg".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Prescription {} is dispensed; cannot edit.", rx.id));
    }

    #[test]
    fn dispensed_prescription_can_still_be_cancelled() {
        let mut repo = repo();
        repo.dispense("RX001").unwrap();
        let rx = repo.cancel("RX001").unwrap();
        assert_eq!(rx.status, PrescriptionStatus::Cancelled);
    }
}
