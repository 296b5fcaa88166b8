use super::shared::{clean, required, Collection, Record, SeedPolicy};
use crate::constants::{MEDICAL_RECORDS_KEY, MEDICAL_RECORD_ID_PREFIX};
use crate::error::DataResult;
use crate::ids::next_id;
use crate::seed;
use crate::store::Store;
use portal_types::normalize_email;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: String,
    pub patient_email: String,
    pub patient: String,
    pub doctor_email: String,
    pub doctor: String,
    pub diagnosis: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub treatment: String,
    pub date: String,
    #[serde(default)]
    pub reviewed: bool,
}

impl Record for MedicalRecord {
    const KIND: &'static str = "Medical record";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewMedicalRecord {
    pub patient_email: String,
    pub patient_name: String,
    pub doctor_email: String,
    pub doctor_name: String,
    pub diagnosis: String,
    pub notes: String,
    pub treatment: String,
    pub date: String,
}

/// `reviewed` is deliberately absent; it only flips through
/// [`MedicalRecordRepository::mark_reviewed`].
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalRecordPatch {
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub treatment: Option<String>,
    pub date: Option<String>,
}

pub struct MedicalRecordRepository {
    records: Collection<MedicalRecord>,
}

impl MedicalRecordRepository {
    pub fn load(store: Arc<dyn Store>) -> DataResult<Self> {
        let records = Collection::load(
            store,
            MEDICAL_RECORDS_KEY,
            SeedPolicy::WhenMissing,
            seed::medical_records,
        )?;
        Ok(Self { records })
    }

    pub fn all(&self) -> &[MedicalRecord] {
        self.records.items()
    }

    pub fn get(&self, id: &str) -> Option<&MedicalRecord> {
        self.records.get(id)
    }

    pub(crate) fn create(&mut self, new: NewMedicalRecord) -> DataResult<MedicalRecord> {
        let patient_email = required(&normalize_email(&new.patient_email), "Patient is required.")?;
        let doctor_email = required(&normalize_email(&new.doctor_email), "Doctor is required.")?;
        let diagnosis = required(&new.diagnosis, "Diagnosis is required.")?;
        let date = required(&new.date, "Date is required.")?;

        let patient = Some(clean(Some(&new.patient_name)))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| patient_email.clone());
        let doctor = Some(clean(Some(&new.doctor_name)))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| doctor_email.clone());

        let record = MedicalRecord {
            id: next_id(MEDICAL_RECORD_ID_PREFIX, self.records.ids()),
            patient_email,
            patient,
            doctor_email,
            doctor,
            diagnosis,
            notes: clean(Some(&new.notes)),
            treatment: clean(Some(&new.treatment)),
            date,
            reviewed: false,
        };
        self.records.insert_first(record.clone())?;
        tracing::info!("created medical record {}", record.id);
        Ok(record)
    }

    pub fn update(&mut self, id: &str, patch: MedicalRecordPatch) -> DataResult<MedicalRecord> {
        let index = self.records.position(id)?;
        let mut record = self.records.items()[index].clone();

        if let Some(diagnosis) = patch.diagnosis {
            record.diagnosis = required(&diagnosis, "Diagnosis is required.")?;
        }
        if let Some(notes) = patch.notes {
            record.notes = notes.trim().to_owned();
        }
        if let Some(treatment) = patch.treatment {
            record.treatment = treatment.trim().to_owned();
        }
        if let Some(date) = patch.date {
            record.date = required(&date, "Date is required.")?;
        }

        self.records.replace_at(index, record.clone())?;
        Ok(record)
    }

    pub fn mark_reviewed(&mut self, id: &str) -> DataResult<MedicalRecord> {
        let index = self.records.position(id)?;
        let mut record = self.records.items()[index].clone();
        if !record.reviewed {
            record.reviewed = true;
            self.records.replace_at(index, record.clone())?;
        }
        Ok(record)
    }

    pub fn delete(&mut self, id: &str) -> DataResult<MedicalRecord> {
        let index = self.records.position(id)?;
        let removed = self.records.remove_at(index)?;
        tracing::info!("deleted medical record {}", removed.id);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use crate::store::MemoryStore;

    fn repo() -> MedicalRecordRepository {
        MedicalRecordRepository::load(Arc::new(MemoryStore::new())).unwrap()
    }

    fn new_record() -> NewMedicalRecord {
        NewMedicalRecord {
            patient_email: "sarah@health.rw".into(),
            patient_name: "Ingabire Sarah".into(),
            doctor_email: "doctor@health.rw".into(),
            diagnosis: " Typhoid ".into(),
            date: "2026-03-02".into(),
            ..Default::default()
        }
    }

    #[test]
    fn seeded_records_start_unreviewed() {
        assert!(repo().all().iter().all(|r| !r.reviewed));
    }

    #[test]
    fn create_checks_fields_in_order() {
        let mut repo = repo();
        let err = repo
            .create(NewMedicalRecord {
                doctor_email: String::new(),
                diagnosis: String::new(),
                ..new_record()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Doctor is required.");
    }

    #[test]
    fn create_defaults_doctor_name_to_email() {
        let mut repo = repo();
        let record = repo.create(new_record()).unwrap();
        assert_eq!(record.id, "MR005");
        assert_eq!(record.doctor, "doctor@health.rw");
        assert_eq!(record.diagnosis, "Typhoid");
        assert!(!record.reviewed);
    }

    #[test]
    fn update_does_not_touch_review_flag() {
        let mut repo = repo();
        repo.mark_reviewed("MR001").unwrap();
        let updated = repo
            .update(
                "MR001",
                MedicalRecordPatch {
                    notes: Some("Recovered.".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.reviewed);
        assert_eq!(updated.notes, "Recovered.");
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let mut repo = repo();
        assert!(matches!(repo.delete("MR404"), Err(DataError::NotFound { .. })));
    }
}
