//! Doctors.
//!
//! Emails are unique case-insensitively, checked on create and on update (excluding the doctor
//! being edited). `hospital_id` is a weak reference: it is cleared, not cascaded, when the
//! hospital is deleted.

use super::shared::{required, Collection, Record, SeedPolicy};
use crate::constants::{DOCTORS_KEY, DOCTOR_ID_PREFIX};
use crate::error::{DataError, DataResult};
use crate::ids::next_id;
use crate::seed;
use crate::store::Store;
use portal_types::normalize_email;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub specialty: String,
    /// Empty once the hospital has been deleted.
    #[serde(default)]
    pub hospital_id: String,
}

impl Record for Doctor {
    const KIND: &'static str = "Doctor";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub hospital_id: String,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub specialty: Option<String>,
    /// An empty string unassigns the doctor.
    pub hospital_id: Option<String>,
}

pub struct DoctorRepository {
    records: Collection<Doctor>,
}

impl DoctorRepository {
    /// Loads the doctor table. An absent or empty table is seeded with two doctors per seed
    /// hospital.
    pub fn load(store: Arc<dyn Store>) -> DataResult<Self> {
        let records = Collection::load(store, DOCTORS_KEY, SeedPolicy::WhenMissingOrEmpty, || {
            seed::auto_doctors(&seed::hospitals())
        })?;
        Ok(Self { records })
    }

    pub fn all(&self) -> &[Doctor] {
        self.records.items()
    }

    pub fn get(&self, id: &str) -> Option<&Doctor> {
        self.records.get(id)
    }

    pub fn get_by_email(&self, email: &str) -> Option<&Doctor> {
        let email = normalize_email(email);
        self.records
            .items()
            .iter()
            .find(|d| normalize_email(&d.email) == email)
    }

    pub fn by_hospital(&self, hospital_id: &str) -> Vec<&Doctor> {
        let hospital_id = hospital_id.trim();
        self.records
            .items()
            .iter()
            .filter(|d| d.hospital_id == hospital_id)
            .collect()
    }

    fn email_taken(&self, email: &str, except_id: Option<&str>) -> bool {
        self.records
            .items()
            .iter()
            .any(|d| Some(d.id.as_str()) != except_id && normalize_email(&d.email) == email)
    }

    /// Creates a doctor. The caller has already checked that the hospital exists.
    pub(crate) fn create(&mut self, new: NewDoctor) -> DataResult<Doctor> {
        let name = required(&new.name, "Doctor name is required.")?;
        let email = required(&normalize_email(&new.email), "Doctor email is required.")?;
        let specialty = required(&new.specialty, "Specialty is required.")?;
        let hospital_id = required(&new.hospital_id, "Hospital assignment is required.")?;

        if self.email_taken(&email, None) {
            return Err(DataError::conflict("A doctor with this email already exists."));
        }

        let doctor = Doctor {
            id: next_id(DOCTOR_ID_PREFIX, self.records.ids()),
            name,
            email,
            specialty,
            hospital_id,
        };
        self.records.insert_first(doctor.clone())?;
        tracing::info!("created doctor {}", doctor.id);
        Ok(doctor)
    }

    pub(crate) fn update(&mut self, id: &str, patch: DoctorPatch) -> DataResult<Doctor> {
        let index = self.records.position(id)?;
        let mut doctor = self.records.items()[index].clone();

        if let Some(name) = patch.name {
            doctor.name = required(&name, "Doctor name is required.")?;
        }
        if let Some(email) = patch.email {
            let email = required(&normalize_email(&email), "Doctor email is required.")?;
            if self.email_taken(&email, Some(id)) {
                return Err(DataError::conflict("Another doctor already uses this email."));
            }
            doctor.email = email;
        }
        if let Some(specialty) = patch.specialty {
            doctor.specialty = required(&specialty, "Specialty is required.")?;
        }
        if let Some(hospital_id) = patch.hospital_id {
            doctor.hospital_id = hospital_id.trim().to_owned();
        }

        self.records.replace_at(index, doctor.clone())?;
        Ok(doctor)
    }

    pub fn delete(&mut self, id: &str) -> DataResult<Doctor> {
        let index = self.records.position(id)?;
        let removed = self.records.remove_at(index)?;
        tracing::info!("deleted doctor {}", removed.id);
        Ok(removed)
    }

    /// Clears `hospital_id` on every doctor assigned to `hospital_id`; returns how many changed.
    pub(crate) fn detach_hospital(&mut self, hospital_id: &str) -> DataResult<usize> {
        let mut detached = 0;
        let next: Vec<Doctor> = self
            .records
            .items()
            .iter()
            .cloned()
            .map(|mut d| {
                if d.hospital_id == hospital_id {
                    d.hospital_id.clear();
                    detached += 1;
                }
                d
            })
            .collect();

        if detached > 0 {
            self.records.commit(next)?;
        }
        Ok(detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn empty_repo() -> DoctorRepository {
        let store = MemoryStore::new().with_entry(DOCTORS_KEY, r#"[{"id":"D001","name":"Dr. Keza","email":"keza@health.rw","specialty":"Pediatrics","hospitalId":"H001"}]"#);
        DoctorRepository::load(Arc::new(store)).unwrap()
    }

    fn new_doctor(email: &str) -> NewDoctor {
        NewDoctor {
            name: "Dr. Test".into(),
            email: email.into(),
            specialty: "Surgery".into(),
            hospital_id: "H002".into(),
        }
    }

    #[test]
    fn empty_table_is_auto_seeded_per_hospital() {
        let store = MemoryStore::new().with_entry(DOCTORS_KEY, "[]");
        let repo = DoctorRepository::load(Arc::new(store)).unwrap();

        assert_eq!(repo.all().len(), seed::hospitals().len() * 2);
        assert_eq!(repo.by_hospital("H001").len(), 2);
        assert!(repo.get_by_email("DOC.H001.A@health.rw").is_some());
    }

    #[test]
    fn create_normalizes_email() {
        let mut repo = empty_repo();
        let doctor = repo.create(new_doctor("  New.Doc@Health.RW ")).unwrap();
        assert_eq!(doctor.email, "new.doc@health.rw");
        assert_eq!(doctor.id, "D002");
    }

    #[test]
    fn duplicate_email_conflicts() {
        let mut repo = empty_repo();
        let err = repo.create(new_doctor("KEZA@health.rw")).unwrap_err();
        assert!(matches!(err, DataError::Conflict(_)));
        assert_eq!(repo.all().len(), 1);
    }

    #[test]
    fn create_requires_hospital_assignment() {
        let mut repo = empty_repo();
        let err = repo
            .create(NewDoctor {
                hospital_id: String::new(),
                ..new_doctor("x@health.rw")
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Hospital assignment is required.");
    }

    #[test]
    fn update_email_excludes_self_but_not_others() {
        let mut repo = empty_repo();
        let other = repo.create(new_doctor("other@health.rw")).unwrap();

        repo.update(
            "D001",
            DoctorPatch {
                email: Some("Keza@Health.rw".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let err = repo
            .update(
                &other.id,
                DoctorPatch {
                    email: Some("keza@health.rw".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Another doctor already uses this email.");
        assert_eq!(repo.get(&other.id).unwrap().email, "other@health.rw");
    }

    #[test]
    fn detach_hospital_clears_references_only() {
        let mut repo = empty_repo();
        repo.create(new_doctor("a@health.rw")).unwrap();

        assert_eq!(repo.detach_hospital("H001").unwrap(), 1);
        assert_eq!(repo.get("D001").unwrap().hospital_id, "");
        assert_eq!(repo.all().len(), 2);
        assert_eq!(repo.detach_hospital("H404").unwrap(), 0);
    }
}
