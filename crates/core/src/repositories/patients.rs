//! Patients.
//!
//! Patient IDs come from their own counter (see [`next_patient_id`]). `address` and `district`
//! are derived from the location when the patient is created and are not recomputed when the
//! location is edited later.

use super::shared::{clean, lenient_number, required, Collection, NumberInput, Record, SeedPolicy};
use crate::constants::PATIENTS_KEY;
use crate::error::{DataError, DataResult};
use crate::ids::next_patient_id;
use crate::seed;
use crate::store::Store;
use portal_types::normalize_email;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Administrative location of a patient's home, most general level first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PatientLocation {
    pub province: String,
    pub district: String,
    pub sector: String,
    pub cell: String,
    pub village: String,
}

impl PatientLocation {
    /// Village-first, comma-joined address with empty levels skipped.
    pub fn address(&self) -> String {
        [
            &self.village,
            &self.cell,
            &self.sector,
            &self.district,
            &self.province,
        ]
        .into_iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub age: Option<f64>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub insurance: String,
    /// Assigned doctor. Not required to exist in the doctor table.
    #[serde(default)]
    pub doctor_email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub location: Option<PatientLocation>,
    #[serde(default)]
    pub district: String,
}

impl Record for Patient {
    const KIND: &'static str = "Patient";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: Option<NumberInput>,
    pub gender: String,
    pub insurance: String,
    pub doctor_email: String,
    pub location: Option<PatientLocation>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Blank or zero clears the age.
    pub age: Option<NumberInput>,
    pub gender: Option<String>,
    pub insurance: Option<String>,
    pub doctor_email: Option<String>,
    pub location: Option<PatientLocation>,
}

/// Zero counts as not given.
fn valid_age(age: Option<&NumberInput>) -> DataResult<Option<f64>> {
    Ok(age
        .map(|a| a.non_negative("Age must be a valid number."))
        .transpose()?
        .flatten()
        .filter(|a| *a > 0.0))
}

pub struct PatientRepository {
    records: Collection<Patient>,
}

impl PatientRepository {
    pub fn load(store: Arc<dyn Store>) -> DataResult<Self> {
        let records = Collection::load(store, PATIENTS_KEY, SeedPolicy::WhenMissing, seed::patients)?;
        Ok(Self { records })
    }

    pub fn all(&self) -> &[Patient] {
        self.records.items()
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.records.get(id)
    }

    pub fn get_by_email(&self, email: &str) -> Option<&Patient> {
        let email = normalize_email(email);
        self.records
            .items()
            .iter()
            .find(|p| normalize_email(&p.email) == email)
    }

    /// Patients whose assigned doctor is `doctor_email`.
    pub fn assigned_to(&self, doctor_email: &str) -> Vec<&Patient> {
        let doctor_email = normalize_email(doctor_email);
        self.records
            .items()
            .iter()
            .filter(|p| normalize_email(&p.doctor_email) == doctor_email)
            .collect()
    }

    fn email_taken(&self, email: &str, except_id: Option<&str>) -> bool {
        self.records
            .items()
            .iter()
            .any(|p| Some(p.id.as_str()) != except_id && normalize_email(&p.email) == email)
    }

    pub fn create(&mut self, new: NewPatient) -> DataResult<Patient> {
        let name = required(&new.name, "Name and email are required.")?;
        let email = required(&normalize_email(&new.email), "Name and email are required.")?;

        if self.email_taken(&email, None) {
            return Err(DataError::conflict("A patient with this email already exists."));
        }

        let address = new
            .location
            .as_ref()
            .map(PatientLocation::address)
            .unwrap_or_default();
        let district = new
            .location
            .as_ref()
            .map(|l| l.district.trim().to_owned())
            .unwrap_or_default();

        let patient = Patient {
            id: next_patient_id(self.records.ids()),
            name,
            email,
            phone: clean(Some(&new.phone)),
            age: valid_age(new.age.as_ref())?,
            gender: clean(Some(&new.gender)),
            insurance: clean(Some(&new.insurance)),
            doctor_email: normalize_email(&new.doctor_email),
            address,
            location: new.location,
            district,
        };
        self.records.insert_first(patient.clone())?;
        tracing::info!("registered patient {}", patient.id);
        Ok(patient)
    }

    pub fn update(&mut self, id: &str, patch: PatientPatch) -> DataResult<Patient> {
        let index = self.records.position(id)?;
        let mut patient = self.records.items()[index].clone();

        if let Some(name) = patch.name {
            patient.name = required(&name, "Name and email are required.")?;
        }
        if let Some(email) = patch.email {
            let email = required(&normalize_email(&email), "Name and email are required.")?;
            if self.email_taken(&email, Some(id)) {
                return Err(DataError::conflict("Another patient already uses this email."));
            }
            patient.email = email;
        }
        if let Some(phone) = patch.phone {
            patient.phone = phone.trim().to_owned();
        }
        if let Some(age) = &patch.age {
            patient.age = valid_age(Some(age))?;
        }
        if let Some(gender) = patch.gender {
            patient.gender = gender.trim().to_owned();
        }
        if let Some(insurance) = patch.insurance {
            patient.insurance = insurance.trim().to_owned();
        }
        if let Some(doctor_email) = patch.doctor_email {
            patient.doctor_email = normalize_email(doctor_email);
        }
        if let Some(location) = patch.location {
            patient.location = Some(location);
        }

        self.records.replace_at(index, patient.clone())?;
        Ok(patient)
    }

    pub fn delete(&mut self, id: &str) -> DataResult<Patient> {
        let index = self.records.position(id)?;
        let removed = self.records.remove_at(index)?;
        tracing::info!("deleted patient {}", removed.id);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn repo() -> PatientRepository {
        PatientRepository::load(Arc::new(MemoryStore::new())).unwrap()
    }

    fn kimironko() -> PatientLocation {
        PatientLocation {
            province: "Kigali City".into(),
            district: "Gasabo".into(),
            sector: "Kimironko".into(),
            cell: String::new(),
            village: "Bibare I".into(),
        }
    }

    #[test]
    fn create_derives_address_and_district() {
        let mut repo = repo();
        let patient = repo
            .create(NewPatient {
                name: "Keza Aline".into(),
                email: "KEZA@health.rw".into(),
                location: Some(kimironko()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(patient.id, "P005");
        assert_eq!(patient.address, "Bibare I, Kimironko, Gasabo, Kigali City");
        assert_eq!(patient.district, "Gasabo");
    }

    #[test]
    fn patient_counter_ignores_malformed_ids() {
        let raw = r#"[{"id":"P0x9","name":"Legacy","email":"l@x.rw"},{"id":"P002","name":"B","email":"b@x.rw"},{"id":"PAT-77","name":"C","email":"c@x.rw"}]"#;
        let store = MemoryStore::new().with_entry(PATIENTS_KEY, raw);
        let mut repo = PatientRepository::load(Arc::new(store)).unwrap();

        let patient = repo
            .create(NewPatient {
                name: "New".into(),
                email: "new@x.rw".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(patient.id, "P003");
    }

    #[test]
    fn age_takes_form_values_and_survives_reload() {
        let mut repo = repo();
        let new: NewPatient =
            serde_json::from_str(r#"{"name":"Keza","email":"keza@x.rw","age":"34.5"}"#).unwrap();
        assert_eq!(repo.create(new).unwrap().age, Some(34.5));

        let zero: NewPatient =
            serde_json::from_str(r#"{"name":"Zero","email":"zero@x.rw","age":0}"#).unwrap();
        assert_eq!(repo.create(zero).unwrap().age, None);

        let raw = r#"[{"id":"P001","name":"A","email":"a@x.rw","age":34.5},{"id":"P002","name":"B","email":"b@x.rw","age":""}]"#;
        let store = MemoryStore::new().with_entry(PATIENTS_KEY, raw);
        let reloaded = PatientRepository::load(Arc::new(store)).unwrap();
        assert_eq!(reloaded.get("P001").unwrap().age, Some(34.5));
        assert_eq!(reloaded.get("P002").unwrap().age, None);
    }

    #[test]
    fn duplicate_email_conflicts() {
        let mut repo = repo();
        let err = repo
            .create(NewPatient {
                name: "Copy".into(),
                email: " Patient@Health.RW".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "A patient with this email already exists.");
        assert_eq!(repo.all().len(), 4);
    }

    #[test]
    fn location_edit_keeps_original_address() {
        let mut repo = repo();
        let created = repo
            .create(NewPatient {
                name: "Keza".into(),
                email: "keza@x.rw".into(),
                location: Some(kimironko()),
                ..Default::default()
            })
            .unwrap();

        let moved = repo
            .update(
                &created.id,
                PatientPatch {
                    location: Some(PatientLocation {
                        district: "Huye".into(),
                        ..kimironko()
                    }),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(moved.address, created.address);
        assert_eq!(moved.location.unwrap().district, "Huye");
    }

    #[test]
    fn assigned_to_matches_doctor_email_case_insensitively() {
        let repo = repo();
        let ids: Vec<_> = repo
            .assigned_to("Doctor@Health.rw")
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["P001", "P002"]);
    }
}
