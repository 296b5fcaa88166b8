//! Keyword search across every collection.
//!
//! A record matches when any of its field values, rendered as text, contains the keyword
//! case-insensitively. Nested values (a patient's location) are searched too. A blank keyword
//! matches everything. Collections holding patient data are limited to what the viewer may see.

use crate::app_data::AppData;
use crate::repositories::appointments::Appointment;
use crate::repositories::doctors::Doctor;
use crate::repositories::hospitals::Hospital;
use crate::repositories::locations::Location;
use crate::repositories::medical_records::MedicalRecord;
use crate::repositories::patients::Patient;
use crate::repositories::prescriptions::Prescription;
use crate::repositories::services::Service;
use crate::scope::Viewer;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub keyword: String,
    pub patients: Vec<Patient>,
    pub appointments: Vec<Appointment>,
    pub medical_records: Vec<MedicalRecord>,
    pub prescriptions: Vec<Prescription>,
    pub doctors: Vec<Doctor>,
    pub hospitals: Vec<Hospital>,
    pub services: Vec<Service>,
    pub locations: Vec<Location>,
    pub total: usize,
}

fn value_contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Bool(b) => b.to_string().contains(needle),
        Value::Number(n) => n.to_string().contains(needle),
        Value::Array(items) => items.iter().any(|v| value_contains(v, needle)),
        Value::Object(map) => map.values().any(|v| value_contains(v, needle)),
    }
}

/// Whether any field of `record` contains `needle` (already lowercased and trimmed).
pub fn matches<T: Serialize>(record: &T, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    serde_json::to_value(record)
        .map(|v| value_contains(&v, needle))
        .unwrap_or(false)
}

fn filter<'a, T: Serialize + Clone + 'a>(
    items: impl IntoIterator<Item = &'a T>,
    needle: &str,
) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| matches(*item, needle))
        .cloned()
        .collect()
}

impl AppData {
    pub fn search(&self, viewer: &Viewer, keyword: &str) -> SearchResults {
        let needle = keyword.trim().to_lowercase();

        let mut results = SearchResults {
            keyword: keyword.trim().to_owned(),
            patients: filter(self.patients_for(viewer), &needle),
            appointments: filter(self.appointments_for(viewer, None), &needle),
            medical_records: filter(self.medical_records_for(viewer), &needle),
            prescriptions: filter(self.prescriptions_for(viewer, None), &needle),
            doctors: filter(self.doctors().all(), &needle),
            hospitals: filter(self.hospitals().all(), &needle),
            services: filter(self.services().all(), &needle),
            locations: filter(self.locations().all(), &needle),
            total: 0,
        };
        results.total = results.patients.len()
            + results.appointments.len()
            + results.medical_records.len()
            + results.prescriptions.len()
            + results.doctors.len()
            + results.hospitals.len()
            + results.services.len()
            + results.locations.len();
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use portal_types::Role;
    use std::sync::Arc;

    fn data() -> AppData {
        AppData::load(Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn keyword_matches_any_field_case_insensitively() {
        let data = data();
        let admin = Viewer::new("badagaclass@gmail.com", Role::Admin);

        let results = data.search(&admin, "  MALARIA ");

        assert_eq!(results.keyword, "MALARIA");
        assert_eq!(results.medical_records.len(), 1);
        assert_eq!(results.medical_records[0].id, "MR001");
        assert_eq!(results.total, 1);
    }

    #[test]
    fn numbers_are_searchable() {
        let data = data();
        let admin = Viewer::new("badagaclass@gmail.com", Role::Admin);
        let results = data.search(&admin, "15000");
        assert_eq!(results.services.len(), 1);
        assert_eq!(results.services[0].name, "X-Ray");
    }

    #[test]
    fn blank_keyword_returns_everything_visible() {
        let data = data();
        let patient = Viewer::new("patient@health.rw", Role::Patient);

        let results = data.search(&patient, "");

        assert_eq!(results.patients.len(), 1);
        assert_eq!(results.appointments.len(), 2);
        assert_eq!(results.hospitals.len(), 54);
        assert_eq!(results.doctors.len(), 108);
        assert_eq!(
            results.total,
            1 + 2 + 2 + 2 + 108 + 54 + 8 + 1
        );
    }

    #[test]
    fn patient_results_are_scoped_to_the_viewer() {
        let data = data();
        let patient = Viewer::new("patient@health.rw", Role::Patient);
        let results = data.search(&patient, "Mugisha");
        assert!(results.appointments.is_empty());
        assert!(results.patients.is_empty());
    }
}
