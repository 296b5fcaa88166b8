//! Read-only email → name projections over the patient and doctor tables.

use crate::repositories::doctors::DoctorRepository;
use crate::repositories::patients::PatientRepository;
use portal_types::normalize_email;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct DirectoryEntry {
    pub email: String,
    pub name: String,
}

pub fn patient_directory(patients: &PatientRepository) -> Vec<DirectoryEntry> {
    patients
        .all()
        .iter()
        .map(|p| DirectoryEntry {
            email: normalize_email(&p.email),
            name: p.name.clone(),
        })
        .collect()
}

pub fn doctor_directory(doctors: &DoctorRepository) -> Vec<DirectoryEntry> {
    doctors
        .all()
        .iter()
        .map(|d| DirectoryEntry {
            email: normalize_email(&d.email),
            name: d.name.clone(),
        })
        .collect()
}
