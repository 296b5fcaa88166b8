//! Role-scoped visibility and write permissions.
//!
//! | Role    | Sees appointments / records / prescriptions | Sees patients        |
//! |---------|---------------------------------------------|----------------------|
//! | ADMIN   | all                                         | all                  |
//! | DOCTOR  | those whose `doctorEmail` is theirs         | those assigned to them |
//! | PATIENT | those whose `patientEmail` is theirs        | their own record     |
//!
//! Write rules are checked inside the [`AppData`] operations themselves, so a caller that skips
//! the route gate still cannot act outside its role.

use crate::app_data::AppData;
use crate::error::{DataError, DataResult};
use crate::repositories::appointments::{Appointment, AppointmentStatus};
use crate::repositories::medical_records::MedicalRecord;
use crate::repositories::patients::Patient;
use crate::repositories::prescriptions::{Prescription, PrescriptionStatus};
use portal_types::{normalize_email, Role};

/// The signed-in user on whose behalf data is read or written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Viewer {
    email: String,
    role: Role,
}

impl Viewer {
    pub fn new(email: impl AsRef<str>, role: Role) -> Self {
        Self {
            email: normalize_email(email),
            role,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub(crate) fn is(&self, email: &str) -> bool {
        normalize_email(email) == self.email
    }

    fn is_doctor_for(&self, doctor_email: &str) -> bool {
        self.role == Role::Doctor && self.is(doctor_email)
    }

    /// Whether a record linking `patient_email` and `doctor_email` is visible to this viewer.
    pub fn can_see(&self, patient_email: &str, doctor_email: &str) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Doctor => self.is(doctor_email),
            Role::Patient => self.is(patient_email),
        }
    }

    pub fn can_see_patient(&self, patient: &Patient) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Doctor => self.is(&patient.doctor_email),
            Role::Patient => self.is(&patient.email),
        }
    }
}

fn allow(allowed: bool, message: &str) -> DataResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(DataError::forbidden(message))
    }
}

pub(crate) fn require_admin(viewer: &Viewer, what: &str) -> DataResult<()> {
    allow(
        viewer.is_admin(),
        &format!("Only administrators can manage {what}."),
    )
}

pub(crate) fn can_book(viewer: &Viewer, patient_email: &str) -> DataResult<()> {
    match viewer.role() {
        Role::Admin => Ok(()),
        Role::Patient => allow(
            viewer.is(patient_email),
            "Patients can only book appointments for themselves.",
        ),
        Role::Doctor => allow(false, "Only administrators and patients can book appointments."),
    }
}

pub(crate) fn can_confirm(viewer: &Viewer, appointment: &Appointment) -> DataResult<()> {
    allow(
        viewer.is_admin() || viewer.is_doctor_for(&appointment.doctor_email),
        "Only the assigned doctor or an administrator can confirm this appointment.",
    )
}

/// Cancel and reschedule: either party of the appointment, or an administrator.
pub(crate) fn can_change_appointment(viewer: &Viewer, appointment: &Appointment) -> DataResult<()> {
    allow(
        viewer.can_see(&appointment.patient_email, &appointment.doctor_email),
        "You can only change your own appointments.",
    )
}

pub(crate) fn can_write_clinical(viewer: &Viewer, doctor_email: &str) -> DataResult<()> {
    allow(
        viewer.is_admin() || viewer.is_doctor_for(doctor_email),
        "Only the treating doctor or an administrator can change clinical records.",
    )
}

pub(crate) fn can_register_patient(viewer: &Viewer) -> DataResult<()> {
    allow(
        viewer.role().is_staff(),
        "Only staff can register patients.",
    )
}

pub(crate) fn can_edit_patient(viewer: &Viewer, patient: &Patient) -> DataResult<()> {
    allow(
        viewer.is_admin() || viewer.is_doctor_for(&patient.doctor_email),
        "Only the assigned doctor or an administrator can edit this patient.",
    )
}

impl AppData {
    /// Appointments visible to `viewer`, optionally narrowed to one status.
    pub fn appointments_for(
        &self,
        viewer: &Viewer,
        status: Option<AppointmentStatus>,
    ) -> Vec<&Appointment> {
        self.appointments()
            .all()
            .iter()
            .filter(|a| viewer.can_see(&a.patient_email, &a.doctor_email))
            .filter(|a| status.is_none_or(|s| a.status == s))
            .collect()
    }

    pub fn appointment_for(&self, viewer: &Viewer, id: &str) -> Option<&Appointment> {
        self.appointments()
            .get(id)
            .filter(|a| viewer.can_see(&a.patient_email, &a.doctor_email))
    }

    pub fn medical_records_for(&self, viewer: &Viewer) -> Vec<&MedicalRecord> {
        self.medical_records()
            .all()
            .iter()
            .filter(|r| viewer.can_see(&r.patient_email, &r.doctor_email))
            .collect()
    }

    pub fn medical_record_for(&self, viewer: &Viewer, id: &str) -> Option<&MedicalRecord> {
        self.medical_records()
            .get(id)
            .filter(|r| viewer.can_see(&r.patient_email, &r.doctor_email))
    }

    pub fn prescriptions_for(
        &self,
        viewer: &Viewer,
        status: Option<PrescriptionStatus>,
    ) -> Vec<&Prescription> {
        self.prescriptions()
            .all()
            .iter()
            .filter(|p| viewer.can_see(&p.patient_email, &p.doctor_email))
            .filter(|p| status.is_none_or(|s| p.status == s))
            .collect()
    }

    pub fn prescription_for(&self, viewer: &Viewer, id: &str) -> Option<&Prescription> {
        self.prescriptions()
            .get(id)
            .filter(|p| viewer.can_see(&p.patient_email, &p.doctor_email))
    }

    pub fn patients_for(&self, viewer: &Viewer) -> Vec<&Patient> {
        self.patients()
            .all()
            .iter()
            .filter(|p| viewer.can_see_patient(p))
            .collect()
    }

    pub fn patient_for(&self, viewer: &Viewer, id: &str) -> Option<&Patient> {
        self.patients()
            .get(id)
            .filter(|p| viewer.can_see_patient(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn data() -> AppData {
        AppData::load(Arc::new(MemoryStore::new())).unwrap()
    }

    fn ids<T: crate::repositories::shared::Record>(items: Vec<&T>) -> Vec<String> {
        items.into_iter().map(|i| i.id().to_owned()).collect()
    }

    #[test]
    fn admin_sees_everything() {
        let data = data();
        let admin = Viewer::new("badagaclass@gmail.com", Role::Admin);
        assert_eq!(data.appointments_for(&admin, None).len(), 4);
        assert_eq!(data.patients_for(&admin).len(), 4);
    }

    #[test]
    fn doctor_sees_own_appointments_and_assigned_patients() {
        let data = data();
        let doctor = Viewer::new("Doctor@Health.rw", Role::Doctor);

        assert_eq!(ids(data.appointments_for(&doctor, None)), ["A001", "A002", "A003"]);
        assert_eq!(
            ids(data.appointments_for(&doctor, Some(AppointmentStatus::Pending))),
            ["A002"]
        );
        assert_eq!(ids(data.patients_for(&doctor)), ["P001", "P002"]);
        assert!(data.appointment_for(&doctor, "A004").is_none());
    }

    #[test]
    fn patient_sees_only_own_records() {
        let data = data();
        let patient = Viewer::new("patient@health.rw", Role::Patient);

        assert_eq!(ids(data.medical_records_for(&patient)), ["MR001", "MR002"]);
        assert_eq!(ids(data.prescriptions_for(&patient, None)), ["RX001", "RX002"]);
        assert_eq!(ids(data.patients_for(&patient)), ["P001"]);
        assert!(data.patient_for(&patient, "P002").is_none());
    }

    #[test]
    fn doctors_cannot_book_and_patients_only_for_themselves() {
        let doctor = Viewer::new("doctor@health.rw", Role::Doctor);
        let patient = Viewer::new("patient@health.rw", Role::Patient);

        assert!(matches!(can_book(&doctor, "patient@health.rw"), Err(DataError::Forbidden(_))));
        assert!(can_book(&patient, "PATIENT@health.rw").is_ok());
        assert!(can_book(&patient, "someone@health.rw").is_err());
    }
}
