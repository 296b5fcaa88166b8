//! Application data facade.
//!
//! [`AppData`] owns every entity repository, constructed once from a [`Store`] at startup.
//! Reads go straight to the repositories; writes go through the methods here, which check the
//! viewer's permissions and apply the rules that span collections:
//!
//! - a doctor can only be assigned to a hospital that exists
//! - deleting a hospital clears `hospitalId` on its doctors instead of deleting them
//! - new appointments, records and prescriptions snapshot names from the directories, the
//!   service table and the hospital table

use crate::directory::{self, DirectoryEntry};
use crate::error::{DataError, DataResult};
use crate::repositories::appointments::{
    Appointment, AppointmentPatch, AppointmentRepository, NewAppointment, Reschedule,
};
use crate::repositories::doctors::{Doctor, DoctorPatch, DoctorRepository, NewDoctor};
use crate::repositories::hospitals::{Hospital, HospitalPatch, HospitalRepository, NewHospital};
use crate::repositories::locations::{Location, LocationPatch, LocationRepository, NewLocation};
use crate::repositories::medical_records::{
    MedicalRecord, MedicalRecordPatch, MedicalRecordRepository, NewMedicalRecord,
};
use crate::repositories::patients::{NewPatient, Patient, PatientPatch, PatientRepository};
use crate::repositories::prescriptions::{
    NewPrescription, Prescription, PrescriptionPatch, PrescriptionRepository,
};
use crate::repositories::services::{NewService, Service, ServicePatch, ServiceRepository};
use crate::repositories::shared::Record;
use crate::scope::{self, Viewer};
use crate::store::Store;
use portal_types::Role;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Outcome of [`AppData::delete_hospital`].
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HospitalRemoval {
    pub hospital: Hospital,
    /// Doctors whose `hospitalId` was cleared.
    pub detached_doctors: usize,
}

pub struct AppData {
    hospitals: HospitalRepository,
    doctors: DoctorRepository,
    services: ServiceRepository,
    appointments: AppointmentRepository,
    medical_records: MedicalRecordRepository,
    prescriptions: PrescriptionRepository,
    patients: PatientRepository,
    locations: LocationRepository,
}

fn found<'a, T: Record>(item: Option<&'a T>, id: &str) -> DataResult<&'a T> {
    item.ok_or_else(|| DataError::not_found(T::KIND, id))
}

impl AppData {
    /// Loads every collection from `store`, seeding the ones that are missing or unreadable.
    ///
    /// # Arguments
    ///
    /// * `store` - Store holding one document per collection.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Storage`] if a collection cannot be read, set aside or seeded.
    pub fn load(store: Arc<dyn Store>) -> DataResult<Self> {
        let data = Self {
            hospitals: HospitalRepository::load(store.clone())?,
            doctors: DoctorRepository::load(store.clone())?,
            services: ServiceRepository::load(store.clone())?,
            appointments: AppointmentRepository::load(store.clone())?,
            medical_records: MedicalRecordRepository::load(store.clone())?,
            prescriptions: PrescriptionRepository::load(store.clone())?,
            patients: PatientRepository::load(store.clone())?,
            locations: LocationRepository::load(store)?,
        };
        tracing::info!(
            "loaded app data: {} hospitals, {} doctors, {} patients, {} appointments",
            data.hospitals.all().len(),
            data.doctors.all().len(),
            data.patients.all().len(),
            data.appointments.all().len(),
        );
        Ok(data)
    }

    pub fn hospitals(&self) -> &HospitalRepository {
        &self.hospitals
    }

    pub fn doctors(&self) -> &DoctorRepository {
        &self.doctors
    }

    pub fn services(&self) -> &ServiceRepository {
        &self.services
    }

    pub fn appointments(&self) -> &AppointmentRepository {
        &self.appointments
    }

    pub fn medical_records(&self) -> &MedicalRecordRepository {
        &self.medical_records
    }

    pub fn prescriptions(&self) -> &PrescriptionRepository {
        &self.prescriptions
    }

    pub fn patients(&self) -> &PatientRepository {
        &self.patients
    }

    pub fn locations(&self) -> &LocationRepository {
        &self.locations
    }

    pub fn patient_directory(&self) -> Vec<DirectoryEntry> {
        directory::patient_directory(&self.patients)
    }

    pub fn doctor_directory(&self) -> Vec<DirectoryEntry> {
        directory::doctor_directory(&self.doctors)
    }

    // Hospitals

    pub fn create_hospital(&mut self, viewer: &Viewer, new: NewHospital) -> DataResult<Hospital> {
        scope::require_admin(viewer, "hospitals")?;
        self.hospitals.create(new)
    }

    pub fn update_hospital(
        &mut self,
        viewer: &Viewer,
        id: &str,
        patch: HospitalPatch,
    ) -> DataResult<Hospital> {
        scope::require_admin(viewer, "hospitals")?;
        self.hospitals.update(id, patch)
    }

    /// Removes a hospital and detaches (never deletes) the doctors assigned to it.
    ///
    /// Either both collections change or neither does: if the doctors cannot be saved the
    /// hospital is put back.
    ///
    /// # Returns
    ///
    /// The removed hospital and how many doctors were detached.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`DataError::Forbidden`] unless `viewer` is an administrator,
    /// - [`DataError::NotFound`] if no hospital has `id`,
    /// - [`DataError::Storage`] if either collection cannot be saved.
    pub fn delete_hospital(&mut self, viewer: &Viewer, id: &str) -> DataResult<HospitalRemoval> {
        scope::require_admin(viewer, "hospitals")?;
        let snapshot = self.hospitals.all().to_vec();
        let hospital = self.hospitals.delete(id)?;
        let detached_doctors = match self.doctors.detach_hospital(&hospital.id) {
            Ok(count) => count,
            Err(e) => {
                if let Err(restore) = self.hospitals.restore(snapshot) {
                    tracing::error!(
                        "hospital {} deleted but its doctors were not detached: {}",
                        hospital.id,
                        restore
                    );
                }
                return Err(e);
            }
        };
        if detached_doctors > 0 {
            tracing::info!(
                "detached {} doctors from deleted hospital {}",
                detached_doctors,
                hospital.id
            );
        }
        Ok(HospitalRemoval {
            hospital,
            detached_doctors,
        })
    }

    // Doctors

    fn ensure_hospital_exists(&self, hospital_id: &str) -> DataResult<()> {
        let hospital_id = hospital_id.trim();
        if !hospital_id.is_empty() && self.hospitals.get(hospital_id).is_none() {
            return Err(DataError::validation(format!(
                "Hospital {hospital_id} does not exist."
            )));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns:
    /// - [`DataError::Forbidden`] unless `viewer` is an administrator,
    /// - [`DataError::Validation`] if a required field is blank or the hospital does not exist,
    /// - [`DataError::Conflict`] if another doctor uses the email,
    /// - [`DataError::Storage`] if the doctor table cannot be saved.
    pub fn create_doctor(&mut self, viewer: &Viewer, new: NewDoctor) -> DataResult<Doctor> {
        scope::require_admin(viewer, "doctors")?;
        self.ensure_hospital_exists(&new.hospital_id)?;
        self.doctors.create(new)
    }

    pub fn update_doctor(
        &mut self,
        viewer: &Viewer,
        id: &str,
        patch: DoctorPatch,
    ) -> DataResult<Doctor> {
        scope::require_admin(viewer, "doctors")?;
        if let Some(hospital_id) = &patch.hospital_id {
            self.ensure_hospital_exists(hospital_id)?;
        }
        self.doctors.update(id, patch)
    }

    pub fn delete_doctor(&mut self, viewer: &Viewer, id: &str) -> DataResult<Doctor> {
        scope::require_admin(viewer, "doctors")?;
        self.doctors.delete(id)
    }

    // Services

    pub fn create_service(&mut self, viewer: &Viewer, new: NewService) -> DataResult<Service> {
        scope::require_admin(viewer, "services")?;
        self.services.create(new)
    }

    pub fn update_service(
        &mut self,
        viewer: &Viewer,
        id: &str,
        patch: ServicePatch,
    ) -> DataResult<Service> {
        scope::require_admin(viewer, "services")?;
        self.services.update(id, patch)
    }

    pub fn delete_service(&mut self, viewer: &Viewer, id: &str) -> DataResult<Service> {
        scope::require_admin(viewer, "services")?;
        self.services.delete(id)
    }

    // Locations

    pub fn create_location(&mut self, viewer: &Viewer, new: NewLocation) -> DataResult<Location> {
        scope::require_admin(viewer, "locations")?;
        self.locations.create(new)
    }

    pub fn update_location(
        &mut self,
        viewer: &Viewer,
        id: &str,
        patch: LocationPatch,
    ) -> DataResult<Location> {
        scope::require_admin(viewer, "locations")?;
        self.locations.update(id, patch)
    }

    pub fn delete_location(&mut self, viewer: &Viewer, id: &str) -> DataResult<Location> {
        scope::require_admin(viewer, "locations")?;
        self.locations.delete(id)
    }

    // Patients

    pub fn create_patient(&mut self, viewer: &Viewer, mut new: NewPatient) -> DataResult<Patient> {
        scope::can_register_patient(viewer)?;
        if viewer.role() == Role::Doctor && new.doctor_email.trim().is_empty() {
            new.doctor_email = viewer.email().to_owned();
        }
        self.patients.create(new)
    }

    pub fn update_patient(
        &mut self,
        viewer: &Viewer,
        id: &str,
        patch: PatientPatch,
    ) -> DataResult<Patient> {
        let patient = found(self.patients.get(id), id)?;
        scope::can_edit_patient(viewer, patient)?;
        self.patients.update(id, patch)
    }

    pub fn delete_patient(&mut self, viewer: &Viewer, id: &str) -> DataResult<Patient> {
        scope::require_admin(viewer, "patients")?;
        self.patients.delete(id)
    }

    // Appointments

    /// Books an appointment, filling names the payload left empty from the patient and doctor
    /// directories, the service table and the hospital table.
    ///
    /// # Arguments
    ///
    /// * `viewer` - An administrator, or the patient booking for themselves.
    /// * `new` - The booking. Any status it carries is ignored.
    ///
    /// # Returns
    ///
    /// The stored appointment, always `pending`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`DataError::Forbidden`] if `viewer` may not book for this patient,
    /// - [`DataError::Validation`] if a required field is blank,
    /// - [`DataError::Storage`] if the appointment table cannot be saved.
    pub fn create_appointment(
        &mut self,
        viewer: &Viewer,
        mut new: NewAppointment,
    ) -> DataResult<Appointment> {
        scope::can_book(viewer, &new.patient_email)?;

        if new.patient_name.trim().is_empty() {
            new.patient_name = self.patient_name(&new.patient_email);
        }
        if new.doctor_name.trim().is_empty() {
            new.doctor_name = self.doctor_name(&new.doctor_email);
        }
        if new.service_name.trim().is_empty() {
            if let Some(service) = self.services.get(&new.service_id) {
                new.service_name = service.name.clone();
            }
        }
        if new.hospital_name.trim().is_empty() {
            if let Some(hospital) = self.hospitals.get(new.hospital_id.trim()) {
                new.hospital_name = hospital.name.clone();
            }
        }

        self.appointments.create(new)
    }

    pub fn update_appointment(
        &mut self,
        viewer: &Viewer,
        id: &str,
        patch: AppointmentPatch,
    ) -> DataResult<Appointment> {
        scope::require_admin(viewer, "appointment details")?;
        self.appointments.update(id, patch)
    }

    pub fn confirm_appointment(&mut self, viewer: &Viewer, id: &str) -> DataResult<Appointment> {
        let appointment = found(self.appointments.get(id), id)?;
        scope::can_confirm(viewer, appointment)?;
        self.appointments.confirm(id)
    }

    pub fn cancel_appointment(&mut self, viewer: &Viewer, id: &str) -> DataResult<Appointment> {
        let appointment = found(self.appointments.get(id), id)?;
        scope::can_change_appointment(viewer, appointment)?;
        self.appointments.cancel(id)
    }

    /// Moves an appointment to a new date and time and puts it back to `pending`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`DataError::NotFound`] if no appointment has `id`,
    /// - [`DataError::Forbidden`] unless `viewer` is an administrator or one of its two parties,
    /// - [`DataError::Validation`] if the date or time is missing or malformed,
    /// - [`DataError::Storage`] if the appointment table cannot be saved.
    pub fn reschedule_appointment(
        &mut self,
        viewer: &Viewer,
        id: &str,
        slot: Reschedule,
    ) -> DataResult<Appointment> {
        let appointment = found(self.appointments.get(id), id)?;
        scope::can_change_appointment(viewer, appointment)?;
        self.appointments.reschedule(id, slot)
    }

    pub fn delete_appointment(&mut self, viewer: &Viewer, id: &str) -> DataResult<Appointment> {
        scope::require_admin(viewer, "appointments")?;
        self.appointments.delete(id)
    }

    // Medical records

    pub fn create_medical_record(
        &mut self,
        viewer: &Viewer,
        mut new: NewMedicalRecord,
    ) -> DataResult<MedicalRecord> {
        if viewer.role() == Role::Doctor && new.doctor_email.trim().is_empty() {
            new.doctor_email = viewer.email().to_owned();
        }
        scope::can_write_clinical(viewer, &new.doctor_email)?;

        if new.patient_name.trim().is_empty() {
            new.patient_name = self.patient_name(&new.patient_email);
        }
        if new.doctor_name.trim().is_empty() {
            new.doctor_name = self.doctor_name(&new.doctor_email);
        }
        self.medical_records.create(new)
    }

    pub fn update_medical_record(
        &mut self,
        viewer: &Viewer,
        id: &str,
        patch: MedicalRecordPatch,
    ) -> DataResult<MedicalRecord> {
        let record = found(self.medical_records.get(id), id)?;
        scope::can_write_clinical(viewer, &record.doctor_email)?;
        self.medical_records.update(id, patch)
    }

    pub fn mark_record_reviewed(&mut self, viewer: &Viewer, id: &str) -> DataResult<MedicalRecord> {
        let record = found(self.medical_records.get(id), id)?;
        scope::can_write_clinical(viewer, &record.doctor_email)?;
        self.medical_records.mark_reviewed(id)
    }

    pub fn delete_medical_record(
        &mut self,
        viewer: &Viewer,
        id: &str,
    ) -> DataResult<MedicalRecord> {
        let record = found(self.medical_records.get(id), id)?;
        scope::can_write_clinical(viewer, &record.doctor_email)?;
        self.medical_records.delete(id)
    }

    // Prescriptions

    pub fn create_prescription(
        &mut self,
        viewer: &Viewer,
        mut new: NewPrescription,
    ) -> DataResult<Prescription> {
        if viewer.role() == Role::Doctor && new.doctor_email.trim().is_empty() {
            new.doctor_email = viewer.email().to_owned();
        }
        scope::can_write_clinical(viewer, &new.doctor_email)?;

        if new.patient_name.trim().is_empty() {
            new.patient_name = self.patient_name(&new.patient_email);
        }
        if new.doctor_name.trim().is_empty() {
            new.doctor_name = self.doctor_name(&new.doctor_email);
        }
        self.prescriptions.create(new)
    }

    pub fn update_prescription(
        &mut self,
        viewer: &Viewer,
        id: &str,
        patch: PrescriptionPatch,
    ) -> DataResult<Prescription> {
        let rx = found(self.prescriptions.get(id), id)?;
        scope::can_write_clinical(viewer, &rx.doctor_email)?;
        self.prescriptions.update(id, patch)
    }

    /// # Errors
    ///
    /// Returns [`DataError::InvalidTransition`] unless the prescription is `active`, besides the
    /// usual not-found and permission errors.
    pub fn dispense_prescription(&mut self, viewer: &Viewer, id: &str) -> DataResult<Prescription> {
        let rx = found(self.prescriptions.get(id), id)?;
        scope::can_write_clinical(viewer, &rx.doctor_email)?;
        self.prescriptions.dispense(id)
    }

    pub fn cancel_prescription(&mut self, viewer: &Viewer, id: &str) -> DataResult<Prescription> {
        let rx = found(self.prescriptions.get(id), id)?;
        scope::can_write_clinical(viewer, &rx.doctor_email)?;
        self.prescriptions.cancel(id)
    }

    pub fn delete_prescription(&mut self, viewer: &Viewer, id: &str) -> DataResult<Prescription> {
        let rx = found(self.prescriptions.get(id), id)?;
        scope::can_write_clinical(viewer, &rx.doctor_email)?;
        self.prescriptions.delete(id)
    }

    // Name snapshots

    fn patient_name(&self, email: &str) -> String {
        self.patients
            .get_by_email(email)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    fn doctor_name(&self, email: &str) -> String {
        self.doctors
            .get_by_email(email)
            .map(|d| d.name.clone())
            .unwrap_or_default()
    }
}
