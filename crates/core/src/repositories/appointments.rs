//! Appointments and their status transitions.
//!
//! Patient, doctor, hospital and service names are snapshots taken at creation time. They are
//! never refreshed when the referenced record changes later.

use super::shared::{clean, required, Collection, Record, SeedPolicy};
use crate::constants::{APPOINTMENTS_KEY, APPOINTMENT_ID_PREFIX};
use crate::error::{DataError, DataResult};
use crate::ids::next_id;
use crate::seed;
use crate::store::Store;
use chrono::{NaiveDate, NaiveTime};
use portal_types::normalize_email;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_email: String,
    /// Patient name at booking time.
    pub patient: String,
    pub doctor_email: String,
    /// Doctor name at booking time.
    pub doctor: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub time: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub hospital_id: String,
    #[serde(default)]
    pub hospital_name: String,
    #[serde(default)]
    pub insurance: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub service_name: String,
}

impl Record for Appointment {
    const KIND: &'static str = "Appointment";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Booking payload. Names left empty are resolved by [`AppData`](crate::AppData) before the
/// record is created; anything still empty after that falls back to the email.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAppointment {
    pub patient_email: String,
    pub patient_name: String,
    pub doctor_email: String,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
    pub hospital_id: String,
    pub hospital_name: String,
    pub insurance: String,
    pub service_id: String,
    pub service_name: String,
}

/// Editable appointment fields. Status only changes through the transition operations.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentPatch {
    pub hospital_id: Option<String>,
    pub hospital_name: Option<String>,
    pub insurance: Option<String>,
    pub service_id: Option<String>,
    pub service_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct Reschedule {
    pub date: String,
    pub time: String,
}

fn valid_date(value: &str) -> DataResult<String> {
    let value = required(value, "Date is required.")?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .map_err(|_| DataError::validation("Date must be in YYYY-MM-DD format."))?;
    Ok(value)
}

fn valid_time(value: &str) -> DataResult<String> {
    let value = required(value, "Time is required.")?;
    NaiveTime::parse_from_str(&value, "%H:%M")
        .map_err(|_| DataError::validation("Time must be in HH:MM format."))?;
    Ok(value)
}

pub struct AppointmentRepository {
    records: Collection<Appointment>,
}

impl AppointmentRepository {
    pub fn load(store: Arc<dyn Store>) -> DataResult<Self> {
        let records = Collection::load(
            store,
            APPOINTMENTS_KEY,
            SeedPolicy::WhenMissing,
            seed::appointments,
        )?;
        Ok(Self { records })
    }

    pub fn all(&self) -> &[Appointment] {
        self.records.items()
    }

    pub fn get(&self, id: &str) -> Option<&Appointment> {
        self.records.get(id)
    }

    /// Books an appointment. The new record is always `pending`.
    pub(crate) fn create(&mut self, new: NewAppointment) -> DataResult<Appointment> {
        let patient_email = required(&normalize_email(&new.patient_email), "Patient is required.")?;
        let doctor_email = required(&normalize_email(&new.doctor_email), "Doctor is required.")?;
        let date = valid_date(&new.date)?;
        let time = valid_time(&new.time)?;

        let patient = match clean(Some(&new.patient_name)) {
            name if name.is_empty() => patient_email.clone(),
            name => name,
        };
        let doctor = match clean(Some(&new.doctor_name)) {
            name if name.is_empty() => doctor_email.clone(),
            name => name,
        };

        let appointment = Appointment {
            id: next_id(APPOINTMENT_ID_PREFIX, self.records.ids()),
            patient_email,
            patient,
            doctor_email,
            doctor,
            date,
            time,
            status: AppointmentStatus::Pending,
            hospital_id: clean(Some(&new.hospital_id)),
            hospital_name: clean(Some(&new.hospital_name)),
            insurance: clean(Some(&new.insurance)),
            service_id: clean(Some(&new.service_id)),
            service_name: clean(Some(&new.service_name)),
        };
        self.records.insert_first(appointment.clone())?;
        tracing::info!("booked appointment {}", appointment.id);
        Ok(appointment)
    }

    pub fn update(&mut self, id: &str, patch: AppointmentPatch) -> DataResult<Appointment> {
        self.modify(id, |a| {
            if let Some(v) = patch.hospital_id {
                a.hospital_id = v.trim().to_owned();
            }
            if let Some(v) = patch.hospital_name {
                a.hospital_name = v.trim().to_owned();
            }
            if let Some(v) = patch.insurance {
                a.insurance = v.trim().to_owned();
            }
            if let Some(v) = patch.service_id {
                a.service_id = v.trim().to_owned();
            }
            if let Some(v) = patch.service_name {
                a.service_name = v.trim().to_owned();
            }
            Ok(())
        })
    }

    /// Confirms an appointment. Confirming an already confirmed appointment changes nothing.
    pub fn confirm(&mut self, id: &str) -> DataResult<Appointment> {
        self.set_status(id, AppointmentStatus::Confirmed)
    }

    /// Cancels an appointment. Cancelling an already cancelled appointment changes nothing.
    pub fn cancel(&mut self, id: &str) -> DataResult<Appointment> {
        self.set_status(id, AppointmentStatus::Cancelled)
    }

    /// Moves an appointment to a new slot. The status always drops back to `pending`, whatever
    /// it was before.
    pub fn reschedule(&mut self, id: &str, slot: Reschedule) -> DataResult<Appointment> {
        let date = valid_date(&slot.date)?;
        let time = valid_time(&slot.time)?;
        let updated = self.modify(id, |a| {
            a.date = date;
            a.time = time;
            a.status = AppointmentStatus::Pending;
            Ok(())
        })?;
        tracing::info!("rescheduled appointment {}", updated.id);
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> DataResult<Appointment> {
        let index = self.records.position(id)?;
        self.records.remove_at(index)
    }

    fn set_status(&mut self, id: &str, status: AppointmentStatus) -> DataResult<Appointment> {
        let index = self.records.position(id)?;
        let current = &self.records.items()[index];
        if current.status == status {
            return Ok(current.clone());
        }
        let mut next = current.clone();
        next.status = status;
        self.records.replace_at(index, next.clone())?;
        tracing::info!("appointment {} is now {}", next.id, status);
        Ok(next)
    }

    fn modify(
        &mut self,
        id: &str,
        change: impl FnOnce(&mut Appointment) -> DataResult<()>,
    ) -> DataResult<Appointment> {
        let index = self.records.position(id)?;
        let mut next = self.records.items()[index].clone();
        change(&mut next)?;
        self.records.replace_at(index, next.clone())?;
        Ok(next)
    }
}
