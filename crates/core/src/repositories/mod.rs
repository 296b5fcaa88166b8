//! Entity repositories.
//!
//! Each repository owns one persisted collection and enforces that collection's field
//! validation and uniqueness rules. Rules that span collections live in [`crate::AppData`].

pub mod appointments;
pub mod doctors;
pub mod hospitals;
pub mod locations;
pub mod medical_records;
pub mod patients;
pub mod prescriptions;
pub mod services;
pub mod shared;
