//! Constants used throughout the portal core crate.
//!
//! Storage keys are part of the persisted layout: renaming one orphans the
//! collection already saved under the old key.

/// Default directory for the file-backed store when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "portal_data";

/// Storage key for the credential table (owned by the auth crate).
pub const USERS_KEY: &str = "auth_users_v1";

pub const HOSPITALS_KEY: &str = "app_hospitals_v1";
pub const DOCTORS_KEY: &str = "app_doctors_v1";
pub const SERVICES_KEY: &str = "app_services_v1";
pub const APPOINTMENTS_KEY: &str = "app_appointments_v1";
pub const MEDICAL_RECORDS_KEY: &str = "app_medicalRecords_v1";
pub const PRESCRIPTIONS_KEY: &str = "app_prescriptions_v1";
pub const PATIENTS_KEY: &str = "app_patients_v1";
pub const LOCATIONS_KEY: &str = "app_locations_v1";

pub const HOSPITAL_ID_PREFIX: &str = "H";
pub const DOCTOR_ID_PREFIX: &str = "D";
pub const SERVICE_ID_PREFIX: &str = "S";
pub const APPOINTMENT_ID_PREFIX: &str = "A";
pub const MEDICAL_RECORD_ID_PREFIX: &str = "MR";
pub const PRESCRIPTION_ID_PREFIX: &str = "RX";
pub const PATIENT_ID_PREFIX: &str = "P";
pub const LOCATION_ID_PREFIX: &str = "L";

/// Minimum width of the numeric part of a generated identifier.
pub const ID_DIGITS: usize = 3;
