//! Bootstrap data used when a collection has never been saved or cannot be read back.

use crate::constants::{DOCTOR_ID_PREFIX, ID_DIGITS};
use crate::repositories::appointments::{Appointment, AppointmentStatus};
use crate::repositories::doctors::Doctor;
use crate::repositories::hospitals::Hospital;
use crate::repositories::locations::Location;
use crate::repositories::medical_records::MedicalRecord;
use crate::repositories::patients::Patient;
use crate::repositories::prescriptions::{Prescription, PrescriptionStatus};
use crate::repositories::services::Service;

/// `(id, name, province, district, category)` for every public hospital in Rwanda.
const HOSPITALS: &[(&str, &str, &str, &str, &str)] = &[
    ("H001", "CHUK (Univ. Teaching Hospital of Kigali)", "Kigali City", "Nyarugenge", "National Referral"),
    ("H002", "Muhima Hospital", "Kigali City", "Nyarugenge", "District (Maternity focus)"),
    ("H003", "Nyarugenge District Hospital", "Kigali City", "Nyarugenge", "District"),
    ("H004", "King Faisal Hospital", "Kigali City", "Gasabo", "National Referral"),
    ("H005", "Kibagabaga Hospital", "Kigali City", "Gasabo", "Level 2 Teaching"),
    ("H006", "Kacyiru Hospital", "Kigali City", "Gasabo", "District (Police Hospital)"),
    ("H007", "Ndera Neuropsychiatric Hospital", "Kigali City", "Gasabo", "Specialized Referral"),
    ("H008", "Rwanda Military Hospital (Kanombe)", "Kigali City", "Kicukiro", "National Referral"),
    ("H009", "Masaka Hospital", "Kigali City", "Kicukiro", "District"),
    ("H010", "Rwamagana Hospital", "Eastern", "Rwamagana", "Provincial"),
    ("H011", "Nyamata Hospital", "Eastern", "Bugesera", "District"),
    ("H012", "Rilima Orthopedic Hospital", "Eastern", "Bugesera", "Specialized"),
    ("H013", "Kiziguro Hospital", "Eastern", "Gatsibo", "District"),
    ("H014", "Ngarama Hospital", "Eastern", "Gatsibo", "District"),
    ("H015", "Gahini Hospital", "Eastern", "Kayonza", "District"),
    ("H016", "Rwinkwavu Hospital", "Eastern", "Kayonza", "District"),
    ("H017", "Kirehe Hospital", "Eastern", "Kirehe", "District"),
    ("H018", "Kibungo Hospital", "Eastern", "Ngoma", "Provincial"),
    ("H019", "Nyagatare Hospital", "Eastern", "Nyagatare", "District"),
    ("H020", "Gatunda Hospital", "Eastern", "Nyagatare", "District"),
    ("H021", "Byumba Hospital", "Northern", "Gicumbi", "Provincial"),
    ("H022", "Butaro Hospital (Cancer Center)", "Northern", "Burera", "Level 2 Teaching"),
    ("H023", "Nemba Hospital", "Northern", "Gakenke", "District"),
    ("H024", "Ruli Hospital", "Northern", "Gakenke", "District"),
    ("H025", "Gatonde Hospital", "Northern", "Gakenke", "District"),
    ("H026", "Ruhengeri Hospital", "Northern", "Musanze", "Referral"),
    ("H027", "Kinihira Hospital", "Northern", "Rulindo", "Provincial"),
    ("H028", "Rutongo Hospital", "Northern", "Rulindo", "District"),
    ("H029", "Nyanza Hospital", "Southern", "Nyanza", "Provincial"),
    ("H030", "HVP Gatagara", "Southern", "Nyanza", "Specialized (Orthopedic)"),
    ("H031", "CHUB (Univ. Teaching Hospital of Butare)", "Southern", "Huye", "National Referral"),
    ("H032", "Kabutare Hospital", "Southern", "Huye", "District"),
    ("H033", "Gakoma Hospital", "Southern", "Gisagara", "District"),
    ("H034", "Kibilizi Hospital", "Southern", "Gisagara", "District"),
    ("H035", "Remera-Rukoma Hospital", "Southern", "Kamonyi", "District"),
    ("H036", "Kabgayi Hospital", "Southern", "Muhanga", "Level 2 Teaching"),
    ("H037", "Nyabikenke Hospital", "Southern", "Muhanga", "District"),
    ("H038", "Kigeme Hospital", "Southern", "Nyamagabe", "District"),
    ("H039", "Kaduha Hospital", "Southern", "Nyamagabe", "District"),
    ("H040", "Munini Hospital", "Southern", "Nyaruguru", "District"),
    ("H041", "Ruhango Hospital", "Southern", "Ruhango", "Provincial"),
    ("H042", "Gitwe Hospital", "Southern", "Ruhango", "District"),
    ("H043", "Kibuye Hospital", "Western", "Karongi", "Referral"),
    ("H044", "Kirinda Hospital", "Western", "Karongi", "District"),
    ("H045", "Mugonero Hospital", "Western", "Karongi", "District"),
    ("H046", "Kabaya Hospital", "Western", "Ngororero", "District"),
    ("H047", "Muhororo Hospital", "Western", "Ngororero", "District"),
    ("H048", "Shyira Hospital", "Western", "Nyabihu", "District"),
    ("H049", "Bushenge Hospital", "Western", "Nyamasheke", "Provincial"),
    ("H050", "Kibogora Hospital", "Western", "Nyamasheke", "Level 2 Teaching"),
    ("H051", "Gisenyi Hospital", "Western", "Rubavu", "District"),
    ("H052", "Gihundwe Hospital", "Western", "Rusizi", "District"),
    ("H053", "Mibilizi Hospital", "Western", "Rusizi", "District"),
    ("H054", "Murunda Hospital", "Western", "Rutsiro", "District"),
];

const SPECIALTIES: [&str; 6] = [
    "General Medicine",
    "Pediatrics",
    "Internal Medicine",
    "OB/GYN",
    "Surgery",
    "Psychiatry",
];

pub fn hospitals() -> Vec<Hospital> {
    HOSPITALS
        .iter()
        .map(|&(id, name, province, district, category)| Hospital {
            id: id.into(),
            name: name.into(),
            province: province.into(),
            district: district.into(),
            category: category.into(),
        })
        .collect()
}

/// Two doctors per hospital, numbered in hospital order.
///
/// Doctor A of hospital `idx` gets specialty `(2 * idx) % 6`, doctor B the next one.
pub fn auto_doctors(hospitals: &[Hospital]) -> Vec<Doctor> {
    let mut out = Vec::with_capacity(hospitals.len() * 2);

    for (idx, h) in hospitals.iter().enumerate() {
        let short_name = h.name.split(' ').next().unwrap_or_default();
        for (slot, label) in [(0, "a"), (1, "b")] {
            out.push(Doctor {
                id: format!(
                    "{DOCTOR_ID_PREFIX}{:0width$}",
                    out.len() + 1,
                    width = ID_DIGITS
                ),
                name: format!(
                    "Dr. {} {} ({})",
                    h.district,
                    label.to_uppercase(),
                    short_name
                ),
                email: format!("doc.{}.{}@health.rw", h.id.to_lowercase(), label),
                specialty: SPECIALTIES[(idx * 2 + slot) % SPECIALTIES.len()].into(),
                hospital_id: h.id.clone(),
            });
        }
    }

    out
}

pub fn services() -> Vec<Service> {
    [
        ("S001", "General Consultation", "Consultation", 5000.0),
        ("S002", "Pediatric Consultation", "Consultation", 7000.0),
        ("S003", "Antenatal Care (ANC)", "Maternity", 3000.0),
        ("S004", "Laboratory Tests (Basic)", "Laboratory", 8000.0),
        ("S005", "X-Ray", "Imaging", 15000.0),
        ("S006", "Ultrasound", "Imaging", 12000.0),
        ("S007", "Vaccination", "Preventive", 2000.0),
        ("S008", "Emergency Care", "Emergency", 10000.0),
    ]
    .into_iter()
    .map(|(id, name, category, price_rwf)| Service {
        id: id.into(),
        name: name.into(),
        category: category.into(),
        price_rwf,
    })
    .collect()
}

pub fn locations() -> Vec<Location> {
    vec![Location {
        id: "L001".into(),
        province: "Kigali City".into(),
        district: "Gasabo".into(),
        sector: "Kimironko".into(),
        cell: "Bibare".into(),
        village: "Bibare I".into(),
    }]
}

pub fn patients() -> Vec<Patient> {
    [
        ("P001", "Uwase Marie", 34.0, "Kigali", "+250788123456", "patient@health.rw", "doctor@health.rw"),
        ("P002", "Mugisha Jean", 45.0, "Kigali", "+250788234567", "otherpatient@health.rw", "doctor@health.rw"),
        ("P003", "Ingabire Sarah", 28.0, "Kigali", "+250788345678", "sarah@health.rw", "otherdoctor@health.rw"),
        ("P004", "Nsabimana Paul", 52.0, "Huye", "+250788456789", "paul@health.rw", "otherdoctor@health.rw"),
    ]
    .into_iter()
    .map(|(id, name, age, district, phone, email, doctor_email)| Patient {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        phone: phone.into(),
        age: Some(age),
        gender: String::new(),
        insurance: String::new(),
        doctor_email: doctor_email.into(),
        address: String::new(),
        location: None,
        district: district.into(),
    })
    .collect()
}

// (email, display name) of the people referenced by the clinical seeds.
const UWASE: (&str, &str) = ("patient@health.rw", "Uwase Marie");
const MUGISHA: (&str, &str) = ("otherpatient@health.rw", "Mugisha Jean");
const UWIMANA: (&str, &str) = ("doctor@health.rw", "Dr. Uwimana Grace");
const MUKAMANA: (&str, &str) = ("otherdoctor@health.rw", "Dr. Mukamana Alice");

pub fn appointments() -> Vec<Appointment> {
    use AppointmentStatus::{Confirmed, Pending};

    [
        ("A001", UWASE, UWIMANA, "2025-12-21", "09:00", Confirmed),
        ("A002", UWASE, UWIMANA, "2025-12-23", "10:30", Pending),
        ("A003", MUGISHA, UWIMANA, "2025-12-22", "14:00", Confirmed),
        ("A004", MUGISHA, MUKAMANA, "2025-12-24", "11:15", Confirmed),
    ]
    .into_iter()
    .map(|(id, patient, doctor, date, time, status)| Appointment {
        id: id.into(),
        patient_email: patient.0.into(),
        patient: patient.1.into(),
        doctor_email: doctor.0.into(),
        doctor: doctor.1.into(),
        date: date.into(),
        time: time.into(),
        status,
        hospital_id: String::new(),
        hospital_name: String::new(),
        insurance: String::new(),
        service_id: String::new(),
        service_name: String::new(),
    })
    .collect()
}

pub fn medical_records() -> Vec<MedicalRecord> {
    [
        ("MR001", UWASE, UWIMANA, "Malaria", "Prescribed antimalarial. Recheck in 7 days.", "2025-12-10"),
        ("MR002", UWASE, UWIMANA, "Follow-up", "Symptoms improved. Continue hydration.", "2025-12-14"),
        ("MR003", MUGISHA, UWIMANA, "Hypertension", "Lifestyle advice + medication review.", "2025-12-12"),
        ("MR004", MUGISHA, MUKAMANA, "Diabetes", "Diet plan + metformin started.", "2025-12-13"),
    ]
    .into_iter()
    .map(|(id, patient, doctor, diagnosis, notes, date)| MedicalRecord {
        id: id.into(),
        patient_email: patient.0.into(),
        patient: patient.1.into(),
        doctor_email: doctor.0.into(),
        doctor: doctor.1.into(),
        diagnosis: diagnosis.into(),
        notes: notes.into(),
        treatment: String::new(),
        date: date.into(),
        reviewed: false,
    })
    .collect()
}

pub fn prescriptions() -> Vec<Prescription> {
    [
        ("RX001", UWASE, UWIMANA, "Artemether-Lumefantrine", "1 tab twice daily", "Take after meals.", "2025-12-10"),
        ("RX002", UWASE, UWIMANA, "Paracetamol", "500mg 3x daily", "If fever/pain.", "2025-12-14"),
        ("RX003", MUGISHA, UWIMANA, "Amlodipine", "5mg once daily", "Same time daily.", "2025-12-12"),
        ("RX004", MUGISHA, MUKAMANA, "Metformin", "500mg twice daily", "With meals.", "2025-12-13"),
    ]
    .into_iter()
    .map(|(id, patient, doctor, medication, dosage, instructions, date_issued)| Prescription {
        id: id.into(),
        patient_email: patient.0.into(),
        patient: patient.1.into(),
        doctor_email: doctor.0.into(),
        doctor: doctor.1.into(),
        medication: medication.into(),
        dosage: dosage.into(),
        frequency: String::new(),
        duration_days: None,
        instructions: instructions.into(),
        date_issued: date_issued.into(),
        status: PrescriptionStatus::Active,
    })
    .collect()
}
