//! Administrator dashboard figures.

use crate::app_data::AppData;
use crate::repositories::appointments::AppointmentStatus;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

/// Number of days, ending today, covered by [`DashboardSummary::last_seven_days`].
pub const TREND_DAYS: u64 = 7;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: AppointmentStatus,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct DayCount {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Short weekday name, e.g. `Mon`.
    pub label: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub today: String,
    pub total_patients: usize,
    pub total_doctors: usize,
    pub total_facilities: usize,
    pub appointments_today: usize,
    pub pending_appointments: usize,
    pub records_today: usize,
    pub status_distribution: Vec<StatusCount>,
    /// Oldest day first.
    pub last_seven_days: Vec<DayCount>,
}

impl AppData {
    /// Summary as of `today`. Dates are compared as `YYYY-MM-DD` strings.
    pub fn dashboard(&self, today: NaiveDate) -> DashboardSummary {
        let appointments = self.appointments().all();
        let iso = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
        let today_iso = iso(today);
        let on = |date: &str| appointments.iter().filter(|a| a.date == date).count();

        let status_distribution = AppointmentStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: appointments.iter().filter(|a| a.status == status).count(),
            })
            .collect();

        let last_seven_days = (0..TREND_DAYS)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|day| {
                let date = iso(day);
                DayCount {
                    count: on(&date),
                    label: day.format("%a").to_string(),
                    date,
                }
            })
            .collect();

        DashboardSummary {
            total_patients: self.patients().all().len(),
            total_doctors: self.doctors().all().len(),
            total_facilities: self.hospitals().all().len(),
            appointments_today: on(&today_iso),
            pending_appointments: appointments
                .iter()
                .filter(|a| a.status == AppointmentStatus::Pending)
                .count(),
            records_today: self
                .medical_records()
                .all()
                .iter()
                .filter(|r| r.date == today_iso)
                .count(),
            status_distribution,
            last_seven_days,
            today: today_iso,
        }
    }
}
