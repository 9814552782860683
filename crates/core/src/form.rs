//! Booking form state.
//!
//! [`AppointmentForm`] mirrors what a receptionist types: every field is kept as the raw
//! string entered, and only [`crate::validation::validate`] turns it into typed data.
//!
//! The end time is a *derived field*. It is recomputed on exactly two inputs:
//! - selecting a service ([`AppointmentForm::select_service`], [`AppointmentForm::select`])
//! - changing the start time ([`AppointmentForm::set_start_time`])
//!
//! Recomputation overwrites whatever end time was entered before. Without a selected service
//! the end time is manual.

use crate::constants::{DATE_FORMAT, DEFAULT_FORM_STATUS};
use crate::schedule::{derive_end_time, split, TimeOfDay};
use api_shared::pb;
use chrono::FixedOffset;

/// Service chosen on the form, reduced to what derivation needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedService {
    pub id: String,
    /// `None` when loaded from a stored appointment and not yet re-selected.
    pub duration_minutes: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppointmentForm {
    /// Set when editing an existing appointment.
    appointment_id: Option<String>,
    pub patient_id: String,
    pub doctor_id: String,
    service: Option<SelectedService>,
    /// `YYYY-MM-DD`
    pub date: String,
    start_time: String,
    end_time: String,
    end_crosses_midnight: bool,
    pub notes: String,
    pub status: String,
}

impl Default for AppointmentForm {
    fn default() -> Self {
        Self {
            appointment_id: None,
            patient_id: String::new(),
            doctor_id: String::new(),
            service: None,
            date: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            end_crosses_midnight: false,
            notes: String::new(),
            status: DEFAULT_FORM_STATUS.to_string(),
        }
    }
}

impl AppointmentForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an existing appointment for editing, expressing its instants in the clinic
    /// offset.
    pub fn from_appointment(record: &pb::AppointmentRes, offset: FixedOffset) -> Self {
        let (date, start) = split(record.start_time, offset);
        let (_, end) = split(record.end_time, offset);

        Self {
            appointment_id: Some(record.id.clone()),
            patient_id: record.patient_id.clone(),
            doctor_id: record.doctor_id.clone(),
            service: record.service_id.clone().map(|id| SelectedService {
                id,
                duration_minutes: None,
            }),
            date: date.format(DATE_FORMAT).to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            end_crosses_midnight: false,
            notes: record.notes.clone(),
            status: record.status.to_string(),
        }
    }

    pub fn appointment_id(&self) -> Option<&str> {
        self.appointment_id.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.appointment_id.is_some()
    }

    pub fn service(&self) -> Option<&SelectedService> {
        self.service.as_ref()
    }

    pub fn service_id(&self) -> Option<&str> {
        self.service.as_ref().map(|s| s.id.as_str())
    }

    pub fn start_time(&self) -> &str {
        &self.start_time
    }

    pub fn end_time(&self) -> &str {
        &self.end_time
    }

    /// True when the current end time was derived past midnight.
    pub fn end_crosses_midnight(&self) -> bool {
        self.end_crosses_midnight
    }

    /// Selects a service and re-derives the end time from its duration.
    pub fn select_service(&mut self, id: impl Into<String>, duration_minutes: u32) {
        self.service = Some(SelectedService {
            id: id.into(),
            duration_minutes: Some(duration_minutes),
        });
        self.recompute_end_time();
    }

    /// Selects a service from a directory entry.
    pub fn select(&mut self, service: &pb::Service) {
        self.select_service(service.id.clone(), service.duration_minutes);
    }

    /// Clears the service; the end time stays as last derived and becomes manual.
    pub fn clear_service(&mut self) {
        self.service = None;
    }

    pub fn set_start_time(&mut self, start_time: impl Into<String>) {
        self.start_time = start_time.into();
        self.recompute_end_time();
    }

    /// Manual end-time entry. Overwritten by the next recomputation.
    pub fn set_end_time(&mut self, end_time: impl Into<String>) {
        self.end_time = end_time.into();
        self.end_crosses_midnight = false;
    }

    /// Returns the form to a blank booking.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn recompute_end_time(&mut self) {
        let Some(duration) = self.service.as_ref().and_then(|s| s.duration_minutes) else {
            return;
        };
        let Ok(start) = TimeOfDay::parse(self.start_time.trim()) else {
            return;
        };

        let derived = derive_end_time(start, duration);
        tracing::debug!(
            start = %start,
            duration,
            end = %derived.end,
            "derived appointment end time"
        );
        self.end_time = derived.end.to_string();
        self.end_crosses_midnight = derived.crosses_midnight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_selecting_service_derives_end_time() {
        let mut form = AppointmentForm::new();
        form.set_start_time("09:00");
        form.select_service("svc_consult", 30);

        assert_eq!(form.end_time(), "09:30");
        assert_eq!(form.service_id(), Some("svc_consult"));
    }

    #[test]
    fn test_changing_start_time_rederives_and_overwrites_manual_end() {
        let mut form = AppointmentForm::new();
        form.select_service("svc_consult", 45);
        form.set_end_time("17:00");

        form.set_start_time("10:30");
        assert_eq!(form.end_time(), "11:15");
    }

    #[test]
    fn test_switching_service_rederives_end_time() {
        let mut form = AppointmentForm::new();
        form.set_start_time("08:00");
        form.select_service("svc_short", 15);
        assert_eq!(form.end_time(), "08:15");

        form.select(&pb::Service {
            id: "svc_long".into(),
            name: "Long consult".into(),
            duration_minutes: 90,
            price: 120.0,
            clinic_id: None,
        });
        assert_eq!(form.end_time(), "09:30");
    }

    #[test]
    fn test_without_service_end_time_is_manual() {
        let mut form = AppointmentForm::new();
        form.set_end_time("11:00");
        form.set_start_time("10:00");

        assert_eq!(form.end_time(), "11:00");
        assert_eq!(form.service(), None);
    }

    #[test]
    fn test_unparseable_start_leaves_end_untouched() {
        let mut form = AppointmentForm::new();
        form.set_end_time("11:00");
        form.select_service("svc", 30);
        form.set_start_time("10");

        assert_eq!(form.end_time(), "11:00");
    }

    #[test]
    fn test_midnight_crossing_is_recorded() {
        let mut form = AppointmentForm::new();
        form.set_start_time("23:50");
        form.select_service("svc", 30);

        assert_eq!(form.end_time(), "00:20");
        assert!(form.end_crosses_midnight());

        form.set_end_time("23:59");
        assert!(!form.end_crosses_midnight());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut form = AppointmentForm::new();
        form.patient_id = "pat_1".into();
        form.status = "CONFIRMED".into();
        form.select_service("svc", 30);

        form.reset();
        assert_eq!(form, AppointmentForm::default());
        assert_eq!(form.status, "SCHEDULED");
    }

    #[test]
    fn test_from_appointment_splits_instants_in_offset() {
        let record = pb::AppointmentRes {
            id: "appt_1".into(),
            patient_id: "pat_1".into(),
            doctor_id: "doc_1".into(),
            service_id: Some("svc_1".into()),
            start_time: Utc.with_ymd_and_hms(2026, 5, 4, 7, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 5, 4, 7, 30, 0).unwrap(),
            status: pb::AppointmentStatus::Confirmed,
            notes: "bring x-rays".into(),
            created_at: Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
        };

        let form =
            AppointmentForm::from_appointment(&record, FixedOffset::east_opt(3600).unwrap());
        assert!(form.is_editing());
        assert_eq!(form.appointment_id(), Some("appt_1"));
        assert_eq!(form.date, "2026-05-04");
        assert_eq!(form.start_time(), "08:00");
        assert_eq!(form.end_time(), "08:30");
        assert_eq!(form.status, "CONFIRMED");
        assert_eq!(form.service_id(), Some("svc_1"));

        // Stored service has no known duration, so editing the start keeps the end manual.
        let mut form = form;
        form.set_start_time("09:00");
        assert_eq!(form.end_time(), "08:30");
    }
}
