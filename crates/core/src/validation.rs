//! Appointment validation.
//!
//! Two entry points share the same rules:
//! - [`validate`] checks a booking form before anything is sent. Failures come back as
//!   [`FieldErrors`] keyed by form field so each message can be shown next to its input.
//! - [`validate_request`] re-checks a decoded request body on the server, where the times are
//!   already absolute instants.
//!
//! Validation is synchronous and local; it never performs I/O.

use crate::constants::{DATE_FORMAT, NOTES_MAX_CHARS};
use crate::form::AppointmentForm;
use crate::schedule::{combine, split, TimeOfDay};
use crate::BookingResult;
use api_shared::pb;
use chrono::{FixedOffset, NaiveDate};
use clinic_types::{AppointmentStatus, NonEmptyText};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

const SAME_DAY_MESSAGE: &str = "Appointment must end on the same day it starts";

/// Fields of the booking form that can carry an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    PatientId,
    DoctorId,
    Date,
    StartTime,
    EndTime,
    Notes,
    Status,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::PatientId => "patientId",
            Field::DoctorId => "doctorId",
            Field::Date => "date",
            Field::StartTime => "startTime",
            Field::EndTime => "endTime",
            Field::Notes => "notes",
            Field::Status => "status",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message per field; the first error recorded for a field wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// A booking form that passed [`validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedAppointment {
    pub appointment_id: Option<String>,
    pub patient_id: NonEmptyText,
    pub doctor_id: NonEmptyText,
    pub service_id: Option<NonEmptyText>,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub notes: String,
    pub status: AppointmentStatus,
}

impl ValidatedAppointment {
    /// Builds the request body, turning local date + times into UTC instants.
    pub fn to_request(&self, offset: FixedOffset) -> BookingResult<pb::AppointmentReq> {
        Ok(pb::AppointmentReq {
            patient_id: self.patient_id.to_string(),
            doctor_id: self.doctor_id.to_string(),
            service_id: self.service_id.as_ref().map(ToString::to_string),
            start_time: combine(self.date, self.start_time, offset)?,
            end_time: combine(self.date, self.end_time, offset)?,
            notes: self.notes.clone(),
            status: self.status,
        })
    }
}

/// Validates a booking form.
///
/// # Errors
///
/// Returns every field that failed, each with a single human-readable message.
pub fn validate(form: &AppointmentForm) -> Result<ValidatedAppointment, FieldErrors> {
    let mut errors = FieldErrors::new();

    let patient_id = required_id(
        &form.patient_id,
        Field::PatientId,
        "Please select a patient",
        &mut errors,
    );
    let doctor_id = required_id(
        &form.doctor_id,
        Field::DoctorId,
        "Please select a doctor",
        &mut errors,
    );
    let date = date_field(&form.date, &mut errors);
    let start_time = time_field(form.start_time(), Field::StartTime, "Start time", &mut errors);
    let end_time = time_field(form.end_time(), Field::EndTime, "End time", &mut errors);

    if let (Some(start), Some(end)) = (start_time, end_time) {
        // A wrapped end can land after the start.
        if form.end_crosses_midnight() {
            errors.insert(Field::EndTime, SAME_DAY_MESSAGE);
        } else if end <= start {
            errors.insert(Field::EndTime, "End time must be after start time");
        }
    }

    if let Err(message) = check_notes(&form.notes) {
        errors.insert(Field::Notes, message);
    }

    let status = match form.status.parse::<AppointmentStatus>() {
        Ok(status) if status.is_bookable() => Some(status),
        _ => {
            errors.insert(Field::Status, "Status must be SCHEDULED or CONFIRMED");
            None
        }
    };

    match (patient_id, doctor_id, date, start_time, end_time, status) {
        (
            Some(patient_id),
            Some(doctor_id),
            Some(date),
            Some(start_time),
            Some(end_time),
            Some(status),
        ) if errors.is_empty() => {
            Ok(ValidatedAppointment {
                appointment_id: form.appointment_id().map(str::to_string),
                patient_id,
                doctor_id,
                service_id: form.service_id().and_then(|id| NonEmptyText::new(id).ok()),
                date,
                start_time,
                end_time,
                notes: form.notes.clone(),
                status,
            })
        }
        _ => Err(errors),
    }
}

/// Server-side checks on a decoded request body.
///
/// Start and end must fall on the same calendar date at the clinic `offset`, as they do on the
/// form. Status legality depends on whether the request creates or updates, so it is left to
/// the caller.
pub fn validate_request(req: &pb::AppointmentReq, offset: FixedOffset) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if req.patient_id.trim().is_empty() {
        errors.insert(Field::PatientId, "patientId is required");
    }
    if req.doctor_id.trim().is_empty() {
        errors.insert(Field::DoctorId, "doctorId is required");
    }
    if req.end_time <= req.start_time {
        errors.insert(Field::EndTime, "End time must be after start time");
    } else if split(req.start_time, offset).0 != split(req.end_time, offset).0 {
        errors.insert(Field::EndTime, SAME_DAY_MESSAGE);
    }
    if let Err(message) = check_notes(&req.notes) {
        errors.insert(Field::Notes, message);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Notes are bounded by character count, not bytes.
pub fn check_notes(notes: &str) -> Result<(), String> {
    if notes.chars().count() > NOTES_MAX_CHARS {
        return Err(format!(
            "Notes must be at most {} characters",
            NOTES_MAX_CHARS
        ));
    }
    Ok(())
}

fn required_id(
    value: &str,
    field: Field,
    message: &str,
    errors: &mut FieldErrors,
) -> Option<NonEmptyText> {
    match NonEmptyText::new(value) {
        Ok(text) => Some(text),
        Err(_) => {
            errors.insert(field, message);
            None
        }
    }
}

fn date_field(value: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        errors.insert(Field::Date, "Date is required");
        return None;
    }
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.insert(Field::Date, "Date must be in YYYY-MM-DD format");
            None
        }
    }
}

fn time_field(
    value: &str,
    field: Field,
    label: &str,
    errors: &mut FieldErrors,
) -> Option<TimeOfDay> {
    if value.trim().is_empty() {
        errors.insert(field, format!("{label} is required"));
        return None;
    }
    match TimeOfDay::parse(value.trim()) {
        Ok(time) => Some(time),
        Err(_) => {
            errors.insert(field, format!("{label} must be in HH:MM format"));
            None
        }
    }
}
