//! Appointment store.
//!
//! Holds appointments in memory behind an `RwLock`, keyed by a generated UUID. Appointments
//! are never deleted; after creation only their fields and status change, and status changes
//! must follow [`AppointmentStatus::can_transition_to`].
//!
//! Every write re-runs [`validate_request`] at the clinic offset and the directory reference
//! checks, so a stored appointment starts and ends on one clinic-local date and can always be
//! loaded back into the booking form.

use crate::directory::Directory;
use crate::error::{BookingError, BookingResult};
use crate::validation::{validate_request, Field, FieldErrors};
use api_shared::pb;
use chrono::{FixedOffset, Utc};
use clinic_types::AppointmentStatus;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct AppointmentService {
    directory: Arc<Directory>,
    utc_offset: FixedOffset,
    records: Arc<RwLock<HashMap<String, pb::AppointmentRes>>>,
}

impl AppointmentService {
    pub fn new(directory: Arc<Directory>, utc_offset: FixedOffset) -> Self {
        Self {
            directory,
            utc_offset,
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Creates a new appointment.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Validation`] if the request fails field checks or its status is not
    ///   SCHEDULED/CONFIRMED
    /// - [`BookingError::UnknownReference`] / [`BookingError::NotADoctor`] from the directory
    pub fn create(&self, req: pb::AppointmentReq) -> BookingResult<pb::AppointmentRes> {
        validate_request(&req, self.utc_offset)?;
        if !req.status.is_bookable() {
            let mut errors = FieldErrors::new();
            errors.insert(Field::Status, "Status must be SCHEDULED or CONFIRMED");
            return Err(errors.into());
        }
        self.directory.check_references(&req)?;

        let now = Utc::now();
        let record = pb::AppointmentRes {
            id: Uuid::new_v4().to_string(),
            patient_id: req.patient_id,
            doctor_id: req.doctor_id,
            service_id: req.service_id,
            start_time: req.start_time,
            end_time: req.end_time,
            status: req.status,
            notes: req.notes,
            created_at: now,
            updated_at: now,
        };

        self.write()?.insert(record.id.clone(), record.clone());
        tracing::info!(
            appointment = %record.id,
            doctor = %record.doctor_id,
            status = %record.status,
            "appointment created"
        );
        Ok(record)
    }

    /// Replaces the fields of an existing appointment.
    ///
    /// # Errors
    ///
    /// - [`BookingError::NotFound`] if `id` is unknown
    /// - [`BookingError::Status`] if the status change is not a legal transition
    /// - the same validation and reference errors as [`AppointmentService::create`]
    pub fn update(&self, id: &str, req: pb::AppointmentReq) -> BookingResult<pb::AppointmentRes> {
        validate_request(&req, self.utc_offset)?;
        self.directory.check_references(&req)?;

        let mut records = self.write()?;
        let existing = records
            .get_mut(id)
            .ok_or_else(|| BookingError::NotFound(id.to_string()))?;

        let previous = existing.status;
        let status = previous.transition(req.status)?;

        existing.patient_id = req.patient_id;
        existing.doctor_id = req.doctor_id;
        existing.service_id = req.service_id;
        existing.start_time = req.start_time;
        existing.end_time = req.end_time;
        existing.notes = req.notes;
        existing.status = status;
        existing.updated_at = Utc::now();

        if previous != status {
            tracing::info!(appointment = %id, from = %previous, to = %status, "appointment status changed");
        } else {
            tracing::info!(appointment = %id, "appointment updated");
        }
        Ok(existing.clone())
    }

    pub fn get(&self, id: &str) -> BookingResult<pb::AppointmentRes> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| BookingError::NotFound(id.to_string()))
    }

    /// All appointments, earliest start first.
    pub fn list(&self) -> BookingResult<Vec<pb::AppointmentRes>> {
        let mut appointments: Vec<_> = self.read()?.values().cloned().collect();
        appointments.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        Ok(appointments)
    }

    /// Appointments currently in `status`.
    pub fn list_by_status(
        &self,
        status: AppointmentStatus,
    ) -> BookingResult<Vec<pb::AppointmentRes>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|a| a.status == status)
            .collect())
    }

    fn read(&self) -> BookingResult<RwLockReadGuard<'_, HashMap<String, pb::AppointmentRes>>> {
        self.records.read().map_err(|_| BookingError::StorePoisoned)
    }

    fn write(&self) -> BookingResult<RwLockWriteGuard<'_, HashMap<String, pb::AppointmentRes>>> {
        self.records.write().map_err(|_| BookingError::StorePoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::AppointmentForm;
    use crate::validation::validate;
    use chrono::{Offset, TimeZone};
    use clinic_types::StatusError;

    fn request(status: AppointmentStatus) -> pb::AppointmentReq {
        pb::AppointmentReq {
            patient_id: "pat_1".into(),
            doctor_id: "doc_1".into(),
            service_id: Some("svc_1".into()),
            start_time: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap(),
            notes: "first visit".into(),
            status,
        }
    }

    fn service() -> AppointmentService {
        AppointmentService::new(Arc::new(Directory::open()), Utc.fix())
    }

    #[test]
    fn test_create_assigns_id_and_timestamps() {
        let store = service();
        let created = store
            .create(request(AppointmentStatus::Scheduled))
            .expect("create should succeed");

        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(store.get(&created.id).unwrap(), created);
    }

    #[test]
    fn test_create_rejects_non_bookable_status() {
        let err = service()
            .create(request(AppointmentStatus::Completed))
            .expect_err("should reject COMPLETED at creation");
        assert!(matches!(err, BookingError::Validation(errors) if errors.contains(Field::Status)));
    }

    #[test]
    fn test_create_rejects_inverted_window() {
        let mut req = request(AppointmentStatus::Scheduled);
        std::mem::swap(&mut req.start_time, &mut req.end_time);

        let err = service().create(req).expect_err("should reject end before start");
        assert!(matches!(err, BookingError::Validation(errors) if errors.contains(Field::EndTime)));
    }

    #[test]
    fn test_update_follows_state_machine() {
        let store = service();
        let created = store.create(request(AppointmentStatus::Scheduled)).unwrap();

        let confirmed = store
            .update(&created.id, request(AppointmentStatus::Confirmed))
            .expect("SCHEDULED -> CONFIRMED");
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
        assert_eq!(confirmed.created_at, created.created_at);

        let completed = store
            .update(&created.id, request(AppointmentStatus::Completed))
            .expect("CONFIRMED -> COMPLETED");
        assert_eq!(completed.status, AppointmentStatus::Completed);

        let err = store
            .update(&created.id, request(AppointmentStatus::Cancelled))
            .expect_err("COMPLETED is terminal");
        assert!(matches!(
            err,
            BookingError::Status(StatusError::InvalidTransition {
                from: AppointmentStatus::Completed,
                to: AppointmentStatus::Cancelled,
            })
        ));
    }

    #[test]
    fn test_update_edits_fields_without_status_change() {
        let store = service();
        let created = store.create(request(AppointmentStatus::Scheduled)).unwrap();

        let mut req = request(AppointmentStatus::Scheduled);
        req.notes = "moved to afternoon".into();
        req.start_time = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();
        req.end_time = Utc.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).unwrap();

        let updated = store.update(&created.id, req).expect("edit should succeed");
        assert_eq!(updated.notes, "moved to afternoon");
        assert_eq!(updated.status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let err = service()
            .update("missing", request(AppointmentStatus::Scheduled))
            .expect_err("should be not found");
        assert!(matches!(err, BookingError::NotFound(id) if id == "missing"));
    }

    #[test]
    fn test_list_orders_by_start_time() {
        let store = service();

        let mut later = request(AppointmentStatus::Scheduled);
        later.start_time = Utc.with_ymd_and_hms(2026, 3, 3, 9, 0, 0).unwrap();
        later.end_time = Utc.with_ymd_and_hms(2026, 3, 3, 9, 30, 0).unwrap();
        let later = store.create(later).unwrap();
        let earlier = store.create(request(AppointmentStatus::Confirmed)).unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![earlier.id.clone(), later.id]);

        let confirmed = store.list_by_status(AppointmentStatus::Confirmed).unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, earlier.id);
    }

    #[test]
    fn test_create_checks_directory_references() {
        let directory = Directory::from_yaml(
            "patients:\n  - { id: pat_1, firstName: Ada, lastName: Lovelace }\nstaff:\n  - { id: doc_1, name: Dr Hopper, role: DOCTOR }\nservices:\n  - { id: svc_2, name: Review, durationMinutes: 15 }\n",
        )
        .unwrap();
        let store = AppointmentService::new(Arc::new(directory), Utc.fix());

        let err = store
            .create(request(AppointmentStatus::Scheduled))
            .expect_err("svc_1 is not in the directory");
        assert!(matches!(err, BookingError::UnknownReference { kind: "service", .. }));

        let mut req = request(AppointmentStatus::Scheduled);
        req.service_id = None;
        store.create(req).expect("known patient and doctor");
    }

    #[test]
    fn test_create_rejects_window_spanning_clinic_dates() {
        let mut req = request(AppointmentStatus::Scheduled);
        req.start_time = Utc.with_ymd_and_hms(2026, 3, 2, 23, 0, 0).unwrap();
        req.end_time = Utc.with_ymd_and_hms(2026, 3, 3, 1, 0, 0).unwrap();

        let err = service().create(req).expect_err("overnight booking should be rejected");
        assert!(matches!(err, BookingError::Validation(errors) if errors.contains(Field::EndTime)));
    }

    #[test]
    fn test_stored_appointment_loads_back_into_valid_form() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let store = AppointmentService::new(Arc::new(Directory::open()), offset);

        // 21:00-21:30 in the clinic zone, already 3 March in UTC for the end.
        let mut req = request(AppointmentStatus::Scheduled);
        req.start_time = Utc.with_ymd_and_hms(2026, 3, 3, 2, 0, 0).unwrap();
        req.end_time = Utc.with_ymd_and_hms(2026, 3, 3, 2, 30, 0).unwrap();
        let created = store.create(req).expect("same clinic-local date");

        let form = AppointmentForm::from_appointment(&created, offset);
        assert_eq!(form.date, "2026-03-02");
        validate(&form).expect("stored record should be editable through the form");
    }
}
