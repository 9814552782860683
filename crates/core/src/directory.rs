//! Read-only clinic directory: patients, staff and services.
//!
//! The directory feeds the selection lists of the booking form and lets the appointment store
//! check that a request references people and services that exist. It is loaded once from a
//! YAML seed file:
//!
//! ```yaml
//! patients:
//!   - { id: pat_1, firstName: Ada, lastName: Lovelace, clinicId: clinic_1 }
//! staff:
//!   - { id: doc_1, name: Dr Grace Hopper, role: DOCTOR, clinicId: clinic_1 }
//! services:
//!   - { id: svc_1, name: Consultation, durationMinutes: 30, price: 60.0 }
//! ```
//!
//! Without a seed file the directory is *open*: lists are empty and references are not
//! checked, leaving referential integrity to whatever sits behind the API.

use crate::constants::MINUTES_PER_DAY;
use crate::{BookingError, BookingResult};
use api_shared::pb;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    patients: Vec<pb::Patient>,
    #[serde(default)]
    staff: Vec<pb::StaffMember>,
    #[serde(default)]
    services: Vec<pb::Service>,
}

#[derive(Clone, Debug, Default)]
pub struct Directory {
    patients: Vec<pb::Patient>,
    staff: Vec<pb::StaffMember>,
    services: Vec<pb::Service>,
    enforce_references: bool,
}

impl Directory {
    /// A directory with no entries that accepts any reference.
    pub fn open() -> Self {
        Self::default()
    }

    /// Parses a YAML seed document.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::YamlDeserialization`] for malformed YAML and
    /// [`BookingError::InvalidInput`] for a service that takes no time or a whole day or more.
    pub fn from_yaml(raw: &str) -> BookingResult<Self> {
        let seed: SeedFile =
            serde_yaml::from_str(raw).map_err(BookingError::YamlDeserialization)?;

        if let Some(service) = seed
            .services
            .iter()
            .find(|s| s.duration_minutes == 0 || s.duration_minutes >= MINUTES_PER_DAY)
        {
            return Err(BookingError::InvalidInput(format!(
                "service {} must last between 1 and {} minutes",
                service.id,
                MINUTES_PER_DAY - 1
            )));
        }

        Ok(Self {
            patients: seed.patients,
            staff: seed.staff,
            services: seed.services,
            enforce_references: true,
        })
    }

    /// Reads and parses a YAML seed file.
    pub fn load(path: &Path) -> BookingResult<Self> {
        let raw = fs::read_to_string(path).map_err(BookingError::FileRead)?;
        let directory = Self::from_yaml(&raw)?;
        tracing::info!(
            patients = directory.patients.len(),
            staff = directory.staff.len(),
            services = directory.services.len(),
            "loaded clinic directory from {}",
            path.display()
        );
        Ok(directory)
    }

    pub fn patients(&self) -> &[pb::Patient] {
        &self.patients
    }

    pub fn staff(&self) -> &[pb::StaffMember] {
        &self.staff
    }

    pub fn services(&self) -> &[pb::Service] {
        &self.services
    }

    pub fn service(&self, id: &str) -> Option<&pb::Service> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Checks that patient, doctor and service in `req` exist, and that the doctor is a doctor.
    ///
    /// A kind of entity the seed does not list at all is not checked.
    pub fn check_references(&self, req: &pb::AppointmentReq) -> BookingResult<()> {
        if !self.enforce_references {
            return Ok(());
        }

        if !self.patients.is_empty() && !self.patients.iter().any(|p| p.id == req.patient_id) {
            return Err(BookingError::UnknownReference {
                kind: "patient",
                id: req.patient_id.clone(),
            });
        }

        if !self.staff.is_empty() {
            let doctor = self
                .staff
                .iter()
                .find(|s| s.id == req.doctor_id)
                .ok_or_else(|| BookingError::UnknownReference {
                    kind: "staff member",
                    id: req.doctor_id.clone(),
                })?;
            if doctor.role != pb::StaffRole::Doctor {
                return Err(BookingError::NotADoctor(doctor.id.clone()));
            }
        }

        if let Some(service_id) = &req.service_id {
            if !self.services.is_empty() && self.service(service_id).is_none() {
                return Err(BookingError::UnknownReference {
                    kind: "service",
                    id: service_id.clone(),
                });
            }
        }

        Ok(())
    }
}
