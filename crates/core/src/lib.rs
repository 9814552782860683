//! # Clinic Core
//!
//! Core booking logic for the clinic system.
//!
//! This crate contains pure data operations:
//! - Time-of-day parsing and end-time derivation from service durations ([`schedule`])
//! - Booking form state with derived end time ([`form`])
//! - Field-level validation of forms and request bodies ([`validation`])
//! - The read-only clinic directory ([`directory`]) and the appointment store
//!   ([`repositories::appointments`])
//!
//! **No API concerns**: HTTP servers and clients belong in `api-rest` and `clinic-client`.

pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod form;
pub mod repositories;
pub mod schedule;
pub mod validation;

// Use the shared api-shared crate for wire types.
pub use api_shared::pb;

pub use clinic_types::{AppointmentStatus, NonEmptyText, StatusError, TextError};
pub use config::ClinicConfig;
pub use directory::Directory;
pub use error::{BookingError, BookingResult};
pub use form::AppointmentForm;
pub use repositories::appointments::AppointmentService;
pub use schedule::{derive_end_time, DerivedEndTime, TimeOfDay};
pub use validation::{validate, Field, FieldErrors, ValidatedAppointment};
