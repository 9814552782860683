//! Appointment status lifecycle.
//!
//! ```text
//! SCHEDULED ──► CONFIRMED ──► COMPLETED
//!     │             │
//!     └──────┬──────┘
//!            ▼
//!   CANCELLED | NO_SHOW
//! ```
//!
//! COMPLETED, CANCELLED and NO_SHOW are terminal. A non-terminal status may "transition" to
//! itself so that other fields of an appointment can be edited without a status change.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Status of an appointment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

/// Errors raised when parsing or transitioning a status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("unknown appointment status: {0}")]
    Unknown(String),
    #[error("cannot change appointment status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    /// Wire representation (`SCHEDULED`, `NO_SHOW`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }

    /// Statuses a new appointment may be booked with.
    pub fn is_bookable(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed
        )
    }

    /// Returns true once no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }

    /// Returns true if a staff action may move an appointment from `self` to `next`.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;

        if self == next {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Scheduled, Confirmed)
                | (Scheduled, Cancelled)
                | (Scheduled, NoShow)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
        )
    }

    /// Checks the transition and returns the new status.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::InvalidTransition`] if the move is not allowed.
    pub fn transition(self, next: AppointmentStatus) -> Result<AppointmentStatus, StatusError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StatusError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| StatusError::Unknown(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::AppointmentStatus::*;
    use super::*;

    #[test]
    fn test_forward_path_is_allowed() {
        assert!(Scheduled.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Completed));
    }

    #[test]
    fn test_scheduled_cannot_skip_to_completed() {
        let err = Scheduled
            .transition(Completed)
            .expect_err("should require confirmation first");
        assert_eq!(
            err,
            StatusError::InvalidTransition {
                from: Scheduled,
                to: Completed
            }
        );
    }

    #[test]
    fn test_cancel_and_no_show_reachable_from_open_states() {
        for from in [Scheduled, Confirmed] {
            assert!(from.can_transition_to(Cancelled), "{from} -> CANCELLED");
            assert!(from.can_transition_to(NoShow), "{from} -> NO_SHOW");
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        for from in [Completed, Cancelled, NoShow] {
            for to in AppointmentStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be rejected");
            }
        }
    }

    #[test]
    fn test_confirmed_cannot_go_back_to_scheduled() {
        assert!(!Confirmed.can_transition_to(Scheduled));
    }

    #[test]
    fn test_only_scheduled_and_confirmed_are_bookable() {
        let bookable: Vec<_> = AppointmentStatus::ALL
            .into_iter()
            .filter(|s| s.is_bookable())
            .collect();
        assert_eq!(bookable, vec![Scheduled, Confirmed]);
    }

    #[test]
    fn test_parse_and_wire_format() {
        assert_eq!("no_show".parse::<AppointmentStatus>().unwrap(), NoShow);
        assert_eq!(
            serde_json::to_string(&NoShow).unwrap(),
            "\"NO_SHOW\"".to_string()
        );
        assert!(matches!(
            "PENDING".parse::<AppointmentStatus>(),
            Err(StatusError::Unknown(_))
        ));
    }
}
