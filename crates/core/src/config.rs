//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. The
//! parsing helpers take the raw `Option<String>` from the environment rather than reading it
//! themselves, so request handling and tests never depend on process-wide state.

use crate::{BookingError, BookingResult};
use chrono::{FixedOffset, Offset, Utc};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ClinicConfig {
    utc_offset: FixedOffset,
    seed_file: Option<PathBuf>,
}

impl ClinicConfig {
    pub fn new(utc_offset: FixedOffset, seed_file: Option<PathBuf>) -> Self {
        Self {
            utc_offset,
            seed_file,
        }
    }

    /// Offset used to turn clinic-local dates and times into instants.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// YAML file listing patients, staff and services, if one was configured.
    pub fn seed_file(&self) -> Option<&Path> {
        self.seed_file.as_deref()
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self::new(utc(), None)
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Parse the clinic UTC offset from an optional string value.
///
/// Accepts `Z`, `UTC` or `±HH:MM`. `None` or an empty value yields UTC.
pub fn utc_offset_from_env_value(value: Option<String>) -> BookingResult<FixedOffset> {
    let Some(value) = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    else {
        return Ok(utc());
    };

    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }

    let invalid = || {
        BookingError::InvalidInput(format!(
            "CLINIC_UTC_OFFSET must be Z, UTC or ±HH:MM, got: '{}'",
            value
        ))
    };

    let (sign, rest) = match value.as_bytes().first() {
        Some(b'+') => (1, &value[1..]),
        Some(b'-') => (-1, &value[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 14 || minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Resolve the optional seed file path, requiring it to exist when given.
pub fn seed_file_from_env_value(value: Option<String>) -> BookingResult<Option<PathBuf>> {
    let Some(value) = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    else {
        return Ok(None);
    };

    let path = PathBuf::from(value);
    if !path.is_file() {
        return Err(BookingError::InvalidInput(format!(
            "CLINIC_SEED_FILE does not point to a file: {}",
            path.display()
        )));
    }
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_offset_defaults_to_utc() {
        assert_eq!(utc_offset_from_env_value(None).unwrap().local_minus_utc(), 0);
        assert_eq!(
            utc_offset_from_env_value(Some("  ".into())).unwrap().local_minus_utc(),
            0
        );
        assert_eq!(
            utc_offset_from_env_value(Some("UTC".into())).unwrap().local_minus_utc(),
            0
        );
    }

    #[test]
    fn test_utc_offset_parses_signed_hours_and_minutes() {
        let east = utc_offset_from_env_value(Some("+05:30".into())).unwrap();
        assert_eq!(east.local_minus_utc(), 5 * 3600 + 30 * 60);

        let west = utc_offset_from_env_value(Some("-03:00".into())).unwrap();
        assert_eq!(west.local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn test_utc_offset_rejects_garbage() {
        for bad in ["05:00", "+5:00", "+05", "+15:00", "+05:60", "Europe/London"] {
            let err = utc_offset_from_env_value(Some(bad.into())).expect_err("should reject");
            assert!(matches!(err, BookingError::InvalidInput(_)), "input {bad:?}");
        }
    }

    #[test]
    fn test_seed_file_must_exist() {
        let err = seed_file_from_env_value(Some("/definitely/not/here.yaml".into()))
            .expect_err("should reject missing file");
        assert!(matches!(err, BookingError::InvalidInput(msg) if msg.contains("CLINIC_SEED_FILE")));

        assert_eq!(seed_file_from_env_value(None).unwrap(), None);
    }

    #[test]
    fn test_seed_file_accepts_existing_file() {
        let file = tempfile::NamedTempFile::new().expect("create temp file");
        let resolved = seed_file_from_env_value(Some(file.path().display().to_string()))
            .expect("existing file should be accepted");
        assert_eq!(resolved.as_deref(), Some(file.path()));
    }
}
