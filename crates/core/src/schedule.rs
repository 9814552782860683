//! Time-of-day arithmetic for appointment booking.
//!
//! Booking forms carry a calendar date plus `HH:MM` start and end times. This module provides:
//! - [`TimeOfDay`], a strictly parsed 24-hour `HH:MM` value
//! - [`derive_end_time`], which adds a service duration to a start time
//! - [`combine`] / [`split`], which convert between local date + time and UTC instants using
//!   the clinic's fixed UTC offset
//!
//! ## Midnight
//!
//! End times are computed on a 24-hour clock: minutes overflow into hours, and hours wrap
//! modulo 24. A derivation that reaches or passes 24:00 is reported through
//! [`DerivedEndTime::crosses_midnight`] so callers can refuse it instead of storing an end
//! time that precedes its start.

use crate::constants::MINUTES_PER_DAY;
use crate::{BookingError, BookingResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use std::{fmt, str::FromStr};

/// A wall-clock time with minute precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    /// Builds a time from hour (0-23) and minute (0-59).
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        let minutes = u16::try_from(hour * 60 + minute).ok()?;
        Some(Self { minutes })
    }

    /// Parses a strict two-digit `HH:MM` string.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidInput`] for anything else, including `9:00`, `09:00:00`
    /// and out-of-range values like `24:00`.
    pub fn parse(input: &str) -> BookingResult<Self> {
        let bytes = input.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());

        if !well_formed {
            return Err(BookingError::InvalidInput(format!(
                "time must be in HH:MM format, got: '{}'",
                input
            )));
        }

        let digit = |i: usize| u32::from(bytes[i] - b'0');
        let hour = digit(0) * 10 + digit(1);
        let minute = digit(3) * 10 + digit(4);

        Self::new(hour, minute).ok_or_else(|| {
            BookingError::InvalidInput(format!("time out of range: '{}'", input))
        })
    }

    pub fn hour(self) -> u32 {
        u32::from(self.minutes) / 60
    }

    pub fn minute(self) -> u32 {
        u32::from(self.minutes) % 60
    }

    pub fn minutes_since_midnight(self) -> u32 {
        u32::from(self.minutes)
    }

    pub fn to_naive_time(self) -> NaiveTime {
        // hour/minute are range-checked on construction
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }

    /// Truncates seconds and below.
    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self {
            minutes: (time.hour() * 60 + time.minute()) as u16,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Result of adding a service duration to a start time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivedEndTime {
    /// End time on the 24-hour clock.
    pub end: TimeOfDay,
    /// True when the end falls on a later day than the start.
    pub crosses_midnight: bool,
}

/// Computes `start + duration_minutes`, wrapping hours modulo 24.
pub fn derive_end_time(start: TimeOfDay, duration_minutes: u32) -> DerivedEndTime {
    let total = u64::from(start.minutes_since_midnight()) + u64::from(duration_minutes);
    let hours = (total / 60) % 24;
    let minutes = total % 60;

    DerivedEndTime {
        end: TimeOfDay {
            minutes: (hours * 60 + minutes) as u16,
        },
        crosses_midnight: total >= u64::from(MINUTES_PER_DAY),
    }
}

/// Combines a local date and time in the clinic offset into a UTC instant.
pub fn combine(
    date: NaiveDate,
    time: TimeOfDay,
    offset: FixedOffset,
) -> BookingResult<DateTime<Utc>> {
    let local = date.and_time(time.to_naive_time());
    offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| BookingError::InvalidInput(format!("unrepresentable local time: {local}")))
}

/// Splits a UTC instant into the clinic-local date and time of day.
pub fn split(instant: DateTime<Utc>, offset: FixedOffset) -> (NaiveDate, TimeOfDay) {
    let local = instant.with_timezone(&offset);
    (
        local.date_naive(),
        TimeOfDay::from_naive_time(local.time()),
    )
}
