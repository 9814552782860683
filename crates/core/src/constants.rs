//! Constants used throughout the clinic core crate.

/// Maximum length of appointment notes, counted in characters.
pub const NOTES_MAX_CHARS: usize = 500;

/// Minutes in a 24-hour day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Format of the date field of a booking form.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default REST listen address when `CLINIC_REST_ADDR` is not set.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default base URL used by clients when `CLINIC_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Default client request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Status pre-selected on a fresh booking form.
pub const DEFAULT_FORM_STATUS: &str = "SCHEDULED";
