//! Client configuration.
//!
//! Like the server configuration, values come in as raw `Option<String>`s read by the binary,
//! so nothing here touches the process environment.

use crate::{ClientError, ClientResult};
use chrono::FixedOffset;
use clinic_core::config::utc_offset_from_env_value;
use clinic_core::constants::{DEFAULT_API_URL, DEFAULT_HTTP_TIMEOUT_SECS};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
    utc_offset: FixedOffset,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration, utc_offset: FixedOffset) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            utc_offset,
        }
    }

    /// Resolves `CLINIC_API_URL`, `CLINIC_HTTP_TIMEOUT_SECS` and `CLINIC_UTC_OFFSET` values.
    pub fn from_env_values(
        base_url: Option<String>,
        timeout_secs: Option<String>,
        utc_offset: Option<String>,
    ) -> ClientResult<Self> {
        let base_url = base_url
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "CLINIC_API_URL must start with http:// or https://, got: '{base_url}'"
            )));
        }

        let timeout_secs = match timeout_secs.map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => v.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                ClientError::Config(format!(
                    "CLINIC_HTTP_TIMEOUT_SECS must be a positive integer, got: '{v}'"
                ))
            })?,
            _ => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self::new(
            base_url,
            Duration::from_secs(timeout_secs),
            utc_offset_from_env_value(utc_offset)?,
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }
}
