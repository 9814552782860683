//! # Clinic Client
//!
//! HTTP client for the clinic booking API.
//!
//! [`AppointmentClient::submit`] is the submission path of the booking form:
//! 1. validate the form locally; failures never reach the network
//! 2. combine date and times into UTC instants and build the JSON body
//! 3. issue exactly one `POST /api/appointments` (new) or `PUT /api/appointments/{id}` (edit)
//! 4. on failure, surface the server's message; on success reset the form and hand the
//!    persisted record to the caller's completion callback
//!
//! There are no retries, no backoff and no idempotency keys. Every failure is final for that
//! attempt.

#![warn(rust_2018_idioms)]

mod config;
mod error;

pub use config::ClientConfig;
pub use error::{extract_error_message, ClientError, ClientResult};

use api_shared::pb;
use chrono::FixedOffset;
use clinic_core::{validate, AppointmentForm, AppointmentStatus};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

pub struct AppointmentClient {
    base_url: String,
    http: reqwest::Client,
    timeout_secs: u64,
    utc_offset: FixedOffset,
}

impl AppointmentClient {
    /// Creates a client for the API at `config.base_url()`.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url().trim_end_matches('/').to_string(),
            http,
            timeout_secs: config.timeout().as_secs(),
            utc_offset: config.utc_offset(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Offset used when turning form dates and times into instants.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// Validates and sends a booking form.
    ///
    /// Creates when the form is new and updates when it was loaded from an existing
    /// appointment. On success the form is reset before `on_complete` runs.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] if the form is invalid; no request is made
    /// - [`ClientError::Server`] with the server's message for a non-success response
    /// - transport and parsing errors otherwise
    pub async fn submit<F>(
        &self,
        form: &mut AppointmentForm,
        on_complete: F,
    ) -> ClientResult<pb::AppointmentRes>
    where
        F: FnOnce(&pb::AppointmentRes),
    {
        let validated = validate(form).map_err(ClientError::Validation)?;
        let req = validated.to_request(self.utc_offset)?;

        let record = match validated.appointment_id.as_deref() {
            Some(id) => self.update(id, &req).await?,
            None => self.create(&req).await?,
        };

        form.reset();
        on_complete(&record);
        Ok(record)
    }

    /// Applies a staff status change through the update endpoint.
    ///
    /// The transition is checked locally first so an illegal change never leaves the client.
    pub async fn transition(
        &self,
        record: &pb::AppointmentRes,
        next: AppointmentStatus,
    ) -> ClientResult<pb::AppointmentRes> {
        record.status.transition(next)?;
        self.update(&record.id, &record.to_request(next)).await
    }

    pub async fn create(&self, req: &pb::AppointmentReq) -> ClientResult<pb::AppointmentRes> {
        let url = format!("{}/api/appointments", self.base_url);
        tracing::debug!("POST {}", url);
        self.send_json(self.http.post(&url).json(req)).await
    }

    pub async fn update(
        &self,
        id: &str,
        req: &pb::AppointmentReq,
    ) -> ClientResult<pb::AppointmentRes> {
        let url = format!("{}/api/appointments/{}", self.base_url, id);
        tracing::debug!("PUT {}", url);
        self.send_json(self.http.put(&url).json(req)).await
    }

    pub async fn get_appointment(&self, id: &str) -> ClientResult<pb::AppointmentRes> {
        self.get(&format!("/api/appointments/{id}")).await
    }

    /// Lists appointments, optionally only those currently in `status`.
    pub async fn list_appointments(
        &self,
        status: Option<AppointmentStatus>,
    ) -> ClientResult<Vec<pb::AppointmentRes>> {
        match status {
            Some(status) => self.get(&format!("/api/appointments?status={status}")).await,
            None => self.get("/api/appointments").await,
        }
    }

    pub async fn list_patients(&self) -> ClientResult<Vec<pb::Patient>> {
        self.get("/api/patients").await
    }

    pub async fn list_staff(&self) -> ClientResult<Vec<pb::StaffMember>> {
        self.get("/api/admin/staff").await
    }

    pub async fn list_services(&self) -> ClientResult<Vec<pb::Service>> {
        self.get("/api/services").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);
        self.send_json(self.http.get(&url)).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ClientError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                ClientError::Timeout(self.timeout_secs)
            } else {
                ClientError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(status, &body);
            tracing::warn!("request failed ({}): {}", status.as_u16(), message);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ResponseParsing(e.to_string()))
    }
}
