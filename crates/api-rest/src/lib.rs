//! # API REST
//!
//! REST API implementation for the clinic booking service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialisation, CORS, status codes)
//!
//! Every non-success response carries a `{"error": "..."}` body so clients can show the
//! server's message directly.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{pb, HealthService};
use clinic_core::{AppointmentService, BookingError, BookingResult, ClinicConfig, Directory};

type ApiError = (StatusCode, Json<pb::ErrorRes>);

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    appointments: AppointmentService,
}

impl AppState {
    /// Builds state from configuration, loading the directory seed file if one is set.
    pub fn new(cfg: &ClinicConfig) -> BookingResult<Self> {
        let directory = match cfg.seed_file() {
            Some(path) => Directory::load(path)?,
            None => {
                tracing::warn!("no CLINIC_SEED_FILE configured; directory is open");
                Directory::open()
            }
        };
        Ok(Self::with_directory(cfg, directory))
    }

    /// Builds state around an already loaded directory.
    pub fn with_directory(cfg: &ClinicConfig, directory: Directory) -> Self {
        Self {
            appointments: AppointmentService::new(Arc::new(directory), cfg.utc_offset()),
        }
    }
}

/// Query string of `GET /api/appointments`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentFilter {
    /// Only return appointments currently in this status.
    pub status: Option<pb::AppointmentStatus>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        list_staff,
        list_services,
        list_appointments,
        get_appointment,
        create_appointment,
        update_appointment,
    ),
    components(schemas(
        pb::HealthRes,
        pb::ErrorRes,
        pb::Patient,
        pb::StaffRole,
        pb::StaffMember,
        pb::Service,
        pb::AppointmentStatus,
        pb::AppointmentReq,
        pb::AppointmentRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full router: API routes, Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/patients", get(list_patients))
        .route("/api/admin/staff", get(list_staff))
        .route("/api/services", get(list_services))
        .route(
            "/api/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route(
            "/api/appointments/:id",
            get(get_appointment).put(update_appointment),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Maps a core error onto an HTTP status and JSON error body.
fn error_response(err: BookingError) -> ApiError {
    let status = match &err {
        BookingError::Validation(_)
        | BookingError::Status(_)
        | BookingError::UnknownReference { .. }
        | BookingError::NotADoctor(_)
        | BookingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        BookingError::NotFound(_) => StatusCode::NOT_FOUND,
        BookingError::FileRead(_)
        | BookingError::YamlDeserialization(_)
        | BookingError::StorePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Appointment store error: {:?}", err);
        return (status, Json(pb::ErrorRes::new("Internal error")));
    }

    tracing::warn!("Rejected request ({}): {}", status.as_u16(), err);
    (status, Json(pb::ErrorRes::new(err.to_string())))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = pb::HealthRes)
    )
)]
/// Health check endpoint used by monitoring and load balancers.
#[axum::debug_handler]
async fn health() -> Json<pb::HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/patients",
    responses(
        (status = 200, description = "Patients available for booking", body = [pb::Patient])
    )
)]
#[axum::debug_handler]
async fn list_patients(State(state): State<AppState>) -> Json<Vec<pb::Patient>> {
    Json(state.appointments.directory().patients().to_vec())
}

#[utoipa::path(
    get,
    path = "/api/admin/staff",
    responses(
        (status = 200, description = "Clinic staff", body = [pb::StaffMember])
    )
)]
#[axum::debug_handler]
async fn list_staff(State(state): State<AppState>) -> Json<Vec<pb::StaffMember>> {
    Json(state.appointments.directory().staff().to_vec())
}

#[utoipa::path(
    get,
    path = "/api/services",
    responses(
        (status = 200, description = "Bookable services with durations", body = [pb::Service])
    )
)]
#[axum::debug_handler]
async fn list_services(State(state): State<AppState>) -> Json<Vec<pb::Service>> {
    Json(state.appointments.directory().services().to_vec())
}

#[utoipa::path(
    get,
    path = "/api/appointments",
    params(AppointmentFilter),
    responses(
        (status = 200, description = "Appointments, earliest first", body = [pb::AppointmentRes]),
        (status = 400, description = "Unknown status filter"),
        (status = 500, description = "Internal server error", body = pb::ErrorRes)
    )
)]
#[axum::debug_handler]
async fn list_appointments(
    State(state): State<AppState>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Vec<pb::AppointmentRes>>, ApiError> {
    let appointments = match filter.status {
        Some(status) => state.appointments.list_by_status(status),
        None => state.appointments.list(),
    };
    appointments.map(Json).map_err(error_response)
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment", body = pb::AppointmentRes),
        (status = 404, description = "Unknown appointment", body = pb::ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<pb::AppointmentRes>, ApiError> {
    state
        .appointments
        .get(&id)
        .map(Json)
        .map_err(error_response)
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = pb::AppointmentReq,
    responses(
        (status = 201, description = "Appointment created", body = pb::AppointmentRes),
        (status = 400, description = "Validation failed", body = pb::ErrorRes),
        (status = 500, description = "Internal server error", body = pb::ErrorRes)
    )
)]
/// Book a new appointment.
///
/// The body is re-validated: end after start, notes within bounds, status SCHEDULED or
/// CONFIRMED, and references known to the directory.
#[axum::debug_handler]
async fn create_appointment(
    State(state): State<AppState>,
    Json(req): Json<pb::AppointmentReq>,
) -> Result<(StatusCode, Json<pb::AppointmentRes>), ApiError> {
    state
        .appointments
        .create(req)
        .map(|record| (StatusCode::CREATED, Json(record)))
        .map_err(error_response)
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    request_body = pb::AppointmentReq,
    responses(
        (status = 200, description = "Appointment updated", body = pb::AppointmentRes),
        (status = 400, description = "Validation failed or illegal status change", body = pb::ErrorRes),
        (status = 404, description = "Unknown appointment", body = pb::ErrorRes),
        (status = 500, description = "Internal server error", body = pb::ErrorRes)
    )
)]
/// Edit an appointment or apply a staff status change.
#[axum::debug_handler]
async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<pb::AppointmentReq>,
) -> Result<Json<pb::AppointmentRes>, ApiError> {
    state
        .appointments
        .update(&id, req)
        .map(Json)
        .map_err(error_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use chrono::{TimeZone, Utc};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const SEED: &str = r#"
patients:
  - { id: pat_1, firstName: Ada, lastName: Lovelace }
staff:
  - { id: doc_1, name: Dr Grace Hopper, role: DOCTOR }
  - { id: adm_1, name: Admin, role: ADMIN }
services:
  - { id: svc_1, name: Consultation, durationMinutes: 30, price: 60.0 }
"#;

    fn test_app() -> Router {
        let directory = Directory::from_yaml(SEED).expect("seed should parse");
        router(AppState::with_directory(&ClinicConfig::default(), directory))
    }

    fn booking(status: pb::AppointmentStatus) -> pb::AppointmentReq {
        pb::AppointmentReq {
            patient_id: "pat_1".into(),
            doctor_id: "doc_1".into(),
            service_id: Some("svc_1".into()),
            start_time: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap(),
            notes: String::new(),
            status,
        }
    }

    fn json_request(method: Method, uri: &str, body: &pb::AppointmentReq) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let req = Request::get("/health").body(Body::empty()).unwrap();
        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let health: pb::HealthRes = body_json(response).await;
        assert!(health.ok);
    }

    #[tokio::test]
    async fn test_directory_lists_are_served() {
        let app = test_app();

        let req = Request::get("/api/admin/staff").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        let staff: Vec<pb::StaffMember> = body_json(response).await;
        assert_eq!(staff.len(), 2);

        let req = Request::get("/api/services").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        let services: Vec<pb::Service> = body_json(response).await;
        assert_eq!(services[0].duration_minutes, 30);
    }

    #[tokio::test]
    async fn test_create_returns_created_record() {
        let req = json_request(
            Method::POST,
            "/api/appointments",
            &booking(pb::AppointmentStatus::Scheduled),
        );
        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let record: pb::AppointmentRes = body_json(response).await;
        assert_eq!(record.patient_id, "pat_1");
        assert_eq!(record.status, pb::AppointmentStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_window_with_error_body() {
        let mut body = booking(pb::AppointmentStatus::Scheduled);
        std::mem::swap(&mut body.start_time, &mut body.end_time);

        let req = json_request(Method::POST, "/api/appointments", &body);
        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: pb::ErrorRes = body_json(response).await;
        assert_eq!(error.error, "endTime: End time must be after start time");
    }

    #[tokio::test]
    async fn test_create_rejects_non_doctor() {
        let mut body = booking(pb::AppointmentStatus::Scheduled);
        body.doctor_id = "adm_1".into();

        let req = json_request(Method::POST, "/api/appointments", &body);
        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: pb::ErrorRes = body_json(response).await;
        assert!(error.error.contains("not a doctor"));
    }

    #[tokio::test]
    async fn test_update_applies_transition_and_rejects_illegal_one() {
        let app = test_app();

        let req = json_request(
            Method::POST,
            "/api/appointments",
            &booking(pb::AppointmentStatus::Scheduled),
        );
        let response = app.clone().oneshot(req).await.unwrap();
        let created: pb::AppointmentRes = body_json(response).await;
        let uri = format!("/api/appointments/{}", created.id);

        let cancel = created.to_request(pb::AppointmentStatus::Cancelled);
        let req = json_request(Method::PUT, &uri, &cancel);
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cancelled: pb::AppointmentRes = body_json(response).await;
        assert_eq!(cancelled.status, pb::AppointmentStatus::Cancelled);

        let reopen = cancelled.to_request(pb::AppointmentStatus::Confirmed);
        let req = json_request(Method::PUT, &uri, &reopen);
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: pb::ErrorRes = body_json(response).await;
        assert_eq!(
            error.error,
            "cannot change appointment status from CANCELLED to CONFIRMED"
        );
    }

    #[tokio::test]
    async fn test_unknown_appointment_is_404() {
        let req = Request::get("/api/appointments/nope").body(Body::empty()).unwrap();
        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let error: pb::ErrorRes = body_json(response).await;
        assert_eq!(error.error, "appointment not found: nope");
    }

    #[tokio::test]
    async fn test_create_rejects_overnight_window() {
        let mut body = booking(pb::AppointmentStatus::Scheduled);
        body.start_time = Utc.with_ymd_and_hms(2026, 3, 2, 23, 0, 0).unwrap();
        body.end_time = Utc.with_ymd_and_hms(2026, 3, 3, 1, 0, 0).unwrap();

        let req = json_request(Method::POST, "/api/appointments", &body);
        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: pb::ErrorRes = body_json(response).await;
        assert_eq!(
            error.error,
            "endTime: Appointment must end on the same day it starts"
        );
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let app = test_app();
        for status in [
            pb::AppointmentStatus::Scheduled,
            pb::AppointmentStatus::Confirmed,
        ] {
            let req = json_request(Method::POST, "/api/appointments", &booking(status));
            let response = app.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let req = Request::get("/api/appointments?status=CONFIRMED")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        let confirmed: Vec<pb::AppointmentRes> = body_json(response).await;
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].status, pb::AppointmentStatus::Confirmed);

        let req = Request::get("/api/appointments").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        let all: Vec<pb::AppointmentRes> = body_json(response).await;
        assert_eq!(all.len(), 2);
    }
}
