use crate::pb::HealthRes;

/// Simple health service shared by the REST server and its clients.
pub struct HealthService;

impl HealthService {
    /// Reports the service as alive.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Clinic booking API is alive".into(),
        }
    }
}
