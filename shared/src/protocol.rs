/// Dashboard page route
pub const DASHBOARD_PATH: &str = "/";

/// JSON status API route
pub const API_SERVICES_PATH: &str = "/api/services";

/// Liveness route for the dashboard itself
pub const HEALTH_PATH: &str = "/health";

/// Host dialled when a service entry does not name one
pub const DEFAULT_PROBE_HOST: &str = "localhost";

/// Per-probe timeout used when configuration does not override it
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3000;
