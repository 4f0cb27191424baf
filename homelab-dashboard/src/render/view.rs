use chrono::Local;
use shared::types::{OperationalStatus, ServiceStatus, Snapshot};

/// Everything the dashboard template can reference.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub title: String,
    pub services: Vec<ServiceStatus>,
    pub online_count: usize,
    pub offline_count: usize,
    pub operational_status: OperationalStatus,
    /// Wall-clock time of the snapshot, `HH:MM:SS` in local time
    pub last_updated: String,
}

impl DashboardView {
    pub fn new(title: impl Into<String>, snapshot: &Snapshot) -> Self {
        Self {
            title: title.into(),
            services: snapshot.services().to_vec(),
            online_count: snapshot.online_count(),
            offline_count: snapshot.offline_count(),
            operational_status: snapshot.operational_status(),
            last_updated: snapshot
                .generated_at()
                .with_timezone(&Local)
                .format("%H:%M:%S")
                .to_string(),
        }
    }

    /// Top-level template field
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "title" => self.title.clone(),
            "online_count" => self.online_count.to_string(),
            "offline_count" => self.offline_count.to_string(),
            "total_count" => self.services.len().to_string(),
            "operational_status" => self.operational_status.to_string(),
            "operational_class" => self.operational_status.as_str().to_lowercase(),
            "last_updated" => self.last_updated.clone(),
            _ => return None,
        };
        Some(value)
    }
}

/// Field available inside a `{{#services}}` section
pub fn service_field(service: &ServiceStatus, name: &str) -> Option<String> {
    let value = match name {
        "name" => service.name.clone(),
        "url" => service.url.clone(),
        "status" => service.status.to_string(),
        "online" => service.online.to_string(),
        "status_class" => service.status.as_str().to_lowercase(),
        _ => return None,
    };
    Some(value)
}
