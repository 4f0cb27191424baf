use std::collections::HashMap;
use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::classifier;

/// A monitored service as supplied by configuration.
/// The service name is the key in the surrounding [`ServiceSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Host to dial, e.g. "localhost"
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to probe
    pub port: u16,

    /// URL shown on the dashboard, e.g. "http://localhost:3000"
    pub url: String,
}

fn default_host() -> String {
    crate::protocol::DEFAULT_PROBE_HOST.to_string()
}

impl ServiceEndpoint {
    pub fn new(host: impl Into<String>, port: u16, url: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            url: url.into(),
        }
    }

    /// `host:port` string handed to the TCP dialer
    pub fn dial_target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Service name -> endpoint. Iteration order carries no meaning.
pub type ServiceSet = HashMap<String, ServiceEndpoint>;

/// Per-service reachability label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Availability {
    Online,
    Offline,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Online => "Online",
            Availability::Offline => "Offline",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of probing one service during a single aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub name: String,
    pub url: String,
    pub status: Availability,
    pub online: bool,
}

impl ServiceStatus {
    pub fn new(name: impl Into<String>, url: impl Into<String>, online: bool) -> Self {
        let status = if online {
            Availability::Online
        } else {
            Availability::Offline
        };

        Self {
            name: name.into(),
            url: url.into(),
            status,
            online,
        }
    }
}

/// Coarse health label for the whole service set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperationalStatus {
    Operational,
    Limited,
    Critical,
}

impl OperationalStatus {
    /// `online == total` wins first, so an empty set reports Operational.
    pub fn from_counts(online: usize, total: usize) -> Self {
        if online == total {
            OperationalStatus::Operational
        } else if online == 0 {
            OperationalStatus::Critical
        } else {
            OperationalStatus::Limited
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationalStatus::Operational => "Operational",
            OperationalStatus::Limited => "Limited",
            OperationalStatus::Critical => "Critical",
        }
    }
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One complete aggregation result.
///
/// Built only through [`Snapshot::new`], which sorts the services by name and
/// derives the counts, so a snapshot always satisfies
/// `online_count + offline_count == services.len()`.
#[derive(Debug, Clone)]
pub struct Snapshot {
    services: Vec<ServiceStatus>,
    online_count: usize,
    offline_count: usize,
    operational_status: OperationalStatus,
    generated_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(mut services: Vec<ServiceStatus>, generated_at: DateTime<Utc>) -> Self {
        services.sort_by(|a, b| a.name.cmp(&b.name));

        let online_count = services.iter().filter(|s| s.online).count();
        let offline_count = services.len() - online_count;
        let operational_status = classifier::classify(&services);

        Self {
            services,
            online_count,
            offline_count,
            operational_status,
            generated_at,
        }
    }

    /// Services sorted ascending by name
    pub fn services(&self) -> &[ServiceStatus] {
        &self.services
    }

    pub fn online_count(&self) -> usize {
        self.online_count
    }

    pub fn offline_count(&self) -> usize {
        self.offline_count
    }

    pub fn operational_status(&self) -> OperationalStatus {
        self.operational_status
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}
