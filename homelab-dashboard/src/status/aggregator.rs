use std::future::Future;
use std::time::Duration;
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use shared::types::{ServiceSet, ServiceStatus, Snapshot};
use crate::status::prober;

/// Probe every service concurrently and assemble a snapshot.
///
/// Returns only once every probe has finished, so the call takes roughly
/// `timeout` in the worst case regardless of how many services are configured.
pub async fn aggregate(services: &ServiceSet, timeout: Duration) -> Snapshot {
    aggregate_with(services, timeout, prober::probe).await
}

/// Same as [`aggregate`] with a caller-supplied probe function.
pub async fn aggregate_with<F, Fut>(services: &ServiceSet, timeout: Duration, probe: F) -> Snapshot
where
    F: Fn(String, Duration) -> Fut,
    Fut: Future<Output = bool> + Send + 'static,
{
    // Fan out: one task per service, each owning its own socket and result.
    let mut pending: FuturesUnordered<_> = services
        .iter()
        .map(|(name, endpoint)| {
            let handle = tokio::spawn(probe(endpoint.dial_target(), timeout));
            let name = name.clone();
            let url = endpoint.url.clone();

            async move {
                let online = match handle.await {
                    Ok(online) => online,
                    Err(e) => {
                        tracing::error!("Probe task for {} failed: {}", name, e);
                        false
                    }
                };
                ServiceStatus::new(name, url, online)
            }
        })
        .collect();

    // Fan in: completion order is irrelevant, the snapshot sorts by name.
    let mut statuses = Vec::with_capacity(services.len());
    while let Some(status) = pending.next().await {
        statuses.push(status);
    }

    let snapshot = Snapshot::new(statuses, Utc::now());

    tracing::debug!(
        "Aggregated {} services: {} online, {} offline ({})",
        snapshot.services().len(),
        snapshot.online_count(),
        snapshot.offline_count(),
        snapshot.operational_status()
    );

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Instant;
    use shared::types::{OperationalStatus, ServiceEndpoint};
    use tokio::net::TcpListener;

    fn endpoint(port: u16) -> ServiceEndpoint {
        ServiceEndpoint::new("127.0.0.1", port, format!("http://localhost:{}", port))
    }

    fn service_set(ports: &[(&str, u16)]) -> ServiceSet {
        ports
            .iter()
            .map(|(name, port)| (name.to_string(), endpoint(*port)))
            .collect()
    }

    /// Probe stub: services whose port is in `up` are online.
    fn scripted(up: HashSet<u16>) -> impl Fn(String, Duration) -> futures::future::Ready<bool> {
        move |target: String, _timeout: Duration| {
            let port: u16 = target.rsplit(':').next().unwrap().parse().unwrap();
            futures::future::ready(up.contains(&port))
        }
    }

    #[tokio::test]
    async fn test_aggregate_listener_up_and_down() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let up_port = listener.local_addr().unwrap().port();
        let down_port = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap().port()
        };

        let services = service_set(&[("B", down_port), ("A", up_port)]);
        let snapshot = aggregate(&services, Duration::from_secs(1)).await;

        let services = snapshot.services();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].name, "A");
        assert!(services[0].online);
        assert_eq!(services[1].name, "B");
        assert!(!services[1].online);
        assert_eq!(snapshot.online_count(), 1);
        assert_eq!(snapshot.offline_count(), 1);
        assert_eq!(snapshot.operational_status(), OperationalStatus::Limited);
    }

    #[tokio::test]
    async fn test_aggregate_empty_set() {
        let snapshot = aggregate(&ServiceSet::new(), Duration::from_secs(1)).await;

        assert!(snapshot.services().is_empty());
        assert_eq!(snapshot.online_count(), 0);
        assert_eq!(snapshot.offline_count(), 0);
        assert_eq!(snapshot.operational_status(), OperationalStatus::Operational);
    }

    #[tokio::test]
    async fn test_aggregate_all_online() {
        let services = service_set(&[("Grafana", 3000), ("Portainer", 9000), ("Pi-hole", 8082)]);
        let up = HashSet::from([3000, 9000, 8082]);

        let snapshot = aggregate_with(&services, Duration::from_secs(1), scripted(up)).await;

        assert_eq!(snapshot.offline_count(), 0);
        assert_eq!(snapshot.operational_status(), OperationalStatus::Operational);
    }

    #[tokio::test]
    async fn test_aggregate_all_offline() {
        let services = service_set(&[("Grafana", 3000), ("Portainer", 9000)]);

        let snapshot = aggregate_with(&services, Duration::from_secs(1), scripted(HashSet::new())).await;

        assert_eq!(snapshot.online_count(), 0);
        assert_eq!(snapshot.offline_count(), 2);
        assert_eq!(snapshot.operational_status(), OperationalStatus::Critical);
    }

    #[tokio::test]
    async fn test_aggregate_sorted_and_complete() {
        let names = ["zeta", "Alpha", "mike", "Bravo", "echo", "alpha", "Zulu", "0-first"];
        let services: ServiceSet = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), endpoint(10000 + i as u16)))
            .collect();
        let up: HashSet<u16> = (10000..10004).collect();

        let snapshot = aggregate_with(&services, Duration::from_secs(1), scripted(up)).await;

        assert_eq!(snapshot.services().len(), names.len());
        assert!(snapshot
            .services()
            .windows(2)
            .all(|pair| pair[0].name < pair[1].name));
        assert_eq!(
            snapshot.online_count() + snapshot.offline_count(),
            snapshot.services().len()
        );
        assert_eq!(snapshot.online_count(), 4);
    }

    #[tokio::test]
    async fn test_aggregate_runs_probes_in_parallel() {
        let services: ServiceSet = (0..10u16)
            .map(|i| (format!("svc-{}", i), endpoint(20000 + i)))
            .collect();
        let delay = Duration::from_millis(300);

        let start = Instant::now();
        let snapshot = aggregate_with(&services, delay, move |target: String, timeout: Duration| async move {
            // One probe sits near the timeout ceiling; the rest sleep a little.
            if target.ends_with(":20007") {
                tokio::time::sleep(timeout).await;
                false
            } else {
                tokio::time::sleep(Duration::from_millis(200)).await;
                true
            }
        })
        .await;
        let elapsed = start.elapsed();

        assert_eq!(snapshot.services().len(), 10);
        assert_eq!(snapshot.offline_count(), 1);
        assert!(
            elapsed < delay * 3,
            "Aggregation should take about one timeout, took {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_panicking_probe_counts_as_offline() {
        let services = service_set(&[("A", 1), ("B", 2)]);

        let snapshot = aggregate_with(&services, Duration::from_secs(1), |target: String, _: Duration| async move {
            if target.ends_with(":1") {
                panic!("probe blew up");
            }
            true
        })
        .await;

        assert_eq!(snapshot.services().len(), 2);
        assert!(!snapshot.services()[0].online);
        assert!(snapshot.services()[1].online);
        assert_eq!(snapshot.operational_status(), OperationalStatus::Limited);
    }
}
