use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;

/// Check whether a TCP connection to `target` can be established within `timeout`.
///
/// Refused connections, unreachable hosts, resolver failures and timeouts all
/// collapse to `false`. Name resolution counts against the same timeout. The
/// connection is dropped as soon as it is established; no bytes are exchanged.
pub async fn probe(target: String, timeout: Duration) -> bool {
    connect_within(&target, timeout, TcpStream::connect(target.as_str())).await
}

/// Drive `connect` for at most `timeout`; `true` only if it resolved to `Ok`.
async fn connect_within<C, T>(target: &str, timeout: Duration, connect: C) -> bool
where
    C: Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(stream)) => {
            drop(stream);
            true
        }
        Ok(Err(e)) => {
            tracing::debug!("Probe of {} failed: {}", target, e);
            false
        }
        Err(_) => {
            tracing::debug!("Probe of {} timed out after {:?}", target, timeout);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::net::TcpListener;

    /// Reserve a loopback port and release it so nothing is listening on it.
    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    #[tokio::test]
    async fn test_probe_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        assert!(probe(addr.to_string(), Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        let port = closed_port().await;

        assert!(!probe(format!("127.0.0.1:{}", port), Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_probe_unresolvable_host() {
        let target = "does-not-exist.invalid:80".to_string();

        assert!(!probe(target, Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn test_stalled_connect_gives_up_at_timeout() {
        let timeout = Duration::from_millis(100);
        let start = Instant::now();

        let online = connect_within(
            "stalled:9",
            timeout,
            std::future::pending::<io::Result<()>>(),
        )
        .await;
        let elapsed = start.elapsed();

        assert!(!online);
        assert!(elapsed >= timeout, "Gave up early after {:?}", elapsed);
        assert!(
            elapsed < timeout + Duration::from_millis(400),
            "Should give up near the timeout, took {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_connect_error_is_offline() {
        let refused = std::future::ready(Err::<(), _>(io::Error::from(io::ErrorKind::ConnectionRefused)));

        assert!(!connect_within("refused:9", Duration::from_secs(1), refused).await);
    }

    #[tokio::test]
    #[ignore = "needs a network that drops traffic to 10.255.255.1"]
    async fn test_unroutable_address_is_bounded_by_timeout() {
        // Non-routable address: the SYN goes nowhere, so only the timeout ends the attempt.
        let timeout = Duration::from_millis(100);
        let start = Instant::now();

        let online = probe("10.255.255.1:9".to_string(), timeout).await;

        assert!(!online);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
