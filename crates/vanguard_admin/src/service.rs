//! The shared backend handle.
//!
//! Built once at startup and cloned into every screen. Connectivity is
//! checked by an explicit, awaited [`ServiceHandle::check_connection`]
//! call; constructing the handle never touches the network.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::backend::Backend;
use crate::config::BackendConfig;
use crate::error::AdminResult;
use crate::rest::RestBackend;

const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a connection diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionReport {
    /// The backend answered the ping.
    pub reachable: bool,
    /// Round trip time, or time until giving up.
    pub latency: Duration,
    /// Why the check failed, if it did.
    pub error: Option<String>,
}

/// Cheaply clonable handle to one backend instance.
#[derive(Debug)]
pub struct ServiceHandle<B> {
    backend: Arc<B>,
    check_timeout: Duration,
}

impl<B> Clone for ServiceHandle<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            check_timeout: self.check_timeout,
        }
    }
}

impl ServiceHandle<RestBackend> {
    /// Builds the handle for the hosted backend.
    ///
    /// # Errors
    /// Returns [`AdminError::Config`](crate::AdminError::Config) if the
    /// client can't be built from `config`.
    pub fn connect(config: &BackendConfig) -> AdminResult<Self> {
        let backend = RestBackend::new(config)?;
        tracing::info!(url = %config.url, bucket = %config.media_bucket, "backend handle initialized");
        Ok(Self {
            backend: Arc::new(backend),
            check_timeout: config.timeout(),
        })
    }
}

impl<B> ServiceHandle<B> {
    /// Wraps an existing backend.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            check_timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }

    /// Overrides how long [`ServiceHandle::check_connection`] waits.
    #[must_use]
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    /// The backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: Backend> ServiceHandle<B> {
    /// Pings the backend and reports reachability and latency.
    ///
    /// Never fails: problems are reported in the returned value.
    pub async fn check_connection(&self) -> ConnectionReport {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.check_timeout, self.backend.ping()).await;
        let latency = started.elapsed();

        let error = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some(format!("no answer within {:?}", self.check_timeout)),
        };

        match &error {
            None => tracing::info!(
                latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                "backend reachable"
            ),
            Some(reason) => tracing::warn!(%reason, "backend unreachable"),
        }

        ConnectionReport {
            reachable: error.is_none(),
            latency,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    #[tokio::test]
    async fn test_reachable_backend() {
        let service = ServiceHandle::new(MemoryBackend::new());
        let report = service.check_connection().await;
        assert!(report.reachable);
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend_reports_reason() {
        let service = ServiceHandle::new(MemoryBackend::new());
        service.backend().set_offline(true);
        let report = service.check_connection().await;
        assert!(!report.reachable);
        assert!(report.error.unwrap().contains("offline"));
    }

    #[tokio::test]
    async fn test_clones_share_backend() {
        let service = ServiceHandle::new(MemoryBackend::new());
        let clone = service.clone();
        clone.backend().set_offline(true);
        assert!(!service.check_connection().await.reachable);
    }

    #[test]
    fn test_connect_does_not_touch_network() {
        let config = BackendConfig::new("https://unreachable.invalid", "key").unwrap();
        assert!(ServiceHandle::connect(&config).is_ok());
    }
}
