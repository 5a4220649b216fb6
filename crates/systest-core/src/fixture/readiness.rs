//! Waiting for the target service to report ready

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{info, warn};

use super::error::{FixtureError, FixtureResult};
use super::settings::ReadinessSettings;

/// Checks whether the target is ready
pub trait ReadinessProbe: Send + Sync {
    /// `Ok(true)` if `url` reports ready within `timeout`
    ///
    /// Errors are treated like a not-ready answer by the poller.
    fn check(&self, url: &str, timeout: Duration) -> FixtureResult<bool>;
}

/// Blocks the calling thread between probe attempts
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeper backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Probe that expects HTTP 200 from a GET request
///
/// TLS certificate validation is relaxed; test targets commonly use
/// self-signed certificates.
#[derive(Debug, Clone)]
pub struct HttpReadinessProbe {
    client: Client,
}

impl HttpReadinessProbe {
    /// Create a probe with its own client
    pub fn new() -> FixtureResult<Self> {
        let client = Client::builder().danger_accept_invalid_certs(true).build()?;
        Ok(Self { client })
    }

    /// Create a probe sharing an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl ReadinessProbe for HttpReadinessProbe {
    fn check(&self, url: &str, timeout: Duration) -> FixtureResult<bool> {
        let mut request = self.client.get(url);
        // Zero means no per-attempt limit beyond the client's own
        if !timeout.is_zero() {
            request = request.timeout(timeout);
        }
        let response = request.send()?;
        Ok(response.status() == StatusCode::OK)
    }
}

/// Join a base route and a relative probe path with exactly one slash
pub fn probe_url(route: &str, path: &str) -> String {
    format!("{}/{}", route.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Poll the readiness probe until it succeeds or the threshold is used up
///
/// Sleeps `initial_delay` first (if non-zero), then probes up to
/// `failure_threshold` times with `period` between failed attempts.
/// Returns the number of attempts made; `0` when the probe is skipped.
pub fn wait_for_readiness(
    settings: &ReadinessSettings,
    route: &str,
    probe: &dyn ReadinessProbe,
    sleeper: &dyn Sleeper,
) -> FixtureResult<u32> {
    if settings.skip {
        warn!(route, "assuming application to be ready without checking readiness probe");
        return Ok(0);
    }

    let url = probe_url(route, &settings.path);
    info!(url = %url, "waiting for application readiness probe");

    if !settings.initial_delay.is_zero() {
        info!(delay = ?settings.initial_delay, url = %url, "sleeping before first readiness check");
        sleeper.sleep(settings.initial_delay);
    }

    for attempt in 1..=settings.failure_threshold {
        match probe.check(&url, settings.timeout) {
            Ok(true) => {
                info!(url = %url, attempt, "readiness probe reported UP");
                return Ok(attempt);
            }
            Ok(false) => info!(url = %url, attempt, "readiness probe not ready yet"),
            Err(err) => info!(
                url = %url,
                attempt,
                error = %err,
                "checking readiness probe failed (assuming application is still booting)"
            ),
        }

        if attempt < settings.failure_threshold {
            info!(period = ?settings.period, url = %url, "sleeping before next readiness check");
            sleeper.sleep(settings.period);
        }
    }

    Err(FixtureError::ReadinessFailed {
        url,
        attempts: settings.failure_threshold,
    })
}
