//! Routing backend access for butterfly-alt
//!
//! The synthesis engine only ever talks to a [`RoutingBackend`]. [`OsrmBackend`]
//! is the HTTP implementation for OSRM-compatible `/route/v1` services.

use std::future::Future;
use std::time::Duration;

use log::debug;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde_json::Value;

use crate::core::config::SynthesisConfig;
use crate::core::error::{Error, Result};
use crate::core::geo::Geopoint;
use crate::core::model::RouteResponse;

/// A service that computes turn-by-turn routes through ordered waypoints
pub trait RoutingBackend {
    /// Route through `waypoints`, in order.
    ///
    /// Transport failures and non-2xx answers are `BackendRequestFailed`;
    /// bodies that are not a usable route response are `MalformedBackendResponse`.
    fn route(&self, waypoints: &[Geopoint]) -> impl Future<Output = Result<RouteResponse>> + Send;
}

/// HTTP client for an OSRM-compatible backend
#[derive(Debug, Clone)]
pub struct OsrmBackend {
    client: Client,
    config: SynthesisConfig,
}

impl OsrmBackend {
    /// Create a backend client for `config.base_url` and `config.profile`
    pub fn new(config: &SynthesisConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .tcp_keepalive(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(32)
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(format!("butterfly-alt/{}", env!("BUTTERFLY_VERSION")))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }
}

impl RoutingBackend for OsrmBackend {
    async fn route(&self, waypoints: &[Geopoint]) -> Result<RouteResponse> {
        if waypoints.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "a route needs at least 2 waypoints, got {}",
                waypoints.len()
            )));
        }

        let url = self.config.route_url(waypoints);
        debug!("Requesting route: {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(describe_backend_error(status, &body));
        }

        let parsed: RouteResponse = serde_json::from_str(&body)?;
        parsed.validate()?;
        debug!("Backend returned {} route(s) for {url}", parsed.routes.len());
        Ok(parsed)
    }
}

/// Turn a non-2xx answer into a failure that carries the backend's own reason
fn describe_backend_error(status: StatusCode, body: &str) -> Error {
    let reason = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        let code = json.get("code")?.as_str()?.to_string();
        match json.get("message").and_then(Value::as_str) {
            Some(message) => Some(format!("{code}: {message}")),
            None => Some(code),
        }
    });

    match reason {
        Some(reason) => Error::BackendRequestFailed(format!("HTTP {status} ({reason})")),
        None => Error::BackendRequestFailed(format!("HTTP {status}")),
    }
}
