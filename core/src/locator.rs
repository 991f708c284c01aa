//! Backend base-URL resolution.
//!
//! # Design
//! Resolution order is: explicit override, then the first candidate whose
//! health endpoint answers 2xx within the probe timeout, then the profile's
//! hardcoded default. It never fails; a wrong guess shows up later as a
//! `Network` error on the first real request.
//!
//! The result is cached for the life of the locator. The cache lock is held
//! across probing so concurrent `resolve` calls never disagree.

use std::sync::Arc;

use reqwest::Url;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::client::HttpJsonClient;
use crate::config::BackendConfig;
use crate::http::{HttpMethod, HttpRequest, Transport};

/// Where a resolved base URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    ExplicitConfig,
    ProbedCandidate,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    pub base_url: String,
    pub source: ResolutionSource,
}

pub struct BackendLocator {
    config: BackendConfig,
    transport: Arc<dyn Transport>,
    resolved: Mutex<Option<BackendEndpoint>>,
}

impl BackendLocator {
    pub fn new(config: BackendConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            resolved: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Resolve once and reuse the answer on later calls.
    pub async fn resolve(&self) -> BackendEndpoint {
        let mut resolved = self.resolved.lock().await;
        if let Some(endpoint) = resolved.as_ref() {
            return endpoint.clone();
        }
        let endpoint = self.locate().await;
        info!(base_url = %endpoint.base_url, source = ?endpoint.source, "backend resolved");
        *resolved = Some(endpoint.clone());
        endpoint
    }

    /// Forget the cached endpoint and resolve again.
    pub async fn reresolve(&self) -> BackendEndpoint {
        self.resolved.lock().await.take();
        self.resolve().await
    }

    pub async fn current(&self) -> Option<BackendEndpoint> {
        self.resolved.lock().await.clone()
    }

    /// A JSON client aimed at the resolved backend, sharing this locator's
    /// transport.
    pub async fn client(&self) -> HttpJsonClient {
        let endpoint = self.resolve().await;
        HttpJsonClient::new(&endpoint.base_url, self.transport.clone())
    }

    /// One health probe against `base_url`. Errors and timeouts read as
    /// "not reachable".
    pub async fn test_connection(&self, base_url: &str) -> bool {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                self.config.health_path.trim_start_matches('/')
            ),
            headers: Vec::new(),
            body: None,
            timeout: Some(self.config.probe_timeout),
        };

        match tokio::time::timeout(self.config.probe_timeout, self.transport.execute(request)).await {
            Ok(Ok(response)) if response.is_success() => true,
            Ok(Ok(response)) => {
                warn!(base_url, status = response.status, "health check rejected");
                false
            }
            Ok(Err(e)) => {
                warn!(base_url, error = %e, "health check failed");
                false
            }
            Err(_) => {
                warn!(base_url, "health check timed out");
                false
            }
        }
    }

    async fn locate(&self) -> BackendEndpoint {
        if let Some(url) = &self.config.explicit_url {
            if is_valid_base_url(url) {
                return BackendEndpoint {
                    base_url: url.clone(),
                    source: ResolutionSource::ExplicitConfig,
                };
            }
            warn!(url = %url, "explicit backend URL is invalid, probing candidates");
        }

        for candidate in &self.config.candidates {
            if !is_valid_base_url(candidate) {
                warn!(candidate = %candidate, "skipping invalid candidate URL");
                continue;
            }
            if self.test_connection(candidate).await {
                return BackendEndpoint {
                    base_url: candidate.clone(),
                    source: ResolutionSource::ProbedCandidate,
                };
            }
        }

        warn!(default = %self.config.default_url, "no candidate reachable, using default");
        BackendEndpoint {
            base_url: self.config.default_url.clone(),
            source: ResolutionSource::Default,
        }
    }
}

/// An absolute http(s) URL with a host.
pub fn is_valid_base_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Profile;
    use crate::error::ApiError;
    use crate::http::HttpResponse;
    use crate::testing::{response, ScriptedTransport};

    fn config(candidates: &[&str]) -> BackendConfig {
        BackendConfig {
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
            probe_timeout: Duration::from_millis(50),
            ..BackendConfig::for_profile(Profile::Development)
        }
    }

    /// Only URLs starting with `healthy` answer 200; the rest are refused.
    fn transport_with_healthy(healthy: &'static [&'static str]) -> Arc<ScriptedTransport> {
        ScriptedTransport::new(move |req| {
            if healthy.iter().any(|h| req.url.starts_with(h)) {
                Ok(response(200, r#"{"status":"ok"}"#))
            } else {
                Err(ApiError::Network("connection refused".to_string()))
            }
        })
    }

    #[tokio::test]
    async fn explicit_config_is_used_verbatim_without_probing() {
        let transport = transport_with_healthy(&[]);
        let locator = BackendLocator::new(
            BackendConfig {
                explicit_url: Some("http://10.9.9.9:8000/".to_string()),
                ..config(&["http://a:1"])
            },
            transport.clone(),
        );
        let endpoint = locator.resolve().await;
        assert_eq!(endpoint.base_url, "http://10.9.9.9:8000/");
        assert_eq!(endpoint.source, ResolutionSource::ExplicitConfig);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn first_reachable_candidate_in_declared_order_wins() {
        let transport = transport_with_healthy(&["http://b:2", "http://c:3"]);
        let locator = BackendLocator::new(config(&["http://a:1", "http://b:2", "http://c:3"]), transport.clone());

        let endpoint = locator.resolve().await;
        assert_eq!(endpoint.base_url, "http://b:2");
        assert_eq!(endpoint.source, ResolutionSource::ProbedCandidate);

        let probed: Vec<String> = transport.sent().into_iter().map(|r| r.url).collect();
        assert_eq!(probed, vec!["http://a:1/health", "http://b:2/health"]);
    }

    /// Never answers for URLs starting with `slow`; everything else is healthy.
    struct HangingTransport;

    #[async_trait::async_trait]
    impl Transport for HangingTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            if request.url.starts_with("http://slow") {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(response(200, r#"{"status":"ok"}"#))
        }
    }

    #[tokio::test]
    async fn hanging_candidate_is_cut_off_by_probe_timeout() {
        let locator = BackendLocator::new(config(&["http://slow:1", "http://fast:2"]), Arc::new(HangingTransport));

        let started = std::time::Instant::now();
        assert!(!locator.test_connection("http://slow:1").await);
        let endpoint = locator.resolve().await;

        assert_eq!(endpoint.base_url, "http://fast:2");
        assert_eq!(endpoint.source, ResolutionSource::ProbedCandidate);
        assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    }

    #[tokio::test]
    async fn falls_back_to_default_when_nothing_answers() {
        let locator = BackendLocator::new(config(&["http://a:1", "http://b:2"]), transport_with_healthy(&[]));
        let endpoint = locator.resolve().await;
        assert_eq!(endpoint.base_url, "http://192.168.45.20:8000");
        assert_eq!(endpoint.source, ResolutionSource::Default);
    }

    #[tokio::test]
    async fn non_2xx_health_counts_as_unreachable() {
        let transport = ScriptedTransport::new(|req| {
            if req.url.starts_with("http://a:1") {
                Ok(response(503, ""))
            } else {
                Ok(response(200, "{}"))
            }
        });
        let locator = BackendLocator::new(config(&["http://a:1", "http://b:2"]), transport);
        assert_eq!(locator.resolve().await.base_url, "http://b:2");
    }

    #[tokio::test]
    async fn invalid_candidates_are_skipped() {
        let transport = ScriptedTransport::fixed(200, "{}");
        let locator = BackendLocator::new(config(&["not a url", "ftp://x:1", "http://ok:1"]), transport.clone());
        assert_eq!(locator.resolve().await.base_url, "http://ok:1");
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn invalid_explicit_url_falls_through_to_probing() {
        let locator = BackendLocator::new(
            BackendConfig {
                explicit_url: Some("::::".to_string()),
                ..config(&["http://ok:1"])
            },
            ScriptedTransport::fixed(200, "{}"),
        );
        let endpoint = locator.resolve().await;
        assert_eq!(endpoint.base_url, "http://ok:1");
        assert_eq!(endpoint.source, ResolutionSource::ProbedCandidate);
    }

    #[tokio::test]
    async fn resolution_is_cached_until_reresolve() {
        let transport = ScriptedTransport::fixed(200, "{}");
        let locator = BackendLocator::new(config(&["http://a:1"]), transport.clone());
        assert!(locator.current().await.is_none());

        let first = locator.resolve().await;
        let second = locator.resolve().await;
        assert_eq!(first, second);
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(locator.current().await, Some(first));

        locator.reresolve().await;
        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn client_targets_resolved_endpoint() {
        let locator = BackendLocator::new(config(&["http://b:2/"]), ScriptedTransport::fixed(200, "{}"));
        assert_eq!(locator.client().await.base_url(), "http://b:2");
    }

    #[test]
    fn base_url_validation() {
        assert!(is_valid_base_url("http://localhost:8000"));
        assert!(is_valid_base_url("https://cureat.onrender.com"));
        assert!(!is_valid_base_url(""));
        assert!(!is_valid_base_url("localhost:8000"));
        assert!(!is_valid_base_url("file:///tmp/x"));
    }
}
