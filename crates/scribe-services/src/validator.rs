//! Endpoint reachability checks driven by configuration diffs

use std::sync::Arc;

use futures::future::join_all;
use scribe_core::{ProviderConfig, Service};
use tracing::{debug, info};

use crate::SettingsGateway;

/// Services whose URL or credential fields differ between two configurations
pub fn changed_services(previous: &ProviderConfig, next: &ProviderConfig) -> Vec<Service> {
    Service::all()
        .iter()
        .copied()
        .filter(|service| previous.watched_values(*service) != next.watched_values(*service))
        .collect()
}

#[derive(Clone)]
pub struct EndpointValidator {
    gateway: Arc<dyn SettingsGateway>,
}

impl EndpointValidator {
    pub fn new(gateway: Arc<dyn SettingsGateway>) -> Self {
        Self { gateway }
    }

    /// Check one service. A blank URL is unreachable without a request.
    pub async fn validate(&self, service: Service, base_url: &str) -> bool {
        let url = base_url.trim().trim_end_matches('/');
        if url.is_empty() {
            debug!("{} has no endpoint configured", service);
            return false;
        }

        let healthy = self.gateway.validate_url(service, url).await;
        debug!(healthy, "Validated {} endpoint {}", service, url);
        healthy
    }

    /// Check, concurrently, only the services affected by the change from
    /// `previous` to `next`. Services left unconfigured report `false`.
    pub async fn revalidate(
        &self,
        previous: &ProviderConfig,
        next: &ProviderConfig,
    ) -> Vec<(Service, bool)> {
        let changed = changed_services(previous, next);
        if changed.is_empty() {
            return Vec::new();
        }

        info!(services = ?changed, "Endpoint configuration changed");

        let checks = changed.into_iter().map(|service| {
            let url = next.endpoint(service).unwrap_or_default();
            async move { (service, self.validate(service, &url).await) }
        });

        join_all(checks).await
    }
}
