//! Service container
//!
//! Single entry point for the presentation layer. The controller owns the
//! snapshot; the gateway and notifier are shared handles.

use std::sync::Arc;

use scribe_core::{ClientConfig, Result};

use crate::{HttpSettingsGateway, Notifier, SettingsController, SettingsGateway, TracingNotifier};

pub struct Services {
    pub settings: Arc<SettingsController>,
    pub gateway: Arc<dyn SettingsGateway>,
}

impl Services {
    /// HTTP gateway against `config.api_base`, notifications routed to the log
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let gateway = Arc::new(HttpSettingsGateway::new(config)?);
        Ok(Self::with_gateway(gateway, Arc::new(TracingNotifier)))
    }

    pub fn with_gateway(gateway: Arc<dyn SettingsGateway>, notifier: Arc<dyn Notifier>) -> Self {
        let settings = Arc::new(SettingsController::new(gateway.clone(), notifier));
        Self { settings, gateway }
    }

    /// Build from `SCRIBE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }
}
