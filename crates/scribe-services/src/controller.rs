//! Settings controller - aggregates every settings domain into one snapshot
//!
//! `load()` fetches the base configuration first, then fans out the other
//! domain fetches, the provider model listings and the endpoint health
//! checks as one settled join. Results are reduced into the snapshot under
//! a single write lock, so the most recently settled load wins.
//! `save()`, `restore_defaults()` and `clear_database()` always finish by
//! re-reading the backend through `load()`.
//!
//! Endpoint health is tracked against a basis: the watched field values each
//! health entry was last checked with. Any service whose basis differs from
//! the snapshot configuration is re-checked, which also repairs health after
//! an older load settles last.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use scribe_core::{
    index_templates, ClinicalTemplate, Domain, DomainFailure, LetterTemplateList, ModelOptions,
    OptionCategory, OptionField, ProfileField, PromptField, PromptSet, ProviderConfig, Result,
    ScribeError, Service, Snapshot, UserProfile,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::{EndpointValidator, Notification, Notifier, SettingsGateway};

/// Settled results of one load, before they touch the snapshot
struct FetchedSettings {
    config: ProviderConfig,
    profile: Result<UserProfile>,
    prompts: Result<PromptSet>,
    options: Result<ModelOptions>,
    templates: Result<Vec<ClinicalTemplate>>,
    default_template: Result<Option<String>>,
    /// `None` when no primary endpoint is configured
    primary_models: Option<Result<Vec<String>>>,
    /// `None` when skipped or failed; the secondary provider is optional
    secondary_models: Option<Vec<String>>,
    transcription_models: Option<Result<Vec<String>>>,
    health: Vec<(Service, bool)>,
}

impl FetchedSettings {
    /// Apply successful results; failed domains keep their current value
    fn apply(self, snapshot: &mut Snapshot, basis: &mut ProviderConfig) -> Vec<DomainFailure> {
        let mut failures = Vec::new();

        for (service, healthy) in &self.health {
            snapshot.endpoint_health.set(*service, *healthy);
            basis.copy_watched(&self.config, *service);
        }

        snapshot.config = self.config;
        snapshot.mark_loaded(Domain::Config);

        match self.profile {
            Ok(profile) => {
                // the default letter template belongs to the letter list
                let letter_default = snapshot.profile.default_letter_template_id;
                snapshot.profile = profile;
                snapshot.profile.default_letter_template_id = letter_default;
                snapshot.mark_loaded(Domain::Profile);
            }
            Err(e) => failures.push(DomainFailure::new(Domain::Profile, e)),
        }

        match self.default_template {
            Ok(Some(key)) => snapshot.profile.default_template = Some(key),
            Ok(None) => {}
            Err(e) => failures.push(DomainFailure::new(Domain::DefaultTemplate, e)),
        }

        match self.prompts {
            Ok(prompts) => {
                snapshot.prompts = Some(prompts);
                snapshot.mark_loaded(Domain::Prompts);
            }
            Err(e) => failures.push(DomainFailure::new(Domain::Prompts, e)),
        }

        match self.options {
            Ok(options) => {
                snapshot.options = options;
                snapshot.mark_loaded(Domain::Options);
            }
            Err(e) => failures.push(DomainFailure::new(Domain::Options, e)),
        }

        match self.templates {
            Ok(templates) => {
                snapshot.templates = index_templates(templates);
                snapshot.mark_loaded(Domain::Templates);
            }
            Err(e) => failures.push(DomainFailure::new(Domain::Templates, e)),
        }

        match self.primary_models {
            Some(Ok(models)) => snapshot.provider_models.set_primary(models),
            Some(Err(e)) => failures.push(DomainFailure::new(Domain::OllamaModels, e)),
            None => {}
        }

        if let Some(models) = self.secondary_models {
            snapshot.provider_models.set_secondary(models);
        }

        match self.transcription_models {
            Some(Ok(models)) => snapshot.transcription_models = models,
            Some(Err(e)) => failures.push(DomainFailure::new(Domain::WhisperModels, e)),
            None => snapshot.transcription_models.clear(),
        }

        snapshot.refresh_catalog();
        failures
    }
}

pub struct SettingsController {
    gateway: Arc<dyn SettingsGateway>,
    validator: EndpointValidator,
    notifier: Arc<dyn Notifier>,
    snapshot: RwLock<Snapshot>,
    /// Watched field values the current endpoint health was checked with
    health_basis: Mutex<ProviderConfig>,
}

impl SettingsController {
    pub fn new(gateway: Arc<dyn SettingsGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            validator: EndpointValidator::new(gateway.clone()),
            gateway,
            notifier,
            snapshot: RwLock::new(Snapshot::new()),
            health_basis: Mutex::new(ProviderConfig::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn basis(&self) -> MutexGuard<'_, ProviderConfig> {
        self.health_basis
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // --- Read access ---

    pub fn snapshot(&self) -> Snapshot {
        self.read().clone()
    }

    /// Mutators are only accepted once this is true
    pub fn is_loaded(&self) -> bool {
        self.read().is_loaded()
    }

    pub fn model_catalog(&self) -> Vec<String> {
        self.read().model_catalog.clone()
    }

    pub fn endpoint_health(&self, service: Service) -> Option<bool> {
        self.read().endpoint_health.get(service)
    }

    // --- Lifecycle ---

    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Snapshot> {
        info!("Loading settings");

        let (fetched, letters) =
            tokio::join!(self.fetch_settings(), self.gateway.fetch_letter_templates());

        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                error!("Settings load aborted: {}", e);
                self.notifier
                    .notify(Notification::error("Failed to load settings", e.to_string()));
                return Err(e);
            }
        };

        let failures = {
            let mut snapshot = self.write();
            let mut failures = fetched.apply(&mut snapshot, &mut self.basis());
            match letters {
                Ok(list) => {
                    apply_letter_list(&mut snapshot, list);
                    snapshot.mark_loaded(Domain::LetterTemplates);
                }
                Err(e) => failures.push(DomainFailure::new(Domain::LetterTemplates, e)),
            }
            failures
        };

        if failures.is_empty() {
            info!("Settings loaded");
        } else {
            self.report_partial_failures(&failures);
        }

        // Health checked by an overlapping load may describe another configuration
        self.sync_endpoint_health().await;

        Ok(self.snapshot())
    }

    /// Base configuration, then everything that depends on it
    async fn fetch_settings(&self) -> Result<FetchedSettings> {
        let config = self
            .gateway
            .fetch_config()
            .await
            .map_err(|e| ScribeError::FatalLoad(e.to_string()))?;
        debug!("Base configuration fetched");

        let basis = self.basis().clone();

        let (
            (profile, prompts, options, templates, default_template),
            primary_models,
            secondary_models,
            transcription_models,
            health,
        ) = tokio::join!(
            self.fetch_domains(),
            self.fetch_primary_models(&config),
            self.fetch_secondary_models(&config),
            self.fetch_transcription_models(&config),
            self.validator.revalidate(&basis, &config),
        );

        Ok(FetchedSettings {
            config,
            profile,
            prompts,
            options,
            templates,
            default_template,
            primary_models,
            secondary_models,
            transcription_models,
            health,
        })
    }

    #[allow(clippy::type_complexity)]
    async fn fetch_domains(
        &self,
    ) -> (
        Result<UserProfile>,
        Result<PromptSet>,
        Result<ModelOptions>,
        Result<Vec<ClinicalTemplate>>,
        Result<Option<String>>,
    ) {
        tokio::join!(
            self.gateway.fetch_user_settings(),
            self.gateway.fetch_prompts(),
            self.gateway.fetch_options(),
            self.gateway.fetch_templates(),
            self.gateway.fetch_default_template(),
        )
    }

    async fn fetch_primary_models(&self, config: &ProviderConfig) -> Option<Result<Vec<String>>> {
        let url = config.ollama_base_url()?;
        Some(self.gateway.fetch_ollama_models(&url).await)
    }

    async fn fetch_secondary_models(&self, config: &ProviderConfig) -> Option<Vec<String>> {
        let Some(api_key) = config.openai_api_key() else {
            debug!("No OpenAI key configured, skipping model listing");
            return None;
        };

        let url = config.openai_base_url();
        match self.gateway.fetch_openai_models(&url, api_key).await {
            Ok(models) => Some(models),
            Err(e) => {
                warn!("OpenAI model listing failed: {}", e);
                None
            }
        }
    }

    async fn fetch_transcription_models(
        &self,
        config: &ProviderConfig,
    ) -> Option<Result<Vec<String>>> {
        let url = config.whisper_base_url()?;
        Some(self.gateway.fetch_whisper_models(&url).await)
    }

    fn report_partial_failures(&self, failures: &[DomainFailure]) {
        for failure in failures {
            warn!("Failed to load {}", failure);
        }

        let domains: Vec<&str> = failures.iter().map(|f| f.domain.label()).collect();
        self.notifier.notify(Notification::warning(
            "Some settings could not be loaded",
            format!("Failed to load: {}", domains.join(", ")),
        ));
    }

    /// Write profile, configuration, options and prompts in that order,
    /// then reload. The first failing stage stops the writes. Domains that
    /// have never loaded are skipped so their defaults never reach the backend.
    #[instrument(skip(self))]
    pub async fn save(&self) -> Result<()> {
        let snapshot = self.snapshot();
        let Some(prompts) = snapshot.prompts.as_ref() else {
            return Err(ScribeError::NotLoaded);
        };

        let written = self.write_stages(&snapshot, prompts).await;
        match &written {
            Ok(skipped) if skipped.is_empty() => {
                info!("Settings saved");
                self.notifier.notify(Notification::success(
                    "Settings saved",
                    "All settings have been saved",
                ));
            }
            Ok(skipped) => {
                let labels: Vec<&str> = skipped.iter().map(Domain::label).collect();
                warn!(skipped = ?skipped, "Settings saved without unloaded domains");
                self.notifier.notify(Notification::warning(
                    "Settings partially saved",
                    format!("Not saved because they never loaded: {}", labels.join(", ")),
                ));
            }
            Err(e) => {
                error!("Settings save failed: {}", e);
                self.notifier
                    .notify(Notification::error("Failed to save settings", e.to_string()));
            }
        }

        let reloaded = self.load().await;
        written?;
        reloaded.map(|_| ())
    }

    /// Returns the stages skipped because their domain never loaded
    async fn write_stages(&self, snapshot: &Snapshot, prompts: &PromptSet) -> Result<Vec<Domain>> {
        let mut skipped = Vec::new();

        if snapshot.has_loaded(Domain::Profile) {
            self.gateway
                .save_user_settings(&snapshot.profile)
                .await
                .map_err(save_error(Domain::Profile))?;
        } else {
            skipped.push(Domain::Profile);
        }

        self.gateway
            .save_config(&snapshot.config)
            .await
            .map_err(save_error(Domain::Config))?;

        if snapshot.has_loaded(Domain::Options) {
            self.gateway
                .save_options(&snapshot.options)
                .await
                .map_err(save_error(Domain::Options))?;
        } else {
            skipped.push(Domain::Options);
        }

        self.gateway
            .save_prompts(prompts)
            .await
            .map_err(save_error(Domain::Prompts))?;

        Ok(skipped)
    }

    /// Ask the backend to reset to its defaults, then reload
    #[instrument(skip(self))]
    pub async fn restore_defaults(&self) -> Result<()> {
        info!("Restoring default settings");
        let reset = self.gateway.reset_to_defaults().await;
        match &reset {
            Ok(()) => self.notifier.notify(Notification::success(
                "Defaults restored",
                "Settings have been reset to their defaults",
            )),
            Err(e) => self
                .notifier
                .notify(Notification::error("Failed to restore defaults", e.to_string())),
        }

        let reloaded = self.load().await;
        reset?;
        reloaded.map(|_| ())
    }

    /// Clear the retrieval database for a new embedding model, then reload.
    /// Refused until the base configuration has loaded.
    #[instrument(skip(self))]
    pub async fn clear_database(&self, new_embedding_model: &str) -> Result<()> {
        let config = {
            let snapshot = self.read();
            if !snapshot.has_loaded(Domain::Config) {
                return Err(ScribeError::NotLoaded);
            }
            snapshot.config.clone()
        };
        info!(model = new_embedding_model, "Clearing retrieval database");

        let cleared = self
            .gateway
            .clear_database(new_embedding_model, &config)
            .await;
        match &cleared {
            Ok(()) => self.notifier.notify(Notification::success(
                "Database cleared",
                format!("Embeddings will be rebuilt with {}", new_embedding_model),
            )),
            Err(e) => self
                .notifier
                .notify(Notification::error("Failed to clear database", e.to_string())),
        }

        let reloaded = self.load().await;
        cleared?;
        reloaded.map(|_| ())
    }

    /// Re-check services whose endpoint fields changed since they were last checked
    pub async fn sync_endpoint_health(&self) -> Vec<(Service, bool)> {
        let next = self.read().config.clone();
        let basis = self.basis().clone();

        let results = self.validator.revalidate(&basis, &next).await;
        if !results.is_empty() {
            let mut snapshot = self.write();
            let mut basis = self.basis();
            for (service, healthy) in &results {
                snapshot.endpoint_health.set(*service, *healthy);
                basis.copy_watched(&next, *service);
            }
        }
        results
    }

    // --- Mutators ---

    pub fn set_profile_field(&self, field: ProfileField) -> Result<()> {
        self.write().set_profile_field(field)
    }

    pub fn set_option(&self, category: OptionCategory, field: OptionField) -> Result<()> {
        self.write().set_option(category, field)
    }

    pub fn set_config_field(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.write().set_config_field(key, value)
    }

    pub fn set_prompt_field(
        &self,
        prompt: &str,
        field: PromptField,
        value: String,
    ) -> Result<()> {
        self.write().set_prompt_field(prompt, field, value)
    }

    pub fn set_default_letter_template(&self, id: Option<i64>) -> Result<()> {
        self.write().set_default_letter_template(id)
    }
}

fn apply_letter_list(snapshot: &mut Snapshot, list: LetterTemplateList) {
    let default_id = list.resolved_default();
    snapshot.apply_letter_templates(list.templates, default_id);
}

fn save_error(stage: Domain) -> impl Fn(ScribeError) -> ScribeError {
    move |e| ScribeError::Save {
        stage,
        message: e.to_string(),
    }
}
