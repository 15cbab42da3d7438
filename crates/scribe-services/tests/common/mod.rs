#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scribe_services::{
    config_keys as keys, ClinicalTemplate, Domain, LetterTemplate, LetterTemplateList,
    ModelOptions, Notification, NotificationLevel, Notifier, PromptEntry, PromptSet,
    ProviderConfig, QuickChat, Result, ScribeError, Service, SettingsController, SettingsGateway,
    UserProfile, PLACEHOLDER_CREDENTIAL,
};
use tokio::sync::{Barrier, Notify};

pub fn setup_logger() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Backend state as the in-memory gateway sees it
#[derive(Debug, Clone)]
pub struct Backend {
    pub config: ProviderConfig,
    pub profile: UserProfile,
    pub prompts: PromptSet,
    pub options: ModelOptions,
    pub templates: Vec<ClinicalTemplate>,
    pub default_template: Option<String>,
    pub letters: LetterTemplateList,
    pub ollama_models: Vec<String>,
    pub openai_models: Vec<String>,
    pub whisper_models: Vec<String>,
    pub reachable: HashMap<Service, bool>,
    pub unreachable_urls: HashSet<String>,
}

impl Default for Backend {
    fn default() -> Self {
        let mut prompts = PromptSet::new();
        prompts.insert(
            "summary".into(),
            PromptEntry {
                system: "Summarise the consultation.".into(),
                initial: None,
            },
        );
        prompts.insert(
            "refinement".into(),
            PromptEntry {
                system: "Refine the note.".into(),
                initial: Some("Begin.".into()),
            },
        );

        let mut options = ModelOptions::default();
        options.general.num_ctx = Some(8192);
        options.general.temperature = Some(0.1);

        Self {
            config: ProviderConfig::new()
                .with(keys::OLLAMA_BASE_URL, "http://localhost:11434")
                .with(keys::OPENAI_BASE_URL, "https://api.openai.com/v1")
                .with(keys::OPENAI_API_KEY, PLACEHOLDER_CREDENTIAL)
                .with(keys::WHISPER_BASE_URL, "http://localhost:8000")
                .with(keys::PRIMARY_MODEL, "llama3.1:8b"),
            profile: UserProfile {
                name: "Dr Avery".into(),
                specialty: "General Practice".into(),
                quick_chats: [
                    QuickChat::new("Critique", "Critique my plan"),
                    QuickChat::new("Differentials", "List differentials"),
                    QuickChat::new("Letter", "Draft a letter"),
                ],
                default_template: None,
                default_letter_template_id: None,
            },
            prompts,
            options,
            templates: vec![template("soap_01", "SOAP"), template("progress_01", "Progress")],
            default_template: Some("soap_01".into()),
            letters: LetterTemplateList {
                templates: vec![letter(1, "Referral"), letter(2, "Discharge")],
                default_template_id: Some(1),
            },
            ollama_models: vec!["llama3.1:8b".into(), "qwen2.5:14b".into()],
            openai_models: vec!["gpt-4o".into(), "gpt-4o-mini".into()],
            whisper_models: vec!["Systran/faster-whisper-small".into()],
            reachable: HashMap::new(),
            unreachable_urls: HashSet::new(),
        }
    }
}

pub fn template(key: &str, name: &str) -> ClinicalTemplate {
    ClinicalTemplate {
        template_key: key.into(),
        template_name: name.into(),
        fields: Vec::new(),
    }
}

pub fn letter(id: i64, name: &str) -> LetterTemplate {
    LetterTemplate {
        id,
        name: name.into(),
        instructions: format!("Write a {} letter", name.to_lowercase()),
        is_default: false,
    }
}

#[derive(Default)]
struct MockState {
    backend: Backend,
    failing: HashSet<Domain>,
    calls: Vec<String>,
}

/// Parks one profile fetch after it has read the backend
#[derive(Default)]
pub struct FetchHold {
    parked: Notify,
    release: Notify,
}

impl FetchHold {
    pub async fn parked(&self) {
        self.parked.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// In-memory gateway that records every call. Writes update the backend
/// so a reload observes them.
#[derive(Default)]
pub struct MockGateway {
    state: Mutex<MockState>,
    domain_barrier: Option<Arc<Barrier>>,
    profile_hold: Mutex<Option<Arc<FetchHold>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(backend: Backend) -> Self {
        Self {
            state: Mutex::new(MockState {
                backend,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Make the five domain fetches wait for each other before returning
    pub fn with_domain_barrier(mut self) -> Self {
        self.domain_barrier = Some(Arc::new(Barrier::new(5)));
        self
    }

    /// Hold the next profile fetch until released. The held load keeps the
    /// backend state it saw before parking.
    pub fn hold_next_profile(&self) -> Arc<FetchHold> {
        let hold = Arc::new(FetchHold::default());
        *self.profile_hold.lock().unwrap() = Some(hold.clone());
        hold
    }

    pub fn fail(&self, domain: Domain) {
        self.state.lock().unwrap().failing.insert(domain);
    }

    pub fn recover(&self, domain: Domain) {
        self.state.lock().unwrap().failing.remove(&domain);
    }

    pub fn edit_backend(&self, edit: impl FnOnce(&mut Backend)) {
        edit(&mut self.state.lock().unwrap().backend);
    }

    pub fn backend(&self) -> Backend {
        self.state.lock().unwrap().backend.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn record(&self, call: impl Into<String>, domain: Domain) -> Result<Backend> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.into());
        if state.failing.contains(&domain) {
            return Err(ScribeError::domain(domain, "503 Service Unavailable"));
        }
        Ok(state.backend.clone())
    }

    async fn wait_for_batch(&self) {
        if let Some(barrier) = &self.domain_barrier {
            barrier.wait().await;
        }
    }
}

#[async_trait]
impl SettingsGateway for MockGateway {
    async fn fetch_config(&self) -> Result<ProviderConfig> {
        Ok(self.record("fetch_config", Domain::Config)?.config)
    }

    async fn fetch_prompts(&self) -> Result<PromptSet> {
        self.wait_for_batch().await;
        Ok(self.record("fetch_prompts", Domain::Prompts)?.prompts)
    }

    async fn fetch_options(&self) -> Result<ModelOptions> {
        self.wait_for_batch().await;
        Ok(self.record("fetch_options", Domain::Options)?.options)
    }

    async fn fetch_user_settings(&self) -> Result<UserProfile> {
        self.wait_for_batch().await;
        let hold = self.profile_hold.lock().unwrap().take();
        let profile = self.record("fetch_user_settings", Domain::Profile)?.profile;
        if let Some(hold) = hold {
            hold.parked.notify_one();
            hold.release.notified().await;
        }
        Ok(profile)
    }

    async fn fetch_templates(&self) -> Result<Vec<ClinicalTemplate>> {
        self.wait_for_batch().await;
        Ok(self.record("fetch_templates", Domain::Templates)?.templates)
    }

    async fn fetch_default_template(&self) -> Result<Option<String>> {
        self.wait_for_batch().await;
        Ok(self
            .record("fetch_default_template", Domain::DefaultTemplate)?
            .default_template)
    }

    async fn fetch_letter_templates(&self) -> Result<LetterTemplateList> {
        Ok(self
            .record("fetch_letter_templates", Domain::LetterTemplates)?
            .letters)
    }

    async fn fetch_ollama_models(&self, _url: &str) -> Result<Vec<String>> {
        Ok(self
            .record("fetch_ollama_models", Domain::OllamaModels)?
            .ollama_models)
    }

    async fn fetch_openai_models(&self, _url: &str, _api_key: &str) -> Result<Vec<String>> {
        Ok(self
            .record("fetch_openai_models", Domain::OpenAiModels)?
            .openai_models)
    }

    async fn fetch_whisper_models(&self, _url: &str) -> Result<Vec<String>> {
        Ok(self
            .record("fetch_whisper_models", Domain::WhisperModels)?
            .whisper_models)
    }

    async fn save_user_settings(&self, profile: &UserProfile) -> Result<()> {
        self.record("save_user_settings", Domain::Profile)?;
        self.edit_backend(|b| {
            b.profile = profile.clone();
            b.letters.default_template_id = profile.default_letter_template_id;
        });
        Ok(())
    }

    async fn save_config(&self, config: &ProviderConfig) -> Result<()> {
        self.record("save_config", Domain::Config)?;
        self.edit_backend(|b| b.config = config.clone());
        Ok(())
    }

    async fn save_options(&self, options: &ModelOptions) -> Result<()> {
        self.record("save_options", Domain::Options)?;
        self.edit_backend(|b| b.options = options.clone());
        Ok(())
    }

    async fn save_prompts(&self, prompts: &PromptSet) -> Result<()> {
        self.record("save_prompts", Domain::Prompts)?;
        self.edit_backend(|b| b.prompts = prompts.clone());
        Ok(())
    }

    async fn reset_to_defaults(&self) -> Result<()> {
        self.record("reset_to_defaults", Domain::Reset)?;
        self.edit_backend(|b| *b = Backend::default());
        Ok(())
    }

    async fn clear_database(&self, embedding_model: &str, config: &ProviderConfig) -> Result<()> {
        let call = format!(
            "clear_database:{}:{}",
            embedding_model,
            config.ollama_base_url().unwrap_or_default()
        );
        self.record(call, Domain::ClearDatabase)?;
        Ok(())
    }

    async fn validate_url(&self, service: Service, url: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("validate_url:{}", service));
        let backend = &state.backend;
        !backend.unreachable_urls.contains(url)
            && backend.reachable.get(&service).copied().unwrap_or(true)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn of_level(&self, level: NotificationLevel) -> Vec<Notification> {
        self.all().into_iter().filter(|n| n.level == level).collect()
    }

    pub fn clear(&self) {
        self.notifications.lock().unwrap().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

pub struct Harness {
    pub gateway: Arc<MockGateway>,
    pub notifier: Arc<RecordingNotifier>,
    pub controller: Arc<SettingsController>,
}

pub fn harness(gateway: MockGateway) -> Harness {
    setup_logger();
    let gateway = Arc::new(gateway);
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = Arc::new(SettingsController::new(gateway.clone(), notifier.clone()));
    Harness {
        gateway,
        notifier,
        controller,
    }
}
