use async_trait::async_trait;
use scribe_core::{
    ClinicalTemplate, LetterTemplateList, ModelOptions, PromptSet, ProviderConfig, Result,
    Service, UserProfile,
};

/// Per-domain accessors for the settings backend.
///
/// Every call may be slow and may fail on its own; no ordering between
/// calls is assumed by implementations.
#[async_trait]
pub trait SettingsGateway: Send + Sync {
    async fn fetch_config(&self) -> Result<ProviderConfig>;

    async fn fetch_prompts(&self) -> Result<PromptSet>;

    async fn fetch_options(&self) -> Result<ModelOptions>;

    async fn fetch_user_settings(&self) -> Result<UserProfile>;

    async fn fetch_templates(&self) -> Result<Vec<ClinicalTemplate>>;

    /// Key of the template currently designated as default
    async fn fetch_default_template(&self) -> Result<Option<String>>;

    async fn fetch_letter_templates(&self) -> Result<LetterTemplateList>;

    /// Chat-capable models served by an Ollama endpoint
    async fn fetch_ollama_models(&self, url: &str) -> Result<Vec<String>>;

    /// Chat-capable models served by an OpenAI-compatible endpoint
    async fn fetch_openai_models(&self, url: &str, api_key: &str) -> Result<Vec<String>>;

    async fn fetch_whisper_models(&self, url: &str) -> Result<Vec<String>>;

    async fn save_user_settings(&self, profile: &UserProfile) -> Result<()>;

    async fn save_config(&self, config: &ProviderConfig) -> Result<()>;

    async fn save_options(&self, options: &ModelOptions) -> Result<()>;

    async fn save_prompts(&self, prompts: &PromptSet) -> Result<()>;

    async fn reset_to_defaults(&self) -> Result<()>;

    async fn clear_database(&self, embedding_model: &str, config: &ProviderConfig) -> Result<()>;

    /// Reachability check; transport failures report `false`
    async fn validate_url(&self, service: Service, url: &str) -> bool;
}
