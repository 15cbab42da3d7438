//! reqwest-backed gateway talking to the settings backend and model providers

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use scribe_core::{
    ClientConfig, ClinicalTemplate, Domain, LetterTemplateList, ModelOptions, PromptSet,
    ProviderConfig, Result, ScribeError, Service, UserProfile,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::SettingsGateway;

/// Substrings marking models that cannot serve chat completions
const NON_CHAT_MARKERS: &[&str] = &[
    "embed",
    "whisper",
    "tts",
    "transcribe",
    "dall-e",
    "moderation",
    "davinci",
    "babbage",
];

pub fn is_chat_model(id: &str) -> bool {
    let id = id.to_lowercase();
    !NON_CHAT_MARKERS.iter().any(|marker| id.contains(marker))
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ModelListResponse {
    data: Vec<ListedModel>,
}

#[derive(Debug, Deserialize)]
struct ListedModel {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DefaultTemplateResponse {
    #[serde(default)]
    template_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClearDatabaseRequest<'a> {
    new_embedding_model: &'a str,
    config: &'a ProviderConfig,
}

#[derive(Debug, Clone)]
pub struct HttpSettingsGateway {
    api_base: String,
    client: Client,
    check_timeout: Duration,
}

impl HttpSettingsGateway {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ScribeError::Http(e.to_string()))?;

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
            check_timeout: config.check_timeout(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, domain: Domain, url: &str) -> Result<T> {
        self.send_json(domain, self.client.get(url)).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        domain: Domain,
        request: RequestBuilder,
    ) -> Result<T> {
        let resp = request
            .send()
            .await
            .map_err(|e| ScribeError::Http(e.to_string()))?;
        let resp = ensure_success(domain, resp).await?;

        let body = resp
            .text()
            .await
            .map_err(|e| ScribeError::Http(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            ScribeError::domain(domain, format!("Failed to parse response: {}", e))
        })
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        domain: Domain,
        path: &str,
        body: &B,
    ) -> Result<()> {
        let url = self.api_url(path);
        debug!(%url, "Saving {}", domain);

        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ScribeError::Http(e.to_string()))?;

        ensure_success(domain, resp).await?;
        Ok(())
    }
}

async fn ensure_success(domain: Domain, resp: Response) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let excerpt: String = body.chars().take(200).collect();
    Err(ScribeError::domain(domain, format!("{} - {}", status, excerpt)))
}

/// Strip a trailing `/v1` so paths can be appended uniformly
fn root_url(url: &str) -> &str {
    let url = url.trim_end_matches('/');
    url.strip_suffix("/v1").unwrap_or(url)
}

#[async_trait]
impl SettingsGateway for HttpSettingsGateway {
    async fn fetch_config(&self) -> Result<ProviderConfig> {
        self.get_json(Domain::Config, &self.api_url("config/global")).await
    }

    async fn fetch_prompts(&self) -> Result<PromptSet> {
        self.get_json(Domain::Prompts, &self.api_url("config/prompts")).await
    }

    async fn fetch_options(&self) -> Result<ModelOptions> {
        self.get_json(Domain::Options, &self.api_url("config/ollama")).await
    }

    async fn fetch_user_settings(&self) -> Result<UserProfile> {
        self.get_json(Domain::Profile, &self.api_url("config/user")).await
    }

    async fn fetch_templates(&self) -> Result<Vec<ClinicalTemplate>> {
        self.get_json(Domain::Templates, &self.api_url("templates")).await
    }

    async fn fetch_default_template(&self) -> Result<Option<String>> {
        let resp: DefaultTemplateResponse = self
            .get_json(Domain::DefaultTemplate, &self.api_url("templates/default"))
            .await?;
        Ok(resp.template_key)
    }

    async fn fetch_letter_templates(&self) -> Result<LetterTemplateList> {
        self.get_json(Domain::LetterTemplates, &self.api_url("templates/letter"))
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_ollama_models(&self, url: &str) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", root_url(url));
        debug!("Fetching models from Ollama API");

        let tags: TagsResponse = self.get_json(Domain::OllamaModels, &url).await?;
        let names: Vec<String> = tags
            .models
            .into_iter()
            .map(|m| m.name)
            .filter(|name| is_chat_model(name))
            .collect();

        info!(count = names.len(), "Fetched models from Ollama");
        Ok(names)
    }

    #[instrument(skip(self, api_key))]
    async fn fetch_openai_models(&self, url: &str, api_key: &str) -> Result<Vec<String>> {
        let url = format!("{}/models", url.trim_end_matches('/'));
        debug!("Fetching models from OpenAI-compatible API");

        let request = self.client.get(&url).bearer_auth(api_key);
        let listing: ModelListResponse = self.send_json(Domain::OpenAiModels, request).await?;
        let mut ids: Vec<String> = listing
            .data
            .into_iter()
            .map(|m| m.id)
            .filter(|id| is_chat_model(id))
            .collect();
        ids.sort();

        info!(count = ids.len(), "Fetched models from OpenAI");
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn fetch_whisper_models(&self, url: &str) -> Result<Vec<String>> {
        let url = format!("{}/v1/models", root_url(url));
        let listing: ModelListResponse = self.get_json(Domain::WhisperModels, &url).await?;
        let ids: Vec<String> = listing.data.into_iter().map(|m| m.id).collect();

        info!(count = ids.len(), "Fetched transcription models");
        Ok(ids)
    }

    async fn save_user_settings(&self, profile: &UserProfile) -> Result<()> {
        self.post_json(Domain::Profile, "config/user", profile).await
    }

    async fn save_config(&self, config: &ProviderConfig) -> Result<()> {
        self.post_json(Domain::Config, "config/global", config).await
    }

    async fn save_options(&self, options: &ModelOptions) -> Result<()> {
        self.post_json(Domain::Options, "config/ollama", options).await
    }

    async fn save_prompts(&self, prompts: &PromptSet) -> Result<()> {
        self.post_json(Domain::Prompts, "config/prompts", prompts).await
    }

    async fn reset_to_defaults(&self) -> Result<()> {
        info!("Requesting backend reset to defaults");
        self.post_json(Domain::Reset, "config/reset", &serde_json::json!({}))
            .await
    }

    #[instrument(skip(self, config))]
    async fn clear_database(&self, embedding_model: &str, config: &ProviderConfig) -> Result<()> {
        let request = ClearDatabaseRequest {
            new_embedding_model: embedding_model,
            config,
        };
        self.post_json(Domain::ClearDatabase, "rag/clear-database", &request)
            .await
    }

    #[instrument(skip(self))]
    async fn validate_url(&self, service: Service, url: &str) -> bool {
        let result = self
            .client
            .get(url)
            .timeout(self.check_timeout)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_server_error() => {
                warn!(status = %resp.status(), "{} endpoint returned server error", service);
                false
            }
            Ok(_) => true,
            Err(e) => {
                debug!("{} endpoint unreachable: {}", service, e);
                false
            }
        }
    }
}
