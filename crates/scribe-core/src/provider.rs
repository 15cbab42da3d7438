//! Base configuration record - service endpoints and credentials
//!
//! The record is opaque to the controller: it is fetched, edited and saved
//! verbatim. Only the handful of keys below are interpreted.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod keys {
    pub const OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const WHISPER_BASE_URL: &str = "WHISPER_BASE_URL";
    pub const WHISPER_KEY: &str = "WHISPER_KEY";
    pub const PRIMARY_MODEL: &str = "PRIMARY_MODEL";
    pub const SECONDARY_MODEL: &str = "SECONDARY_MODEL";
    pub const EMBEDDING_MODEL: &str = "EMBEDDING_MODEL";
}

/// Stored in place of a credential the user never set
pub const PLACEHOLDER_CREDENTIAL: &str = "&nbsp;";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderConfig(BTreeMap<String, Value>);

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Trimmed string value; blank, null and the placeholder read as unset
    pub fn text(&self, key: &str) -> Option<&str> {
        let raw = self.0.get(key)?.as_str()?.trim();
        if raw.is_empty() || raw == PLACEHOLDER_CREDENTIAL {
            return None;
        }
        Some(raw)
    }

    fn url(&self, key: &str) -> Option<String> {
        self.text(key).map(|url| url.trim_end_matches('/').to_string())
    }

    pub fn ollama_base_url(&self) -> Option<String> {
        self.url(keys::OLLAMA_BASE_URL)
    }

    pub fn openai_base_url(&self) -> String {
        self.url(keys::OPENAI_BASE_URL)
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        self.text(keys::OPENAI_API_KEY)
    }

    pub fn whisper_base_url(&self) -> Option<String> {
        self.url(keys::WHISPER_BASE_URL)
    }

    /// OpenAI is used whenever a real key is configured, Ollama otherwise
    pub fn active_provider(&self) -> LlmProvider {
        match self.openai_api_key() {
            Some(_) => LlmProvider::OpenAi,
            None => LlmProvider::Ollama,
        }
    }

    pub fn embedding_model(&self) -> Option<String> {
        let configured = self.text(keys::EMBEDDING_MODEL).map(str::to_string);
        match self.active_provider() {
            LlmProvider::OpenAi => {
                configured.or_else(|| Some(DEFAULT_OPENAI_EMBEDDING_MODEL.to_string()))
            }
            LlmProvider::Ollama => configured,
        }
    }

    /// Base URL a health check should target, if the service is configured
    pub fn endpoint(&self, service: Service) -> Option<String> {
        match service {
            Service::Ollama => self.ollama_base_url(),
            Service::OpenAi => self.url(keys::OPENAI_BASE_URL).or_else(|| {
                self.openai_api_key()
                    .map(|_| DEFAULT_OPENAI_BASE_URL.to_string())
            }),
            Service::Whisper => self.whisper_base_url(),
        }
    }

    /// Copy the watched fields of `service` from `other`, removing any it lacks
    pub fn copy_watched(&mut self, other: &ProviderConfig, service: Service) {
        for key in service.watched_keys() {
            match other.0.get(*key) {
                Some(value) => {
                    self.0.insert(key.to_string(), value.clone());
                }
                None => {
                    self.0.remove(*key);
                }
            }
        }
    }

    /// Raw values of the fields that determine a service's health
    pub fn watched_values(&self, service: Service) -> Vec<Option<&Value>> {
        service.watched_keys().iter().map(|k| self.0.get(*k)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Ollama,
    OpenAi,
}

/// External services whose reachability is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Ollama,
    OpenAi,
    Whisper,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::Ollama => "ollama",
            Service::OpenAi => "openai",
            Service::Whisper => "whisper",
        }
    }

    pub fn watched_keys(&self) -> &'static [&'static str] {
        match self {
            Service::Ollama => &[keys::OLLAMA_BASE_URL],
            Service::OpenAi => &[keys::OPENAI_BASE_URL, keys::OPENAI_API_KEY],
            Service::Whisper => &[keys::WHISPER_BASE_URL, keys::WHISPER_KEY],
        }
    }

    pub fn all() -> &'static [Service] {
        &[Service::Ollama, Service::OpenAi, Service::Whisper]
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_key_reads_as_unset() {
        let config = ProviderConfig::new().with(keys::OPENAI_API_KEY, PLACEHOLDER_CREDENTIAL);
        assert_eq!(config.openai_api_key(), None);
        assert_eq!(config.active_provider(), LlmProvider::Ollama);
    }

    #[test]
    fn test_real_key_selects_openai() {
        let config = ProviderConfig::new().with(keys::OPENAI_API_KEY, "sk-test");
        assert_eq!(config.active_provider(), LlmProvider::OpenAi);
        assert_eq!(config.openai_base_url(), DEFAULT_OPENAI_BASE_URL);
        assert_eq!(
            config.embedding_model().as_deref(),
            Some(DEFAULT_OPENAI_EMBEDDING_MODEL)
        );
    }

    #[test]
    fn test_urls_are_trimmed() {
        let config = ProviderConfig::new()
            .with(keys::OLLAMA_BASE_URL, " http://gpu-box:11434/ ")
            .with(keys::WHISPER_BASE_URL, "");
        assert_eq!(config.ollama_base_url().as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(config.whisper_base_url(), None);
    }

    #[test]
    fn test_copy_watched_only_touches_service_keys() {
        let mut basis = ProviderConfig::new()
            .with(keys::OPENAI_API_KEY, "sk-old")
            .with(keys::OLLAMA_BASE_URL, "http://a:11434");
        let next = ProviderConfig::new()
            .with(keys::OPENAI_BASE_URL, "https://proxy.local/v1")
            .with(keys::OLLAMA_BASE_URL, "http://b:11434");

        basis.copy_watched(&next, Service::OpenAi);

        assert_eq!(basis.openai_base_url(), "https://proxy.local/v1");
        assert_eq!(basis.get(keys::OPENAI_API_KEY), None);
        assert_eq!(basis.ollama_base_url().as_deref(), Some("http://a:11434"));
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let raw = r#"{"OLLAMA_BASE_URL": "http://localhost:11434", "RAG_CHUNK_SIZE": 512}"#;
        let config: ProviderConfig = serde_json::from_str(raw).unwrap();
        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["RAG_CHUNK_SIZE"], 512);
    }
}
