//! Model catalog - selectable chat models derived from provider listings

use serde::{Deserialize, Serialize};

use crate::ProviderConfig;

/// Last successful model listing per provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderModels {
    /// Chat models reported by the primary (Ollama) endpoint
    pub primary: Vec<String>,
    /// Chat models reported by the secondary (OpenAI-compatible) endpoint
    pub secondary: Vec<String>,
}

impl ProviderModels {
    pub fn set_primary(&mut self, models: Vec<String>) {
        self.primary = models;
    }

    pub fn set_secondary(&mut self, models: Vec<String>) {
        self.secondary = models;
    }

    /// Primary models first, then secondary, each only while its provider
    /// is still configured
    pub fn derive_catalog(&self, config: &ProviderConfig) -> Vec<String> {
        let primary = config
            .ollama_base_url()
            .map(|_| self.primary.as_slice())
            .unwrap_or_default();
        let secondary = config
            .openai_api_key()
            .map(|_| self.secondary.as_slice())
            .unwrap_or_default();

        primary.iter().chain(secondary).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{keys, PLACEHOLDER_CREDENTIAL};

    fn models() -> ProviderModels {
        ProviderModels {
            primary: vec!["llama3.1:8b".into(), "qwen2.5:14b".into()],
            secondary: vec!["gpt-4o".into()],
        }
    }

    #[test]
    fn test_primary_then_secondary() {
        let config = ProviderConfig::new()
            .with(keys::OLLAMA_BASE_URL, "http://localhost:11434")
            .with(keys::OPENAI_API_KEY, "sk-test");
        assert_eq!(
            models().derive_catalog(&config),
            vec!["llama3.1:8b", "qwen2.5:14b", "gpt-4o"]
        );
    }

    #[test]
    fn test_placeholder_key_drops_secondary() {
        let config = ProviderConfig::new()
            .with(keys::OLLAMA_BASE_URL, "http://localhost:11434")
            .with(keys::OPENAI_API_KEY, PLACEHOLDER_CREDENTIAL);
        assert_eq!(models().derive_catalog(&config), vec!["llama3.1:8b", "qwen2.5:14b"]);
    }

    #[test]
    fn test_unconfigured_yields_empty() {
        assert!(models().derive_catalog(&ProviderConfig::new()).is_empty());
    }
}
