//! Snapshot - the unified in-memory settings state

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::templates::mark_default;
use crate::{
    Domain, LetterTemplate, ModelOptions, OptionCategory, OptionField, ProfileField, PromptField,
    PromptSet, ProviderConfig, ProviderModels, Result, ScribeError, Service, TemplateMap,
    UserProfile,
};

/// Reachability per service; services never checked have no entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointHealth(BTreeMap<Service, bool>);

impl EndpointHealth {
    pub fn get(&self, service: Service) -> Option<bool> {
        self.0.get(&service).copied()
    }

    pub fn set(&mut self, service: Service, healthy: bool) {
        self.0.insert(service, healthy);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub profile: UserProfile,
    /// `None` until the first load completes
    pub prompts: Option<PromptSet>,
    pub options: ModelOptions,
    pub templates: TemplateMap,
    pub letter_templates: Vec<LetterTemplate>,
    pub config: ProviderConfig,
    pub model_catalog: Vec<String>,
    pub transcription_models: Vec<String>,
    pub endpoint_health: EndpointHealth,
    pub provider_models: ProviderModels,
    /// Domains fetched successfully at least once
    #[serde(skip)]
    pub loaded: BTreeSet<Domain>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.prompts.is_some()
    }

    pub fn has_loaded(&self, domain: Domain) -> bool {
        self.loaded.contains(&domain)
    }

    pub fn mark_loaded(&mut self, domain: Domain) {
        self.loaded.insert(domain);
    }

    fn ensure_loaded(&self) -> Result<()> {
        match self.is_loaded() {
            true => Ok(()),
            false => Err(ScribeError::NotLoaded),
        }
    }

    pub fn refresh_catalog(&mut self) {
        self.model_catalog = self.provider_models.derive_catalog(&self.config);
    }

    /// Replace the letter list, keeping the default flag and the profile's
    /// default id consistent with each other
    pub fn apply_letter_templates(
        &mut self,
        mut templates: Vec<LetterTemplate>,
        default_id: Option<i64>,
    ) {
        mark_default(&mut templates, default_id);
        self.letter_templates = templates;
        self.profile.default_letter_template_id = default_id;
    }

    // --- Mutators ---

    pub fn set_profile_field(&mut self, field: ProfileField) -> Result<()> {
        self.ensure_loaded()?;
        if let ProfileField::DefaultTemplate(Some(key)) = &field {
            if !self.templates.contains_key(key) {
                return Err(ScribeError::InvalidValue(format!("Unknown template: {}", key)));
            }
        }
        self.profile.apply(field)
    }

    pub fn set_option(&mut self, category: OptionCategory, field: OptionField) -> Result<()> {
        self.ensure_loaded()?;
        self.options.category_mut(category).apply(field);
        Ok(())
    }

    pub fn set_config_field(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.ensure_loaded()?;
        self.config.set(key, value);
        self.refresh_catalog();
        Ok(())
    }

    pub fn set_prompt_field(
        &mut self,
        prompt: &str,
        field: PromptField,
        value: String,
    ) -> Result<()> {
        let prompts = self.prompts.as_mut().ok_or(ScribeError::NotLoaded)?;
        let entry = prompts
            .get_mut(prompt)
            .ok_or_else(|| ScribeError::InvalidValue(format!("Unknown prompt: {}", prompt)))?;
        entry.apply(field, value);
        Ok(())
    }

    pub fn set_default_letter_template(&mut self, id: Option<i64>) -> Result<()> {
        self.ensure_loaded()?;
        if let Some(id) = id {
            if !self.letter_templates.iter().any(|t| t.id == id) {
                return Err(ScribeError::InvalidValue(format!(
                    "Unknown letter template: {}",
                    id
                )));
            }
        }
        mark_default(&mut self.letter_templates, id);
        self.profile.default_letter_template_id = id;
        Ok(())
    }
}
