// Domain modules
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod options;
pub mod profile;
pub mod prompts;
pub mod provider;
pub mod snapshot;
pub mod templates;

pub use catalog::ProviderModels;
pub use config::ClientConfig;
pub use domain::{Domain, DomainFailure};
pub use error::{Result, ScribeError};
pub use options::{GenerationOptions, ModelOptions, OptionCategory, OptionField};
pub use profile::{ProfileField, QuickChat, UserProfile, QUICK_CHAT_COUNT};
pub use prompts::{PromptEntry, PromptField, PromptSet};
pub use provider::{
    keys as config_keys, LlmProvider, ProviderConfig, Service, PLACEHOLDER_CREDENTIAL,
};
pub use snapshot::{EndpointHealth, Snapshot};
pub use templates::{
    index_templates, ClinicalTemplate, LetterTemplate, LetterTemplateList, TemplateMap,
};
