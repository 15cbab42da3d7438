mod controller;
mod gateway;
mod http_gateway;
mod notifier;
mod services;
mod validator;

pub use controller::SettingsController;
pub use gateway::SettingsGateway;
pub use http_gateway::{is_chat_model, HttpSettingsGateway};
pub use notifier::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use services::Services;
pub use validator::{changed_services, EndpointValidator};

// Re-export core types so callers only import from services
pub use scribe_core::{
    config_keys, ClientConfig, ClinicalTemplate, Domain, DomainFailure, EndpointHealth,
    LetterTemplate, LetterTemplateList, LlmProvider, ModelOptions, OptionCategory, OptionField,
    ProfileField, PromptEntry, PromptField, PromptSet, ProviderConfig, QuickChat, Result,
    ScribeError, Service, Snapshot, UserProfile, PLACEHOLDER_CREDENTIAL,
};
