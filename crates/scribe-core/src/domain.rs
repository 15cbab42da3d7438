use std::fmt;

use serde::{Deserialize, Serialize};

/// An independently fetchable or savable slice of settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Config,
    Profile,
    Prompts,
    Options,
    Templates,
    DefaultTemplate,
    LetterTemplates,
    OllamaModels,
    OpenAiModels,
    WhisperModels,
    Reset,
    ClearDatabase,
}

impl Domain {
    pub fn label(&self) -> &'static str {
        match self {
            Domain::Config => "configuration",
            Domain::Profile => "user settings",
            Domain::Prompts => "prompts",
            Domain::Options => "model options",
            Domain::Templates => "templates",
            Domain::DefaultTemplate => "default template",
            Domain::LetterTemplates => "letter templates",
            Domain::OllamaModels => "Ollama models",
            Domain::OpenAiModels => "OpenAI models",
            Domain::WhisperModels => "Whisper models",
            Domain::Reset => "reset",
            Domain::ClearDatabase => "clear database",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A non-fatal failure of one domain during a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFailure {
    pub domain: Domain,
    pub message: String,
}

impl DomainFailure {
    pub fn new(domain: Domain, message: impl ToString) -> Self {
        Self {
            domain,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for DomainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.domain, self.message)
    }
}
