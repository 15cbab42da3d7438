use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionCategory {
    General,
    Secondary,
    Letter,
    Reasoning,
}

impl OptionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            OptionCategory::General => "General",
            OptionCategory::Secondary => "Secondary",
            OptionCategory::Letter => "Letter",
            OptionCategory::Reasoning => "Reasoning",
        }
    }

    pub fn all() -> &'static [OptionCategory] {
        &[
            OptionCategory::General,
            OptionCategory::Secondary,
            OptionCategory::Letter,
            OptionCategory::Reasoning,
        ]
    }
}

/// Generation tunables for one model category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Provider-specific tunables passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionField {
    ContextWindow(u32),
    Temperature(f32),
    Custom(String, Value),
}

impl GenerationOptions {
    pub fn apply(&mut self, field: OptionField) {
        match field {
            OptionField::ContextWindow(num_ctx) => self.num_ctx = Some(num_ctx),
            OptionField::Temperature(temperature) => self.temperature = Some(temperature),
            OptionField::Custom(key, value) => {
                self.extra.insert(key, value);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    #[serde(default)]
    pub general: GenerationOptions,
    #[serde(default)]
    pub secondary: GenerationOptions,
    #[serde(default)]
    pub letter: GenerationOptions,
    #[serde(default)]
    pub reasoning: GenerationOptions,
}

impl ModelOptions {
    pub fn category(&self, category: OptionCategory) -> &GenerationOptions {
        match category {
            OptionCategory::General => &self.general,
            OptionCategory::Secondary => &self.secondary,
            OptionCategory::Letter => &self.letter,
            OptionCategory::Reasoning => &self.reasoning,
        }
    }

    pub fn category_mut(&mut self, category: OptionCategory) -> &mut GenerationOptions {
        match category {
            OptionCategory::General => &mut self.general,
            OptionCategory::Secondary => &mut self.secondary,
            OptionCategory::Letter => &mut self.letter,
            OptionCategory::Reasoning => &mut self.reasoning,
        }
    }
}
