use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Editable fields of one prompt domain (summary, refinement, letter, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptEntry {
    #[serde(default)]
    pub system: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptField {
    System,
    Initial,
}

impl PromptEntry {
    pub fn apply(&mut self, field: PromptField, value: String) {
        match field {
            PromptField::System => self.system = value,
            PromptField::Initial => self.initial = Some(value),
        }
    }
}

pub type PromptSet = BTreeMap<String, PromptEntry>;
