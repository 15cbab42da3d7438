use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A note template as stored by the template service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalTemplate {
    pub template_key: String,
    #[serde(default)]
    pub template_name: String,
    #[serde(default)]
    pub fields: Vec<Value>,
}

pub type TemplateMap = BTreeMap<String, ClinicalTemplate>;

pub fn index_templates(templates: Vec<ClinicalTemplate>) -> TemplateMap {
    templates
        .into_iter()
        .map(|t| (t.template_key.clone(), t))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterTemplate {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Letter template listing as returned by the template service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LetterTemplateList {
    #[serde(default)]
    pub templates: Vec<LetterTemplate>,
    #[serde(default)]
    pub default_template_id: Option<i64>,
}

impl LetterTemplateList {
    /// Resolve the effective default id. An explicit id wins over a flagged
    /// entry; ids that do not exist in the list resolve to `None`.
    pub fn resolved_default(&self) -> Option<i64> {
        let candidate = self
            .default_template_id
            .or_else(|| self.templates.iter().find(|t| t.is_default).map(|t| t.id))?;
        self.templates
            .iter()
            .any(|t| t.id == candidate)
            .then_some(candidate)
    }
}

/// Flag exactly the entry matching `default_id` and clear every other flag
pub fn mark_default(templates: &mut [LetterTemplate], default_id: Option<i64>) {
    for template in templates.iter_mut() {
        template.is_default = Some(template.id) == default_id;
    }
}
