use serde::{Deserialize, Serialize};

use crate::{Result, ScribeError};

pub const QUICK_CHAT_COUNT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickChat {
    pub title: String,
    pub prompt: String,
}

impl QuickChat {
    pub fn new(title: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            prompt: prompt.into(),
        }
    }
}

/// User profile and chat quick-actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub quick_chats: [QuickChat; QUICK_CHAT_COUNT],
    #[serde(default)]
    pub default_template: Option<String>,
    #[serde(default)]
    pub default_letter_template_id: Option<i64>,
}

/// A single editable profile field
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileField {
    Name(String),
    Specialty(String),
    QuickChatTitle(usize, String),
    QuickChatPrompt(usize, String),
    DefaultTemplate(Option<String>),
}

impl UserProfile {
    /// Apply a field edit. The default letter template is owned by the
    /// letter template list and is set through the controller instead.
    pub fn apply(&mut self, field: ProfileField) -> Result<()> {
        match field {
            ProfileField::Name(name) => self.name = name,
            ProfileField::Specialty(specialty) => self.specialty = specialty,
            ProfileField::QuickChatTitle(index, title) => self.quick_chat_mut(index)?.title = title,
            ProfileField::QuickChatPrompt(index, prompt) => {
                self.quick_chat_mut(index)?.prompt = prompt
            }
            ProfileField::DefaultTemplate(key) => self.default_template = key,
        }
        Ok(())
    }

    fn quick_chat_mut(&mut self, index: usize) -> Result<&mut QuickChat> {
        self.quick_chats.get_mut(index).ok_or_else(|| {
            ScribeError::InvalidValue(format!(
                "Quick chat index {} out of range (0-{})",
                index,
                QUICK_CHAT_COUNT - 1
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_quick_chat_fields() {
        let mut profile = UserProfile::default();
        profile
            .apply(ProfileField::QuickChatTitle(2, "Plan".into()))
            .unwrap();
        profile
            .apply(ProfileField::QuickChatPrompt(2, "Summarise the plan".into()))
            .unwrap();
        assert_eq!(profile.quick_chats[2], QuickChat::new("Plan", "Summarise the plan"));
    }

    #[test]
    fn test_quick_chat_index_out_of_range() {
        let mut profile = UserProfile::default();
        let err = profile
            .apply(ProfileField::QuickChatTitle(3, "Nope".into()))
            .unwrap_err();
        assert!(matches!(err, ScribeError::InvalidValue(_)));
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let profile: UserProfile = serde_json::from_str(r#"{"name": "Dr Lee"}"#).unwrap();
        assert_eq!(profile.name, "Dr Lee");
        assert!(profile.default_template.is_none());
        assert_eq!(profile.quick_chats[0], QuickChat::default());
    }
}
