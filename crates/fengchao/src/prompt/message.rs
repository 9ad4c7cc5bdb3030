//! Chat messages and role-tagged templates.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PromptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    #[default]
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{-?\s*\.([A-Za-z_][A-Za-z0-9_]*)\s*-?\}\}").unwrap());

/// A role plus a template string with `{{.Name}}` placeholders.
///
/// Placeholders resolve against the top-level keys of a JSON object. Missing
/// keys and `null` render as empty strings; strings render raw; any other
/// value renders as compact JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    role: Role,
    template: String,
}

impl MessageTemplate {
    /// Parse a template, rejecting unbalanced `{{` / `}}` delimiters.
    pub fn parse(role: Role, template: impl Into<String>) -> Result<Self, PromptError> {
        let template = template.into();
        let opens = template.matches("{{").count();
        let closes = template.matches("}}").count();
        if opens != closes {
            return Err(PromptError::Template(format!(
                "unbalanced delimiters in {role} template: {opens} '{{{{' vs {closes} '}}}}'"
            )));
        }
        Ok(Self { role, template })
    }

    pub fn system(template: impl Into<String>) -> Result<Self, PromptError> {
        Self::parse(Role::System, template)
    }

    pub fn user(template: impl Into<String>) -> Result<Self, PromptError> {
        Self::parse(Role::User, template)
    }

    pub fn assistant(template: impl Into<String>) -> Result<Self, PromptError> {
        Self::parse(Role::Assistant, template)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Names referenced by the template, in first-use order.
    pub fn variables(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        PLACEHOLDER_RE
            .captures_iter(&self.template)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .filter(|name| seen.insert(*name))
            .collect()
    }

    pub fn render(&self, variables: &Value) -> Message {
        let content = PLACEHOLDER_RE.replace_all(&self.template, |caps: &Captures<'_>| {
            match variables.get(&caps[1]) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            }
        });
        Message::new(self.role, content)
    }
}
