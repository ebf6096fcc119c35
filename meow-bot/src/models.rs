//! Selectable models: the labels shown on the /setmodel keyboard and the API ids they map to.

use dbot_core::{DbotError, Result};
use std::env;

/// One selectable model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOption {
    pub label: String,
    pub id: String,
}

impl ModelOption {
    pub fn new(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
        }
    }
}

/// Ordered, fixed list of models; loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRegistry {
    models: Vec<ModelOption>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self {
            models: vec![
                ModelOption::new("GPT-4o", "gpt-4o"),
                ModelOption::new("GPT-4o mini", "gpt-4o-mini"),
                ModelOption::new("GPT-4 Turbo", "gpt-4-turbo"),
                ModelOption::new("GPT-3.5 Turbo", "gpt-3.5-turbo"),
            ],
        }
    }
}

impl ModelRegistry {
    /// Builds a registry from explicit options. Labels must be unique and non-empty.
    pub fn new(models: Vec<ModelOption>) -> Result<Self> {
        if models.is_empty() {
            return Err(DbotError::Config("model list is empty".to_string()));
        }
        for (i, m) in models.iter().enumerate() {
            if m.label.is_empty() || m.id.is_empty() {
                return Err(DbotError::Config(format!(
                    "model entry {} has an empty label or id",
                    i + 1
                )));
            }
            if models[..i].iter().any(|prev| prev.label == m.label) {
                return Err(DbotError::Config(format!("duplicate model label: {}", m.label)));
            }
        }
        Ok(Self { models })
    }

    /// Parses `Label=model-id` pairs separated by commas, e.g. `GPT-4o=gpt-4o, Mini=gpt-4o-mini`.
    pub fn parse(spec: &str) -> Result<Self> {
        let models = spec
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .split_once('=')
                    .map(|(label, id)| ModelOption::new(label.trim(), id.trim()))
                    .ok_or_else(|| {
                        DbotError::Config(format!("model entry must be Label=model-id: {}", entry))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(models)
    }

    /// Uses `MODELS` when set, otherwise the built-in list.
    pub fn from_env() -> Result<Self> {
        match env::var("MODELS") {
            Ok(spec) if !spec.trim().is_empty() => Self::parse(&spec),
            _ => Ok(Self::default()),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.models.iter().map(|m| m.label.clone()).collect()
    }

    /// Finds the option whose label is exactly `label`.
    pub fn resolve(&self, label: &str) -> Option<&ModelOption> {
        self.models.iter().find(|m| m.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelOption> {
        self.models.iter()
    }
}
