//! The recognition-model seam.
//!
//! Extraction treats the model as a black box behind [`EntityModel`]. Two
//! implementations ship here: [`RuleModel`], driven entirely by the lexicon,
//! and [`GazetteerModel`], a versioned phrase list loaded from disk.

pub mod gazetteer;
pub mod rule;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use nadthai_lexicon::Lexicon;
use nadthai_schema::Entity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gazetteer::{GazetteerArtifact, GazetteerEntry, GazetteerModel};
pub use rule::{RuleModel, RULE_MODEL_ID};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model '{model_id}' is unavailable: {reason}")]
    Unavailable { model_id: String, reason: String },
}

impl ModelError {
    pub fn unavailable(model_id: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::Unavailable {
            model_id: model_id.into(),
            reason: reason.into(),
        }
    }
}

/// A sequence labeller over normalized span text.
///
/// Returned offsets are byte offsets into `text`. Returning an empty list is
/// a normal outcome; an `Err` means the model could not be invoked at all.
pub trait EntityModel: Send + Sync {
    fn model_id(&self) -> &str;

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn predict(&self, text: &str) -> Result<Vec<Entity>, ModelError>;

    fn health(&self) -> Result<(), ModelError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    #[default]
    Rules,
    Gazetteer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ModelConfig {
    #[serde(rename = "type", default)]
    pub model_type: ModelType,
    /// Artifact location; `${VAR}` references are expanded by the config loader.
    #[serde(default)]
    pub path: Option<String>,
}

impl ModelConfig {
    pub fn new(model_type: ModelType) -> Self {
        Self {
            model_type,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

pub fn create_model(config: &ModelConfig, lexicon: Arc<Lexicon>) -> Result<Arc<dyn EntityModel>> {
    let model: Arc<dyn EntityModel> = match config.model_type {
        ModelType::Rules => Arc::new(RuleModel::new(lexicon)),
        ModelType::Gazetteer => {
            let path = config
                .path
                .as_deref()
                .ok_or_else(|| anyhow!("gazetteer model requires path"))?;
            Arc::new(GazetteerModel::load(Path::new(path))?)
        }
    };
    tracing::info!(
        model_id = model.model_id(),
        version = model.version(),
        "recognition model ready"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_config_defaults_to_rules() {
        let config: ModelConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ModelConfig::new(ModelType::Rules));

        let config: ModelConfig =
            serde_yaml::from_str("type: gazetteer\npath: /models/th.yaml\n").unwrap();
        assert_eq!(
            config,
            ModelConfig::new(ModelType::Gazetteer).with_path("/models/th.yaml")
        );
    }

    #[test]
    fn gazetteer_without_path_is_rejected() {
        let lexicon = Arc::new(Lexicon::builtin().unwrap());
        let err = create_model(&ModelConfig::new(ModelType::Gazetteer), lexicon)
            .err()
            .unwrap();
        assert!(err.to_string().contains("requires path"));
    }

    #[test]
    fn rules_model_is_created() {
        let lexicon = Arc::new(Lexicon::builtin().unwrap());
        let model = create_model(&ModelConfig::default(), lexicon).unwrap();
        assert_eq!(model.model_id(), RULE_MODEL_ID);
        assert!(model.health().is_ok());
    }

    #[test]
    fn unavailable_error_message() {
        let err = ModelError::unavailable("th-ner", "weights missing");
        assert_eq!(err.to_string(), "model 'th-ner' is unavailable: weights missing");
    }
}
