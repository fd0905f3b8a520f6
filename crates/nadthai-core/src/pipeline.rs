use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDateTime, NaiveTime};
use nadthai_lexicon::Lexicon;
use nadthai_recognizer::{create_model, EntityModel, ModelError, RuleModel};
use nadthai_schema::{Entity, EntityCategory, Message, ValidationResult};
use thiserror::Error;

use crate::assembler::assemble;
use crate::config::{NadthaiConfig, PipelineConfig};
use crate::normalizer::normalize;
use crate::recognizer::Recognizer;
use crate::segmenter::Segmenter;
use crate::temporal::TemporalResolver;
use crate::validator::Validator;

/// Time applied through `Event::with_default_time` when the caller asks for
/// defaults to be filled.
pub fn default_event_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The recognition model could not be invoked at all. A model that runs
    /// and finds nothing is not an error.
    #[error("extraction unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),
}

/// The whole message-to-events pipeline. Holds only read-only state, so one
/// extractor can serve any number of messages, from any thread.
pub struct Extractor {
    segmenter: Segmenter,
    recognizer: Recognizer,
    resolver: TemporalResolver,
    validator: Validator,
}

impl Extractor {
    pub fn new(config: &PipelineConfig, lexicon: Arc<Lexicon>, model: Arc<dyn EntityModel>) -> Result<Self> {
        Ok(Self {
            segmenter: Segmenter::new(lexicon.clone()),
            recognizer: Recognizer::new(model, lexicon.clone(), &config.recognizer),
            resolver: TemporalResolver::new(lexicon, config.resolver.clone())?,
            validator: Validator::new(config.validator.clone()),
        })
    }

    /// Built-in table, rule model, default policies.
    pub fn with_defaults() -> Result<Self> {
        let lexicon = Arc::new(Lexicon::builtin()?);
        let model: Arc<dyn EntityModel> = Arc::new(RuleModel::new(lexicon.clone()));
        Self::new(&PipelineConfig::default(), lexicon, model)
    }

    pub fn from_config(config: &NadthaiConfig) -> Result<Self> {
        let lexicon = Arc::new(Lexicon::with_overlays(config.lexicon_overlays.iter().cloned())?);
        let model = create_model(&config.pipeline.recognizer.model, lexicon.clone())?;
        Self::new(&config.pipeline, lexicon, model)
    }

    pub fn model(&self) -> &dyn EntityModel {
        self.recognizer.model()
    }

    /// Extract events from `text`, resolving relative dates against
    /// `reference`. Results follow the left-to-right order of the message.
    pub fn extract_events(&self, text: &str, reference: NaiveDateTime) -> Result<Vec<ValidationResult>, ExtractError> {
        self.extract(&Message::new(text, reference))
    }

    pub fn extract(&self, message: &Message) -> Result<Vec<ValidationResult>, ExtractError> {
        let normalized = normalize(&message.text);
        if normalized.is_empty() {
            tracing::debug!("empty message after normalization");
            return Ok(Vec::new());
        }

        let spans = self.segmenter.segment(&normalized);
        let mut results = Vec::with_capacity(spans.len());
        for span in &spans {
            let entities = self.recognizer.recognize(span)?;
            tracing::debug!(span = %span.text, entities = entities.len(), "recognized span");

            let dates = of_category(&entities, EntityCategory::Date);
            let times = of_category(&entities, EntityCategory::Time);
            let temporal = self.resolver.resolve(&dates, &times, message.reference);
            if !temporal.discarded.is_empty() {
                tracing::warn!(
                    span = %span.text,
                    discarded = temporal.discarded.len(),
                    "extra temporal entities discarded"
                );
            }

            match assemble(span, &entities, temporal) {
                Some(event) => results.push(self.validator.validate(event, message.reference_date())),
                None => tracing::warn!(span = %span.text, "dropping span without activity or date/time"),
            }
        }

        tracing::info!(
            model_id = self.recognizer.model().model_id(),
            spans = spans.len(),
            events = results.len(),
            accepted = results.iter().filter(|r| r.is_accepted()).count(),
            "extraction finished"
        );
        Ok(results)
    }
}

fn of_category(entities: &[Entity], category: EntityCategory) -> Vec<Entity> {
    entities.iter().filter(|e| e.category == category).cloned().collect()
}
