use std::sync::Arc;

use nadthai_lexicon::Lexicon;
use nadthai_recognizer::{EntityModel, ModelError, RuleModel, RULE_MODEL_ID};
use nadthai_schema::{CandidateSpan, Entity, EntityCategory};

use crate::config::RecognizerConfig;

/// Runs the model over a span and tops it up with rule entities for the
/// fallback categories. Offsets in the output are relative to the normalized
/// message, not the span.
pub struct Recognizer {
    model: Arc<dyn EntityModel>,
    rules: RuleModel,
    fallback: Vec<EntityCategory>,
    min_confidence: f32,
}

impl Recognizer {
    pub fn new(model: Arc<dyn EntityModel>, lexicon: Arc<Lexicon>, config: &RecognizerConfig) -> Self {
        Self {
            model,
            rules: RuleModel::new(lexicon),
            fallback: config.fallback_categories.clone(),
            min_confidence: config.min_confidence,
        }
    }

    pub fn model(&self) -> &dyn EntityModel {
        self.model.as_ref()
    }

    pub fn recognize(&self, span: &CandidateSpan) -> Result<Vec<Entity>, ModelError> {
        let predicted = self.model.predict(&span.text)?;
        let mut entities = self.sanitize(span, predicted);

        if self.model.model_id() != RULE_MODEL_ID && !self.fallback.is_empty() {
            let mut added = 0;
            for rule in self.rules.recognize(&span.text, &self.fallback) {
                let rule = shift(rule, span.start);
                let claimed = entities
                    .iter()
                    .any(|e| e.category == rule.category && e.overlaps(&rule));
                if !claimed {
                    entities.push(rule);
                    added += 1;
                }
            }
            tracing::debug!(added, "rule fallback entities");
        }

        entities.sort_by_key(|e| (e.start, e.category));
        Ok(entities)
    }

    /// Drop malformed or low-confidence predictions, remove same-category
    /// overlaps and join token runs that touch.
    fn sanitize(&self, span: &CandidateSpan, predicted: Vec<Entity>) -> Vec<Entity> {
        let text = span.text.as_str();
        let mut valid: Vec<Entity> = predicted
            .into_iter()
            .filter(|e| {
                let ok = e.start < e.end
                    && e.end <= text.len()
                    && text.is_char_boundary(e.start)
                    && text.is_char_boundary(e.end);
                if !ok {
                    tracing::warn!(
                        model_id = self.model.model_id(),
                        start = e.start,
                        end = e.end,
                        "dropping entity with invalid offsets"
                    );
                }
                ok && e.confidence >= self.min_confidence
            })
            .map(|mut e| {
                e.text = text[e.start..e.end].to_string();
                e
            })
            .collect();

        valid.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then(a.start.cmp(&b.start))
                .then(b.end.cmp(&a.end))
        });

        let mut kept: Vec<Entity> = Vec::with_capacity(valid.len());
        for entity in valid {
            if let Some(last) = kept.last_mut() {
                if last.category == entity.category {
                    if entity.start < last.end {
                        continue;
                    }
                    if entity.start == last.end {
                        last.end = entity.end;
                        last.text = text[last.start..last.end].to_string();
                        last.confidence = last.confidence.min(entity.confidence);
                        continue;
                    }
                }
            }
            kept.push(entity);
        }

        kept.into_iter().map(|e| shift(e, span.start)).collect()
    }
}

fn shift(mut entity: Entity, offset: usize) -> Entity {
    entity.start += offset;
    entity.end += offset;
    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use nadthai_schema::EntitySource;

    struct FixedModel(Vec<Entity>);

    impl EntityModel for FixedModel {
        fn model_id(&self) -> &str {
            "fixed"
        }

        fn predict(&self, _text: &str) -> Result<Vec<Entity>, ModelError> {
            Ok(self.0.clone())
        }
    }

    fn entity(category: EntityCategory, start: usize, end: usize, confidence: f32) -> Entity {
        Entity {
            category,
            text: String::new(),
            start,
            end,
            confidence,
            source: EntitySource::Model,
        }
    }

    fn recognizer(model: Vec<Entity>, config: RecognizerConfig) -> Recognizer {
        Recognizer::new(
            Arc::new(FixedModel(model)),
            Arc::new(Lexicon::builtin().unwrap()),
            &config,
        )
    }

    #[test]
    fn offsets_are_shifted_to_message() {
        let span = CandidateSpan::new("ประชุม", 10);
        let r = recognizer(
            vec![entity(EntityCategory::Activity, 0, "ประชุม".len(), 0.9)],
            RecognizerConfig::default(),
        );
        let entities = r.recognize(&span).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].start, 10);
        assert_eq!(entities[0].text, "ประชุม");
        assert_eq!(entities[0].confidence, 0.9);
    }

    #[test]
    fn touching_tokens_merge_and_overlaps_drop() {
        let span = CandidateSpan::new("ส่งเอกสาร", 0);
        let split = "ส่ง".len();
        let r = recognizer(
            vec![
                entity(EntityCategory::Activity, 0, split, 0.9),
                entity(EntityCategory::Activity, split, span.text.len(), 0.7),
                entity(EntityCategory::Activity, 0, 3, 0.99),
            ],
            RecognizerConfig {
                fallback_categories: Vec::new(),
                ..RecognizerConfig::default()
            },
        );
        let entities = r.recognize(&span).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "ส่งเอกสาร");
        assert_eq!(entities[0].confidence, 0.7);
    }

    #[test]
    fn invalid_offsets_are_dropped() {
        let span = CandidateSpan::new("ประชุม", 0);
        let r = recognizer(
            vec![
                entity(EntityCategory::Activity, 0, 100, 0.9),
                entity(EntityCategory::Activity, 1, 2, 0.9),
            ],
            RecognizerConfig::default(),
        );
        assert!(r.recognize(&span).unwrap().is_empty());
    }

    #[test]
    fn rule_fallback_fills_missing_temporal() {
        let span = CandidateSpan::new("ประชุมพรุ่งนี้", 0);
        let r = recognizer(
            vec![entity(EntityCategory::Activity, 0, "ประชุม".len(), 0.9)],
            RecognizerConfig::default(),
        );
        let entities = r.recognize(&span).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].category, EntityCategory::Date);
        assert_eq!(entities[1].source, EntitySource::Rule);
    }

    #[test]
    fn model_wins_over_rule_on_same_region() {
        let span = CandidateSpan::new("พรุ่งนี้", 0);
        let r = recognizer(
            vec![entity(EntityCategory::Date, 0, span.text.len(), 0.8)],
            RecognizerConfig::default(),
        );
        let entities = r.recognize(&span).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].source, EntitySource::Model);
    }

    #[test]
    fn low_confidence_predictions_are_ignored() {
        let span = CandidateSpan::new("ประชุม", 0);
        let r = recognizer(
            vec![entity(EntityCategory::Activity, 0, span.text.len(), 0.2)],
            RecognizerConfig {
                min_confidence: 0.5,
                ..RecognizerConfig::default()
            },
        );
        assert!(r.recognize(&span).unwrap().is_empty());
    }
}
