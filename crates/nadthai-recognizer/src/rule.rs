use std::sync::Arc;

use nadthai_lexicon::{LexHit, Lexicon};
use nadthai_schema::{Entity, EntityCategory, EntitySource};

use crate::{EntityModel, ModelError};

pub const RULE_MODEL_ID: &str = "rules";

const RULE_CONFIDENCE: f32 = 0.5;

/// Lexicon-driven recognizer. It cannot fail, which makes it usable both as a
/// full replacement for a trained model and as the per-category fallback.
#[derive(Debug, Clone)]
pub struct RuleModel {
    lexicon: Arc<Lexicon>,
}

impl RuleModel {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Entities of the requested categories, ordered by position.
    pub fn recognize(&self, text: &str, categories: &[EntityCategory]) -> Vec<Entity> {
        let wants = |category: EntityCategory| categories.contains(&category);
        let mut hits: Vec<LexHit> = Vec::new();

        if categories.iter().any(|c| c.is_temporal()) {
            hits.extend(
                self.lexicon
                    .temporal_hits(text)
                    .into_iter()
                    .filter(|hit| wants(hit.category)),
            );
        }
        if wants(EntityCategory::Person) {
            hits.extend(self.lexicon.person_hits(text));
        }
        let locations = if wants(EntityCategory::Location) {
            self.lexicon.location_hits(text)
        } else {
            Vec::new()
        };
        if wants(EntityCategory::Activity) {
            // `ประชุม` inside `ห้องประชุม` names the room, not the activity.
            hits.extend(self.lexicon.activity_hits(text).into_iter().filter(|activity| {
                !locations
                    .iter()
                    .any(|place| place.start <= activity.start && activity.end <= place.end)
            }));
        }
        hits.extend(locations);

        hits.sort_by_key(|hit| (hit.start, hit.category));
        hits.into_iter().map(|hit| to_entity(text, hit)).collect()
    }
}

impl EntityModel for RuleModel {
    fn model_id(&self) -> &str {
        RULE_MODEL_ID
    }

    fn predict(&self, text: &str) -> Result<Vec<Entity>, ModelError> {
        Ok(self.recognize(text, &EntityCategory::ALL))
    }
}

fn to_entity(text: &str, hit: LexHit) -> Entity {
    Entity {
        category: hit.category,
        text: hit.text(text).to_string(),
        start: hit.start,
        end: hit.end,
        confidence: RULE_CONFIDENCE,
        source: EntitySource::Rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> RuleModel {
        RuleModel::new(Arc::new(Lexicon::builtin().unwrap()))
    }

    fn labels(entities: &[Entity]) -> Vec<(EntityCategory, &str)> {
        entities
            .iter()
            .map(|e| (e.category, e.text.as_str()))
            .collect()
    }

    #[test]
    fn labels_every_category() {
        let text = "ประชุมกับอาจารย์สมชายพรุ่งนี้ 10 โมงที่ห้อง 301";
        let entities = model().predict(text).unwrap();
        assert_eq!(
            labels(&entities),
            vec![
                (EntityCategory::Activity, "ประชุม"),
                (EntityCategory::Person, "อาจารย์สมชาย"),
                (EntityCategory::Date, "พรุ่งนี้"),
                (EntityCategory::Time, "10 โมง"),
                (EntityCategory::Location, "ห้อง 301"),
            ]
        );
        assert!(entities.iter().all(|e| e.source == EntitySource::Rule));
        for entity in &entities {
            assert_eq!(&text[entity.start..entity.end], entity.text);
        }
    }

    #[test]
    fn restricted_to_requested_categories() {
        let entities = model().recognize(
            "ประชุมพรุ่งนี้บ่ายสอง",
            &[EntityCategory::Date, EntityCategory::Time],
        );
        assert_eq!(
            labels(&entities),
            vec![
                (EntityCategory::Date, "พรุ่งนี้"),
                (EntityCategory::Time, "บ่ายสอง"),
            ]
        );
    }

    #[test]
    fn room_name_is_not_an_activity() {
        let entities = model().predict("ไปห้องประชุม").unwrap();
        assert_eq!(labels(&entities), vec![(EntityCategory::Location, "ห้องประชุม")]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(model().predict("").unwrap().is_empty());
    }
}
