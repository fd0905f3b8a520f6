use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use nadthai_lexicon::at_boundary;
use nadthai_schema::{Entity, EntityCategory, EntitySource};
use serde::{Deserialize, Serialize};

use crate::{EntityModel, ModelError};

fn default_confidence() -> f32 {
    0.9
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazetteerEntry {
    pub phrase: String,
    pub category: EntityCategory,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

/// On-disk form of a gazetteer model, YAML or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazetteerArtifact {
    pub model_id: String,
    pub version: String,
    #[serde(default)]
    pub entries: Vec<GazetteerEntry>,
}

/// Labels known phrases, longest first, with per-entry confidence.
#[derive(Debug, Clone)]
pub struct GazetteerModel {
    model_id: String,
    version: String,
    entries: Vec<GazetteerEntry>,
}

impl GazetteerModel {
    pub fn from_artifact(artifact: GazetteerArtifact) -> Result<Self> {
        if artifact.model_id.trim().is_empty() {
            bail!("gazetteer artifact has an empty model_id");
        }
        let mut entries = Vec::with_capacity(artifact.entries.len());
        for entry in artifact.entries {
            let phrase = entry.phrase.trim().to_lowercase();
            if phrase.is_empty() {
                bail!("gazetteer '{}' contains an empty phrase", artifact.model_id);
            }
            if !(0.0..=1.0).contains(&entry.confidence) {
                bail!(
                    "gazetteer '{}' entry '{}' has confidence {} outside 0..=1",
                    artifact.model_id,
                    phrase,
                    entry.confidence
                );
            }
            entries.push(GazetteerEntry { phrase, ..entry });
        }
        entries.sort_by(|a, b| b.phrase.chars().count().cmp(&a.phrase.chars().count()));

        Ok(Self {
            model_id: artifact.model_id,
            version: artifact.version,
            entries,
        })
    }

    /// Load an artifact; `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read model artifact: {}", path.display()))?;
        let artifact: GazetteerArtifact =
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                serde_json::from_str(&content)
                    .with_context(|| format!("failed to parse json artifact: {}", path.display()))?
            } else {
                serde_yaml::from_str(&content)
                    .with_context(|| format!("failed to parse yaml artifact: {}", path.display()))?
            };
        let model = Self::from_artifact(artifact)?;
        tracing::debug!(
            model_id = %model.model_id,
            version = %model.version,
            entries = model.entries.len(),
            path = %path.display(),
            "gazetteer loaded"
        );
        Ok(model)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntityModel for GazetteerModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn predict(&self, text: &str) -> Result<Vec<Entity>, ModelError> {
        self.health()?;

        let mut found: Vec<Entity> = Vec::new();
        for entry in &self.entries {
            for (start, matched) in text.match_indices(entry.phrase.as_str()) {
                let end = start + matched.len();
                let taken = found
                    .iter()
                    .any(|e| e.category == entry.category && e.start < end && start < e.end);
                if taken || !at_boundary(text, start, end) {
                    continue;
                }
                found.push(Entity {
                    category: entry.category,
                    text: matched.to_string(),
                    start,
                    end,
                    confidence: entry.confidence,
                    source: EntitySource::Model,
                });
            }
        }
        found.sort_by_key(|e| (e.start, e.category));
        Ok(found)
    }

    fn health(&self) -> Result<(), ModelError> {
        if self.entries.is_empty() {
            return Err(ModelError::unavailable(
                &self.model_id,
                "artifact contains no entries",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> GazetteerArtifact {
        GazetteerArtifact {
            model_id: "th-gazetteer".into(),
            version: "2024.1".into(),
            entries: vec![
                GazetteerEntry {
                    phrase: "ประชุม".into(),
                    category: EntityCategory::Activity,
                    confidence: 0.8,
                },
                GazetteerEntry {
                    phrase: "ประชุมใหญ่".into(),
                    category: EntityCategory::Activity,
                    confidence: 0.95,
                },
                GazetteerEntry {
                    phrase: "สยามพารากอน".into(),
                    category: EntityCategory::Location,
                    confidence: 0.9,
                },
            ],
        }
    }

    #[test]
    fn longest_phrase_wins_within_category() {
        let model = GazetteerModel::from_artifact(artifact()).unwrap();
        let entities = model.predict("ประชุมใหญ่ที่สยามพารากอน").unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].text, "ประชุมใหญ่");
        assert_eq!(entities[0].confidence, 0.95);
        assert_eq!(entities[1].category, EntityCategory::Location);
        assert_eq!(entities[1].source, EntitySource::Model);
    }

    #[test]
    fn nothing_found_is_not_an_error() {
        let model = GazetteerModel::from_artifact(artifact()).unwrap();
        assert!(model.predict("ไปกินข้าว").unwrap().is_empty());
    }

    #[test]
    fn empty_artifact_is_unavailable() {
        let model = GazetteerModel::from_artifact(GazetteerArtifact {
            entries: Vec::new(),
            ..artifact()
        })
        .unwrap();
        assert!(matches!(
            model.predict("ประชุม"),
            Err(ModelError::Unavailable { .. })
        ));
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        let mut bad = artifact();
        bad.entries[0].confidence = 1.5;
        let err = GazetteerModel::from_artifact(bad).unwrap_err();
        assert!(err.to_string().contains("confidence"));
    }

    #[test]
    fn loads_yaml_and_json_artifacts() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("model.yaml");
        fs::write(
            &yaml_path,
            "model_id: th-yaml\nversion: \"1\"\nentries:\n  - phrase: \"Zoom\"\n    category: LOCATION\n",
        )
        .unwrap();
        let model = GazetteerModel::load(&yaml_path).unwrap();
        assert_eq!(model.model_id(), "th-yaml");
        let entities = model.predict("ประชุมผ่าน zoom").unwrap();
        assert_eq!(entities[0].text, "zoom");
        assert_eq!(entities[0].confidence, 0.9);

        let json_path = dir.path().join("model.json");
        fs::write(
            &json_path,
            r#"{"model_id":"th-json","version":"2","entries":[{"phrase":"สอบ","category":"ACTIVITY","confidence":0.7}]}"#,
        )
        .unwrap();
        let model = GazetteerModel::load(&json_path).unwrap();
        assert_eq!(model.version(), "2");
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn missing_artifact_names_path() {
        let err = GazetteerModel::load(Path::new("/missing/model.yaml")).unwrap_err();
        assert!(err.to_string().contains("/missing/model.yaml"));
    }
}
