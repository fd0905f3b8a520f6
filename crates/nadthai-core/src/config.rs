use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use nadthai_lexicon::{read_lexicon_file, validate_lexicon_file, LexiconFile};
use nadthai_recognizer::{ModelConfig, ModelType};
use nadthai_schema::EntityCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolverConfig {
    /// Roll a year-less date that already passed into the next year.
    #[serde(default = "default_true")]
    pub prefer_future: bool,
    /// Give a time without a date the reference date, marked inferred.
    #[serde(default = "default_true")]
    pub assume_today_for_time_only: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefer_future: default_true(),
            assume_today_for_time_only: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidatorConfig {
    #[serde(default = "default_grace_days")]
    pub grace_days: i64,
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
    /// Length ceiling, in characters, for person and location strings.
    #[serde(default = "default_max_field_chars")]
    pub max_field_chars: usize,
    #[serde(default = "default_true")]
    pub require_activity: bool,
    #[serde(default = "default_true")]
    pub require_date: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            grace_days: default_grace_days(),
            horizon_days: default_horizon_days(),
            max_field_chars: default_max_field_chars(),
            require_activity: default_true(),
            require_date: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognizerConfig {
    #[serde(default)]
    pub model: ModelConfig,
    /// Categories the rule model adds on top of an external model.
    #[serde(default = "default_fallback_categories")]
    pub fallback_categories: Vec<EntityCategory>,
    /// Model entities scoring below this are ignored.
    #[serde(default)]
    pub min_confidence: f32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            fallback_categories: default_fallback_categories(),
            min_confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub recognizer: RecognizerConfig,
}

/// Everything read from a config root: `main.yaml` plus `lexicon.d/*.yaml`.
#[derive(Debug, Clone, Default)]
pub struct NadthaiConfig {
    pub pipeline: PipelineConfig,
    pub lexicon_overlays: Vec<LexiconFile>,
}

fn default_true() -> bool {
    true
}

fn default_grace_days() -> i64 {
    7
}

fn default_horizon_days() -> i64 {
    730
}

fn default_max_field_chars() -> usize {
    40
}

fn default_fallback_categories() -> Vec<EntityCategory> {
    vec![EntityCategory::Date, EntityCategory::Time]
}

/// Expand `${VAR}` references; unset variables expand to nothing.
pub fn resolve_env_var(raw: &str) -> String {
    let mut output = String::new();
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);

        let candidate = &rest[start + 2..];
        let Some(end) = candidate.find('}') else {
            output.push_str(&rest[start..]);
            return output;
        };

        output.push_str(&std::env::var(&candidate[..end]).unwrap_or_default());
        rest = &candidate[end + 1..];
    }

    output.push_str(rest);
    output
}

pub fn load_config(root: &Path) -> Result<NadthaiConfig> {
    let main_path = root.join("main.yaml");
    let mut pipeline: PipelineConfig = if main_path.exists() {
        read_yaml_file(&main_path)?
    } else {
        tracing::debug!(root = %root.display(), "no main.yaml, using defaults");
        PipelineConfig::default()
    };

    if let Some(path) = pipeline.recognizer.model.path.as_mut() {
        *path = resolve_env_var(path);
    }

    let overlay_dir = root.join("lexicon.d");
    let lexicon_overlays = if overlay_dir.is_dir() {
        read_overlay_dir(&overlay_dir)?
    } else {
        Vec::new()
    };

    let config = NadthaiConfig {
        pipeline,
        lexicon_overlays,
    };
    validate_config(&config)?;
    Ok(config)
}

/// Upper bound for `grace_days` and `horizon_days`, roughly a century.
pub const MAX_WINDOW_DAYS: i64 = 36_525;

pub fn validate_config(config: &NadthaiConfig) -> Result<()> {
    let validator = &config.pipeline.validator;
    if !(0..=MAX_WINDOW_DAYS).contains(&validator.grace_days) {
        return Err(anyhow!(
            "validator.grace_days must be within 0..={MAX_WINDOW_DAYS}: {}",
            validator.grace_days
        ));
    }
    if !(1..=MAX_WINDOW_DAYS).contains(&validator.horizon_days) {
        return Err(anyhow!(
            "validator.horizon_days must be within 1..={MAX_WINDOW_DAYS}: {}",
            validator.horizon_days
        ));
    }
    if validator.max_field_chars == 0 {
        return Err(anyhow!("validator.max_field_chars must be positive"));
    }

    let recognizer = &config.pipeline.recognizer;
    if !(0.0..=1.0).contains(&recognizer.min_confidence) {
        return Err(anyhow!(
            "recognizer.min_confidence must be within 0..=1: {}",
            recognizer.min_confidence
        ));
    }
    for overlay in &config.lexicon_overlays {
        validate_lexicon_file(overlay).context("invalid lexicon overlay")?;
    }
    if recognizer.model.model_type == ModelType::Gazetteer {
        let path = recognizer
            .model
            .path
            .as_deref()
            .filter(|path| !path.is_empty())
            .ok_or_else(|| anyhow!("recognizer.model.path is required for a gazetteer model"))?;
        if !Path::new(path).is_file() {
            return Err(anyhow!("model artifact does not exist: {path}"));
        }
    }

    Ok(())
}

fn read_yaml_file<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse yaml file: {}", path.display()))
}

fn read_overlay_dir(dir: &Path) -> Result<Vec<LexiconFile>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("failed to read config dir: {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("failed to read dir entry: {}", dir.display()))?;
        let path = entry.path();
        if matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        ) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut overlays = Vec::with_capacity(paths.len());
    for path in paths {
        overlays.push(read_lexicon_file(&path)?);
    }
    Ok(overlays)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn empty_root_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert_eq!(config.pipeline.validator.grace_days, 7);
        assert_eq!(config.pipeline.validator.horizon_days, 730);
        assert_eq!(config.pipeline.validator.max_field_chars, 40);
        assert_eq!(
            config.pipeline.recognizer.fallback_categories,
            vec![EntityCategory::Date, EntityCategory::Time]
        );
        assert!(config.lexicon_overlays.is_empty());
    }

    #[test]
    fn partial_main_yaml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "main.yaml",
            "validator:\n  grace_days: 3\nresolver:\n  prefer_future: false\n",
        );
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.pipeline.validator.grace_days, 3);
        assert_eq!(config.pipeline.validator.horizon_days, 730);
        assert!(!config.pipeline.resolver.prefer_future);
        assert!(config.pipeline.resolver.assume_today_for_time_only);
    }

    #[test]
    fn overlays_are_read_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lexicon.d/20-late.yaml", "activities: [\"ซ้อมดนตรี\"]\n");
        write(dir.path(), "lexicon.d/10-early.yml", "activities: [\"ตีแบด\"]\n");
        write(dir.path(), "lexicon.d/notes.txt", "ignored");
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.lexicon_overlays.len(), 2);
        assert_eq!(config.lexicon_overlays[0].activities, vec!["ตีแบด"]);
        assert_eq!(config.lexicon_overlays[1].activities, vec!["ซ้อมดนตรี"]);
    }

    #[test]
    fn model_path_expands_env_var() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("model.yaml");
        write(dir.path(), "model.yaml", "model_id: m\nversion: \"1\"\n");
        std::env::set_var("NADTHAI_TEST_MODEL_DIR", dir.path());
        write(
            dir.path(),
            "main.yaml",
            "recognizer:\n  model:\n    type: gazetteer\n    path: ${NADTHAI_TEST_MODEL_DIR}/model.yaml\n",
        );
        let config = load_config(dir.path()).unwrap();
        assert_eq!(
            config.pipeline.recognizer.model.path.as_deref(),
            artifact.to_str()
        );
    }

    #[test]
    fn validate_rejects_bad_windows() {
        let mut config = NadthaiConfig::default();
        config.pipeline.validator.grace_days = -1;
        assert!(validate_config(&config)
            .unwrap_err()
            .to_string()
            .contains("grace_days"));

        let mut config = NadthaiConfig::default();
        config.pipeline.validator.max_field_chars = 0;
        assert!(validate_config(&config).is_err());

        let mut config = NadthaiConfig::default();
        config.pipeline.validator.grace_days = 1_000_000_000_000;
        assert!(validate_config(&config)
            .unwrap_err()
            .to_string()
            .contains("grace_days"));

        let mut config = NadthaiConfig::default();
        config.pipeline.validator.horizon_days = MAX_WINDOW_DAYS + 1;
        assert!(validate_config(&config).is_err());
        config.pipeline.validator.horizon_days = MAX_WINDOW_DAYS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn validate_rejects_far_day_offset_overlay() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "lexicon.d/50-slang.yaml",
            "idioms:\n  - phrase: \"ชาติหน้า\"\n    kind: day_offset\n    days: 100000000000000\n",
        );
        let err = load_config(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("ชาติหน้า"), "{err:#}");
    }

    #[test]
    fn validate_rejects_missing_artifact() {
        let mut config = NadthaiConfig::default();
        config.pipeline.recognizer.model = ModelConfig::new(ModelType::Gazetteer).with_path("/no/such/model.yaml");
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("/no/such/model.yaml"));
    }

    #[test]
    fn malformed_yaml_names_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.yaml", "validator: [not, a, map]\n");
        let err = load_config(dir.path()).unwrap_err();
        assert!(err.to_string().contains("main.yaml"));
    }

    #[test]
    fn resolve_env_var_leaves_unterminated_reference() {
        assert_eq!(resolve_env_var("a/${UNTERMINATED"), "a/${UNTERMINATED");
    }
}
