use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use nadthai_core::{
    clarification_prompt, default_event_time, load_config, Extractor, NadthaiConfig,
};
use nadthai_lexicon::Lexicon;
use nadthai_recognizer::{ModelConfig, ModelType};
use nadthai_schema::ValidationResult;
use serde_json::Value;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "nadthai", version, about = "Extract calendar events from Thai chat messages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Extract events from a message and print them as JSON")]
    Extract {
        #[arg(long, help = "Reference time: RFC 3339, \"YYYY-MM-DD HH:MM\" or \"YYYY-MM-DD\" (default: now)")]
        now: Option<String>,
        #[arg(long, help = "Config root directory (contains main.yaml and lexicon.d/)")]
        config: Option<PathBuf>,
        #[arg(long, help = "Gazetteer model artifact, overrides the configured model")]
        model: Option<PathBuf>,
        #[arg(long, help = "Fill a missing time with 09:00, marked as inferred")]
        fill_defaults: bool,
        #[arg(required = true, help = "Message text")]
        text: Vec<String>,
    },
    #[command(about = "Check a config root and the model it names")]
    ValidateConfig {
        #[arg(long)]
        config: PathBuf,
    },
    #[command(about = "Print keyword table statistics")]
    Lexicon {
        #[arg(long, help = "Config root whose lexicon.d/ overlays are applied")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Extract {
            now,
            config,
            model,
            fill_defaults,
            text,
        } => {
            let reference = match now {
                Some(raw) => parse_reference(&raw)?,
                None => Local::now().naive_local(),
            };
            let mut config = read_config(config.as_deref())?;
            if let Some(path) = model {
                config.pipeline.recognizer.model =
                    ModelConfig::new(ModelType::Gazetteer).with_path(path.to_string_lossy());
            }
            let extractor = Extractor::from_config(&config)?;
            tracing::debug!(%reference, model_id = extractor.model().model_id(), "extracting");
            let results = extractor.extract_events(&text.join(" "), reference)?;
            let output = render_results(results, fill_defaults)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::ValidateConfig { config } => {
            println!("{}", validate_root(&config)?);
        }
        Commands::Lexicon { config } => {
            let config = read_config(config.as_deref())?;
            let lexicon = Lexicon::with_overlays(config.lexicon_overlays)?;
            println!("{}", serde_json::to_string_pretty(&lexicon.stats())?);
        }
    }

    Ok(())
}

fn read_config(root: Option<&Path>) -> Result<NadthaiConfig> {
    match root {
        Some(root) => load_config(root),
        None => Ok(NadthaiConfig::default()),
    }
}

fn parse_reference(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid reference time: {raw}"))?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("invalid reference time: {raw}"))
}

/// One JSON object per result, with the clarification question for the
/// first missing field when there is one.
fn render_results(results: Vec<ValidationResult>, fill_defaults: bool) -> Result<Vec<Value>> {
    let mut rendered = Vec::with_capacity(results.len());
    for result in results {
        let mut result = result;
        let mut filled = false;
        if fill_defaults {
            let (event, changed) = result.event.with_default_time(default_event_time());
            if changed {
                result = ValidationResult::new(event, result.issues);
                filled = true;
            }
        }

        let prompt = clarification_prompt(&result);
        let mut value = serde_json::to_value(&result)?;
        if let Value::Object(map) = &mut value {
            map.insert("clarification".to_string(), prompt.map_or(Value::Null, Value::from));
            if filled {
                map.insert("filled_defaults".to_string(), Value::from(vec!["time"]));
            }
        }
        rendered.push(value);
    }
    Ok(rendered)
}

fn validate_root(root: &Path) -> Result<String> {
    let config = load_config(root)?;
    let extractor = Extractor::from_config(&config)?;
    let model = extractor.model();
    model
        .health()
        .with_context(|| format!("model {} is not usable", model.model_id()))?;
    Ok(format!(
        "Config valid. model {} {}, {} lexicon overlays, grace {} days, horizon {} days.",
        model.model_id(),
        model.version(),
        config.lexicon_overlays.len(),
        config.pipeline.validator.grace_days,
        config.pipeline.validator.horizon_days
    ))
}
