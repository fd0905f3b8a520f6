//! Thai chat message to calendar event extraction.
//!
//! ```text
//! raw text -> normalize -> segment -> [recognize -> resolve] -> assemble -> validate
//! ```

pub mod assembler;
pub mod config;
pub mod normalizer;
pub mod pipeline;
pub mod recognizer;
pub mod segmenter;
pub mod temporal;
pub mod validator;

pub use assembler::assemble;
pub use config::{
    load_config, validate_config, NadthaiConfig, PipelineConfig, RecognizerConfig,
    ResolverConfig, ValidatorConfig,
};
pub use normalizer::normalize;
pub use pipeline::{default_event_time, ExtractError, Extractor};
pub use recognizer::Recognizer;
pub use segmenter::Segmenter;
pub use temporal::{next_weekday, TemporalResolver};
pub use validator::{clarification_prompt, Validator};
