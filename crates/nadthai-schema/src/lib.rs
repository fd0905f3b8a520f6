use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Raw chat input together with the "now" its relative dates resolve against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub reference: NaiveDateTime,
}

impl Message {
    pub fn new(text: impl Into<String>, reference: NaiveDateTime) -> Self {
        Self {
            text: text.into(),
            reference,
        }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference.date()
    }
}

/// A region of the normalized message believed to describe one event.
///
/// `start` and `end` are byte offsets into the normalized text, so
/// `&normalized[start..end] == text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl CandidateSpan {
    pub fn new(text: impl Into<String>, start: usize) -> Self {
        let text = text.into();
        let end = start + text.len();
        Self { text, start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityCategory {
    Date,
    Time,
    Activity,
    Person,
    Location,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 5] = [
        EntityCategory::Date,
        EntityCategory::Time,
        EntityCategory::Activity,
        EntityCategory::Person,
        EntityCategory::Location,
    ];

    pub fn is_temporal(self) -> bool {
        matches!(self, EntityCategory::Date | EntityCategory::Time)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityCategory::Date => "DATE",
            EntityCategory::Time => "TIME",
            EntityCategory::Activity => "ACTIVITY",
            EntityCategory::Person => "PERSON",
            EntityCategory::Location => "LOCATION",
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityCategory {
    type Err = String;

    /// Accepts the canonical labels case-insensitively. `EVENT` is the label
    /// older model artifacts use for activities.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DATE" => Ok(EntityCategory::Date),
            "TIME" => Ok(EntityCategory::Time),
            "ACTIVITY" | "EVENT" => Ok(EntityCategory::Activity),
            "PERSON" => Ok(EntityCategory::Person),
            "LOCATION" | "LOC" => Ok(EntityCategory::Location),
            other => Err(format!("unknown entity category: {other}")),
        }
    }
}

/// Which collaborator produced an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitySource {
    Model,
    Rule,
}

/// A labelled run of text. Offsets are byte offsets into the normalized message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub category: EntityCategory,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
    pub source: EntitySource,
}

impl Entity {
    pub fn overlaps(&self, other: &Entity) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Whether a temporal field was stated literally or derived from a relative
/// or idiomatic expression (or a default policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Explicit,
    Inferred,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTemporal {
    pub date: Option<NaiveDate>,
    pub date_origin: Option<Origin>,
    pub time: Option<NaiveTime>,
    pub time_origin: Option<Origin>,
    /// DATE/TIME entities that lost the first-wins tie-break.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discarded: Vec<Entity>,
}

impl ResolvedTemporal {
    pub fn is_unresolved(&self) -> bool {
        self.date.is_none() && self.time.is_none()
    }

    /// `Inferred` as soon as any resolved field was inferred.
    pub fn origin(&self) -> Option<Origin> {
        match (self.date_origin, self.time_origin) {
            (None, None) => None,
            (Some(Origin::Inferred), _) | (_, Some(Origin::Inferred)) => Some(Origin::Inferred),
            _ => Some(Origin::Explicit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(
        default,
        serialize_with = "serialize_activity",
        deserialize_with = "deserialize_activity"
    )]
    pub activity: Option<String>,
    pub temporal: ResolvedTemporal,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    pub source: CandidateSpan,
}

impl Event {
    pub const UNSPECIFIED: &'static str = "unspecified";

    pub fn activity_label(&self) -> &str {
        self.activity.as_deref().unwrap_or(Self::UNSPECIFIED)
    }

    pub fn has_activity(&self) -> bool {
        self.activity.is_some()
    }

    /// Fill an unset time with `default`, marked as inferred.
    /// Returns the new event and whether anything was filled.
    pub fn with_default_time(&self, default: NaiveTime) -> (Event, bool) {
        let mut event = self.clone();
        if event.temporal.time.is_some() {
            return (event, false);
        }
        event.temporal.time = Some(default);
        event.temporal.time_origin = Some(Origin::Inferred);
        (event, true)
    }
}

fn serialize_activity<S>(activity: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(activity.as_deref().unwrap_or(Event::UNSPECIFIED))
}

fn deserialize_activity<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty() && s != Event::UNSPECIFIED))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Date precedes the reference date by more than the grace window.
    DateTooFarInPast,
    /// Date lies beyond the planning horizon.
    DateBeyondHorizon,
    /// No date, no time and no activity: the span should have been dropped.
    DegenerateEvent,
    /// A person or location string is longer than the length ceiling.
    FieldTooLong,
    MissingActivity,
    MissingDate,
    /// More than one DATE or TIME entity competed for the event.
    DiscardedTemporal,
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueCode::DateTooFarInPast => "date_too_far_in_past",
            IssueCode::DateBeyondHorizon => "date_beyond_horizon",
            IssueCode::DegenerateEvent => "degenerate_event",
            IssueCode::FieldTooLong => "field_too_long",
            IssueCode::MissingActivity => "missing_activity",
            IssueCode::MissingDate => "missing_date",
            IssueCode::DiscardedTemporal => "discarded_temporal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub detail: String,
}

impl ValidationIssue {
    pub fn new(code: IssueCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Accepted,
    NeedsReview,
}

/// An event annotated by the validator. The event itself is never altered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub event: Event,
    pub status: ValidationStatus,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new(event: Event, issues: Vec<ValidationIssue>) -> Self {
        let status = if issues.is_empty() {
            ValidationStatus::Accepted
        } else {
            ValidationStatus::NeedsReview
        };
        Self {
            event,
            status,
            issues,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == ValidationStatus::Accepted
    }

    pub fn has_issue(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }
}
