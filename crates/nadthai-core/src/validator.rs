use chrono::{NaiveDate, TimeDelta};
use nadthai_schema::{Event, IssueCode, ValidationIssue, ValidationResult};

use crate::config::ValidatorConfig;

pub const ASK_ACTIVITY: &str = "กิจกรรมคืออะไรคะ? (เช่น ประชุม, เรียน, นัดหมาย)";
pub const ASK_DATE: &str = "วันไหนคะ? (เช่น พรุ่งนี้, วันจันทร์, 15 กุมภาพันธ์)";
pub const ASK_TIME: &str = "เวลาเท่าไหร่คะ? (เช่น 10 โมง, บ่าย 2 โมง)";

/// Annotates assembled events with issue codes. Never alters or drops the
/// event it is given.
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, event: Event, reference: NaiveDate) -> ValidationResult {
        let mut issues = Vec::new();
        let temporal = &event.temporal;

        if let Some(date) = temporal.date {
            // A window reaching past the calendar does not bound anything.
            let earliest = TimeDelta::try_days(self.config.grace_days)
                .and_then(|grace| reference.checked_sub_signed(grace));
            let latest = TimeDelta::try_days(self.config.horizon_days)
                .and_then(|horizon| reference.checked_add_signed(horizon));
            if let Some(earliest) = earliest.filter(|earliest| date < *earliest) {
                issues.push(ValidationIssue::new(
                    IssueCode::DateTooFarInPast,
                    format!("{date} is before {earliest}"),
                ));
            }
            if let Some(latest) = latest.filter(|latest| date > *latest) {
                issues.push(ValidationIssue::new(
                    IssueCode::DateBeyondHorizon,
                    format!("{date} is after {latest}"),
                ));
            }
        }

        if temporal.is_unresolved() && !event.has_activity() {
            issues.push(ValidationIssue::new(
                IssueCode::DegenerateEvent,
                "no activity, date or time",
            ));
        }

        for (field, values) in [("participant", &event.participants), ("location", &event.locations)] {
            for value in values {
                let chars = value.chars().count();
                if chars > self.config.max_field_chars {
                    issues.push(ValidationIssue::new(
                        IssueCode::FieldTooLong,
                        format!("{field} '{value}' has {chars} characters"),
                    ));
                }
            }
        }

        if self.config.require_activity && !event.has_activity() {
            issues.push(ValidationIssue::new(IssueCode::MissingActivity, "activity is unspecified"));
        }
        if self.config.require_date && temporal.date.is_none() {
            issues.push(ValidationIssue::new(IssueCode::MissingDate, "date is unresolved"));
        }

        if !temporal.discarded.is_empty() {
            let texts: Vec<&str> = temporal.discarded.iter().map(|e| e.text.as_str()).collect();
            issues.push(ValidationIssue::new(
                IssueCode::DiscardedTemporal,
                format!("ignored: {}", texts.join(", ")),
            ));
        }

        if !issues.is_empty() {
            tracing::debug!(
                activity = event.activity_label(),
                issues = issues.len(),
                "event needs review"
            );
        }
        ValidationResult::new(event, issues)
    }
}

/// The question to ask the user for the first missing field, checked in the
/// order activity, date, time.
pub fn clarification_prompt(result: &ValidationResult) -> Option<&'static str> {
    let event = &result.event;
    if !event.has_activity() {
        Some(ASK_ACTIVITY)
    } else if event.temporal.date.is_none() {
        Some(ASK_DATE)
    } else if event.temporal.time.is_none() {
        Some(ASK_TIME)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use nadthai_schema::{CandidateSpan, Entity, EntityCategory, EntitySource, Origin, ResolvedTemporal};

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn event_on(date: Option<NaiveDate>) -> Event {
        Event {
            activity: Some("ประชุม".to_string()),
            temporal: ResolvedTemporal {
                date,
                date_origin: date.map(|_| Origin::Explicit),
                time: NaiveTime::from_hms_opt(10, 0, 0),
                time_origin: Some(Origin::Explicit),
                discarded: Vec::new(),
            },
            participants: Vec::new(),
            locations: Vec::new(),
            source: CandidateSpan::new("ประชุม", 0),
        }
    }

    fn validator() -> Validator {
        Validator::new(ValidatorConfig::default())
    }

    #[test]
    fn complete_event_is_accepted() {
        let result = validator().validate(event_on(Some(reference())), reference());
        assert!(result.is_accepted(), "{:?}", result.issues);
        assert_eq!(clarification_prompt(&result), None);
    }

    #[test]
    fn grace_window_boundary() {
        let boundary = reference() - TimeDelta::days(7);
        let at = validator().validate(event_on(Some(boundary)), reference());
        assert!(at.is_accepted());

        let past = validator().validate(event_on(Some(boundary - TimeDelta::days(1))), reference());
        assert!(past.has_issue(IssueCode::DateTooFarInPast));
        assert!(!past.is_accepted());
    }

    #[test]
    fn horizon_boundary() {
        let edge = reference() + TimeDelta::days(730);
        assert!(validator().validate(event_on(Some(edge)), reference()).is_accepted());
        let beyond = validator().validate(event_on(Some(edge + TimeDelta::days(1))), reference());
        assert!(beyond.has_issue(IssueCode::DateBeyondHorizon));
    }

    #[test]
    fn window_past_the_calendar_does_not_panic() {
        let v = Validator::new(ValidatorConfig {
            grace_days: i64::MAX / 2,
            horizon_days: 1_000_000_000_000,
            ..ValidatorConfig::default()
        });
        let result = v.validate(event_on(Some(NaiveDate::MIN)), reference());
        assert!(!result.has_issue(IssueCode::DateTooFarInPast));
        assert!(!result.has_issue(IssueCode::DateBeyondHorizon));
    }

    #[test]
    fn degenerate_event_is_flagged_not_dropped() {
        let mut event = event_on(None);
        event.activity = None;
        event.temporal = ResolvedTemporal::default();
        let result = validator().validate(event.clone(), reference());
        assert!(result.has_issue(IssueCode::DegenerateEvent));
        assert!(result.has_issue(IssueCode::MissingActivity));
        assert!(result.has_issue(IssueCode::MissingDate));
        assert_eq!(result.event, event);
    }

    #[test]
    fn long_fields_are_flagged_per_value() {
        let mut event = event_on(Some(reference()));
        event.participants = vec!["บีม".to_string(), "ก".repeat(41)];
        event.locations = vec!["ห้อง".repeat(11)];
        let result = validator().validate(event, reference());
        let long = result
            .issues
            .iter()
            .filter(|i| i.code == IssueCode::FieldTooLong)
            .count();
        assert_eq!(long, 2);
    }

    #[test]
    fn length_is_counted_in_characters() {
        let mut event = event_on(Some(reference()));
        // 40 Thai characters, 120 bytes.
        event.locations = vec!["ก".repeat(40)];
        assert!(validator().validate(event, reference()).is_accepted());
    }

    #[test]
    fn required_fields_can_be_relaxed() {
        let v = Validator::new(ValidatorConfig {
            require_activity: false,
            require_date: false,
            ..ValidatorConfig::default()
        });
        let mut event = event_on(None);
        event.activity = None;
        let result = v.validate(event, reference());
        assert!(result.is_accepted(), "{:?}", result.issues);
    }

    #[test]
    fn discarded_temporal_is_reported() {
        let mut event = event_on(Some(reference()));
        event.temporal.discarded.push(Entity {
            category: EntityCategory::Date,
            text: "วันศุกร์".to_string(),
            start: 0,
            end: "วันศุกร์".len(),
            confidence: 0.5,
            source: EntitySource::Rule,
        });
        let result = validator().validate(event, reference());
        assert!(result.has_issue(IssueCode::DiscardedTemporal));
        assert!(result.issues[0].detail.contains("วันศุกร์"));
    }

    #[test]
    fn prompts_follow_field_order() {
        let mut event = event_on(None);
        event.activity = None;
        let result = validator().validate(event.clone(), reference());
        assert_eq!(clarification_prompt(&result), Some(ASK_ACTIVITY));

        event.activity = Some("เรียน".to_string());
        let result = validator().validate(event.clone(), reference());
        assert_eq!(clarification_prompt(&result), Some(ASK_DATE));

        event.temporal.date = Some(reference());
        event.temporal.time = None;
        let result = validator().validate(event, reference());
        assert_eq!(clarification_prompt(&result), Some(ASK_TIME));
    }
}
