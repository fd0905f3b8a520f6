//! Turns DATE and TIME entity text into calendar values.
//!
//! Every relative expression is anchored on the reference timestamp passed
//! in by the caller; nothing here reads the system clock.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use nadthai_lexicon::{starts_with_time_marker, DayPeriod, Lexicon, WeekdayQualifier};
use nadthai_schema::{Entity, Origin, ResolvedTemporal};
use regex::{Captures, Regex};

use crate::config::ResolverConfig;

/// How a time value was obtained. Period-only times act as context for a
/// more precise time in the same span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeSource {
    Literal,
    Idiom,
    Period,
}

struct Patterns {
    iso: Regex,
    slash: Regex,
    day_before_month: Regex,
    day_after_month: Regex,
    year_after: Regex,
    meridiem: Regex,
    clock: Regex,
    tee: Regex,
    thum: Regex,
    afternoon: Regex,
    mong: Regex,
    minutes: Regex,
    bare_hour: Regex,
}

impl Patterns {
    fn compile(numbers: &str) -> Result<Self> {
        let num = format!("({numbers}|[0-9]{{1,2}})");
        let build = |source: &str| {
            Regex::new(source).with_context(|| format!("failed to compile pattern: {source}"))
        };
        Ok(Self {
            iso: build(r"([0-9]{4})[-/]([0-9]{1,2})[-/]([0-9]{1,2})")?,
            slash: build(r"([0-9]{1,2})/([0-9]{1,2})(?:/([0-9]+))?")?,
            day_before_month: build(r"(?:^|[^0-9])([0-9]{1,2})(?:st|nd|rd|th)?\s*$")?,
            day_after_month: build(r"^\.?\s*([0-9]{1,2})((?:st|nd|rd|th)?)(?:[^0-9]|$)")?,
            year_after: build(r"^\.?\s*,?\s*(?:พ\.ศ\.|ค\.ศ\.)?\s*([0-9]+)")?,
            meridiem: build(r"([0-9]{1,2})(?:[:.]([0-9]{2}))?\s*(a\.m\.|p\.m\.|am|pm)")?,
            clock: build(r"([0-9]{1,2})[:.]([0-9]{2})")?,
            tee: build(&format!(r"ตี\s*{num}"))?,
            thum: build(&format!(r"{num}\s*ทุ่ม"))?,
            afternoon: build(&format!(r"บ่าย\s*{num}"))?,
            mong: build(&format!(r"{num}\s*โมง(?:\s*(เช้า|เย็น))?"))?,
            minutes: build(r"([0-9]{1,2})\s*นาที")?,
            bare_hour: build(r"([0-9]{1,2})")?,
        })
    }
}

pub struct TemporalResolver {
    lexicon: Arc<Lexicon>,
    config: ResolverConfig,
    patterns: Patterns,
}

impl TemporalResolver {
    pub fn new(lexicon: Arc<Lexicon>, config: ResolverConfig) -> Result<Self> {
        let patterns = Patterns::compile(lexicon.number_pattern())?;
        Ok(Self {
            lexicon,
            config,
            patterns,
        })
    }

    /// The first DATE and the first TIME entity by position are authoritative;
    /// the others end up in `discarded`. A TIME entity that only names a period
    /// of the day is kept as context instead when a more precise time exists.
    pub fn resolve(
        &self,
        dates: &[Entity],
        times: &[Entity],
        reference: NaiveDateTime,
    ) -> ResolvedTemporal {
        let today = reference.date();
        let mut resolved = ResolvedTemporal::default();

        let mut dates: Vec<&Entity> = dates.iter().collect();
        dates.sort_by_key(|e| e.start);
        if let Some((first, rest)) = dates.split_first() {
            match self.resolve_date(&first.text.to_lowercase(), today) {
                Some((date, origin)) => {
                    resolved.date = Some(date);
                    resolved.date_origin = Some(origin);
                }
                None => tracing::warn!(text = %first.text, "date expression left unresolved"),
            }
            resolved.discarded.extend(rest.iter().map(|e| (*e).clone()));
        }

        let mut times: Vec<&Entity> = times.iter().collect();
        times.sort_by_key(|e| e.start);
        let parsed: Vec<Option<(NaiveTime, Origin, TimeSource)>> = times
            .iter()
            .map(|e| self.resolve_time(&e.text.to_lowercase(), None))
            .collect();
        let is_period = |i: usize| matches!(parsed[i], Some((_, _, TimeSource::Period)));

        let chosen = (0..times.len())
            .find(|&i| !is_period(i))
            .or(if times.is_empty() { None } else { Some(0) });
        if let Some(chosen) = chosen {
            let context = (0..times.len())
                .filter(|&i| i != chosen && is_period(i))
                .find_map(|i| self.lexicon.period_in(&times[i].text.to_lowercase()));
            match self.resolve_time(&times[chosen].text.to_lowercase(), context) {
                Some((time, origin, _)) => {
                    resolved.time = Some(time);
                    resolved.time_origin = Some(origin);
                }
                None => tracing::warn!(text = %times[chosen].text, "time expression left unresolved"),
            }
            let chosen_is_period = is_period(chosen);
            for (i, entity) in times.iter().enumerate() {
                let context_only = is_period(i) && !chosen_is_period;
                if i != chosen && !context_only {
                    resolved.discarded.push((*entity).clone());
                }
            }
        }

        if resolved.date.is_none() && resolved.time.is_some() && self.config.assume_today_for_time_only {
            resolved.date = Some(today);
            resolved.date_origin = Some(Origin::Inferred);
        }

        resolved.discarded.sort_by_key(|e| e.start);
        resolved
    }

    fn resolve_date(&self, text: &str, today: NaiveDate) -> Option<(NaiveDate, Origin)> {
        if let Some(caps) = self.patterns.iso.captures(text) {
            let date = self.calendar_date(number(&caps, 3)?, number(&caps, 2)?, caps.get(1).map(|m| m.as_str()), today);
            return date.map(|d| (d, Origin::Explicit));
        }
        if let Some(caps) = self.patterns.slash.captures(text) {
            let date = self.calendar_date(number(&caps, 1)?, number(&caps, 2)?, caps.get(3).map(|m| m.as_str()), today);
            return date.map(|d| (d, Origin::Explicit));
        }
        if let Some(month) = self.lexicon.month_in(text) {
            let before = &text[..month.start];
            let after = &text[month.end..];
            let found = match self.patterns.day_before_month.captures(before) {
                Some(caps) => Some((number(&caps, 1), after)),
                None => self
                    .patterns
                    .day_after_month
                    .captures(after)
                    .map(|caps| (number(&caps, 1), &after[caps.get(2).map_or(0, |m| m.end())..])),
            };
            if let Some((day, rest)) = found {
                let year = self.patterns.year_after.captures(rest).and_then(|caps| {
                    let digits = caps.get(1)?;
                    let tail = &rest[digits.end()..];
                    (!starts_with_time_marker(tail)).then_some(digits.as_str())
                });
                let date = self.calendar_date(day?, month.month, year, today);
                return date.map(|d| (d, Origin::Explicit));
            }
        }

        if let Some(days) = self.lexicon.day_offset_in(text) {
            let date = TimeDelta::try_days(days).and_then(|delta| today.checked_add_signed(delta));
            return date.map(|d| (d, Origin::Inferred));
        }
        if let Some(weekday) = self.lexicon.weekday_in(text) {
            let date = next_weekday(today, weekday.weekday, weekday.qualifier);
            return Some((date, Origin::Inferred));
        }
        None
    }

    fn calendar_date(&self, day: u32, month: u32, year: Option<&str>, today: NaiveDate) -> Option<NaiveDate> {
        if let Some(raw) = year {
            let year = calendar_year(raw, today.year())?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
        let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
        if self.config.prefer_future && this_year < today {
            return NaiveDate::from_ymd_opt(today.year() + 1, month, day).or(Some(this_year));
        }
        Some(this_year)
    }

    fn resolve_time(&self, text: &str, context: Option<DayPeriod>) -> Option<(NaiveTime, Origin, TimeSource)> {
        let period = self.lexicon.period_in(text).or(context);
        let minute = self
            .patterns
            .minutes
            .captures(text)
            .and_then(|caps| number(&caps, 1))
            .unwrap_or(if text.contains("ครึ่ง") { 30 } else { 0 });

        if let Some(caps) = self.patterns.meridiem.captures(text) {
            let hour = number(&caps, 1)? % 12;
            let minute = number(&caps, 2).unwrap_or(minute);
            let hour = if caps.get(3)?.as_str().starts_with('p') { hour + 12 } else { hour };
            return clock(hour, minute, Origin::Explicit, TimeSource::Literal);
        }

        if let Some(caps) = self.patterns.clock.captures(text) {
            let mut hour = number(&caps, 1)?;
            if hour < 12 && period.is_some_and(DayPeriod::is_post_meridiem) {
                hour += 12;
            }
            return clock(hour, number(&caps, 2)?, Origin::Explicit, TimeSource::Literal);
        }

        if let Some((hour, idiom_minute)) = self.lexicon.clock_idiom_in(text) {
            let minute = if idiom_minute == 0 { minute } else { idiom_minute };
            return clock(hour, minute, Origin::Inferred, TimeSource::Idiom);
        }

        if let Some((n, origin)) = self.hour_token(&self.patterns.tee, text) {
            let hour = if n == 12 { 0 } else { n };
            return (hour < 12).then(|| clock(hour, minute, origin, TimeSource::Literal)).flatten();
        }

        if let Some((n, origin)) = self.hour_token(&self.patterns.thum, text) {
            return (1..=6)
                .contains(&n)
                .then(|| clock((n + 18) % 24, minute, origin, TimeSource::Literal))
                .flatten();
        }

        if let Some((n, origin)) = self.hour_token(&self.patterns.afternoon, text) {
            let hour = if n < 12 { n + 12 } else { n };
            return clock(hour, minute, origin, TimeSource::Literal);
        }

        if let Some(caps) = self.patterns.mong.captures(text) {
            let token = caps.get(1)?.as_str();
            let n = self.lexicon.number_value(token)?;
            let hour = match caps.get(2).map(|m| m.as_str()) {
                Some("เช้า") => n,
                Some(_) if n < 12 => n + 12,
                Some(_) => n,
                None => daytime_hour(n, period),
            };
            return clock(hour, minute, token_origin(token), TimeSource::Literal);
        }

        if let Some(caps) = self.patterns.bare_hour.captures(text) {
            let hour = daytime_hour(number(&caps, 1)?, period);
            return clock(hour, minute, Origin::Explicit, TimeSource::Literal);
        }

        let own_period = self.lexicon.period_in(text)?;
        clock(own_period.default_hour(), 0, Origin::Inferred, TimeSource::Period)
    }

    fn hour_token(&self, pattern: &Regex, text: &str) -> Option<(u32, Origin)> {
        let caps = pattern.captures(text)?;
        let token = caps.get(1)?.as_str();
        let value = self.lexicon.number_value(token)?;
        Some((value, token_origin(token)))
    }
}

/// Next date falling on `weekday`.
///
/// `Upcoming` never returns `today`; `This` may; `Next` skips the rest of
/// the Monday-based week `today` belongs to.
pub fn next_weekday(today: NaiveDate, weekday: Weekday, qualifier: WeekdayQualifier) -> NaiveDate {
    let current = i64::from(today.weekday().num_days_from_monday());
    let target = i64::from(weekday.num_days_from_monday());
    let mut delta = (target - current).rem_euclid(7);
    match qualifier {
        WeekdayQualifier::This => {}
        WeekdayQualifier::Upcoming => {
            if delta == 0 {
                delta = 7;
            }
        }
        WeekdayQualifier::Next => {
            if delta == 0 {
                delta = 7;
            }
            if delta <= 6 - current {
                delta += 7;
            }
        }
    }
    today + TimeDelta::days(delta)
}

/// Four-digit years above 2400 are Buddhist Era. Two-digit years take
/// whichever era lands closer to the reference year.
fn calendar_year(raw: &str, reference_year: i32) -> Option<i32> {
    let value: i32 = raw.parse().ok()?;
    match raw.len() {
        4 if value > 2400 => Some(value - 543),
        4 => Some(value),
        2 => {
            let buddhist = 2500 + value - 543;
            let common = 2000 + value;
            if (buddhist - reference_year).abs() <= (common - reference_year).abs() {
                Some(buddhist)
            } else {
                Some(common)
            }
        }
        _ => None,
    }
}

/// Twelve-hour reading of a bare hour: the period decides when present,
/// otherwise 1 to 6 are afternoon hours.
fn daytime_hour(hour: u32, period: Option<DayPeriod>) -> u32 {
    if hour >= 12 {
        return hour;
    }
    match period {
        Some(p) if p.is_post_meridiem() => hour + 12,
        Some(_) => hour,
        None if (1..=6).contains(&hour) => hour + 12,
        None => hour,
    }
}

fn token_origin(token: &str) -> Origin {
    if token.chars().any(|c| c.is_ascii_digit()) {
        Origin::Explicit
    } else {
        Origin::Inferred
    }
}

fn number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

fn clock(hour: u32, minute: u32, origin: Origin, source: TimeSource) -> Option<(NaiveTime, Origin, TimeSource)> {
    NaiveTime::from_hms_opt(hour, minute, 0).map(|time| (time, origin, source))
}
