//! Idiom and keyword table for Thai chat text.
//!
//! The table maps canonical temporal phrases to day offsets, clock values or
//! periods of the day, and carries the keyword lists the rule recognizer and
//! the segmenter consult. A [`Lexicon`] is compiled once and shared read-only
//! (usually behind an `Arc`) by every pipeline call.

mod builtin;
mod matcher;
mod table;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Weekday;
use nadthai_schema::EntityCategory;
use serde::Serialize;

use matcher::{keep_leftmost_longest, Patterns, PhraseTable};

pub use matcher::{at_boundary, starts_with_time_marker};

pub use table::{
    DayPeriod, IdiomMeaning, LexiconFile, MonthName, NumberWord, TemporalIdiom, WeekdayName,
};

/// A categorized region of a searched text, as byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexHit {
    pub category: EntityCategory,
    pub start: usize,
    pub end: usize,
}

impl LexHit {
    pub fn new(category: EntityCategory, start: usize, end: usize) -> Self {
        Self {
            category,
            start,
            end,
        }
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekdayQualifier {
    /// Bare weekday: the next occurrence after today.
    Upcoming,
    /// `นี้` / `this`: today counts.
    This,
    /// `หน้า` / `next`: a day in a later week.
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayRef {
    pub weekday: Weekday,
    pub qualifier: WeekdayQualifier,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRef {
    pub month: u32,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LexiconStats {
    pub day_offsets: usize,
    pub clock_idioms: usize,
    pub periods: usize,
    pub weekdays: usize,
    pub months: usize,
    pub numbers: usize,
    pub activities: usize,
    pub person_titles: usize,
    pub generic_people: usize,
    pub location_keywords: usize,
    pub online_platforms: usize,
    pub stop_words: usize,
}

const WEEKDAY_SUFFIXES: &[(&str, WeekdayQualifier)] = &[
    ("ที่จะถึงนี้", WeekdayQualifier::Upcoming),
    ("ที่จะถึง", WeekdayQualifier::Upcoming),
    ("สัปดาห์หน้า", WeekdayQualifier::Next),
    ("อาทิตย์หน้า", WeekdayQualifier::Next),
    ("นี้", WeekdayQualifier::This),
    ("หน้า", WeekdayQualifier::Next),
];

const GENERIC_PERSON_VERBS: &[&str] = &["ไป", "มา", "พบ", "เจอ", "นัด"];

/// Text allowed between two hits of one category for them to read as one
/// expression, e.g. `วันจันทร์ที่ 10 ม.ค.` or `ตอนเย็น 6 โมง`.
const CONNECTORS: &[&str] = &["", "ที่", "วันที่", "เวลา", "ตอน", "ช่วง", ",", "at", "on"];

pub struct Lexicon {
    idioms: PhraseTable<IdiomMeaning>,
    weekdays: PhraseTable<Weekday>,
    months: PhraseTable<u32>,
    numbers: PhraseTable<u32>,
    activities: PhraseTable<()>,
    person_titles: PhraseTable<()>,
    generic_people: PhraseTable<()>,
    location_keywords: PhraseTable<()>,
    online_platforms: PhraseTable<()>,
    stop_words: PhraseTable<()>,
    number_pattern: String,
    patterns: Patterns,
}

impl std::fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexicon")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl Lexicon {
    /// The table shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_file(builtin::builtin_file())
    }

    /// The built-in table with `overlays` applied in order.
    pub fn with_overlays(overlays: impl IntoIterator<Item = LexiconFile>) -> Result<Self> {
        let mut file = builtin::builtin_file();
        for overlay in overlays {
            file.extend(overlay);
        }
        Self::from_file(file)
    }

    pub fn from_file(file: LexiconFile) -> Result<Self> {
        validate_lexicon_file(&file)?;

        let (latin_months, thai_months): (Vec<_>, Vec<_>) = file
            .months
            .iter()
            .map(|m| (m.name.clone(), m.month))
            .partition(|(name, _)| name.is_ascii());
        let thai_months = PhraseTable::new(thai_months).alternation();
        let latin_months = PhraseTable::new(latin_months).alternation();

        let numbers = PhraseTable::new(file.numbers.into_iter().map(|n| (n.word, n.value)));
        let number_pattern = numbers.alternation();
        let patterns = Patterns::compile(&number_pattern, &thai_months, &latin_months)?;

        let lexicon = Self {
            idioms: PhraseTable::new(file.idioms.into_iter().map(|i| (i.phrase, i.meaning))),
            weekdays: PhraseTable::new(file.weekdays.into_iter().map(|w| (w.name, w.weekday))),
            months: PhraseTable::new(file.months.into_iter().map(|m| (m.name, m.month))),
            numbers,
            activities: keyword_table(file.activities),
            person_titles: keyword_table(file.person_titles),
            generic_people: keyword_table(file.generic_people),
            location_keywords: keyword_table(file.location_keywords),
            online_platforms: keyword_table(file.online_platforms),
            stop_words: keyword_table(file.stop_words),
            number_pattern,
            patterns,
        };
        tracing::debug!(stats = ?lexicon.stats(), "lexicon compiled");
        Ok(lexicon)
    }

    pub fn stats(&self) -> LexiconStats {
        let mut stats = LexiconStats {
            weekdays: self.weekdays.len(),
            months: self.months.len(),
            numbers: self.numbers.len(),
            activities: self.activities.len(),
            person_titles: self.person_titles.len(),
            generic_people: self.generic_people.len(),
            location_keywords: self.location_keywords.len(),
            online_platforms: self.online_platforms.len(),
            stop_words: self.stop_words.len(),
            ..LexiconStats::default()
        };
        for meaning in self.idioms.values() {
            match meaning {
                IdiomMeaning::DayOffset { .. } => stats.day_offsets += 1,
                IdiomMeaning::Clock { .. } => stats.clock_idioms += 1,
                IdiomMeaning::Period { .. } => stats.periods += 1,
            }
        }
        stats
    }

    /// DATE and TIME regions, non-overlapping, with adjacent regions of one
    /// category joined when only a connector separates them.
    pub fn temporal_hits(&self, text: &str) -> Vec<LexHit> {
        let mut raw = Vec::new();

        for re in &self.patterns.times {
            for found in re.find_iter(text) {
                if at_boundary(text, found.start(), found.end()) {
                    raw.push(LexHit::new(EntityCategory::Time, found.start(), found.end()));
                }
            }
        }

        for re in &self.patterns.dates {
            for caps in re.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                let mut end = whole.end();
                if let Some(year) = caps.name("year") {
                    if starts_with_time_marker(&text[end..]) {
                        end = year.start();
                    }
                }
                if at_boundary(text, whole.start(), end) {
                    raw.push(LexHit::new(EntityCategory::Date, whole.start(), end));
                }
            }
        }

        for found in self.idioms.find_all(text) {
            let hit = match self.idioms.value(&found) {
                IdiomMeaning::DayOffset { .. } => {
                    LexHit::new(EntityCategory::Date, found.start, found.end)
                }
                IdiomMeaning::Clock { .. } => {
                    let end = self
                        .patterns
                        .half_hour
                        .find(&text[found.end..])
                        .map_or(found.end, |half| found.end + half.end());
                    LexHit::new(EntityCategory::Time, found.start, end)
                }
                IdiomMeaning::Period { .. } => {
                    LexHit::new(EntityCategory::Time, found.start, found.end)
                }
            };
            raw.push(hit);
        }

        for weekday in self.weekday_refs(text) {
            raw.push(LexHit::new(EntityCategory::Date, weekday.start, weekday.end));
        }

        let kept = keep_leftmost_longest(raw, |hit| (hit.start, hit.end));
        merge_connected(text, kept)
    }

    pub fn activity_hits(&self, text: &str) -> Vec<LexHit> {
        self.activities
            .find_all(text)
            .into_iter()
            .map(|m| LexHit::new(EntityCategory::Activity, m.start, m.end))
            .collect()
    }

    pub fn person_hits(&self, text: &str) -> Vec<LexHit> {
        let stops = self.stop_positions(text);
        let mut raw = Vec::new();

        // Stacked titles such as `ผศ.ดร.` lead one name.
        let titles = self.person_titles.find_all(text);
        let mut i = 0;
        while i < titles.len() {
            let first = titles[i];
            let mut last = first;
            while let Some(next) = titles
                .get(i + 1)
                .filter(|next| next.start == skip_whitespace(text, last.end))
            {
                last = *next;
                i += 1;
            }
            i += 1;

            let from = skip_whitespace(text, last.end);
            match self.name_run(text, from, &stops) {
                Some((_, end)) => raw.push(LexHit::new(EntityCategory::Person, first.start, end)),
                None if self.generic_people.contains(&text[last.start..last.end]) => {
                    raw.push(LexHit::new(EntityCategory::Person, first.start, last.end))
                }
                None => {}
            }
        }

        for lead in self.patterns.with_name.find_iter(text) {
            if !at_boundary(text, lead.start(), lead.end()) {
                continue;
            }
            let mut from = lead.end();
            while let Some((start, end)) = self.name_run(text, from, &stops) {
                raw.push(LexHit::new(EntityCategory::Person, start, end));
                match self.patterns.name_separator.find(&text[end..]) {
                    Some(sep) => from = end + sep.end(),
                    None => break,
                }
            }
        }

        for generic in self.generic_people.find_all(text) {
            let rest = text[generic.end..].trim_start();
            if GENERIC_PERSON_VERBS.iter().any(|verb| rest.starts_with(verb)) {
                raw.push(LexHit::new(EntityCategory::Person, generic.start, generic.end));
            }
        }

        keep_leftmost_longest(raw, |hit| (hit.start, hit.end))
    }

    pub fn location_hits(&self, text: &str) -> Vec<LexHit> {
        let stops = self.stop_positions(text);
        let mut raw = Vec::new();

        for keyword in self.location_keywords.find_all(text) {
            let mut end = keyword.end;
            if let Some(designator) = self.patterns.designator.find(&text[keyword.end..]) {
                let limit = truncate_at_stops(keyword.end, keyword.end + designator.end(), &stops);
                end = keyword.end + text[keyword.end..limit].trim_end().len();
            }
            raw.push(LexHit::new(EntityCategory::Location, keyword.start, end));
        }

        for platform in self.online_platforms.find_all(text) {
            raw.push(LexHit::new(EntityCategory::Location, platform.start, platform.end));
        }

        for (at, _) in text.match_indices("ที่") {
            let after = at + "ที่".len();
            if text[..at].ends_with("วัน") || !at_boundary(text, at, after) {
                continue;
            }
            let from = skip_whitespace(text, after);
            if let Some((start, end)) = self.name_run(text, from, &stops) {
                raw.push(LexHit::new(EntityCategory::Location, start, end));
            }
        }

        for lead in self.patterns.at_place_en.find_iter(text) {
            let from = lead.end();
            if let Some(place) = self.patterns.latin_place.find(&text[from..]) {
                let limit = truncate_at_stops(from, from + place.end(), &stops);
                let end = from + text[from..limit].trim_end().len();
                if end > from {
                    raw.push(LexHit::new(EntityCategory::Location, from, end));
                }
            }
        }

        keep_leftmost_longest(raw, |hit| (hit.start, hit.end))
    }

    pub fn has_temporal_cue(&self, text: &str) -> bool {
        !self.temporal_hits(text).is_empty()
    }

    pub fn has_activity_cue(&self, text: &str) -> bool {
        self.activities.find_first(text).is_some()
    }

    /// The first day-offset idiom in `text` that is not part of a weekday
    /// expression such as `วันจันทร์สัปดาห์หน้า`.
    pub fn day_offset_in(&self, text: &str) -> Option<i64> {
        let weekdays = self.weekday_refs(text);
        self.idioms.find_all(text).into_iter().find_map(|found| {
            let inside_weekday = weekdays
                .iter()
                .any(|w| found.start >= w.start && found.end <= w.end);
            match self.idioms.value(&found) {
                IdiomMeaning::DayOffset { days } if !inside_weekday => Some(*days),
                _ => None,
            }
        })
    }

    /// The first fixed clock idiom in `text`, as (hour, minute).
    pub fn clock_idiom_in(&self, text: &str) -> Option<(u32, u32)> {
        self.idioms
            .find_all(text)
            .into_iter()
            .find_map(|found| match self.idioms.value(&found) {
                IdiomMeaning::Clock { hour, minute } => Some((*hour, *minute)),
                _ => None,
            })
    }

    pub fn period_in(&self, text: &str) -> Option<DayPeriod> {
        self.idioms
            .find_all(text)
            .into_iter()
            .find_map(|found| match self.idioms.value(&found) {
                IdiomMeaning::Period { period } => Some(*period),
                _ => None,
            })
    }

    pub fn weekday_in(&self, text: &str) -> Option<WeekdayRef> {
        self.weekday_refs(text).into_iter().next()
    }

    pub fn month_in(&self, text: &str) -> Option<MonthRef> {
        self.months.find_first(text).map(|found| MonthRef {
            month: *self.months.value(&found),
            start: found.start,
            end: found.end,
        })
    }

    /// Regex alternation of the number words, longest first.
    pub fn number_pattern(&self) -> &str {
        &self.number_pattern
    }

    /// Value of an ASCII numeral or a table number word.
    pub fn number_value(&self, token: &str) -> Option<u32> {
        let token = token.trim();
        if let Ok(value) = token.parse::<u32>() {
            return Some(value);
        }
        self.numbers
            .find_first(token)
            .filter(|found| found.start == 0 && found.end == token.len())
            .map(|found| *self.numbers.value(&found))
    }

    fn weekday_refs(&self, text: &str) -> Vec<WeekdayRef> {
        self.weekdays
            .find_all(text)
            .into_iter()
            .map(|found| {
                let mut start = found.start;
                let mut end = found.end;
                let mut qualifier = WeekdayQualifier::Upcoming;

                if text[..start].ends_with("วัน") {
                    start -= "วัน".len();
                }
                let head = text[..start].trim_end();
                if head.len() < start {
                    for (word, q) in [("this", WeekdayQualifier::This), ("next", WeekdayQualifier::Next)] {
                        if head.ends_with(word) && at_boundary(head, head.len() - word.len(), head.len()) {
                            start = head.len() - word.len();
                            qualifier = q;
                            break;
                        }
                    }
                }

                let tail = &text[end..];
                let trimmed = tail.trim_start();
                for (suffix, q) in WEEKDAY_SUFFIXES {
                    if trimmed.starts_with(suffix) {
                        end += tail.len() - trimmed.len() + suffix.len();
                        qualifier = *q;
                        break;
                    }
                }

                WeekdayRef {
                    weekday: *self.weekdays.value(&found),
                    qualifier,
                    start,
                    end,
                }
            })
            .collect()
    }

    fn stop_positions(&self, text: &str) -> Vec<usize> {
        let mut stops: Vec<usize> = self.temporal_hits(text).iter().map(|hit| hit.start).collect();
        for table in [
            &self.activities,
            &self.stop_words,
            &self.location_keywords,
            &self.online_platforms,
        ] {
            stops.extend(table.find_all(text).iter().map(|m| m.start));
        }
        stops.sort_unstable();
        stops.dedup();
        stops
    }

    /// A name-like run starting at `from`, cut at the next stop position and
    /// at the end of a leading generic person word.
    fn name_run(&self, text: &str, from: usize, stops: &[usize]) -> Option<(usize, usize)> {
        if from >= text.len() || stops.binary_search(&from).is_ok() {
            return None;
        }
        let run = self.patterns.name_run.find(&text[from..])?;
        let mut end = truncate_at_stops(from, from + run.end(), stops);
        if let Some(generic) = self.generic_people.find_first(&text[from..end]) {
            if generic.start == 0 {
                end = from + generic.end;
            }
        }
        let name = &text[from..end];
        if name.chars().count() < 2 || self.stop_words.contains(name) {
            return None;
        }
        Some((from, end))
    }
}

/// Read one overlay file.
pub fn read_lexicon_file(path: &Path) -> Result<LexiconFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read lexicon file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse lexicon file: {}", path.display()))
}

/// Largest day offset an idiom may carry, in either direction.
pub const MAX_DAY_OFFSET: i64 = 3_660;

/// Check a table or overlay before it is compiled.
pub fn validate_lexicon_file(file: &LexiconFile) -> Result<()> {
    for idiom in &file.idioms {
        match idiom.meaning {
            IdiomMeaning::Clock { hour, minute } if hour > 23 || minute > 59 => {
                bail!("clock idiom '{}' has invalid time {hour}:{minute:02}", idiom.phrase);
            }
            IdiomMeaning::DayOffset { days } if !(-MAX_DAY_OFFSET..=MAX_DAY_OFFSET).contains(&days) => {
                bail!(
                    "day offset idiom '{}' is {days} days, more than {MAX_DAY_OFFSET}",
                    idiom.phrase
                );
            }
            _ => {}
        }
    }
    for month in &file.months {
        if !(1..=12).contains(&month.month) {
            bail!("month name '{}' maps to invalid month {}", month.name, month.month);
        }
    }
    for number in &file.numbers {
        if number.word.trim().is_empty() {
            bail!("number word for {} is empty", number.value);
        }
    }
    Ok(())
}

fn keyword_table(words: Vec<String>) -> PhraseTable<()> {
    PhraseTable::new(words.into_iter().map(|word| (word, ())))
}

fn skip_whitespace(text: &str, from: usize) -> usize {
    from + (text[from..].len() - text[from..].trim_start().len())
}

fn truncate_at_stops(start: usize, end: usize, stops: &[usize]) -> usize {
    stops
        .iter()
        .copied()
        .find(|&stop| stop > start && stop < end)
        .unwrap_or(end)
}

fn merge_connected(text: &str, hits: Vec<LexHit>) -> Vec<LexHit> {
    let mut merged: Vec<LexHit> = Vec::with_capacity(hits.len());
    for hit in hits {
        if let Some(last) = merged.last_mut() {
            if last.category == hit.category && CONNECTORS.contains(&text[last.end..hit.start].trim()) {
                last.end = hit.end;
                continue;
            }
        }
        merged.push(hit);
    }
    merged
}
