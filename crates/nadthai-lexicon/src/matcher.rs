use anyhow::{Context, Result};
use regex::Regex;

/// Position of a phrase-table entry inside a searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PhraseMatch {
    pub start: usize,
    pub end: usize,
    pub index: usize,
}

/// Phrases paired with a value, kept longest first so that matching prefers
/// `เมื่อวานซืน` over `เมื่อวาน`.
#[derive(Debug, Clone)]
pub(crate) struct PhraseTable<T> {
    entries: Vec<(String, T)>,
}

impl<T> PhraseTable<T> {
    pub(crate) fn new(entries: impl IntoIterator<Item = (String, T)>) -> Self {
        let mut entries: Vec<(String, T)> = entries
            .into_iter()
            .map(|(phrase, value)| (phrase.trim().to_lowercase(), value))
            .filter(|(phrase, _)| !phrase.is_empty())
            .collect();
        entries.sort_by(|(a, _), (b, _)| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        entries.dedup_by(|a, b| a.0 == b.0);
        Self { entries }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn phrases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(phrase, _)| phrase.as_str())
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub(crate) fn value(&self, found: &PhraseMatch) -> &T {
        &self.entries[found.index].1
    }

    pub(crate) fn contains(&self, phrase: &str) -> bool {
        self.entries.iter().any(|(p, _)| p == phrase)
    }

    /// Every boundary-respecting occurrence, non-overlapping, leftmost first.
    pub(crate) fn find_all(&self, text: &str) -> Vec<PhraseMatch> {
        let mut candidates = Vec::new();
        for (index, (phrase, _)) in self.entries.iter().enumerate() {
            for (start, _) in text.match_indices(phrase.as_str()) {
                let end = start + phrase.len();
                if at_boundary(text, start, end) {
                    candidates.push(PhraseMatch { start, end, index });
                }
            }
        }
        keep_leftmost_longest(candidates, |m| (m.start, m.end))
    }

    pub(crate) fn find_first(&self, text: &str) -> Option<PhraseMatch> {
        self.find_all(text).into_iter().next()
    }

    /// Regex alternation over the phrases, longest first.
    pub(crate) fn alternation(&self) -> String {
        self.phrases()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Greedy selection of non-overlapping ranges: earlier start wins, ties go to
/// the longer range.
pub(crate) fn keep_leftmost_longest<T>(
    mut items: Vec<T>,
    range: impl Fn(&T) -> (usize, usize),
) -> Vec<T> {
    items.sort_by(|a, b| {
        let (start_a, end_a) = range(a);
        let (start_b, end_b) = range(b);
        start_a.cmp(&start_b).then(end_b.cmp(&end_a))
    });
    let mut kept = Vec::with_capacity(items.len());
    let mut cursor = 0;
    for item in items {
        let (start, end) = range(&item);
        if start >= cursor && end > start {
            cursor = end;
            kept.push(item);
        }
    }
    kept
}

fn is_thai(c: char) -> bool {
    ('\u{0E01}'..='\u{0E5B}').contains(&c)
}

fn is_thai_consonant(c: char) -> bool {
    ('\u{0E01}'..='\u{0E2E}').contains(&c)
}

fn is_thai_leading_vowel(c: char) -> bool {
    ('\u{0E40}'..='\u{0E44}').contains(&c)
}

/// Vowels and marks that attach to the preceding consonant. A match followed
/// by one of these ends in the middle of a syllable.
fn is_thai_trailing(c: char) -> bool {
    matches!(c, '\u{0E30}'..='\u{0E3A}' | '\u{0E45}' | '\u{0E47}'..='\u{0E4E}')
}

/// Whether `text[start..end]` can stand as a word. Latin text needs ASCII word
/// boundaries; Thai text, which has no spaces between words, must not cut a
/// syllable on either side.
pub fn at_boundary(text: &str, start: usize, end: usize) -> bool {
    let phrase = &text[start..end];
    let (Some(first), Some(last)) = (phrase.chars().next(), phrase.chars().next_back()) else {
        return false;
    };
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();

    if first.is_ascii_alphanumeric() && before.is_some_and(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    if last.is_ascii_alphanumeric() && after.is_some_and(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    if is_thai(last) && after.is_some_and(is_thai_trailing) {
        return false;
    }
    if is_thai_consonant(first) && before.is_some_and(is_thai_leading_vowel) {
        return false;
    }
    true
}

/// Whether `rest` opens with something that reads as a clock time, so a
/// number just before it is an hour rather than a year.
pub fn starts_with_time_marker(rest: &str) -> bool {
    let rest = rest.trim_start();
    const WORDS: &[&str] = &["โมง", "ทุ่ม", "นาฬิกา", "น.", "am", "pm", "a.m.", "p.m.", "o'clock"];
    if WORDS.iter().any(|word| rest.starts_with(word)) {
        return true;
    }
    let mut chars = rest.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(':' | '.'), Some(d)) if d.is_ascii_digit()
    )
}

pub(crate) const THAI_WORD: &str = r"[\x{0E01}-\x{0E4E}a-z][\x{0E01}-\x{0E4E}a-z]*";

/// Regexes compiled once from the table's number words and month names.
#[derive(Debug, Clone)]
pub(crate) struct Patterns {
    pub times: Vec<Regex>,
    /// Date patterns; a `year` group, when present, is optional trailing text.
    pub dates: Vec<Regex>,
    pub half_hour: Regex,
    pub name_run: Regex,
    pub latin_place: Regex,
    pub designator: Regex,
    pub with_name: Regex,
    pub name_separator: Regex,
    pub at_place_en: Regex,
}

impl Patterns {
    pub(crate) fn compile(numbers: &str, thai_months: &str, latin_months: &str) -> Result<Self> {
        let num = format!("(?:{numbers}|[0-9]{{1,2}})");
        let times = [
            r"(?:เวลา\s*)?[0-9]{1,2}[:.][0-9]{2}(?:\s*(?:น\.|นาฬิกา))?(?:\s*(?:-|–|~|ถึง|to)\s*[0-9]{1,2}(?:[:.][0-9]{2})?(?:\s*(?:น\.|นาฬิกา))?)?".to_string(),
            format!(r"(?:ตอน|ช่วง)?บ่าย\s*{num}(?:\s*โมง)?(?:\s*ครึ่ง)?"),
            format!(r"(?:เวลา\s*)?{num}\s*โมง(?:\s*(?:เช้า|เย็น|ตรง))?(?:\s*ครึ่ง|\s*[0-9]{{1,2}}\s*นาที)?"),
            format!(r"{num}\s*ทุ่ม(?:\s*ครึ่ง)?"),
            format!(r"ตี\s*{num}(?:\s*ครึ่ง)?"),
            r"(?-u:\b)[0-9]{1,2}(?:[:.][0-9]{2})?\s*(?:a\.m\.|p\.m\.|am(?-u:\b)|pm(?-u:\b))".to_string(),
            r"(?-u:\b)[0-9]{1,2}\s*o'?clock(?-u:\b)".to_string(),
            r"(?:เวลา\s*|(?-u:\b)at\s+)[0-9]{1,2}(?:[:.][0-9]{2})?".to_string(),
        ];
        let dates = [
            r"(?-u:\b)[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}(?-u:\b)".to_string(),
            r"(?-u:\b)[0-9]{1,2}/[0-9]{1,2}(?:/[0-9]{2,4})?(?-u:\b)".to_string(),
            format!(
                r"(?:วันที่\s*)?[0-9]{{1,2}}\s*(?:{thai_months})\.?(?P<year>\s*(?:พ\.ศ\.|ค\.ศ\.)?\s*(?:[0-9]{{4}}|[0-9]{{2}}))?"
            ),
            format!(
                r"(?-u:\b)[0-9]{{1,2}}(?:st|nd|rd|th)?\s+(?:{latin_months})(?-u:\b)\.?(?P<year>,?\s*[0-9]{{4}})?"
            ),
            format!(
                r"(?-u:\b)(?:{latin_months})\.?\s+[0-9]{{1,2}}(?:st|nd|rd|th)?(?-u:\b)(?P<year>,?\s*[0-9]{{4}})?"
            ),
        ];

        Ok(Self {
            times: compile_all(&times)?,
            dates: compile_all(&dates)?,
            half_hour: Regex::new(r"^\s*ครึ่ง")?,
            name_run: Regex::new(&format!("^{THAI_WORD}"))?,
            latin_place: Regex::new(r"^[a-z][a-z0-9'-]*(?:\s+[a-z][a-z0-9'-]*){0,2}")?,
            designator: Regex::new(
                r"^(?:\s*[0-9a-z][0-9a-z./-]*|[\x{0E01}-\x{0E4E}0-9][\x{0E01}-\x{0E4E}0-9]*)",
            )?,
            with_name: Regex::new(r"(?:กับ|(?-u:\b)with(?-u:\b))\s*")?,
            name_separator: Regex::new(r"^\s*(?:และ|,|(?-u:\b)and(?-u:\b))\s*")?,
            at_place_en: Regex::new(r"(?-u:\b)at\s+")?,
        })
    }
}

fn compile_all(sources: &[String]) -> Result<Vec<Regex>> {
    sources
        .iter()
        .map(|source| {
            Regex::new(source).with_context(|| format!("failed to compile pattern: {source}"))
        })
        .collect()
}
