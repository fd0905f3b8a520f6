use std::sync::Arc;

use nadthai_lexicon::{at_boundary, Lexicon};
use nadthai_schema::CandidateSpan;
use regex::Regex;

const SPLIT_PATTERN: &str =
    r"\s*(?:แล้วก็|แล้ว|และ|กับ|พร้อม|,|;|\s/\s|(?-u:\b)(?:and|then)(?-u:\b))\s*";

/// Joiners that usually introduce a participant rather than a second event.
const PARTICIPANT_CUES: &[&str] = &["กับ", "พร้อม"];

/// Splits a normalized message into per-event spans.
///
/// A conjunction or separator only splits when both sides carry an activity
/// cue, or both sides carry a temporal cue and the separator does not join
/// two dates or two times into a range (`วันจันทร์และวันอังคาร`). `กับ` and
/// `พร้อม` need an activity on both sides.
pub struct Segmenter {
    lexicon: Arc<Lexicon>,
    splitter: Regex,
}

impl Segmenter {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            splitter: Regex::new(SPLIT_PATTERN).expect("split pattern is valid"),
        }
    }

    pub fn segment(&self, text: &str) -> Vec<CandidateSpan> {
        let cues: Vec<(usize, usize)> = self
            .splitter
            .find_iter(text)
            .filter(|cue| {
                let word = cue.as_str().trim();
                word.is_ascii() || {
                    let start = cue.start() + (cue.as_str().len() - cue.as_str().trim_start().len());
                    at_boundary(text, start, start + word.len())
                }
            })
            .map(|cue| (cue.start(), cue.end()))
            .collect();

        let mut spans = Vec::new();
        let mut segment_start = 0;
        for (i, &(cue_start, cue_end)) in cues.iter().enumerate() {
            let right_end = cues.get(i + 1).map_or(text.len(), |next| next.0);
            if cue_start < segment_start || cue_end > right_end {
                continue;
            }
            let left = &text[segment_start..cue_start];
            let right = &text[cue_end..right_end];
            let word = text[cue_start..cue_end].trim();
            if self.is_split(word, left, right) {
                push_trimmed(&mut spans, text, segment_start, cue_start);
                segment_start = cue_end;
            }
        }
        push_trimmed(&mut spans, text, segment_start, text.len());

        tracing::debug!(spans = spans.len(), cues = cues.len(), "segmented message");
        spans
    }

    fn is_split(&self, word: &str, left: &str, right: &str) -> bool {
        if left.trim().is_empty() || right.trim().is_empty() {
            return false;
        }
        if self.lexicon.has_activity_cue(left) && self.lexicon.has_activity_cue(right) {
            return true;
        }
        if PARTICIPANT_CUES.contains(&word) {
            return false;
        }
        let left_times = self.lexicon.temporal_hits(left);
        let right_times = self.lexicon.temporal_hits(right);
        let (Some(last), Some(first)) = (left_times.last(), right_times.first()) else {
            return false;
        };
        let joins_range = last.category == first.category
            && left[last.end..].trim().is_empty()
            && right[..first.start].trim().is_empty();
        !joins_range
    }
}

fn push_trimmed(spans: &mut Vec<CandidateSpan>, text: &str, start: usize, end: usize) {
    let raw = &text[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let offset = start + (raw.len() - raw.trim_start().len());
    spans.push(CandidateSpan::new(trimmed, offset));
}
