//! Canonical form for chat text.
//!
//! Thai has several byte sequences for the same visible glyph (tone mark
//! typed before the vowel, `ํ` + `า` instead of `ำ`, two `เ` for `แ`). All
//! later stages match against the single form produced here.

use unicode_normalization::UnicodeNormalization;

const ZERO_WIDTH: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}', '\u{00AD}'];

const SARA_E: char = '\u{0E40}';
const SARA_AE: char = '\u{0E41}';
const SARA_AA: char = '\u{0E32}';
const SARA_AM: char = '\u{0E33}';
const NIKHAHIT: char = '\u{0E4D}';

fn is_tone_mark(c: char) -> bool {
    ('\u{0E48}'..='\u{0E4B}').contains(&c)
}

/// Vowels written above or below the consonant.
fn is_upper_or_lower_vowel(c: char) -> bool {
    c == '\u{0E31}' || ('\u{0E34}'..='\u{0E3A}').contains(&c)
}

fn is_combining_mark(c: char) -> bool {
    is_upper_or_lower_vowel(c) || ('\u{0E47}'..='\u{0E4E}').contains(&c)
}

/// Normalize raw chat text. Idempotent, total, and a no-op on text that is
/// already canonical.
pub fn normalize(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .filter(|c| !ZERO_WIDTH.contains(c))
        .flat_map(|c| {
            let c = match c {
                '\u{0E50}'..='\u{0E59}' => char::from(b'0' + (c as u32 - 0x0E50) as u8),
                c if c.is_whitespace() => ' ',
                c => c,
            };
            c.to_lowercase()
        })
        .collect();

    let mut chars: Vec<char> = mapped.nfc().collect();
    merge_sara_e(&mut chars);
    compose_sara_am(&mut chars);
    order_vowel_before_tone(&mut chars);
    chars.dedup_by(|next, prev| next == prev && is_combining_mark(*next));

    chars
        .into_iter()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn merge_sara_e(chars: &mut Vec<char>) {
    let mut out = Vec::with_capacity(chars.len());
    let mut iter = chars.iter().copied().peekable();
    while let Some(c) = iter.next() {
        if c == SARA_E && iter.peek() == Some(&SARA_E) {
            iter.next();
            out.push(SARA_AE);
        } else {
            out.push(c);
        }
    }
    *chars = out;
}

/// `ํ` `า` becomes `ำ`; a tone mark typed on either side of the `ํ` ends up
/// before the `ำ`.
fn compose_sara_am(chars: &mut Vec<char>) {
    let mut out: Vec<char> = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == NIKHAHIT {
            if chars.get(i + 1) == Some(&SARA_AA) {
                out.push(SARA_AM);
                i += 2;
                continue;
            }
            if let (Some(&tone), Some(&SARA_AA)) = (chars.get(i + 1), chars.get(i + 2)) {
                if is_tone_mark(tone) {
                    out.push(tone);
                    out.push(SARA_AM);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(c);
        i += 1;
    }
    *chars = out;
}

fn order_vowel_before_tone(chars: &mut [char]) {
    let mut swapped = true;
    while swapped {
        swapped = false;
        for i in 1..chars.len() {
            if is_tone_mark(chars[i - 1]) && is_upper_or_lower_vowel(chars[i]) {
                chars.swap(i - 1, i);
                swapped = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "ประชุม  วันจันทร์\t10 โมง",
        "Meeting  WITH Beam",
        "นัด\u{200B}หมาย ๑๐:๓๐",
        "เเม่",
        "ก\u{0E4D}\u{0E32}",
        "น\u{0E4D}\u{0E49}\u{0E32}",
        "ก\u{0E48}\u{0E34}",
        "ดี\u{0E35}\u{0E35}มาก",
        "เเเ",
        "İstanbul ÅNGSTRÖM",
        "no thai at all!",
    ];

    #[test]
    fn idempotent_on_samples() {
        for sample in SAMPLES {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample {sample:?}");
        }
    }

    #[test]
    fn collapses_whitespace_and_lowercases_latin() {
        assert_eq!(normalize("  Meeting \n\n WITH   Beam "), "meeting with beam");
        assert_eq!(normalize("\u{00A0}ประชุม\u{00A0}"), "ประชุม");
    }

    #[test]
    fn empty_and_blank_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n"), "");
    }

    #[test]
    fn thai_digits_become_ascii() {
        assert_eq!(normalize("๑๐:๓๐ น."), "10:30 น.");
    }

    #[test]
    fn zero_width_characters_are_removed() {
        assert_eq!(normalize("นัด\u{200B}หมาย"), "นัดหมาย");
    }

    #[test]
    fn sara_am_is_composed() {
        assert_eq!(normalize("ท\u{0E4D}\u{0E32}งาน"), "ทำงาน");
        assert_eq!(normalize("น\u{0E4D}\u{0E49}\u{0E32}"), "น\u{0E49}\u{0E33}");
    }

    #[test]
    fn double_sara_e_becomes_sara_ae() {
        assert_eq!(normalize("เเฟน"), "แฟน");
    }

    #[test]
    fn vowel_is_placed_before_tone_mark() {
        assert_eq!(normalize("พ\u{0E48}\u{0E35}"), "พ\u{0E35}\u{0E48}");
    }

    #[test]
    fn repeated_marks_collapse() {
        assert_eq!(normalize("ดี\u{0E35}"), "ดี");
    }
}
