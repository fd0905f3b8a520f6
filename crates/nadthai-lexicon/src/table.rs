use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Coarse part of the day named by idioms such as `ตอนบ่าย` or `evening`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    Morning,
    LateMorning,
    Afternoon,
    Evening,
    Night,
    LateNight,
}

impl DayPeriod {
    /// Clock hour a bare period idiom stands for.
    pub fn default_hour(self) -> u32 {
        match self {
            DayPeriod::Morning => 9,
            DayPeriod::LateMorning => 10,
            DayPeriod::Afternoon => 13,
            DayPeriod::Evening => 17,
            DayPeriod::Night => 19,
            DayPeriod::LateNight => 22,
        }
    }

    /// Whether a twelve-hour value inside this period belongs after noon.
    pub fn is_post_meridiem(self) -> bool {
        matches!(
            self,
            DayPeriod::Afternoon | DayPeriod::Evening | DayPeriod::Night | DayPeriod::LateNight
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdiomMeaning {
    /// Whole days from the reference date.
    DayOffset { days: i64 },
    /// A fixed clock value.
    Clock {
        hour: u32,
        #[serde(default)]
        minute: u32,
    },
    Period { period: DayPeriod },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalIdiom {
    pub phrase: String,
    #[serde(flatten)]
    pub meaning: IdiomMeaning,
}

impl TemporalIdiom {
    pub fn new(phrase: impl Into<String>, meaning: IdiomMeaning) -> Self {
        Self {
            phrase: phrase.into(),
            meaning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayName {
    pub name: String,
    pub weekday: Weekday,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthName {
    pub name: String,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberWord {
    pub word: String,
    pub value: u32,
}

/// Serialized form of the keyword table. The built-in table and every
/// `lexicon.d/*.yaml` overlay share this shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexiconFile {
    #[serde(default)]
    pub idioms: Vec<TemporalIdiom>,
    #[serde(default)]
    pub weekdays: Vec<WeekdayName>,
    #[serde(default)]
    pub months: Vec<MonthName>,
    #[serde(default)]
    pub numbers: Vec<NumberWord>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub person_titles: Vec<String>,
    #[serde(default)]
    pub generic_people: Vec<String>,
    #[serde(default)]
    pub location_keywords: Vec<String>,
    #[serde(default)]
    pub online_platforms: Vec<String>,
    #[serde(default)]
    pub stop_words: Vec<String>,
}

impl LexiconFile {
    /// Layer `overlay` on top of `self`. Entries keyed by phrase, name or word
    /// are replaced; plain keyword lists are unioned.
    pub fn extend(&mut self, overlay: LexiconFile) {
        for idiom in overlay.idioms {
            self.idioms.retain(|existing| existing.phrase != idiom.phrase);
            self.idioms.push(idiom);
        }
        for weekday in overlay.weekdays {
            self.weekdays.retain(|existing| existing.name != weekday.name);
            self.weekdays.push(weekday);
        }
        for month in overlay.months {
            self.months.retain(|existing| existing.name != month.name);
            self.months.push(month);
        }
        for number in overlay.numbers {
            self.numbers.retain(|existing| existing.word != number.word);
            self.numbers.push(number);
        }
        union_into(&mut self.activities, overlay.activities);
        union_into(&mut self.person_titles, overlay.person_titles);
        union_into(&mut self.generic_people, overlay.generic_people);
        union_into(&mut self.location_keywords, overlay.location_keywords);
        union_into(&mut self.online_platforms, overlay.online_platforms);
        union_into(&mut self.stop_words, overlay.stop_words);
    }
}

fn union_into(target: &mut Vec<String>, extra: Vec<String>) {
    for item in extra {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idiom_yaml_uses_kind_tag() {
        let yaml = r#"
idioms:
  - phrase: "วันพระ"
    kind: day_offset
    days: 0
  - phrase: "บ่ายแก่ๆ"
    kind: clock
    hour: 15
  - phrase: "ยามเช้า"
    kind: period
    period: morning
weekdays:
  - name: "จ."
    weekday: mon
"#;
        let file: LexiconFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.idioms.len(), 3);
        assert_eq!(file.idioms[0].meaning, IdiomMeaning::DayOffset { days: 0 });
        assert_eq!(
            file.idioms[1].meaning,
            IdiomMeaning::Clock {
                hour: 15,
                minute: 0
            }
        );
        assert_eq!(
            file.idioms[2].meaning,
            IdiomMeaning::Period {
                period: DayPeriod::Morning
            }
        );
        assert_eq!(file.weekdays[0].weekday, Weekday::Mon);
        assert!(file.activities.is_empty());
    }

    #[test]
    fn overlay_replaces_idiom_by_phrase() {
        let mut base = LexiconFile {
            idioms: vec![TemporalIdiom::new(
                "เที่ยง",
                IdiomMeaning::Clock {
                    hour: 12,
                    minute: 0,
                },
            )],
            activities: vec!["ประชุม".into()],
            ..LexiconFile::default()
        };
        base.extend(LexiconFile {
            idioms: vec![TemporalIdiom::new(
                "เที่ยง",
                IdiomMeaning::Clock {
                    hour: 12,
                    minute: 30,
                },
            )],
            activities: vec!["ประชุม".into(), "ซ้อมดนตรี".into()],
            ..LexiconFile::default()
        });
        assert_eq!(base.idioms.len(), 1);
        assert_eq!(
            base.idioms[0].meaning,
            IdiomMeaning::Clock {
                hour: 12,
                minute: 30
            }
        );
        assert_eq!(base.activities, vec!["ประชุม", "ซ้อมดนตรี"]);
    }
}
