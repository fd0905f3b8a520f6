//! The keyword table shipped with the crate. Phrases are stored in the
//! canonical form the normalizer produces: NFC, Thai digits folded to ASCII,
//! Latin text lowercased.

use chrono::Weekday;

use crate::table::{
    DayPeriod, IdiomMeaning, LexiconFile, MonthName, NumberWord, TemporalIdiom, WeekdayName,
};

const DAY_OFFSETS: &[(&str, i64)] = &[
    ("วันนี้", 0),
    ("คืนนี้", 0),
    ("today", 0),
    ("tonight", 0),
    ("พรุ่งนี้", 1),
    ("พน.", 1),
    ("พน", 1),
    ("วันถัดไป", 1),
    ("tomorrow", 1),
    ("มะรืนนี้", 2),
    ("มะรืน", 2),
    ("มะลืนนี้", 2),
    ("มะลืน", 2),
    ("day after tomorrow", 2),
    ("เมื่อวาน", -1),
    ("เมื่อวานนี้", -1),
    ("วานนี้", -1),
    ("มะวาน", -1),
    ("yesterday", -1),
    ("เมื่อวานซืน", -2),
    ("สัปดาห์หน้า", 7),
    ("next week", 7),
];

const CLOCK_IDIOMS: &[(&str, u32, u32)] = &[
    ("เที่ยงคืน", 0, 0),
    ("เที่ยงวัน", 12, 0),
    ("เที่ยง", 12, 0),
    ("noon", 12, 0),
    ("midnight", 0, 0),
    ("บ่ายโมง", 13, 0),
    ("บ่ายสอง", 14, 0),
    ("บ่ายสาม", 15, 0),
    ("บ่ายสี่", 16, 0),
    ("บ่ายห้า", 17, 0),
    ("หกโมงเย็น", 18, 0),
    ("หนึ่งทุ่ม", 19, 0),
    ("ทุ่มนึง", 19, 0),
    ("สองทุ่ม", 20, 0),
    ("สามทุ่ม", 21, 0),
    ("สี่ทุ่ม", 22, 0),
    ("ห้าทุ่ม", 23, 0),
];

const PERIODS: &[(&str, DayPeriod)] = &[
    ("ตอนเช้า", DayPeriod::Morning),
    ("ช่วงเช้า", DayPeriod::Morning),
    ("เช้า", DayPeriod::Morning),
    ("morning", DayPeriod::Morning),
    ("ตอนสาย", DayPeriod::LateMorning),
    ("ช่วงสาย", DayPeriod::LateMorning),
    ("ตอนบ่าย", DayPeriod::Afternoon),
    ("ช่วงบ่าย", DayPeriod::Afternoon),
    ("บ่าย", DayPeriod::Afternoon),
    ("afternoon", DayPeriod::Afternoon),
    ("ตอนเย็น", DayPeriod::Evening),
    ("ช่วงเย็น", DayPeriod::Evening),
    ("เย็น", DayPeriod::Evening),
    ("evening", DayPeriod::Evening),
    ("หัวค่ำ", DayPeriod::Night),
    ("ตอนค่ำ", DayPeriod::Night),
    ("ค่ำ", DayPeriod::Night),
    ("night", DayPeriod::Night),
    ("ตอนดึก", DayPeriod::LateNight),
    ("ดึก", DayPeriod::LateNight),
    ("late night", DayPeriod::LateNight),
];

const WEEKDAYS: &[(&str, Weekday)] = &[
    ("จันทร์", Weekday::Mon),
    ("อังคาร", Weekday::Tue),
    ("พุธ", Weekday::Wed),
    ("พฤหัสบดี", Weekday::Thu),
    ("พฤหัส", Weekday::Thu),
    ("ศุกร์", Weekday::Fri),
    ("เสาร์", Weekday::Sat),
    ("อาทิตย์", Weekday::Sun),
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

// Abbreviations are listed without their final dot; the matcher accepts it
// as optional.
const MONTHS: &[(&str, u32)] = &[
    ("มกราคม", 1),
    ("ม.ค", 1),
    ("กุมภาพันธ์", 2),
    ("ก.พ", 2),
    ("มีนาคม", 3),
    ("มี.ค", 3),
    ("เมษายน", 4),
    ("เม.ย", 4),
    ("พฤษภาคม", 5),
    ("พ.ค", 5),
    ("มิถุนายน", 6),
    ("มิ.ย", 6),
    ("กรกฎาคม", 7),
    ("ก.ค", 7),
    ("สิงหาคม", 8),
    ("ส.ค", 8),
    ("กันยายน", 9),
    ("ก.ย", 9),
    ("ตุลาคม", 10),
    ("ต.ค", 10),
    ("พฤศจิกายน", 11),
    ("พ.ย", 11),
    ("ธันวาคม", 12),
    ("ธ.ค", 12),
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

const NUMBERS: &[(&str, u32)] = &[
    ("หนึ่ง", 1),
    ("นึง", 1),
    ("สอง", 2),
    ("สาม", 3),
    ("สี่", 4),
    ("ห้า", 5),
    ("หก", 6),
    ("เจ็ด", 7),
    ("แปด", 8),
    ("เก้า", 9),
    ("สิบ", 10),
    ("สิบเอ็ด", 11),
    ("สิบสอง", 12),
];

const ACTIVITIES: &[&str] = &[
    "ประชุม",
    "meeting",
    "mtg",
    "meetup",
    "meet",
    "นัดหมาย",
    "นัดพบ",
    "นัดเจอ",
    "เลื่อนนัด",
    "ยกเลิกนัด",
    "นัด",
    "เจอกัน",
    "เจอ",
    "พบ",
    "เรียน",
    "สอบ",
    "ติว",
    "นำเสนอ",
    "presentation",
    "present",
    "briefing",
    "brief",
    "ชี้แจง",
    "สัมมนา",
    "workshop",
    "อบรม",
    "สัมภาษณ์",
    "interview",
    "ส่งเอกสาร",
    "ส่งงาน",
    "ส่งรายงาน",
    "submit documents",
    "submit",
    "report",
    "รายงาน",
    "update",
    "อัปเดต",
    "deadline",
    "กินข้าว",
    "ทานข้าว",
    "กินอาหาร",
    "ดินเนอร์",
    "dinner",
    "lunch",
    "ปาร์ตี้",
    "party",
    "งานเลี้ยง",
    "ไปเที่ยว",
    "เที่ยว",
    "ดูหนัง",
    "ดูคอนเสิร์ต",
    "ช้อปปิ้ง",
    "ไปหาหมอ",
    "หาหมอ",
    "เข้าไปหา",
    "ไปหา",
    "ตรวจสุขภาพ",
    "ทำฟัน",
    "ออกกำลังกาย",
    "ฟิตเนส",
    "วิ่ง",
    "ว่ายน้ำ",
    "โยคะ",
    "video call",
    "call",
    "โทรคุย",
    "คุยงาน",
    "เข้าไปคุย",
    "review",
];

const PERSON_TITLES: &[&str] = &[
    "อาจารย์",
    "อจ.",
    "อจ",
    "อ.",
    "บอส",
    "คุณ",
    "นางสาว",
    "นาง",
    "นาย",
    "น.ส.",
    "ดร.",
    "ผศ.",
    "รศ.",
    "ศ.",
    "นพ.",
    "พญ.",
    "ผอ.",
    "พี่",
    "น้อง",
    "mr.",
    "mrs.",
    "ms.",
    "dr.",
];

const GENERIC_PEOPLE: &[&str] = &[
    "อาจารย์",
    "หัวหน้า",
    "บอส",
    "เพื่อนร่วมงาน",
    "เพื่อน",
    "แฟน",
    "ทีม",
    "ลูกค้า",
    "ครอบครัว",
    "พ่อ",
    "แม่",
    "team",
    "boss",
    "client",
];

const LOCATION_KEYWORDS: &[&str] = &[
    "ห้องประชุม",
    "ห้อง",
    "ตึกเรียน",
    "ตึก",
    "อาคาร",
    "ชั้น",
    "โรงพยาบาล",
    "โรงบาล",
    "โรงเรียน",
    "มหาวิทยาลัย",
    "มหาลัย",
    "มหาลับ",
    "มทร.",
    "มทร",
    "rmutp",
    "ราชมงคลพระนคร",
    "คณะวิศวะ",
    "คณะ",
    "วิศวะ",
    "สำนักงาน",
    "ออฟฟิศ",
    "ร้าน",
    "คาเฟ่",
    "สนามบิน",
    "สถานี",
    "บ้าน",
    "office",
    "room",
    "cafe",
];

const ONLINE_PLATFORMS: &[&str] = &[
    "zoom",
    "google meet",
    "ms teams",
    "teams",
    "discord",
    "online",
    "ออนไลน์",
];

const STOP_WORDS: &[&str] = &[
    "ที่",
    "ตอน",
    "เวลา",
    "วัน",
    "และ",
    "กับ",
    "แล้ว",
    "เพื่อ",
    "เรื่อง",
    "ด้วย",
    "หน่อย",
    "นะ",
    "ครับ",
    "ค่ะ",
    "คะ",
    "จะ",
    "ต้อง",
    "ได้",
    "and",
    "with",
    "on",
    "at",
    "to",
    "for",
    "then",
    "in",
];

pub(crate) fn builtin_file() -> LexiconFile {
    let mut idioms = Vec::new();
    idioms.extend(
        DAY_OFFSETS
            .iter()
            .map(|(phrase, days)| TemporalIdiom::new(*phrase, IdiomMeaning::DayOffset { days: *days })),
    );
    idioms.extend(CLOCK_IDIOMS.iter().map(|(phrase, hour, minute)| {
        TemporalIdiom::new(
            *phrase,
            IdiomMeaning::Clock {
                hour: *hour,
                minute: *minute,
            },
        )
    }));
    idioms.extend(
        PERIODS
            .iter()
            .map(|(phrase, period)| TemporalIdiom::new(*phrase, IdiomMeaning::Period { period: *period })),
    );

    LexiconFile {
        idioms,
        weekdays: WEEKDAYS
            .iter()
            .map(|(name, weekday)| WeekdayName {
                name: (*name).to_string(),
                weekday: *weekday,
            })
            .collect(),
        months: MONTHS
            .iter()
            .map(|(name, month)| MonthName {
                name: (*name).to_string(),
                month: *month,
            })
            .collect(),
        numbers: NUMBERS
            .iter()
            .map(|(word, value)| NumberWord {
                word: (*word).to_string(),
                value: *value,
            })
            .collect(),
        activities: owned(ACTIVITIES),
        person_titles: owned(PERSON_TITLES),
        generic_people: owned(GENERIC_PEOPLE),
        location_keywords: owned(LOCATION_KEYWORDS),
        online_platforms: owned(ONLINE_PLATFORMS),
        stop_words: owned(STOP_WORDS),
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
