//! The quick-add mini-language: free text in, structured task fields out.
//!
//! Recognized cues: a 12-hour time (`4pm`, `11:30am`), `today`, `tomorrow`,
//! `ASAP` / `!!` (urgent), `~` (defer to backlog), `@name` (client mention).
//! Each rule strips its match from the working title, so cues combine in one
//! input in any order. Rule order is a documented contract: time, date,
//! urgency, deferral, mentions, whitespace cleanup.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;

use crate::model::{Bucket, Priority};
use crate::parse::time::ClockTime;

static TIME_CUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").expect("time cue"));
static TOMORROW_CUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btomorrow\b").expect("tomorrow cue"));
static TODAY_CUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btoday\b").expect("today cue"));
static ASAP_CUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\basap\b").expect("asap cue"));
static MENTION_CUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@(\w+)").expect("mention cue"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("ws"));

/// Structured fields extracted from one quick-add input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickAdd {
    /// What's left after stripping all cues; may be empty (caller rejects)
    pub title: String,
    /// Normalized time like `4PM`, or None
    pub scheduled_time: Option<String>,
    /// Creation day, or the next day if `tomorrow` was present
    pub scheduled_date: NaiveDate,
    pub priority: Priority,
    pub bucket: Bucket,
    /// Tokens found after `@`, in input order; resolution happens upstream
    pub mentions: Vec<String>,
}

/// Parse one quick-add input. Total: never fails, empty titles are the
/// caller's problem.
pub fn parse_quick_add(raw: &str, today: NaiveDate) -> QuickAdd {
    let mut title = raw.to_string();

    let scheduled_time = strip_time_cue(&mut title);
    let scheduled_date = strip_date_cue(&mut title, today);
    let urgent = strip_urgency_cue(&mut title);
    let deferred = strip_deferral_cue(&mut title);
    let mentions = strip_mention_cues(&mut title);

    // Urgency outranks deferral: a `~` alongside ASAP/!! is stripped but
    // does not demote the task.
    let (priority, bucket) = if urgent {
        (Priority::Now, Bucket::Today)
    } else if deferred {
        (Priority::Later, Bucket::Backlog)
    } else {
        (Priority::Normal, Bucket::Today)
    };

    QuickAdd {
        title: collapse_whitespace(&title),
        scheduled_time,
        scheduled_date,
        priority,
        bucket,
        mentions,
    }
}

/// Rule 1 — time cue. Takes the first match that is a valid 12-hour time
/// (hour 1–12, minute 00–59) and strips it. Time-shaped text that fails
/// validation stays in the title rather than being silently guessed.
pub fn strip_time_cue(title: &mut String) -> Option<String> {
    let mut found: Option<(std::ops::Range<usize>, String)> = None;
    for caps in TIME_CUE.captures_iter(title) {
        let Ok(hour) = caps[1].parse::<u32>() else {
            continue;
        };
        let minute: u32 = match caps.get(2) {
            Some(m) => match m.as_str().parse() {
                Ok(v) => v,
                Err(_) => continue,
            },
            None => 0,
        };
        if !(1..=12).contains(&hour) || minute > 59 {
            continue;
        }
        let time = ClockTime {
            hour,
            minute,
            pm: caps[3].eq_ignore_ascii_case("pm"),
        };
        let Some(matched) = caps.get(0) else {
            continue;
        };
        found = Some((matched.range(), time.normalized()));
        break;
    }
    let (range, normalized) = found?;
    title.replace_range(range, "");
    Some(normalized)
}

/// Rule 2 — date cue. `tomorrow` advances the date one calendar day;
/// `today` is recognized and stripped but leaves the default date.
pub fn strip_date_cue(title: &mut String, today: NaiveDate) -> NaiveDate {
    if TOMORROW_CUE.is_match(title) {
        *title = TOMORROW_CUE.replace_all(title, "").into_owned();
        today.checked_add_days(Days::new(1)).unwrap_or(today)
    } else {
        if TODAY_CUE.is_match(title) {
            *title = TODAY_CUE.replace_all(title, "").into_owned();
        }
        today
    }
}

/// Rule 3 — urgency cue. `ASAP` (word) or `!!`; both are stripped when
/// present.
pub fn strip_urgency_cue(title: &mut String) -> bool {
    let mut urgent = false;
    if ASAP_CUE.is_match(title) {
        *title = ASAP_CUE.replace_all(title, "").into_owned();
        urgent = true;
    }
    if title.contains("!!") {
        *title = title.replace("!!", "");
        urgent = true;
    }
    urgent
}

/// Rule 4 — deferral cue. Any `~` is stripped; returns whether one was seen.
pub fn strip_deferral_cue(title: &mut String) -> bool {
    if title.contains('~') {
        *title = title.replace('~', "");
        true
    } else {
        false
    }
}

/// Rule 5 — mention cue. `@word` sequences never leak into the final title;
/// the tokens are handed back for client resolution upstream.
pub fn strip_mention_cues(title: &mut String) -> Vec<String> {
    let mentions: Vec<String> = MENTION_CUE
        .captures_iter(title)
        .map(|c| c[1].to_string())
        .collect();
    if !mentions.is_empty() {
        *title = MENTION_CUE.replace_all(title, "").into_owned();
    }
    mentions
}

/// Rule 6 — stripping leaves gaps; collapse runs of whitespace and trim.
pub fn collapse_whitespace(title: &str) -> String {
    WHITESPACE.replace_all(title, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    #[test]
    fn plain_text_gets_defaults() {
        let got = parse_quick_add("Send invoice", day());
        assert_eq!(got.title, "Send invoice");
        assert_eq!(got.scheduled_time, None);
        assert_eq!(got.scheduled_date, day());
        assert_eq!(got.priority, Priority::Normal);
        assert_eq!(got.bucket, Bucket::Today);
        assert!(got.mentions.is_empty());
    }

    #[test]
    fn time_cue_is_extracted_and_normalized() {
        let got = parse_quick_add("Call Tom at 4pm", day());
        assert_eq!(got.title, "Call Tom at");
        assert_eq!(got.scheduled_time.as_deref(), Some("4PM"));
        assert_eq!(got.priority, Priority::Normal);
        assert_eq!(got.bucket, Bucket::Today);
    }

    #[test]
    fn time_with_minutes_and_inner_space() {
        let got = parse_quick_add("standup 11:30 am tomorrow", day());
        assert_eq!(got.scheduled_time.as_deref(), Some("11:30AM"));
        assert_eq!(got.title, "standup");
        assert_eq!(got.scheduled_date, day().succ_opt().unwrap());
    }

    #[test]
    fn malformed_time_stays_in_title() {
        let got = parse_quick_add("migrate at 13pm", day());
        assert_eq!(got.scheduled_time, None);
        assert_eq!(got.title, "migrate at 13pm");

        let got = parse_quick_add("review 7:75pm draft", day());
        assert_eq!(got.scheduled_time, None);
        assert_eq!(got.title, "review 7:75pm draft");
    }

    #[test]
    fn first_valid_time_wins() {
        let got = parse_quick_add("move 13pm sync to 3pm", day());
        assert_eq!(got.scheduled_time.as_deref(), Some("3PM"));
        assert_eq!(got.title, "move 13pm sync to");
    }

    #[test]
    fn today_is_stripped_but_date_stays_default() {
        let got = parse_quick_add("pay rent today", day());
        assert_eq!(got.title, "pay rent");
        assert_eq!(got.scheduled_date, day());
    }

    #[test]
    fn tomorrow_advances_one_day() {
        let got = parse_quick_add("Ship build Tomorrow", day());
        assert_eq!(got.title, "Ship build");
        assert_eq!(got.scheduled_date, day().succ_opt().unwrap());
    }

    #[test]
    fn asap_sets_priority_now() {
        let got = parse_quick_add("Fix homepage ASAP", day());
        assert_eq!(got.title, "Fix homepage");
        assert_eq!(got.priority, Priority::Now);
        assert_eq!(got.bucket, Bucket::Today);
    }

    #[test]
    fn double_bang_sets_priority_now() {
        let got = parse_quick_add("Restart server !!", day());
        assert_eq!(got.title, "Restart server");
        assert_eq!(got.priority, Priority::Now);
    }

    #[test]
    fn both_urgency_cues_are_stripped() {
        let got = parse_quick_add("deploy ASAP !!", day());
        assert_eq!(got.title, "deploy");
        assert_eq!(got.priority, Priority::Now);
    }

    #[test]
    fn tilde_defers_to_backlog() {
        let got = parse_quick_add("Write report ~", day());
        assert_eq!(got.title, "Write report");
        assert_eq!(got.priority, Priority::Later);
        assert_eq!(got.bucket, Bucket::Backlog);
    }

    #[test]
    fn urgency_outranks_deferral_but_tilde_still_stripped() {
        let got = parse_quick_add("triage queue ASAP ~", day());
        assert_eq!(got.title, "triage queue");
        assert_eq!(got.priority, Priority::Now);
        assert_eq!(got.bucket, Bucket::Today);
    }

    #[test]
    fn mentions_are_collected_and_never_leak() {
        let got = parse_quick_add("send deck @acme tomorrow 4pm", day());
        assert_eq!(got.title, "send deck");
        assert_eq!(got.mentions, vec!["acme".to_string()]);
        assert_eq!(got.scheduled_time.as_deref(), Some("4PM"));
        assert_eq!(got.scheduled_date, day().succ_opt().unwrap());
    }

    #[test]
    fn cues_combine_in_any_order() {
        let a = parse_quick_add("ASAP call Tom 4pm tomorrow", day());
        let b = parse_quick_add("call Tom tomorrow 4pm ASAP", day());
        assert_eq!(a.scheduled_time, b.scheduled_time);
        assert_eq!(a.scheduled_date, b.scheduled_date);
        assert_eq!(a.priority, b.priority);
        assert_eq!(a.title, "call Tom");
        assert_eq!(b.title, "call Tom");
    }

    #[test]
    fn all_cues_stripped_leaves_empty_title() {
        let got = parse_quick_add("ASAP tomorrow 4pm @acme ~", day());
        assert_eq!(got.title, "");
    }

    #[test]
    fn whitespace_is_collapsed() {
        let got = parse_quick_add("  fix   spacing   today  ", day());
        assert_eq!(got.title, "fix spacing");
    }
}
