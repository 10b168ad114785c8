use anyhow::{anyhow, Context, Result};
use chrono::{prelude::*, Duration, Months};
use once_cell::sync::Lazy;
use regex::Regex;

const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

static RELATIVE_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\+(\d{1,4})([dwm])$").ok());

/// A resolved schedule, either a whole calendar day or a precise instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
}

impl Schedule {
    /// Wire representation sent as `scheduledAt`.
    pub fn to_wire(&self) -> String {
        match self {
            Schedule::Date(date) => date.format("%Y-%m-%d").to_string(),
            Schedule::DateTime(at) => at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Schedule::Date(date) => *date,
            Schedule::DateTime(at) => at.date_naive(),
        }
    }
}

/// Resolve a stored `scheduledAt` value to the calendar date it falls on in `tz`.
///
/// Date-only values are calendar dates already and are returned unchanged. Values with an
/// offset are converted into `tz` first. Naive date-times are read as wall-clock time.
pub fn scheduled_date<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(tz).date_naive());
    }

    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.date())
}

/// Parse a human schedule spec relative to the current local time.
pub fn parse_schedule_spec(spec: &str) -> Result<Schedule> {
    parse_schedule_spec_at(spec, Local::now())
}

pub fn parse_schedule_spec_at<Tz: TimeZone>(spec: &str, now: DateTime<Tz>) -> Result<Schedule> {
    let trimmed = spec.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Date specification cannot be empty"));
    }

    let lower = trimmed.to_ascii_lowercase();
    let today = now.date_naive();
    let tz = now.timezone();

    match lower.as_str() {
        "today" => return Ok(Schedule::Date(today)),
        "tomorrow" => return Ok(Schedule::Date(today + Duration::days(1))),
        _ => {}
    }

    if lower.starts_with('+') {
        return parse_relative_spec(&lower, today).map(Schedule::Date);
    }

    if let Some(weekday) = parse_weekday(&lower) {
        let mut days_ahead = (weekday.num_days_from_monday() as i64
            - today.weekday().num_days_from_monday() as i64)
            .rem_euclid(7);
        if days_ahead == 0 {
            days_ahead = 7;
        }
        return Ok(Schedule::Date(today + Duration::days(days_ahead)));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Schedule::DateTime(parsed));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Schedule::Date(date));
    }

    if let Some(naive) = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return resolve_local(&tz, naive, trimmed);
    }

    if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M") {
        return resolve_local(&tz, today.and_time(time), trimmed);
    }

    Err(anyhow!(
        "Unrecognized date specification '{}'. Try YYYY-MM-DD, YYYY-MM-DDTHH:MM, today, tomorrow, +3d, mon",
        spec
    ))
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime, spec: &str) -> Result<Schedule> {
    let local = tz
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| anyhow!("Could not resolve local time for '{}'", spec))?;
    Ok(Schedule::DateTime(local.fixed_offset()))
}

fn parse_relative_spec(spec: &str, today: NaiveDate) -> Result<NaiveDate> {
    let captures = RELATIVE_RE
        .as_ref()
        .and_then(|re| re.captures(spec))
        .ok_or_else(|| anyhow!("Relative date '{}' must look like +3d, +2w or +1m", spec))?;
    let value: u32 = captures[1].parse().context("Invalid relative offset")?;
    let shifted = match &captures[2] {
        "d" => today.checked_add_signed(Duration::days(value.into())),
        "w" => today.checked_add_signed(Duration::weeks(value.into())),
        "m" => today.checked_add_months(Months::new(value)),
        other => {
            return Err(anyhow!(
                "Unsupported relative unit '{}'. Use d, w, or m.",
                other
            ))
        }
    };
    shifted.ok_or_else(|| anyhow!("Relative date '{}' is out of range", spec))
}

fn parse_weekday(label: &str) -> Option<Weekday> {
    match label {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}
