use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::format::{Item, StrftimeItems};
use chrono::{
    DateTime, Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday,
};

use crate::ast::TypeKeyword;
use crate::context::EvalContext;
use crate::evaluator::EvalError;
use crate::registry::{Args, OpResult, OpSpec, Registry};
use crate::value::{DataType, DataValue, NumberValue, TextValue};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Seeds with a time component, paired with the pattern used to write them back.
const DATE_TIME_INPUTS: &[(&str, &str)] = &[
    ("%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"),
    ("%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"),
    ("%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M"),
    ("%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M"),
    ("%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M:%S"),
    ("%m/%d/%Y %H:%M", "%m/%d/%Y %H:%M"),
];

const DATE_INPUTS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"];

/// Calendar date and time of day, without a time zone.
///
/// The value remembers the pattern it was written in, so `[DATE(03/14/2024)
/// => addDay(1)]` comes back as `03/15/2024`. `format(pattern)` changes the
/// output pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateValue {
    value: NaiveDateTime,
    format: String,
}

impl DateValue {
    pub fn new(value: NaiveDateTime) -> Self {
        DateValue {
            value,
            format: DATE_TIME_FORMAT.to_string(),
        }
    }

    pub fn value(&self) -> NaiveDateTime {
        self.value
    }

    fn with(self) -> OpResult {
        Ok(Some(self.into_data()))
    }

    fn shifted(mut self, shifted: Option<NaiveDateTime>, function: &str) -> OpResult {
        self.value = shifted.ok_or_else(|| EvalError::InvalidArgument {
            function: function.to_string(),
            reason: "date out of range".to_string(),
        })?;
        self.with()
    }
}

fn parse_seed(text: &str) -> Result<(NaiveDateTime, &'static str), String> {
    let trimmed = text.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "now" => return Ok((Local::now().naive_local(), DATE_TIME_FORMAT)),
        "today" => {
            return Ok((Local::now().date_naive().and_time(NaiveTime::MIN), DATE_FORMAT));
        }
        _ => {}
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok((parsed.naive_local(), "%Y-%m-%dT%H:%M:%S%.f"));
    }
    for (input, output) in DATE_TIME_INPUTS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, input) {
            return Ok((parsed, *output));
        }
    }
    for pattern in DATE_INPUTS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, pattern) {
            return Ok((date.and_time(NaiveTime::MIN), *pattern));
        }
    }

    // epoch milliseconds
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if digits.len() > 8 && digits.chars().all(|c| c.is_ascii_digit()) {
        let millis: i64 = trimmed.parse().map_err(|_| format!("'{}' is out of range", trimmed))?;
        let parsed = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| format!("'{}' is out of range", trimmed))?;
        return Ok((parsed.naive_utc(), DATE_TIME_FORMAT));
    }

    Err(format!("'{}' is not a recognised date", trimmed))
}

fn valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

impl DataType for DateValue {
    fn parse(_keyword: TypeKeyword, text: &str, _ctx: &EvalContext<'_>) -> Result<Self, String> {
        let (value, format) = parse_seed(text)?;
        Ok(DateValue {
            value,
            format: format.to_string(),
        })
    }

    fn stringify(&self) -> Option<String> {
        let mut out = String::new();
        write!(out, "{}", self.value.format(&self.format)).ok()?;
        Some(out)
    }

    fn keyword(&self) -> TypeKeyword {
        TypeKeyword::Date
    }

    fn registry() -> &'static Registry<Self> {
        &REGISTRY
    }

    fn into_data(self) -> DataValue {
        DataValue::Date(self)
    }
}

static REGISTRY: LazyLock<Registry<DateValue>> =
    LazyLock::new(|| Registry::new(TypeKeyword::Date, OPERATIONS));

const OPERATIONS: &[OpSpec<DateValue>] = &[
    OpSpec::fixed("addYear", 1, add_year),
    OpSpec::fixed("addMonth", 1, add_month),
    OpSpec::fixed("addDay", 1, add_day),
    OpSpec::fixed("addHour", 1, add_hour),
    OpSpec::fixed("addMinute", 1, add_minute),
    OpSpec::fixed("addSecond", 1, add_second),
    OpSpec::fixed("format", 1, format),
    OpSpec::fixed("dayOfWeek", 0, day_of_week),
    OpSpec::fixed("epoch", 0, epoch),
];

fn add_months(date: DateValue, months: i64, function: &str) -> OpResult {
    let shifted = u32::try_from(months.unsigned_abs())
        .ok()
        .map(Months::new)
        .and_then(|m| {
            if months < 0 {
                date.value.checked_sub_months(m)
            } else {
                date.value.checked_add_months(m)
            }
        });
    date.shifted(shifted, function)
}

fn add_year(date: DateValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let years = args.int(0, "addYear")?.unwrap_or(0);
    add_months(date, years.saturating_mul(12), "addYear")
}

fn add_month(date: DateValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let months = args.int(0, "addMonth")?.unwrap_or(0);
    add_months(date, months, "addMonth")
}

fn add_delta(
    date: DateValue,
    args: &Args,
    function: &str,
    delta: fn(i64) -> Option<TimeDelta>,
) -> OpResult {
    let amount = args.int(0, function)?.unwrap_or(0);
    let shifted = delta(amount).and_then(|d| date.value.checked_add_signed(d));
    date.shifted(shifted, function)
}

fn add_day(date: DateValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    add_delta(date, args, "addDay", TimeDelta::try_days)
}

fn add_hour(date: DateValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    add_delta(date, args, "addHour", TimeDelta::try_hours)
}

fn add_minute(date: DateValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    add_delta(date, args, "addMinute", TimeDelta::try_minutes)
}

fn add_second(date: DateValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    add_delta(date, args, "addSecond", TimeDelta::try_seconds)
}

/// Sets the strftime pattern used when the date is written out.
fn format(mut date: DateValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let pattern = args.get_or(0, DATE_TIME_FORMAT);
    if !valid_pattern(pattern) {
        return Err(EvalError::InvalidArgument {
            function: "format".to_string(),
            reason: format!("invalid date pattern '{}'", pattern),
        });
    }
    date.format = pattern.to_string();
    date.with()
}

fn day_of_week(date: DateValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let name = match date.value.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    };
    Ok(Some(TextValue::new(name).into_data()))
}

/// Milliseconds since the Unix epoch, reading the value as UTC.
fn epoch(date: DateValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let millis = date.value.and_utc().timestamp_millis();
    Ok(Some(NumberValue::from(millis).into_data()))
}
