//! Calendar and time values
//!
//! Dates carry optionally-null month/day, so a bare year, a year+month and a
//! full date are all instances of the same type. Normalization and the
//! date-diff borrow use real month lengths with leap-aware February, checked
//! through chrono.

use crate::error::JelError;
use crate::operator::Operator;
use crate::value::Value;
use crate::JelResult;
use chrono::NaiveDate;
use std::cmp::Ordering;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_DAY: i64 = 86_400;
// Ordering estimates for calendar components.
const ESTIMATED_DAYS_PER_MONTH: i64 = 30;
const ESTIMATED_DAYS_PER_YEAR: i64 = 365;

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

fn days_in_month(year: i32, month: i32) -> i32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn previous_month(year: i32, month: i32) -> (i32, i32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// A calendar date with optionally-unknown month and day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    year: i32,
    month: Option<i32>,
    day: Option<i32>,
}

impl Date {
    pub fn new(year: i32, month: Option<i32>, day: Option<i32>) -> JelResult<Self> {
        if day.is_some() && month.is_none() {
            return Err(JelError::Construction(
                "a Date with a day must also carry a month".to_string(),
            ));
        }
        Ok(Date { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<i32> {
        self.month
    }

    pub fn day(&self) -> Option<i32> {
        self.day
    }

    /// Normalize out-of-range month/day values with real month lengths:
    /// month 13 rolls into the next year, day 0 into the prior month.
    pub fn simplify(&self) -> Date {
        let Some(raw_month) = self.month else {
            return *self;
        };
        let mut year = self.year;
        let shifted = raw_month - 1;
        year += shifted.div_euclid(12);
        let mut month = shifted.rem_euclid(12) + 1;

        let Some(mut day) = self.day else {
            return Date {
                year,
                month: Some(month),
                day: None,
            };
        };

        while day < 1 {
            let (py, pm) = previous_month(year, month);
            year = py;
            month = pm;
            day += days_in_month(year, month);
        }
        while day > days_in_month(year, month) {
            day -= days_in_month(year, month);
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        Date {
            year,
            month: Some(month),
            day: Some(day),
        }
    }

    /// Chronological ordering; missing month/day stand in as the start of
    /// the period (month 1, day 1)
    pub fn compare(&self, other: &Date) -> Ordering {
        let key = |d: &Date| (d.year, d.month.unwrap_or(1), d.day.unwrap_or(1));
        key(self).cmp(&key(other))
    }

    /// Calendar difference `self - other`: months compare as year*12+month,
    /// and a negative day difference borrows the preceding month's real
    /// length
    pub fn diff(&self, other: &Date) -> Duration {
        if self.compare(other) == Ordering::Less {
            return other.diff(self).negate();
        }
        let (sy, sm, sd) = (self.year, self.month.unwrap_or(1), self.day.unwrap_or(1));
        let (oy, om, od) = (other.year, other.month.unwrap_or(1), other.day.unwrap_or(1));

        let mut months = (sy as i64 * 12 + sm as i64 - 1) - (oy as i64 * 12 + om as i64 - 1);
        let mut days = sd as i64 - od as i64;
        if days < 0 {
            months -= 1;
            let (by, bm) = previous_month(sy, sm);
            days += days_in_month(by, bm) as i64;
        }
        Duration {
            years: months / 12,
            months: months % 12,
            days,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// Apply a calendar duration: years+months first, then days, then
    /// renormalize. Sub-day components do not apply to dates.
    pub fn add_duration(&self, duration: &Duration, sign: i64) -> JelResult<Date> {
        if duration.hours != 0 || duration.minutes != 0 || duration.seconds != 0 {
            return Err(JelError::unsupported(
                "sub-day duration arithmetic",
                "Date",
            ));
        }
        let year = self.year + (sign * duration.years) as i32;
        let mut month = self.month;
        let mut day = self.day;
        if duration.months != 0 {
            month = Some(month.unwrap_or(1) + (sign * duration.months) as i32);
        }
        if duration.days != 0 {
            day = Some(day.unwrap_or(1) + (sign * duration.days) as i32);
            if month.is_none() {
                month = Some(1);
            }
        }
        // Adding months can land on a day past the shorter month's end;
        // simplify() rolls it forward with real month lengths.
        Ok(Date { year, month, day }.simplify())
    }
}

/// A time of day; arithmetic wraps modulo 24 hours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    hour: i64,
    minute: i64,
    second: i64,
}

impl Time {
    pub fn new(hour: i64, minute: i64, second: i64) -> Self {
        Time::from_seconds(hour * SECONDS_PER_HOUR + minute * SECONDS_PER_MINUTE + second)
    }

    fn from_seconds(total: i64) -> Self {
        let wrapped = total.rem_euclid(SECONDS_PER_DAY);
        Time {
            hour: wrapped / SECONDS_PER_HOUR,
            minute: wrapped % SECONDS_PER_HOUR / SECONDS_PER_MINUTE,
            second: wrapped % SECONDS_PER_MINUTE,
        }
    }

    pub fn hour(&self) -> i64 {
        self.hour
    }

    pub fn minute(&self) -> i64 {
        self.minute
    }

    pub fn second(&self) -> i64 {
        self.second
    }

    pub fn total_seconds(&self) -> i64 {
        self.hour * SECONDS_PER_HOUR + self.minute * SECONDS_PER_MINUTE + self.second
    }
}

/// A calendar duration: signed counts of calendar units, not a fixed span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Duration {
    pub fn new(years: i64, months: i64, days: i64, hours: i64, minutes: i64, seconds: i64) -> Self {
        Duration {
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
        }
    }

    pub fn from_seconds(total: i64) -> Self {
        Duration {
            years: 0,
            months: 0,
            days: 0,
            hours: total / SECONDS_PER_HOUR,
            minutes: total % SECONDS_PER_HOUR / SECONDS_PER_MINUTE,
            seconds: total % SECONDS_PER_MINUTE,
        }
    }

    pub fn negate(&self) -> Duration {
        Duration {
            years: -self.years,
            months: -self.months,
            days: -self.days,
            hours: -self.hours,
            minutes: -self.minutes,
            seconds: -self.seconds,
        }
    }

    /// A fixed-span estimate (year = 365 days, month = 30 days) used for
    /// ordering; calendar durations have no exact total length
    pub fn estimated_seconds(&self) -> i64 {
        (self.years * ESTIMATED_DAYS_PER_YEAR + self.months * ESTIMATED_DAYS_PER_MONTH + self.days)
            * SECONDS_PER_DAY
            + self.hours * SECONDS_PER_HOUR
            + self.minutes * SECONDS_PER_MINUTE
            + self.seconds
    }

    fn componentwise(&self, other: &Duration, sign: i64) -> Duration {
        Duration {
            years: self.years + sign * other.years,
            months: self.months + sign * other.months,
            days: self.days + sign * other.days,
            hours: self.hours + sign * other.hours,
            minutes: self.minutes + sign * other.minutes,
            seconds: self.seconds + sign * other.seconds,
        }
    }

    fn scale(&self, factor: i64) -> Duration {
        Duration {
            years: self.years * factor,
            months: self.months * factor,
            days: self.days * factor,
            hours: self.hours * factor,
            minutes: self.minutes * factor,
            seconds: self.seconds * factor,
        }
    }
}

pub fn date_op(operator: Operator, left: &Date, right: &Value) -> JelResult<Value> {
    match right {
        Value::Duration(d) => match operator {
            Operator::Add => Ok(Value::Date(left.add_duration(d, 1)?)),
            Operator::Subtract => Ok(Value::Date(left.add_duration(d, -1)?)),
            _ => Err(JelError::unsupported(operator, "Date and Duration")),
        },
        Value::Date(r) => match operator {
            Operator::Subtract => Ok(Value::Duration(left.diff(r))),
            Operator::StrictEqual => Ok(Value::Boolean(left == r)),
            Operator::StrictNotEqual => Ok(Value::Boolean(left != r)),
            _ if operator.is_equality() || operator.is_ordering() => {
                Ok(crate::dispatch::comparison(operator, left.compare(r)))
            }
            _ => Err(JelError::unsupported(operator, "Date and Date")),
        },
        _ => Err(JelError::unsupported(
            operator,
            format!("Date and {}", right.type_name()),
        )),
    }
}

pub fn time_op(operator: Operator, left: &Time, right: &Value) -> JelResult<Value> {
    match right {
        Value::Duration(d) => {
            if d.years != 0 || d.months != 0 || d.days != 0 {
                return Err(JelError::unsupported(operator, "Time and a calendar-unit Duration"));
            }
            let shift =
                d.hours * SECONDS_PER_HOUR + d.minutes * SECONDS_PER_MINUTE + d.seconds;
            match operator {
                Operator::Add => Ok(Value::Time(Time::from_seconds(
                    left.total_seconds() + shift,
                ))),
                Operator::Subtract => Ok(Value::Time(Time::from_seconds(
                    left.total_seconds() - shift,
                ))),
                _ => Err(JelError::unsupported(operator, "Time and Duration")),
            }
        }
        Value::Time(r) => match operator {
            Operator::Subtract => Ok(Value::Duration(Duration::from_seconds(
                left.total_seconds() - r.total_seconds(),
            ))),
            _ if operator.is_equality() || operator.is_ordering() => Ok(
                crate::dispatch::comparison(
                    operator,
                    left.total_seconds().cmp(&r.total_seconds()),
                ),
            ),
            _ => Err(JelError::unsupported(operator, "Time and Time")),
        },
        _ => Err(JelError::unsupported(
            operator,
            format!("Time and {}", right.type_name()),
        )),
    }
}

pub fn duration_op(operator: Operator, left: &Duration, right: &Value) -> JelResult<Value> {
    use rust_decimal::prelude::ToPrimitive;
    match right {
        Value::Duration(r) => match operator {
            Operator::Add => Ok(Value::Duration(left.componentwise(r, 1))),
            Operator::Subtract => Ok(Value::Duration(left.componentwise(r, -1))),
            Operator::StrictEqual => Ok(Value::Boolean(left == r)),
            Operator::StrictNotEqual => Ok(Value::Boolean(left != r)),
            _ if operator.is_equality() || operator.is_ordering() => {
                Ok(crate::dispatch::comparison(
                    operator,
                    left.estimated_seconds().cmp(&r.estimated_seconds()),
                ))
            }
            _ => Err(JelError::unsupported(operator, "Duration and Duration")),
        },
        Value::Number(n) if operator == Operator::Multiply => {
            let factor = n
                .fract()
                .is_zero()
                .then(|| n.to_i64())
                .flatten()
                .ok_or_else(|| {
                    JelError::unsupported(operator, "Duration and a non-integer Number")
                })?;
            Ok(Value::Duration(left.scale(factor)))
        }
        _ => Err(JelError::unsupported(
            operator,
            format!("Duration and {}", right.type_name()),
        )),
    }
}

pub fn duration_single_op(operator: Operator, operand: &Duration) -> JelResult<Value> {
    match operator {
        Operator::Negate => Ok(Value::Duration(operand.negate())),
        Operator::Abs => {
            if operand.estimated_seconds() < 0 {
                Ok(Value::Duration(operand.negate()))
            } else {
                Ok(Value::Duration(*operand))
            }
        }
        _ => Err(JelError::unsupported(operator, "Duration")),
    }
}
