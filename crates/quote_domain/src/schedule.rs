//! Anchor arithmetic for recurring notifications.
//!
//! Anchors are computed in the caller's time zone on wall-clock dates, so a
//! "07:00" anchor stays at 07:00 local across offset changes.

use chrono::{
    DateTime, Datelike, Days, Duration, Local, NaiveDateTime, NaiveTime, TimeZone, Weekday,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Source of the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn at_local(wall: NaiveDateTime) -> Result<Self> {
        Ok(Self::new(resolve_local(&Local, wall)?))
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.write() = now;
    }

    pub fn set_local(&self, wall: NaiveDateTime) -> Result<()> {
        self.set(resolve_local(&Local, wall)?);
        Ok(())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.read()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Recurrence {
    Daily,
    Weekly,
}

impl Recurrence {
    pub fn period(self) -> Duration {
        match self {
            Recurrence::Daily => Duration::days(1),
            Recurrence::Weekly => Duration::weeks(1),
        }
    }
}

/// How recurring schedules are described to the platform: an anchor plus a
/// fixed interval, or calendar components the platform matches itself.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TriggerStyle {
    #[default]
    Anchored,
    Calendar,
}

impl TriggerStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "anchored" | "interval" => Some(TriggerStyle::Anchored),
            "calendar" => Some(TriggerStyle::Calendar),
            _ => None,
        }
    }
}

/// Map a wall-clock time onto `tz`. Ambiguous times take the earlier instant;
/// times skipped by a forward shift move one hour later.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, wall: NaiveDateTime) -> Result<DateTime<Tz>> {
    if let Some(resolved) = tz.from_local_datetime(&wall).earliest() {
        return Ok(resolved);
    }
    tz.from_local_datetime(&(wall + Duration::hours(1)))
        .earliest()
        .ok_or(Error::UnresolvableLocalTime(wall))
}

/// Today at `at`, or tomorrow at `at` when `now` is already at or past it.
pub fn next_daily_anchor<Tz: TimeZone>(
    now: &DateTime<Tz>,
    at: NaiveTime,
) -> Result<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();
    let candidate = resolve_local(&tz, today.and_time(at))?;
    if candidate > *now {
        return Ok(candidate);
    }
    let tomorrow = today
        .succ_opt()
        .ok_or(Error::UnresolvableLocalTime(today.and_time(at)))?;
    resolve_local(&tz, tomorrow.and_time(at))
}

/// Days from `from` to the next `target`, in 1..=7. The same weekday is a full week away.
pub fn days_until_weekday(from: Weekday, target: Weekday) -> u64 {
    let target = i64::from(target.num_days_from_sunday());
    let from = i64::from(from.num_days_from_sunday());
    let offset = (target - from + 7) % 7;
    if offset == 0 {
        7
    } else {
        offset as u64
    }
}

/// Next `weekday` at `at`, never today. On the target weekday this rolls a
/// full week forward regardless of the time of day.
pub fn next_weekly_anchor<Tz: TimeZone>(
    now: &DateTime<Tz>,
    weekday: Weekday,
    at: NaiveTime,
) -> Result<DateTime<Tz>> {
    let today = now.date_naive();
    let offset = days_until_weekday(today.weekday(), weekday);
    let date = today
        .checked_add_days(Days::new(offset))
        .ok_or(Error::UnresolvableLocalTime(today.and_time(at)))?;
    resolve_local(&now.timezone(), date.and_time(at))
}
