use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::Serialize;

use crate::models::Period;

/// Half-open interval `[start, end)` of eligible ledger events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl Period {
    /// Calendar window of this period around `now`, in `now`'s time zone.
    ///
    /// Days start at local midnight; weeks start on Monday 00:00. Each
    /// boundary uses the offset in force at that boundary, so a window
    /// spanning a DST change is 23, 25, 167 or 169 hours long.
    pub fn window_at<Z: TimeZone>(self, now: &DateTime<Z>) -> Window {
        let tz = now.timezone();
        let today = now.date_naive();

        let (first_day, days) = match self {
            Period::Daily => (today, 1),
            Period::Weekly => {
                let since_monday = i64::from(today.weekday().num_days_from_monday());
                (today - Duration::days(since_monday), 7)
            }
        };

        Window {
            start: start_of_day(&tz, first_day),
            end: start_of_day(&tz, first_day + Duration::days(days)),
        }
    }
}

/// First instant of `date` in `tz`
fn start_of_day<Z: TimeZone>(tz: &Z, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(start) => start.with_timezone(&Utc),
        // Midnight falls in a forward gap: the day begins where the gap does,
        // i.e. midnight read with the offset in force the day before
        None => {
            let before = tz.offset_from_utc_datetime(&(midnight - Duration::days(1))).fix();
            (midnight - Duration::seconds(i64::from(before.local_minus_utc()))).and_utc()
        }
    }
}

/// Time zone in which DAILY and WEEKLY boundaries are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The server process's local zone
    #[default]
    Local,
    Fixed(FixedOffset),
    Named(Tz),
}

impl Zone {
    pub fn window_at(self, period: Period, now: DateTime<Utc>) -> Window {
        match self {
            Zone::Local => period.window_at(&now.with_timezone(&Local)),
            Zone::Fixed(offset) => period.window_at(&now.with_timezone(&offset)),
            Zone::Named(tz) => period.window_at(&now.with_timezone(&tz)),
        }
    }
}

/// Source of the current instant and the zone it is read in
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn zone(&self) -> Zone;

    /// Window of `period` containing the current instant
    fn window(&self, period: Period) -> Window {
        self.zone().window_at(period, self.now())
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    zone: Zone,
}

impl SystemClock {
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn zone(&self) -> Zone {
        self.zone
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    zone: Zone,
}

impl FixedClock {
    /// Frozen at `now`, drawing windows in `now`'s fixed offset
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self::in_zone(now.with_timezone(&Utc), Zone::Fixed(*now.offset()))
    }

    pub fn in_zone(instant: DateTime<Utc>, zone: Zone) -> Self {
        Self { instant, zone }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn zone(&self) -> Zone {
        self.zone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::{New_York, Sao_Paulo};
    use pretty_assertions::assert_eq;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn at(offset_hours: i32, y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_daily_window_utc() {
        // Wednesday afternoon
        let window = Period::Daily.window_at(&at(0, 2024, 5, 15, 14));
        assert_eq!(window.start, utc(2024, 5, 15, 0, 0));
        assert_eq!(window.end, utc(2024, 5, 16, 0, 0));

        assert!(window.contains(utc(2024, 5, 15, 0, 0)));
        assert!(window.contains(utc(2024, 5, 15, 23, 59)));
        assert!(!window.contains(utc(2024, 5, 16, 0, 0)));
        assert!(!window.contains(utc(2024, 5, 14, 23, 59)));
    }

    #[test]
    fn test_daily_window_follows_offset() {
        // 01:30 at +03:00 is still the previous evening in UTC
        let window = Period::Daily.window_at(&at(3, 2024, 5, 15, 1));
        assert_eq!(window.start, utc(2024, 5, 14, 21, 0));
        assert_eq!(window.end, utc(2024, 5, 15, 21, 0));
    }

    #[test]
    fn test_weekly_window_starts_monday() {
        // 2024-05-15 is a Wednesday; week is Mon 13th .. Mon 20th
        let window = Period::Weekly.window_at(&at(0, 2024, 5, 15, 9));
        assert_eq!(window.start, utc(2024, 5, 13, 0, 0));
        assert_eq!(window.end, utc(2024, 5, 20, 0, 0));
    }

    #[test]
    fn test_weekly_window_on_sunday_and_monday() {
        let sunday = Period::Weekly.window_at(&at(0, 2024, 5, 19, 23));
        assert_eq!(sunday.start, utc(2024, 5, 13, 0, 0));

        let monday = Period::Weekly.window_at(&at(0, 2024, 5, 20, 0));
        assert_eq!(monday.start, utc(2024, 5, 20, 0, 0));
        assert_eq!(monday.end, utc(2024, 5, 27, 0, 0));
    }

    #[test]
    fn test_weekly_window_across_year_boundary() {
        // Thursday 2025-01-02 belongs to the week starting Monday 2024-12-30
        let window = Period::Weekly.window_at(&at(-5, 2025, 1, 2, 12));
        assert_eq!(window.start, utc(2024, 12, 30, 5, 0));
        assert_eq!(window.end, utc(2025, 1, 6, 5, 0));
    }

    #[test]
    fn test_daily_window_on_spring_forward_day() {
        // New York moves from -05:00 to -04:00 at 02:00 on 2024-03-10
        let noon = New_York.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let window = Period::Daily.window_at(&noon);

        assert_eq!(window.start, utc(2024, 3, 10, 5, 0));
        assert_eq!(window.end, utc(2024, 3, 11, 4, 0));

        let late_yesterday = New_York.with_ymd_and_hms(2024, 3, 9, 23, 30, 0).unwrap();
        assert!(!window.contains(late_yesterday.with_timezone(&Utc)));
    }

    #[test]
    fn test_daily_window_on_fall_back_day() {
        let evening = New_York.with_ymd_and_hms(2024, 11, 3, 20, 0, 0).unwrap();
        let window = Period::Daily.window_at(&evening);

        assert_eq!(window.start, utc(2024, 11, 3, 4, 0));
        assert_eq!(window.end, utc(2024, 11, 4, 5, 0));
        assert_eq!(window.end - window.start, Duration::hours(25));
    }

    #[test]
    fn test_weekly_window_spanning_dst_change() {
        let friday = New_York.with_ymd_and_hms(2024, 3, 8, 9, 0, 0).unwrap();
        let window = Period::Weekly.window_at(&friday);

        assert_eq!(window.start, utc(2024, 3, 4, 5, 0));
        assert_eq!(window.end, utc(2024, 3, 11, 4, 0));
    }

    #[test]
    fn test_day_starting_inside_a_gap() {
        // Sao Paulo skipped 00:00..01:00 on 2018-11-04
        let morning = Sao_Paulo.with_ymd_and_hms(2018, 11, 4, 9, 0, 0).unwrap();
        let window = Period::Daily.window_at(&morning);

        assert_eq!(window.start, utc(2018, 11, 4, 3, 0));
        assert_eq!(window.end, utc(2018, 11, 5, 2, 0));
    }

    #[test]
    fn test_zone_dispatch_matches_direct_window() {
        let instant = utc(2024, 3, 10, 16, 0);

        assert_eq!(
            Zone::Named(New_York).window_at(Period::Daily, instant),
            Period::Daily.window_at(&instant.with_timezone(&New_York))
        );
        assert_eq!(
            Zone::Fixed(FixedOffset::east_opt(0).unwrap()).window_at(Period::Daily, instant).start,
            utc(2024, 3, 10, 0, 0)
        );
    }

    #[test]
    fn test_fixed_clock() {
        let now = at(2, 2024, 1, 1, 8);
        let clock = FixedClock::new(now);

        assert_eq!(clock.now(), now.with_timezone(&Utc));
        assert_eq!(clock.window(Period::Daily), Period::Daily.window_at(&now));
    }

    #[test]
    fn test_system_clock_keeps_zone() {
        let offset = FixedOffset::east_opt(-7 * 3600).unwrap();
        let clock = SystemClock::new(Zone::Fixed(offset));
        assert_eq!(clock.zone(), Zone::Fixed(offset));

        let now = clock.now();
        assert!(clock.zone().window_at(Period::Daily, now).contains(now));
    }
}
