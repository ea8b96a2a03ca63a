use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Half-open `[start, end)` interval in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// From local midnight of `date` to local midnight of the following day.
    pub fn day(date: NaiveDate, tz: Tz) -> Self {
        let start = local_midnight(date, tz);
        let end = date
            .succ_opt()
            .map(|next| local_midnight(next, tz))
            .unwrap_or_else(|| saturating_add_days(start, 1));
        Self { start, end }
    }

    pub fn days_from(start: DateTime<Utc>, days: i64) -> Self {
        Self {
            start,
            end: saturating_add_days(start, days),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if start == end {
            return self.contains(start);
        }
        start < self.end && end > self.start
    }
}

// Windows near the end of the representable range stop at its last instant.
fn saturating_add_days(start: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|span| start.checked_add_signed(span))
        .unwrap_or(if days < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    // Midnight can be skipped by a DST jump; fall back to reading it as UTC offset time.
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| tz.from_utc_datetime(&naive).with_timezone(&Utc))
}
