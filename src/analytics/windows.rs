// SPDX-License-Identifier: MPL-2.0

use crate::store::EventStore;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};

/// Half-open span of whole calendar days, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Lower bound in `created_at` form (inclusive)
    pub fn start_timestamp(&self) -> String {
        midnight(self.start)
    }

    /// Upper bound in `created_at` form (exclusive)
    pub fn end_timestamp(&self) -> String {
        midnight(self.end)
    }

    pub fn overlaps(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// The two week-over-week windows for a reference instant.
///
/// This week is the reference day and the six days before it; last week is
/// the seven days before that.
///
/// This week ends at the midnight after the reference day, so events stamped
/// later than that are not counted. A query with only a lower bound would
/// include them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindows {
    pub this_week: Window,
    pub last_week: Window,
}

impl WeekWindows {
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let this_start = today - Days::new(6);
        let last_start = today - Days::new(13);

        Self {
            this_week: Window {
                start: this_start,
                end: today + Days::new(1),
            },
            last_week: Window {
                start: last_start,
                end: this_start,
            },
        }
    }
}

fn midnight(date: NaiveDate) -> String {
    EventStore::timestamp(date.and_time(NaiveTime::MIN).and_utc())
}
