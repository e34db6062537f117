use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};

use crate::models::BreakWindow;

/// Parses a `"HH:MM"` clock time into minutes since midnight.
///
/// Returns `None` for anything malformed; callers validate at load/edit time
/// so a bad string never reaches the tick path.
pub fn parse_clock(s: &str) -> Option<u32> {
    let (h, m) = s.split_once(':')?;
    let hours: u32 = h.trim().parse().ok()?;
    let minutes: u32 = m.trim().parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// A validated window: clock times in minutes since midnight.
#[derive(Debug, Clone)]
struct Window {
    start_min: u32,
    end_min: u32,
    name: String,
}

/// One concrete calendar occurrence of a recurring break window.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakInstance {
    pub name: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl BreakInstance {
    /// Milliseconds until this instance ends, zero once it has.
    pub fn remaining_ms(&self, now: DateTime<Local>) -> u64 {
        (self.end - now).num_milliseconds().max(0) as u64
    }

    /// Fraction of the instance still ahead, in `0.0..=1.0`.
    pub fn fraction_remaining(&self, now: DateTime<Local>) -> f64 {
        let len = (self.end - self.start).num_milliseconds();
        if len <= 0 {
            return 0.0;
        }
        let left = (self.end - now).num_milliseconds();
        (left as f64 / len as f64).clamp(0.0, 1.0)
    }
}

/// The set of recurring daily break windows, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct BreakSchedule {
    windows: Vec<Window>,
}

impl BreakSchedule {
    /// Builds a schedule from persisted windows, skipping malformed entries.
    /// `start == end` windows are kept out too: they are defined as never
    /// active.
    pub fn from_windows(windows: &[BreakWindow]) -> Self {
        let parsed = windows
            .iter()
            .filter_map(|w| {
                let start_min = parse_clock(&w.start)?;
                let end_min = parse_clock(&w.end)?;
                if start_min == end_min {
                    return None;
                }
                Some(Window {
                    start_min,
                    end_min,
                    name: w.name.clone(),
                })
            })
            .collect();
        BreakSchedule { windows: parsed }
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Returns the break instance containing `now`, if any. Windows are
    /// checked in declaration order; the earliest declared match wins.
    ///
    /// A window whose start is later than its end runs from `start` on day N
    /// to `end` on day N+1, so the search covers the day before and the day
    /// after `now`'s calendar day to catch both instances bleeding across
    /// the boundary.
    pub fn query(&self, now: DateTime<Local>) -> Option<BreakInstance> {
        let today = now.date_naive();
        for w in &self.windows {
            for offset in -1i64..=1 {
                let day = today + Duration::days(offset);
                if let Some((start, end)) = instance_on(w, day) {
                    if start <= now && now < end {
                        return Some(BreakInstance {
                            name: w.name.clone(),
                            start,
                            end,
                        });
                    }
                }
            }
        }
        None
    }

    /// Total milliseconds of `[from, to)` covered by break instances, over
    /// every window and every day the span touches. Overlapping instances
    /// count once (their union): the live tick suspends the clock once no
    /// matter how many windows cover an instant, and this deduction has to
    /// agree with it.
    pub fn total_overlap(&self, from: DateTime<Local>, to: DateTime<Local>) -> u64 {
        if from >= to {
            return 0;
        }
        let mut spans: Vec<(DateTime<Local>, DateTime<Local>)> = Vec::new();
        for w in &self.windows {
            let mut day = from.date_naive() - Duration::days(1);
            let last = to.date_naive();
            while day <= last {
                if let Some((start, end)) = instance_on(w, day) {
                    let lo = start.max(from);
                    let hi = end.min(to);
                    if lo < hi {
                        spans.push((lo, hi));
                    }
                }
                day += Duration::days(1);
            }
        }
        spans.sort_by_key(|s| s.0);

        let mut total: u64 = 0;
        let mut merged: Option<(DateTime<Local>, DateTime<Local>)> = None;
        for (lo, hi) in spans {
            match merged {
                Some((mlo, mhi)) if lo <= mhi => merged = Some((mlo, mhi.max(hi))),
                Some((mlo, mhi)) => {
                    total += (mhi - mlo).num_milliseconds() as u64;
                    merged = Some((lo, hi));
                }
                None => merged = Some((lo, hi)),
            }
        }
        if let Some((mlo, mhi)) = merged {
            total += (mhi - mlo).num_milliseconds() as u64;
        }
        total
    }
}

/// The concrete span of `w` anchored on `day`. `None` when a DST jump erases
/// the clock time that day.
fn instance_on(w: &Window, day: NaiveDate) -> Option<(DateTime<Local>, DateTime<Local>)> {
    let start = local_at(day, w.start_min)?;
    let end_day = if w.start_min < w.end_min {
        day
    } else {
        day + Duration::days(1)
    };
    let end = local_at(end_day, w.end_min)?;
    Some((start, end))
}

fn local_at(day: NaiveDate, minutes: u32) -> Option<DateTime<Local>> {
    let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)?;
    Local.from_local_datetime(&day.and_time(time)).earliest()
}
