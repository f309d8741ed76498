use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::debug;

use crate::table::Cell;

/// Carried state of the rollover fold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Rollover {
    last_hour: u32,
    day_offset: u32,
}

impl Rollover {
    /// Hour strictly below the previous hour means midnight was crossed.
    /// Minutes are ignored and the offset never goes back.
    fn step(self, time: &NaiveTime) -> Self {
        let hour = time.hour();
        let day_offset = if hour < self.last_hour {
            self.day_offset + 1
        } else {
            self.day_offset
        };
        Rollover {
            last_hour: hour,
            day_offset,
        }
    }
}

/// Day offset (inferred midnight crossings so far) for each time-of-day.
pub fn day_offsets(times: &[NaiveTime]) -> Vec<u32> {
    times
        .iter()
        .scan(Rollover::default(), |state, t| {
            *state = state.step(t);
            Some(state.day_offset)
        })
        .collect()
}

/// Anchor date-less times at `start_date`, advancing one day on every hour
/// regression.
///
/// There is no lookahead: a single backward jump (clock resync, jitter)
/// permanently shifts every later date by a day.
pub fn reconstruct_timestamps(times: &[NaiveTime], start_date: NaiveDate) -> Vec<NaiveDateTime> {
    let offsets = day_offsets(times);
    if let Some(last) = offsets.last() {
        debug!(rows = times.len(), rollovers = *last, "reconstructed timestamps");
    }
    times
        .iter()
        .zip(offsets)
        .map(|(t, offset)| {
            let date = start_date
                .checked_add_days(Days::new(u64::from(offset)))
                .unwrap_or(NaiveDate::MAX);
            date.and_time(*t)
        })
        .collect()
}

/// Parse a time-of-day cell with a chrono format string.
pub fn parse_time_of_day(raw: &str, format: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), format).ok()
}

/// Times parsed from a column, with the row indices they came from.
/// Rows whose cell does not parse are left out.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedTimes {
    pub rows: Vec<usize>,
    pub times: Vec<NaiveTime>,
}

impl ParsedTimes {
    pub fn dropped(&self, total: usize) -> usize {
        total - self.rows.len()
    }
}

pub fn parse_time_column<'a, I>(cells: I, format: &str) -> ParsedTimes
where
    I: IntoIterator<Item = &'a Cell>,
{
    cells
        .into_iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            let t = match cell {
                Cell::Time(t) => Some(*t),
                Cell::Text(s) => parse_time_of_day(s, format),
                Cell::Number { .. } | Cell::Timestamp(_) | Cell::Missing => None,
            }?;
            Some((i, t))
        })
        .fold(ParsedTimes::default(), |mut acc, (i, t)| {
            acc.rows.push(i);
            acc.times.push(t);
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn rolls_over_at_midnight() {
        let times = [hm(9, 0), hm(10, 0), hm(23, 30), hm(0, 15), hm(1, 0)];
        let ts = reconstruct_timestamps(&times, date(7, 7));
        let dates: Vec<NaiveDate> = ts.iter().map(|t| t.date()).collect();
        assert_eq!(
            dates,
            vec![date(7, 7), date(7, 7), date(7, 7), date(7, 8), date(7, 8)]
        );
        assert_eq!(ts[3].time(), hm(0, 15));
    }

    #[test]
    fn same_hour_never_rolls() {
        let ts = reconstruct_timestamps(&[hm(10, 45), hm(10, 5)], date(7, 7));
        assert_eq!(ts[0].date(), ts[1].date());
    }

    #[test]
    fn single_dip_is_permanent() {
        assert_eq!(day_offsets(&[hm(5, 0), hm(2, 0), hm(6, 0)]), vec![0, 1, 1]);
    }

    #[test]
    fn first_row_at_midnight_does_not_roll() {
        assert_eq!(day_offsets(&[hm(0, 0), hm(0, 30)]), vec![0, 0]);
    }

    #[test]
    fn offsets_are_monotonic_and_step_by_one() {
        let times = [
            hm(22, 0),
            hm(23, 0),
            hm(1, 0),
            hm(12, 0),
            hm(3, 0),
            hm(2, 0),
            hm(2, 59),
            hm(1, 0),
        ];
        let offsets = day_offsets(&times);
        assert_eq!(offsets, vec![0, 0, 1, 1, 2, 3, 3, 4]);
        for pair in offsets.windows(2) {
            assert!(pair[1] == pair[0] || pair[1] == pair[0] + 1);
        }
    }

    #[test]
    fn empty_sequence() {
        assert!(reconstruct_timestamps(&[], date(7, 7)).is_empty());
    }

    #[test]
    fn anchor_is_configurable() {
        let ts = reconstruct_timestamps(&[hm(23, 0), hm(0, 0)], date(12, 31));
        assert_eq!(ts[1].date(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn parses_and_drops_bad_times() {
        let cells = vec![
            Cell::Text("09:00".into()),
            Cell::Text("garbage".into()),
            Cell::Missing,
            Cell::Text(" 23:59 ".into()),
            Cell::number(5.0),
            Cell::Text("24:00".into()),
        ];
        let parsed = parse_time_column(&cells, "%H:%M");
        assert_eq!(parsed.rows, vec![0, 3]);
        assert_eq!(parsed.times, vec![hm(9, 0), hm(23, 59)]);
        assert_eq!(parsed.dropped(cells.len()), 4);
    }

    #[test]
    fn strict_minute_format_rejects_seconds() {
        assert_eq!(parse_time_of_day("09:00:30", "%H:%M"), None);
        assert_eq!(
            parse_time_of_day("09:00:30", "%H:%M:%S"),
            Some(NaiveTime::from_hms_opt(9, 0, 30).unwrap())
        );
    }
}
