//! Detects that the local calendar day changed since the partitions were
//! populated.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollover {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct DateRolloverDetector {
    last_known_date: NaiveDate,
}

impl DateRolloverDetector {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            last_known_date: today,
        }
    }

    pub fn last_known_date(&self) -> NaiveDate {
        self.last_known_date
    }

    /// Returns the pending rollover, if any, without consuming it.
    pub fn peek(&self, today: NaiveDate) -> Option<Rollover> {
        (today != self.last_known_date).then_some(Rollover {
            from: self.last_known_date,
            to: today,
        })
    }

    /// Returns the rollover, if any, and adopts `today` as the known date.
    pub fn check(&mut self, today: NaiveDate) -> Option<Rollover> {
        let hit = self.peek(today)?;
        self.last_known_date = today;
        Some(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, day).unwrap()
    }

    #[test]
    fn same_day_is_not_a_rollover() {
        let mut det = DateRolloverDetector::new(d(3));
        assert_eq!(det.check(d(3)), None);
    }

    #[test]
    fn rollover_fires_once() {
        let mut det = DateRolloverDetector::new(d(3));

        assert_eq!(det.check(d(4)), Some(Rollover { from: d(3), to: d(4) }));
        assert_eq!(det.check(d(4)), None);
        assert_eq!(det.last_known_date(), d(4));
    }

    #[test]
    fn peek_leaves_the_rollover_pending() {
        let det = DateRolloverDetector::new(d(3));
        assert!(det.peek(d(5)).is_some());
        assert_eq!(det.last_known_date(), d(3));
    }

    #[test]
    fn clock_moving_back_a_day_also_counts() {
        let mut det = DateRolloverDetector::new(d(3));
        assert!(det.check(d(2)).is_some());
    }
}
