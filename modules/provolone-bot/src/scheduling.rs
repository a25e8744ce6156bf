//! Cadence for scheduled mode: post, check comments and report on
//! independent intervals.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

const HOUR: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub post_every: Duration,
    pub check_every: Duration,
    pub report_every: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            post_every: 6 * HOUR,
            check_every: HOUR,
            report_every: 24 * HOUR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Post,
    CheckComments,
    Report,
}

/// Yields the next due task. The first tick of each interval is one full
/// period after construction; the caller runs the initial cycle itself.
pub struct Ticker {
    post: Interval,
    check: Interval,
    report: Interval,
}

impl Ticker {
    pub fn new(schedule: &Schedule) -> Self {
        let now = Instant::now();
        Self {
            post: delayed(now, schedule.post_every),
            check: delayed(now, schedule.check_every),
            report: delayed(now, schedule.report_every),
        }
    }

    /// When several tasks fall due together, posting goes first, then the
    /// comment check, then the report.
    pub async fn next(&mut self) -> Task {
        tokio::select! {
            biased;
            _ = self.post.tick() => Task::Post,
            _ = self.check.tick() => Task::CheckComments,
            _ = self.report.tick() => Task::Report,
        }
    }
}

fn delayed(now: Instant, period: Duration) -> Interval {
    let mut interval = interval_at(now + period, period);
    // A long cycle should not trigger a burst of catch-up ticks.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cadence() {
        let schedule = Schedule::default();
        assert_eq!(schedule.post_every, Duration::from_secs(6 * 3600));
        assert_eq!(schedule.check_every, Duration::from_secs(3600));
        assert_eq!(schedule.report_every, Duration::from_secs(24 * 3600));
    }

    #[tokio::test]
    async fn shortest_interval_fires_first() {
        let schedule = Schedule {
            post_every: Duration::from_secs(3600),
            check_every: Duration::from_millis(5),
            report_every: Duration::from_secs(3600),
        };
        let mut ticker = Ticker::new(&schedule);

        assert_eq!(ticker.next().await, Task::CheckComments);
        assert_eq!(ticker.next().await, Task::CheckComments);
    }
}
