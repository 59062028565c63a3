//! Vesting progress of a stream as seen at a given instant.
//!
//! Everything here is a pure function of the schedule and the current time,
//! so it can be re-evaluated on every tick without touching the network. The
//! contract stays authoritative for amounts: [`Schedule::vested_preview`] is
//! only an estimate for display.
use core::fmt;

use alloy::primitives::U256;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Timing parameters of a vesting stream, in Unix seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Schedule {
    /// Absolute vesting start.
    pub start_time: u64,
    /// Seconds after `start_time` before anything can be claimed.
    pub cliff_duration: u64,
    /// Seconds over which the full amount vests, counted from the cliff end.
    pub stream_duration: u64,
    /// Whether the stream was cancelled.
    pub is_cancelled: bool,
}

impl Schedule {
    /// Instant at which the cliff ends and streaming begins.
    #[must_use]
    pub fn cliff_end(&self) -> u64 {
        self.start_time.saturating_add(self.cliff_duration)
    }

    /// Instant at which the whole amount has vested.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.cliff_end().saturating_add(self.stream_duration)
    }

    /// Linear estimate of how much of `total` has vested at `now`.
    ///
    /// Nothing vests before the cliff ends, everything has vested at
    /// [`Self::end`]. Cancellation is not taken into account.
    #[must_use]
    pub fn vested_preview(&self, total: U256, now: u64) -> U256 {
        let cliff_end = self.cliff_end();
        if now < cliff_end {
            U256::ZERO
        } else if now >= self.end() {
            total
        } else {
            // `now` is within `[cliff_end, end)`, so `stream_duration` is
            // non-zero here.
            let elapsed = U256::from(now - cliff_end);
            total.saturating_mul(elapsed) / U256::from(self.stream_duration)
        }
    }
}

/// Coarse state of a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the cliff end; nothing is claimable.
    Cliff,
    /// Tokens are vesting linearly.
    Streaming,
    /// The whole amount has vested.
    Completed,
    /// The stream was cancelled; no further accrual.
    Cancelled,
}

/// [`Phase`] together with the durations needed to describe it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// `remaining` seconds until the cliff ends.
    Cliff {
        /// Seconds until the cliff ends.
        remaining: u64,
    },
    /// `elapsed` of `total` streaming seconds have passed.
    Streaming {
        /// Seconds since the cliff ended.
        elapsed: u64,
        /// Stream duration.
        total: u64,
    },
    /// See [`Phase::Completed`].
    Completed,
    /// See [`Phase::Cancelled`].
    Cancelled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Cliff { remaining } => write!(
                f,
                "Cliff period: {} remaining",
                format_duration(*remaining)
            ),
            Status::Streaming { elapsed, total } => write!(
                f,
                "Streaming: {} elapsed / {} total",
                format_duration(*elapsed),
                format_duration(*total)
            ),
            Status::Completed => f.write_str("Streaming completed"),
            Status::Cancelled => f.write_str("Stream cancelled"),
        }
    }
}

/// Progress of a stream at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    /// Percentage in `[0, 100]`.
    ///
    /// A cancelled stream reports 100: it is fully resolved, which says
    /// nothing about how much was claimed.
    pub percent: f64,
    /// Phase and the durations describing it.
    pub status: Status,
}

impl Progress {
    /// Phase of the stream.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.status {
            Status::Cliff { .. } => Phase::Cliff,
            Status::Streaming { .. } => Phase::Streaming,
            Status::Completed => Phase::Completed,
            Status::Cancelled => Phase::Cancelled,
        }
    }
}

/// Computes the progress of `schedule` at `now`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn progress(schedule: &Schedule, now: u64) -> Progress {
    if schedule.is_cancelled {
        return Progress { percent: 100.0, status: Status::Cancelled };
    }

    let cliff_end = schedule.cliff_end();
    if now < cliff_end {
        return Progress {
            percent: 0.0,
            status: Status::Cliff { remaining: cliff_end - now },
        };
    }

    let elapsed = now - cliff_end;
    if elapsed >= schedule.stream_duration {
        return Progress { percent: 100.0, status: Status::Completed };
    }

    let percent = elapsed as f64 / schedule.stream_duration as f64 * 100.0;
    Progress {
        percent: percent.clamp(0.0, 100.0),
        status: Status::Streaming {
            elapsed,
            total: schedule.stream_duration,
        },
    }
}

/// Renders `seconds` in the largest unit below its threshold, truncating:
/// seconds under a minute, then minutes, hours and days.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    if seconds < MINUTE {
        format!("{seconds} seconds")
    } else if seconds < HOUR {
        format!("{} minutes", seconds / MINUTE)
    } else if seconds < DAY {
        format!("{} hours", seconds / HOUR)
    } else {
        format!("{} days", seconds / DAY)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::uint;
    use proptest::prelude::*;

    use super::*;

    const SCHEDULE: Schedule = Schedule {
        start_time: 1000,
        cliff_duration: 100,
        stream_duration: 900,
        is_cancelled: false,
    };

    #[test]
    fn inside_cliff() {
        let p = progress(&SCHEDULE, 1050);
        assert_eq!(p.phase(), Phase::Cliff);
        assert_eq!(p.percent, 0.0);
        assert_eq!(p.status, Status::Cliff { remaining: 50 });
        assert_eq!(p.status.to_string(), "Cliff period: 50 seconds remaining");
    }

    #[test]
    fn streaming_midway() {
        let p = progress(&SCHEDULE, 1500);
        assert_eq!(p.phase(), Phase::Streaming);
        assert!((p.percent - 400.0 / 900.0 * 100.0).abs() < 1e-9);
        assert_eq!(
            p.status.to_string(),
            "Streaming: 6 minutes elapsed / 15 minutes total"
        );
    }

    #[test]
    fn streaming_starts_exactly_at_cliff_end() {
        let p = progress(&SCHEDULE, 1100);
        assert_eq!(p.phase(), Phase::Streaming);
        assert_eq!(p.percent, 0.0);
    }

    #[test]
    fn completed_exactly_at_end() {
        let p = progress(&SCHEDULE, 2000);
        assert_eq!(p.phase(), Phase::Completed);
        assert_eq!(p.percent, 100.0);
        assert_eq!(p.status.to_string(), "Streaming completed");
    }

    #[test]
    fn one_second_before_end_is_streaming() {
        let p = progress(&SCHEDULE, 1999);
        assert_eq!(p.phase(), Phase::Streaming);
        assert!(p.percent < 100.0);
    }

    #[test]
    fn cancelled_overrides_cliff() {
        let schedule = Schedule { is_cancelled: true, ..SCHEDULE };
        for now in [0, 1050, 1500, 2000, u64::MAX] {
            let p = progress(&schedule, now);
            assert_eq!(p.phase(), Phase::Cancelled);
            assert_eq!(p.percent, 100.0);
        }
        let status = progress(&schedule, 0).status;
        assert_eq!(status.to_string(), "Stream cancelled");
    }

    #[test]
    fn zero_cliff_streams_from_start() {
        let schedule = Schedule { cliff_duration: 0, ..SCHEDULE };
        assert_eq!(progress(&schedule, 1000).phase(), Phase::Streaming);
        assert_eq!(progress(&schedule, 999).phase(), Phase::Cliff);
    }

    #[test]
    fn saturates_on_far_future_schedules() {
        let schedule = Schedule {
            start_time: u64::MAX - 10,
            cliff_duration: 100,
            stream_duration: 100,
            is_cancelled: false,
        };
        assert_eq!(schedule.cliff_end(), u64::MAX);
        assert_eq!(progress(&schedule, 0).phase(), Phase::Cliff);
    }

    #[test]
    fn formats_durations_by_truncation() {
        assert_eq!(format_duration(0), "0 seconds");
        assert_eq!(format_duration(59), "59 seconds");
        assert_eq!(format_duration(60), "1 minutes");
        assert_eq!(format_duration(3599), "59 minutes");
        assert_eq!(format_duration(3600), "1 hours");
        assert_eq!(format_duration(86_399), "23 hours");
        assert_eq!(format_duration(86_400), "1 days");
        assert_eq!(format_duration(15_552_000), "180 days");
    }

    #[test]
    fn previews_vested_amount() {
        let total = uint!(900_U256);
        assert_eq!(SCHEDULE.vested_preview(total, 1099), U256::ZERO);
        assert_eq!(SCHEDULE.vested_preview(total, 1100), U256::ZERO);
        assert_eq!(SCHEDULE.vested_preview(total, 1500), uint!(400_U256));
        assert_eq!(SCHEDULE.vested_preview(total, 2000), total);
        assert_eq!(SCHEDULE.vested_preview(total, u64::MAX), total);
    }

    fn schedule() -> impl Strategy<Value = Schedule> {
        (0u64..1 << 40, 0u64..1 << 30, 1u64..1 << 30).prop_map(
            |(start_time, cliff_duration, stream_duration)| Schedule {
                start_time,
                cliff_duration,
                stream_duration,
                is_cancelled: false,
            },
        )
    }

    proptest! {
        #[test]
        fn before_cliff_is_zero(s in schedule(), offset in 1u64..1 << 30) {
            let now = s.cliff_end().saturating_sub(offset);
            prop_assume!(now < s.cliff_end());
            let p = progress(&s, now);
            prop_assert_eq!(p.phase(), Phase::Cliff);
            prop_assert_eq!(p.percent, 0.0);
        }

        #[test]
        fn after_end_is_complete(s in schedule(), past in 0u64..1 << 40) {
            let p = progress(&s, s.end() + past);
            prop_assert_eq!(p.phase(), Phase::Completed);
            prop_assert_eq!(p.percent, 100.0);
        }

        #[test]
        fn streaming_is_strictly_inside_bounds(
            s in schedule(),
            at in 1u64..1 << 30,
        ) {
            prop_assume!(at < s.stream_duration);
            let p = progress(&s, s.cliff_end() + at);
            prop_assert_eq!(p.phase(), Phase::Streaming);
            prop_assert!(p.percent > 0.0 && p.percent < 100.0);
        }

        #[test]
        fn percent_is_monotonic(
            s in schedule(),
            a in 0u64..1 << 41,
            b in 0u64..1 << 41,
        ) {
            let (earlier, later) = if a <= b { (a, b) } else { (b, a) };
            let earlier = progress(&s, earlier).percent;
            prop_assert!(earlier <= progress(&s, later).percent);
        }

        #[test]
        fn cancelled_is_always_full(s in schedule(), now: u64) {
            let s = Schedule { is_cancelled: true, ..s };
            let p = progress(&s, now);
            prop_assert_eq!(p.phase(), Phase::Cancelled);
            prop_assert_eq!(p.percent, 100.0);
        }
    }
}
