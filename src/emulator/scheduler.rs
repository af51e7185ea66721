//! Turns wall-clock time into work for the emulator.
//!
//! Instructions run at a rate chosen by the host, while the delay and sound
//! timers always count down at 60 Hz. The two clocks are independent: a slow
//! instruction rate does not slow the timers down, and vice versa.

use std::convert::TryFrom;
use std::time::Duration;

pub const TIMER_HZ: u32 = 60;
pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;

/// How much work is due after some time has passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Due {
    pub cycles: u32,
    pub timer_ticks: u32,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    cycle_period: Duration,
    timer_period: Duration,
    cycle_debt: Duration,
    timer_debt: Duration,
}

impl Scheduler {
    pub fn new(instructions_per_second: u32) -> Scheduler {
        Scheduler {
            cycle_period: period(instructions_per_second),
            timer_period: period(TIMER_HZ),
            cycle_debt: Duration::default(),
            timer_debt: Duration::default(),
        }
    }

    /// Account for `elapsed` time. Time that does not add up to a whole
    /// cycle or tick is carried over to the next call.
    pub fn advance(&mut self, elapsed: Duration) -> Due {
        self.cycle_debt += elapsed;
        self.timer_debt += elapsed;
        Due {
            cycles: drain(&mut self.cycle_debt, self.cycle_period),
            timer_ticks: drain(&mut self.timer_debt, self.timer_period),
        }
    }

    /// Time until the next cycle or timer tick falls due.
    pub fn until_next(&self) -> Duration {
        let cycle = self.cycle_period.checked_sub(self.cycle_debt).unwrap_or_default();
        let timer = self.timer_period.checked_sub(self.timer_debt).unwrap_or_default();
        cycle.min(timer)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler::new(DEFAULT_INSTRUCTIONS_PER_SECOND)
    }
}

fn period(hz: u32) -> Duration {
    Duration::from_nanos((1_000_000_000 / hz.max(1) as u64).max(1))
}

/// Take whole periods out of `debt`. After a long stall more periods may be
/// due than fit in a `u32`; those are dropped rather than carried over.
fn drain(debt: &mut Duration, period: Duration) -> u32 {
    let period_nanos = period.as_nanos();
    let count = u32::try_from(debt.as_nanos() / period_nanos).unwrap_or(u32::MAX);
    // The remainder is below `period`, which is at most one second.
    *debt = Duration::from_nanos((debt.as_nanos() % period_nanos) as u64);
    count
}
