use super::*;

/// the counters on one cpu line of `/proc/stat`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CpuTime {
    /// time spent in user mode.
    user: UserHz,
    /// time spent in user mode with low priority (nice).
    nice: UserHz,
    /// time spent in system mode.
    system: UserHz,
    /// time spent in the idle task.
    idle: UserHz,
    /// time waiting for i/o to complete. counted as idle time.
    iowait: UserHz,
    /// time servicing interrupts.
    irq: UserHz,
    /// time servicing softirqs.
    softirq: UserHz,
    /// time stolen by other operating systems when running virtualized.
    steal: UserHz,
    /// time spent running a virtual cpu for guests.
    guest: UserHz,
    /// time spent running a niced guest. not counted toward the total.
    guest_nice: UserHz,
}

/// a point-in-time pair of cumulative counters.
///
/// a snapshot means nothing on its own, see [`CpuSnapshot::percent_since()`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CpuSnapshot {
    pub total: UserHz,
    pub idle: UserHz,
}

// === impl CpuSnapshot ===

impl CpuSnapshot {
    pub const fn new(total: u64, idle: u64) -> Self {
        Self {
            total: UserHz::new(total),
            idle: UserHz::new(idle),
        }
    }

    /// returns the percentage of non-idle time between `prev` and this snapshot.
    ///
    /// if no ticks elapsed the result is `0.0`. the result is always within `0.0..=100.0`.
    pub fn percent_since(&self, prev: &Self) -> f64 {
        let total = self.total.since(prev.total);
        let idle = self.idle.since(prev.idle).min(total);

        if total == UserHz::ZERO {
            return 0.0;
        }

        let busy = total.since(idle);
        ((busy / total) * 100.0).clamp(0.0, 100.0)
    }
}

impl From<&CpuTime> for CpuSnapshot {
    fn from(time: &CpuTime) -> Self {
        Self {
            total: time.total(),
            idle: time.idle(),
        }
    }
}

// === impl CpuTime ===

impl CpuTime {
    /// the number of counters on a line, as of linux 2.6.33.
    pub const FIELDS: usize = 10;
    /// user, nice, system, and idle are always present.
    pub const MIN_FIELDS: usize = 4;

    /// returns idle and iowait time.
    pub fn idle(&self) -> UserHz {
        let Self { idle, iowait, .. } = *self;
        idle + iowait
    }

    /// returns time spent doing work.
    pub fn busy(&self) -> UserHz {
        let Self {
            user,
            nice,
            system,
            irq,
            softirq,
            steal,
            guest,
            idle: _,
            iowait: _,
            guest_nice: _,
        } = *self;

        user + nice + system + irq + softirq + steal + guest
    }

    pub fn total(&self) -> UserHz {
        self.idle() + self.busy()
    }
}

impl TryFrom<Vec<UserHz>> for CpuTime {
    type Error = EntryParseError;
    fn try_from(mut times: Vec<UserHz>) -> Result<Self, Self::Error> {
        let count = times.len();
        if (Self::MIN_FIELDS..=Self::FIELDS).contains(&count).not() {
            return Err(EntryParseError::CpuTime { count });
        }

        // older kernels report fewer counters, the missing ones are zero.
        times.resize(Self::FIELDS, UserHz::ZERO);
        <_ as TryInto<[_; Self::FIELDS]>>::try_into(times)
            .map(Self::from)
            .map_err(|_| EntryParseError::CpuTime { count })
    }
}

impl From<[UserHz; CpuTime::FIELDS]> for CpuTime {
    fn from(
        [
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        ]: [UserHz; CpuTime::FIELDS],
    ) -> Self {
        Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        }
    }
}
