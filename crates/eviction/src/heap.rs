//! Heap-pressure probe: the `(max_heap, free_heap)` reading the eviction
//! map polls to decide whether it is overflowing.

use parking_lot::Mutex;
use sysinfo::{Pid, ProcessRefreshKind, RefreshKind, System};

/// A single `(max, free)` heap reading, in bytes.
///
/// `used = max - free`. The eviction map compares `used / max` against its
/// configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapReading {
    /// Configured maximum heap budget, in bytes.
    pub max: u64,
    /// Free bytes within that budget.
    pub free: u64,
}

impl HeapReading {
    /// Residency, in bytes: `max - free`.
    #[inline]
    pub fn used(&self) -> u64 {
        self.max.saturating_sub(self.free)
    }

    /// Residency as a fraction of `max`, in `[0, 1]` (1.0 if `max == 0`).
    pub fn used_fraction(&self) -> f64 {
        if self.max == 0 {
            return 1.0;
        }
        self.used() as f64 / self.max as f64
    }
}

/// A pluggable `(max, used)` heap sampler.
///
/// Platforms without runtime heap introspection substitute their own
/// implementation; [`SysinfoHeapSampler`] is the default, process-level
/// implementation.
pub trait HeapSampler: Send + Sync {
    /// Take one reading. May be called frequently; the eviction map
    /// rate-limits how often it actually calls this.
    fn sample(&self) -> HeapReading;
}

/// Default [`HeapSampler`] backed by `sysinfo`'s process memory
/// introspection, measured against a configured maximum-heap budget.
pub struct SysinfoHeapSampler {
    system: Mutex<System>,
    pid: Pid,
    max_heap_bytes: u64,
}

impl SysinfoHeapSampler {
    /// Create a sampler for the current process, treating `max_heap_bytes`
    /// as the heap budget the pressure threshold is measured against.
    pub fn new(max_heap_bytes: u64) -> Self {
        let refresh = RefreshKind::new().with_processes(ProcessRefreshKind::new().with_memory());
        let system = System::new_with_specifics(refresh);
        let pid = Pid::from_u32(std::process::id());
        Self {
            system: Mutex::new(system),
            pid,
            max_heap_bytes,
        }
    }
}

impl HeapSampler for SysinfoHeapSampler {
    fn sample(&self) -> HeapReading {
        let mut system = self.system.lock();
        system.refresh_process(self.pid);
        let used = system
            .process(self.pid)
            .map(|p| p.memory())
            .unwrap_or(0);
        HeapReading {
            max: self.max_heap_bytes,
            free: self.max_heap_bytes.saturating_sub(used),
        }
    }
}

/// Test and demo support: a [`HeapSampler`] whose reading is set directly,
/// rather than measured, so callers can drive the overflow threshold
/// deterministically (e.g. "configure 0% headroom, always overflow").
pub mod testing {
    use super::{HeapReading, HeapSampler};
    use parking_lot::Mutex;

    /// A [`HeapSampler`] returning whatever reading was last set via
    /// [`FakeHeapSampler::set`].
    pub struct FakeHeapSampler {
        reading: Mutex<HeapReading>,
    }

    impl FakeHeapSampler {
        /// Start with the given reading.
        pub fn new(reading: HeapReading) -> Self {
            Self {
                reading: Mutex::new(reading),
            }
        }

        /// Construct a sampler that always reports full occupancy (used ==
        /// max), i.e. the overflow threshold is always exceeded.
        pub fn always_overflowing() -> Self {
            Self::new(HeapReading { max: 100, free: 0 })
        }

        /// Construct a sampler that always reports empty occupancy.
        pub fn never_overflowing() -> Self {
            Self::new(HeapReading { max: 100, free: 100 })
        }

        /// Replace the reading returned by subsequent `sample` calls.
        pub fn set(&self, reading: HeapReading) {
            *self.reading.lock() = reading;
        }
    }

    impl HeapSampler for FakeHeapSampler {
        fn sample(&self) -> HeapReading {
            *self.reading.lock()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn used_and_fraction() {
        let r = HeapReading { max: 100, free: 40 };
        assert_eq!(r.used(), 60);
        assert!((r.used_fraction() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn zero_max_is_fully_used() {
        let r = HeapReading { max: 0, free: 0 };
        assert_eq!(r.used_fraction(), 1.0);
    }

    #[test]
    fn sysinfo_sampler_reports_something() {
        let sampler = SysinfoHeapSampler::new(1024 * 1024 * 1024);
        let reading = sampler.sample();
        assert_eq!(reading.max, 1024 * 1024 * 1024);
        assert!(reading.free <= reading.max);
    }
}
