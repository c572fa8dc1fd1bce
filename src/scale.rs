//! maps raw measurements onto plot coordinates.
//!
//! every function here clamps its input, so nothing is ever drawn outside of an axis.

/// the vertical resolution of the memory graph.
pub const MEM_SCALE: u16 = 12;

/// the vertical resolution of the cpu graph.
pub const CPU_Y: u16 = 10;

const BYTES_PER_GB: f64 = (1u64 << 30) as f64;

/// quantizes `used / total` onto `0..=MEM_SCALE`.
pub fn memory_level(used: u64, total: u64) -> u16 {
    if total == 0 {
        return 0;
    }

    let ratio = (used as f64 / total as f64).clamp(0.0, 1.0);
    let level = (ratio * f64::from(MEM_SCALE)).floor();
    level as u16
}

/// the inverse of [`memory_level()`], used for label text.
pub fn memory_level_to_gb(level: u16, total_gb: f64) -> f64 {
    let level = level.min(MEM_SCALE);
    (f64::from(level) / f64::from(MEM_SCALE)) * total_gb
}

/// maps a percentage onto `0..=CPU_Y`.
pub fn cpu_level(percent: f64) -> u16 {
    let percent = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };

    (percent / 10.0).floor() as u16
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

#[cfg(test)]
mod tests {
    use super::*;

    const GB: u64 = 1 << 30;

    #[test]
    fn half_memory_is_level_six() {
        assert_eq!(memory_level(8 * GB, 16 * GB), 6);
    }

    #[test]
    fn memory_level_bounds() {
        assert_eq!(memory_level(0, 16 * GB), 0);
        assert_eq!(memory_level(16 * GB, 16 * GB), MEM_SCALE);
        assert_eq!(memory_level(32 * GB, 16 * GB), MEM_SCALE);
        assert_eq!(memory_level(1, 0), 0);
    }

    #[test]
    fn memory_level_is_monotonic() {
        let total = 1000;
        let levels = (0..=total)
            .map(|used| memory_level(used, total))
            .collect::<Vec<_>>();
        assert!(levels.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn memory_round_trip() {
        let total = 16 * GB;
        let total_gb = bytes_to_gb(total);
        let step = total_gb / f64::from(MEM_SCALE);
        for used in (0..=total).step_by((GB / 3) as usize) {
            let level = memory_level(used, total);
            let gb = memory_level_to_gb(level, total_gb);
            let diff = (bytes_to_gb(used) - gb).abs();
            assert!(diff <= step, "{used}: {gb} is {diff} away");
        }
    }

    #[test]
    fn label_clamps_level() {
        assert_eq!(memory_level_to_gb(MEM_SCALE + 5, 16.0), 16.0);
        assert_eq!(memory_level_to_gb(6, 16.0), 8.0);
    }

    #[test]
    fn cpu_levels() {
        assert_eq!(cpu_level(0.0), 0);
        assert_eq!(cpu_level(9.99), 0);
        assert_eq!(cpu_level(55.0), 5);
        assert_eq!(cpu_level(100.0), CPU_Y);
    }

    #[test]
    fn cpu_level_clamps() {
        assert_eq!(cpu_level(250.0), CPU_Y);
        assert_eq!(cpu_level(-4.0), 0);
        assert_eq!(cpu_level(f64::NAN), 0);
        assert_eq!(cpu_level(f64::INFINITY), CPU_Y);
    }
}
