use std::time::Duration;

/// what to sample, how often, and for how long.
///
/// built once at startup, and read-only thereafter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// the number of samples each graph plots.
    pub samples: usize,
    /// the delay before each sample.
    pub interval: Duration,
    /// which blocks are shown.
    pub metrics: Metrics,
}

/// the set of enabled metrics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Metrics {
    pub memory: bool,
    pub cpu: bool,
    pub cores: bool,
}

// === impl Config ===

impl Config {
    pub const DEFAULT_SAMPLES: usize = 20;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_micros(500_000);

    /// returns true if any graph will be sampled.
    pub fn samples_graphs(&self) -> bool {
        let Metrics { memory, cpu, .. } = self.metrics;
        memory || cpu
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            samples: Self::DEFAULT_SAMPLES,
            interval: Self::DEFAULT_INTERVAL,
            metrics: Metrics::ALL,
        }
    }
}

// === impl Metrics ===

impl Metrics {
    pub const ALL: Self = Self {
        memory: true,
        cpu: true,
        cores: true,
    };

    /// resolves the `--memory`, `--cpu`, and `--cores` toggles.
    ///
    /// with no toggles every metric is shown. otherwise, exactly the toggled metrics are shown.
    pub fn from_toggles(memory: bool, cpu: bool, cores: bool) -> Self {
        if memory || cpu || cores {
            Self { memory, cpu, cores }
        } else {
            Self::ALL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_toggles_shows_everything() {
        assert_eq!(Metrics::from_toggles(false, false, false), Metrics::ALL);
    }

    #[test]
    fn toggles_select_exactly() {
        let metrics = Metrics::from_toggles(true, false, true);
        assert_eq!(
            metrics,
            Metrics {
                memory: true,
                cpu: false,
                cores: true
            }
        );
    }

    #[test]
    fn cores_alone_samples_nothing() {
        let config = Config {
            metrics: Metrics::from_toggles(false, false, true),
            ..Config::default()
        };
        assert!(!config.samples_graphs());
    }
}
