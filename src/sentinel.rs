use crate::{
    source::{ProcStat, ReadError, Source},
    stat::CpuSnapshot,
};

/// observes cpu utilization.
pub struct Sentinel<S = ProcStat> {
    inner: Inner<S>,
}

enum Inner<S> {
    Initialized {
        /// the underlying source of kernel statistics.
        source: S,
    },
    Running {
        /// the underlying source of kernel statistics.
        source: S,
        /// the last observed snapshot.
        last: CpuSnapshot,
    },
}

// === impl Sentinel ===

impl<S: Default> Sentinel<S> {
    /// creates a new [`Sentinel`].
    pub fn new() -> Self {
        Self::with_source(S::default())
    }
}

impl<S: Default> Default for Sentinel<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Sentinel<S> {
    /// creates a new [`Sentinel`] reading from `source`.
    pub fn with_source(source: S) -> Self {
        Self {
            inner: Inner::Initialized { source },
        }
    }

    /// returns true once a first snapshot has been taken.
    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        matches!(self.inner, Inner::Running { .. })
    }
}

impl<S> Sentinel<S>
where
    S: Source + Default,
{
    /// returns the cpu utilization since this was last called, as a percentage.
    ///
    /// NB: by virtue of this being a comparison to the previous reading, this will return
    /// `Ok(None)` the first time it is called.
    pub fn observe(&mut self) -> Result<Option<f64>, ReadError> {
        let Self { inner } = self;

        match inner {
            Inner::Initialized { source } => {
                let last = CpuSnapshot::read(&*source)?;
                let source = std::mem::take(source);
                *inner = Inner::Running { source, last };
                Ok(None)
            }
            Inner::Running { source, last } => {
                let new = CpuSnapshot::read(&*source)?;
                let prev = std::mem::replace(last, new);
                Ok(Some(new.percent_since(&prev)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::source::MockSource};

    #[test]
    fn first_observation_primes() {
        let source = MockSource::new(["cpu 0 0 200 800 0 0 0 0 0 0", "cpu 0 0 1000 1000 0 0 0 0 0 0"]);
        let mut sentinel = Sentinel::with_source(source);
        assert!(!sentinel.is_running());

        assert_eq!(sentinel.observe().unwrap(), None);
        assert!(sentinel.is_running());

        // total 1000 -> 2000, idle 800 -> 1000.
        assert_eq!(sentinel.observe().unwrap(), Some(80.0));
    }

    #[test]
    fn compares_against_the_previous_reading() {
        let source = MockSource::new([
            "cpu 0 0 0 100 0 0 0 0 0 0",
            "cpu 0 0 100 200 0 0 0 0 0 0",
            "cpu 0 0 100 300 0 0 0 0 0 0",
        ]);
        let mut sentinel = Sentinel::with_source(source);
        sentinel.observe().unwrap();
        assert_eq!(sentinel.observe().unwrap(), Some(50.0));
        assert_eq!(sentinel.observe().unwrap(), Some(0.0));
    }

    #[test]
    fn missing_source() {
        let mut sentinel = Sentinel::<MockSource>::new();
        assert!(matches!(sentinel.observe(), Err(ReadError::Io(_))));
        assert!(!sentinel.is_running());
    }
}
