//! sampling producers.
//!
//! each producer is a task that sleeps, samples, and emits one record per interval, for a fixed
//! number of samples. dropping its [`Emitter`] on return is what closes the feed.

use {
    crate::{
        Error,
        config::Config,
        feed::Emitter,
        meminfo::MemInfo,
        scale,
        sentinel::Sentinel,
        source::{ReadError, Source},
    },
    std::{sync::Arc, time::Duration},
    tokio::task::{JoinError, spawn_blocking},
    tokio_util::sync::CancellationToken,
    tracing::{debug, trace},
};

/// a quantized memory level, within `0..=MEM_SCALE`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MemoryLevel(pub u16);

/// a cpu utilization percentage, within `0.0..=100.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CpuPercent(pub f64);

/// paces a producer.
#[derive(Clone, Debug)]
pub struct Schedule {
    /// the number of records to emit.
    samples: usize,
    /// the delay before each sample.
    interval: Duration,
    /// stops the producer early.
    cancel: CancellationToken,
}

/// whether a producer should keep going.
enum Flow {
    Continue,
    Cancelled,
}

// === impl Schedule ===

impl Schedule {
    pub fn new(config: &Config, cancel: CancellationToken) -> Self {
        Self {
            samples: config.samples,
            interval: config.interval,
            cancel,
        }
    }

    /// waits out one interval.
    async fn tick(&self) -> Flow {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Flow::Cancelled,
            _ = tokio::time::sleep(self.interval) => Flow::Continue,
        }
    }

    /// emits a record, waiting while the feed is full.
    async fn emit<T>(&self, emitter: &Emitter<T>, record: T) -> Result<Flow, Error> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Ok(Flow::Cancelled),
            sent = emitter.emit(record) => sent.map(|()| Flow::Continue),
        }
    }
}

/// samples memory utilization.
///
/// each reading runs on the blocking pool, off of the async workers.
pub async fn memory<S>(
    source: Arc<S>,
    schedule: Schedule,
    emitter: Emitter<MemoryLevel>,
) -> Result<(), Error>
where
    S: Source + Send + Sync + 'static,
{
    debug!(samples = schedule.samples, "sampling memory");

    for sample in 1..=schedule.samples {
        if let Flow::Cancelled = schedule.tick().await {
            debug!(sample, "memory sampling cancelled");
            return Ok(());
        }

        let source = Arc::clone(&source);
        let info = spawn_blocking(move || MemInfo::read(&*source))
            .await?
            .map_err(Error::reading("memory"))?;
        let level = scale::memory_level(info.used(), info.total);
        trace!(sample, level, "memory");

        if let Flow::Cancelled = schedule.emit(&emitter, MemoryLevel(level)).await? {
            debug!(sample, "memory sampling cancelled");
            return Ok(());
        }
    }

    debug!("memory sampling finished");
    Ok(())
}

/// samples cpu utilization.
///
/// the first snapshot is taken before the first interval, so that every record compares two
/// readings. like [`memory()`], each reading runs on the blocking pool.
pub async fn cpu<S>(
    sentinel: Sentinel<S>,
    schedule: Schedule,
    emitter: Emitter<CpuPercent>,
) -> Result<(), Error>
where
    S: Source + Default + Send + 'static,
{
    debug!(samples = schedule.samples, "sampling cpu");
    let (mut sentinel, primed) = observe(sentinel).await?;
    primed.map_err(Error::reading("cpu"))?;

    for sample in 1..=schedule.samples {
        if let Flow::Cancelled = schedule.tick().await {
            debug!(sample, "cpu sampling cancelled");
            return Ok(());
        }

        let (next, percent) = observe(sentinel).await?;
        sentinel = next;
        let percent = percent.map_err(Error::reading("cpu"))?.unwrap_or_default();
        trace!(sample, percent, "cpu");

        if let Flow::Cancelled = schedule.emit(&emitter, CpuPercent(percent)).await? {
            debug!(sample, "cpu sampling cancelled");
            return Ok(());
        }
    }

    debug!("cpu sampling finished");
    Ok(())
}

/// moves `sentinel` onto the blocking pool for one observation, and hands it back.
async fn observe<S>(
    mut sentinel: Sentinel<S>,
) -> Result<(Sentinel<S>, Result<Option<f64>, ReadError>), JoinError>
where
    S: Source + Default + Send + 'static,
{
    spawn_blocking(move || {
        let observed = sentinel.observe();
        (sentinel, observed)
    })
    .await
}
