use {
    crate::{meminfo::MemInfoParseError, stat::EntryParseError},
    std::{
        collections::VecDeque,
        fs::File,
        io::{self, BufReader, Cursor, Read},
        num::ParseIntError,
        sync::Mutex,
    },
};

pub use self::files::*;

/// a source of kernel statistics.
///
/// every raw metric is read by opening one of these. production code reads the real file, tests
/// hand in a [`MockSource`] holding canned contents.
pub trait Source {
    /// returns a reader.
    fn open(&self) -> io::Result<impl Read>;
}

/// an error encountered while reading a [`Source`].
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Entry(#[from] EntryParseError),
    #[error(transparent)]
    MemInfo(#[from] MemInfoParseError),
    #[error("invalid number: {0}")]
    Number(#[from] ParseIntError),
    #[error("no {what} found")]
    Missing { what: &'static str },
}

/// files exposed by the kernel.
mod files {
    use super::*;

    /// cumulative cpu time, backed by `/proc/stat`.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct ProcStat;

    /// memory totals, backed by `/proc/meminfo`.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct ProcMemInfo;

    /// the logical processor table, backed by `/proc/cpuinfo`.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct ProcCpuInfo;

    /// the first cpu's maximum frequency, in kHz.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct CpuMaxFreq;

    // === impl ProcStat ===

    impl Source for ProcStat {
        fn open(&self) -> io::Result<impl Read> {
            File::open(Self::PATH).map(BufReader::new)
        }
    }

    impl ProcStat {
        const PATH: &'static str = "/proc/stat";
    }

    // === impl ProcMemInfo ===

    impl Source for ProcMemInfo {
        fn open(&self) -> io::Result<impl Read> {
            File::open(Self::PATH).map(BufReader::new)
        }
    }

    impl ProcMemInfo {
        const PATH: &'static str = "/proc/meminfo";
    }

    // === impl ProcCpuInfo ===

    impl Source for ProcCpuInfo {
        fn open(&self) -> io::Result<impl Read> {
            File::open(Self::PATH).map(BufReader::new)
        }
    }

    impl ProcCpuInfo {
        const PATH: &'static str = "/proc/cpuinfo";
    }

    // === impl CpuMaxFreq ===

    impl Source for CpuMaxFreq {
        fn open(&self) -> io::Result<impl Read> {
            File::open(Self::PATH).map(BufReader::new)
        }
    }

    impl CpuMaxFreq {
        const PATH: &'static str = "/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq";
    }
}

/// a mock source, yielding canned file contents in order.
///
/// once every reading has been handed out, opening the source fails with
/// [`io::ErrorKind::NotFound`]. a default mock therefore behaves like a missing file.
#[derive(Debug, Default)]
pub struct MockSource {
    reads: Mutex<VecDeque<String>>,
}

// === impl MockSource ===

impl MockSource {
    /// returns a mock that yields each of the given readings once.
    pub fn new<I, T>(reads: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let reads = reads.into_iter().map(Into::into).collect();
        Self {
            reads: Mutex::new(reads),
        }
    }

    /// returns a mock that yields the same reading `n` times.
    pub fn repeat(read: &str, n: usize) -> Self {
        Self::new(std::iter::repeat_n(read, n))
    }
}

impl Source for MockSource {
    fn open(&self) -> io::Result<impl Read> {
        let Self { reads } = self;

        reads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .map(Cursor::new)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "mock source is exhausted"))
    }
}
